//! Upload collaborator client
//!
//! The storage side lives behind an edge function; this is just the calling
//! convention: a multipart POST with the bundle under `file` and a
//! proof-of-human token under `turnstileToken`, answered by a JSON envelope
//! that is either a receipt or a structured rejection.

use serde::Deserialize;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("upload request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("upload rejected: {message}")]
    Rejected {
        message: String,
        details: Option<String>,
    },
}

/// Where and how to reach the upload endpoint.
#[derive(Debug, Clone)]
pub struct UploadConfig {
    /// Edge function URL accepting the multipart POST.
    pub endpoint: String,
    /// Key sent as both the bearer token and the `apikey` header.
    pub api_key: String,
}

/// Stored-artifact receipt returned on success.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadReceipt {
    pub file_id: String,
    pub file_name: String,
    pub file_path: String,
    pub file_size: u64,
    /// Publicly fetchable URL for the stored bundle; feed this to
    /// [`crate::play::QuizSession::load`].
    pub public_url: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum UploadResponse {
    Receipt(UploadReceipt),
    Rejection {
        error: String,
        #[serde(default)]
        details: Option<String>,
    },
}

pub struct UploadClient {
    config: UploadConfig,
    http: reqwest::Client,
}

impl UploadClient {
    pub fn new(config: UploadConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    /// POST a bundle and hand back the receipt.
    ///
    /// The endpoint reports validation failures (missing token, wrong file
    /// type, failed human verification, storage errors) as a JSON body with a
    /// non-2xx status, so the body is parsed regardless of status.
    pub async fn upload_bundle(
        &self,
        bundle: Vec<u8>,
        file_name: &str,
        turnstile_token: &str,
    ) -> Result<UploadReceipt, UploadError> {
        let file = reqwest::multipart::Part::bytes(bundle)
            .file_name(file_name.to_string())
            .mime_str("application/zip")?;
        let form = reqwest::multipart::Form::new()
            .part("file", file)
            .text("turnstileToken", turnstile_token.to_string());

        let response = self
            .http
            .post(&self.config.endpoint)
            .bearer_auth(&self.config.api_key)
            .header("apikey", &self.config.api_key)
            .multipart(form)
            .send()
            .await?;

        match response.json::<UploadResponse>().await? {
            UploadResponse::Receipt(receipt) => {
                info!(file = %receipt.file_name, url = %receipt.public_url, "bundle uploaded");
                Ok(receipt)
            }
            UploadResponse::Rejection { error, details } => Err(UploadError::Rejected {
                message: error,
                details,
            }),
        }
    }
}
