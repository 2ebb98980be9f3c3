//! External bundle representation
//!
//! Field names are underscore_case regardless of internal naming, and `media`
//! fields hold filenames referencing entries under `media/` in the bundle.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireConfig {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grade: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shuffle_questions: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shuffle_answers: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub close_time: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireChoice {
    pub id: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireStatement {
    pub id: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media: Option<String>,
    pub is_true: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WireQuestion {
    #[serde(rename = "multiple-choice")]
    MultipleChoice {
        id: String,
        text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        media: Option<String>,
        choices: Vec<WireChoice>,
        correct_answer_id: String,
    },
    #[serde(rename = "true-false")]
    TrueFalse {
        id: String,
        text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        media: Option<String>,
        statements: Vec<WireStatement>,
    },
}
