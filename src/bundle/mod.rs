//! Portable quiz bundle codec
//!
//! A bundle is a zip with three kinds of entries: `config.json`,
//! `questions.json`, and `media/{id}_{name}` blobs. [`wire`] holds the external
//! serde representation; [`codec`] does the packing and unpacking.

pub mod codec;
pub mod wire;

pub use codec::{BundleError, QuizBundle};
