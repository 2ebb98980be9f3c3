//! Quizly: portable quiz bundles.
//!
//! A quiz is authored in memory ([`model::QuizEditor`]), packed into a single
//! zip artifact (`config.json` + `questions.json` + embedded media) by the
//! [`bundle`] codec, and played back by a [`play::QuizSession`] that applies
//! optional shuffling, enforces the open/close window, runs the countdown, and
//! grades the submitted answers.

pub mod bundle;
pub mod model;
pub mod play;
pub mod upload;
pub mod util;

pub use bundle::{BundleError, QuizBundle};
pub use model::{
    Choice, MediaItem, MediaKind, MediaPayload, MultipleChoiceQuestion, PublishError, Question,
    QuestionKind, Quiz, QuizConfig, QuizConfigUpdate, QuizEditor, Statement, TrueFalseQuestion,
    ValidationError,
};
pub use play::{
    grade, shuffle_for_play, Answer, AnswerSheet, PlayError, PlayPhase, QuestionResult, QuizResult,
    QuizSession,
};
pub use upload::{UploadClient, UploadConfig, UploadError, UploadReceipt};
pub use util::generate_id;
