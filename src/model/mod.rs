//! Quiz data model and authoring session

pub mod editor;
pub mod quiz;

pub use editor::{PublishError, QuizConfigUpdate, QuizEditor, ValidationError};
pub use quiz::{
    Choice, MediaItem, MediaKind, MediaPayload, MultipleChoiceQuestion, Question, QuestionKind,
    Quiz, QuizConfig, Statement, TrueFalseQuestion,
};
