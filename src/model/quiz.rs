//! In-memory quiz representation
//!
//! The model is deliberately serde-free; the bundle codec owns the external
//! representation (underscore_case documents plus a media folder) and maps it
//! to and from these types.

use crate::util::generate_id;

/// Quiz-level configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizConfig {
    /// Quiz title. Must be non-empty for export.
    pub title: String,
    pub subject: Option<String>,
    pub grade: Option<String>,
    pub author: Option<String>,
    pub description: Option<String>,
    /// Time limit in minutes; 0 means unlimited.
    pub duration_minutes: u32,
    /// Shuffle the question order at load time.
    pub shuffle_questions: bool,
    /// Shuffle each multiple-choice question's choices at load time.
    pub shuffle_answers: bool,
    /// ISO-8601 timestamp before which the quiz cannot be played.
    pub open_time: Option<String>,
    /// ISO-8601 timestamp after which the quiz cannot be played.
    pub close_time: Option<String>,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            title: String::new(),
            subject: None,
            grade: None,
            author: None,
            description: None,
            duration_minutes: 0,
            shuffle_questions: false,
            shuffle_answers: false,
            open_time: None,
            close_time: None,
        }
    }
}

/// What a media attachment holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Audio,
    /// Unrecognised extension found in a decoded bundle.
    Binary,
}

/// One authoritative payload representation per lifecycle stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaPayload {
    /// Raw bytes attached during authoring, pending export.
    File { bytes: Vec<u8> },
    /// Content resolved from a decoded bundle.
    Resolved { bytes: Vec<u8>, mime: String },
}

impl MediaPayload {
    pub fn bytes(&self) -> &[u8] {
        match self {
            MediaPayload::File { bytes } => bytes,
            MediaPayload::Resolved { bytes, .. } => bytes,
        }
    }
}

/// An image or audio attachment owned by exactly one question, choice, or
/// statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaItem {
    pub id: String,
    pub kind: MediaKind,
    /// Display name; becomes part of the bundle filename on export.
    pub name: String,
    pub payload: MediaPayload,
}

impl MediaItem {
    pub fn image(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            id: generate_id(),
            kind: MediaKind::Image,
            name: name.into(),
            payload: MediaPayload::File { bytes },
        }
    }

    pub fn audio(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            id: generate_id(),
            kind: MediaKind::Audio,
            name: name.into(),
            payload: MediaPayload::File { bytes },
        }
    }
}

/// One selectable answer of a multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub id: String,
    pub text: String,
    pub media: Option<MediaItem>,
}

impl Choice {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: generate_id(),
            text: text.into(),
            media: None,
        }
    }
}

/// One independently-judged statement of a true/false question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub id: String,
    pub text: String,
    pub media: Option<MediaItem>,
    pub is_true: bool,
}

impl Statement {
    pub fn new(text: impl Into<String>, is_true: bool) -> Self {
        Self {
            id: generate_id(),
            text: text.into(),
            media: None,
            is_true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipleChoiceQuestion {
    pub id: String,
    pub text: String,
    pub media: Option<MediaItem>,
    /// Ordered; 2 to 8 entries with ids unique within the question.
    pub choices: Vec<Choice>,
    /// Id of the correct choice, or empty while the author has not picked one.
    pub correct_answer_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrueFalseQuestion {
    pub id: String,
    pub text: String,
    pub media: Option<MediaItem>,
    /// Ordered; at least one entry with ids unique within the question.
    pub statements: Vec<Statement>,
}

/// Discriminant for creating a new question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionKind {
    MultipleChoice,
    TrueFalse,
}

/// A quiz question. Every consumer pattern-matches exhaustively so that a new
/// variant cannot be silently ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Question {
    MultipleChoice(MultipleChoiceQuestion),
    TrueFalse(TrueFalseQuestion),
}

impl Question {
    pub fn id(&self) -> &str {
        match self {
            Question::MultipleChoice(q) => &q.id,
            Question::TrueFalse(q) => &q.id,
        }
    }

    pub fn text(&self) -> &str {
        match self {
            Question::MultipleChoice(q) => &q.text,
            Question::TrueFalse(q) => &q.text,
        }
    }

    pub fn media(&self) -> Option<&MediaItem> {
        match self {
            Question::MultipleChoice(q) => q.media.as_ref(),
            Question::TrueFalse(q) => q.media.as_ref(),
        }
    }

    pub fn kind(&self) -> QuestionKind {
        match self {
            Question::MultipleChoice(_) => QuestionKind::MultipleChoice,
            Question::TrueFalse(_) => QuestionKind::TrueFalse,
        }
    }

    pub fn as_multiple_choice(&self) -> Option<&MultipleChoiceQuestion> {
        match self {
            Question::MultipleChoice(q) => Some(q),
            Question::TrueFalse(_) => None,
        }
    }

    pub fn as_true_false(&self) -> Option<&TrueFalseQuestion> {
        match self {
            Question::TrueFalse(q) => Some(q),
            Question::MultipleChoice(_) => None,
        }
    }
}

/// A complete quiz: configuration plus the authored question order.
///
/// The stored order is meaningful; play-time shuffling only ever reorders a
/// working copy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Quiz {
    pub config: QuizConfig,
    pub questions: Vec<Question>,
}

impl Quiz {
    pub fn new(config: QuizConfig, questions: Vec<Question>) -> Self {
        Self { config, questions }
    }

    pub fn question(&self, id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id() == id)
    }
}
