//! Playback: shuffle, grading, and the session state machine

pub mod grade;
pub mod session;
pub mod shuffle;

pub use grade::{grade, Answer, AnswerSheet, QuestionResult, QuizResult};
pub use session::{PlayError, PlayPhase, QuizSession};
pub use shuffle::shuffle_for_play;
