//! Authoring session
//!
//! An owned editing context over one quiz: id-addressed partial updates,
//! cascade-clearing deletes, export validation, and publishing. Two editors
//! never share state, so concurrent authoring surfaces (e.g. two tabs) stay
//! independently correct.

use thiserror::Error;

use crate::bundle::{BundleError, QuizBundle};
use crate::model::quiz::{
    Choice, MediaItem, MultipleChoiceQuestion, Question, QuestionKind, Quiz, Statement,
    TrueFalseQuestion,
};
use crate::upload::{UploadClient, UploadError, UploadReceipt};
use crate::util::generate_id;

/// Multiple-choice questions carry between 2 and 8 choices.
const MIN_CHOICES: usize = 2;
const MAX_CHOICES: usize = 8;
/// True/false questions carry at least one statement.
const MIN_STATEMENTS: usize = 1;

/// Export-time validation failure, addressed to a config field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("quiz title must not be empty")]
    EmptyTitle,
    #[error("quiz must contain at least one question")]
    NoQuestions,
}

impl ValidationError {
    /// The form field the message belongs to.
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::EmptyTitle => "title",
            ValidationError::NoQuestions => "questions",
        }
    }
}

/// Failure while exporting and uploading a quiz.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Bundle(#[from] BundleError),
    #[error(transparent)]
    Upload(#[from] UploadError),
}

/// Partial update for [`crate::model::QuizConfig`].
///
/// `None` leaves a field untouched; for optional fields, `Some(None)` clears.
#[derive(Debug, Clone, Default)]
pub struct QuizConfigUpdate {
    pub title: Option<String>,
    pub subject: Option<Option<String>>,
    pub grade: Option<Option<String>>,
    pub author: Option<Option<String>>,
    pub description: Option<Option<String>>,
    pub duration_minutes: Option<u32>,
    pub shuffle_questions: Option<bool>,
    pub shuffle_answers: Option<bool>,
    pub open_time: Option<Option<String>>,
    pub close_time: Option<Option<String>>,
}

/// One author's editing session.
#[derive(Debug, Default)]
pub struct QuizEditor {
    quiz: Quiz,
}

impl QuizEditor {
    pub fn new() -> Self {
        Self::default()
    }

    /// The quiz as currently authored.
    pub fn quiz(&self) -> &Quiz {
        &self.quiz
    }

    pub fn into_quiz(self) -> Quiz {
        self.quiz
    }

    /// Restore default config and an empty question list.
    pub fn reset(&mut self) {
        self.quiz = Quiz::default();
    }

    pub fn update_config(&mut self, update: QuizConfigUpdate) {
        let config = &mut self.quiz.config;
        if let Some(title) = update.title {
            config.title = title;
        }
        if let Some(subject) = update.subject {
            config.subject = subject;
        }
        if let Some(grade) = update.grade {
            config.grade = grade;
        }
        if let Some(author) = update.author {
            config.author = author;
        }
        if let Some(description) = update.description {
            config.description = description;
        }
        if let Some(duration) = update.duration_minutes {
            config.duration_minutes = duration;
        }
        if let Some(shuffle) = update.shuffle_questions {
            config.shuffle_questions = shuffle;
        }
        if let Some(shuffle) = update.shuffle_answers {
            config.shuffle_answers = shuffle;
        }
        if let Some(open) = update.open_time {
            config.open_time = open;
        }
        if let Some(close) = update.close_time {
            config.close_time = close;
        }
    }

    /// Append a new question skeleton and return its id.
    ///
    /// A multiple-choice question starts with four empty choices and no correct
    /// answer; a true/false question starts with one true and one false
    /// statement.
    pub fn add_question(&mut self, kind: QuestionKind) -> String {
        let id = generate_id();
        let question = match kind {
            QuestionKind::MultipleChoice => Question::MultipleChoice(MultipleChoiceQuestion {
                id: id.clone(),
                text: String::new(),
                media: None,
                choices: (0..4).map(|_| Choice::new("")).collect(),
                correct_answer_id: String::new(),
            }),
            QuestionKind::TrueFalse => Question::TrueFalse(TrueFalseQuestion {
                id: id.clone(),
                text: String::new(),
                media: None,
                statements: vec![Statement::new("", true), Statement::new("", false)],
            }),
        };
        self.quiz.questions.push(question);
        id
    }

    pub fn update_question_text(&mut self, question_id: &str, text: impl Into<String>) -> bool {
        match self.question_mut(question_id) {
            Some(Question::MultipleChoice(q)) => {
                q.text = text.into();
                true
            }
            Some(Question::TrueFalse(q)) => {
                q.text = text.into();
                true
            }
            None => false,
        }
    }

    pub fn delete_question(&mut self, question_id: &str) -> bool {
        let before = self.quiz.questions.len();
        self.quiz.questions.retain(|q| q.id() != question_id);
        self.quiz.questions.len() != before
    }

    /// Reorder the question list to match `order`; rejected unless `order` is a
    /// permutation of the current question ids.
    pub fn reorder_questions(&mut self, order: &[String]) -> bool {
        if order.len() != self.quiz.questions.len() {
            return false;
        }
        // Validate before touching anything; an unknown or duplicate id must
        // leave the authored order intact.
        let mut indices = Vec::with_capacity(order.len());
        for id in order {
            match self.quiz.questions.iter().position(|q| q.id() == *id) {
                Some(pos) if !indices.contains(&pos) => indices.push(pos),
                _ => return false,
            }
        }
        let mut slots: Vec<Option<Question>> =
            self.quiz.questions.drain(..).map(Some).collect();
        self.quiz.questions = indices.into_iter().filter_map(|i| slots[i].take()).collect();
        true
    }

    /// Select the correct choice; an empty `choice_id` clears the selection.
    pub fn set_correct_answer(&mut self, question_id: &str, choice_id: &str) -> bool {
        match self.multiple_choice_mut(question_id) {
            Some(q) if choice_id.is_empty() || q.choices.iter().any(|c| c.id == choice_id) => {
                q.correct_answer_id = choice_id.to_string();
                true
            }
            _ => false,
        }
    }

    /// Append an empty choice and return its id; rejected at the 8-choice cap.
    pub fn add_choice(&mut self, question_id: &str) -> Option<String> {
        let q = self.multiple_choice_mut(question_id)?;
        if q.choices.len() >= MAX_CHOICES {
            return None;
        }
        let choice = Choice::new("");
        let id = choice.id.clone();
        q.choices.push(choice);
        Some(id)
    }

    pub fn update_choice_text(
        &mut self,
        question_id: &str,
        choice_id: &str,
        text: impl Into<String>,
    ) -> bool {
        let Some(q) = self.multiple_choice_mut(question_id) else {
            return false;
        };
        match q.choices.iter_mut().find(|c| c.id == choice_id) {
            Some(choice) => {
                choice.text = text.into();
                true
            }
            None => false,
        }
    }

    /// Delete a choice; rejected at the 2-choice floor. Deleting the selected
    /// correct answer clears `correct_answer_id`.
    pub fn delete_choice(&mut self, question_id: &str, choice_id: &str) -> bool {
        let Some(q) = self.multiple_choice_mut(question_id) else {
            return false;
        };
        if q.choices.len() <= MIN_CHOICES || !q.choices.iter().any(|c| c.id == choice_id) {
            return false;
        }
        q.choices.retain(|c| c.id != choice_id);
        if q.correct_answer_id == choice_id {
            q.correct_answer_id.clear();
        }
        true
    }

    /// Append a statement (defaulting to true) and return its id.
    pub fn add_statement(&mut self, question_id: &str) -> Option<String> {
        let q = self.true_false_mut(question_id)?;
        let statement = Statement::new("", true);
        let id = statement.id.clone();
        q.statements.push(statement);
        Some(id)
    }

    pub fn update_statement_text(
        &mut self,
        question_id: &str,
        statement_id: &str,
        text: impl Into<String>,
    ) -> bool {
        match self.statement_mut(question_id, statement_id) {
            Some(statement) => {
                statement.text = text.into();
                true
            }
            None => false,
        }
    }

    pub fn set_statement_truth(
        &mut self,
        question_id: &str,
        statement_id: &str,
        is_true: bool,
    ) -> bool {
        match self.statement_mut(question_id, statement_id) {
            Some(statement) => {
                statement.is_true = is_true;
                true
            }
            None => false,
        }
    }

    /// Delete a statement; rejected at the 1-statement floor.
    pub fn delete_statement(&mut self, question_id: &str, statement_id: &str) -> bool {
        let Some(q) = self.true_false_mut(question_id) else {
            return false;
        };
        if q.statements.len() <= MIN_STATEMENTS || !q.statements.iter().any(|s| s.id == statement_id)
        {
            return false;
        }
        q.statements.retain(|s| s.id != statement_id);
        true
    }

    /// Attach or clear question-level media.
    pub fn set_question_media(&mut self, question_id: &str, media: Option<MediaItem>) -> bool {
        match self.question_mut(question_id) {
            Some(Question::MultipleChoice(q)) => {
                q.media = media;
                true
            }
            Some(Question::TrueFalse(q)) => {
                q.media = media;
                true
            }
            None => false,
        }
    }

    pub fn set_choice_media(
        &mut self,
        question_id: &str,
        choice_id: &str,
        media: Option<MediaItem>,
    ) -> bool {
        let Some(q) = self.multiple_choice_mut(question_id) else {
            return false;
        };
        match q.choices.iter_mut().find(|c| c.id == choice_id) {
            Some(choice) => {
                choice.media = media;
                true
            }
            None => false,
        }
    }

    pub fn set_statement_media(
        &mut self,
        question_id: &str,
        statement_id: &str,
        media: Option<MediaItem>,
    ) -> bool {
        match self.statement_mut(question_id, statement_id) {
            Some(statement) => {
                statement.media = media;
                true
            }
            None => false,
        }
    }

    /// Check the hard export preconditions: a title and at least one question.
    ///
    /// Per-question completeness (a multiple-choice question with no correct
    /// answer picked) is intentionally not enforced here.
    pub fn validate_for_export(&self) -> Result<(), ValidationError> {
        if self.quiz.config.title.trim().is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        if self.quiz.questions.is_empty() {
            return Err(ValidationError::NoQuestions);
        }
        Ok(())
    }

    /// Validate and encode the quiz into bundle bytes.
    pub fn export_bundle(&self) -> Result<Vec<u8>, PublishError> {
        self.validate_for_export()?;
        Ok(QuizBundle::encode(&self.quiz)?)
    }

    /// The `.zip` filename offered for this quiz: the title with whitespace
    /// runs collapsed to underscores.
    pub fn bundle_file_name(&self) -> String {
        let stem: Vec<&str> = self.quiz.config.title.split_whitespace().collect();
        format!("{}.zip", stem.join("_"))
    }

    /// Validate, encode, and hand the bundle to the upload collaborator.
    pub async fn publish(
        &self,
        client: &UploadClient,
        turnstile_token: &str,
    ) -> Result<UploadReceipt, PublishError> {
        let bundle = self.export_bundle()?;
        let receipt = client
            .upload_bundle(bundle, &self.bundle_file_name(), turnstile_token)
            .await?;
        Ok(receipt)
    }

    fn question_mut(&mut self, question_id: &str) -> Option<&mut Question> {
        self.quiz.questions.iter_mut().find(|q| q.id() == question_id)
    }

    fn multiple_choice_mut(&mut self, question_id: &str) -> Option<&mut MultipleChoiceQuestion> {
        match self.question_mut(question_id) {
            Some(Question::MultipleChoice(q)) => Some(q),
            _ => None,
        }
    }

    fn true_false_mut(&mut self, question_id: &str) -> Option<&mut TrueFalseQuestion> {
        match self.question_mut(question_id) {
            Some(Question::TrueFalse(q)) => Some(q),
            _ => None,
        }
    }

    fn statement_mut(&mut self, question_id: &str, statement_id: &str) -> Option<&mut Statement> {
        self.true_false_mut(question_id)?
            .statements
            .iter_mut()
            .find(|s| s.id == statement_id)
    }
}
