//! Playback session
//!
//! One taker's run through a bundle: fetch and decode, check the open/close
//! window, shuffle once, collect answers, run the countdown, and grade on
//! submit. The session owns its state and countdown task; the countdown is
//! cancelled on submit, on auto-submit, and when the session is dropped.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local, Utc};
use parking_lot::Mutex;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::bundle::{BundleError, QuizBundle};
use crate::model::quiz::Quiz;
use crate::play::grade::{grade, Answer, AnswerSheet, QuizResult};
use crate::play::shuffle::shuffle_for_play;

const LOCAL_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

#[derive(Debug, Error)]
pub enum PlayError {
    #[error("failed to fetch quiz bundle: {0}")]
    Fetch(#[from] reqwest::Error),
    #[error(transparent)]
    Decode(#[from] BundleError),
    #[error("quiz is not open yet; opens at {opens}")]
    NotYetOpen { opens: String },
    #[error("quiz has closed; closed at {closed}")]
    Closed { closed: String },
    #[error("quiz contains no questions")]
    EmptyQuiz,
    #[error("action is not valid in the {0:?} phase")]
    InvalidPhase(PlayPhase),
}

/// Where a live session is in its lifecycle. Load failures never produce a
/// session, so the error state has no phase here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayPhase {
    /// Metadata review; no answers collected yet.
    Info,
    Playing,
    /// Terminal; the graded result is available.
    Finished,
}

#[derive(Debug)]
struct SessionState {
    phase: PlayPhase,
    /// The presented (possibly shuffled) copy of the quiz.
    quiz: Quiz,
    answers: AnswerSheet,
    started_at: Option<DateTime<Utc>>,
    ended_at: Option<DateTime<Utc>>,
    /// Whole seconds left; `None` when the quiz is untimed.
    time_remaining: Option<u64>,
    result: Option<QuizResult>,
}

/// One playback session over one decoded bundle.
pub struct QuizSession {
    state: Arc<Mutex<SessionState>>,
    countdown: Option<JoinHandle<()>>,
}

impl QuizSession {
    /// Fetch a bundle from a URL and open a session on it.
    pub async fn load(url: &str) -> Result<Self, PlayError> {
        let bytes = reqwest::get(url)
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        Self::from_bytes(&bytes)
    }

    /// Open a session on bundle bytes already in hand.
    ///
    /// Decodes, checks the open/close window against the current time, and
    /// applies the shuffle engine exactly once; the resulting order is fixed
    /// for this session.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PlayError> {
        let quiz = QuizBundle::decode(bytes)?;
        check_window(&quiz, Utc::now())?;
        if quiz.questions.is_empty() {
            return Err(PlayError::EmptyQuiz);
        }

        let presented = shuffle_for_play(&quiz, &mut rand::rng());
        info!(
            title = %presented.config.title,
            questions = presented.questions.len(),
            "quiz session ready"
        );

        Ok(Self {
            state: Arc::new(Mutex::new(SessionState {
                phase: PlayPhase::Info,
                quiz: presented,
                answers: AnswerSheet::new(),
                started_at: None,
                ended_at: None,
                time_remaining: None,
                result: None,
            })),
            countdown: None,
        })
    }

    pub fn phase(&self) -> PlayPhase {
        self.state.lock().phase
    }

    /// The quiz in presented order (the copy shown to this taker).
    pub fn presented_quiz(&self) -> Quiz {
        self.state.lock().quiz.clone()
    }

    pub fn time_remaining(&self) -> Option<u64> {
        self.state.lock().time_remaining
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.state.lock().started_at
    }

    pub fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.state.lock().ended_at
    }

    pub fn result(&self) -> Option<QuizResult> {
        self.state.lock().result.clone()
    }

    /// Leave the info screen and begin answering. Starts the countdown when
    /// the quiz has a duration.
    pub fn start(&mut self) -> Result<(), PlayError> {
        let mut state = self.state.lock();
        if state.phase != PlayPhase::Info {
            return Err(PlayError::InvalidPhase(state.phase));
        }
        state.phase = PlayPhase::Playing;
        state.started_at = Some(Utc::now());

        let duration_minutes = state.quiz.config.duration_minutes;
        if duration_minutes == 0 {
            return Ok(());
        }
        state.time_remaining = Some(u64::from(duration_minutes) * 60);
        drop(state);

        let shared = Arc::clone(&self.state);
        self.countdown = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(1));
            // The first tick completes immediately.
            interval.tick().await;
            loop {
                interval.tick().await;
                let mut state = shared.lock();
                if state.phase != PlayPhase::Playing {
                    break;
                }
                match state.time_remaining {
                    Some(remaining) if remaining > 1 => {
                        state.time_remaining = Some(remaining - 1);
                    }
                    _ => {
                        state.time_remaining = Some(0);
                        finish(&mut state);
                        break;
                    }
                }
            }
        }));
        Ok(())
    }

    /// Record the selected choice for a multiple-choice question, replacing
    /// any previous selection.
    pub fn answer_choice(&self, question_id: &str, choice_id: &str) -> Result<(), PlayError> {
        let mut state = self.state.lock();
        if state.phase != PlayPhase::Playing {
            return Err(PlayError::InvalidPhase(state.phase));
        }
        state
            .answers
            .insert(question_id.to_string(), Answer::Choice(choice_id.to_string()));
        Ok(())
    }

    /// Record one statement verdict of a true/false question, merging with the
    /// verdicts already given for that question.
    pub fn answer_statement(
        &self,
        question_id: &str,
        statement_id: &str,
        value: bool,
    ) -> Result<(), PlayError> {
        let mut state = self.state.lock();
        if state.phase != PlayPhase::Playing {
            return Err(PlayError::InvalidPhase(state.phase));
        }
        let entry = state
            .answers
            .entry(question_id.to_string())
            .or_insert_with(|| Answer::Statements(Default::default()));
        if let Answer::Statements(verdicts) = entry {
            verdicts.insert(statement_id.to_string(), value);
        } else {
            // A stale single-choice answer under this id is replaced outright.
            let mut verdicts = std::collections::BTreeMap::new();
            verdicts.insert(statement_id.to_string(), value);
            *entry = Answer::Statements(verdicts);
        }
        Ok(())
    }

    /// Submit the current answers and return the graded result.
    ///
    /// Idempotent against the auto-submit: if the countdown already graded the
    /// session, the existing result is returned unchanged.
    pub fn submit(&mut self) -> Result<QuizResult, PlayError> {
        let result = {
            let mut state = self.state.lock();
            match state.phase {
                PlayPhase::Info => return Err(PlayError::InvalidPhase(state.phase)),
                PlayPhase::Playing => finish(&mut state),
                PlayPhase::Finished => {}
            }
            state
                .result
                .clone()
                .ok_or(PlayError::InvalidPhase(state.phase))?
        };
        if let Some(handle) = self.countdown.take() {
            handle.abort();
        }
        Ok(result)
    }
}

impl Drop for QuizSession {
    fn drop(&mut self) {
        if let Some(handle) = self.countdown.take() {
            handle.abort();
        }
    }
}

/// Stop play and grade. The phase guard makes grading happen exactly once even
/// when an explicit submit races the countdown hitting zero.
fn finish(state: &mut SessionState) {
    if state.phase != PlayPhase::Playing {
        return;
    }
    state.phase = PlayPhase::Finished;
    state.ended_at = Some(Utc::now());
    state.result = Some(grade(&state.quiz, &state.answers));
}

/// Enforce the open/close window, if any. Timestamps that fail to parse are
/// ignored rather than blocking play.
fn check_window(quiz: &Quiz, now: DateTime<Utc>) -> Result<(), PlayError> {
    if let Some(open_time) = &quiz.config.open_time {
        match DateTime::parse_from_rfc3339(open_time) {
            Ok(opens) if now < opens => {
                return Err(PlayError::NotYetOpen {
                    opens: opens
                        .with_timezone(&Local)
                        .format(LOCAL_TIME_FORMAT)
                        .to_string(),
                });
            }
            Ok(_) => {}
            Err(err) => warn!(%open_time, %err, "unparseable open_time, ignoring"),
        }
    }
    if let Some(close_time) = &quiz.config.close_time {
        match DateTime::parse_from_rfc3339(close_time) {
            Ok(closes) if now > closes => {
                return Err(PlayError::Closed {
                    closed: closes
                        .with_timezone(&Local)
                        .format(LOCAL_TIME_FORMAT)
                        .to_string(),
                });
            }
            Ok(_) => {}
            Err(err) => warn!(%close_time, %err, "unparseable close_time, ignoring"),
        }
    }
    Ok(())
}
