//! Grading engine
//!
//! A pure function from (quiz, submitted answers) to a scored result. A
//! multiple-choice question is correct on exact id equality; a true/false
//! question is correct only when every statement was answered and matches.
//! There is no partial credit.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::model::quiz::{Question, Quiz};

/// A taker's answer to one question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Answer {
    /// Selected choice id for a multiple-choice question. The empty string is
    /// the no-answer sentinel in results.
    Choice(String),
    /// Per-statement verdicts for a true/false question.
    Statements(BTreeMap<String, bool>),
}

impl Answer {
    fn absent() -> Self {
        Answer::Choice(String::new())
    }
}

/// Submitted answers keyed by question id.
pub type AnswerSheet = HashMap<String, Answer>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionResult {
    pub question_id: String,
    pub is_correct: bool,
    /// The answer as submitted, or the empty-string sentinel if absent.
    pub user_answer: Answer,
    /// The canonical correct answer: the choice id, or the full statement map.
    pub correct_answer: Answer,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizResult {
    pub total_questions: usize,
    pub correct_answers: usize,
    /// Percentage, `round(correct / total * 100)`.
    pub score: u32,
    pub details: Vec<QuestionResult>,
}

/// Grade a quiz against a set of submitted answers.
///
/// The quiz must have at least one question; the playback session rejects
/// empty quizzes before grading can be reached.
pub fn grade(quiz: &Quiz, answers: &AnswerSheet) -> QuizResult {
    let mut details = Vec::with_capacity(quiz.questions.len());
    let mut correct_count = 0usize;

    for question in &quiz.questions {
        let submitted = answers.get(question.id());
        let (is_correct, correct_answer) = match question {
            Question::MultipleChoice(q) => {
                let is_correct = matches!(
                    submitted,
                    Some(Answer::Choice(choice_id)) if *choice_id == q.correct_answer_id
                );
                (is_correct, Answer::Choice(q.correct_answer_id.clone()))
            }
            Question::TrueFalse(q) => {
                let is_correct = match submitted {
                    Some(Answer::Statements(verdicts)) => q
                        .statements
                        .iter()
                        .all(|s| verdicts.get(&s.id) == Some(&s.is_true)),
                    Some(Answer::Choice(_)) | None => false,
                };
                let truth: BTreeMap<String, bool> = q
                    .statements
                    .iter()
                    .map(|s| (s.id.clone(), s.is_true))
                    .collect();
                (is_correct, Answer::Statements(truth))
            }
        };

        if is_correct {
            correct_count += 1;
        }
        details.push(QuestionResult {
            question_id: question.id().to_string(),
            is_correct,
            user_answer: submitted.cloned().unwrap_or_else(Answer::absent),
            correct_answer,
        });
    }

    let total = quiz.questions.len();
    let score = if total == 0 {
        0
    } else {
        (correct_count as f64 / total as f64 * 100.0).round() as u32
    };

    QuizResult {
        total_questions: total,
        correct_answers: correct_count,
        score,
        details,
    }
}
