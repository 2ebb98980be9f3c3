//! Load-time order randomization
//!
//! Shuffling happens once per playback session, on a working copy; the authored
//! order is never mutated and correctness always follows entity id, never
//! position.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::model::quiz::{Question, Quiz};

/// Produce the presented copy of a quiz: questions reordered if
/// `shuffle_questions`, each multiple-choice question's choices reordered if
/// `shuffle_answers`. True/false statements keep their order.
pub fn shuffle_for_play<R: Rng + ?Sized>(quiz: &Quiz, rng: &mut R) -> Quiz {
    let mut presented = quiz.clone();
    if presented.config.shuffle_questions {
        presented.questions.shuffle(rng);
    }
    if presented.config.shuffle_answers {
        for question in &mut presented.questions {
            match question {
                Question::MultipleChoice(q) => q.choices.shuffle(rng),
                Question::TrueFalse(_) => {}
            }
        }
    }
    presented
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::quiz::{
        Choice, MultipleChoiceQuestion, QuizConfig, Statement, TrueFalseQuestion,
    };
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::BTreeSet;

    fn quiz_with(n: usize, shuffle_questions: bool, shuffle_answers: bool) -> Quiz {
        let questions = (0..n)
            .map(|i| {
                if i % 2 == 0 {
                    let choices: Vec<Choice> =
                        (0..4).map(|c| Choice::new(format!("c{c}"))).collect();
                    let correct = choices[1].id.clone();
                    Question::MultipleChoice(MultipleChoiceQuestion {
                        id: format!("q{i}"),
                        text: format!("question {i}"),
                        media: None,
                        choices,
                        correct_answer_id: correct,
                    })
                } else {
                    Question::TrueFalse(TrueFalseQuestion {
                        id: format!("q{i}"),
                        text: format!("question {i}"),
                        media: None,
                        statements: vec![Statement::new("s", true)],
                    })
                }
            })
            .collect();
        Quiz {
            config: QuizConfig {
                title: "t".into(),
                shuffle_questions,
                shuffle_answers,
                ..QuizConfig::default()
            },
            questions,
        }
    }

    #[test]
    fn disabled_flags_leave_order_untouched() {
        let quiz = quiz_with(6, false, false);
        let presented = shuffle_for_play(&quiz, &mut rand::rng());
        assert_eq!(presented, quiz);
    }

    #[test]
    fn shuffling_never_mutates_the_source() {
        let quiz = quiz_with(8, true, true);
        let snapshot = quiz.clone();
        let _ = shuffle_for_play(&quiz, &mut rand::rng());
        assert_eq!(quiz, snapshot);
    }

    proptest! {
        #[test]
        fn shuffle_is_a_permutation(n in 1usize..24, seed in any::<u64>()) {
            let quiz = quiz_with(n, true, true);
            let mut rng = StdRng::seed_from_u64(seed);
            let presented = shuffle_for_play(&quiz, &mut rng);

            prop_assert_eq!(presented.questions.len(), n);
            let original: BTreeSet<&str> = quiz.questions.iter().map(|q| q.id()).collect();
            let shuffled: BTreeSet<&str> = presented.questions.iter().map(|q| q.id()).collect();
            prop_assert_eq!(original, shuffled);
        }

        #[test]
        fn correctness_marker_follows_id_not_position(seed in any::<u64>()) {
            let quiz = quiz_with(5, true, true);
            let mut rng = StdRng::seed_from_u64(seed);
            let presented = shuffle_for_play(&quiz, &mut rng);

            for question in &quiz.questions {
                let Question::MultipleChoice(original) = question else { continue };
                let shuffled = presented
                    .question(&original.id)
                    .unwrap()
                    .as_multiple_choice()
                    .unwrap();
                prop_assert_eq!(&shuffled.correct_answer_id, &original.correct_answer_id);
                let ids: BTreeSet<&str> =
                    shuffled.choices.iter().map(|c| c.id.as_str()).collect();
                prop_assert!(ids.contains(original.correct_answer_id.as_str()));
            }
        }
    }
}
