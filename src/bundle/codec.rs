//! Zip packing and unpacking
//!
//! Encode walks every media attachment in document order, stores it under
//! `media/{id}_{name}`, and replaces the attachment with that filename in
//! `questions.json`. Decode requires `config.json` and `questions.json`,
//! resolves every media entry back into bytes, and reattaches them with fresh
//! ids; a media reference with no matching entry is dropped, not fatal.

use std::io::{Cursor, Read, Write};
use std::path::Path;

use thiserror::Error;
use tracing::debug;
use zip::result::ZipError;
use zip::write::FileOptions;

use crate::bundle::wire::{WireChoice, WireConfig, WireQuestion, WireStatement};
use crate::model::quiz::{
    Choice, MediaItem, MediaKind, MediaPayload, MultipleChoiceQuestion, Question, Quiz,
    QuizConfig, Statement, TrueFalseQuestion,
};
use crate::util::generate_id;

const CONFIG_ENTRY: &str = "config.json";
const QUESTIONS_ENTRY: &str = "questions.json";
const MEDIA_DIR: &str = "media";

const IMAGE_EXTS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp"];
const AUDIO_EXTS: &[&str] = &["mp3", "wav", "ogg", "m4a"];

#[derive(Error, Debug)]
pub enum BundleError {
    #[error("bundle is missing {0}")]
    MissingEntry(&'static str),
    #[error("malformed {name}: {source}")]
    MalformedDocument {
        name: &'static str,
        source: serde_json::Error,
    },
    #[error("zip error: {0}")]
    Zip(#[from] ZipError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// The quiz artifact codec.
pub struct QuizBundle;

impl QuizBundle {
    /// Serialize a quiz into bundle bytes.
    pub fn encode(quiz: &Quiz) -> Result<Vec<u8>, BundleError> {
        let mut media_files: Vec<(String, Vec<u8>)> = Vec::new();

        let questions: Vec<WireQuestion> = quiz
            .questions
            .iter()
            .map(|question| match question {
                Question::MultipleChoice(q) => WireQuestion::MultipleChoice {
                    id: q.id.clone(),
                    text: q.text.clone(),
                    media: collect_media(&mut media_files, q.media.as_ref()),
                    choices: q
                        .choices
                        .iter()
                        .map(|c| WireChoice {
                            id: c.id.clone(),
                            text: c.text.clone(),
                            media: collect_media(&mut media_files, c.media.as_ref()),
                        })
                        .collect(),
                    correct_answer_id: q.correct_answer_id.clone(),
                },
                Question::TrueFalse(q) => WireQuestion::TrueFalse {
                    id: q.id.clone(),
                    text: q.text.clone(),
                    media: collect_media(&mut media_files, q.media.as_ref()),
                    statements: q
                        .statements
                        .iter()
                        .map(|s| WireStatement {
                            id: s.id.clone(),
                            text: s.text.clone(),
                            media: collect_media(&mut media_files, s.media.as_ref()),
                            is_true: s.is_true,
                        })
                        .collect(),
                },
            })
            .collect();

        let config = WireConfig {
            title: quiz.config.title.clone(),
            subject: quiz.config.subject.clone(),
            grade: quiz.config.grade.clone(),
            author: quiz.config.author.clone(),
            description: quiz.config.description.clone(),
            duration: Some(quiz.config.duration_minutes),
            shuffle_questions: Some(quiz.config.shuffle_questions),
            shuffle_answers: Some(quiz.config.shuffle_answers),
            open_time: quiz.config.open_time.clone(),
            close_time: quiz.config.close_time.clone(),
        };

        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = FileOptions::default().compression_method(zip::CompressionMethod::Deflated);

        zip.start_file(CONFIG_ENTRY, options)?;
        zip.write_all(&to_document(CONFIG_ENTRY, &config)?)?;

        zip.start_file(QUESTIONS_ENTRY, options)?;
        zip.write_all(&to_document(QUESTIONS_ENTRY, &questions)?)?;

        for (name, bytes) in &media_files {
            zip.start_file(format!("{MEDIA_DIR}/{name}"), options)?;
            zip.write_all(bytes)?;
        }

        let cursor = zip.finish()?;
        Ok(cursor.into_inner())
    }

    /// Deserialize bundle bytes back into a quiz.
    ///
    /// Media ids are regenerated; only content, kind, and structure survive the
    /// round trip.
    pub fn decode(bytes: &[u8]) -> Result<Quiz, BundleError> {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;

        let config: WireConfig = read_document(&mut archive, CONFIG_ENTRY)?;
        let questions: Vec<WireQuestion> = read_document(&mut archive, QUESTIONS_ENTRY)?;

        // Resolve every entry under media/ keyed by filename.
        let mut media_bytes: Vec<(String, Vec<u8>)> = Vec::new();
        for index in 0..archive.len() {
            let mut entry = archive.by_index(index)?;
            let name = entry.name().to_string();
            let Some(file_name) = name.strip_prefix(&format!("{MEDIA_DIR}/")) else {
                continue;
            };
            if file_name.is_empty() || file_name.ends_with('/') {
                continue;
            }
            let mut buf = Vec::with_capacity(entry.size() as usize);
            entry.read_to_end(&mut buf)?;
            media_bytes.push((file_name.to_string(), buf));
        }

        let resolve = |file_name: Option<String>| -> Option<MediaItem> {
            let file_name = file_name?;
            let Some((_, bytes)) = media_bytes.iter().find(|(name, _)| *name == file_name) else {
                debug!(file = %file_name, "media reference has no bundle entry, dropping");
                return None;
            };
            Some(MediaItem {
                id: generate_id(),
                kind: kind_for(&file_name),
                name: file_name.clone(),
                payload: MediaPayload::Resolved {
                    bytes: bytes.clone(),
                    mime: mime_for(&file_name),
                },
            })
        };

        let questions = questions
            .into_iter()
            .map(|question| match question {
                WireQuestion::MultipleChoice {
                    id,
                    text,
                    media,
                    choices,
                    correct_answer_id,
                } => Question::MultipleChoice(MultipleChoiceQuestion {
                    id,
                    text,
                    media: resolve(media),
                    choices: choices
                        .into_iter()
                        .map(|c| Choice {
                            id: c.id,
                            text: c.text,
                            media: resolve(c.media),
                        })
                        .collect(),
                    correct_answer_id,
                }),
                WireQuestion::TrueFalse {
                    id,
                    text,
                    media,
                    statements,
                } => Question::TrueFalse(TrueFalseQuestion {
                    id,
                    text,
                    media: resolve(media),
                    statements: statements
                        .into_iter()
                        .map(|s| Statement {
                            id: s.id,
                            text: s.text,
                            media: resolve(s.media),
                            is_true: s.is_true,
                        })
                        .collect(),
                }),
            })
            .collect();

        Ok(Quiz {
            config: QuizConfig {
                title: config.title,
                subject: config.subject,
                grade: config.grade,
                author: config.author,
                description: config.description,
                duration_minutes: config.duration.unwrap_or(0),
                shuffle_questions: config.shuffle_questions.unwrap_or(false),
                shuffle_answers: config.shuffle_answers.unwrap_or(false),
                open_time: config.open_time,
                close_time: config.close_time,
            },
            questions,
        })
    }

    pub fn write_to_path(quiz: &Quiz, path: &Path) -> Result<(), BundleError> {
        std::fs::write(path, Self::encode(quiz)?)?;
        Ok(())
    }

    pub fn read_from_path(path: &Path) -> Result<Quiz, BundleError> {
        Self::decode(&std::fs::read(path)?)
    }
}

/// Store an attachment's bytes and return its bundle filename.
fn collect_media(files: &mut Vec<(String, Vec<u8>)>, media: Option<&MediaItem>) -> Option<String> {
    let media = media?;
    let file_name = media_entry_name(media);
    files.push((file_name.clone(), media.payload.bytes().to_vec()));
    Some(file_name)
}

fn media_entry_name(media: &MediaItem) -> String {
    // Path separators in display names would escape media/.
    let name = media.name.replace(['/', '\\'], "_");
    format!("{}_{}", media.id, name)
}

fn extension_of(file_name: &str) -> Option<String> {
    file_name.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase())
}

fn kind_for(file_name: &str) -> MediaKind {
    match extension_of(file_name) {
        Some(ext) if IMAGE_EXTS.contains(&ext.as_str()) => MediaKind::Image,
        Some(ext) if AUDIO_EXTS.contains(&ext.as_str()) => MediaKind::Audio,
        _ => MediaKind::Binary,
    }
}

fn mime_for(file_name: &str) -> String {
    mime_guess::from_path(file_name)
        .first_raw()
        .unwrap_or("application/octet-stream")
        .to_string()
}

fn to_document<T: serde::Serialize>(name: &'static str, value: &T) -> Result<Vec<u8>, BundleError> {
    serde_json::to_vec_pretty(value).map_err(|source| BundleError::MalformedDocument { name, source })
}

fn read_document<T: serde::de::DeserializeOwned>(
    archive: &mut zip::ZipArchive<Cursor<&[u8]>>,
    name: &'static str,
) -> Result<T, BundleError> {
    let mut entry = match archive.by_name(name) {
        Ok(entry) => entry,
        Err(ZipError::FileNotFound) => return Err(BundleError::MissingEntry(name)),
        Err(err) => return Err(err.into()),
    };
    let mut buf = Vec::new();
    entry.read_to_end(&mut buf)?;
    serde_json::from_slice(&buf).map_err(|source| BundleError::MalformedDocument { name, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::quiz::QuizConfig;

    fn media(name: &str, bytes: &[u8]) -> MediaItem {
        MediaItem::image(name, bytes.to_vec())
    }

    fn sample_quiz() -> Quiz {
        let question_media = media("diagram.png", &[0x89, 0x50, 0x4e, 0x47]);
        let clip = MediaItem::audio("clip.mp3", vec![0xff, 0xfb, 0x90]);

        let choices = vec![
            Choice::new("Paris"),
            Choice {
                media: Some(clip),
                ..Choice::new("London")
            },
            Choice::new("Rome"),
        ];
        let correct = choices[0].id.clone();

        let statements = vec![
            Statement {
                media: Some(media("fig.jpg", b"jpegdata")),
                ..Statement::new("Water boils at 100C", true)
            },
            Statement::new("The moon is a planet", false),
        ];

        Quiz {
            config: QuizConfig {
                title: "Geography".into(),
                subject: Some("Earth science".into()),
                duration_minutes: 15,
                shuffle_questions: false,
                shuffle_answers: false,
                ..QuizConfig::default()
            },
            questions: vec![
                Question::MultipleChoice(MultipleChoiceQuestion {
                    id: "q1".into(),
                    text: "Capital of France?".into(),
                    media: Some(question_media),
                    choices,
                    correct_answer_id: correct,
                }),
                Question::TrueFalse(TrueFalseQuestion {
                    id: "q2".into(),
                    text: "Judge each statement".into(),
                    media: None,
                    statements,
                }),
            ],
        }
    }

    #[test]
    fn roundtrip_preserves_config_structure_and_media_bytes() {
        let quiz = sample_quiz();
        let bytes = QuizBundle::encode(&quiz).unwrap();
        let decoded = QuizBundle::decode(&bytes).unwrap();

        assert_eq!(decoded.config, quiz.config);
        assert_eq!(decoded.questions.len(), 2);

        let original = quiz.questions[0].as_multiple_choice().unwrap();
        let mcq = decoded.questions[0].as_multiple_choice().unwrap();
        assert_eq!(mcq.id, original.id);
        assert_eq!(mcq.text, original.text);
        assert_eq!(mcq.correct_answer_id, original.correct_answer_id);

        let qm = mcq.media.as_ref().unwrap();
        assert_eq!(qm.kind, MediaKind::Image);
        assert_eq!(
            qm.payload.bytes(),
            original.media.as_ref().unwrap().payload.bytes()
        );

        let cm = mcq.choices[1].media.as_ref().unwrap();
        assert_eq!(cm.kind, MediaKind::Audio);
        assert_eq!(cm.payload.bytes(), &[0xff, 0xfb, 0x90]);

        let tfq = decoded.questions[1].as_true_false().unwrap();
        assert!(tfq.statements[0].is_true);
        assert!(!tfq.statements[1].is_true);
        let sm = tfq.statements[0].media.as_ref().unwrap();
        assert_eq!(sm.payload.bytes(), b"jpegdata");
        assert!(matches!(
            &sm.payload,
            MediaPayload::Resolved { mime, .. } if mime == "image/jpeg"
        ));
    }

    #[test]
    fn decoded_media_gets_fresh_ids() {
        let quiz = sample_quiz();
        let original_id = quiz.questions[0]
            .as_multiple_choice()
            .unwrap()
            .media
            .as_ref()
            .unwrap()
            .id
            .clone();

        let decoded = QuizBundle::decode(&QuizBundle::encode(&quiz).unwrap()).unwrap();
        let decoded_media = decoded.questions[0]
            .as_multiple_choice()
            .unwrap()
            .media
            .as_ref()
            .unwrap();

        assert_ne!(decoded_media.id, original_id);
        // The bundle filename carries the original id and name.
        assert!(decoded_media.name.starts_with(&original_id));
        assert!(decoded_media.name.ends_with("_diagram.png"));
    }

    #[test]
    fn missing_config_is_a_named_fatal_error() {
        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = FileOptions::default();
        zip.start_file(QUESTIONS_ENTRY, options).unwrap();
        zip.write_all(b"[]").unwrap();
        let bytes = zip.finish().unwrap().into_inner();

        let err = QuizBundle::decode(&bytes).unwrap_err();
        assert!(matches!(err, BundleError::MissingEntry(CONFIG_ENTRY)));
        assert_eq!(err.to_string(), "bundle is missing config.json");
    }

    #[test]
    fn missing_questions_is_a_named_fatal_error() {
        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = FileOptions::default();
        zip.start_file(CONFIG_ENTRY, options).unwrap();
        zip.write_all(br#"{"title":"x"}"#).unwrap();
        let bytes = zip.finish().unwrap().into_inner();

        let err = QuizBundle::decode(&bytes).unwrap_err();
        assert!(matches!(err, BundleError::MissingEntry(QUESTIONS_ENTRY)));
    }

    #[test]
    fn dangling_media_reference_is_dropped_silently() {
        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = FileOptions::default();
        zip.start_file(CONFIG_ENTRY, options).unwrap();
        zip.write_all(br#"{"title":"x"}"#).unwrap();
        zip.start_file(QUESTIONS_ENTRY, options).unwrap();
        zip.write_all(
            br#"[{"id":"q1","type":"true-false","text":"t","media":"gone.png",
                 "statements":[{"id":"s1","text":"s","is_true":true}]}]"#,
        )
        .unwrap();
        let bytes = zip.finish().unwrap().into_inner();

        let quiz = QuizBundle::decode(&bytes).unwrap();
        assert!(quiz.questions[0].media().is_none());
    }

    #[test]
    fn unknown_extension_decodes_as_binary() {
        let mut item = media("blob.xyz", b"data");
        item.kind = MediaKind::Image; // authoring-side kind is not stored

        let quiz = Quiz {
            config: QuizConfig {
                title: "x".into(),
                ..QuizConfig::default()
            },
            questions: vec![Question::TrueFalse(TrueFalseQuestion {
                id: "q1".into(),
                text: String::new(),
                media: Some(item),
                statements: vec![Statement::new("s", true)],
            })],
        };

        let decoded = QuizBundle::decode(&QuizBundle::encode(&quiz).unwrap()).unwrap();
        let decoded_media = decoded.questions[0].media().unwrap();
        assert_eq!(decoded_media.kind, MediaKind::Binary);
        assert!(matches!(
            &decoded_media.payload,
            MediaPayload::Resolved { mime, .. } if mime == "application/octet-stream"
        ));
    }

    #[test]
    fn bundle_roundtrips_through_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("geography.zip");

        let quiz = sample_quiz();
        QuizBundle::write_to_path(&quiz, &path).unwrap();
        let decoded = QuizBundle::read_from_path(&path).unwrap();
        assert_eq!(decoded.config.title, "Geography");
        assert_eq!(decoded.questions.len(), 2);
    }
}
