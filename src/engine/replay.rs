//! Replay token codec.
//!
//! A rendered attempt hands the client two kinds of opaque text: the
//! selection list (`"4,0,7"`, original pool indices in presentation order)
//! and one answer key per presented question. The client returns both
//! untouched with its answers, and the server rebuilds the exact
//! arrangement from them without remembering anything about the render.
//!
//! Answer keys:
//!
//! - single choice: original labels in presented order, then the correct
//!   presented label, e.g. `CAB:A`
//! - multiple choice: the permutation, then the correct presented indices,
//!   e.g. `2,0,1:0,2`
//! - word and unsupported questions: empty
//!
//! # Trust boundary
//!
//! Nothing here is signed or encrypted. The answer key is readable by the
//! client and a client can forge it. Statelessness is bought with that
//! disclosure, and the codec only checks that a key is well formed for the
//! question it claims to describe. Hiding the key requires server-side
//! attempt storage, which this crate does not have.

use std::collections::BTreeSet;

use thiserror::Error;

use crate::models::{Question, QuestionKind};

use super::selection::Selection;
use super::shuffle::ShuffleRecord;

const SELECTION_SEPARATOR: &str = ",";
const KEY_SEPARATOR: char = ':';

/// Replay data that cannot be turned back into an attempt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReplayTokenError {
    #[error("selection entry '{entry}' is not a question index")]
    NonNumericIndex { entry: String },

    #[error("selection index {index} is outside a pool of {pool_len} questions")]
    IndexOutOfRange { index: usize, pool_len: usize },

    #[error("selection repeats index {index}")]
    DuplicateIndex { index: usize },

    #[error("selection has {count} indices but at most {cap} are presented")]
    TooManyIndices { count: usize, cap: usize },

    #[error("answer key for question {} is missing", .position + 1)]
    MissingAnswerKey { position: usize },

    #[error("answer key for question {} is malformed: {reason}", .position + 1)]
    MalformedAnswerKey { position: usize, reason: String },
}

pub fn encode_selection(selection: &Selection) -> String {
    join_indices(selection.indices().iter())
}

/// Parse a selection list. Blank or absent input yields `None`.
pub fn decode_selection(raw: Option<&str>) -> Result<Option<Vec<usize>>, ReplayTokenError> {
    let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
        return Ok(None);
    };

    raw.split(SELECTION_SEPARATOR)
        .map(|entry| {
            let entry = entry.trim();
            entry
                .parse::<usize>()
                .map_err(|_| ReplayTokenError::NonNumericIndex {
                    entry: entry.to_string(),
                })
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Some)
}

impl ShuffleRecord {
    /// The answer key carried next to the question's fields.
    pub fn encode(&self) -> String {
        match self {
            ShuffleRecord::SingleChoice { order, correct } => {
                format!("{}{}{}", order.concat(), KEY_SEPARATOR, correct)
            }
            ShuffleRecord::MultiChoice { order, correct } => format!(
                "{}{}{}",
                join_indices(order.iter()),
                KEY_SEPARATOR,
                join_indices(correct.iter())
            ),
            ShuffleRecord::Word { .. } | ShuffleRecord::Unsupported => String::new(),
        }
    }

    /// Parse an answer key as the arrangement of `question`.
    ///
    /// The key must be a permutation of the question's own options and name
    /// only options that exist; anything else is rejected with a reason.
    pub fn decode(question: &Question, raw: &str) -> Result<Self, String> {
        let raw = raw.trim();

        match &question.kind {
            QuestionKind::SingleChoice { options, .. } => {
                let (order, correct) = split_key(raw)?;
                let order: Vec<String> = order.chars().map(String::from).collect();

                let mut expected: Vec<&str> = options.iter().map(|o| o.label.as_str()).collect();
                let mut given: Vec<&str> = order.iter().map(String::as_str).collect();
                expected.sort_unstable();
                given.sort_unstable();
                if expected != given {
                    return Err(format!(
                        "'{}' is not an ordering of labels {}",
                        order.concat(),
                        expected.concat()
                    ));
                }

                if !expected.contains(&correct) {
                    return Err(format!("'{}' is not one of the option labels", correct));
                }

                Ok(ShuffleRecord::SingleChoice {
                    order,
                    correct: correct.to_string(),
                })
            }
            QuestionKind::MultiChoice { options, .. } => {
                let (order, correct) = split_key(raw)?;
                let order = parse_indices(order)?;
                let correct: BTreeSet<usize> = parse_indices(correct)?.into_iter().collect();

                let mut sorted = order.clone();
                sorted.sort_unstable();
                if !sorted.iter().copied().eq(0..options.len()) {
                    return Err(format!(
                        "'{}' is not a permutation of {} options",
                        join_indices(order.iter()),
                        options.len()
                    ));
                }

                if let Some(index) = correct.iter().find(|&&i| i >= options.len()) {
                    return Err(format!("correct index {} is outside the options", index));
                }

                Ok(ShuffleRecord::MultiChoice { order, correct })
            }
            QuestionKind::Word { accepted } => {
                expect_empty(raw)?;
                Ok(ShuffleRecord::Word {
                    accepted: accepted.clone(),
                })
            }
            QuestionKind::Unsupported { .. } => {
                expect_empty(raw)?;
                Ok(ShuffleRecord::Unsupported)
            }
        }
    }
}

fn split_key(raw: &str) -> Result<(&str, &str), String> {
    raw.split_once(KEY_SEPARATOR)
        .ok_or_else(|| format!("expected '<order>{}<answer>'", KEY_SEPARATOR))
}

fn expect_empty(raw: &str) -> Result<(), String> {
    if raw.is_empty() {
        Ok(())
    } else {
        Err("this question type carries no answer key".to_string())
    }
}

fn parse_indices(raw: &str) -> Result<Vec<usize>, String> {
    if raw.is_empty() {
        return Ok(Vec::new());
    }

    raw.split(SELECTION_SEPARATOR)
        .map(|entry| {
            entry
                .trim()
                .parse::<usize>()
                .map_err(|_| format!("'{}' is not an index", entry))
        })
        .collect()
}

fn join_indices<'a>(indices: impl Iterator<Item = &'a usize>) -> String {
    indices
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(SELECTION_SEPARATOR)
}
