//! Answer shuffling.
//!
//! Shuffling never touches the pool question. It draws a [`ShuffleRecord`]
//! (the permutation plus the answer key under that permutation), and the
//! record is applied to the pool question to build a separate presentation
//! view. Submissions rebuild the same view from the decoded record.

use std::collections::BTreeSet;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::models::{LabeledOption, Question, QuestionKind};

/// How one question was rearranged for presentation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShuffleRecord {
    /// `order[i]` is the original label shown under the i-th presented label.
    SingleChoice { order: Vec<String>, correct: String },
    /// `order[i]` is the original index shown at presented index `i`.
    MultiChoice {
        order: Vec<usize>,
        correct: BTreeSet<usize>,
    },
    /// Word questions are not shuffled; the accepted answers are the key.
    Word { accepted: Vec<String> },
    Unsupported,
}

/// Question content as shown to the player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QuestionBody {
    SingleChoice { options: Vec<LabeledOption> },
    MultiChoice { options: Vec<String> },
    Word,
    Unsupported { declared: String },
}

impl QuestionBody {
    /// Number of options a player may legitimately pick from.
    pub fn option_count(&self) -> usize {
        match self {
            QuestionBody::SingleChoice { options } => options.len(),
            QuestionBody::MultiChoice { options } => options.len(),
            QuestionBody::Word | QuestionBody::Unsupported { .. } => 0,
        }
    }
}

/// A pool question rearranged for one attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresentedQuestion {
    /// Position in the attempt, starting at 0.
    pub position: usize,
    /// Index of the source question in the pool.
    pub pool_index: usize,
    pub prompt: String,
    pub body: QuestionBody,
    pub record: ShuffleRecord,
}

impl PresentedQuestion {
    /// Apply `record` to `question`. The record must come from [`shuffle`]
    /// or from decoding against this same question.
    pub fn new(
        position: usize,
        pool_index: usize,
        question: &Question,
        record: ShuffleRecord,
    ) -> Self {
        let body = match (&question.kind, &record) {
            (
                QuestionKind::SingleChoice { options, .. },
                ShuffleRecord::SingleChoice { order, .. },
            ) => {
                QuestionBody::SingleChoice {
                    options: options
                        .iter()
                        .zip(order)
                        .filter_map(|(slot, original)| {
                            options
                                .iter()
                                .find(|o| &o.label == original)
                                .map(|o| LabeledOption::new(slot.label.clone(), o.text.clone()))
                        })
                        .collect(),
                }
            }
            (
                QuestionKind::MultiChoice { options, .. },
                ShuffleRecord::MultiChoice { order, .. },
            ) => {
                QuestionBody::MultiChoice {
                    options: order
                        .iter()
                        .filter_map(|&i| options.get(i).cloned())
                        .collect(),
                }
            }
            (QuestionKind::Word { .. }, _) => QuestionBody::Word,
            (QuestionKind::Unsupported { declared }, _) => QuestionBody::Unsupported {
                declared: declared.clone(),
            },
            (kind, _) => QuestionBody::Unsupported {
                declared: format!("{:?}", kind.question_type()),
            },
        };

        Self {
            position,
            pool_index,
            prompt: question.prompt.clone(),
            body,
            record,
        }
    }
}

/// Draw a fresh arrangement for `question`.
pub fn shuffle<R: Rng + ?Sized>(question: &Question, rng: &mut R) -> ShuffleRecord {
    match &question.kind {
        QuestionKind::SingleChoice { options, correct } => {
            let labels: Vec<&String> = options.iter().map(|o| &o.label).collect();
            let mut order: Vec<String> = labels.iter().map(|l| l.to_string()).collect();
            order.shuffle(rng);

            // The correct answer now sits under whichever label received it.
            let correct = labels
                .iter()
                .zip(&order)
                .find(|(_, original)| *original == correct)
                .map(|(label, _)| label.to_string())
                .unwrap_or_else(|| correct.clone());

            ShuffleRecord::SingleChoice { order, correct }
        }
        QuestionKind::MultiChoice { options, correct } => {
            let mut order: Vec<usize> = (0..options.len()).collect();
            order.shuffle(rng);
            let correct = remap_by_text(options, &order, correct);
            ShuffleRecord::MultiChoice { order, correct }
        }
        QuestionKind::Word { accepted } => ShuffleRecord::Word {
            accepted: accepted.clone(),
        },
        QuestionKind::Unsupported { .. } => ShuffleRecord::Unsupported,
    }
}

/// Find each correct option's new index by its text. Repeated texts all
/// resolve to the first presented match.
fn remap_by_text(
    options: &[String],
    order: &[usize],
    correct: &BTreeSet<usize>,
) -> BTreeSet<usize> {
    let presented: Vec<&String> = order.iter().filter_map(|&i| options.get(i)).collect();

    correct
        .iter()
        .filter_map(|&i| options.get(i))
        .filter_map(|text| presented.iter().position(|p| *p == text))
        .collect()
}
