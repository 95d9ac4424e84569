use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Labels a single-choice question may use, in presentation order.
pub const CHOICE_LABELS: [&str; 4] = ["A", "B", "C", "D"];

/// Title used when a document does not name its quiz.
pub const DEFAULT_TITLE: &str = "Quiz";

/// A quiz loaded for a single request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quiz {
    pub title: String,
    pub questions: Vec<Question>,
}

impl Quiz {
    pub fn new(title: impl Into<String>, questions: Vec<Question>) -> Self {
        Self {
            title: title.into(),
            questions,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub prompt: String,
    pub kind: QuestionKind,
}

/// Question content together with its authored answer key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuestionKind {
    /// One correct label out of up to four labeled options.
    SingleChoice {
        options: Vec<LabeledOption>,
        correct: String,
    },
    /// Any subset of an ordered option list; `correct` holds option indices.
    MultiChoice {
        options: Vec<String>,
        correct: BTreeSet<usize>,
    },
    /// Free text matched against literal accepted answers.
    Word { accepted: Vec<String> },
    /// A declared type nothing knows how to present or score.
    Unsupported { declared: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabeledOption {
    pub label: String,
    pub text: String,
}

impl LabeledOption {
    pub fn new(label: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            text: text.into(),
        }
    }
}

/// The kind of a question without its content, used to tag answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    SingleChoice,
    MultiChoice,
    Word,
    Unsupported,
}

impl QuestionKind {
    pub fn question_type(&self) -> QuestionType {
        match self {
            QuestionKind::SingleChoice { .. } => QuestionType::SingleChoice,
            QuestionKind::MultiChoice { .. } => QuestionType::MultiChoice,
            QuestionKind::Word { .. } => QuestionType::Word,
            QuestionKind::Unsupported { .. } => QuestionType::Unsupported,
        }
    }
}

impl Question {
    pub fn single_choice(prompt: &str, options: &[(&str, &str)], correct: &str) -> Self {
        Self {
            prompt: prompt.to_string(),
            kind: QuestionKind::SingleChoice {
                options: options
                    .iter()
                    .map(|(label, text)| LabeledOption::new(*label, *text))
                    .collect(),
                correct: correct.to_string(),
            },
        }
    }

    pub fn multi_choice(prompt: &str, options: &[&str], correct: &[usize]) -> Self {
        Self {
            prompt: prompt.to_string(),
            kind: QuestionKind::MultiChoice {
                options: options.iter().map(|o| o.to_string()).collect(),
                correct: correct.iter().copied().collect(),
            },
        }
    }

    pub fn word(prompt: &str, accepted: &[&str]) -> Self {
        Self {
            prompt: prompt.to_string(),
            kind: QuestionKind::Word {
                accepted: accepted.iter().map(|a| a.to_string()).collect(),
            },
        }
    }

    pub fn question_type(&self) -> QuestionType {
        self.kind.question_type()
    }
}
