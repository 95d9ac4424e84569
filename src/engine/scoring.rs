//! Scoring against the reconstructed arrangement.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::models::QuestionType;

use super::shuffle::{PresentedQuestion, QuestionBody, ShuffleRecord};

const NO_ANSWER: &str = "(no answer)";

/// A player's answer, tagged with the kind of question it answers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SubmittedAnswer {
    SingleChoice { label: Option<String> },
    MultiChoice { indices: BTreeSet<usize> },
    Word { text: String },
}

impl SubmittedAnswer {
    pub fn question_type(&self) -> QuestionType {
        match self {
            SubmittedAnswer::SingleChoice { .. } => QuestionType::SingleChoice,
            SubmittedAnswer::MultiChoice { .. } => QuestionType::MultiChoice,
            SubmittedAnswer::Word { .. } => QuestionType::Word,
        }
    }
}

/// One presented question's answer plus the answer key it was rendered with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerSlot {
    pub position: usize,
    #[serde(default)]
    pub answer_key: String,
    pub answer: SubmittedAnswer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Correct,
    Incorrect,
    /// The answer could not be judged; counts as zero.
    Indeterminate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub position: usize,
    pub prompt: String,
    pub verdict: Verdict,
    pub your_answer: String,
    pub expected_answer: String,
}

impl Outcome {
    pub fn is_correct(&self) -> bool {
        self.verdict == Verdict::Correct
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evaluation {
    pub score: usize,
    pub total: usize,
    pub outcomes: Vec<Outcome>,
    /// Set when no selection came back and questions were drawn afresh.
    #[serde(default)]
    pub reselected: bool,
}

/// Score every presented question against the slot at its position.
pub fn score(presented: &[PresentedQuestion], slots: &[AnswerSlot]) -> Evaluation {
    let outcomes: Vec<Outcome> = presented
        .iter()
        .map(|question| {
            let answer = slots
                .iter()
                .find(|slot| slot.position == question.position)
                .map(|slot| &slot.answer);
            judge(question, answer)
        })
        .collect();

    Evaluation {
        score: outcomes.iter().filter(|o| o.is_correct()).count(),
        total: outcomes.len(),
        outcomes,
        reselected: false,
    }
}

fn judge(question: &PresentedQuestion, answer: Option<&SubmittedAnswer>) -> Outcome {
    let outcome = |verdict, your_answer: String, expected_answer: String| Outcome {
        position: question.position,
        prompt: question.prompt.clone(),
        verdict,
        your_answer,
        expected_answer,
    };

    match (&question.record, answer) {
        (
            ShuffleRecord::SingleChoice { correct, .. },
            Some(SubmittedAnswer::SingleChoice { label }),
        ) => {
            let verdict = verdict_of(label.as_deref() == Some(correct.as_str()));
            let your_answer = label
                .as_deref()
                .map(|l| describe_label(&question.body, l))
                .unwrap_or_else(|| NO_ANSWER.to_string());
            outcome(verdict, your_answer, describe_label(&question.body, correct))
        }
        (
            ShuffleRecord::MultiChoice { correct, .. },
            Some(SubmittedAnswer::MultiChoice { indices }),
        ) => outcome(
            verdict_of(indices == correct),
            describe_indices(&question.body, indices),
            describe_indices(&question.body, correct),
        ),
        (ShuffleRecord::Word { accepted }, Some(SubmittedAnswer::Word { text })) => {
            let trimmed = text.trim();
            let your_answer = if trimmed.is_empty() {
                NO_ANSWER.to_string()
            } else {
                trimmed.to_string()
            };
            outcome(
                verdict_of(accepted.iter().any(|a| a == trimmed)),
                your_answer,
                accepted.join(" / "),
            )
        }
        (ShuffleRecord::Unsupported, _) => outcome(
            Verdict::Indeterminate,
            answer.map(describe_raw).unwrap_or_else(|| NO_ANSWER.to_string()),
            String::new(),
        ),
        (record, None) => outcome(
            Verdict::Incorrect,
            NO_ANSWER.to_string(),
            expected_for(&question.body, record),
        ),
        (record, Some(answer)) => {
            tracing::warn!(
                position = question.position,
                answered = ?answer.question_type(),
                "answer type does not match the question"
            );
            outcome(
                Verdict::Indeterminate,
                describe_raw(answer),
                expected_for(&question.body, record),
            )
        }
    }
}

fn verdict_of(correct: bool) -> Verdict {
    if correct {
        Verdict::Correct
    } else {
        Verdict::Incorrect
    }
}

fn expected_for(body: &QuestionBody, record: &ShuffleRecord) -> String {
    match record {
        ShuffleRecord::SingleChoice { correct, .. } => describe_label(body, correct),
        ShuffleRecord::MultiChoice { correct, .. } => describe_indices(body, correct),
        ShuffleRecord::Word { accepted } => accepted.join(" / "),
        ShuffleRecord::Unsupported => String::new(),
    }
}

/// `B) Paris` for a label of the presented options.
fn describe_label(body: &QuestionBody, label: &str) -> String {
    let text = match body {
        QuestionBody::SingleChoice { options } => options
            .iter()
            .find(|o| o.label == label)
            .map(|o| o.text.as_str()),
        _ => None,
    };

    match text {
        Some(text) => format!("{}) {}", label, text),
        None => label.to_string(),
    }
}

fn describe_indices(body: &QuestionBody, indices: &BTreeSet<usize>) -> String {
    if indices.is_empty() {
        return NO_ANSWER.to_string();
    }

    let options: &[String] = match body {
        QuestionBody::MultiChoice { options } => options.as_slice(),
        _ => &[],
    };

    indices
        .iter()
        .map(|&i| {
            options
                .get(i)
                .cloned()
                .unwrap_or_else(|| format!("#{}", i.saturating_add(1)))
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn describe_raw(answer: &SubmittedAnswer) -> String {
    match answer {
        SubmittedAnswer::SingleChoice { label } => {
            label.clone().unwrap_or_else(|| NO_ANSWER.to_string())
        }
        SubmittedAnswer::MultiChoice { indices } => indices
            .iter()
            .map(|i| format!("#{}", i.saturating_add(1)))
            .collect::<Vec<_>>()
            .join(", "),
        SubmittedAnswer::Word { text } => text.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LabeledOption, Question};

    fn single() -> PresentedQuestion {
        let question = Question::single_choice(
            "Capital?",
            &[("A", "Lyon"), ("B", "Paris"), ("C", "Nice")],
            "B",
        );
        let record = ShuffleRecord::SingleChoice {
            order: vec!["C".into(), "B".into(), "A".into()],
            correct: "B".into(),
        };
        PresentedQuestion::new(0, 0, &question, record)
    }

    fn multi() -> PresentedQuestion {
        let question = Question::multi_choice("Letters?", &["X", "Y", "Z"], &[0, 2]);
        let record = ShuffleRecord::MultiChoice {
            order: vec![2, 1, 0],
            correct: BTreeSet::from([0, 2]),
        };
        PresentedQuestion::new(1, 1, &question, record)
    }

    fn word() -> PresentedQuestion {
        let question = Question::word("Capital of France?", &["Paris"]);
        let record = ShuffleRecord::Word {
            accepted: vec!["Paris".to_string()],
        };
        PresentedQuestion::new(2, 2, &question, record)
    }

    fn slot(position: usize, answer: SubmittedAnswer) -> AnswerSlot {
        AnswerSlot {
            position,
            answer_key: String::new(),
            answer,
        }
    }

    fn text(text: &str) -> SubmittedAnswer {
        SubmittedAnswer::Word {
            text: text.to_string(),
        }
    }

    #[test]
    fn test_single_choice_uses_presented_labels() {
        let presented = single();
        assert_eq!(
            presented.body,
            QuestionBody::SingleChoice {
                options: vec![
                    LabeledOption::new("A", "Nice"),
                    LabeledOption::new("B", "Paris"),
                    LabeledOption::new("C", "Lyon"),
                ]
            }
        );

        let right = score(
            std::slice::from_ref(&presented),
            &[slot(
                0,
                SubmittedAnswer::SingleChoice {
                    label: Some("B".into()),
                },
            )],
        );
        assert_eq!((right.score, right.total), (1, 1));

        let wrong = score(
            &[presented],
            &[slot(
                0,
                SubmittedAnswer::SingleChoice {
                    label: Some("C".into()),
                },
            )],
        );
        assert_eq!(wrong.score, 0);
        assert_eq!(wrong.outcomes[0].your_answer, "C) Lyon");
        assert_eq!(wrong.outcomes[0].expected_answer, "B) Paris");
    }

    #[test]
    fn test_multi_choice_needs_exact_set() {
        let presented = multi();
        let answer = |indices: &[usize]| {
            vec![slot(
                1,
                SubmittedAnswer::MultiChoice {
                    indices: indices.iter().copied().collect(),
                },
            )]
        };

        let one = std::slice::from_ref(&presented);
        assert_eq!(score(one, &answer(&[2, 0])).score, 1);
        assert_eq!(score(one, &answer(&[0])).score, 0);
        assert_eq!(score(one, &answer(&[0, 1, 2])).score, 0);

        let partial = score(&[presented], &answer(&[0]));
        assert_eq!(partial.outcomes[0].your_answer, "Z");
        assert_eq!(partial.outcomes[0].expected_answer, "Z, X");
    }

    #[test]
    fn test_word_trims_but_keeps_case() {
        let presented = word();
        let presented = std::slice::from_ref(&presented);
        assert_eq!(score(presented, &[slot(2, text(" Paris "))]).score, 1);
        assert_eq!(score(presented, &[slot(2, text("paris"))]).score, 0);
        assert_eq!(score(presented, &[slot(2, text("Paris."))]).score, 0);
    }

    #[test]
    fn test_huge_indices_are_described_not_overflowed() {
        let huge = SubmittedAnswer::MultiChoice {
            indices: BTreeSet::from([1, usize::MAX]),
        };

        let wrong = score(&[multi()], &[slot(1, huge.clone())]);
        assert_eq!(wrong.score, 0);
        assert_eq!(wrong.outcomes[0].your_answer, format!("Y, #{}", usize::MAX));

        let mismatched = score(&[word()], &[slot(2, huge)]);
        assert_eq!(mismatched.outcomes[0].verdict, Verdict::Indeterminate);
        assert_eq!(
            mismatched.outcomes[0].your_answer,
            format!("#2, #{}", usize::MAX)
        );
    }

    #[test]
    fn test_missing_answer_scores_zero() {
        let evaluation = score(&[single(), multi(), word()], &[]);
        assert_eq!((evaluation.score, evaluation.total), (0, 3));
        assert!(evaluation
            .outcomes
            .iter()
            .all(|o| o.verdict == Verdict::Incorrect && o.your_answer == NO_ANSWER));
    }

    #[test]
    fn test_type_mismatch_is_indeterminate_and_scoring_continues() {
        let evaluation = score(
            &[single(), word()],
            &[slot(0, text("B")), slot(2, text("Paris"))],
        );
        assert_eq!(evaluation.outcomes[0].verdict, Verdict::Indeterminate);
        assert_eq!(evaluation.outcomes[1].verdict, Verdict::Correct);
        assert_eq!((evaluation.score, evaluation.total), (1, 2));
    }

    #[test]
    fn test_unsupported_question_is_indeterminate() {
        let question = Question {
            prompt: "Discuss.".to_string(),
            kind: crate::models::QuestionKind::Unsupported {
                declared: "essay".to_string(),
            },
        };
        let presented = PresentedQuestion::new(0, 0, &question, ShuffleRecord::Unsupported);
        let evaluation = score(&[presented], &[slot(0, text("words"))]);
        assert_eq!(evaluation.outcomes[0].verdict, Verdict::Indeterminate);
        assert_eq!((evaluation.score, evaluation.total), (0, 1));
    }

    #[test]
    fn test_slot_serialization() {
        let answer = SubmittedAnswer::SingleChoice {
            label: Some("A".into()),
        };
        let json = serde_json::to_string(&slot(0, answer)).unwrap();
        assert!(json.contains("\"type\":\"single_choice\""));
    }
}
