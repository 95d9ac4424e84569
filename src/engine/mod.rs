//! Stateless quiz engine.
//!
//! [`render`] picks and shuffles questions for one attempt and returns the
//! replay data the client must send back. [`evaluate`] rebuilds that attempt
//! from the replay data alone and scores it. Nothing is kept between the two
//! calls, and the randomness source is always passed in.

pub mod replay;
pub mod scoring;
pub mod selection;
pub mod shuffle;

use rand::Rng;

use crate::models::Quiz;

pub use replay::{decode_selection, encode_selection, ReplayTokenError};
pub use scoring::{AnswerSlot, Evaluation, Outcome, SubmittedAnswer, Verdict};
pub use selection::{Selection, DEFAULT_QUESTION_CAP};
pub use shuffle::{PresentedQuestion, QuestionBody, ShuffleRecord};

/// One attempt as shown to the player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub title: String,
    pub selection: Selection,
    pub questions: Vec<PresentedQuestion>,
}

impl Rendered {
    /// The selection list carried by the client.
    pub fn selection_token(&self) -> String {
        encode_selection(&self.selection)
    }
}

/// What a client sends back for an attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Submission {
    pub selection: Option<String>,
    pub answers: Vec<AnswerSlot>,
}

/// Select up to `cap` questions and shuffle each one.
pub fn render<R: Rng + ?Sized>(quiz: &Quiz, cap: usize, rng: &mut R) -> Rendered {
    let selection = Selection::draw(quiz.questions.len(), cap, rng);

    let questions = selection
        .pick(&quiz.questions)
        .enumerate()
        .map(|(position, (pool_index, question))| {
            let record = shuffle::shuffle(question, rng);
            PresentedQuestion::new(position, pool_index, question, record)
        })
        .collect();

    Rendered {
        title: quiz.title.clone(),
        selection,
        questions,
    }
}

/// Rebuild the attempt described by `submission` and score it.
///
/// When the submission carries no selection list a fresh attempt is drawn
/// and scored instead; the result is flagged `reselected` because the scored
/// questions need not be the ones the player saw. A selection list or answer
/// key that is present but malformed fails the whole submission.
pub fn evaluate<R: Rng + ?Sized>(
    quiz: &Quiz,
    submission: &Submission,
    cap: usize,
    rng: &mut R,
) -> Result<Evaluation, ReplayTokenError> {
    let Some(indices) = decode_selection(submission.selection.as_deref())? else {
        let rendered = render(quiz, cap, rng);
        let mut evaluation = scoring::score(&rendered.questions, &submission.answers);
        if !rendered.questions.is_empty() {
            tracing::warn!(
                quiz = %quiz.title,
                "submission carried no selection, scoring a fresh draw"
            );
            evaluation.reselected = true;
        }
        return Ok(evaluation);
    };

    let presented = reconstruct(quiz, indices, &submission.answers, cap)?;
    Ok(scoring::score(&presented, &submission.answers))
}

/// Rebuild presented questions from a selection and the slots' answer keys.
pub fn reconstruct(
    quiz: &Quiz,
    indices: Vec<usize>,
    slots: &[AnswerSlot],
    cap: usize,
) -> Result<Vec<PresentedQuestion>, ReplayTokenError> {
    let selection = Selection::from_indices(indices, quiz.questions.len(), cap)?;

    selection
        .pick(&quiz.questions)
        .enumerate()
        .map(|(position, (pool_index, question))| -> Result<_, ReplayTokenError> {
            let key = slots
                .iter()
                .find(|slot| slot.position == position)
                .map(|slot| slot.answer_key.as_str());

            let record = match key {
                Some(raw) => ShuffleRecord::decode(question, raw)
                    .map_err(|reason| ReplayTokenError::MalformedAnswerKey { position, reason })?,
                // Word questions have an empty key, so a missing slot is fine.
                None => ShuffleRecord::decode(question, "")
                    .map_err(|_| ReplayTokenError::MissingAnswerKey { position })?,
            };

            Ok(PresentedQuestion::new(position, pool_index, question, record))
        })
        .collect()
}
