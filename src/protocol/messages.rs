//! Protocol messages for client-server communication.
//!
//! All messages are serialized as JSON over WebSocket. The server keeps no
//! record of a rendered attempt: `QuizPresented` hands the client the
//! selection list and one answer key per question, and `SubmitQuiz` must
//! carry them back unchanged.

use serde::{Deserialize, Serialize};

use crate::engine::{AnswerSlot, Outcome, PresentedQuestion, QuestionBody};

/// Messages sent from client to server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    /// Client wants to join with a username.
    Join { username: String },

    /// Client wants the names of the available quizzes.
    ListQuizzes,

    /// Client wants a fresh attempt at a quiz.
    StartQuiz { quiz: String },

    /// Client submits every answer of an attempt.
    SubmitQuiz {
        quiz: String,
        /// Selection list exactly as received in `QuizPresented`.
        #[serde(default)]
        selection: Option<String>,
        answers: Vec<AnswerSlot>,
        #[serde(default)]
        elapsed_seconds: Option<u64>,
    },
}

/// Messages sent from server to client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
    /// Connection accepted, waiting for Join message.
    ConnectionAck,

    /// Username accepted.
    JoinAccepted { username: String },

    /// Username rejected (invalid length).
    JoinRejected { reason: String },

    /// Quizzes the server can present.
    QuizList { quizzes: Vec<String> },

    /// A rendered attempt.
    QuizPresented {
        quiz: String,
        title: String,
        selection: String,
        questions: Vec<QuestionView>,
    },

    /// Scored attempt.
    QuizResults {
        quiz: String,
        score: usize,
        total: usize,
        outcomes: Vec<Outcome>,
        /// The server had no selection to replay and scored a fresh draw.
        reselected: bool,
    },

    /// The request failed and produced nothing.
    Error { kind: ErrorKind, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The quiz document is missing or malformed.
    Configuration,
    /// The replay data in a submission is malformed.
    ReplayToken,
    /// The request failed inside the server.
    Internal,
}

/// A presented question as sent to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionView {
    pub position: usize,
    pub prompt: String,
    /// Opaque; returned with this question's answer.
    pub answer_key: String,
    pub body: QuestionBody,
}

impl From<&PresentedQuestion> for QuestionView {
    fn from(question: &PresentedQuestion) -> Self {
        Self {
            position: question.position,
            prompt: question.prompt.clone(),
            answer_key: question.record.encode(),
            body: question.body.clone(),
        }
    }
}

/// Username validation constants.
pub const USERNAME_MIN_LENGTH: usize = 3;
pub const USERNAME_MAX_LENGTH: usize = 16;

/// Identity used for submissions from clients that never joined.
pub const ANONYMOUS: &str = "anonymous";

/// Default server port.
pub const DEFAULT_PORT: u16 = 8712;

/// Validates a username according to the rules.
///
/// Returns `Ok(())` if valid, or `Err` with an error message.
pub fn validate_username(username: &str) -> Result<(), &'static str> {
    let length = username.trim().chars().count();

    if length < USERNAME_MIN_LENGTH {
        return Err("Username must be at least 3 characters");
    }

    if length > USERNAME_MAX_LENGTH {
        return Err("Username must be at most 16 characters");
    }

    Ok(())
}
