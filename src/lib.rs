//! # quizdeck
//!
//! A stateless quiz engine with a WebSocket server and terminal client.
//!
//! Each attempt draws a random subset of a quiz's questions and shuffles
//! every choice question's options. The server remembers nothing about the
//! attempt: the client carries the replay data back with its answers and
//! the server rebuilds the attempt from it to score.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use quizdeck::data::QuizLibrary;
//! use quizdeck::engine::{self, Submission, DEFAULT_QUESTION_CAP};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let quiz = QuizLibrary::new("quizzes").load("geography")?;
//!     let mut rng = rand::thread_rng();
//!
//!     let rendered = engine::render(&quiz, DEFAULT_QUESTION_CAP, &mut rng);
//!     let submission = Submission {
//!         selection: Some(rendered.selection_token()),
//!         answers: Vec::new(),
//!     };
//!
//!     let evaluation = engine::evaluate(&quiz, &submission, DEFAULT_QUESTION_CAP, &mut rng)?;
//!     println!("{} / {}", evaluation.score, evaluation.total);
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod data;
pub mod engine;
pub mod history;
pub mod models;
pub mod protocol;
pub mod server;

use std::io;

use thiserror::Error;

pub use data::{LoadError, QuizLibrary};
pub use engine::{Evaluation, ReplayTokenError};
pub use models::{Question, QuestionKind, Quiz};

/// Error type for running the server or client.
#[derive(Debug, Error)]
pub enum QuizError {
    /// Error loading quiz documents.
    #[error("failed to load quizzes: {0}")]
    Load(#[from] LoadError),

    /// IO error while serving or drawing the terminal.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The client could not reach the server.
    #[error("failed to connect to {url}: {source}")]
    Connect {
        url: String,
        #[source]
        source: tokio_tungstenite::tungstenite::Error,
    },
}
