//! Server state.
//!
//! Everything here is fixed at startup and shared read-only by every
//! connection. Attempts in flight live on the client, not in this struct.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use crate::data::QuizLibrary;
use crate::engine::DEFAULT_QUESTION_CAP;
use crate::history::{JsonLinesHistory, ResultSink};
use crate::protocol::DEFAULT_PORT;

/// Settings the server is started with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    /// Directory holding one JSON document per quiz.
    pub quiz_dir: PathBuf,
    /// Maximum number of questions per attempt.
    pub question_cap: usize,
    /// File scored attempts are appended to, if any.
    pub history_path: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            quiz_dir: PathBuf::from("quizzes"),
            question_cap: DEFAULT_QUESTION_CAP,
            history_path: None,
        }
    }
}

/// Main server state.
pub struct ServerState {
    /// Where quiz documents are loaded from.
    pub library: QuizLibrary,
    /// Maximum number of questions per attempt.
    pub question_cap: usize,
    /// Where scored attempts are recorded.
    pub history: Option<Arc<dyn ResultSink>>,
    /// Server port (for logging).
    pub port: u16,
}

impl ServerState {
    pub fn new(config: &ServerConfig) -> Self {
        let history = config.history_path.as_ref().map(|path| {
            let history = JsonLinesHistory::new(path);
            tracing::info!(path = %history.path().display(), "recording results");
            Arc::new(history) as Arc<dyn ResultSink>
        });

        Self {
            library: QuizLibrary::new(&config.quiz_dir),
            question_cap: config.question_cap.max(1),
            history,
            port: config.port,
        }
    }
}

impl fmt::Debug for ServerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerState")
            .field("library", &self.library)
            .field("question_cap", &self.question_cap)
            .field("history", &self.history.is_some())
            .field("port", &self.port)
            .finish()
    }
}
