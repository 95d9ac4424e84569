//! WebSocket server implementation.
//!
//! Each message is answered on its own. A connection remembers only the
//! username it joined with; rendered attempts travel to the client and come
//! back with the submission.

use std::net::SocketAddr;
use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tracing::Instrument;
use uuid::Uuid;

use crate::engine::{self, Submission};
use crate::history::ResultRecord;
use crate::protocol::{
    validate_username, ClientMessage, ErrorKind, QuestionView, ServerMessage, ANONYMOUS,
};
use crate::QuizError;

use super::state::{ServerConfig, ServerState};

/// Shared, read-only server state.
type SharedState = Arc<ServerState>;

/// Run the quiz server until Ctrl-C.
pub async fn run(config: ServerConfig) -> Result<(), QuizError> {
    let state = Arc::new(ServerState::new(&config));

    let quizzes = state.library.list()?;
    tracing::info!(
        count = quizzes.len(),
        dir = %state.library.dir().display(),
        cap = state.question_cap,
        "loaded quiz library"
    );

    let addr = format!("0.0.0.0:{}", state.port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("server listening on {}", addr);

    loop {
        tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok((stream, peer)) => {
                    let span = tracing::info_span!("connection", id = %Uuid::new_v4(), %peer);
                    tokio::spawn(
                        handle_connection(stream, peer, Arc::clone(&state)).instrument(span),
                    );
                }
                Err(e) => {
                    tracing::warn!("failed to accept connection: {}", e);
                }
            },
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("shutting down");
                break;
            }
        }
    }

    Ok(())
}

/// Handle a single WebSocket connection.
async fn handle_connection(stream: TcpStream, peer: SocketAddr, state: SharedState) {
    let ws_stream = match tokio_tungstenite::accept_async(stream).await {
        Ok(ws) => ws,
        Err(e) => {
            tracing::warn!("WebSocket handshake failed: {}", e);
            return;
        }
    };
    tracing::debug!(%peer, "connected");

    let (mut ws_sender, mut ws_receiver) = ws_stream.split();

    // Create channel for sending messages to this client
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();

    let send_task = tokio::spawn(
        async move {
            while let Some(msg) = rx.recv().await {
                let json = match serde_json::to_string(&msg) {
                    Ok(json) => json,
                    Err(e) => {
                        tracing::error!("could not encode message: {}", e);
                        continue;
                    }
                };
                if ws_sender.send(Message::Text(json.into())).await.is_err() {
                    break;
                }
            }
        }
        .in_current_span(),
    );

    let _ = tx.send(ServerMessage::ConnectionAck);

    let mut identity: Option<String> = None;

    while let Some(msg) = ws_receiver.next().await {
        let text = match msg {
            Ok(Message::Text(text)) => text.to_string(),
            Ok(Message::Close(_)) => break,
            Err(e) => {
                tracing::debug!("receive failed: {}", e);
                break;
            }
            _ => continue,
        };

        let client_msg: ClientMessage = match serde_json::from_str(&text) {
            Ok(m) => m,
            Err(e) => {
                tracing::warn!("ignoring malformed message: {}", e);
                continue;
            }
        };

        identity = handle_client_message(&state, identity, client_msg, &tx).await;
    }

    tracing::debug!(username = identity.as_deref().unwrap_or(ANONYMOUS), "disconnected");
    send_task.abort();
}

/// Handle a single client message, returning the connection's identity.
async fn handle_client_message(
    state: &SharedState,
    mut identity: Option<String>,
    msg: ClientMessage,
    tx: &mpsc::UnboundedSender<ServerMessage>,
) -> Option<String> {
    let previous = identity.clone();

    // Quiz documents are read from disk.
    let task_state = Arc::clone(state);
    let task = tokio::task::spawn_blocking(move || {
        let reply = respond(&task_state, &mut identity, msg);
        (identity, reply)
    });

    let (identity, reply) = match task.await {
        Ok(result) => result,
        Err(e) => {
            tracing::error!("request task failed: {}", e);
            let _ = tx.send(ServerMessage::Error {
                kind: ErrorKind::Internal,
                message: "the server could not handle this request".to_string(),
            });
            return previous;
        }
    };

    let _ = tx.send(reply.message);

    if let Some(record) = reply.record {
        let _ = record_result(state, record);
    }

    identity
}

/// What answering one message produced.
#[derive(Debug)]
pub(crate) struct Reply {
    pub message: ServerMessage,
    /// Scored attempt to hand to the result sink.
    pub record: Option<ResultRecord>,
}

impl From<ServerMessage> for Reply {
    fn from(message: ServerMessage) -> Self {
        Self {
            message,
            record: None,
        }
    }
}

/// Answer one client message.
pub(crate) fn respond(
    state: &ServerState,
    identity: &mut Option<String>,
    msg: ClientMessage,
) -> Reply {
    match msg {
        ClientMessage::Join { username } => handle_join(username, identity).into(),
        ClientMessage::ListQuizzes => handle_list(state).into(),
        ClientMessage::StartQuiz { quiz } => handle_start(state, &quiz).into(),
        ClientMessage::SubmitQuiz {
            quiz,
            selection,
            answers,
            elapsed_seconds,
        } => {
            let identity = identity.as_deref().unwrap_or(ANONYMOUS);
            let submission = Submission { selection, answers };
            handle_submit(state, identity, &quiz, &submission, elapsed_seconds)
        }
    }
}

/// Handle a Join message.
fn handle_join(username: String, identity: &mut Option<String>) -> ServerMessage {
    let username = username.trim().to_string();

    if let Err(reason) = validate_username(&username) {
        return ServerMessage::JoinRejected {
            reason: reason.to_string(),
        };
    }

    tracing::info!(%username, "joined");
    *identity = Some(username.clone());
    ServerMessage::JoinAccepted { username }
}

fn handle_list(state: &ServerState) -> ServerMessage {
    match state.library.list() {
        Ok(quizzes) => ServerMessage::QuizList { quizzes },
        Err(e) => {
            tracing::error!("could not list quizzes: {}", e);
            configuration_error(e)
        }
    }
}

/// Render a fresh attempt at `quiz`.
fn handle_start(state: &ServerState, quiz: &str) -> ServerMessage {
    let document = match state.library.load(quiz) {
        Ok(document) => document,
        Err(e) => {
            tracing::warn!(quiz, "could not load quiz: {}", e);
            return configuration_error(e);
        }
    };

    let rendered = engine::render(&document, state.question_cap, &mut rand::thread_rng());
    tracing::info!(
        quiz,
        presented = rendered.questions.len(),
        pool = document.questions.len(),
        "rendered attempt"
    );

    ServerMessage::QuizPresented {
        quiz: quiz.to_string(),
        title: rendered.title.clone(),
        selection: rendered.selection_token(),
        questions: rendered.questions.iter().map(QuestionView::from).collect(),
    }
}

/// Score a submitted attempt at `quiz`.
fn handle_submit(
    state: &ServerState,
    identity: &str,
    quiz: &str,
    submission: &Submission,
    elapsed_seconds: Option<u64>,
) -> Reply {
    let document = match state.library.load(quiz) {
        Ok(document) => document,
        Err(e) => {
            tracing::warn!(quiz, "could not load quiz: {}", e);
            return configuration_error(e).into();
        }
    };

    let evaluation = match engine::evaluate(
        &document,
        submission,
        state.question_cap,
        &mut rand::thread_rng(),
    ) {
        Ok(evaluation) => evaluation,
        Err(e) => {
            tracing::warn!(quiz, %identity, "rejected submission: {}", e);
            return ServerMessage::Error {
                kind: ErrorKind::ReplayToken,
                message: e.to_string(),
            }
            .into();
        }
    };

    tracing::info!(
        quiz,
        %identity,
        score = evaluation.score,
        total = evaluation.total,
        reselected = evaluation.reselected,
        "scored attempt"
    );

    Reply {
        record: Some(ResultRecord::new(
            identity,
            quiz,
            evaluation.score,
            evaluation.total,
            elapsed_seconds,
        )),
        message: ServerMessage::QuizResults {
            quiz: quiz.to_string(),
            score: evaluation.score,
            total: evaluation.total,
            outcomes: evaluation.outcomes,
            reselected: evaluation.reselected,
        },
    }
}

/// Hand a scored attempt to the result sink without waiting for it.
fn record_result(state: &SharedState, record: ResultRecord) -> Option<JoinHandle<()>> {
    let sink = state.history.clone()?;

    Some(tokio::task::spawn_blocking(move || {
        if let Err(e) = sink.record(&record) {
            tracing::warn!(
                identity = %record.identity,
                quiz = %record.quiz,
                "could not record result: {}",
                e
            );
        }
    }))
}

fn configuration_error(e: impl std::fmt::Display) -> ServerMessage {
    ServerMessage::Error {
        kind: ErrorKind::Configuration,
        message: e.to_string(),
    }
}
