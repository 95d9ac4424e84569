//! WebSocket client implementation.

use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::{mpsc, Mutex};
use tokio_tungstenite::tungstenite::Message;

use crate::protocol::{ClientMessage, ServerMessage};
use crate::QuizError;

use super::state::{ClientApp, ClientState, Draft};
use super::terminal::TerminalGuard;
use super::ui;

/// Shared client app state.
type SharedApp = Arc<Mutex<ClientApp>>;

type Outbox = mpsc::UnboundedSender<ClientMessage>;

/// Run the quiz client.
pub async fn run(host: String, port: u16) -> Result<(), QuizError> {
    let app = Arc::new(Mutex::new(ClientApp::new(host.clone(), port)));

    let url = format!("ws://{}:{}", host, port);
    println!("Connecting to {}...", url);

    let (ws_stream, _) = tokio_tungstenite::connect_async(&url)
        .await
        .map_err(|source| QuizError::Connect { url, source })?;

    let (mut ws_sender, mut ws_receiver) = ws_stream.split();

    // Create channel for outgoing messages
    let (tx, mut rx) = mpsc::unbounded_channel::<ClientMessage>();

    // Spawn task to send messages
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let Ok(json) = serde_json::to_string(&msg) else {
                continue;
            };
            if ws_sender.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
    });

    // Spawn task to receive messages
    let app_clone = Arc::clone(&app);
    let reply_tx = tx.clone();
    let recv_task = tokio::spawn(async move {
        while let Some(msg) = ws_receiver.next().await {
            let text = match msg {
                Ok(Message::Text(text)) => text.to_string(),
                Ok(Message::Close(_)) => {
                    let mut app = app_clone.lock().await;
                    app.disconnect("Connection closed by server".to_string());
                    break;
                }
                Err(e) => {
                    let mut app = app_clone.lock().await;
                    app.disconnect(format!("Connection error: {}", e));
                    break;
                }
                _ => continue,
            };

            let server_msg: ServerMessage = match serde_json::from_str(&text) {
                Ok(m) => m,
                Err(_) => continue,
            };

            let mut app = app_clone.lock().await;
            handle_server_message(&mut app, &reply_tx, server_msg);
        }
    });

    let result = run_tui(app, tx).await;
    recv_task.abort();
    result
}

/// Apply a message from the server.
fn handle_server_message(app: &mut ClientApp, tx: &Outbox, msg: ServerMessage) {
    match msg {
        ServerMessage::ConnectionAck => {
            app.enter_name_entry();
        }
        ServerMessage::JoinAccepted { username } => {
            app.enter_quiz_select(username);
            let _ = tx.send(ClientMessage::ListQuizzes);
        }
        ServerMessage::JoinRejected { reason } => {
            app.show_error(reason);
        }
        ServerMessage::QuizList { quizzes } => {
            app.set_quizzes(quizzes);
        }
        ServerMessage::QuizPresented {
            quiz,
            title,
            selection,
            questions,
        } => {
            app.start_attempt(quiz, title, selection, questions);
        }
        ServerMessage::QuizResults {
            quiz,
            score,
            total,
            outcomes,
            reselected,
        } => {
            app.enter_results(quiz, score, total, outcomes, reselected);
        }
        ServerMessage::Error { message, .. } => {
            app.show_error(message);
        }
    }
}

/// Run the client TUI.
async fn run_tui(app: SharedApp, tx: Outbox) -> Result<(), QuizError> {
    let mut guard = TerminalGuard::enter()?;

    loop {
        {
            let app = app.lock().await;
            if app.should_quit {
                break;
            }
            guard.terminal().draw(|frame| ui::render(frame, &app))?;
        }

        // Handle input with timeout
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }

                let mut app = app.lock().await;
                if handle_input(&mut app, &tx, key.code) {
                    break;
                }
            }
        }
    }

    Ok(())
}

/// Handle keyboard input. Returns true if the client should exit.
fn handle_input(app: &mut ClientApp, tx: &Outbox, key: KeyCode) -> bool {
    match &app.state {
        ClientState::Connecting => {
            if matches!(key, KeyCode::Char('q') | KeyCode::Char('Q')) {
                app.should_quit = true;
            }
        }
        ClientState::NameEntry { .. } => match key {
            KeyCode::Char('q') | KeyCode::Char('Q') if app.name_input().is_empty() => {
                app.should_quit = true;
            }
            KeyCode::Char(c) => {
                app.clear_name_error();
                app.name_input_push(c);
            }
            KeyCode::Backspace => {
                app.clear_name_error();
                app.name_input_pop();
            }
            KeyCode::Enter => {
                let username = app.name_input().to_string();
                if !username.is_empty() {
                    let _ = tx.send(ClientMessage::Join { username });
                }
            }
            KeyCode::Esc => {
                app.should_quit = true;
            }
            _ => {}
        },
        ClientState::QuizSelect { .. } => match key {
            KeyCode::Up | KeyCode::Char('k') => app.select_previous_quiz(),
            KeyCode::Down | KeyCode::Char('j') => app.select_next_quiz(),
            KeyCode::Char('r') | KeyCode::Char('R') => {
                let _ = tx.send(ClientMessage::ListQuizzes);
            }
            KeyCode::Enter => {
                if let Some(quiz) = app.selected_quiz() {
                    let _ = tx.send(ClientMessage::StartQuiz {
                        quiz: quiz.to_string(),
                    });
                }
            }
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                app.should_quit = true;
            }
            _ => {}
        },
        ClientState::Quiz(_) => handle_attempt_input(app, tx, key),
        ClientState::Results { .. } => match key {
            KeyCode::Down | KeyCode::Char('j') => app.scroll_results_down(),
            KeyCode::Up | KeyCode::Char('k') => app.scroll_results_up(),
            KeyCode::Char('r') | KeyCode::Char('R') => {
                app.back_to_quiz_select();
                let _ = tx.send(ClientMessage::ListQuizzes);
            }
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                app.should_quit = true;
            }
            _ => {}
        },
        ClientState::Disconnected { .. } => {
            if matches!(
                key,
                KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc | KeyCode::Enter
            ) {
                app.should_quit = true;
            }
        }
    }

    app.should_quit
}

fn handle_attempt_input(app: &mut ClientApp, tx: &Outbox, key: KeyCode) {
    if key == KeyCode::Esc {
        app.should_quit = true;
        return;
    }

    let Some(attempt) = app.attempt_mut() else {
        return;
    };
    if attempt.submitted {
        return;
    }

    let typing = attempt.is_typing();
    match key {
        KeyCode::Left | KeyCode::BackTab => attempt.previous_question(),
        KeyCode::Right | KeyCode::Tab => attempt.next_question(),
        KeyCode::Up => attempt.cursor_up(),
        KeyCode::Down => attempt.cursor_down(),
        KeyCode::Char('k') if !typing => attempt.cursor_up(),
        KeyCode::Char('j') if !typing => attempt.cursor_down(),
        KeyCode::Char(' ') if !typing => attempt.choose(),
        KeyCode::Char(c) if typing => attempt.type_char(c),
        KeyCode::Backspace => attempt.backspace(),
        KeyCode::Enter => {
            if matches!(attempt.current_draft(), Some(Draft::SingleChoice(_))) {
                attempt.choose();
            }
            if attempt.is_last() {
                if let Some(msg) = attempt.submit() {
                    let _ = tx.send(msg);
                }
            } else {
                attempt.next_question();
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::QuestionBody;
    use crate::protocol::QuestionView;

    fn presented() -> ServerMessage {
        ServerMessage::QuizPresented {
            quiz: "geo.json".to_string(),
            title: "Geography".to_string(),
            selection: "0".to_string(),
            questions: vec![QuestionView {
                position: 0,
                prompt: "Capital of France?".to_string(),
                answer_key: String::new(),
                body: QuestionBody::Word,
            }],
        }
    }

    #[test]
    fn test_join_accepted_requests_quiz_list() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut app = ClientApp::new("localhost".to_string(), 8712);

        handle_server_message(&mut app, &tx, ServerMessage::ConnectionAck);
        handle_server_message(
            &mut app,
            &tx,
            ServerMessage::JoinAccepted {
                username: "alice".to_string(),
            },
        );

        assert!(matches!(app.state, ClientState::QuizSelect { .. }));
        assert!(matches!(rx.try_recv(), Ok(ClientMessage::ListQuizzes)));
    }

    #[test]
    fn test_typing_then_enter_submits_last_question() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut app = ClientApp::new("localhost".to_string(), 8712);
        app.enter_quiz_select("alice".to_string());
        handle_server_message(&mut app, &tx, presented());

        for c in "Paris".chars() {
            assert!(!handle_input(&mut app, &tx, KeyCode::Char(c)));
        }
        handle_input(&mut app, &tx, KeyCode::Enter);

        let Ok(ClientMessage::SubmitQuiz {
            quiz,
            selection,
            answers,
            ..
        }) = rx.try_recv()
        else {
            panic!("expected SubmitQuiz");
        };
        assert_eq!(quiz, "geo.json");
        assert_eq!(selection.as_deref(), Some("0"));
        assert_eq!(answers.len(), 1);
    }

    #[test]
    fn test_letters_are_typed_not_treated_as_commands() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut app = ClientApp::new("localhost".to_string(), 8712);
        handle_server_message(&mut app, &tx, presented());

        assert!(!handle_input(&mut app, &tx, KeyCode::Char('q')));
        assert!(!handle_input(&mut app, &tx, KeyCode::Char('j')));
        assert!(handle_input(&mut app, &tx, KeyCode::Esc));
    }

    #[test]
    fn test_server_error_shows_on_attempt() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut app = ClientApp::new("localhost".to_string(), 8712);
        handle_server_message(&mut app, &tx, presented());
        handle_server_message(
            &mut app,
            &tx,
            ServerMessage::Error {
                kind: crate::protocol::ErrorKind::ReplayToken,
                message: "bad".to_string(),
            },
        );

        let Some(attempt) = app.attempt_mut() else {
            panic!("expected attempt");
        };
        assert_eq!(attempt.error.as_deref(), Some("bad"));
    }
}
