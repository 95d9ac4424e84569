//! Main client UI renderer.

use ratatui::layout::Flex;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Padding, Paragraph, Wrap};

use crate::client::state::{ClientApp, ClientState};

use super::{name_entry, quiz, quiz_select, results};

pub(super) const HEADER: &str = "QUIZDECK";

const CARD_WIDTH: u16 = 52;

/// Render the client UI based on current state.
pub fn render(frame: &mut Frame, app: &ClientApp) {
    let [main, status] =
        Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).areas(frame.area());
    frame.render_widget(Block::default().bg(Color::Reset), frame.area());

    match &app.state {
        ClientState::Connecting => render_connecting(frame, main, app),
        ClientState::NameEntry { .. } => name_entry::render(frame, main, app),
        ClientState::QuizSelect { .. } => quiz_select::render(frame, main, app),
        ClientState::Quiz(attempt) => quiz::render(frame, main, attempt),
        ClientState::Results { .. } => results::render(frame, main, app),
        ClientState::Disconnected { message } => render_disconnected(frame, main, message),
    }

    render_status_bar(frame, status, app);
}

/// Draw `lines` in a bordered box centred in `area`.
pub(super) fn centered_card(frame: &mut Frame, area: Rect, title: &str, lines: Vec<Line>) {
    let height = (lines.len() as u16).saturating_add(4).min(area.height);
    let width = CARD_WIDTH.min(area.width);

    let [row] = Layout::vertical([Constraint::Length(height)])
        .flex(Flex::Center)
        .areas(area);
    let [card] = Layout::horizontal([Constraint::Length(width)])
        .flex(Flex::Center)
        .areas(row);

    let widget = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(format!(" {} ", title))
                .title_style(Style::default().fg(Color::Cyan).bold())
                .title_alignment(Alignment::Center)
                .padding(Padding::uniform(1)),
        );

    frame.render_widget(widget, card);
}

fn render_connecting(frame: &mut Frame, area: Rect, app: &ClientApp) {
    let lines = vec![Line::from(Span::styled(
        format!("Connecting to {}...", app.server_addr()),
        Style::default().fg(Color::Yellow),
    ))];

    centered_card(frame, area, HEADER, lines);
}

fn render_disconnected(frame: &mut Frame, area: Rect, message: &str) {
    let lines = vec![
        Line::from(Span::styled(message, Style::default().fg(Color::Red).bold())),
        Line::from(""),
        Line::from(Span::styled(
            "Press [Q] to exit",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    centered_card(frame, area, HEADER, lines);
}

/// One line under every screen: where we are connected and as whom.
fn render_status_bar(frame: &mut Frame, area: Rect, app: &ClientApp) {
    let (label, color) = match &app.state {
        ClientState::Connecting => ("connecting", Color::Yellow),
        ClientState::NameEntry { .. } => ("joining", Color::Yellow),
        ClientState::QuizSelect { .. } => ("choosing", Color::Green),
        ClientState::Quiz(attempt) if attempt.submitted => ("scoring", Color::Yellow),
        ClientState::Quiz(_) => ("answering", Color::Green),
        ClientState::Results { .. } => ("results", Color::Green),
        ClientState::Disconnected { .. } => ("offline", Color::Red),
    };

    let mut spans = vec![
        Span::styled(
            format!(" {} ", label),
            Style::default().fg(Color::Black).bg(color),
        ),
        Span::styled(
            format!("  {}", app.server_addr()),
            Style::default().fg(Color::DarkGray),
        ),
    ];
    if let Some(username) = app.state.username().filter(|name| !name.is_empty()) {
        spans.push(Span::styled("  as ", Style::default().fg(Color::DarkGray)));
        spans.push(Span::styled(
            username.to_string(),
            Style::default().fg(Color::Green),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
