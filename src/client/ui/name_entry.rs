//! Name entry screen for the client.

use ratatui::prelude::*;

use crate::client::state::{ClientApp, ClientState};
use crate::protocol::{validate_username, USERNAME_MAX_LENGTH};

use super::render::{centered_card, HEADER};

/// Render the name entry screen.
pub fn render(frame: &mut Frame, area: Rect, app: &ClientApp) {
    let ClientState::NameEntry { input, error } = &app.state else {
        return;
    };

    let length = input.chars().count();
    let valid = validate_username(input).is_ok();
    let counter_color = if valid { Color::Green } else { Color::DarkGray };

    let mut lines = vec![
        Line::from(Span::styled(
            format!("Connected to {}", app.server_addr()),
            Style::default().fg(Color::Green),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("Name: ", Style::default().fg(Color::White)),
            Span::styled(input.as_str(), Style::default().fg(Color::Yellow).bold()),
            Span::styled("_", Style::default().fg(Color::Yellow)),
        ]),
        Line::from(Span::styled(
            format!("{}/{}", length, USERNAME_MAX_LENGTH),
            Style::default().fg(counter_color),
        )),
        Line::from(""),
    ];

    // A server rejection wins over the local hint.
    let notice = match (error, validate_username(input)) {
        (Some(err), _) => Span::styled(err.clone(), Style::default().fg(Color::Red)),
        (None, Err(hint)) if length > 0 => Span::styled(hint, Style::default().fg(Color::Yellow)),
        _ => Span::raw(""),
    };
    lines.push(Line::from(notice));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "[Enter] join  ·  [Esc] quit",
        Style::default().fg(Color::DarkGray),
    )));

    centered_card(frame, area, HEADER, lines);
}
