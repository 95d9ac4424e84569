//! Quiz picker for the client.

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Padding, Paragraph};

use crate::client::state::{ClientApp, ClientState};

use super::render::HEADER;

/// Render the quiz picker.
pub fn render(frame: &mut Frame, area: Rect, app: &ClientApp) {
    let ClientState::QuizSelect {
        username,
        quizzes,
        selected,
        error,
    } = &app.state
    else {
        return;
    };

    let chunks = Layout::vertical([
        Constraint::Length(5), // Greeting
        Constraint::Min(6),    // Quiz list
        Constraint::Length(1), // Error
        Constraint::Length(2), // Controls
    ])
    .margin(1)
    .split(area);

    let greeting = vec![
        Line::from(Span::styled(HEADER, Style::default().fg(Color::Cyan).bold())),
        Line::from(""),
        Line::from(vec![
            Span::styled("Welcome, ", Style::default().fg(Color::White)),
            Span::styled(username, Style::default().fg(Color::Green).bold()),
            Span::styled("!", Style::default().fg(Color::White)),
        ]),
    ];
    frame.render_widget(
        Paragraph::new(greeting).alignment(Alignment::Center),
        chunks[0],
    );

    let lines: Vec<Line> = if quizzes.is_empty() {
        vec![Line::from(Span::styled(
            "No quizzes available",
            Style::default().fg(Color::Yellow),
        ))]
    } else {
        quizzes
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let is_selected = i == *selected;
                let prefix = if is_selected { "> " } else { "  " };
                let style = if is_selected {
                    Style::default().fg(Color::Yellow).bold()
                } else {
                    Style::default().fg(Color::White)
                };
                Line::from(Span::styled(format!("{}{}", prefix, name), style))
            })
            .collect()
    };

    let list = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(" Quizzes ")
            .title_style(Style::default().fg(Color::Cyan))
            .padding(Padding::horizontal(1)),
    );
    frame.render_widget(list, chunks[1]);

    if let Some(err) = error {
        frame.render_widget(
            Paragraph::new(err.as_str())
                .alignment(Alignment::Center)
                .fg(Color::Red),
            chunks[2],
        );
    }

    let controls =
        Paragraph::new("j/k or arrows to pick  ·  Enter to start  ·  r refresh  ·  q quit")
            .alignment(Alignment::Center)
            .fg(Color::DarkGray);
    frame.render_widget(controls, chunks[3]);
}
