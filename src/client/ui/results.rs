//! Results screen for the client.

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Padding, Paragraph};

use crate::client::state::{ClientApp, ClientState};
use crate::engine::{Outcome, Verdict};

const QUESTION_PREVIEW_LENGTH: usize = 45;

/// Render the results screen.
pub fn render(frame: &mut Frame, area: Rect, app: &ClientApp) {
    let ClientState::Results {
        quiz,
        score,
        total,
        outcomes,
        reselected,
        scroll,
        ..
    } = &app.state
    else {
        return;
    };

    let chunks = Layout::vertical([
        Constraint::Length(7), // Score summary
        Constraint::Min(8),    // Outcome breakdown
        Constraint::Length(2), // Controls
    ])
    .margin(1)
    .split(area);

    render_score_summary(frame, chunks[0], quiz, *score, *total, *reselected);
    render_outcomes(frame, chunks[1], outcomes, *scroll);
    render_controls(frame, chunks[2]);
}

fn render_score_summary(
    frame: &mut Frame,
    area: Rect,
    quiz: &str,
    score: usize,
    total: usize,
    reselected: bool,
) {
    let percentage = if total > 0 {
        (score as f64 / total as f64) * 100.0
    } else {
        0.0
    };

    let grade_color = match percentage as u32 {
        90..=100 => Color::Green,
        70..=89 => Color::Cyan,
        50..=69 => Color::Yellow,
        _ => Color::Red,
    };

    let notice = if reselected {
        Line::from(Span::styled(
            "Selection was lost, these are freshly drawn questions",
            Style::default().fg(Color::Yellow),
        ))
    } else {
        Line::from("")
    };

    let content = vec![
        Line::from(Span::styled(
            "RESULTS",
            Style::default().fg(Color::Cyan).bold(),
        )),
        Line::from(Span::styled(quiz, Style::default().fg(Color::Gray))),
        Line::from(""),
        Line::from(Span::styled(
            format!("{} / {}  ({:.0}%)", score, total, percentage),
            Style::default().fg(grade_color).bold(),
        )),
        notice,
    ];

    let widget = Paragraph::new(content).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Color::DarkGray),
    );

    frame.render_widget(widget, area);
}

fn render_outcomes(frame: &mut Frame, area: Rect, outcomes: &[Outcome], scroll: usize) {
    let lines: Vec<Line> = outcomes
        .iter()
        .flat_map(|outcome| {
            let (symbol, color) = match outcome.verdict {
                Verdict::Correct => ("+", Color::Green),
                Verdict::Incorrect => ("-", Color::Red),
                Verdict::Indeterminate => ("?", Color::Yellow),
            };

            let mut lines = vec![Line::from(vec![
                Span::styled(format!(" {} ", symbol), Style::default().fg(color)),
                Span::styled(
                    format!("{:2}. ", outcome.position + 1),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::styled(
                    truncate_question(&outcome.prompt),
                    Style::default().fg(Color::Gray),
                ),
            ])];

            if outcome.verdict != Verdict::Correct {
                lines.push(Line::from(vec![
                    Span::styled("       you: ", Style::default().fg(Color::DarkGray)),
                    Span::styled(outcome.your_answer.clone(), Style::default().fg(Color::White)),
                    Span::styled("  expected: ", Style::default().fg(Color::DarkGray)),
                    Span::styled(
                        outcome.expected_answer.clone(),
                        Style::default().fg(Color::Green),
                    ),
                ]));
            }

            lines
        })
        .collect();

    let widget = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(" Your Answers ")
                .title_style(Style::default().fg(Color::Cyan))
                .padding(Padding::horizontal(1)),
        )
        .scroll((scroll as u16, 0));

    frame.render_widget(widget, area);
}

fn render_controls(frame: &mut Frame, area: Rect) {
    let widget = Paragraph::new("j/k scroll  ·  r another quiz  ·  q quit")
        .alignment(Alignment::Center)
        .fg(Color::DarkGray);

    frame.render_widget(widget, area);
}

fn truncate_question(text: &str) -> String {
    let char_count = text.chars().count();
    if char_count > QUESTION_PREVIEW_LENGTH {
        let truncated: String = text.chars().take(QUESTION_PREVIEW_LENGTH).collect();
        format!("{}...", truncated)
    } else {
        text.to_string()
    }
}
