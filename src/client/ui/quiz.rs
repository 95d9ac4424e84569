//! Quiz screen for the client.

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Padding, Paragraph, Wrap};

use crate::client::state::{Attempt, Draft};
use crate::engine::QuestionBody;
use crate::protocol::QuestionView;

/// Render the quiz screen.
pub fn render(frame: &mut Frame, area: Rect, attempt: &Attempt) {
    let (Some(question), Some(draft)) = (attempt.current_question(), attempt.current_draft())
    else {
        let empty = Paragraph::new("This quiz has no questions  ·  Esc to quit")
            .alignment(Alignment::Center)
            .fg(Color::Yellow);
        frame.render_widget(empty, area);
        return;
    };

    let chunks = Layout::vertical([
        Constraint::Length(3), // Progress
        Constraint::Length(7), // Question text
        Constraint::Min(8),    // Answer area
        Constraint::Length(1), // Status
        Constraint::Length(2), // Controls
    ])
    .margin(1)
    .split(area);

    render_progress(frame, chunks[0], attempt);
    render_question_text(frame, chunks[1], &question.prompt);
    render_answer_area(frame, chunks[2], question, draft, attempt.cursor);
    render_status(frame, chunks[3], attempt);
    render_controls(frame, chunks[4], draft, attempt.is_last());
}

fn render_progress(frame: &mut Frame, area: Rect, attempt: &Attempt) {
    let content = vec![
        Line::from(Span::styled(
            attempt.title.clone(),
            Style::default().fg(Color::Cyan).bold(),
        )),
        Line::from(Span::styled(
            format!(
                "Question {} of {}  ·  {} answered",
                attempt.current + 1,
                attempt.questions.len(),
                attempt.answered_count()
            ),
            Style::default().fg(Color::Gray),
        )),
    ];

    frame.render_widget(Paragraph::new(content).alignment(Alignment::Center), area);
}

fn render_question_text(frame: &mut Frame, area: Rect, text: &str) {
    let widget = Paragraph::new(text)
        .wrap(Wrap { trim: true })
        .style(Style::default().fg(Color::White))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .padding(Padding::horizontal(1)),
        );

    frame.render_widget(widget, area);
}

fn render_answer_area(
    frame: &mut Frame,
    area: Rect,
    question: &QuestionView,
    draft: &Draft,
    cursor: usize,
) {
    let (title, lines) = match (&question.body, draft) {
        (QuestionBody::SingleChoice { options }, Draft::SingleChoice(chosen)) => {
            let lines = options
                .iter()
                .enumerate()
                .map(|(i, option)| {
                    let marked = chosen.as_deref() == Some(option.label.as_str());
                    option_line(
                        i == cursor,
                        if marked { "(*)" } else { "( )" },
                        &format!("{}) {}", option.label, option.text),
                    )
                })
                .collect();
            (" Pick one ", lines)
        }
        (QuestionBody::MultiChoice { options }, Draft::MultiChoice(chosen)) => {
            let lines = options
                .iter()
                .enumerate()
                .map(|(i, option)| {
                    let marked = chosen.contains(&i);
                    option_line(i == cursor, if marked { "[x]" } else { "[ ]" }, option)
                })
                .collect();
            (" Pick all that apply ", lines)
        }
        (QuestionBody::Word, Draft::Word(text)) => {
            let line = Line::from(vec![
                Span::styled(text.clone(), Style::default().fg(Color::Yellow)),
                Span::styled("_", Style::default().fg(Color::Yellow)),
            ]);
            (" Your answer ", vec![line])
        }
        (QuestionBody::Unsupported { declared }, _) => {
            let line = Line::from(Span::styled(
                format!("Question type '{}' cannot be answered here", declared),
                Style::default().fg(Color::DarkGray),
            ));
            (" Skipped ", vec![line])
        }
        _ => (" Answer ", Vec::new()),
    };

    let widget = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(title)
            .title_style(Style::default().fg(Color::Cyan))
            .padding(Padding::horizontal(1)),
    );

    frame.render_widget(widget, area);
}

fn option_line(is_cursor: bool, mark: &str, text: &str) -> Line<'static> {
    let prefix = if is_cursor { "> " } else { "  " };
    let style = if is_cursor {
        Style::default().fg(Color::Yellow).bold()
    } else {
        Style::default().fg(Color::White)
    };

    Line::from(vec![
        Span::styled(prefix, style),
        Span::styled(format!("{} ", mark), style),
        Span::styled(text.to_string(), style),
    ])
}

fn render_status(frame: &mut Frame, area: Rect, attempt: &Attempt) {
    let widget = if let Some(error) = &attempt.error {
        Paragraph::new(error.as_str()).fg(Color::Red)
    } else if attempt.submitted {
        Paragraph::new("Submitted, waiting for score...").fg(Color::Yellow)
    } else {
        Paragraph::new("")
    };

    frame.render_widget(widget.alignment(Alignment::Center), area);
}

fn render_controls(frame: &mut Frame, area: Rect, draft: &Draft, is_last: bool) {
    let enter = if is_last { "Enter submit" } else { "Enter next" };
    let text = match draft {
        Draft::Word(_) => {
            format!("type your answer  ·  ←/→ move  ·  {}  ·  Esc quit", enter)
        }
        Draft::MultiChoice(_) => format!(
            "j/k or arrows  ·  Space toggle  ·  ←/→ move  ·  {}  ·  Esc quit",
            enter
        ),
        _ => format!(
            "j/k or arrows  ·  Space pick  ·  ←/→ move  ·  {}  ·  Esc quit",
            enter
        ),
    };

    let widget = Paragraph::new(text)
        .alignment(Alignment::Center)
        .fg(Color::DarkGray);

    frame.render_widget(widget, area);
}
