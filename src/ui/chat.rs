use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use unicode_width::UnicodeWidthStr;

use super::components;
use super::utils::{format_size_kb, scroll_position, wrap_text};
use crate::app::{App, Focus};
use crate::cases::{Case, ChatMessage, MessageRole};
use crate::services::voice::VoiceState;

/// Files listed before the strip collapses into a summary line
const MAX_FILE_ROWS: usize = 4;

/// Chat pane for the active case: header, files, transcript, input, footer
pub fn render_chat_view(frame: &mut Frame, app: &App, area: Rect) {
    let file_rows = app
        .store
        .active_case()
        .map_or(0, |case| case.files().len().min(MAX_FILE_ROWS + 1));
    let file_height = if file_rows == 0 { 0 } else { file_rows as u16 + 2 };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),           // Header
            Constraint::Length(file_height), // Files
            Constraint::Min(0),              // Transcript
            Constraint::Length(3),           // Input
            Constraint::Length(3),           // Footer
        ])
        .split(area);

    if let [header, files, transcript, input, footer] = &chunks[..] {
        render_chat_header(frame, app, *header);
        match app.store.active_case() {
            Some(case) => {
                if file_height > 0 {
                    render_file_strip(frame, case, *files);
                }
                render_transcript(frame, app, case, *transcript);
            }
            None => render_welcome(frame, *transcript),
        }
        render_chat_input(frame, app, *input);
        render_chat_footer(frame, app, *footer);
    }
}

fn render_chat_header(frame: &mut Frame, app: &App, area: Rect) {
    let case_name = app.store.active_case().map_or("No case selected", Case::name);
    let model_name = app.current_model();

    frame.render_widget(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray)),
        area,
    );
    let inner = Rect {
        x: area.x + 1,
        y: area.y + 1,
        width: area.width.saturating_sub(2),
        height: area.height.saturating_sub(2),
    };

    let model_width = u16::try_from(model_name.width() + 2).unwrap_or(inner.width);
    let left_area = Rect {
        width: inner.width.saturating_sub(model_width),
        ..inner
    };
    let right_area = Rect {
        x: inner.x + inner.width.saturating_sub(model_width),
        width: model_width.min(inner.width),
        ..inner
    };

    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::raw(" "),
            Span::styled(
                "CaseLens",
                Style::default()
                    .fg(Color::Magenta)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(" "),
            Span::styled(case_name.to_string(), Style::default().fg(Color::Cyan)),
        ])),
        left_area,
    );
    let model_style = if app.extended_reasoning {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::White)
    };
    frame.render_widget(
        Paragraph::new(Span::styled(format!(" {model_name} "), model_style))
            .alignment(Alignment::Right),
        right_area,
    );
}

fn render_file_strip(frame: &mut Frame, case: &Case, area: Rect) {
    let files = case.files();
    let mut lines: Vec<Line> = files
        .iter()
        .take(MAX_FILE_ROWS)
        .map(|file| {
            Line::from(vec![
                Span::styled(" ▪ ", Style::default().fg(Color::DarkGray)),
                Span::styled(file.name.clone(), Style::default().fg(Color::White)),
                Span::styled(
                    format!("  {}  {}", file.category, format_size_kb(file.size_bytes)),
                    Style::default().fg(Color::DarkGray),
                ),
            ])
        })
        .collect();
    if files.len() > MAX_FILE_ROWS {
        lines.push(Line::from(Span::styled(
            format!("   +{} more", files.len() - MAX_FILE_ROWS),
            Style::default().fg(Color::DarkGray),
        )));
    }

    frame.render_widget(
        Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" Files ({}) ", files.len()))
                .border_style(Style::default().fg(Color::DarkGray)),
        ),
        area,
    );
}

fn render_welcome(frame: &mut Frame, area: Rect) {
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "  Welcome to CaseLens",
            Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "  Create a new case with Ctrl+N to begin your analysis.",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    frame.render_widget(
        Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        ),
        area,
    );
}

fn message_lines(message: &ChatMessage, max_width: usize) -> Vec<Line<'static>> {
    let (label, indicator, label_color) = match message.role {
        MessageRole::User => ("You", ">", Color::Cyan),
        MessageRole::Model => ("Model", "<", Color::Magenta),
    };
    let mut lines = vec![Line::from(vec![
        Span::styled(format!(" {indicator} "), Style::default().fg(Color::DarkGray)),
        Span::styled(
            label,
            Style::default().fg(label_color).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("  {}", message.timestamp),
            Style::default().fg(Color::DarkGray),
        ),
    ])];
    for content_line in wrap_text(&message.content, max_width, 1) {
        lines.push(Line::from(vec![
            Span::raw("   "),
            Span::styled(content_line, Style::default().fg(Color::White)),
        ]));
    }
    lines
}

fn render_transcript(frame: &mut Frame, app: &App, case: &Case, area: Rect) {
    let content_width = area.width.saturating_sub(2) as usize;
    let max_width = content_width.saturating_sub(6).max(1);
    let mut lines: Vec<Line> = Vec::new();

    if case.messages().is_empty() {
        lines.push(Line::from(""));
        let hint = if case.files().is_empty() {
            "  Attach documents with `:attach <path>...`, then ask a question."
        } else {
            "  Ask a question about the attached files."
        };
        lines.push(Line::from(Span::styled(
            hint,
            Style::default().fg(Color::DarkGray),
        )));
    }

    for message in case.messages() {
        lines.push(Line::from(""));
        lines.extend(message_lines(message, max_width));
    }

    if app.is_analyzing() {
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled(" < ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                "Analyzing...",
                Style::default()
                    .fg(Color::Magenta)
                    .add_modifier(Modifier::DIM),
            ),
        ]));
    }
    lines.push(Line::from(""));

    let visible_height = area.height.saturating_sub(2) as usize;
    let (scroll_from_top, offset) =
        scroll_position(lines.len(), visible_height, app.chat_scroll_offset);

    let mut title = vec![Span::styled(
        " Conversation ",
        Style::default().fg(Color::White),
    )];
    if offset > 0 {
        title.push(Span::styled(
            format!("[+{offset} lines] "),
            Style::default().fg(Color::Yellow),
        ));
    }

    frame.render_widget(
        Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(Line::from(title))
                    .border_style(Style::default().fg(Color::DarkGray)),
            )
            .scroll((u16::try_from(scroll_from_top).unwrap_or(u16::MAX), 0)),
        area,
    );
}

fn render_chat_input(frame: &mut Frame, app: &App, area: Rect) {
    let placeholder = match app.voice.state() {
        VoiceState::Recording => "Recording... press Ctrl+R to stop",
        VoiceState::Transcribing => "Transcribing...",
        VoiceState::Idle if app.is_analyzing() => "Analyzing...",
        VoiceState::Idle => "Ask about the documents, or press Ctrl+R to speak...",
    };
    let enabled = !app.voice.is_busy();

    let config = components::TextInputConfig::new(app.chat_input.content(), " Prompt ")
        .with_placeholder(placeholder)
        .with_cursor_visible(enabled)
        .with_focus(app.focus == Focus::Input)
        .with_cursor_position(app.chat_input.cursor_position());
    components::render_text_input(frame, area, config);
}

fn render_chat_footer(frame: &mut Frame, app: &App, area: Rect) {
    let keybindings = [
        ("/", "menu"),
        ("Tab", "focus"),
        ("^N", "new"),
        ("^T", "think"),
        ("^R", "voice"),
    ];
    let status = [
        ("THINK", app.extended_reasoning),
        ("REC", app.voice.state() == VoiceState::Recording),
    ];

    frame.render_widget(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray)),
        area,
    );
    let inner = Rect {
        x: area.x + 1,
        y: area.y + 1,
        width: area.width.saturating_sub(2),
        height: area.height.saturating_sub(2),
    };

    let toast_message = app.status_toast_message();
    let toast_width = toast_message
        .map_or(0, |message| u16::try_from(message.chars().count() + 4).unwrap_or(inner.width))
        .min(inner.width);
    let left_area = Rect {
        width: inner.width.saturating_sub(toast_width.saturating_add(1)),
        ..inner
    };

    let mode = if app.focus == Focus::Sidebar { "CASES" } else { "CHAT" };
    frame.render_widget(
        Paragraph::new(Line::from(components::footer_spans(
            mode,
            &keybindings,
            &status,
        ))),
        left_area,
    );

    if let Some(message) = toast_message {
        let toast_area = Rect {
            x: inner.x + inner.width.saturating_sub(toast_width),
            width: toast_width,
            ..inner
        };
        components::render_status_toast(frame, toast_area, message);
    }
}
