use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

const SEPARATOR: &str = "  ";
const CURSOR: &str = "█";

/// Configuration for text input rendering
pub struct TextInputConfig<'a> {
    pub content: &'a str,
    pub title: &'a str,
    pub placeholder: Option<&'a str>,
    pub show_cursor: bool,
    pub focused: bool,
    pub cursor_position: Option<usize>,
}

impl<'a> TextInputConfig<'a> {
    pub fn new(content: &'a str, title: &'a str) -> Self {
        Self {
            content,
            title,
            placeholder: None,
            show_cursor: true,
            focused: true,
            cursor_position: None,
        }
    }

    pub fn with_placeholder(mut self, placeholder: &'a str) -> Self {
        self.placeholder = Some(placeholder);
        self
    }

    pub fn with_cursor_visible(mut self, show_cursor: bool) -> Self {
        self.show_cursor = show_cursor;
        self
    }

    pub fn with_focus(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    /// Cursor position as a character index
    pub fn with_cursor_position(mut self, cursor_position: usize) -> Self {
        self.cursor_position = Some(cursor_position);
        self
    }
}

fn cursor_span() -> Span<'static> {
    Span::styled(
        CURSOR,
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::SLOW_BLINK),
    )
}

/// Renders a single-line input that scrolls horizontally to keep the cursor visible
pub fn render_text_input(frame: &mut Frame, area: Rect, config: TextInputConfig) {
    let show_cursor = config.show_cursor && config.focused;

    let line = if config.content.is_empty() {
        let mut spans = vec![Span::styled("> ", Style::default().fg(Color::DarkGray))];
        if show_cursor {
            spans.push(cursor_span());
        }
        if let Some(placeholder) = config.placeholder {
            spans.push(Span::styled(
                placeholder.to_string(),
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC),
            ));
        }
        Line::from(spans)
    } else {
        let inner_width = area.width.saturating_sub(2) as usize;
        let cursor_width = usize::from(show_cursor);
        let available_width = inner_width.saturating_sub(2 + cursor_width).max(1);
        let cursor_index = config
            .cursor_position
            .unwrap_or_else(|| config.content.chars().count());
        let (start, end) = visible_window(config.content, cursor_index, available_width);
        let visible = slice_by_chars(config.content, start, end);
        let relative_cursor = cursor_index.saturating_sub(start).min(visible.chars().count());
        let before = slice_by_chars(&visible, 0, relative_cursor);
        let after = slice_by_chars(&visible, relative_cursor, visible.chars().count());

        let text_style = Style::default().fg(Color::White);
        let mut spans = vec![
            Span::styled("> ", Style::default().fg(Color::Cyan)),
            Span::styled(before, text_style),
        ];
        if show_cursor {
            spans.push(cursor_span());
        }
        spans.push(Span::styled(after, text_style));
        Line::from(spans)
    };

    let border_color = if config.focused {
        Color::Cyan
    } else {
        Color::DarkGray
    };

    frame.render_widget(
        Paragraph::new(line).block(
            Block::default()
                .borders(Borders::ALL)
                .title(Line::from(Span::styled(
                    config.title,
                    Style::default().fg(Color::White),
                )))
                .border_style(Style::default().fg(border_color)),
        ),
        area,
    );
}

fn visible_window(content: &str, cursor: usize, width: usize) -> (usize, usize) {
    let length = content.chars().count();
    let cursor = cursor.min(length);
    if length <= width {
        return (0, length);
    }
    let mut start = cursor.saturating_sub(width.saturating_sub(1));
    if start + width > length {
        start = length.saturating_sub(width);
    }
    (start, start + width)
}

fn slice_by_chars(value: &str, start: usize, end: usize) -> String {
    value
        .chars()
        .skip(start)
        .take(end.saturating_sub(start))
        .collect()
}

/// Bordered title bar used by full-screen views
pub fn render_view_header(frame: &mut Frame, area: Rect, title: &str) {
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
            Span::styled(title.to_string(), Style::default().fg(Color::Cyan)),
        ]))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        )
        .alignment(Alignment::Left),
        area,
    );
}

#[must_use]
pub fn selected_name_style(is_selected: bool) -> Style {
    if is_selected {
        Style::default()
            .fg(Color::Magenta)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White)
    }
}

#[must_use]
pub fn selected_secondary_style(is_selected: bool, base: Style) -> Style {
    if is_selected {
        base.fg(Color::Gray)
    } else {
        base
    }
}

/// Mode badge followed by key hints; `status` entries render as on/off badges
#[must_use]
pub fn footer_spans(
    mode: &str,
    keybindings: &[(&str, &str)],
    status: &[(&str, bool)],
) -> Vec<Span<'static>> {
    let mut spans = vec![
        Span::raw(" "),
        Span::styled(
            format!(" {mode} "),
            Style::default()
                .fg(Color::Black)
                .bg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
        ),
    ];

    for &(label, active) in status {
        spans.push(Span::raw(" "));
        if active {
            spans.push(Span::styled(
                format!(" {label} "),
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            ));
        } else {
            spans.push(Span::styled(
                format!(" {label} "),
                Style::default().fg(Color::DarkGray),
            ));
        }
    }

    for &(key, desc) in keybindings {
        spans.push(Span::raw(SEPARATOR));
        spans.push(Span::styled(
            format!(" {key} "),
            Style::default().fg(Color::Black).bg(Color::Yellow),
        ));
        spans.push(Span::styled(
            format!(" {desc}"),
            Style::default().fg(Color::White),
        ));
    }

    spans
}

/// Renders a bordered footer from `footer_spans`
pub fn render_navigation_footer(
    frame: &mut Frame,
    area: Rect,
    mode: &str,
    keybindings: &[(&str, &str)],
) {
    frame.render_widget(
        Paragraph::new(Line::from(footer_spans(mode, keybindings, &[]))).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        ),
        area,
    );
}

pub fn render_status_toast(frame: &mut Frame, area: Rect, message: &str) {
    let toast = Paragraph::new(Line::from(vec![Span::styled(
        format!(" {message} "),
        Style::default()
            .fg(Color::Black)
            .bg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    )]))
    .alignment(Alignment::Right);

    frame.render_widget(toast, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visible_window_follows_cursor() {
        assert_eq!(visible_window("short", 5, 10), (0, 5));
        assert_eq!(visible_window("abcdefghij", 10, 4), (6, 10));
        assert_eq!(visible_window("abcdefghij", 0, 4), (0, 4));
    }

    #[test]
    fn test_footer_spans_include_status_badges() {
        let spans = footer_spans("CHAT", &[("/", "menu")], &[("THINK", true)]);
        let text: String = spans.iter().map(|span| span.content.as_ref()).collect();
        assert!(text.contains(" CHAT "));
        assert!(text.contains(" THINK "));
        assert!(text.contains(" / "));
    }
}
