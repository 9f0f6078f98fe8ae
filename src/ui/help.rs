use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use crate::app::HELP_SECTIONS;
use crate::ui::components;

pub fn render_help_view(f: &mut Frame) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Body
            Constraint::Length(3), // Footer
        ])
        .split(f.area());

    if let [header, body, footer] = &chunks[..] {
        components::render_view_header(f, *header, "Help");
        render_help_body(f, *body);
        components::render_navigation_footer(f, *footer, "HELP", &[("Esc", "back")]);
    }
}

fn render_help_body(f: &mut Frame, area: Rect) {
    let key_width = HELP_SECTIONS
        .iter()
        .flat_map(|(_, entries)| entries.iter())
        .map(|(key, _)| key.chars().count())
        .max()
        .unwrap_or(0);

    let mut lines = Vec::new();
    for (title, entries) in HELP_SECTIONS {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("  {title}"),
            Style::default().fg(Color::Cyan),
        )));
        for (key, description) in *entries {
            lines.push(Line::from(vec![
                Span::styled(
                    format!("  {key:<key_width$}"),
                    Style::default().fg(Color::Yellow),
                ),
                Span::styled(
                    format!("  {description}"),
                    Style::default().fg(Color::White),
                ),
            ]));
        }
    }

    f.render_widget(
        Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Shortcuts ")
                .border_style(Style::default().fg(Color::DarkGray)),
        ),
        area,
    );
}
