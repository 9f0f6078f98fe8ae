use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
};

use crate::app::{App, MenuItem};
use crate::ui::{components, utils::centered_rect};

/// Command palette drawn as a popup over the chat view
pub fn render_command_menu(frame: &mut Frame, app: &App) {
    let filtered_items = app.filtered_items();
    let area = centered_rect(50, 50, frame.area());
    frame.render_widget(Clear, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Search
            Constraint::Min(0),    // List
        ])
        .split(area);

    if let [search_area, list_area] = &chunks[..] {
        render_search_input(frame, app, *search_area);
        if filtered_items.is_empty() {
            render_empty_message(frame, *list_area);
        } else {
            render_command_list(frame, app, &filtered_items, *list_area);
        }
    }
}

fn render_search_input(frame: &mut Frame, app: &App, area: Rect) {
    let config = components::TextInputConfig::new(&app.input, " Commands ")
        .with_placeholder("type to filter");
    components::render_text_input(frame, area, config);
}

fn render_empty_message(frame: &mut Frame, area: Rect) {
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            " No matching commands",
            Style::default().fg(Color::DarkGray),
        )))
        .block(Block::default().borders(Borders::ALL)),
        area,
    );
}

fn render_command_list(frame: &mut Frame, app: &App, filtered_items: &[MenuItem], area: Rect) {
    let items: Vec<ListItem> = filtered_items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let is_selected = index == app.selected_index;
            let prefix = if is_selected { "> " } else { "  " };
            ListItem::new(Line::from(vec![
                Span::styled(format!(" {prefix}"), Style::default().fg(Color::DarkGray)),
                Span::styled(
                    format!("{:<8}", item.name),
                    components::selected_name_style(is_selected),
                ),
                Span::styled(
                    item.description.clone(),
                    components::selected_secondary_style(
                        is_selected,
                        Style::default().fg(Color::DarkGray),
                    ),
                ),
            ]))
        })
        .collect();

    frame.render_widget(
        List::new(items).block(
            Block::default()
                .borders(Borders::ALL)
                .title(Span::styled(
                    " Enter run · Esc close ",
                    Style::default()
                        .fg(Color::DarkGray)
                        .add_modifier(Modifier::ITALIC),
                ))
                .border_style(Style::default().fg(Color::Cyan)),
        ),
        area,
    );
}
