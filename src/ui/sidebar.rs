use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
};

use crate::app::{App, Focus};
use crate::ui::components;

/// Case list, newest first. The active case is marked and the sidebar
/// cursor is highlighted while the sidebar has focus.
pub fn render_sidebar(frame: &mut Frame, app: &App, area: Rect) {
    let focused = app.focus == Focus::Sidebar;
    let active_id = app.store.active_id();

    let items: Vec<ListItem> = if app.store.cases().is_empty() {
        vec![ListItem::new(Line::from(Span::styled(
            " No cases yet (Ctrl+N)",
            Style::default().fg(Color::DarkGray),
        )))]
    } else {
        app.store
            .cases()
            .iter()
            .enumerate()
            .map(|(index, case)| {
                let is_active = active_id == Some(case.id());
                let is_highlighted = focused && index == app.sidebar_index;
                let marker = if is_active { "●" } else { " " };
                let busy = app
                    .sessions
                    .get(case.id())
                    .is_some_and(|session| session.is_awaiting());

                let mut name_line = vec![
                    Span::styled(format!(" {marker} "), Style::default().fg(Color::Cyan)),
                    Span::styled(
                        case.name().to_string(),
                        components::selected_name_style(is_highlighted || is_active),
                    ),
                ];
                if busy {
                    name_line.push(Span::styled(" …", Style::default().fg(Color::Yellow)));
                }
                let detail = Line::from(Span::styled(
                    format!(
                        "   {} · {} file(s)",
                        case.created_at().format("%b %d %H:%M"),
                        case.files().len()
                    ),
                    components::selected_secondary_style(
                        is_highlighted,
                        Style::default().fg(Color::DarkGray),
                    ),
                ));

                let item = ListItem::new(vec![Line::from(name_line), detail]);
                if is_highlighted {
                    item.style(Style::default().add_modifier(Modifier::REVERSED))
                } else {
                    item
                }
            })
            .collect()
    };

    let border_color = if focused { Color::Cyan } else { Color::DarkGray };
    frame.render_widget(
        List::new(items).block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Cases ")
                .border_style(Style::default().fg(border_color)),
        ),
        area,
    );
}
