mod chat;
mod components;
mod help;
mod menu;
mod sidebar;
mod utils;

use crate::app::{App, AppMode};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout},
};

/// Sidebar width in columns
const SIDEBAR_WIDTH: u16 = 32;

pub fn render(f: &mut Frame, app: &App) {
    if app.mode == AppMode::Help {
        help::render_help_view(f);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(0)])
        .split(f.area());
    if let [sidebar_area, chat_area] = &chunks[..] {
        sidebar::render_sidebar(f, app, *sidebar_area);
        chat::render_chat_view(f, app, *chat_area);
    }

    if app.mode == AppMode::CommandMenu {
        menu::render_command_menu(f, app);
    }
}
