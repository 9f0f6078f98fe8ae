use crate::app::{App, AppMode};

/// Shortcut groups shown on the help screen
pub const HELP_SECTIONS: &[(&str, &[(&str, &str)])] = &[
    (
        "Cases",
        &[
            ("Ctrl+N", "New case"),
            ("Tab", "Switch focus between cases and input"),
            ("Up/Down", "Move through cases (sidebar)"),
            ("Enter", "Open case (sidebar)"),
            ("Del/Ctrl+D", "Delete case (sidebar)"),
        ],
    ),
    (
        "Analysis",
        &[
            ("Enter", "Submit prompt"),
            ("Ctrl+T", "Toggle extended reasoning"),
            ("Ctrl+R", "Start/stop voice input"),
            ("PgUp/PgDn", "Scroll transcript"),
        ],
    ),
    (
        "Input commands",
        &[
            (":attach <path>...", "Add files to the case"),
            (":detach <name>", "Remove a file from the case"),
        ],
    ),
    (
        "General",
        &[
            ("/", "Command menu (empty input)"),
            ("Esc", "Back/close"),
            ("Ctrl+C", "Quit"),
        ],
    ),
];

impl App {
    pub fn open_help(&mut self) {
        self.previous_mode = None;
        self.mode = AppMode::Help;
    }

    pub fn close_help(&mut self) {
        self.mode = AppMode::Chat;
    }
}
