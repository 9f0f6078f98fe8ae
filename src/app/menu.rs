use crate::app::types::MenuItem;
use crate::app::{App, AppMode, Focus, Navigable};

impl App {
    pub fn open_command_menu(&mut self) {
        self.previous_mode = Some(self.mode.clone());
        self.mode = AppMode::CommandMenu;
        self.input.clear();
        self.selected_index = 0;
    }

    pub fn close_menu(&mut self) {
        self.mode = self.previous_mode.take().unwrap_or(AppMode::Chat);
        if self.mode == AppMode::CommandMenu {
            self.mode = AppMode::Chat;
        }
        self.input.clear();
        self.selected_index = 0;
    }

    pub fn add_input_char(&mut self, character: char) {
        self.input.push(character);
        self.selected_index = 0;
    }

    pub fn remove_input_char(&mut self) {
        self.input.pop();
        self.selected_index = 0;
    }

    /// Palette entries whose name or description contains the typed filter
    #[must_use]
    pub fn filtered_items(&self) -> Vec<MenuItem> {
        if self.input.is_empty() {
            return self.menu_items.clone();
        }

        let query = self.input.to_lowercase();
        self.menu_items
            .iter()
            .filter(|item| {
                item.name.to_lowercase().contains(&query)
                    || item.description.to_lowercase().contains(&query)
            })
            .cloned()
            .collect()
    }
}

// Up/Down move through the palette while it is open, otherwise the case list
impl Navigable for App {
    fn get_item_count(&self) -> usize {
        if self.mode == AppMode::CommandMenu {
            self.filtered_items().len()
        } else {
            self.store.cases().len()
        }
    }

    fn get_selected_index(&self) -> usize {
        if self.mode == AppMode::CommandMenu {
            self.selected_index
        } else {
            self.sidebar_index
        }
    }

    fn set_selected_index(&mut self, index: usize) {
        if self.mode == AppMode::CommandMenu {
            self.selected_index = index;
        } else if self.focus == Focus::Sidebar {
            self.sidebar_index = index;
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::agents::testing::ScriptedBackend;
    use crate::app::test_support::app_with;
    use crate::app::{AppMode, Focus, Navigable};

    #[test]
    fn test_filter_matches_name_or_description() {
        let mut app = app_with(ScriptedBackend::default());
        app.open_command_menu();
        for character in "voice".chars() {
            app.add_input_char(character);
        }
        let names: Vec<String> = app.filtered_items().into_iter().map(|item| item.name).collect();
        assert_eq!(names, vec!["record"]);

        app.remove_input_char();
        app.input.clear();
        assert_eq!(app.filtered_items().len(), app.menu_items.len());
    }

    #[test]
    fn test_navigation_targets_palette_or_sidebar() {
        let mut app = app_with(ScriptedBackend::default());
        app.create_case();
        app.create_case();
        app.focus = Focus::Sidebar;

        app.next_item();
        assert_eq!(app.sidebar_index, 1);
        app.next_item();
        assert_eq!(app.sidebar_index, 0);

        app.open_command_menu();
        app.previous_item();
        assert_eq!(app.selected_index, app.menu_items.len() - 1);
        assert_eq!(app.sidebar_index, 0);

        app.close_menu();
        assert_eq!(app.mode, AppMode::Chat);
    }
}
