/// Lines moved per PageUp/PageDown
const PAGE_LINES: usize = 20;

impl crate::app::App {
    /// Scrolls toward older messages; offset counts lines up from the bottom
    pub fn scroll_chat_up_lines(&mut self, lines: usize) {
        self.chat_auto_scroll = false;
        self.chat_scroll_offset = self.chat_scroll_offset.saturating_add(lines);
    }

    pub fn scroll_chat_down_lines(&mut self, lines: usize) {
        self.chat_scroll_offset = self.chat_scroll_offset.saturating_sub(lines);
        if self.chat_scroll_offset == 0 {
            self.chat_auto_scroll = true;
        }
    }

    pub fn scroll_chat_up_page(&mut self) {
        self.scroll_chat_up_lines(PAGE_LINES);
    }

    pub fn scroll_chat_down_page(&mut self) {
        self.scroll_chat_down_lines(PAGE_LINES);
    }

    pub fn reset_chat_scroll(&mut self) {
        self.chat_scroll_offset = 0;
        self.chat_auto_scroll = true;
    }
}

#[cfg(test)]
mod tests {
    use crate::agents::testing::ScriptedBackend;
    use crate::app::test_support::app_with;

    #[test]
    fn test_scrolling_back_to_bottom_resumes_follow() {
        let mut app = app_with(ScriptedBackend::default());
        app.scroll_chat_up_page();
        assert_eq!(app.chat_scroll_offset, 20);
        assert!(!app.chat_auto_scroll);

        app.scroll_chat_down_lines(5);
        assert!(!app.chat_auto_scroll);
        app.scroll_chat_down_page();
        assert_eq!(app.chat_scroll_offset, 0);
        assert!(app.chat_auto_scroll);
    }
}
