/// Single-line editable text with a character cursor
#[derive(Debug, Clone, Default)]
pub struct TextInput {
    content: String,
    cursor_index: usize,
}

impl TextInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a character at the cursor
    pub fn add_char(&mut self, character: char) {
        let insert_index = char_to_byte_index(&self.content, self.cursor_index);
        self.content.insert(insert_index, character);
        self.cursor_index = self.cursor_index.saturating_add(1);
    }

    /// Removes the character before the cursor (backspace)
    pub fn remove_char(&mut self) {
        if self.cursor_index == 0 {
            return;
        }
        let end_index = char_to_byte_index(&self.content, self.cursor_index);
        let start_index = char_to_byte_index(&self.content, self.cursor_index - 1);
        self.content.replace_range(start_index..end_index, "");
        self.cursor_index -= 1;
    }

    /// Removes the character under the cursor (delete)
    pub fn delete_char(&mut self) {
        if self.cursor_index >= self.char_count() {
            return;
        }
        let start_index = char_to_byte_index(&self.content, self.cursor_index);
        let end_index = char_to_byte_index(&self.content, self.cursor_index + 1);
        self.content.replace_range(start_index..end_index, "");
    }

    pub fn move_left(&mut self) {
        self.cursor_index = self.cursor_index.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        if self.cursor_index < self.char_count() {
            self.cursor_index += 1;
        }
    }

    pub fn move_to_start(&mut self) {
        self.cursor_index = 0;
    }

    pub fn move_to_end(&mut self) {
        self.cursor_index = self.char_count();
    }

    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Cursor position in characters
    #[must_use]
    pub fn cursor_position(&self) -> usize {
        self.cursor_index
    }

    pub fn clear(&mut self) {
        self.content.clear();
        self.cursor_index = 0;
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Replaces the content and puts the cursor at the end
    pub fn set_content(&mut self, content: String) {
        self.content = content;
        self.cursor_index = self.char_count();
    }

    fn char_count(&self) -> usize {
        self.content.chars().count()
    }
}

fn char_to_byte_index(value: &str, char_index: usize) -> usize {
    value
        .char_indices()
        .nth(char_index)
        .map_or(value.len(), |(index, _)| index)
}
