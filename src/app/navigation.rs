/// Wrapping up/down selection over a list
pub trait Navigable {
    fn get_item_count(&self) -> usize;

    fn get_selected_index(&self) -> usize;

    fn set_selected_index(&mut self, index: usize);

    /// Moves down one item, wrapping to the top
    fn next_item(&mut self) {
        let count = self.get_item_count();
        if count > 0 {
            self.set_selected_index((self.get_selected_index() + 1) % count);
        }
    }

    /// Moves up one item, wrapping to the bottom
    fn previous_item(&mut self) {
        let count = self.get_item_count();
        if count == 0 {
            return;
        }
        let current = self.get_selected_index().min(count - 1);
        let previous = current.checked_sub(1).unwrap_or(count - 1);
        self.set_selected_index(previous);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct List {
        len: usize,
        selected: usize,
    }

    impl Navigable for List {
        fn get_item_count(&self) -> usize {
            self.len
        }

        fn get_selected_index(&self) -> usize {
            self.selected
        }

        fn set_selected_index(&mut self, index: usize) {
            self.selected = index;
        }
    }

    #[test]
    fn test_wraps_both_ways() {
        let mut list = List { len: 3, selected: 2 };
        list.next_item();
        assert_eq!(list.selected, 0);
        list.previous_item();
        assert_eq!(list.selected, 2);
    }

    #[test]
    fn test_empty_list_is_untouched() {
        let mut list = List { len: 0, selected: 0 };
        list.next_item();
        list.previous_item();
        assert_eq!(list.selected, 0);
    }
}
