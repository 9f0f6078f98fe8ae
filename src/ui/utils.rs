use ratatui::layout::{Constraint, Direction, Layout, Rect};
use unicode_width::UnicodeWidthChar;

/// Creates a centered rectangle taking the given percentages of `r`,
/// growing to a usable minimum on small terminals
pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let percent_x = percent_x.min(100);
    let percent_y = percent_y.min(100);
    let min_width = 30u16;
    let min_height = 10u16;

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);
    let middle = vertical.get(1).copied().unwrap_or(r);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(middle);
    let mut result = horizontal.get(1).copied().unwrap_or(middle);

    if result.width < min_width && r.width >= min_width {
        result.width = min_width;
        result.x = r.x + (r.width - min_width) / 2;
    }
    if result.height < min_height && r.height >= min_height {
        result.height = min_height;
        result.y = r.y + (r.height - min_height) / 2;
    }
    result
}

/// Word-wraps by display width, trimming blank edges and collapsing runs
/// of blank lines to `max_empty_lines`
pub fn wrap_text(text: &str, max_width: usize, max_empty_lines: usize) -> Vec<String> {
    let mut lines = wrap_lines(text, max_width);
    while lines.first().is_some_and(String::is_empty) {
        lines.remove(0);
    }
    while lines.last().is_some_and(String::is_empty) {
        lines.pop();
    }

    let mut result = Vec::with_capacity(lines.len());
    let mut empty_run = 0usize;
    for line in lines {
        if line.is_empty() {
            empty_run += 1;
            if empty_run <= max_empty_lines {
                result.push(line);
            }
        } else {
            empty_run = 0;
            result.push(line);
        }
    }
    result
}

fn wrap_lines(text: &str, max_width: usize) -> Vec<String> {
    if max_width == 0 {
        return vec![String::new()];
    }

    let mut lines = Vec::new();
    for raw_line in text.lines() {
        let characters: Vec<char> = raw_line.chars().collect();
        if characters.is_empty() {
            lines.push(String::new());
            continue;
        }

        let mut start = 0usize;
        let mut index = 0usize;
        let mut width = 0usize;
        let mut last_space: Option<usize> = None;

        while let Some(&character) = characters.get(index) {
            let char_width = character.width().unwrap_or(0).max(1);
            if character.is_whitespace() {
                last_space = Some(index);
            }

            if width + char_width > max_width && width > 0 {
                let end = last_space.filter(|space| *space > start).unwrap_or(index);
                let line: String = characters.get(start..end).unwrap_or_default().iter().collect();
                lines.push(line.trim_end().to_string());

                start = if characters.get(end).is_some_and(|c| c.is_whitespace()) {
                    end + 1
                } else {
                    end
                };
                index = start;
                width = 0;
                last_space = None;
                continue;
            }

            width += char_width;
            index += 1;
        }

        if start < characters.len() {
            let line: String = characters.get(start..).unwrap_or_default().iter().collect();
            lines.push(line.trim_end().to_string());
        }
    }
    lines
}

/// Converts an offset counted up from the bottom into a top-based scroll
/// position. Returns `(scroll_from_top, clamped_offset)`.
pub fn scroll_position(
    total_lines: usize,
    visible_height: usize,
    offset_from_bottom: usize,
) -> (usize, usize) {
    let max_offset = total_lines.saturating_sub(visible_height);
    let offset = offset_from_bottom.min(max_offset);
    (max_offset - offset, offset)
}

/// Human-readable size in KB with one decimal, as shown in the file strip
#[must_use]
pub fn format_size_kb(size_bytes: u64) -> String {
    format!("{:.1} KB", size_bytes as f64 / 1024.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_breaks_on_spaces() {
        assert_eq!(
            wrap_text("the quick brown fox", 10, 1),
            vec!["the quick", "brown fox"]
        );
    }

    #[test]
    fn test_wrap_splits_long_words() {
        assert_eq!(wrap_text("abcdefghij", 4, 1), vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn test_wrap_collapses_blank_runs() {
        assert_eq!(
            wrap_text("\n\nfirst\n\n\n\nsecond\n\n", 20, 1),
            vec!["first", "", "second"]
        );
    }

    #[test]
    fn test_scroll_position_clamps() {
        assert_eq!(scroll_position(10, 20, 5), (0, 0));
        assert_eq!(scroll_position(50, 20, 0), (30, 0));
        assert_eq!(scroll_position(50, 20, 10), (20, 10));
        assert_eq!(scroll_position(50, 20, 100), (0, 30));
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size_kb(2048), "2.0 KB");
        assert_eq!(format_size_kb(0), "0.0 KB");
    }

    #[test]
    fn test_centered_rect_fits_inside() {
        let outer = Rect::new(0, 0, 100, 40);
        let inner = centered_rect(60, 50, outer);
        assert!(inner.x >= outer.x && inner.right() <= outer.right());
        assert!(inner.y >= outer.y && inner.bottom() <= outer.bottom());
        assert_eq!(inner.width, 60);
    }
}
