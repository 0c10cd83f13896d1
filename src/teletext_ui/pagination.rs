// src/teletext_ui/pagination.rs - Splitting rows into screen-sized pages

use super::core::{TeletextPage, TeletextRow};
use crate::constants::ui::CHROME_LINES;

impl TeletextPage {
    /// Terminal lines a row occupies
    pub(super) fn row_height(row: &TeletextRow) -> usize {
        match row {
            TeletextRow::Subject(_) | TeletextRow::Notice(_) => 1,
            TeletextRow::ErrorMessage(_) => 2, // Message + spacer
        }
    }

    fn available_height(&self) -> usize {
        (self.screen_height as usize).saturating_sub(CHROME_LINES).max(1)
    }

    /// Row index ranges of every page, in order.
    fn page_ranges(&self) -> Vec<(usize, usize)> {
        if self.ignore_height_limit || self.content_rows.is_empty() {
            return vec![(0, self.content_rows.len())];
        }

        let available = self.available_height();
        let mut ranges = Vec::new();
        let mut start = 0;
        let mut height = 0;
        for (idx, row) in self.content_rows.iter().enumerate() {
            let row_height = Self::row_height(row);
            if height + row_height > available && idx > start {
                ranges.push((start, idx));
                start = idx;
                height = 0;
            }
            height += row_height;
        }
        ranges.push((start, self.content_rows.len()));
        ranges
    }

    /// Rows on the current page and whether more pages follow.
    pub(super) fn get_page_content(&self) -> (Vec<&TeletextRow>, bool) {
        let ranges = self.page_ranges();
        match ranges.get(self.current_page) {
            Some(&(start, end)) => (
                self.content_rows[start..end].iter().collect(),
                self.current_page + 1 < ranges.len(),
            ),
            None => (Vec::new(), false),
        }
    }

    /// Total number of pages needed for the current screen height.
    pub fn total_pages(&self) -> usize {
        self.page_ranges().len()
    }

    /// Moves to the next page, wrapping to the first.
    pub fn next_page(&mut self) {
        let total = self.total_pages();
        if total <= 1 {
            return;
        }
        self.current_page = (self.current_page + 1) % total;
    }

    /// Moves to the previous page, wrapping to the last.
    pub fn previous_page(&mut self) {
        let total = self.total_pages();
        if total <= 1 {
            return;
        }
        self.current_page = if self.current_page == 0 {
            total - 1
        } else {
            self.current_page - 1
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_with_notices(count: usize, screen_height: u16) -> TeletextPage {
        let mut page = TeletextPage::new(100, "T".to_string(), "S".to_string(), true, true);
        page.ignore_height_limit = false;
        page.screen_height = screen_height;
        for i in 0..count {
            page.add_notice(&format!("row {i}"));
        }
        page
    }

    #[test]
    fn test_single_page_when_ignoring_height() {
        let mut page = TeletextPage::new(100, "T".to_string(), "S".to_string(), false, true);
        for i in 0..100 {
            page.add_notice(&format!("row {i}"));
        }
        assert_eq!(page.total_pages(), 1);
        assert_eq!(page.get_page_content().0.len(), 100);
    }

    #[test]
    fn test_rows_split_by_screen_height() {
        // 17 lines minus chrome leaves 10 rows per page
        let page = page_with_notices(25, 17);
        assert_eq!(page.total_pages(), 3);

        let (rows, has_more) = page.get_page_content();
        assert_eq!(rows.len(), 10);
        assert!(has_more);
    }

    #[test]
    fn test_page_navigation_wraps() {
        let mut page = page_with_notices(25, 17);
        page.previous_page();
        assert_eq!(page.current_page(), 2);
        let (rows, has_more) = page.get_page_content();
        assert_eq!(rows.len(), 5);
        assert!(!has_more);

        page.next_page();
        assert_eq!(page.current_page(), 0);
    }

    #[test]
    fn test_error_rows_take_two_lines() {
        let mut page = page_with_notices(0, 11);
        for i in 0..4 {
            page.add_error_message(&format!("error {i}"));
        }
        // 4 available lines fit two error rows
        assert_eq!(page.total_pages(), 2);
    }

    #[test]
    fn test_set_current_page_clamps() {
        let mut page = page_with_notices(25, 17);
        page.set_current_page(10);
        assert_eq!(page.current_page(), 2);
        page.set_screen_height(100);
        assert_eq!(page.current_page(), 0);
    }
}
