// src/teletext_ui/core.rs - TeletextPage struct and page state

use crate::data_fetcher::models::Subject;
use crate::data_fetcher::processors::{
    format_drop_rate, format_number, format_rank, format_score,
};
use crate::error::AppError;
use crate::ui::teletext::LoadingIndicator;
use crossterm::{execute, style::Print};
use std::io::Write;

/// Display-ready values of one ranked subject.
#[derive(Debug, Clone, PartialEq)]
pub struct SubjectRow {
    pub rank: String,
    pub title: String,
    pub score: String,
    pub collection: String,
    pub comments: String,
    pub drop_rate: String,
    pub is_ranked: bool,
}

impl SubjectRow {
    pub fn from_subject(subject: &Subject) -> Self {
        Self {
            rank: format_rank(subject.rank),
            title: subject.display_title().to_string(),
            score: format_score(subject.score),
            collection: format_number(subject.collection_total),
            comments: format_number(subject.average_comment),
            drop_rate: format_drop_rate(subject.drop_rate),
            is_ranked: subject.is_ranked(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum TeletextRow {
    Subject(SubjectRow),
    ErrorMessage(String),
    Notice(String),
}

/// A teletext-style ranking page: header, subheader, column header,
/// paginated rows and an optional footer.
#[derive(Debug, Clone)]
pub struct TeletextPage {
    pub(super) page_number: u16,
    pub(super) title: String,
    pub(super) subheader: String,
    pub(super) content_rows: Vec<TeletextRow>,
    pub(super) current_page: usize,
    pub(super) screen_height: u16,
    pub(super) show_footer: bool,
    pub(super) ignore_height_limit: bool,
    pub(super) updated_at: Option<String>,
    pub(super) loading_indicator: Option<LoadingIndicator>,
    pub(super) error_warning_active: bool,
    pub(super) season_navigation: bool,
}

impl TeletextPage {
    /// Creates a new page.
    ///
    /// `ignore_height_limit` puts every row on a single page and renders
    /// plain lines instead of cursor-positioned output (used by `--once`).
    ///
    /// # Example
    /// ```
    /// use bangumi_rank::teletext_ui::TeletextPage;
    ///
    /// let mut page = TeletextPage::new(100, "番组排名".to_string(), "2025年4月".to_string(), false, true);
    /// page.add_error_message("无法获取数据");
    /// assert_eq!(page.total_pages(), 1);
    /// ```
    pub fn new(
        page_number: u16,
        title: String,
        subheader: String,
        show_footer: bool,
        ignore_height_limit: bool,
    ) -> Self {
        let screen_height = if ignore_height_limit {
            0
        } else {
            crossterm::terminal::size().map(|(_, h)| h).unwrap_or(24)
        };

        TeletextPage {
            page_number,
            title,
            subheader,
            content_rows: Vec::new(),
            current_page: 0,
            screen_height,
            show_footer,
            ignore_height_limit,
            updated_at: None,
            loading_indicator: None,
            error_warning_active: false,
            season_navigation: true,
        }
    }

    pub fn add_subject(&mut self, subject: &Subject) {
        self.content_rows
            .push(TeletextRow::Subject(SubjectRow::from_subject(subject)));
    }

    pub fn add_subjects<'a>(&mut self, subjects: impl IntoIterator<Item = &'a Subject>) {
        for subject in subjects {
            self.add_subject(subject);
        }
    }

    pub fn add_error_message(&mut self, message: &str) {
        self.content_rows
            .push(TeletextRow::ErrorMessage(message.to_string()));
    }

    pub fn add_notice(&mut self, message: &str) {
        self.content_rows.push(TeletextRow::Notice(message.to_string()));
    }

    pub fn rows(&self) -> &[TeletextRow] {
        &self.content_rows
    }

    pub fn subject_count(&self) -> usize {
        self.content_rows
            .iter()
            .filter(|row| matches!(row, TeletextRow::Subject(_)))
            .count()
    }

    /// Timestamp shown on the header line
    pub fn set_updated_at(&mut self, updated_at: Option<String>) {
        self.updated_at = updated_at;
    }

    pub fn set_screen_height(&mut self, height: u16) {
        self.screen_height = height;
        self.current_page = self.current_page.min(self.total_pages().saturating_sub(1));
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    /// Restores a page index after the page was rebuilt, clamped to range.
    pub fn set_current_page(&mut self, page: usize) {
        self.current_page = page.min(self.total_pages().saturating_sub(1));
    }

    pub fn show_loading(&mut self, message: &str) {
        self.loading_indicator = Some(LoadingIndicator::new(message));
    }

    pub fn hide_loading(&mut self) {
        self.loading_indicator = None;
    }

    pub fn is_loading(&self) -> bool {
        self.loading_indicator.is_some()
    }

    pub fn update_loading_animation(&mut self) {
        if let Some(indicator) = &mut self.loading_indicator {
            indicator.next_frame();
        }
    }

    /// Shows the footer warning and the retry key
    pub fn set_error_warning(&mut self, active: bool) {
        self.error_warning_active = active;
    }

    pub fn set_season_navigation(&mut self, enabled: bool) {
        self.season_navigation = enabled;
    }

    /// Renders the page into `out` in a single write.
    pub fn render_buffered<W: Write>(&self, out: &mut W) -> Result<(), AppError> {
        let width = if self.ignore_height_limit {
            80u16
        } else {
            execute!(out, crossterm::cursor::Hide)?;
            crossterm::terminal::size().map(|(w, _)| w).unwrap_or(80)
        };

        let buffer = self.render_to_string(width);
        execute!(out, Print(buffer))?;

        if !self.ignore_height_limit {
            execute!(out, crossterm::cursor::Show)?;
        }
        out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_fetcher::models::{SubjectImages, SubjectTitles};

    fn subject(id: u64, rank: u32, name_cn: &str) -> Subject {
        Subject {
            id,
            titles: SubjectTitles {
                name: format!("Original {id}"),
                name_cn: name_cn.to_string(),
            },
            images: SubjectImages::default(),
            rank,
            score: 7.25,
            collection_total: 12345.0,
            average_comment: 42.0,
            drop_rate: 0.234,
            air_weekday: None,
            meta_tags: vec![],
            updated_at: String::new(),
        }
    }

    #[test]
    fn test_subject_row_formats_values() {
        let row = SubjectRow::from_subject(&subject(1, 0, "测试"));
        assert_eq!(row.rank, "-");
        assert_eq!(row.title, "测试");
        assert_eq!(row.collection, "1.2万");
        assert_eq!(row.comments, "42");
        assert_eq!(row.drop_rate, "23.4%");
        assert!(!row.is_ranked);
    }

    #[test]
    fn test_page_collects_rows() {
        let mut page = TeletextPage::new(100, "T".to_string(), "S".to_string(), true, true);
        page.add_subjects(&[subject(1, 1, "甲"), subject(2, 2, "")]);
        page.add_notice("共 2 部");

        assert_eq!(page.rows().len(), 3);
        assert_eq!(page.subject_count(), 2);
        match &page.rows()[1] {
            TeletextRow::Subject(row) => assert_eq!(row.title, "Original 2"),
            other => panic!("unexpected row {other:?}"),
        }
    }

    #[test]
    fn test_loading_indicator_toggle() {
        let mut page = TeletextPage::new(100, "T".to_string(), "S".to_string(), true, true);
        page.show_loading("加载中");
        assert!(page.is_loading());
        page.update_loading_animation();
        page.hide_loading();
        assert!(!page.is_loading());
    }

    #[test]
    fn test_render_buffered_plain_output() {
        let mut page = TeletextPage::new(100, "番组排名".to_string(), "2025年4月".to_string(), false, true);
        page.add_subject(&subject(1, 1, "药屋少女的呢喃"));

        let mut out = Vec::new();
        page.render_buffered(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("药屋少女的呢喃"));
        assert!(text.contains("23.4%"));
    }
}
