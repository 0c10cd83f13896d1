// src/teletext_ui/rendering.rs - Building the screen buffer for a TeletextPage

use super::core::{SubjectRow, TeletextPage, TeletextRow};
use super::footer::{calculate_footer_position, footer_text};
use super::utils::{display_width, get_ansi_code, pad_left, pad_right};
use crate::constants::ui::CONTENT_MARGIN;
use crate::ui::teletext::colors::*;

const RANK_WIDTH: usize = 5;
const SCORE_WIDTH: usize = 6;
const COLLECTION_WIDTH: usize = 8;
const COMMENTS_WIDTH: usize = 6;
const DROP_RATE_WIDTH: usize = 8;
const MIN_TITLE_WIDTH: usize = 12;

/// Column widths for a terminal width
fn title_width(width: usize) -> usize {
    let fixed = RANK_WIDTH + SCORE_WIDTH + COLLECTION_WIDTH + COMMENTS_WIDTH + DROP_RATE_WIDTH;
    width
        .saturating_sub(CONTENT_MARGIN * 2 + fixed + 1)
        .max(MIN_TITLE_WIDTH)
}

impl TeletextPage {
    /// Builds the whole screen as one string.
    ///
    /// Interactive pages position every line with cursor escapes and clear
    /// the screen first; pages that ignore the height limit emit plain lines.
    pub fn render_to_string(&self, width: u16) -> String {
        let width = width as usize;
        let lines = self.render_lines(width);

        if self.ignore_height_limit {
            let mut buffer = lines.join("\n");
            buffer.push('\n');
            return buffer;
        }

        let mut buffer = String::with_capacity(lines.iter().map(|l| l.len() + 8).sum::<usize>() + 16);
        buffer.push_str("\x1b[H"); // Move to home position
        buffer.push_str("\x1b[0J"); // Clear from cursor down

        let footer_y = calculate_footer_position(false, lines.len(), self.screen_height);
        let content_lines = if self.show_footer {
            lines.len().saturating_sub(1)
        } else {
            lines.len()
        };
        for (idx, line) in lines.iter().take(content_lines).enumerate() {
            buffer.push_str(&format!("\x1b[{};1H{line}", idx + 1));
        }
        if self.show_footer
            && let Some(footer) = lines.last()
        {
            // Convert 0-based footer_y to 1-based for ANSI cursor positioning
            buffer.push_str(&format!("\x1b[{};1H{footer}", footer_y + 1));
        }
        buffer
    }

    fn render_lines(&self, width: usize) -> Vec<String> {
        let title_bg_code = get_ansi_code(title_bg(), 46);
        let header_fg_code = get_ansi_code(header_fg(), 21);
        let header_bg_code = get_ansi_code(header_bg(), 21);
        let subheader_fg_code = get_ansi_code(subheader_fg(), 46);
        let column_fg_code = get_ansi_code(column_header_fg(), 201);

        let mut lines = Vec::new();

        // Header: title block on the left, page number and update time on the right
        let header_text = match &self.updated_at {
            Some(updated) => format!("BANGUMI {} {}", self.page_number, updated),
            None => format!("BANGUMI {}", self.page_number),
        };
        let header_width = width.saturating_sub(20);
        lines.push(format!(
            "\x1b[48;5;{}m\x1b[38;5;{}m{}\x1b[48;5;{}m\x1b[38;5;231m{}\x1b[0m",
            title_bg_code,
            header_fg_code,
            pad_right(&self.title, 20),
            header_bg_code,
            pad_left(&header_text, header_width),
        ));

        // Subheader with pagination info
        let total_pages = self.total_pages();
        let page_info = if total_pages > 1 && !self.ignore_height_limit {
            format!("{}/{}", self.current_page + 1, total_pages)
        } else {
            String::new()
        };
        let subheader_width = width.saturating_sub(display_width(&page_info));
        lines.push(format!(
            "\x1b[38;5;{}m{}{}\x1b[0m",
            subheader_fg_code,
            pad_right(&self.subheader, subheader_width),
            page_info
        ));

        let (visible_rows, _) = self.get_page_content();
        let title_w = title_width(width);
        let margin = " ".repeat(CONTENT_MARGIN);

        if visible_rows
            .iter()
            .any(|row| matches!(row, TeletextRow::Subject(_)))
        {
            lines.push(format!(
                "{margin}\x1b[38;5;{}m{}{} {}{}{}{}\x1b[0m",
                column_fg_code,
                pad_right("排名", RANK_WIDTH),
                pad_right("标题", title_w),
                pad_left("评分", SCORE_WIDTH),
                pad_left("收藏", COLLECTION_WIDTH),
                pad_left("吐槽", COMMENTS_WIDTH),
                pad_left("弃番率", DROP_RATE_WIDTH),
            ));
        } else {
            lines.push(String::new());
        }

        for row in visible_rows {
            match row {
                TeletextRow::Subject(subject) => {
                    lines.push(format!("{margin}{}", Self::format_subject_row(subject, title_w)));
                }
                TeletextRow::ErrorMessage(message) => {
                    lines.push(format!(
                        "{margin}\x1b[38;5;{}m{}\x1b[0m",
                        get_ansi_code(error_fg(), 196),
                        message
                    ));
                    lines.push(String::new());
                }
                TeletextRow::Notice(message) => {
                    lines.push(format!(
                        "{margin}\x1b[38;5;{}m{}\x1b[0m",
                        get_ansi_code(text_fg(), 231),
                        message
                    ));
                }
            }
        }

        if self.show_footer {
            lines.push(self.render_footer_line(width));
        }

        lines
    }

    fn format_subject_row(row: &SubjectRow, title_w: usize) -> String {
        let text_fg_code = get_ansi_code(text_fg(), 231);
        let rank_fg_code = if row.is_ranked {
            get_ansi_code(rank_fg(), 226)
        } else {
            text_fg_code
        };
        let score_fg_code = get_ansi_code(score_fg(), 51);

        format!(
            "\x1b[38;5;{}m{}\x1b[38;5;{}m{} \x1b[38;5;{}m{}\x1b[38;5;{}m{}{}{}\x1b[0m",
            rank_fg_code,
            pad_right(&row.rank, RANK_WIDTH),
            text_fg_code,
            pad_right(&row.title, title_w),
            score_fg_code,
            pad_left(&row.score, SCORE_WIDTH),
            text_fg_code,
            pad_left(&row.collection, COLLECTION_WIDTH),
            pad_left(&row.comments, COMMENTS_WIDTH),
            pad_left(&row.drop_rate, DROP_RATE_WIDTH),
        )
    }

    fn render_footer_line(&self, width: usize) -> String {
        let header_bg_code = get_ansi_code(header_bg(), 21);
        let text = footer_text(
            self.total_pages(),
            self.season_navigation,
            self.loading_indicator.as_ref(),
            self.error_warning_active,
        );
        let footer_width = width.saturating_sub(6);
        let padding = footer_width.saturating_sub(display_width(&text));
        let left = padding / 2;
        format!(
            "\x1b[48;5;{}m\x1b[38;5;21m{}\x1b[38;5;231m{}{}{}\x1b[38;5;21m{}\x1b[0m",
            header_bg_code,
            "   ",
            " ".repeat(left),
            text,
            " ".repeat(padding - left),
            "   "
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_fetcher::models::{Subject, SubjectImages, SubjectTitles};

    fn subject(rank: u32, name_cn: &str, collection_total: f64) -> Subject {
        Subject {
            id: rank as u64,
            titles: SubjectTitles {
                name: "Original".to_string(),
                name_cn: name_cn.to_string(),
            },
            images: SubjectImages::default(),
            rank,
            score: 8.04,
            collection_total,
            average_comment: 3.0,
            drop_rate: 0.015,
            air_weekday: Some("星期五".to_string()),
            meta_tags: vec![],
            updated_at: String::new(),
        }
    }

    fn strip_ansi(text: &str) -> String {
        let mut out = String::new();
        let mut chars = text.chars();
        while let Some(c) = chars.next() {
            if c == '\x1b' {
                for c in chars.by_ref() {
                    if c.is_ascii_alphabetic() {
                        break;
                    }
                }
            } else {
                out.push(c);
            }
        }
        out
    }

    #[test]
    fn test_plain_render_contains_formatted_values() {
        let mut page =
            TeletextPage::new(100, "番组排名".to_string(), "2025年4月 排名↑".to_string(), true, true);
        page.set_updated_at(Some("2025/05/01 20:00:00".to_string()));
        page.add_subject(&subject(1, "药屋少女的呢喃 第二季", 123456.0));
        page.add_subject(&subject(0, "", 50.0));

        let text = strip_ansi(&page.render_to_string(80));
        let lines: Vec<&str> = text.lines().collect();

        assert!(lines[0].starts_with("番组排名"));
        assert!(lines[0].ends_with("BANGUMI 100 2025/05/01 20:00:00"));
        assert!(lines[1].starts_with("2025年4月 排名↑"));
        assert!(lines[2].contains("弃番率"));
        assert!(lines[3].contains("药屋少女的呢喃 第二季"));
        assert!(lines[3].contains("12.3万"));
        assert!(lines[3].contains("8.0"));
        assert!(lines[3].contains("1.5%"));
        assert!(lines[4].trim_start().starts_with('-'));
        assert!(lines[4].contains("Original"));
        assert!(lines.last().unwrap().contains("q=退出"));
    }

    #[test]
    fn test_rows_fill_terminal_width() {
        let mut page = TeletextPage::new(100, "T".to_string(), "S".to_string(), false, true);
        page.add_subject(&subject(1, "很长很长很长很长很长很长很长很长很长很长很长的标题", 1.0));
        let text = strip_ansi(&page.render_to_string(80));
        let row = text.lines().nth(3).unwrap();
        assert_eq!(display_width(row), 80 - CONTENT_MARGIN);
        assert!(row.contains('…'));
    }

    #[test]
    fn test_interactive_render_positions_lines() {
        let mut page = TeletextPage::new(100, "T".to_string(), "S".to_string(), true, true);
        page.ignore_height_limit = false;
        page.screen_height = 24;
        page.add_error_message("加载失败");
        page.set_error_warning(true);

        let buffer = page.render_to_string(80);
        assert!(buffer.starts_with("\x1b[H\x1b[0J"));
        assert!(buffer.contains("\x1b[4;1H"));
        assert!(buffer.contains("\x1b[24;1H"));
        assert!(strip_ansi(&buffer).contains("t=重试"));
    }

    #[test]
    fn test_title_width_has_minimum() {
        assert_eq!(title_width(10), MIN_TITLE_WIDTH);
        assert!(title_width(120) > title_width(80));
    }
}
