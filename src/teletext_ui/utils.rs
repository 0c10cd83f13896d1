use crossterm::style::Color;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Helper function to extract ANSI color code from crossterm Color enum.
/// Provides a fallback value for non-ANSI colors.
pub fn get_ansi_code(color: Color, fallback: u8) -> u8 {
    match color {
        Color::AnsiValue(val) => val,
        _ => fallback,
    }
}

/// Terminal column width of `text`; CJK characters count as two columns.
pub fn display_width(text: &str) -> usize {
    UnicodeWidthStr::width(text)
}

/// Truncates `text` to at most `width` columns, ending with `…` when cut.
pub fn truncate_to_width(text: &str, width: usize) -> String {
    if display_width(text) <= width {
        return text.to_string();
    }
    if width == 0 {
        return String::new();
    }

    let mut result = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let ch_width = ch.width().unwrap_or(0);
        if used + ch_width > width - 1 {
            break;
        }
        result.push(ch);
        used += ch_width;
    }
    result.push('…');
    result
}

/// Left-aligns `text` in exactly `width` columns.
pub fn pad_right(text: &str, width: usize) -> String {
    let fitted = truncate_to_width(text, width);
    let padding = width.saturating_sub(display_width(&fitted));
    format!("{fitted}{}", " ".repeat(padding))
}

/// Right-aligns `text` in exactly `width` columns.
pub fn pad_left(text: &str, width: usize) -> String {
    let fitted = truncate_to_width(text, width);
    let padding = width.saturating_sub(display_width(&fitted));
    format!("{}{fitted}", " ".repeat(padding))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_ansi_code() {
        assert_eq!(get_ansi_code(Color::AnsiValue(46), 0), 46);
        assert_eq!(get_ansi_code(Color::Red, 196), 196);
    }

    #[test]
    fn test_cjk_width() {
        assert_eq!(display_width("abc"), 3);
        assert_eq!(display_width("药屋"), 4);
    }

    #[test]
    fn test_truncate_cjk() {
        let truncated = truncate_to_width("药屋少女的呢喃", 7);
        assert_eq!(truncated, "药屋少…");
        assert!(display_width(&truncated) <= 7);
        assert_eq!(truncate_to_width("short", 10), "short");
    }

    #[test]
    fn test_padding_uses_columns() {
        assert_eq!(pad_right("药屋", 6), "药屋  ");
        assert_eq!(pad_left("8.1", 5), "  8.1");
        assert_eq!(display_width(&pad_right("药屋少女的呢喃 第二季", 12)), 12);
    }
}
