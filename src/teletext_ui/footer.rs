//! Footer text and placement for teletext pages
//!
//! The footer lists the control keys available on the current page and
//! carries the loading animation and the error warning.

use crate::ui::teletext::loading_indicator::LoadingIndicator;

/// Builds the footer text.
///
/// # Arguments
/// * `total_pages` - Page count; page keys are listed only when more than one
/// * `season_navigation` - Whether season switching keys are listed
/// * `loading_indicator` - Optional loading indicator appended after the keys
/// * `error_warning_active` - Adds the retry key and a warning sign
pub fn footer_text(
    total_pages: usize,
    season_navigation: bool,
    loading_indicator: Option<&LoadingIndicator>,
    error_warning_active: bool,
) -> String {
    let mut controls = vec!["q=退出"];
    if total_pages > 1 {
        controls.push("←→=翻页");
    }
    if season_navigation {
        controls.push("↑↓=季度");
    }
    controls.push("1-5=排序");
    controls.push("r=刷新");
    if error_warning_active {
        controls.push("t=重试");
    }

    let mut text = controls.join(" ");
    if let Some(loading) = loading_indicator {
        text.push_str(&format!(" {} {}", loading.current_frame(), loading.message()));
    }
    if error_warning_active {
        text.push_str("  ⚠");
    }
    text
}

/// Calculates the footer position based on settings and screen size
///
/// # Arguments
/// * `ignore_height_limit` - Whether to ignore terminal height limits
/// * `current_line` - The current line position
/// * `screen_height` - The height of the terminal
///
/// # Returns
/// * `usize` - The 0-based y-coordinate of the footer
pub fn calculate_footer_position(
    ignore_height_limit: bool,
    current_line: usize,
    screen_height: u16,
) -> usize {
    if ignore_height_limit {
        // In non-interactive mode, position footer after content
        current_line + 1
    } else {
        // In interactive mode, position footer at bottom of screen
        screen_height.saturating_sub(1) as usize
    }
}
