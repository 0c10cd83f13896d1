//! Keyboard input handling for the interactive UI.
//!
//! - `q` / `Esc` / `Ctrl+C` quit
//! - `←` `→` change page, `↑` `↓` change season
//! - `1`-`5` pick the sort key, pressing the active one flips direction
//! - `r` force refresh, `t` retry after an error

use super::state_manager::InteractiveState;
use crate::data_fetcher::processors::SortField;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Sort key bound to a digit key
fn sort_field_for_key(c: char) -> Option<SortField> {
    let index = c.to_digit(10)?.checked_sub(1)? as usize;
    SortField::ALL.get(index).copied()
}

/// Handles one key event. Returns true when the UI should exit.
pub(super) fn handle_key_event(state: &mut InteractiveState, key_event: &KeyEvent) -> bool {
    if key_event.kind != KeyEventKind::Press {
        return false;
    }
    tracing::debug!("Key event: {:?}", key_event);

    match key_event.code {
        KeyCode::Char('q') | KeyCode::Esc => {
            tracing::info!("Quit requested");
            return true;
        }
        KeyCode::Char('c') if key_event.modifiers.contains(KeyModifiers::CONTROL) => {
            return true;
        }
        KeyCode::Left => {
            if let Some(page) = &mut state.ui.current_page {
                page.previous_page();
                state.ui.request_render();
            }
        }
        KeyCode::Right => {
            if let Some(page) = &mut state.ui.current_page {
                page.next_page();
                state.ui.request_render();
            }
        }
        KeyCode::Up => state.navigate_season(-1),
        KeyCode::Down => state.navigate_season(1),
        KeyCode::Char('r') => {
            tracing::info!("Manual refresh requested");
            state.force_refresh();
        }
        KeyCode::Char('t') => {
            tracing::info!("Retry requested");
            state.retry();
        }
        KeyCode::Char(c) => {
            if let Some(field) = sort_field_for_key(c) {
                state.toggle_sort(field);
            }
        }
        _ => {}
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digit_keys_map_to_sort_fields() {
        assert_eq!(sort_field_for_key('1'), Some(SortField::Rank));
        assert_eq!(sort_field_for_key('3'), Some(SortField::CollectionTotal));
        assert_eq!(sort_field_for_key('5'), Some(SortField::DropRate));
        assert_eq!(sort_field_for_key('0'), None);
        assert_eq!(sort_field_for_key('6'), None);
        assert_eq!(sort_field_for_key('x'), None);
    }
}
