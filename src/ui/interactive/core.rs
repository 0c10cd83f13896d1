//! Main interactive UI loop
//!
//! The loop never awaits a fetch: streams load on spawned tasks and the loop
//! redraws whenever a stream publishes a new snapshot.

use super::input_handler::handle_key_event;
use super::state_manager::InteractiveState;
use crate::constants::ui::POLL_INTERVAL_MS;
use crate::data_fetcher::models::SeasonId;
use crate::data_fetcher::processors::SortState;
use crate::data_fetcher::{RankingApi, RetryPolicy};
use crate::error::AppError;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use std::io::{Stdout, stdout};
use std::time::Duration;

const ANIMATION_INTERVAL: Duration = Duration::from_millis(200);

/// Setup terminal for interactive mode
fn setup_terminal(debug_mode: bool) -> Result<Stdout, AppError> {
    let mut stdout = stdout();

    if !debug_mode {
        enable_raw_mode()?;
        execute!(stdout, EnterAlternateScreen)?;
    }

    Ok(stdout)
}

/// Cleanup terminal after interactive mode
fn cleanup_terminal(debug_mode: bool, mut stdout: Stdout) -> Result<(), AppError> {
    if !debug_mode {
        disable_raw_mode()?;
        execute!(stdout, LeaveAlternateScreen)?;
    }
    Ok(())
}

/// Runs the interactive ranking viewer until the user quits.
pub async fn run_interactive_ui(
    api: RankingApi,
    policy: RetryPolicy,
    season: Option<SeasonId>,
    sort: SortState,
    debug_mode: bool,
) -> Result<(), AppError> {
    let mut stdout = setup_terminal(debug_mode)?;
    let mut state = InteractiveState::new(api, policy, season, sort);

    let result = event_loop(&mut state, &mut stdout).await;

    // Restore the terminal even when the loop failed
    cleanup_terminal(debug_mode, stdout)?;
    result
}

async fn event_loop(state: &mut InteractiveState, stdout: &mut Stdout) -> Result<(), AppError> {
    let poll_interval = Duration::from_millis(POLL_INTERVAL_MS);

    loop {
        state.sync_with_streams();

        if state.timers.last_animation.elapsed() >= ANIMATION_INTERVAL {
            if let Some(page) = &mut state.ui.current_page
                && page.is_loading()
            {
                page.update_loading_animation();
                state.ui.request_render();
            }
            state.timers.update_animation();
        }

        // Batched UI rendering - only render when necessary
        if state.ui.needs_render {
            if let Some(page) = &state.ui.current_page {
                page.render_buffered(stdout)?;
                tracing::trace!("UI rendered");
            }
            state.ui.clear_render_flag();
        }

        if event::poll(poll_interval)? {
            state.timers.update_activity();
            match event::read()? {
                Event::Key(key_event) => {
                    if handle_key_event(state, &key_event) {
                        break;
                    }
                }
                Event::Resize(_, height) => {
                    tracing::debug!("Terminal resized to height {height}");
                    if let Some(page) = &mut state.ui.current_page {
                        page.set_screen_height(height);
                    }
                    state.ui.request_render();
                }
                _ => {}
            }
        }

        // Let spawned fetches progress on this worker too
        tokio::task::yield_now().await;
    }

    Ok(())
}
