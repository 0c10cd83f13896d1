use crate::cli::Args;
use bangumi_rank::config::Config;
use bangumi_rank::constants::ui::TERMINAL_TITLE;
use bangumi_rank::data_fetcher::{RankingApi, RetryPolicy};
use bangumi_rank::error::AppError;
use bangumi_rank::ui;
use crossterm::{execute, terminal::SetTitle};
use std::io::stdout;

/// Run the interactive application flow.
///
/// - Sets the terminal title
/// - Runs the interactive UI, which owns raw mode and the alternate screen
/// - Reports where logs went once the terminal is restored
pub async fn run_interactive(args: &Args, config: &Config, log_file_path: &str) -> Result<(), AppError> {
    let api = RankingApi::from_config(config)?;
    let policy = RetryPolicy::from_config(config);

    // Set terminal title/header to show app name
    execute!(stdout(), SetTitle(TERMINAL_TITLE))?;

    let result =
        ui::run_interactive_ui(api, policy, args.season, args.sort_state(), args.debug).await;

    if let Err(e) = &result {
        tracing::error!("Interactive UI failed: {e}");
        eprintln!("Error: {e}. See {log_file_path} for details.");
    }
    result
}
