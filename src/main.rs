// src/main.rs
mod app;
mod cli;
mod commands;
mod logging;

use bangumi_rank::config::Config;
use bangumi_rank::error::AppError;
use clap::Parser;
use cli::{Args, is_config_update};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let args = Args::parse();

    commands::validate_args(&args)?;

    let (log_file_path, _guard) = logging::setup_logging(&args).await?;
    tracing::info!("Logs are being written to: {log_file_path}");

    if args.version {
        return commands::handle_version_command();
    }

    // Handle configuration operations first; they don't need a valid config
    if args.list_config {
        return commands::handle_list_config_command().await;
    }
    if is_config_update(&args) {
        return commands::handle_config_update_command(&args).await;
    }

    let config = Config::load().await?;
    tracing::debug!("Using API base URL {}", config.api_base_url);

    if args.check_api {
        return commands::handle_check_api_command(&config).await;
    }
    if args.list_seasons {
        return commands::handle_list_seasons_command(&args, &config).await;
    }
    if args.once {
        return commands::handle_once_command(&args, &config).await;
    }

    app::run_interactive(&args, &config, &log_file_path).await
}
