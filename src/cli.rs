use bangumi_rank::data_fetcher::models::SeasonId;
use bangumi_rank::data_fetcher::processors::{SortField, SortState};
use clap::Parser;
use clap::builder::styling::{AnsiColor, Effects, Styles};

fn get_styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
        .usage(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::Yellow.on_default())
        .error(AnsiColor::Red.on_default().effects(Effects::BOLD))
        .valid(AnsiColor::Green.on_default())
        .invalid(AnsiColor::Red.on_default())
}

/// Determines if the application should run in non-interactive mode
/// Non-interactive mode is used when any of these conditions are met:
/// - --once flag is set (print once and exit)
/// - --list-seasons or --check-api is requested
/// - config operations are requested
/// - --debug mode is enabled
pub fn is_noninteractive_mode(args: &Args) -> bool {
    args.once
        || args.list_seasons
        || args.check_api
        || is_config_update(args)
        || args.list_config
        || args.debug
}

/// True when any argument asks to change the stored configuration
pub fn is_config_update(args: &Args) -> bool {
    args.new_api_base_url.is_some() || args.new_log_file_path.is_some() || args.clear_log_file_path
}

/// Seasonal anime rankings in a teletext-style terminal view
///
/// Shows the ranked anime of a quarterly season with score, collection
/// count, comment count and drop rate.
///
/// In interactive mode (default):
/// - Use arrow keys (←/→) to navigate between pages
/// - Use ↑/↓ to switch between seasons
/// - Press 1-5 to sort by rank, score, collections, comments or drop rate
///   (pressing the active key flips the direction)
/// - Press 'r' to refresh, 't' to retry after an error
/// - Press 'q' to quit
///
/// Rankings are re-checked in the background and refetched once they are
/// older than 30 minutes.
#[derive(Parser, Debug)]
#[command(about, long_about = None)]
#[command(disable_version_flag = true)]
#[command(styles = get_styles())]
pub struct Args {
    /// Show the rankings once and exit. The output stays visible in terminal history.
    #[arg(short, long)]
    pub once: bool,

    /// Season to show in YYYYMM format, e.g. 202504.
    /// Defaults to the current season reported by the API.
    #[arg(short = 's', long = "season", value_parser = parse_season, help_heading = "Display Options")]
    pub season: Option<SeasonId>,

    /// Sort key: rank, score, collection, comments or drop-rate.
    #[arg(long = "sort", default_value = "rank", help_heading = "Display Options")]
    pub sort: SortField,

    /// Reverse the default direction of the sort key.
    #[arg(long = "reverse", help_heading = "Display Options")]
    pub reverse: bool,

    /// Automatic retries for retryable errors in --once mode.
    #[arg(long = "retries", default_value_t = bangumi_rank::constants::retry::ONCE_MODE_RETRIES, help_heading = "Display Options")]
    pub retries: u32,

    /// List the available seasons grouped by year and exit.
    #[arg(long = "list-seasons", help_heading = "Info")]
    pub list_seasons: bool,

    /// Check that the ranking API answers and exit.
    #[arg(long = "check-api", help_heading = "Info")]
    pub check_api: bool,

    /// Show version information
    #[arg(short = 'V', long = "version", help_heading = "Info")]
    pub version: bool,

    /// Update the API base URL in config.
    #[arg(long = "config", help_heading = "Configuration", value_name = "API_BASE_URL")]
    pub new_api_base_url: Option<String>,

    /// Update log file path in config. This sets a persistent custom log file location.
    #[arg(long = "set-log-file", help_heading = "Configuration")]
    pub new_log_file_path: Option<String>,

    /// Clear the custom log file path from config. This reverts to using the default log location.
    #[arg(long = "clear-log-file", help_heading = "Configuration")]
    pub clear_log_file_path: bool,

    /// List current configuration settings
    #[arg(long = "list-config", short = 'l', help_heading = "Configuration")]
    pub list_config: bool,

    /// Enable debug mode which doesn't clear the terminal before drawing the UI.
    /// Logs are also printed to the terminal.
    #[arg(long = "debug", help_heading = "Debug")]
    pub debug: bool,

    /// Specify a custom log file path. If not provided, logs will be written to the default location.
    #[arg(long = "log-file", help_heading = "Debug")]
    pub log_file: Option<String>,
}

impl Args {
    /// Initial ordering from `--sort` and `--reverse`
    pub fn sort_state(&self) -> SortState {
        let mut state = SortState::for_field(self.sort);
        if self.reverse {
            state.direction = state.direction.toggled();
        }
        state
    }
}

fn parse_season(raw: &str) -> Result<SeasonId, String> {
    SeasonId::parse(raw).map_err(|e| e.to_string())
}
