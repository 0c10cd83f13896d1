//! Application-wide constants and configuration values
//!
//! This module centralizes the magic numbers used by the fetch layer,
//! the cache-key policy and the terminal UI.

/// Default base URL of the ranking API
pub const DEFAULT_API_BASE_URL: &str = "https://api.rinshankaiho.fun";

/// Default timeout for HTTP requests in seconds
pub const DEFAULT_HTTP_TIMEOUT_SECONDS: u64 = 30;

/// Maximum number of idle connections per host in the HTTP client pool
pub const HTTP_POOL_MAX_IDLE_PER_HOST: usize = 16;

/// User agent sent with every request
pub const USER_AGENT: &str = concat!("bangumi_rank/", env!("CARGO_PKG_VERSION"));

/// Log file name used when no custom path is configured
pub const LOG_FILE_NAME: &str = "bangumi_rank.log";

/// Cache and freshness windows
pub mod cache_ttl {
    /// Length of the cache-key time window (30 minutes)
    pub const WINDOW_SECONDS: u64 = 1800;

    /// Data younger than this is considered fresh (30 minutes)
    pub const FRESHNESS_SECONDS: u64 = 1800;

    /// TTL for successful responses stored in the response cache
    pub const HTTP_RESPONSE_SECONDS: u64 = 1800;

    /// Capacity of the in-memory response cache
    pub const HTTP_RESPONSE_CAPACITY: usize = 64;
}

/// Background freshness check intervals
pub mod refresh {
    /// Interval for the season detail stream (5 minutes)
    pub const DETAIL_CHECK_SECONDS: u64 = 300;

    /// Interval for the season list stream (10 minutes)
    pub const SEASON_LIST_CHECK_SECONDS: u64 = 600;
}

/// Retry configuration
pub mod retry {
    /// Base delay for exponential backoff (milliseconds)
    pub const BASE_DELAY_MS: u64 = 1000;

    /// Maximum delay between retries (milliseconds)
    pub const MAX_DELAY_MS: u64 = 8000;

    /// Automatic retries performed by `--once` for retryable errors
    pub const ONCE_MODE_RETRIES: u32 = 2;
}

/// Season identifier layout
pub mod season {
    /// Months that start a broadcast season
    pub const QUARTER_MONTHS: [u32; 4] = [1, 4, 7, 10];

    /// First year with ranking data upstream
    pub const FIRST_YEAR: i32 = 2017;
}

/// UI polling and layout
pub mod ui {
    /// Input polling interval while the viewer is open (milliseconds)
    pub const POLL_INTERVAL_MS: u64 = 100;

    /// Content margin from terminal border
    pub const CONTENT_MARGIN: usize = 2;

    /// Lines taken by header, title, subheader, column header and footer
    pub const CHROME_LINES: usize = 7;

    /// Teletext page number shown in the header
    pub const PAGE_NUMBER: u16 = 100;

    /// Terminal title
    pub const TERMINAL_TITLE: &str = "BANGUMI 100";
}

/// Environment variable names
pub mod env_vars {
    /// API base URL override
    pub const API_BASE_URL: &str = "API_BASE_URL";

    /// Log file path override
    pub const LOG_FILE: &str = "BANGUMI_RANK_LOG_FILE";

    /// HTTP timeout override in seconds
    pub const HTTP_TIMEOUT: &str = "BANGUMI_RANK_HTTP_TIMEOUT";
}
