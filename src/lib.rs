//! Seasonal anime rankings viewer library
//!
//! Fetches quarterly anime rankings from the ranking API and displays them
//! in a teletext-style terminal page.
//!
//! # Examples
//!
//! ```rust,no_run
//! use bangumi_rank::config::Config;
//! use bangumi_rank::data_fetcher::{DataStream, RankingApi, RetryPolicy};
//! use bangumi_rank::data_fetcher::processors::SortState;
//! use bangumi_rank::error::AppError;
//! use bangumi_rank::teletext_ui::build_ranking_page;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), AppError> {
//!     let config = Config::load().await?;
//!     let api = RankingApi::from_config(&config)?;
//!
//!     // Find the current season
//!     let seasons = DataStream::season_list(api.clone(), RetryPolicy::default());
//!     seasons.load().await;
//!     let Some(season_id) = seasons.data().and_then(|l| l.current_season_id()) else {
//!         return Ok(());
//!     };
//!
//!     // Load its rankings, retrying twice on transient failures
//!     let detail = DataStream::season_detail(api, RetryPolicy::default(), season_id);
//!     if detail.load_with_retries(2).await.is_ok()
//!         && let Some(data) = detail.data()
//!     {
//!         let page = build_ranking_page(&data, &SortState::default(), false, None);
//!         page.render_buffered(&mut std::io::stdout())?;
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod constants;
pub mod data_fetcher;
pub mod error;
pub mod teletext_ui;
pub mod ui;

// Re-export commonly used types for convenience
pub use config::Config;
pub use data_fetcher::models::{AvailableSeasons, Season, SeasonDetail, SeasonId, Subject};
pub use data_fetcher::{DataStream, RankingApi, RetryPolicy};
pub use error::AppError;
pub use teletext_ui::TeletextPage;

/// Current version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
