//! URL building utilities for API endpoints

use crate::data_fetcher::models::SeasonId;

/// Builds the URL listing every season that has ranking data.
///
/// # Example
/// ```
/// use bangumi_rank::data_fetcher::api::build_available_seasons_url;
///
/// let url = build_available_seasons_url("https://api.example.com");
/// assert_eq!(url, "https://api.example.com/api/v0/season/available");
/// ```
pub fn build_available_seasons_url(base_url: &str) -> String {
    format!("{base_url}/api/v0/season/available")
}

/// Builds the URL for one season's ranked subjects.
///
/// # Example
/// ```
/// use bangumi_rank::data_fetcher::api::build_season_detail_url;
/// use bangumi_rank::data_fetcher::models::SeasonId;
///
/// let season = SeasonId::parse("202504").unwrap();
/// let url = build_season_detail_url("https://api.example.com", season);
/// assert_eq!(url, "https://api.example.com/api/v0/season/202504");
/// ```
pub fn build_season_detail_url(base_url: &str, season_id: SeasonId) -> String {
    format!("{base_url}/api/v0/season/{season_id}")
}

/// Base cache key of the season list
pub const AVAILABLE_SEASONS_KEY: &str = "available-seasons";

/// Base cache key of a season detail, e.g. `season-202504`
pub fn season_detail_key(season_id: SeasonId) -> String {
    format!("season-{season_id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_season_detail_key() {
        let season = SeasonId::parse("202501").unwrap();
        assert_eq!(season_detail_key(season), "season-202501");
    }

    #[test]
    fn test_urls_keep_zero_padded_month() {
        let season = SeasonId::parse("202407").unwrap();
        assert!(build_season_detail_url("http://localhost", season).ends_with("/202407"));
    }
}
