use crate::data_fetcher::api::{AVAILABLE_SEASONS_KEY, RankingApi, season_detail_key};
use crate::data_fetcher::models::{AvailableSeasons, SeasonDetail, SeasonId};
use crate::error::AppError;
use chrono::{DateTime, Utc};
use std::future::Future;

/// What a [`DataStream`](super::DataStream) fetches.
pub trait StreamSource: Send + Sync + 'static {
    type Output: Send + Sync + 'static;

    /// Cache key before error, retry and window suffixes
    fn base_key(&self) -> String;

    fn fetch(
        &self,
        api: &RankingApi,
        cache_key: &str,
        bypass_cache: bool,
    ) -> impl Future<Output = Result<Self::Output, AppError>> + Send;

    /// Timestamp carried by the payload itself, if any. Streams fall back
    /// to their commit time when this is `None`.
    fn updated_at(output: &Self::Output) -> Option<DateTime<Utc>>;
}

/// The list of seasons with ranking data.
#[derive(Debug, Clone, Copy, Default)]
pub struct SeasonListSource;

impl StreamSource for SeasonListSource {
    type Output = AvailableSeasons;

    fn base_key(&self) -> String {
        AVAILABLE_SEASONS_KEY.to_string()
    }

    async fn fetch(
        &self,
        api: &RankingApi,
        cache_key: &str,
        bypass_cache: bool,
    ) -> Result<AvailableSeasons, AppError> {
        api.fetch_available_seasons(cache_key, bypass_cache).await
    }

    fn updated_at(_output: &AvailableSeasons) -> Option<DateTime<Utc>> {
        None
    }
}

/// Ranked subjects of a single season.
#[derive(Debug, Clone, Copy)]
pub struct SeasonDetailSource {
    pub season_id: SeasonId,
}

impl SeasonDetailSource {
    pub fn new(season_id: SeasonId) -> Self {
        Self { season_id }
    }
}

impl StreamSource for SeasonDetailSource {
    type Output = SeasonDetail;

    fn base_key(&self) -> String {
        season_detail_key(self.season_id)
    }

    async fn fetch(
        &self,
        api: &RankingApi,
        cache_key: &str,
        bypass_cache: bool,
    ) -> Result<SeasonDetail, AppError> {
        api.fetch_season_detail(self.season_id, cache_key, bypass_cache)
            .await
    }

    fn updated_at(output: &SeasonDetail) -> Option<DateTime<Utc>> {
        output.updated_at_utc()
    }
}
