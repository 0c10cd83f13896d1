use crate::config::Config;
use crate::data_fetcher::cache::HttpResponseCache;
use crate::data_fetcher::models::{AvailableSeasons, RawAvailableSeasons, SeasonDetail, SeasonId};
use crate::error::AppError;
use reqwest::Client;
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::{info, instrument, warn};

use super::fetch_utils::fetch;
use super::http_client::create_http_client_with_timeout;
use super::urls::{build_available_seasons_url, build_season_detail_url};

/// Client for the ranking API.
///
/// Cheap to clone; clones share the HTTP connection pool and the response
/// cache.
#[derive(Debug, Clone)]
pub struct RankingApi {
    client: Client,
    base_url: String,
    cache: HttpResponseCache,
}

/// Result of `--check-api`.
#[derive(Debug, Clone)]
pub struct HealthReport {
    pub url: String,
    pub status: u16,
    pub latency: Duration,
    pub season_count: Option<usize>,
}

impl RankingApi {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            cache: HttpResponseCache::default(),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        let client = create_http_client_with_timeout(config.http_timeout())?;
        Ok(Self::new(client, config.api_base_url.clone()))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn cache(&self) -> &HttpResponseCache {
        &self.cache
    }

    /// Fetches the season list, newest first.
    #[instrument(skip(self))]
    pub async fn fetch_available_seasons(
        &self,
        cache_key: &str,
        bypass_cache: bool,
    ) -> Result<AvailableSeasons, AppError> {
        let url = build_available_seasons_url(&self.base_url);
        let raw: RawAvailableSeasons =
            fetch(&self.client, &self.cache, &url, cache_key, bypass_cache).await?;
        let seasons = AvailableSeasons::try_from(raw)?;
        info!(
            "Fetched {} available seasons (current: {})",
            seasons.seasons.len(),
            seasons.current_season_id
        );
        Ok(seasons)
    }

    /// Fetches the ranked subjects of one season. A 404 becomes
    /// [`AppError::ApiSeasonNotFound`].
    #[instrument(skip(self), fields(season = %season_id))]
    pub async fn fetch_season_detail(
        &self,
        season_id: SeasonId,
        cache_key: &str,
        bypass_cache: bool,
    ) -> Result<SeasonDetail, AppError> {
        let url = build_season_detail_url(&self.base_url, season_id);
        let detail: SeasonDetail = fetch(&self.client, &self.cache, &url, cache_key, bypass_cache)
            .await
            .map_err(|e| {
                if matches!(e, AppError::ApiNotFound { .. }) {
                    AppError::api_season_not_found(season_id.to_string())
                } else {
                    e
                }
            })?;

        if detail.season_id != season_id {
            warn!(
                "Requested season {} but API answered with {}",
                season_id, detail.season_id
            );
        }
        info!(
            "Fetched {} subjects for season {}",
            detail.subjects.len(),
            season_id
        );
        Ok(detail)
    }

    /// Requests the season list without the cache and reports status and latency.
    ///
    /// Fails on transport errors, non-success statuses and non-object bodies.
    #[instrument(skip(self))]
    pub async fn check_health(&self) -> Result<HealthReport, AppError> {
        let url = build_available_seasons_url(&self.base_url);
        let started = Instant::now();

        let response = self.client.get(&url).send().await.map_err(|e| {
            if e.is_timeout() {
                AppError::network_timeout(&url)
            } else if e.is_connect() {
                AppError::network_connection(&url, e.to_string())
            } else {
                AppError::ApiFetch(e)
            }
        })?;
        let status = response.status();
        let body = response.text().await?;
        let latency = started.elapsed();

        if !status.is_success() {
            let reason = status.canonical_reason().unwrap_or("Unknown error");
            return Err(match status.as_u16() {
                404 => AppError::api_not_found(&url),
                429 => AppError::api_rate_limit(reason, &url),
                code @ 400..=499 => AppError::api_client_error(code, reason, &url),
                code @ (502 | 503) => AppError::api_service_unavailable(code, reason, &url),
                code => AppError::api_server_error(code, reason, &url),
            });
        }

        let value: Value = serde_json::from_str(&body)
            .map_err(|e| AppError::api_malformed_json(e.to_string(), &url))?;
        let Value::Object(map) = &value else {
            return Err(AppError::api_unexpected_structure(
                "Expected a JSON object",
                &url,
            ));
        };
        let season_count = map
            .get("available_seasons")
            .and_then(Value::as_array)
            .map(Vec::len);

        Ok(HealthReport {
            url,
            status: status.as_u16(),
            latency,
            season_count,
        })
    }
}
