//! Single-attempt HTTP fetching with response caching and body inspection

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error, info, instrument, warn};

use crate::data_fetcher::cache::HttpResponseCache;
use crate::data_fetcher::policy::{error_response_message, is_error_response};
use crate::error::AppError;

/// Fetches `url` and parses it as `T`, storing the body under `cache_key`.
///
/// - A cached body under the same key is served unless `bypass_cache` is set
/// - Non-success status codes map to specific `AppError` variants
/// - Bodies that [`is_error_response`] rejects fail even on HTTP 200
/// - Only bodies that parse as `T` are cached
#[instrument(skip(client, cache))]
pub(super) async fn fetch<T: DeserializeOwned>(
    client: &Client,
    cache: &HttpResponseCache,
    url: &str,
    cache_key: &str,
    bypass_cache: bool,
) -> Result<T, AppError> {
    info!("Fetching data from URL: {url}");

    if bypass_cache {
        debug!("Bypassing response cache for key: {cache_key}");
    } else if let Some(cached_response) = cache.get(cache_key).await {
        debug!("Using cached HTTP response for key: {cache_key}");
        match serde_json::from_str::<T>(&cached_response) {
            Ok(parsed) => return Ok(parsed),
            Err(e) => {
                warn!("Failed to parse cached response for key {}: {}", cache_key, e);
                cache.remove(cache_key).await;
            }
        }
    }

    let response = match client.get(url).send().await {
        Ok(resp) => resp,
        Err(e) => {
            error!("Request failed for URL {}: {}", url, e);
            return Err(if e.is_timeout() {
                AppError::network_timeout(url)
            } else if e.is_connect() {
                AppError::network_connection(url, e.to_string())
            } else {
                AppError::ApiFetch(e)
            });
        }
    };

    let status = response.status();
    debug!("Response status: {status}");

    if !status.is_success() {
        let status_code = status.as_u16();
        let reason = status.canonical_reason().unwrap_or("Unknown error");

        error!("HTTP {} - {} (URL: {})", status_code, reason, url);

        return Err(match status_code {
            404 => AppError::api_not_found(url),
            429 => AppError::api_rate_limit(reason, url),
            400..=499 => AppError::api_client_error(status_code, reason, url),
            502 | 503 => AppError::api_service_unavailable(status_code, reason, url),
            _ => AppError::api_server_error(status_code, reason, url),
        });
    }

    let response_text = match response.text().await {
        Ok(text) => text,
        Err(e) => {
            error!("Failed to read response text from URL {}: {}", url, e);
            return Err(AppError::ApiFetch(e));
        }
    };

    debug!("Response length: {} bytes", response_text.len());
    let preview: String = response_text.chars().take(1024).collect();
    debug!("Response text (first 1024 chars): {preview}");

    if response_text.trim().is_empty() {
        return Err(AppError::api_no_data("Response body is empty", url));
    }

    let value: Value = match serde_json::from_str(&response_text) {
        Ok(value) => value,
        Err(e) => {
            error!("Failed to parse API response: {} (URL: {})", e, url);
            error!(
                "Response text (first 200 chars): {}",
                &response_text.chars().take(200).collect::<String>()
            );
            return Err(AppError::api_malformed_json(e.to_string(), url));
        }
    };

    if is_error_response(Some(&value)) {
        warn!("API returned an error body with status {status} (URL: {url})");
        return Err(match error_response_message(&value) {
            Some(message) => AppError::api_error_response(message, url),
            None => AppError::api_unexpected_structure(
                "Response carries no subjects or available_seasons",
                url,
            ),
        });
    }

    match serde_json::from_value::<T>(value) {
        Ok(parsed) => {
            cache.put(cache_key, response_text).await;
            Ok(parsed)
        }
        Err(e) => {
            error!("Unexpected response structure: {} (URL: {})", e, url);
            Err(AppError::api_unexpected_structure(e.to_string(), url))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_fetcher::api::http_client::create_test_http_client;
    use crate::data_fetcher::models::SeasonDetail;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{method, path},
    };

    const DETAIL_PATH: &str = "/api/v0/season/202504";

    fn detail_body() -> serde_json::Value {
        serde_json::json!({
            "season_id": "202504",
            "updated_at": "2025-05-01T12:00:00Z",
            "subjects": [{"id": 1, "name": "A", "rank": 1, "score": 8.0}]
        })
    }

    async fn mount(server: &MockServer, template: ResponseTemplate) {
        Mock::given(method("GET"))
            .and(path(DETAIL_PATH))
            .respond_with(template)
            .mount(server)
            .await;
    }

    async fn fetch_detail(
        server: &MockServer,
        cache: &HttpResponseCache,
        key: &str,
        bypass: bool,
    ) -> Result<SeasonDetail, AppError> {
        let url = format!("{}{}", server.uri(), DETAIL_PATH);
        fetch(&create_test_http_client(), cache, &url, key, bypass).await
    }

    #[tokio::test]
    async fn test_fetch_success_is_cached() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(DETAIL_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(detail_body()))
            .expect(1)
            .mount(&server)
            .await;
        let cache = HttpResponseCache::default();

        let first = fetch_detail(&server, &cache, "season-202504", false).await.unwrap();
        let second = fetch_detail(&server, &cache, "season-202504", false).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first.subjects.len(), 1);
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_bypass_and_new_key_hit_the_network() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(DETAIL_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(detail_body()))
            .expect(3)
            .mount(&server)
            .await;
        let cache = HttpResponseCache::default();

        fetch_detail(&server, &cache, "season-202504", false).await.unwrap();
        fetch_detail(&server, &cache, "season-202504", true).await.unwrap();
        fetch_detail(&server, &cache, "season-202504-retry-1", false).await.unwrap();
    }

    #[tokio::test]
    async fn test_status_codes_map_to_errors() {
        let cases = [
            (404, "not_found"),
            (429, "rate_limit"),
            (400, "client"),
            (503, "unavailable"),
            (500, "server"),
        ];
        for (status, label) in cases {
            let server = MockServer::start().await;
            mount(&server, ResponseTemplate::new(status)).await;
            let cache = HttpResponseCache::default();

            let err = fetch_detail(&server, &cache, "k", false).await.unwrap_err();
            let matched = match label {
                "not_found" => matches!(err, AppError::ApiNotFound { .. }),
                "rate_limit" => matches!(err, AppError::ApiRateLimit { .. }),
                "client" => matches!(err, AppError::ApiClientError { status: 400, .. }),
                "unavailable" => matches!(err, AppError::ApiServiceUnavailable { status: 503, .. }),
                _ => matches!(err, AppError::ApiServerError { status: 500, .. }),
            };
            assert!(matched, "status {status} mapped to {err:?}");
            assert!(cache.is_empty().await);
        }
    }

    #[tokio::test]
    async fn test_error_body_with_success_status() {
        let server = MockServer::start().await;
        mount(
            &server,
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"error": "season missing"})),
        )
        .await;
        let cache = HttpResponseCache::default();

        let err = fetch_detail(&server, &cache, "k", false).await.unwrap_err();
        assert!(matches!(err, AppError::ApiErrorResponse { ref message, .. } if message == "season missing"));
        assert!(err.is_retryable());
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_empty_object_is_unexpected_structure() {
        let server = MockServer::start().await;
        mount(&server, ResponseTemplate::new(200).set_body_string("{}")).await;

        let err = fetch_detail(&server, &HttpResponseCache::default(), "k", false)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ApiUnexpectedStructure { .. }));
    }

    #[tokio::test]
    async fn test_malformed_and_empty_bodies() {
        let server = MockServer::start().await;
        mount(&server, ResponseTemplate::new(200).set_body_string("<html>oops")).await;
        let err = fetch_detail(&server, &HttpResponseCache::default(), "k", false)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ApiMalformedJson { .. }));
        assert!(!err.is_retryable());

        let server = MockServer::start().await;
        mount(&server, ResponseTemplate::new(200).set_body_string("  ")).await;
        let err = fetch_detail(&server, &HttpResponseCache::default(), "k", false)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ApiNoData { .. }));
    }

    #[tokio::test]
    async fn test_connection_refused_is_network_error() {
        let server = MockServer::start().await;
        let url = format!("{}{}", server.uri(), DETAIL_PATH);
        drop(server);

        let result: Result<SeasonDetail, AppError> = fetch(
            &create_test_http_client(),
            &HttpResponseCache::default(),
            &url,
            "k",
            false,
        )
        .await;
        let err = result.unwrap_err();
        assert!(err.is_retryable(), "expected retryable, got {err:?}");
    }
}
