use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Failed to fetch data from API: {0}")]
    ApiFetch(#[from] reqwest::Error),

    #[error("Failed to parse API response: {0}")]
    ApiParse(#[from] serde_json::Error),

    // Specific HTTP status code errors
    #[error("API request not found (404): {url}")]
    ApiNotFound { url: String },

    #[error("API server error ({status}): {message} (URL: {url})")]
    ApiServerError {
        status: u16,
        message: String,
        url: String,
    },

    #[error("API client error ({status}): {message} (URL: {url})")]
    ApiClientError {
        status: u16,
        message: String,
        url: String,
    },

    #[error("API rate limit exceeded (429): {message} (URL: {url})")]
    ApiRateLimit { message: String, url: String },

    #[error("API service unavailable ({status}): {message} (URL: {url})")]
    ApiServiceUnavailable {
        status: u16,
        message: String,
        url: String,
    },

    // Network-specific errors
    #[error("Network timeout while fetching data from: {url}")]
    NetworkTimeout { url: String },

    #[error("Connection failed to: {url} - {message}")]
    NetworkConnection { url: String, message: String },

    // Body-level errors, raised even when the status code is 200
    #[error("API returned malformed JSON: {message} (URL: {url})")]
    ApiMalformedJson { message: String, url: String },

    #[error("API returned unexpected data structure: {message} (URL: {url})")]
    ApiUnexpectedStructure { message: String, url: String },

    #[error("API returned empty or missing data: {message} (URL: {url})")]
    ApiNoData { message: String, url: String },

    #[error("API reported an error: {message} (URL: {url})")]
    ApiErrorResponse { message: String, url: String },

    // Domain errors
    #[error("Invalid season id '{0}', expected YYYYMM")]
    InvalidSeasonId(String),

    #[error("Season not found: {season}")]
    ApiSeasonNotFound { season: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDeserialize(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Log setup error: {0}")]
    LogSetup(String),
}

impl AppError {
    /// Create a configuration error with context
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a log setup error with context
    pub fn log_setup_error(msg: impl Into<String>) -> Self {
        Self::LogSetup(msg.into())
    }

    /// Create an API not found error
    pub fn api_not_found(url: impl Into<String>) -> Self {
        Self::ApiNotFound { url: url.into() }
    }

    /// Create an API server error (5xx status codes)
    pub fn api_server_error(
        status: u16,
        message: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self::ApiServerError {
            status,
            message: message.into(),
            url: url.into(),
        }
    }

    /// Create an API client error (4xx status codes except 404 and 429)
    pub fn api_client_error(
        status: u16,
        message: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self::ApiClientError {
            status,
            message: message.into(),
            url: url.into(),
        }
    }

    /// Create an API rate limit error
    pub fn api_rate_limit(message: impl Into<String>, url: impl Into<String>) -> Self {
        Self::ApiRateLimit {
            message: message.into(),
            url: url.into(),
        }
    }

    /// Create an API service unavailable error
    pub fn api_service_unavailable(
        status: u16,
        message: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self::ApiServiceUnavailable {
            status,
            message: message.into(),
            url: url.into(),
        }
    }

    /// Create a network timeout error
    pub fn network_timeout(url: impl Into<String>) -> Self {
        Self::NetworkTimeout { url: url.into() }
    }

    /// Create a network connection error
    pub fn network_connection(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::NetworkConnection {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Create a malformed JSON error
    pub fn api_malformed_json(message: impl Into<String>, url: impl Into<String>) -> Self {
        Self::ApiMalformedJson {
            message: message.into(),
            url: url.into(),
        }
    }

    /// Create an unexpected data structure error
    pub fn api_unexpected_structure(message: impl Into<String>, url: impl Into<String>) -> Self {
        Self::ApiUnexpectedStructure {
            message: message.into(),
            url: url.into(),
        }
    }

    /// Create a no data error
    pub fn api_no_data(message: impl Into<String>, url: impl Into<String>) -> Self {
        Self::ApiNoData {
            message: message.into(),
            url: url.into(),
        }
    }

    /// Create an error for a body that carries an explicit `error` field
    pub fn api_error_response(message: impl Into<String>, url: impl Into<String>) -> Self {
        Self::ApiErrorResponse {
            message: message.into(),
            url: url.into(),
        }
    }

    /// Create an invalid season id error
    pub fn invalid_season_id(raw: impl Into<String>) -> Self {
        Self::InvalidSeasonId(raw.into())
    }

    /// Create a season not found error
    pub fn api_season_not_found(season: impl Into<String>) -> Self {
        Self::ApiSeasonNotFound {
            season: season.into(),
        }
    }

    /// HTTP status carried by the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            AppError::ApiNotFound { .. } => Some(404),
            AppError::ApiRateLimit { .. } => Some(429),
            AppError::ApiServerError { status, .. }
            | AppError::ApiClientError { status, .. }
            | AppError::ApiServiceUnavailable { status, .. } => Some(*status),
            AppError::ApiFetch(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Check if error is retryable (network issues, server errors, rate limits,
    /// semantically erroneous bodies)
    pub fn is_retryable(&self) -> bool {
        crate::data_fetcher::policy::classify_error(self).retryable
    }

    /// Check if error indicates data not found
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            AppError::ApiNotFound { .. } | AppError::ApiSeasonNotFound { .. } | AppError::ApiNoData { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_helper() {
        let error = AppError::config_error("Invalid configuration");
        assert!(matches!(error, AppError::Config(_)));
        assert_eq!(
            error.to_string(),
            "Configuration error: Invalid configuration"
        );
    }

    #[test]
    fn test_api_server_error_helper() {
        let error =
            AppError::api_server_error(500, "Internal server error", "https://api.example.com");
        assert_eq!(
            error.to_string(),
            "API server error (500): Internal server error (URL: https://api.example.com)"
        );
        assert_eq!(error.status(), Some(500));
    }

    #[test]
    fn test_api_error_response_helper() {
        let error = AppError::api_error_response("season not ready", "https://api.example.com");
        assert_eq!(
            error.to_string(),
            "API reported an error: season not ready (URL: https://api.example.com)"
        );
        assert_eq!(error.status(), None);
    }

    #[test]
    fn test_invalid_season_id_display() {
        let error = AppError::invalid_season_id("2025-04");
        assert_eq!(
            error.to_string(),
            "Invalid season id '2025-04', expected YYYYMM"
        );
    }

    #[test]
    fn test_status_for_fixed_code_variants() {
        assert_eq!(AppError::api_not_found("url").status(), Some(404));
        assert_eq!(AppError::api_rate_limit("slow down", "url").status(), Some(429));
        assert_eq!(AppError::network_timeout("url").status(), None);
    }

    #[test]
    fn test_is_retryable() {
        // Retryable errors
        assert!(AppError::network_timeout("url").is_retryable());
        assert!(AppError::network_connection("url", "message").is_retryable());
        assert!(AppError::api_server_error(500, "message", "url").is_retryable());
        assert!(AppError::api_rate_limit("message", "url").is_retryable());
        assert!(AppError::api_service_unavailable(503, "message", "url").is_retryable());
        assert!(AppError::api_error_response("message", "url").is_retryable());

        // Non-retryable errors
        assert!(!AppError::api_not_found("url").is_retryable());
        assert!(!AppError::api_client_error(400, "message", "url").is_retryable());
        assert!(!AppError::config_error("message").is_retryable());
        assert!(!AppError::api_malformed_json("message", "url").is_retryable());
        assert!(!AppError::invalid_season_id("abc").is_retryable());
    }

    #[test]
    fn test_is_not_found() {
        assert!(AppError::api_not_found("url").is_not_found());
        assert!(AppError::api_season_not_found("202504").is_not_found());
        assert!(AppError::api_no_data("empty", "url").is_not_found());

        assert!(!AppError::api_server_error(500, "message", "url").is_not_found());
        assert!(!AppError::network_timeout("url").is_not_found());
    }

    #[test]
    fn test_error_from_reqwest() {
        let client = reqwest::Client::new();
        let request_result = client.get("not a valid url").build();

        match request_result {
            Err(reqwest_error) => {
                let app_error: AppError = reqwest_error.into();
                assert!(matches!(app_error, AppError::ApiFetch(_)));
            }
            Ok(_) => panic!("Expected an error from invalid URL"),
        }
    }

    #[test]
    fn test_error_from_serde_json() {
        let json_error = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let app_error: AppError = json_error.into();
        assert!(matches!(app_error, AppError::ApiParse(_)));
    }

    #[test]
    fn test_error_from_toml_deserialize() {
        let invalid_toml = "invalid = [toml";
        let toml_error = toml::from_str::<serde_json::Value>(invalid_toml).unwrap_err();
        let app_error: AppError = toml_error.into();
        assert!(matches!(app_error, AppError::TomlDeserialize(_)));
    }

    #[test]
    fn test_error_display_formats() {
        let errors = vec![
            AppError::config_error("test config error"),
            AppError::log_setup_error("test log error"),
            AppError::api_not_found("https://example.com"),
            AppError::api_client_error(400, "client error", "https://example.com"),
            AppError::network_connection("https://example.com", "connection failed"),
            AppError::api_unexpected_structure("bad structure", "https://example.com"),
            AppError::api_no_data("no data", "https://example.com"),
            AppError::api_season_not_found("202504"),
        ];

        for error in errors {
            let display_string = error.to_string();
            assert!(
                display_string.len() > 5,
                "Error display should be descriptive: {error:?}"
            );
        }
    }
}
