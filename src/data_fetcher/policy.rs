//! Cache-key derivation and retry policy for the ranking API.
//!
//! The response cache treats identical keys as hits, so the key encodes
//! everything that should force revalidation: the error flag, the retry
//! count and (optionally) a 30 minute time window. Everything here is pure
//! apart from the optional jitter in [`RetryPolicy::delay_for`].

use crate::config::Config;
use crate::constants::{cache_ttl, retry};
use crate::error::AppError;
use chrono::{DateTime, Utc};
use rand::Rng;
use serde_json::Value;
use std::fmt;
use std::time::Duration;

const WINDOW_MILLIS: i64 = (cache_ttl::WINDOW_SECONDS * 1000) as i64;

/// A fixed 30 minute slot of wall-clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimeWindow {
    index: i64,
}

impl TimeWindow {
    /// The window containing `now`.
    pub fn containing(now: DateTime<Utc>) -> Self {
        TimeWindow {
            index: now.timestamp_millis().div_euclid(WINDOW_MILLIS),
        }
    }

    pub fn from_index(index: i64) -> Self {
        TimeWindow { index }
    }

    pub fn index(&self) -> i64 {
        self.index
    }
}

/// Builds the cache key for a fetch.
///
/// `base` + `-error` when the stream is in error + `-retry-{n}` for n > 0 +
/// `-w{index}` when a window is supplied.
///
/// # Examples
///
/// ```
/// use bangumi_rank::data_fetcher::policy::{derive_cache_key, TimeWindow};
///
/// assert_eq!(derive_cache_key("season-202504", false, 0, None), "season-202504");
/// assert_eq!(
///     derive_cache_key("season-202504", true, 2, Some(TimeWindow::from_index(7))),
///     "season-202504-error-retry-2-w7"
/// );
/// ```
pub fn derive_cache_key(
    base_key: &str,
    is_error: bool,
    retry_attempt: u32,
    window: Option<TimeWindow>,
) -> String {
    let mut key = String::with_capacity(base_key.len() + 24);
    key.push_str(base_key);
    if is_error {
        key.push_str("-error");
    }
    if retry_attempt > 0 {
        key.push_str(&format!("-retry-{retry_attempt}"));
    }
    if let Some(window) = window {
        key.push_str(&format!("-w{}", window.index));
    }
    key
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Network,
    Api,
    Cors,
    Unknown,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Network => "network",
            ErrorKind::Api => "api",
            ErrorKind::Cors => "cors",
            ErrorKind::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// A failure reduced to what the retry logic and the UI care about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorClassification {
    pub kind: ErrorKind,
    pub retryable: bool,
    pub status: Option<u16>,
    pub message: String,
}

impl ErrorClassification {
    fn new(kind: ErrorKind, retryable: bool, status: Option<u16>, message: String) -> Self {
        ErrorClassification {
            kind,
            retryable,
            status,
            message,
        }
    }
}

impl fmt::Display for ErrorClassification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "[{}:{status}] {}", self.kind, self.message),
            None => write!(f, "[{}] {}", self.kind, self.message),
        }
    }
}

fn mentions_cors(message: &str) -> bool {
    message.contains("cors") || message.contains("cross-origin")
}

fn mentions_network(message: &str) -> bool {
    [
        "network",
        "connection",
        "connect",
        "timed out",
        "timeout",
        "dns",
        "failed to fetch",
    ]
    .iter()
    .any(|needle| message.contains(needle))
}

/// Classifies a failure from its HTTP status and message.
///
/// Status 0 means the request never got a response: it is a retryable
/// network failure (or CORS, when the message says so) whatever the message.
/// Without a status the message alone decides.
pub fn classify_raw(status: Option<u16>, message: impl Into<String>) -> ErrorClassification {
    let message = message.into();
    let lower = message.to_lowercase();

    match status {
        Some(0) if mentions_cors(&lower) => {
            ErrorClassification::new(ErrorKind::Cors, true, None, message)
        }
        Some(0) => ErrorClassification::new(ErrorKind::Network, true, None, message),
        Some(s) if s >= 500 || s == 429 => {
            ErrorClassification::new(ErrorKind::Api, true, Some(s), message)
        }
        Some(s) if (400..500).contains(&s) => {
            ErrorClassification::new(ErrorKind::Api, false, Some(s), message)
        }
        Some(s) => ErrorClassification::new(ErrorKind::Unknown, false, Some(s), message),
        None if mentions_cors(&lower) => {
            ErrorClassification::new(ErrorKind::Cors, true, None, message)
        }
        None if mentions_network(&lower) => {
            ErrorClassification::new(ErrorKind::Network, true, None, message)
        }
        None => ErrorClassification::new(ErrorKind::Unknown, false, None, message),
    }
}

/// Classifies an [`AppError`].
pub fn classify_error(error: &AppError) -> ErrorClassification {
    let message = error.to_string();
    match error {
        AppError::NetworkTimeout { .. } | AppError::NetworkConnection { .. } => {
            ErrorClassification::new(ErrorKind::Network, true, None, message)
        }
        AppError::ApiFetch(e) if e.is_timeout() || e.is_connect() => {
            ErrorClassification::new(ErrorKind::Network, true, None, message)
        }
        AppError::ApiFetch(e) => match e.status() {
            Some(status) => classify_raw(Some(status.as_u16()), message),
            None if e.is_request() => {
                ErrorClassification::new(ErrorKind::Network, true, None, message)
            }
            None => classify_raw(None, message),
        },
        AppError::ApiNotFound { .. }
        | AppError::ApiClientError { .. }
        | AppError::ApiServerError { .. }
        | AppError::ApiServiceUnavailable { .. }
        | AppError::ApiRateLimit { .. } => classify_raw(error.status(), message),
        AppError::ApiErrorResponse { .. }
        | AppError::ApiNoData { .. }
        | AppError::ApiUnexpectedStructure { .. } => {
            ErrorClassification::new(ErrorKind::Api, true, None, message)
        }
        AppError::ApiMalformedJson { .. } | AppError::ApiParse(_) => {
            ErrorClassification::new(ErrorKind::Api, false, None, message)
        }
        AppError::ApiSeasonNotFound { .. } => {
            ErrorClassification::new(ErrorKind::Api, false, Some(404), message)
        }
        _ => ErrorClassification::new(ErrorKind::Unknown, false, None, message),
    }
}

/// `min(1000ms * 2^attempt_index, 8000ms)`, saturating for large indices.
///
/// # Examples
///
/// ```
/// use bangumi_rank::data_fetcher::policy::compute_backoff_delay;
/// use std::time::Duration;
///
/// assert_eq!(compute_backoff_delay(0), Duration::from_millis(1000));
/// assert_eq!(compute_backoff_delay(2), Duration::from_millis(4000));
/// assert_eq!(compute_backoff_delay(40), Duration::from_millis(8000));
/// ```
pub fn compute_backoff_delay(attempt_index: u32) -> Duration {
    exponential_delay(
        Duration::from_millis(retry::BASE_DELAY_MS),
        Duration::from_millis(retry::MAX_DELAY_MS),
        attempt_index,
    )
}

fn exponential_delay(base: Duration, max: Duration, attempt_index: u32) -> Duration {
    let base_ms = u64::try_from(base.as_millis()).unwrap_or(u64::MAX);
    let factor = 2u64.checked_pow(attempt_index).unwrap_or(u64::MAX);
    let delay = Duration::from_millis(base_ms.saturating_mul(factor));
    delay.min(max)
}

/// Backoff settings for explicit retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub base_delay: Duration,
    pub max_delay: Duration,
    /// Scale each delay by a random factor in `[0.5, 1.0]`
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            base_delay: Duration::from_millis(retry::BASE_DELAY_MS),
            max_delay: Duration::from_millis(retry::MAX_DELAY_MS),
            jitter: false,
        }
    }
}

impl RetryPolicy {
    pub fn from_config(config: &Config) -> Self {
        RetryPolicy {
            base_delay: Duration::from_millis(config.retry_base_delay_ms),
            max_delay: Duration::from_millis(config.retry_max_delay_ms),
            jitter: config.retry_jitter,
        }
    }

    /// No waiting between attempts. Used by tests.
    pub fn immediate() -> Self {
        RetryPolicy {
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            jitter: false,
        }
    }

    /// Delay before the retry following `attempt_index` earlier retries.
    pub fn delay_for(&self, attempt_index: u32) -> Duration {
        let delay = exponential_delay(self.base_delay, self.max_delay, attempt_index);
        if self.jitter && !delay.is_zero() {
            delay.mul_f64(rand::rng().random_range(0.5..=1.0))
        } else {
            delay
        }
    }
}

/// True when a body must be treated as a failure despite a success status.
///
/// Missing, `null` and non-object payloads are errors, as are objects with
/// a non-null `error` field, empty objects, and objects carrying neither a
/// `subjects` nor an `available_seasons` array.
pub fn is_error_response(payload: Option<&Value>) -> bool {
    let Some(Value::Object(map)) = payload else {
        return true;
    };
    if map.is_empty() {
        return true;
    }
    if map.get("error").is_some_and(|e| !e.is_null()) {
        return true;
    }
    let has_array = |field: &str| map.get(field).is_some_and(Value::is_array);
    !(has_array("subjects") || has_array("available_seasons"))
}

/// Message to surface for an error body: its `error`/`message` field when
/// present.
pub fn error_response_message(payload: &Value) -> Option<String> {
    ["error", "message"].iter().find_map(|field| match payload.get(field)? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    })
}
