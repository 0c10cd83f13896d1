use crate::data_fetcher::policy::ErrorClassification;
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StreamPhase {
    #[default]
    Idle,
    Fetching,
    Success,
    Failed,
    Retrying,
}

impl fmt::Display for StreamPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StreamPhase::Idle => "idle",
            StreamPhase::Fetching => "fetching",
            StreamPhase::Success => "success",
            StreamPhase::Failed => "failed",
            StreamPhase::Retrying => "retrying",
        };
        f.write_str(name)
    }
}

/// Error and retry bookkeeping of one stream.
///
/// `is_retrying` is only true while a `retry()` call is in flight, and
/// `retry_attempt` returns to 0 in the same update that commits data.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FetchState {
    pub last_error: Option<ErrorClassification>,
    pub retry_attempt: u32,
    pub is_retrying: bool,
    pub phase: StreamPhase,
}

impl FetchState {
    pub fn is_error_state(&self) -> bool {
        self.last_error.is_some()
    }
}

/// Outcome of a `load()` or `force_refresh()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Committed,
    Failed,
    /// A newer load finished first; this response was dropped
    Stale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryOutcome {
    Recovered,
    /// Another retry was in flight; nothing was sent
    AlreadyRetrying,
    /// The retry's response lost to a newer load
    Superseded,
}

/// Everything presentation code needs to draw a stream.
#[derive(Debug)]
pub struct StreamSnapshot<T> {
    pub data: Option<Arc<T>>,
    pub pending: bool,
    pub error: Option<ErrorClassification>,
    pub retry_attempt: u32,
    pub is_retrying: bool,
    pub phase: StreamPhase,
    pub cache_key: String,
}

impl<T> Clone for StreamSnapshot<T> {
    fn clone(&self) -> Self {
        StreamSnapshot {
            data: self.data.clone(),
            pending: self.pending,
            error: self.error.clone(),
            retry_attempt: self.retry_attempt,
            is_retrying: self.is_retrying,
            phase: self.phase,
            cache_key: self.cache_key.clone(),
        }
    }
}

impl<T> StreamSnapshot<T> {
    pub fn is_error_state(&self) -> bool {
        self.error.is_some()
    }

    pub fn has_data(&self) -> bool {
        self.data.is_some()
    }
}
