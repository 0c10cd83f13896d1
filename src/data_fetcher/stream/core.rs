use super::source::{SeasonDetailSource, SeasonListSource, StreamSource};
use super::state::{FetchState, LoadOutcome, RetryOutcome, StreamPhase, StreamSnapshot};
use crate::constants::cache_ttl;
use crate::data_fetcher::api::RankingApi;
use crate::data_fetcher::models::SeasonId;
use crate::data_fetcher::policy::{
    ErrorClassification, RetryPolicy, TimeWindow, classify_error, derive_cache_key,
};
use crate::error::AppError;
use chrono::{DateTime, TimeDelta, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tracing::{debug, info, warn};

pub type SeasonListStream = DataStream<SeasonListSource>;
pub type SeasonDetailStream = DataStream<SeasonDetailSource>;

enum Commit {
    Committed,
    Stale,
}

impl From<Commit> for LoadOutcome {
    fn from(commit: Commit) -> Self {
        match commit {
            Commit::Committed => LoadOutcome::Committed,
            Commit::Stale => LoadOutcome::Stale,
        }
    }
}

struct Inner<T> {
    data: Option<Arc<T>>,
    committed_at: Option<DateTime<Utc>>,
    state: FetchState,
    cache_key: String,
    pending: usize,
    latest_completed: u64,
}

struct Shared<S: StreamSource> {
    source: S,
    api: RankingApi,
    policy: RetryPolicy,
    inner: Mutex<Inner<S::Output>>,
    generation: AtomicU64,
    notify: watch::Sender<StreamSnapshot<S::Output>>,
}

/// A fetch state machine for one API resource.
///
/// Handles are cheap to clone and share state. The internal lock is never
/// held across an await; every state change is broadcast to
/// [`subscribe`](DataStream::subscribe) receivers.
pub struct DataStream<S: StreamSource> {
    shared: Arc<Shared<S>>,
}

impl<S: StreamSource> Clone for DataStream<S> {
    fn clone(&self) -> Self {
        DataStream {
            shared: Arc::clone(&self.shared),
        }
    }
}

/// Clears `is_retrying` on every exit path of `retry()`, including
/// cancellation of the retry future.
struct RetryGuard<'a, S: StreamSource> {
    stream: &'a DataStream<S>,
}

impl<S: StreamSource> Drop for RetryGuard<'_, S> {
    fn drop(&mut self) {
        let mut inner = self.stream.lock();
        inner.state.is_retrying = false;
        if inner.state.phase == StreamPhase::Retrying {
            inner.state.phase = settled_phase(&*inner);
        }
        self.stream.publish(&inner);
    }
}

/// Gives back the `pending` slot of a fetch whose future was dropped before
/// the response arrived.
struct PendingGuard<'a, S: StreamSource> {
    stream: &'a DataStream<S>,
    armed: bool,
}

impl<S: StreamSource> Drop for PendingGuard<'_, S> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut inner = self.stream.lock();
        inner.pending = inner.pending.saturating_sub(1);
        if inner.pending == 0 && inner.state.phase == StreamPhase::Fetching {
            inner.state.phase = settled_phase(&*inner);
        }
        debug!(
            "Fetch of {} cancelled before completion",
            self.stream.shared.source.base_key()
        );
        self.stream.publish(&inner);
    }
}

fn settled_phase<T>(inner: &Inner<T>) -> StreamPhase {
    if inner.state.last_error.is_some() {
        StreamPhase::Failed
    } else if inner.data.is_some() {
        StreamPhase::Success
    } else {
        StreamPhase::Idle
    }
}

impl<S: StreamSource> DataStream<S> {
    pub fn new(source: S, api: RankingApi, policy: RetryPolicy) -> Self {
        let cache_key = derive_cache_key(
            &source.base_key(),
            false,
            0,
            Some(TimeWindow::containing(Utc::now())),
        );
        let inner = Inner {
            data: None,
            committed_at: None,
            state: FetchState::default(),
            cache_key,
            pending: 0,
            latest_completed: 0,
        };
        let (notify, _) = watch::channel(Self::snapshot_of(&inner));
        DataStream {
            shared: Arc::new(Shared {
                source,
                api,
                policy,
                inner: Mutex::new(inner),
                generation: AtomicU64::new(0),
                notify,
            }),
        }
    }

    pub fn source(&self) -> &S {
        &self.shared.source
    }

    fn lock(&self) -> MutexGuard<'_, Inner<S::Output>> {
        self.shared
            .inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn snapshot_of(inner: &Inner<S::Output>) -> StreamSnapshot<S::Output> {
        StreamSnapshot {
            data: inner.data.clone(),
            pending: inner.pending > 0,
            error: inner.state.last_error.clone(),
            retry_attempt: inner.state.retry_attempt,
            is_retrying: inner.state.is_retrying,
            phase: inner.state.phase,
            cache_key: inner.cache_key.clone(),
        }
    }

    fn publish(&self, inner: &Inner<S::Output>) {
        self.shared.notify.send_replace(Self::snapshot_of(inner));
    }

    fn key_for(&self, state: &FetchState, now: DateTime<Utc>) -> String {
        derive_cache_key(
            &self.shared.source.base_key(),
            state.last_error.is_some(),
            state.retry_attempt,
            Some(TimeWindow::containing(now)),
        )
    }

    /// Cache key the next load would use at `now`.
    pub fn cache_key_at(&self, now: DateTime<Utc>) -> String {
        let inner = self.lock();
        self.key_for(&inner.state, now)
    }

    pub fn snapshot(&self) -> StreamSnapshot<S::Output> {
        Self::snapshot_of(&self.lock())
    }

    /// Receiver notified on every state change.
    pub fn subscribe(&self) -> watch::Receiver<StreamSnapshot<S::Output>> {
        self.shared.notify.subscribe()
    }

    pub fn data(&self) -> Option<Arc<S::Output>> {
        self.lock().data.clone()
    }

    pub fn state(&self) -> FetchState {
        self.lock().state.clone()
    }

    pub fn is_error_state(&self) -> bool {
        self.lock().state.last_error.is_some()
    }

    pub fn is_retrying(&self) -> bool {
        self.lock().state.is_retrying
    }

    /// Loads with the current cache key. Errors are recorded in the
    /// stream state, never returned.
    pub async fn load(&self) -> LoadOutcome {
        match self.fetch_and_commit(false).await {
            Ok(commit) => commit.into(),
            Err(_) => LoadOutcome::Failed,
        }
    }

    /// Clears error and retry state, then loads bypassing the response cache.
    pub async fn force_refresh(&self) -> LoadOutcome {
        {
            let mut inner = self.lock();
            inner.state.last_error = None;
            inner.state.retry_attempt = 0;
            inner.cache_key = self.key_for(&inner.state, Utc::now());
            self.publish(&inner);
        }
        info!("Force refreshing {}", self.shared.source.base_key());
        match self.fetch_and_commit(true).await {
            Ok(commit) => commit.into(),
            Err(_) => LoadOutcome::Failed,
        }
    }

    /// Retries after the backoff delay for this attempt.
    ///
    /// Returns the fetch error when the retry fails; the state is then left
    /// ready for another retry.
    pub async fn retry(&self) -> Result<RetryOutcome, AppError> {
        let attempt = {
            let mut inner = self.lock();
            if inner.state.is_retrying {
                debug!(
                    "Retry already in flight for {}",
                    self.shared.source.base_key()
                );
                return Ok(RetryOutcome::AlreadyRetrying);
            }
            inner.state.is_retrying = true;
            inner.state.retry_attempt = inner.state.retry_attempt.saturating_add(1);
            inner.state.phase = StreamPhase::Retrying;
            inner.cache_key = self.key_for(&inner.state, Utc::now());
            self.publish(&inner);
            inner.state.retry_attempt
        };
        let _guard = RetryGuard { stream: self };

        let delay = self.shared.policy.delay_for(attempt - 1);
        info!(
            "Retrying {} (attempt {}) in {:?}",
            self.shared.source.base_key(),
            attempt,
            delay
        );
        tokio::time::sleep(delay).await;

        match self.fetch_and_commit(false).await? {
            Commit::Committed => Ok(RetryOutcome::Recovered),
            Commit::Stale => Ok(RetryOutcome::Superseded),
        }
    }

    /// Issues one fetch tagged with a fresh generation and commits it unless
    /// a newer fetch already completed.
    async fn fetch_and_commit(&self, bypass_cache: bool) -> Result<Commit, AppError> {
        let generation = self.shared.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let cache_key = {
            let mut inner = self.lock();
            inner.pending += 1;
            if !inner.state.is_retrying {
                inner.state.phase = StreamPhase::Fetching;
            }
            inner.cache_key = self.key_for(&inner.state, Utc::now());
            self.publish(&inner);
            inner.cache_key.clone()
        };

        let mut pending_guard = PendingGuard {
            stream: self,
            armed: true,
        };

        debug!("Load #{generation} using cache key {cache_key}");
        let result = self
            .shared
            .source
            .fetch(&self.shared.api, &cache_key, bypass_cache)
            .await;

        pending_guard.armed = false;
        let mut inner = self.lock();
        inner.pending = inner.pending.saturating_sub(1);

        if generation <= inner.latest_completed {
            warn!(
                "Discarding stale response #{generation} for {} (latest #{})",
                self.shared.source.base_key(),
                inner.latest_completed
            );
            self.publish(&inner);
            return Ok(Commit::Stale);
        }
        inner.latest_completed = generation;

        let now = Utc::now();
        match result {
            Ok(data) => {
                inner.data = Some(Arc::new(data));
                inner.committed_at = Some(now);
                inner.state.last_error = None;
                inner.state.retry_attempt = 0;
                inner.state.phase = StreamPhase::Success;
                inner.cache_key = self.key_for(&inner.state, now);
                self.publish(&inner);
                Ok(Commit::Committed)
            }
            Err(error) => {
                let classification = classify_error(&error);
                warn!(
                    "Load failed for {}: {} (retryable: {})",
                    self.shared.source.base_key(),
                    classification,
                    classification.retryable
                );
                inner.state.last_error = Some(classification);
                inner.state.phase = StreamPhase::Failed;
                inner.cache_key = self.key_for(&inner.state, now);
                self.publish(&inner);
                Err(error)
            }
        }
    }

    pub fn is_data_fresh(&self) -> bool {
        self.is_data_fresh_at(Utc::now())
    }

    /// True when data exists and is younger than 30 minutes at `now`,
    /// measured from the payload timestamp or else the commit time.
    pub fn is_data_fresh_at(&self, now: DateTime<Utc>) -> bool {
        let inner = self.lock();
        let Some(data) = inner.data.as_deref() else {
            return false;
        };
        let Some(updated_at) = S::updated_at(data).or(inner.committed_at) else {
            return false;
        };
        let window = TimeDelta::seconds(cache_ttl::FRESHNESS_SECONDS as i64);
        now.signed_duration_since(updated_at) < window
    }

    /// Background refresh is due only for stale data with no recorded error
    /// and nothing in flight.
    pub fn should_background_refresh(&self, now: DateTime<Utc>) -> bool {
        {
            let inner = self.lock();
            if inner.state.last_error.is_some() || inner.state.is_retrying || inner.pending > 0 {
                return false;
            }
        }
        !self.is_data_fresh_at(now)
    }

    /// One freshness check: loads when [`should_background_refresh`] says so.
    ///
    /// [`should_background_refresh`]: DataStream::should_background_refresh
    pub async fn refresh_if_stale(&self, now: DateTime<Utc>) -> Option<LoadOutcome> {
        if self.should_background_refresh(now) {
            debug!(
                "Background refresh of {} (data stale)",
                self.shared.source.base_key()
            );
            Some(self.load().await)
        } else {
            None
        }
    }

    /// Loads, then retries up to `retries` times while the recorded error
    /// is retryable. Returns the final error, if any.
    pub async fn load_with_retries(&self, retries: u32) -> Result<(), ErrorClassification> {
        self.load().await;
        for _ in 0..retries {
            match self.state().last_error {
                Some(error) if error.retryable => {}
                _ => break,
            }
            if let Err(e) = self.retry().await {
                debug!("Retry of {} failed: {e}", self.shared.source.base_key());
            }
        }
        match self.state().last_error {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

impl DataStream<SeasonListSource> {
    pub fn season_list(api: RankingApi, policy: RetryPolicy) -> Self {
        DataStream::new(SeasonListSource, api, policy)
    }
}

impl DataStream<SeasonDetailSource> {
    pub fn season_detail(api: RankingApi, policy: RetryPolicy, season_id: SeasonId) -> Self {
        DataStream::new(SeasonDetailSource::new(season_id), api, policy)
    }

    pub fn season_id(&self) -> SeasonId {
        self.shared.source.season_id
    }
}
