//! State management for interactive UI
//!
//! Owns the season list stream, the stream of the season on screen and the
//! page built from them. Fetches run on spawned tasks; the UI loop picks up
//! their results through the streams' watch channels.

use crate::constants::{refresh, season};
use crate::data_fetcher::models::{
    AvailableSeasons, SeasonDetail, SeasonId, generate_season_ids, season_for_month,
};
use crate::data_fetcher::processors::{SortField, SortState};
use crate::data_fetcher::stream::{
    DataStream, FreshnessMonitor, SeasonDetailStream, SeasonListStream, StreamSnapshot,
    StreamSource,
};
use crate::data_fetcher::{RankingApi, RetryPolicy};
use crate::teletext_ui::{TeletextPage, build_error_page, build_loading_page, build_ranking_page};
use chrono::{Datelike, Local};
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Timer state for interactive UI operations
#[derive(Debug)]
pub struct TimerState {
    pub last_animation: Instant,
    pub last_activity: Instant,
}

impl TimerState {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            last_animation: now,
            last_activity: now,
        }
    }

    pub fn update_activity(&mut self) {
        self.last_activity = Instant::now();
    }

    pub fn update_animation(&mut self) {
        self.last_animation = Instant::now();
    }
}

impl Default for TimerState {
    fn default() -> Self {
        Self::new()
    }
}

/// UI rendering state
#[derive(Debug, Default)]
pub struct UIState {
    pub needs_render: bool,
    pub current_page: Option<TeletextPage>,
}

impl UIState {
    pub fn request_render(&mut self) {
        self.needs_render = true;
    }

    pub fn clear_render_flag(&mut self) {
        self.needs_render = false;
    }
}

/// The season on screen with its background freshness check.
struct DetailView {
    stream: SeasonDetailStream,
    changes: watch::Receiver<StreamSnapshot<SeasonDetail>>,
    _monitor: FreshnessMonitor,
}

impl DetailView {
    fn new(stream: SeasonDetailStream) -> Self {
        let changes = stream.subscribe();
        let monitor = FreshnessMonitor::spawn(
            stream.clone(),
            Duration::from_secs(refresh::DETAIL_CHECK_SECONDS),
        );
        spawn_load(&stream);
        DetailView {
            stream,
            changes,
            _monitor: monitor,
        }
    }
}

fn spawn_load<S: StreamSource>(stream: &DataStream<S>) {
    let stream = stream.clone();
    tokio::spawn(async move {
        let outcome = stream.load().await;
        debug!("Load finished: {outcome:?}");
    });
}

fn spawn_force_refresh<S: StreamSource>(stream: &DataStream<S>) {
    let stream = stream.clone();
    tokio::spawn(async move {
        let outcome = stream.force_refresh().await;
        debug!("Forced refresh finished: {outcome:?}");
    });
}

fn spawn_retry<S: StreamSource>(stream: &DataStream<S>) {
    let stream = stream.clone();
    tokio::spawn(async move {
        match stream.retry().await {
            Ok(outcome) => debug!("Retry finished: {outcome:?}"),
            Err(e) => warn!("Retry failed: {e}"),
        }
    });
}

/// All state of one interactive session.
pub struct InteractiveState {
    api: RankingApi,
    policy: RetryPolicy,
    sort: SortState,
    season_list: SeasonListStream,
    season_list_changes: watch::Receiver<StreamSnapshot<AvailableSeasons>>,
    _season_list_monitor: FreshnessMonitor,
    detail: Option<DetailView>,
    pub ui: UIState,
    pub timers: TimerState,
}

impl InteractiveState {
    /// Starts loading the season list and, when given, `season`. Without a
    /// season the current one is picked once the list arrives.
    pub fn new(
        api: RankingApi,
        policy: RetryPolicy,
        season: Option<SeasonId>,
        sort: SortState,
    ) -> Self {
        let season_list = DataStream::season_list(api.clone(), policy);
        let season_list_changes = season_list.subscribe();
        let monitor = FreshnessMonitor::spawn(
            season_list.clone(),
            Duration::from_secs(refresh::SEASON_LIST_CHECK_SECONDS),
        );
        spawn_load(&season_list);

        let mut state = Self {
            api,
            policy,
            sort,
            season_list,
            season_list_changes,
            _season_list_monitor: monitor,
            detail: None,
            ui: UIState::default(),
            timers: TimerState::new(),
        };
        match season {
            Some(id) => state.select_season(id),
            None => state.rebuild_page(false),
        }
        state
    }

    pub fn current_season(&self) -> Option<SeasonId> {
        self.detail.as_ref().map(|view| view.stream.season_id())
    }

    pub fn sort(&self) -> SortState {
        self.sort
    }

    /// Switches the screen to `season_id` with a fresh stream.
    ///
    /// The previous stream and its monitor are dropped; a late response for
    /// the old season can no longer reach the screen.
    pub fn select_season(&mut self, season_id: SeasonId) {
        if self.current_season() == Some(season_id) {
            return;
        }
        info!("Switching to season {season_id}");
        let stream = DataStream::season_detail(self.api.clone(), self.policy, season_id);
        self.detail = Some(DetailView::new(stream));
        self.rebuild_page(false);
    }

    /// Seasons available for navigation, newest first.
    ///
    /// Falls back to every quarter since the first ranked year while the
    /// season list is unavailable.
    pub fn navigable_seasons(&self) -> Vec<SeasonId> {
        match self.season_list.data() {
            Some(list) if !list.seasons.is_empty() => list.season_ids(),
            _ => generate_season_ids(season::FIRST_YEAR, Local::now().year()),
        }
    }

    /// Moves `offset` steps through the season list; negative is newer.
    pub fn navigate_season(&mut self, offset: isize) {
        let seasons = self.navigable_seasons();
        if seasons.is_empty() {
            return;
        }
        let current = self
            .current_season()
            .and_then(|id| seasons.iter().position(|s| *s == id))
            .unwrap_or(0);
        let target = current
            .saturating_add_signed(offset)
            .min(seasons.len() - 1);
        if target != current || self.detail.is_none() {
            self.select_season(seasons[target]);
        }
    }

    /// Applies sort key `field`, toggling direction when it is already active.
    pub fn toggle_sort(&mut self, field: SortField) {
        self.sort.toggle(field);
        debug!("Sort changed to {}", self.sort.describe());
        self.rebuild_page(false);
    }

    /// Refetches bypassing the response cache.
    pub fn force_refresh(&mut self) {
        if let Some(view) = &self.detail {
            spawn_force_refresh(&view.stream);
        }
        if self.detail.is_none() || self.season_list.is_error_state() {
            spawn_force_refresh(&self.season_list);
        }
    }

    /// Retries whichever stream is in error, the season on screen first.
    pub fn retry(&mut self) {
        if let Some(view) = &self.detail
            && view.stream.is_error_state()
        {
            spawn_retry(&view.stream);
        } else if self.season_list.is_error_state() {
            spawn_retry(&self.season_list);
        } else {
            debug!("Retry requested without an error; ignoring");
        }
    }

    /// Picks up stream changes; rebuilds the page when anything changed.
    pub fn sync_with_streams(&mut self) {
        let mut changed = false;

        if matches!(self.season_list_changes.has_changed(), Ok(true)) {
            let snapshot = self.season_list_changes.borrow_and_update().clone();
            changed = true;
            if self.detail.is_none() {
                if let Some(id) = snapshot.data.as_ref().and_then(|l| l.current_season_id()) {
                    self.select_season(id);
                } else if snapshot.error.is_some() {
                    let now = Local::now();
                    if let Some(id) = season_for_month(now.year(), now.month()) {
                        warn!("Season list unavailable; falling back to {id}");
                        self.select_season(id);
                    }
                }
            }
        }

        if let Some(view) = &mut self.detail
            && matches!(view.changes.has_changed(), Ok(true))
        {
            let _ = view.changes.borrow_and_update();
            changed = true;
        }

        if changed {
            self.rebuild_page(true);
        }
    }

    /// Rebuilds the page from the latest snapshots. `keep_page` restores the
    /// current page index, clamped to the new page count.
    fn rebuild_page(&mut self, keep_page: bool) {
        let current_page = if keep_page {
            self.ui.current_page.as_ref().map(TeletextPage::current_page)
        } else {
            None
        };

        let mut page = match &self.detail {
            None => match self.season_list.snapshot().error {
                Some(error) => build_error_page(None, &self.sort, &error, true),
                None => build_loading_page(None, &self.sort),
            },
            Some(view) => {
                let snapshot = view.stream.snapshot();
                let season_id = view.stream.season_id();
                match (&snapshot.data, &snapshot.error) {
                    (Some(detail), error) => {
                        let mut page = build_ranking_page(detail, &self.sort, true, current_page);
                        page.set_error_warning(error.is_some());
                        if snapshot.is_retrying {
                            page.show_loading("重试中");
                        } else if snapshot.pending {
                            page.show_loading("刷新中");
                        }
                        page
                    }
                    (None, Some(error)) => {
                        let mut page = build_error_page(Some(season_id), &self.sort, error, true);
                        if snapshot.is_retrying {
                            page.show_loading("重试中");
                        }
                        page
                    }
                    (None, None) => build_loading_page(Some(season_id), &self.sort),
                }
            }
        };
        page.set_season_navigation(true);

        self.ui.current_page = Some(page);
        self.ui.request_render();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_fetcher::api::create_http_client_with_timeout;
    use crate::teletext_ui::TeletextRow;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{method, path},
    };

    async fn mount_seasons(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/api/v0/season/available"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "current_season_id": 202504,
                "available_seasons": [202504, 202501, 202410]
            })))
            .mount(server)
            .await;
    }

    async fn mount_detail(server: &MockServer, season: &str) {
        Mock::given(method("GET"))
            .and(path(format!("/api/v0/season/{season}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "season_id": season,
                "updated_at": "2025-05-01T12:00:00Z",
                "subjects": [
                    {"id": 1, "name": "B", "rank": 2, "score": 9.0},
                    {"id": 2, "name": "A", "rank": 1, "score": 7.0}
                ]
            })))
            .mount(server)
            .await;
    }

    fn state_for(server: &MockServer, season: Option<SeasonId>) -> InteractiveState {
        let client = create_http_client_with_timeout(Duration::from_secs(5)).unwrap();
        let api = RankingApi::new(client, server.uri());
        InteractiveState::new(api, RetryPolicy::immediate(), season, SortState::default())
    }

    async fn settle(state: &mut InteractiveState) {
        for _ in 0..50 {
            tokio::time::sleep(Duration::from_millis(20)).await;
            state.sync_with_streams();
            let ready = state
                .ui
                .current_page
                .as_ref()
                .is_some_and(|p| p.subject_count() > 0 && !p.is_loading());
            if ready {
                return;
            }
        }
    }

    fn titles(state: &InteractiveState) -> Vec<String> {
        state
            .ui
            .current_page
            .as_ref()
            .map(|page| {
                page.rows()
                    .iter()
                    .filter_map(|row| match row {
                        TeletextRow::Subject(s) => Some(s.title.clone()),
                        _ => None,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    #[tokio::test]
    async fn test_picks_current_season_from_list() {
        let server = MockServer::start().await;
        mount_seasons(&server).await;
        mount_detail(&server, "202504").await;

        let mut state = state_for(&server, None);
        settle(&mut state).await;

        assert_eq!(state.current_season(), SeasonId::parse("202504").ok());
        assert_eq!(titles(&state), ["A", "B"]);
    }

    #[tokio::test]
    async fn test_sort_and_season_navigation() {
        let server = MockServer::start().await;
        mount_seasons(&server).await;
        mount_detail(&server, "202504").await;
        mount_detail(&server, "202501").await;

        let mut state = state_for(&server, SeasonId::parse("202504").ok());
        settle(&mut state).await;

        state.toggle_sort(SortField::Score);
        assert_eq!(titles(&state), ["B", "A"]);

        // Newest season is the upper bound
        state.navigate_season(-1);
        assert_eq!(state.current_season(), SeasonId::parse("202504").ok());

        state.navigate_season(1);
        assert_eq!(state.current_season(), SeasonId::parse("202501").ok());
        settle(&mut state).await;
        assert_eq!(state.sort().field, SortField::Score);
        assert_eq!(titles(&state), ["B", "A"]);
    }

    #[tokio::test]
    async fn test_navigation_falls_back_without_season_list() {
        let server = MockServer::start().await;
        let mut state = state_for(&server, None);
        for _ in 0..50 {
            tokio::time::sleep(Duration::from_millis(20)).await;
            state.sync_with_streams();
            if state.current_season().is_some() {
                break;
            }
        }

        // Unmatched requests answer 404, so the list fails and the calendar
        // season takes over.
        let now = Local::now();
        assert_eq!(state.current_season(), season_for_month(now.year(), now.month()));
        let seasons = state.navigable_seasons();
        assert_eq!(seasons.last().map(|s| s.year()), Some(season::FIRST_YEAR));
    }
}
