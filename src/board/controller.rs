//! Board state: applied filters, the current window, refresh cadence and
//! the paged history.
//!
//! Every filter change bumps a generation counter. Foreground, background and
//! history loads are tagged with the generation they were started for, and a
//! result that arrives after its generation was superseded is dropped. The
//! superseded tasks are also aborted, so in practice a stale result rarely
//! gets that far.

use chrono::{DateTime, Utc};
use futures::FutureExt;
use reqwest::Client;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::filters::{FilterSet, FilterSnapshot};
use super::pagination::{RoundCursor, RoundPage};
use super::scheduler::{RefreshFn, RefreshScheduler};
use super::source::{BoardSource, HttpBoardSource};
use crate::config::Config;
use crate::data_fetcher::models::{Event, Window};
use crate::error::AppError;

/// Fixed settings of a controller.
#[derive(Debug, Clone)]
pub struct BoardSettings {
    pub defaults: FilterSet,
    /// Zero disables periodic refresh.
    pub refresh_interval: Duration,
    pub history_days_back: u32,
    pub rounds_per_page: usize,
}

impl BoardSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            defaults: FilterSet::from_config(config),
            refresh_interval: config.refresh_interval(),
            history_days_back: config.history_days_back,
            rounds_per_page: config.rounds_per_page,
        }
    }
}

/// How many loads of each kind have completed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshCounters {
    pub filter_changes: u64,
    pub foreground_fetches: u64,
    pub background_fetches: u64,
    pub history_loads: u64,
    /// Results dropped because their generation was superseded.
    pub discarded_results: u64,
    /// Ticks skipped because a foreground load was still outstanding.
    pub skipped_ticks: u64,
}

/// Point-in-time copy of everything the board displays.
#[derive(Debug, Clone)]
pub struct BoardView {
    pub filters: Option<FilterSet>,
    pub generation: u64,
    pub window: Option<Window>,
    /// A foreground load is running.
    pub loading: bool,
    pub last_error: Option<String>,
    pub last_updated: Option<DateTime<Utc>>,
    pub history: RoundPage,
    pub history_loading: bool,
    pub history_error: Option<String>,
    pub refresh_armed: bool,
    pub counters: RefreshCounters,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FetchKind {
    Foreground,
    Background,
}

struct BoardState {
    filters: Option<FilterSet>,
    generation: u64,
    history_generation: u64,
    window: Option<Window>,
    loading: bool,
    last_error: Option<String>,
    last_updated: Option<DateTime<Utc>>,
    history: RoundCursor,
    history_loading: bool,
    history_error: Option<String>,
    foreground: Option<JoinHandle<()>>,
    history_task: Option<JoinHandle<()>>,
    scheduler: RefreshScheduler,
    counters: RefreshCounters,
}

struct ControllerInner {
    settings: BoardSettings,
    source: Arc<dyn BoardSource>,
    state: Mutex<BoardState>,
    changes: watch::Sender<u64>,
}

impl ControllerInner {
    fn lock(&self) -> MutexGuard<'_, BoardState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn notify(&self) {
        self.changes.send_modify(|version| *version += 1);
    }

    fn apply(self: &Arc<Self>, filters: FilterSet) {
        let mut state = self.lock();
        state.generation += 1;
        let generation = state.generation;
        state.counters.filter_changes += 1;

        let reload_history = state
            .filters
            .as_ref()
            .is_none_or(|previous| previous.history_changed(&filters));
        state.filters = Some(filters.clone());
        info!(
            "Applying filters: leagues={}, season={:?}, days_back={}, days_ahead={} (generation {generation})",
            filters.competitions.join(","),
            filters.season,
            filters.days_back,
            filters.days_ahead
        );

        self.spawn_foreground(&mut state, filters.clone(), generation);
        if reload_history {
            self.spawn_history(&mut state, filters.clone());
        } else {
            debug!("Competitions and season unchanged, keeping history");
        }
        state.scheduler.arm(filters.snapshot(generation));
        drop(state);
        self.notify();
    }

    fn refresh(self: &Arc<Self>) -> bool {
        let mut state = self.lock();
        let Some(filters) = state.filters.clone() else {
            debug!("Manual refresh ignored, no filters applied yet");
            return false;
        };
        state.generation += 1;
        let generation = state.generation;
        info!("Manual refresh (generation {generation})");

        self.spawn_foreground(&mut state, filters.clone(), generation);
        state.scheduler.arm(filters.snapshot(generation));
        drop(state);
        self.notify();
        true
    }

    fn spawn_foreground(self: &Arc<Self>, state: &mut BoardState, filters: FilterSet, generation: u64) {
        if let Some(previous) = state.foreground.take() {
            previous.abort();
        }
        state.loading = true;
        let inner = Arc::clone(self);
        state.foreground = Some(tokio::spawn(async move {
            let result = inner.load_window(&filters).await;
            inner.finish_window(generation, FetchKind::Foreground, result);
        }));
    }

    fn spawn_history(self: &Arc<Self>, state: &mut BoardState, filters: FilterSet) {
        if let Some(previous) = state.history_task.take() {
            previous.abort();
        }
        state.history_generation += 1;
        let history_generation = state.history_generation;
        state.history = RoundCursor::empty(self.settings.rounds_per_page);
        state.history_loading = true;
        state.history_error = None;

        let inner = Arc::clone(self);
        let days_back = self.settings.history_days_back;
        state.history_task = Some(tokio::spawn(async move {
            let result = inner.source.history(filters, days_back).await;
            inner.finish_history(history_generation, result);
        }));
    }

    async fn load_window(&self, filters: &FilterSet) -> Result<Window, AppError> {
        let query = filters.window_query()?;
        self.source.window(query).await
    }

    async fn background_refresh(&self, snapshot: FilterSnapshot) {
        {
            let mut state = self.lock();
            if state.generation != snapshot.generation() {
                debug!(
                    "Skipping refresh for superseded generation {}",
                    snapshot.generation()
                );
                return;
            }
            // Ticks never overlap a foreground load of the same generation
            if state.loading || state.foreground.is_some() {
                state.counters.skipped_ticks += 1;
                debug!(
                    "Skipping refresh tick, foreground load for generation {} outstanding",
                    snapshot.generation()
                );
                return;
            }
        }
        let result = self.load_window(snapshot.filters()).await;
        self.finish_window(snapshot.generation(), FetchKind::Background, result);
    }

    fn finish_window(&self, generation: u64, kind: FetchKind, result: Result<Window, AppError>) {
        let mut state = self.lock();
        if state.generation != generation {
            state.counters.discarded_results += 1;
            debug!(
                "Discarding {kind:?} result for generation {generation}, current is {}",
                state.generation
            );
            return;
        }

        match kind {
            FetchKind::Foreground => {
                state.loading = false;
                state.foreground = None;
                state.counters.foreground_fetches += 1;
            }
            FetchKind::Background => state.counters.background_fetches += 1,
        }

        match result {
            Ok(window) => {
                debug!(
                    "{kind:?} load finished with {} events",
                    window.total_events()
                );
                state.window = Some(window);
                state.last_error = None;
                state.last_updated = Some(Utc::now());
            }
            Err(e) => {
                warn!("{kind:?} load failed: {e}");
                state.last_error = Some(e.to_string());
                // Keep the last good window only if it still matches the filters
                let current = state.filters.as_ref().and_then(|f| f.window_query().ok());
                if state
                    .window
                    .as_ref()
                    .is_some_and(|w| Some(&w.query) != current.as_ref())
                {
                    state.window = None;
                }
            }
        }
        drop(state);
        self.notify();
    }

    fn finish_history(&self, history_generation: u64, result: Result<Vec<Event>, AppError>) {
        let mut state = self.lock();
        if state.history_generation != history_generation {
            state.counters.discarded_results += 1;
            debug!("Discarding history result for superseded load {history_generation}");
            return;
        }

        state.history_loading = false;
        state.history_task = None;
        state.counters.history_loads += 1;
        match result {
            Ok(events) => {
                info!("Loaded {} history events", events.len());
                state.history = RoundCursor::new(events, self.settings.rounds_per_page);
                state.history_error = None;
            }
            Err(e) => {
                warn!("History load failed: {e}");
                state.history_error = Some(e.to_string());
            }
        }
        drop(state);
        self.notify();
    }

    fn shutdown(&self) {
        let mut state = self.lock();
        state.scheduler.disarm();
        if let Some(task) = state.foreground.take() {
            task.abort();
        }
        if let Some(task) = state.history_task.take() {
            task.abort();
        }
        state.loading = false;
        state.history_loading = false;
    }
}

/// Drives the board: applies filters, keeps the window fresh and pages
/// through the history.
///
/// Dropping the controller disarms the refresh timer and aborts its loads.
pub struct BoardController {
    inner: Arc<ControllerInner>,
}

impl std::fmt::Debug for BoardController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoardController")
            .field("settings", &self.inner.settings)
            .finish_non_exhaustive()
    }
}

impl BoardController {
    pub fn new(settings: BoardSettings, source: Arc<dyn BoardSource>) -> Self {
        let (changes, _) = watch::channel(0);
        let inner = Arc::new_cyclic(|weak: &Weak<ControllerInner>| {
            let weak = weak.clone();
            let on_tick: RefreshFn = Arc::new(move |snapshot| {
                let weak = weak.clone();
                async move {
                    if let Some(inner) = weak.upgrade() {
                        inner.background_refresh(snapshot).await;
                    }
                }
                .boxed()
            });

            ControllerInner {
                state: Mutex::new(BoardState {
                    filters: None,
                    generation: 0,
                    history_generation: 0,
                    window: None,
                    loading: false,
                    last_error: None,
                    last_updated: None,
                    history: RoundCursor::empty(settings.rounds_per_page),
                    history_loading: false,
                    history_error: None,
                    foreground: None,
                    history_task: None,
                    scheduler: RefreshScheduler::new(settings.refresh_interval, on_tick),
                    counters: RefreshCounters::default(),
                }),
                settings,
                source,
                changes,
            }
        });
        Self { inner }
    }

    /// Controller reading from the board HTTP API described by `config`.
    pub fn from_config(config: &Config, client: Client) -> Self {
        Self::new(
            BoardSettings::from_config(config),
            Arc::new(HttpBoardSource::new(client, config.api_base())),
        )
    }

    pub fn settings(&self) -> &BoardSettings {
        &self.inner.settings
    }

    pub fn defaults(&self) -> &FilterSet {
        &self.inner.settings.defaults
    }

    /// Currently applied filters.
    pub fn filters(&self) -> Option<FilterSet> {
        self.inner.lock().filters.clone()
    }

    /// Applies a new filter set.
    ///
    /// Cancels the armed refresh and any running foreground load, starts a
    /// foreground load for `filters` and re-arms the refresh with them. The
    /// history is reloaded (and its cursor reset) only when competitions or
    /// season changed.
    pub fn apply_filters(&self, filters: FilterSet) {
        self.inner.apply(filters);
    }

    /// Reloads the window for the current filters. Returns false if no
    /// filters were applied yet.
    pub fn refresh_now(&self) -> bool {
        self.inner.refresh()
    }

    pub fn reset_to_defaults(&self) {
        self.inner.apply(self.inner.settings.defaults.clone());
    }

    pub fn current_page(&self) -> RoundPage {
        self.inner.lock().history.page()
    }

    /// Moves to older rounds if there are any and returns the page shown.
    pub fn older_page(&self) -> RoundPage {
        let (moved, page) = {
            let mut state = self.inner.lock();
            let moved = state.history.older();
            (moved, state.history.page())
        };
        if moved {
            self.inner.notify();
        }
        page
    }

    /// Moves to newer rounds if there are any and returns the page shown.
    pub fn newer_page(&self) -> RoundPage {
        let (moved, page) = {
            let mut state = self.inner.lock();
            let moved = state.history.newer();
            (moved, state.history.page())
        };
        if moved {
            self.inner.notify();
        }
        page
    }

    pub fn view(&self) -> BoardView {
        let state = self.inner.lock();
        BoardView {
            filters: state.filters.clone(),
            generation: state.generation,
            window: state.window.clone(),
            loading: state.loading,
            last_error: state.last_error.clone(),
            last_updated: state.last_updated,
            history: state.history.page(),
            history_loading: state.history_loading,
            history_error: state.history_error.clone(),
            refresh_armed: state.scheduler.is_armed(),
            counters: state.counters,
        }
    }

    /// Receiver that changes whenever the view does.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.inner.changes.subscribe()
    }

    pub fn is_refresh_armed(&self) -> bool {
        self.inner.lock().scheduler.is_armed()
    }

    /// Number of times the refresh timer has been armed.
    pub fn refresh_arm_count(&self) -> u64 {
        self.inner.lock().scheduler.arm_count()
    }

    /// Waits until the running foreground and history loads are done.
    pub async fn settle(&self) {
        loop {
            let tasks: Vec<JoinHandle<()>> = {
                let mut state = self.inner.lock();
                [state.foreground.take(), state.history_task.take()]
                    .into_iter()
                    .flatten()
                    .collect()
            };
            if tasks.is_empty() {
                return;
            }
            for task in tasks {
                if let Err(e) = task.await
                    && e.is_panic()
                {
                    warn!("Board load panicked: {e}");
                }
            }
        }
    }

    /// Disarms the refresh timer and aborts running loads.
    pub fn shutdown(&self) {
        self.inner.shutdown();
        self.inner.notify();
        info!("Board controller shut down");
    }
}

impl Drop for BoardController {
    fn drop(&mut self) {
        self.inner.shutdown();
    }
}
