//! Time-bounded rate cache with single-flight refresh.
//!
//! `RateCache` owns the only copy of the current [`RateSnapshot`]. A read
//! that finds the entry fresh returns it immediately. A read that finds it
//! missing or past its TTL either starts a refresh or joins the refresh that
//! is already running, so concurrent callers share one upstream fetch and
//! one outcome.
//!
//! Lifecycle changes are published as [`CacheEvent`]s on a broadcast
//! channel. Publishing never waits: with no subscriber, or a subscriber that
//! fell behind, events are dropped.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tokio::sync::broadcast;
use tokio::time::Instant;
use tracing::{Instrument, debug, info, info_span, warn};

use crate::error::RateFetchError;
use crate::fetcher::RateFetcher;
use crate::snapshot::RateSnapshot;

/// Key of the single rate table this service caches.
pub const RATES_CACHE_KEY: &str = "currency-rates";

/// Longest TTL the cache accepts; larger values are clamped to it.
pub const MAX_RATES_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Configuration for the rate cache.
#[derive(Debug, Clone)]
pub struct RateCacheConfig {
    /// How long a snapshot is served after it entered the cache.
    pub ttl: Duration,
    /// Upper bound on cached entries.
    pub max_entries: usize,
    /// Keep serving an expired snapshot when its refresh fails.
    pub serve_stale_on_error: bool,
    /// Events buffered per subscriber before the oldest are dropped.
    pub event_capacity: usize,
}

impl Default for RateCacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(30 * 60),
            max_entries: 1,
            serve_stale_on_error: false,
            event_capacity: 64,
        }
    }
}

/// Cache lifecycle notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheEvent {
    /// A freshly fetched snapshot was stored.
    Created {
        key: String,
        fetched_at: DateTime<Utc>,
        currencies: usize,
    },
    /// A snapshot stopped being served, either because its TTL lapsed or
    /// because it was evicted.
    Expired {
        key: String,
        fetched_at: DateTime<Utc>,
    },
}

#[derive(Debug, Clone)]
struct CacheEntry {
    snapshot: Arc<RateSnapshot>,
    inserted_at: Instant,
    expires_at: Instant,
}

impl CacheEntry {
    fn is_fresh(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

type RefreshOutcome = Result<Arc<RateSnapshot>, RateFetchError>;

#[derive(Default)]
struct CacheState {
    entries: HashMap<String, CacheEntry>,
    in_flight: HashMap<String, broadcast::Sender<RefreshOutcome>>,
}

struct Inner {
    fetcher: Arc<dyn RateFetcher>,
    config: RateCacheConfig,
    state: Mutex<CacheState>,
    events: broadcast::Sender<CacheEvent>,
}

/// Thread-safe rate cache. Cloning is cheap and shares the same cache.
#[derive(Clone)]
pub struct RateCache {
    inner: Arc<Inner>,
}

impl RateCache {
    /// Creates a cache with the default configuration.
    pub fn new(fetcher: Arc<dyn RateFetcher>) -> Self {
        Self::with_config(fetcher, RateCacheConfig::default())
    }

    /// Creates a cache with a custom configuration.
    pub fn with_config(fetcher: Arc<dyn RateFetcher>, mut config: RateCacheConfig) -> Self {
        config.max_entries = config.max_entries.max(1);
        config.ttl = config.ttl.min(MAX_RATES_TTL);
        let (events, _) = broadcast::channel(config.event_capacity.max(1));

        Self {
            inner: Arc::new(Inner {
                fetcher,
                config,
                state: Mutex::new(CacheState::default()),
                events,
            }),
        }
    }

    pub fn config(&self) -> &RateCacheConfig {
        &self.inner.config
    }

    /// Subscribes to lifecycle events emitted after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<CacheEvent> {
        self.inner.events.subscribe()
    }

    /// Returns the current snapshot, refreshing it when missing or stale.
    pub async fn get(&self) -> Result<Arc<RateSnapshot>, RateFetchError> {
        self.get_key(RATES_CACHE_KEY).await
    }

    /// Number of entries currently held, fresh or not.
    pub fn len(&self) -> usize {
        self.inner.state.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) async fn get_key(&self, key: &str) -> RefreshOutcome {
        let mut waiter = {
            let mut state = self.inner.state.lock();

            if let Some(entry) = state.entries.get(key) {
                if entry.is_fresh(Instant::now()) {
                    debug!(key, "Rate cache hit");
                    return Ok(Arc::clone(&entry.snapshot));
                }
                debug!(
                    key,
                    age_secs = entry.inserted_at.elapsed().as_secs(),
                    "Rate cache entry expired"
                );
            }

            match state.in_flight.get(key) {
                Some(refresh) => {
                    debug!(key, "Joining in-flight rate refresh");
                    refresh.subscribe()
                }
                None => {
                    debug!(key, "Rate cache miss, starting refresh");
                    let (refresh, waiter) = broadcast::channel(1);
                    state.in_flight.insert(key.to_string(), refresh);
                    self.spawn_refresh(key.to_string());
                    waiter
                }
            }
        };

        match waiter.recv().await {
            Ok(outcome) => outcome,
            Err(e) => Err(RateFetchError::Aborted(e.to_string())),
        }
    }

    /// Runs the fetch on its own task so a caller giving up does not strand
    /// the others waiting on the same refresh.
    fn spawn_refresh(&self, key: String) {
        let inner = Arc::clone(&self.inner);
        let span = info_span!("rate_refresh", key = %key);
        tokio::spawn(
            async move {
                let mut guard = RefreshGuard::new(inner, key);
                let fetcher = Arc::clone(&guard.inner.fetcher);
                let fetch = async move { fetcher.fetch().await }.in_current_span();
                let outcome = match tokio::spawn(fetch).await {
                    Ok(result) => result,
                    Err(join_error) => Err(RateFetchError::Aborted(join_error.to_string())),
                };
                guard.inner.complete_refresh(&guard.key, outcome);
                guard.completed = true;
            }
            .instrument(span),
        );
    }
}

/// Owns an in-flight slot for the lifetime of its refresh task. If the task
/// unwinds or is cancelled before delivering an outcome, dropping the guard
/// frees the slot and tells every waiter the refresh was aborted.
struct RefreshGuard {
    inner: Arc<Inner>,
    key: String,
    completed: bool,
}

impl RefreshGuard {
    fn new(inner: Arc<Inner>, key: String) -> Self {
        Self {
            inner,
            key,
            completed: false,
        }
    }
}

impl Drop for RefreshGuard {
    fn drop(&mut self) {
        if self.completed {
            return;
        }
        let refresh = self.inner.state.lock().in_flight.remove(&self.key);
        if let Some(refresh) = refresh {
            warn!(key = %self.key, "Rate refresh ended without an outcome");
            let _ = refresh.send(Err(RateFetchError::Aborted(
                "rate refresh ended without an outcome".to_string(),
            )));
        }
    }
}

impl Inner {
    fn complete_refresh(&self, key: &str, outcome: Result<RateSnapshot, RateFetchError>) {
        let mut state = self.state.lock();

        let result = match outcome {
            Ok(snapshot) => Ok(self.store(&mut state, key, snapshot)),
            Err(err) => self.fail(&mut state, key, err),
        };

        if let Some(refresh) = state.in_flight.remove(key) {
            // no receivers left means every caller went away; nothing to deliver
            let _ = refresh.send(result);
        }
    }

    fn store(&self, state: &mut CacheState, key: &str, snapshot: RateSnapshot) -> Arc<RateSnapshot> {
        if !state.entries.contains_key(key) {
            self.make_room(state);
        }

        let snapshot = Arc::new(snapshot);
        let now = Instant::now();
        let expires_at = now
            .checked_add(self.config.ttl)
            .unwrap_or_else(|| now + MAX_RATES_TTL);
        let previous = state.entries.insert(
            key.to_string(),
            CacheEntry {
                snapshot: Arc::clone(&snapshot),
                inserted_at: now,
                expires_at,
            },
        );

        if let Some(previous) = previous.filter(|entry| !entry.is_fresh(now)) {
            self.emit(CacheEvent::Expired {
                key: key.to_string(),
                fetched_at: previous.snapshot.fetched_at(),
            });
        }

        info!(
            key,
            currencies = snapshot.rates().len(),
            ttl_secs = self.config.ttl.as_secs(),
            "Rate cache refreshed"
        );
        self.emit(CacheEvent::Created {
            key: key.to_string(),
            fetched_at: snapshot.fetched_at(),
            currencies: snapshot.rates().len(),
        });

        snapshot
    }

    fn fail(&self, state: &mut CacheState, key: &str, err: RateFetchError) -> RefreshOutcome {
        if self.config.serve_stale_on_error {
            if let Some(stale) = state.entries.get(key) {
                warn!(key, error = %err, "Rate refresh failed, serving stale snapshot");
                return Ok(Arc::clone(&stale.snapshot));
            }
        }

        warn!(key, error = %err, "Rate refresh failed");
        if let Some(stale) = state.entries.remove(key) {
            self.emit(CacheEvent::Expired {
                key: key.to_string(),
                fetched_at: stale.snapshot.fetched_at(),
            });
        }
        Err(err)
    }

    /// Evicts the entry closest to expiry until there is room for one more.
    fn make_room(&self, state: &mut CacheState) {
        while state.entries.len() >= self.config.max_entries {
            let Some(oldest) = state
                .entries
                .iter()
                .min_by_key(|(_, entry)| entry.expires_at)
                .map(|(key, _)| key.clone())
            else {
                break;
            };

            if let Some(evicted) = state.entries.remove(&oldest) {
                debug!(key = %oldest, "Evicting rate cache entry");
                self.emit(CacheEvent::Expired {
                    key: oldest,
                    fetched_at: evicted.snapshot.fetched_at(),
                });
            }
        }
    }

    fn emit(&self, event: CacheEvent) {
        // Err only means nobody is subscribed
        let _ = self.events.send(event);
    }
}

/// Logs cache lifecycle events until the cache is dropped.
pub async fn log_cache_events(mut events: broadcast::Receiver<CacheEvent>) {
    loop {
        match events.recv().await {
            Ok(CacheEvent::Created {
                key,
                fetched_at,
                currencies,
            }) => {
                info!(%key, %fetched_at, currencies, "Cache entry created");
            }
            Ok(CacheEvent::Expired { key, fetched_at }) => {
                info!(%key, %fetched_at, "Cache entry expired");
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!(skipped, "Cache event logger fell behind");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}
