//! Shared application state.

use std::sync::{Arc, Mutex};

use chrono::Duration;
use tracing::error;

use crate::api::error::ApiError;
use crate::collectors;
use crate::config::AppConfig;
use crate::db::{self, Store, UpcomingQuery};
use crate::error::StoreError;
use crate::freshness::{FreshnessGate, FreshnessState};

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// SQLite store; every access goes through `spawn_blocking`.
    pub store: Arc<Mutex<Store>>,
    /// Process-wide freshness gate, created once at startup.
    pub gate: Arc<FreshnessGate>,
    /// Listing horizon in months; `None` lists every upcoming event.
    pub horizon_months: Option<u32>,
    pub freshness_window: Duration,
}

impl AppState {
    #[must_use]
    pub fn new(store: Store, config: &AppConfig) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
            gate: Arc::new(FreshnessGate::new()),
            horizon_months: config.horizon(),
            freshness_window: config.freshness_window(),
        }
    }

    /// The query behind the public listing.
    pub fn listing_query(&self) -> UpcomingQuery {
        UpcomingQuery {
            horizon_months: self.horizon_months,
            ..UpcomingQuery::default()
        }
    }

    /// Runs `f` against the store on the blocking pool.
    pub async fn with_store<F, T>(&self, f: F) -> Result<T, ApiError>
    where
        F: FnOnce(&Store) -> Result<T, StoreError> + Send + 'static,
        T: Send + 'static,
    {
        let store = Arc::clone(&self.store);
        let result = tokio::task::spawn_blocking(move || {
            let guard = db::lock(&store)?;
            f(&*guard)
        })
        .await
        .map_err(|err| ApiError::Internal(format!("store task failed: {err}")))?;
        result.map_err(ApiError::from)
    }

    /// Runs the freshness gate before serving. The first request on a stale
    /// store waits for the collection pass; requests arriving meanwhile get
    /// `Unchecked` or `Refreshing` back and serve what is already stored.
    pub async fn ensure_fresh(&self) -> FreshnessState {
        if self.gate.state() == FreshnessState::Ready {
            return FreshnessState::Ready;
        }

        let gate = Arc::clone(&self.gate);
        let store = Arc::clone(&self.store);
        let window = self.freshness_window;
        let outcome = tokio::task::spawn_blocking(move || {
            gate.ensure_fresh(
                || {
                    let guard = db::lock(&store)?;
                    guard.has_recent_activity(window)
                },
                || collectors::run_all(&store),
            )
        })
        .await;

        match outcome {
            Ok(state) => state,
            Err(err) => {
                error!("freshness task failed: {err}");
                self.gate.state()
            }
        }
    }
}
