//! Freshness gate: decides once per process whether a collection pass has to
//! run before the listing is served, and keeps concurrent callers from
//! starting a second pass while one is in flight.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tracing::{error, info, warn};

use crate::collectors::CollectionReport;
use crate::error::{CollectionError, StoreError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FreshnessState {
    Unchecked,
    Refreshing,
    Ready,
}

/// Internal phase. `Checking` covers the freshness query itself and is
/// reported to callers as `Unchecked`: no pass has been decided yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Unchecked,
    Checking,
    Refreshing,
    Ready,
}

impl From<Phase> for FreshnessState {
    fn from(phase: Phase) -> Self {
        match phase {
            Phase::Unchecked | Phase::Checking => FreshnessState::Unchecked,
            Phase::Refreshing => FreshnessState::Refreshing,
            Phase::Ready => FreshnessState::Ready,
        }
    }
}

#[derive(Debug)]
pub struct FreshnessGate {
    phase: Mutex<Phase>,
}

impl Default for FreshnessGate {
    fn default() -> Self {
        Self::new()
    }
}

impl FreshnessGate {
    pub fn new() -> Self {
        Self {
            phase: Mutex::new(Phase::Unchecked),
        }
    }

    pub fn state(&self) -> FreshnessState {
        (*self.lock()).into()
    }

    fn lock(&self) -> MutexGuard<'_, Phase> {
        self.phase.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Claims the gate for a refresh pass. `None` when a pass is already
    /// running or the first-use check is in progress. The returned guard
    /// flips the gate to `Ready` when dropped, whether the pass succeeded,
    /// failed or panicked.
    pub fn try_begin_refresh(self: &Arc<Self>) -> Option<RefreshGuard> {
        let mut phase = self.lock();
        if matches!(*phase, Phase::Checking | Phase::Refreshing) {
            return None;
        }
        *phase = Phase::Refreshing;
        Some(RefreshGuard {
            gate: Arc::clone(self),
        })
    }

    /// First-use check. Blocks the first caller for the whole collection pass
    /// when the store is stale; later callers return immediately. A fresh
    /// store goes straight to `Ready` without ever reporting `Refreshing`.
    /// Callers that see `Unchecked` or `Refreshing` should serve whatever is
    /// already stored.
    ///
    /// Collection failures are logged and swallowed: stale data beats no page.
    pub fn ensure_fresh<F, C>(self: &Arc<Self>, is_fresh: F, collect: C) -> FreshnessState
    where
        F: FnOnce() -> Result<bool, StoreError>,
        C: FnOnce() -> Result<CollectionReport, CollectionError>,
    {
        let guard = {
            let mut phase = self.lock();
            match *phase {
                Phase::Unchecked => *phase = Phase::Checking,
                other => return other.into(),
            }
            RefreshGuard {
                gate: Arc::clone(self),
            }
        };

        match is_fresh() {
            Ok(true) => {
                info!("stored events are fresh; skipping initial collection");
                return guard.finish();
            }
            Ok(false) => info!("stored events are stale; running initial collection"),
            Err(err) => warn!("freshness check failed, collecting anyway: {err}"),
        }
        *self.lock() = Phase::Refreshing;

        match collect() {
            Ok(report) => info!(
                discovered = report.discovered(),
                inserted = report.inserted(),
                updated = report.updated(),
                "initial collection complete"
            ),
            Err(err) => error!("collection pass failed; serving existing data: {err}"),
        }
        guard.finish()
    }
}

#[derive(Debug)]
pub struct RefreshGuard {
    gate: Arc<FreshnessGate>,
}

impl RefreshGuard {
    pub fn finish(self) -> FreshnessState {
        drop(self);
        FreshnessState::Ready
    }
}

impl Drop for RefreshGuard {
    fn drop(&mut self) {
        *self.gate.lock() = Phase::Ready;
    }
}
