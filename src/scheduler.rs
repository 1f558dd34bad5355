//! Periodic background collection for long-running servers.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::collectors::{self, CollectionReport};
use crate::db::Store;
use crate::error::CollectionError;
use crate::freshness::FreshnessGate;

/// One scheduled pass. `None` when another pass holds the gate, so a tick
/// never overlaps a manual refresh or the first-use collection.
pub fn scheduled_pass(
    gate: &Arc<FreshnessGate>,
    store: &Mutex<Store>,
) -> Option<Result<CollectionReport, CollectionError>> {
    let Some(guard) = gate.try_begin_refresh() else {
        info!("refresh already running; skipping scheduled pass");
        return None;
    };

    let result = collectors::run_all(store);
    match &result {
        Ok(report) => info!(
            discovered = report.discovered(),
            inserted = report.inserted(),
            updated = report.updated(),
            purged = report.purged,
            "scheduled refresh complete"
        ),
        Err(err) => error!("scheduled refresh failed: {err}"),
    }
    guard.finish();
    Some(result)
}

/// Runs [`scheduled_pass`] every `period`, first one a full period after
/// startup. The task lives until the runtime shuts down.
pub fn spawn(
    gate: Arc<FreshnessGate>,
    store: Arc<Mutex<Store>>,
    period: Duration,
) -> JoinHandle<()> {
    info!(
        period_minutes = period.as_secs() / 60,
        "starting scheduled collection"
    );

    tokio::spawn(async move {
        loop {
            tokio::time::sleep(period).await;
            let gate = Arc::clone(&gate);
            let store = Arc::clone(&store);
            let tick = tokio::task::spawn_blocking(move || {
                scheduled_pass(&gate, &store);
            });
            if let Err(err) = tick.await {
                error!("scheduled refresh task failed: {err}");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::db;
    use crate::freshness::FreshnessState;
    use chrono::NaiveDate;

    fn shared_store() -> Arc<Mutex<Store>> {
        let now = NaiveDate::from_ymd_opt(2025, 6, 2)
            .and_then(|d| d.and_hms_opt(8, 0, 0))
            .expect("valid now");
        let store = Store::open_in_memory(Arc::new(FixedClock::new(now))).expect("store");
        Arc::new(Mutex::new(store))
    }

    #[test]
    fn tick_skips_while_another_refresh_holds_the_gate() {
        let gate = Arc::new(FreshnessGate::new());
        let store = shared_store();

        let manual = gate.try_begin_refresh().expect("claim gate");
        assert!(scheduled_pass(&gate, &store).is_none());
        assert_eq!(db::lock(&store).expect("lock").count_all().expect("count"), 0);
        assert_eq!(gate.state(), FreshnessState::Refreshing);

        drop(manual);
        let report = scheduled_pass(&gate, &store)
            .expect("gate free")
            .expect("pass succeeds");
        assert!(report.inserted() > 0);
        assert_eq!(gate.state(), FreshnessState::Ready);
    }

    #[tokio::test]
    async fn spawned_task_collects_after_each_period() {
        let gate = Arc::new(FreshnessGate::new());
        let store = shared_store();
        let handle = spawn(Arc::clone(&gate), Arc::clone(&store), Duration::from_millis(20));

        let mut collected = 0;
        for _ in 0..250 {
            tokio::time::sleep(Duration::from_millis(20)).await;
            collected = db::lock(&store).expect("lock").count_all().expect("count");
            if collected > 0 {
                break;
            }
        }
        handle.abort();
        assert!(collected > 0, "no scheduled pass ran");
    }
}
