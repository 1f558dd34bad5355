pub mod base;
pub mod city_hall;
pub mod common;
pub mod food;
pub mod library;
pub mod listings;

use std::sync::Mutex;

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use tracing::{info, warn};

use crate::db::{lock, InsertOutcome, Store};
use crate::error::CollectionError;
use crate::models::Event;

/// One source of candidate events. Implementations only discover events;
/// persisting them is the orchestrator's job.
pub trait Collector: Send + Sync {
    fn source_id(&self) -> &'static str;
    fn source_name(&self) -> &'static str;
    fn source_url(&self) -> &'static str;
    fn collect(&self, today: NaiveDate) -> anyhow::Result<Vec<Event>>;
}

#[derive(Clone, Debug, Serialize)]
pub struct CollectorInfo {
    pub id: String,
    pub name: String,
    pub url: String,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct SourceReport {
    pub source_id: String,
    pub discovered: usize,
    /// Generated entries already in the past; never stored.
    pub skipped: usize,
    pub inserted: usize,
    pub updated: usize,
}

#[derive(Clone, Debug, Serialize)]
pub struct SourceFailure {
    pub source_id: String,
    pub message: String,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct CollectionReport {
    pub purged: usize,
    pub sources: Vec<SourceReport>,
    pub failures: Vec<SourceFailure>,
}

impl CollectionReport {
    pub fn discovered(&self) -> usize {
        self.sources.iter().map(|s| s.discovered).sum()
    }

    pub fn inserted(&self) -> usize {
        self.sources.iter().map(|s| s.inserted).sum()
    }

    pub fn updated(&self) -> usize {
        self.sources.iter().map(|s| s.updated).sum()
    }
}

fn active_collectors() -> Vec<Box<dyn Collector>> {
    vec![
        Box::new(city_hall::CityHall),
        Box::new(library::PublicLibrary),
        Box::new(listings::CHARLES_RIVER_MUSEUM),
        Box::new(listings::BRANDEIS),
        Box::new(listings::RECREATION),
        Box::new(listings::EVENTBRITE),
        Box::new(common::WalthamCommon),
        Box::new(listings::MEETUP),
        Box::new(food::FoodEvents),
    ]
}

pub fn list_collectors() -> Vec<CollectorInfo> {
    active_collectors()
        .into_iter()
        .map(|collector| CollectorInfo {
            id: collector.source_id().to_string(),
            name: collector.source_name().to_string(),
            url: collector.source_url().to_string(),
        })
        .collect()
}

fn find_collector(id: &str) -> Option<Box<dyn Collector>> {
    active_collectors()
        .into_iter()
        .find(|collector| collector.source_id() == id)
}

/// Full collection pass over every registered source.
pub fn run_all(store: &Mutex<Store>) -> Result<CollectionReport, CollectionError> {
    run_collectors(store, active_collectors())
}

/// Purges past events, then runs each collector and upserts what it found.
/// A failing source is recorded and skipped; the pass itself only fails when
/// storage breaks or when every source failed without yielding anything.
pub fn run_collectors(
    store: &Mutex<Store>,
    collectors: Vec<Box<dyn Collector>>,
) -> Result<CollectionReport, CollectionError> {
    let (now, purged) = {
        let store = lock(store)?;
        (store.clock().now(), store.purge_past()?)
    };

    let mut report = CollectionReport {
        purged,
        ..CollectionReport::default()
    };

    for collector in collectors {
        let source_id = collector.source_id();
        match collector.collect(now.date()) {
            Ok(events) => {
                let source = persist(store, source_id, events, now)?;
                info!(
                    source = source_id,
                    discovered = source.discovered,
                    inserted = source.inserted,
                    updated = source.updated,
                    "collected events from {}",
                    collector.source_name()
                );
                report.sources.push(source);
            }
            Err(err) => {
                warn!(source = source_id, "collector failed: {err:#}");
                report.failures.push(SourceFailure {
                    source_id: source_id.to_string(),
                    message: format!("{err:#}"),
                });
            }
        }
    }

    if report.discovered() == 0 && !report.failures.is_empty() {
        let joined = report
            .failures
            .iter()
            .map(|failure| format!("{}: {}", failure.source_id, failure.message))
            .collect::<Vec<_>>()
            .join("; ");
        return Err(CollectionError::AllSourcesFailed(joined));
    }

    let upcoming = lock(store)?.count_upcoming()?;
    info!(
        discovered = report.discovered(),
        purged = report.purged,
        failed = report.failures.len(),
        upcoming,
        "collection pass finished"
    );
    Ok(report)
}

pub fn run_single(store: &Mutex<Store>, id: &str) -> Result<SourceReport, CollectionError> {
    let collector =
        find_collector(id).ok_or_else(|| CollectionError::UnknownSource(id.to_string()))?;
    let now = lock(store)?.clock().now();
    let events = collector
        .collect(now.date())
        .map_err(|err| CollectionError::SourceFailed {
            source_id: id.to_string(),
            message: format!("{err:#}"),
        })?;
    persist(store, collector.source_id(), events, now)
}

fn persist(
    store: &Mutex<Store>,
    source_id: &str,
    events: Vec<Event>,
    now: NaiveDateTime,
) -> Result<SourceReport, CollectionError> {
    let (events, past): (Vec<_>, Vec<_>) = events
        .into_iter()
        .partition(|event| event.occurs_at.map_or(true, |at| at >= now));
    let mut report = SourceReport {
        source_id: source_id.to_string(),
        discovered: events.len(),
        skipped: past.len(),
        ..SourceReport::default()
    };
    for event in &events {
        // Locked per event; readers interleave with a long pass.
        match lock(store)?.insert(event)? {
            InsertOutcome::Inserted(_) => report.inserted += 1,
            InsertOutcome::Updated(_) => report.updated += 1,
        }
    }
    Ok(report)
}
