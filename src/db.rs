use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{Duration, Months, NaiveDateTime};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use tracing::{debug, info};

use crate::clock::Clock;
use crate::error::StoreError;
use crate::models::{format_timestamp, Category, Event};
use crate::utils;

pub const SCHEMA_VERSION: i64 = 3;

/// More upcoming events than this counts as "fresh enough" on its own.
pub const FRESH_UPCOMING_THRESHOLD: i64 = 10;

const EVENT_COLUMNS: &str = "id, name, date_time, location, description, source_url, source_name,
     category, cost, organizer, contact_info, registration_required, age_restrictions, created_at";

/// Columns added after the first release. Older databases may already carry
/// some of them, so each is added only when missing.
const METADATA_COLUMNS: [(&str, &str); 6] = [
    ("cost", "TEXT DEFAULT ''"),
    ("organizer", "TEXT DEFAULT ''"),
    ("contact_info", "TEXT DEFAULT ''"),
    ("registration_required", "BOOLEAN DEFAULT 0"),
    ("age_restrictions", "TEXT DEFAULT ''"),
    ("last_seen_at", "TEXT"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted(i64),
    /// The `source_url` was already stored; its row was replaced in place.
    Updated(i64),
}

impl InsertOutcome {
    pub fn id(&self) -> i64 {
        match self {
            InsertOutcome::Inserted(id) | InsertOutcome::Updated(id) => *id,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct UpcomingQuery {
    pub limit: Option<usize>,
    pub category: Option<Category>,
    /// Upper bound in months from now; `None` means unbounded.
    pub horizon_months: Option<u32>,
}

pub struct Store {
    conn: Connection,
    clock: Arc<dyn Clock>,
}

/// A poisoned lock means a writer panicked mid-pass; surface it as a store
/// failure instead of panicking the caller too.
pub fn lock(store: &Mutex<Store>) -> Result<MutexGuard<'_, Store>, StoreError> {
    store.lock().map_err(|_| StoreError::Poisoned)
}

impl Store {
    pub fn open(path: impl AsRef<Path>, clock: Arc<dyn Clock>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        utils::ensure_parent(path)?;
        let conn = Connection::open(path)?;
        Self::from_connection(conn, clock)
    }

    pub fn open_in_memory(clock: Arc<dyn Clock>) -> Result<Self, StoreError> {
        Self::from_connection(Connection::open_in_memory()?, clock)
    }

    pub fn from_connection(conn: Connection, clock: Arc<dyn Clock>) -> Result<Self, StoreError> {
        let store = Self { conn, clock };
        store.migrate()?;
        Ok(store)
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    pub fn schema_version(&self) -> Result<i64, StoreError> {
        Ok(self
            .conn
            .query_row("PRAGMA user_version", [], |row| row.get(0))?)
    }

    fn migrate(&self) -> Result<(), StoreError> {
        let mut current = self.schema_version()?;
        if current > SCHEMA_VERSION {
            return Err(StoreError::UnsupportedSchemaVersion {
                found: current,
                supported: SCHEMA_VERSION,
            });
        }

        if current < 1 {
            let tx = self.conn.unchecked_transaction()?;
            tx.execute_batch(
                "CREATE TABLE IF NOT EXISTS events (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    name TEXT NOT NULL,
                    date_time DATETIME,
                    location TEXT,
                    description TEXT,
                    source_url TEXT UNIQUE,
                    source_name TEXT,
                    category TEXT DEFAULT 'general',
                    created_at DATETIME
                );
                PRAGMA user_version = 1;",
            )?;
            tx.commit()?;
            current = 1;
            debug!("events schema at version 1");
        }

        if current < 2 {
            let tx = self.conn.unchecked_transaction()?;
            let existing = {
                let mut stmt = tx.prepare("PRAGMA table_info(events)")?;
                let names = stmt
                    .query_map([], |row| row.get::<_, String>("name"))?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                names
            };
            for (column, definition) in METADATA_COLUMNS {
                if existing.iter().any(|name| name == column) {
                    continue;
                }
                tx.execute_batch(&format!(
                    "ALTER TABLE events ADD COLUMN {column} {definition};"
                ))?;
                info!(column, "added events column");
            }
            tx.execute_batch("PRAGMA user_version = 2;")?;
            tx.commit()?;
            current = 2;
        }

        if current < 3 {
            // Older writers stored `YYYY-MM-DD HH:MM:SS[.ffffff]`; range
            // queries compare text, so every timestamp is rewritten to the
            // canonical `YYYY-MM-DDTHH:MM:SS` form.
            let tx = self.conn.unchecked_transaction()?;
            tx.execute(
                "UPDATE events SET date_time = substr(replace(date_time, ' ', 'T'), 1, 19)
                 WHERE date_time IS NOT NULL",
                [],
            )?;
            tx.execute(
                "UPDATE events SET created_at = substr(replace(created_at, ' ', 'T'), 1, 19)
                 WHERE created_at IS NOT NULL",
                [],
            )?;
            tx.execute(
                "UPDATE events SET created_at = ?1 WHERE created_at IS NULL",
                params![format_timestamp(&self.clock.now())],
            )?;
            tx.execute_batch(
                "CREATE INDEX IF NOT EXISTS idx_events_date_time ON events(date_time);
                 PRAGMA user_version = 3;",
            )?;
            tx.commit()?;
            debug!("events schema at version 3");
        }

        Ok(())
    }

    /// Insert-or-replace keyed on `source_url`. A re-insert keeps the row's
    /// id and its original `created_at` ("first seen") and overwrites every
    /// other field.
    pub fn insert(&self, event: &Event) -> Result<InsertOutcome, StoreError> {
        if event.name.trim().is_empty() {
            return Err(StoreError::InvalidEvent("name must not be empty".into()));
        }
        if event.source_url.trim().is_empty() {
            return Err(StoreError::InvalidEvent(format!(
                "source_url must not be empty (event {:?})",
                event.name
            )));
        }

        let now = format_timestamp(&self.clock.now());
        let occurs_at = event.occurs_at.as_ref().map(format_timestamp);

        let tx = self.conn.unchecked_transaction()?;
        let existing: Option<i64> = tx
            .query_row(
                "SELECT id FROM events WHERE source_url = ?1",
                params![event.source_url],
                |row| row.get(0),
            )
            .optional()?;

        let outcome = match existing {
            Some(id) => {
                tx.execute(
                    "UPDATE events SET
                        name = ?2, date_time = ?3, location = ?4, description = ?5,
                        source_name = ?6, category = ?7, cost = ?8, organizer = ?9,
                        contact_info = ?10, registration_required = ?11,
                        age_restrictions = ?12, last_seen_at = ?13
                     WHERE id = ?1",
                    params![
                        id,
                        event.name,
                        occurs_at,
                        event.location,
                        event.description,
                        event.source_name,
                        event.category.as_str(),
                        event.cost,
                        event.organizer,
                        event.contact_info,
                        event.registration_required,
                        event.age_restrictions,
                        now
                    ],
                )?;
                InsertOutcome::Updated(id)
            }
            None => {
                tx.execute(
                    "INSERT INTO events (
                        name, date_time, location, description, source_url, source_name,
                        category, cost, organizer, contact_info, registration_required,
                        age_restrictions, created_at, last_seen_at
                     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?13)",
                    params![
                        event.name,
                        occurs_at,
                        event.location,
                        event.description,
                        event.source_url,
                        event.source_name,
                        event.category.as_str(),
                        event.cost,
                        event.organizer,
                        event.contact_info,
                        event.registration_required,
                        event.age_restrictions,
                        now
                    ],
                )?;
                InsertOutcome::Inserted(tx.last_insert_rowid())
            }
        };
        tx.commit()?;
        Ok(outcome)
    }

    /// Dated events at or after now, ascending by time.
    pub fn query_upcoming(&self, query: &UpcomingQuery) -> Result<Vec<Event>, StoreError> {
        let now = self.clock.now();
        let mut sql = format!(
            "SELECT {EVENT_COLUMNS} FROM events
             WHERE date_time IS NOT NULL AND date_time >= ?"
        );
        let mut args = vec![Value::Text(format_timestamp(&now))];

        if let Some(months) = query.horizon_months {
            let horizon = now.checked_add_months(Months::new(months)).ok_or_else(|| {
                StoreError::Timestamp(format!("horizon of {months} months overflows"))
            })?;
            sql.push_str(" AND date_time <= ?");
            args.push(Value::Text(format_timestamp(&horizon)));
        }
        if let Some(category) = query.category {
            sql.push_str(" AND category = ?");
            args.push(Value::Text(category.as_str().to_string()));
        }
        sql.push_str(" ORDER BY date_time ASC, id ASC");
        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            args.push(Value::Integer(i64::try_from(limit).unwrap_or(i64::MAX)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(args.iter()), event_from_row)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    pub fn get_by_id(&self, id: i64) -> Result<Option<Event>, StoreError> {
        Ok(self
            .conn
            .query_row(
                &format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = ?1"),
                params![id],
                event_from_row,
            )
            .optional()?)
    }

    pub fn count_upcoming(&self) -> Result<i64, StoreError> {
        Ok(self.conn.query_row(
            "SELECT COUNT(*) FROM events WHERE date_time IS NOT NULL AND date_time >= ?1",
            params![format_timestamp(&self.clock.now())],
            |row| row.get(0),
        )?)
    }

    /// Every stored row, dated or not.
    pub fn count_all(&self) -> Result<i64, StoreError> {
        Ok(self
            .conn
            .query_row("SELECT COUNT(*) FROM events", [], |row| row.get(0))?)
    }

    /// Deletes dated events strictly before now. Undated rows are kept: they
    /// can never be "past" under this rule.
    pub fn purge_past(&self) -> Result<usize, StoreError> {
        let removed = self.conn.execute(
            "DELETE FROM events WHERE date_time IS NOT NULL AND date_time < ?1",
            params![format_timestamp(&self.clock.now())],
        )?;
        info!(removed, "removed past events");
        Ok(removed)
    }

    /// Heuristic freshness signal, not a guarantee: true when an upcoming
    /// event was first seen within `window`, or when there are more than
    /// [`FRESH_UPCOMING_THRESHOLD`] upcoming events in total. A window
    /// reaching past the earliest representable time covers every row.
    pub fn has_recent_activity(&self, window: Duration) -> Result<bool, StoreError> {
        let now = self.clock.now();
        let recent: i64 = match now.checked_sub_signed(window) {
            Some(since) => self.conn.query_row(
                "SELECT COUNT(*) FROM events
                 WHERE created_at >= ?1 AND date_time IS NOT NULL AND date_time >= ?2",
                params![format_timestamp(&since), format_timestamp(&now)],
                |row| row.get(0),
            )?,
            None => self.count_upcoming()?,
        };
        if recent > 0 {
            return Ok(true);
        }
        Ok(self.count_upcoming()? > FRESH_UPCOMING_THRESHOLD)
    }

    /// Distinct, sorted source names among upcoming events.
    pub fn upcoming_sources(&self) -> Result<Vec<String>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT DISTINCT source_name FROM events
             WHERE date_time IS NOT NULL AND date_time >= ?1
               AND source_name IS NOT NULL AND source_name != ''
             ORDER BY source_name ASC",
        )?;
        let rows = stmt.query_map(params![format_timestamp(&self.clock.now())], |row| {
            row.get::<_, String>(0)
        })?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    /// Upcoming count per category in [`Category::ALL`] order, zeros omitted.
    /// Unrecognised stored labels are counted as `general`.
    pub fn category_counts(&self) -> Result<Vec<(Category, i64)>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT category, COUNT(*) FROM events
             WHERE date_time IS NOT NULL AND date_time >= ?1
             GROUP BY category",
        )?;
        let rows = stmt.query_map(params![format_timestamp(&self.clock.now())], |row| {
            Ok((row.get::<_, Option<String>>(0)?, row.get::<_, i64>(1)?))
        })?;

        let mut counts: HashMap<Category, i64> = HashMap::new();
        for row in rows {
            let (label, count) = row?;
            let category = Category::parse(label.as_deref().unwrap_or_default());
            *counts.entry(category).or_default() += count;
        }

        Ok(Category::ALL
            .into_iter()
            .filter_map(|category| {
                counts
                    .get(&category)
                    .copied()
                    .filter(|count| *count > 0)
                    .map(|count| (category, count))
            })
            .collect())
    }
}

fn event_from_row(row: &Row<'_>) -> rusqlite::Result<Event> {
    let text = |column: &str| -> rusqlite::Result<String> {
        Ok(row.get::<_, Option<String>>(column)?.unwrap_or_default())
    };

    let category = text("category")?;
    Ok(Event {
        id: Some(row.get("id")?),
        name: text("name")?,
        occurs_at: row.get::<_, Option<NaiveDateTime>>("date_time")?,
        location: text("location")?,
        description: text("description")?,
        source_url: text("source_url")?,
        source_name: text("source_name")?,
        category: Category::parse(&category),
        cost: text("cost")?,
        organizer: text("organizer")?,
        contact_info: text("contact_info")?,
        registration_required: row
            .get::<_, Option<bool>>("registration_required")?
            .unwrap_or(false),
        age_restrictions: text("age_restrictions")?,
        created_at: row
            .get::<_, Option<NaiveDateTime>>("created_at")?
            .unwrap_or_default(),
    })
}
