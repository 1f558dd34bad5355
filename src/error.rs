use thiserror::Error;

/// Failures surfaced by the persistence store. A duplicate `source_url` is
/// not one of them: it takes the update path of the upsert.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid event: {0}")]
    InvalidEvent(String),
    #[error("timestamp parse error: {0}")]
    Timestamp(String),
    #[error("unsupported schema version {found}, max supported {supported}")]
    UnsupportedSchemaVersion { found: i64, supported: i64 },
    #[error("store lock poisoned")]
    Poisoned,
}

/// Raised inside a collection pass. The freshness gate logs and swallows
/// these; manual refreshes report them in the log only.
#[derive(Debug, Error)]
pub enum CollectionError {
    #[error("storage failure during collection: {0}")]
    Storage(#[from] StoreError),
    #[error("unknown source id: {0}")]
    UnknownSource(String),
    #[error("source {source_id} failed: {message}")]
    SourceFailed { source_id: String, message: String },
    #[error("all sources failed: {0}")]
    AllSourcesFailed(String),
}
