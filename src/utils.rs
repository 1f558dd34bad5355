//! Per-user file locations.

use std::io;
use std::path::{Path, PathBuf};

use dirs::data_dir;
use once_cell::sync::Lazy;

const APP_DIR: &str = "community-events";
const DATABASE_FILE: &str = "events.sqlite";
const CONFIG_FILE: &str = "config.json";

static DATA_ROOT: Lazy<PathBuf> = Lazy::new(|| resolve_data_root(data_dir()));

/// Platform data directory, else the working directory, plus the app folder.
fn resolve_data_root(platform_dir: Option<PathBuf>) -> PathBuf {
    platform_dir
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

pub fn data_root() -> PathBuf {
    DATA_ROOT.clone()
}

pub fn database_path() -> PathBuf {
    data_root().join(DATABASE_FILE)
}

pub fn config_path() -> PathBuf {
    data_root().join(CONFIG_FILE)
}

/// Creates the directory that will hold `path`. Bare file names need nothing.
pub fn ensure_parent(path: &Path) -> io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent),
        _ => Ok(()),
    }
}
