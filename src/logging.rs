//! Diagnostics go to a file; the terminal belongs to the UI.

use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

pub fn default_log_path() -> PathBuf {
    std::env::temp_dir().join("citytable.log")
}

/// Install a global subscriber appending to `path`, filtered by `RUST_LOG`
/// (default `info`).
pub fn init(path: &Path) -> io::Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| io::Error::other(format!("logging setup failed: {e}")))
}
