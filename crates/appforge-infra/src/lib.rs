//! Infrastructure implementations for Appforge.
//!
//! SQLite persistence (sqlx, split reader/writer pools), the OpenRouter
//! completion client, and payment-webhook signature verification.

pub mod billing;
pub mod openrouter;
pub mod sqlite;

use std::path::PathBuf;

/// Resolve the data directory from `APPFORGE_DATA_DIR`, falling back to
/// `~/.appforge`.
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("APPFORGE_DATA_DIR") {
        return PathBuf::from(dir);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".appforge")
}
