//! Persistence for crawl progress, failures and season output.
//!
//! ## Directory Structure
//!
//! ```text
//! storage/
//! ├── config.toml            # Harvester configuration
//! ├── leagues.json           # League sources (input)
//! ├── state.json             # Checkpoint, rewritten once per batch
//! ├── errors.json            # Season failures, append-only
//! └── historical/
//!     └── {country}/
//!         └── {country}_{league}_{season}.csv
//! ```

pub mod csv;
pub mod local;

use std::path::PathBuf;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{CrawlState, ErrorRecord, FixtureRecord, LeagueSource};

// Re-export for convenience
pub use local::LocalStorage;

/// Durable crawl progress and the season error log.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Load the checkpoint; `None` on a first run.
    async fn load_state(&self) -> Result<Option<CrawlState>>;

    /// Replace the checkpoint.
    async fn save_state(&self, state: &CrawlState) -> Result<()>;

    /// Append one failure; existing records are kept.
    async fn append_error(&self, record: &ErrorRecord) -> Result<()>;

    async fn load_errors(&self) -> Result<Vec<ErrorRecord>>;
}

/// Destination for one season's assembled records.
#[async_trait]
pub trait RecordSink: Send + Sync {
    /// Write (or overwrite) the season's output. Returns where it went, or
    /// `None` when there was nothing to write.
    async fn write_season(
        &self,
        source: &LeagueSource,
        season: &str,
        records: &[FixtureRecord],
    ) -> Result<Option<PathBuf>>;
}
