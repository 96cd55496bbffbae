//! Persisted crawl progress and failure records.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::LeagueSource;

/// Checkpoint written once per batch.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CrawlState {
    pub active: bool,
    pub league_index: usize,
    pub season_index: usize,
}

impl Default for CrawlState {
    fn default() -> Self {
        Self {
            active: true,
            league_index: 0,
            season_index: 0,
        }
    }
}

impl CrawlState {
    /// Check the indices against the configured sources.
    pub fn validate(&self, sources: &[LeagueSource]) -> Result<()> {
        let Some(league) = sources.get(self.league_index) else {
            return Err(AppError::validation(format!(
                "state league_index {} out of range ({} leagues)",
                self.league_index,
                sources.len()
            )));
        };
        if self.season_index > league.seasons.len() {
            return Err(AppError::validation(format!(
                "state season_index {} out of range ({} seasons in {})",
                self.season_index,
                league.seasons.len(),
                league.league_name
            )));
        }
        Ok(())
    }

    /// Plan the next batch, or `None` once crawling is exhausted.
    pub fn next_batch(&self, sources: &[LeagueSource], batch_size: usize) -> Option<Batch> {
        if !self.active {
            return None;
        }
        let league = sources.get(self.league_index)?;
        let total = league.seasons.len();
        let start = self.season_index.min(total);
        let end = start.saturating_add(batch_size).min(total);

        Some(Batch {
            league_index: self.league_index,
            seasons: start..end,
            is_last_season: end == total,
            is_last_league: self.league_index + 1 == sources.len(),
        })
    }
}

/// A contiguous run of seasons within one league.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    pub league_index: usize,
    pub seasons: Range<usize>,
    pub is_last_season: bool,
    pub is_last_league: bool,
}

impl Batch {
    /// State to persist once every season in the batch has been attempted.
    pub fn next_state(&self) -> CrawlState {
        if self.is_last_league && self.is_last_season {
            CrawlState {
                active: false,
                league_index: self.league_index,
                season_index: self.seasons.end,
            }
        } else if self.is_last_season {
            CrawlState {
                active: true,
                league_index: self.league_index + 1,
                season_index: 0,
            }
        } else {
            CrawlState {
                active: true,
                league_index: self.league_index,
                season_index: self.seasons.end,
            }
        }
    }
}

/// A season-level failure, kept so the season can be replayed later.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorRecord {
    pub url: String,
    pub error: String,
    pub league_index: usize,
    pub season_index: usize,
}
