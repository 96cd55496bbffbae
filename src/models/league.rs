//! League source definitions.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// A league and the season identifiers to harvest for it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LeagueSource {
    pub country: String,
    pub league_name: String,

    /// Listing root; a season listing lives at `{base_url}/{season}`
    #[serde(alias = "url")]
    pub base_url: String,

    #[serde(default)]
    pub seasons: Vec<String>,
}

impl LeagueSource {
    /// Listing document URL for one season.
    pub fn season_url(&self, season: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), season)
    }

    /// Output file stem for one season, e.g. `england_premier-league_2022-2023`.
    pub fn file_stem(&self, season: &str) -> String {
        format!("{}_{}_{}", self.country, self.league_name, season)
    }

    /// Load all league sources from a JSON file.
    pub fn load_all(path: impl AsRef<Path>) -> Result<Vec<LeagueSource>> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            AppError::config(format!("Cannot read leagues file {}: {e}", path.display()))
        })?;
        let sources: Vec<LeagueSource> = serde_json::from_str(&content)?;
        validate_sources(&sources)?;
        Ok(sources)
    }
}

/// Reject source lists the controller cannot make progress on.
pub fn validate_sources(sources: &[LeagueSource]) -> Result<()> {
    if sources.is_empty() {
        return Err(AppError::validation("No league sources defined"));
    }
    for (i, source) in sources.iter().enumerate() {
        if source.base_url.trim().is_empty() {
            return Err(AppError::validation(format!(
                "League #{i} ({}) has an empty base_url",
                source.league_name
            )));
        }
    }
    Ok(())
}
