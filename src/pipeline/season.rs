// src/pipeline/season.rs

//! One season: listing, fixture discovery, fixture documents, records.

use std::time::Duration;

use url::Url;

use crate::error::Result;
use crate::models::{Config, FixtureRecord, LeagueSource};
use crate::services::fetcher::Fetch;
use crate::services::{assemble, discover};
use crate::utils::resolve_url;

/// Records harvested for one season.
#[derive(Debug, Default)]
pub struct SeasonOutcome {
    pub records: Vec<FixtureRecord>,
    pub discovered: usize,
    pub skipped: usize,
}

/// Fetch and assemble every fixture of one season.
///
/// Failing to fetch or parse the listing fails the season. A fixture document
/// that cannot be fetched is skipped with a warning.
pub async fn scrape_season(
    fetcher: &dyn Fetch,
    config: &Config,
    source: &LeagueSource,
    season: &str,
) -> Result<SeasonOutcome> {
    let listing_url = source.season_url(season);
    log::info!("Harvesting {} {} ({})", source.league_name, season, listing_url);

    let listing = fetcher.fetch(&listing_url).await?;
    let locators = discover(&listing)?;
    let base = Url::parse(&config.harvest.fixture_base_url)?;
    let delay = Duration::from_millis(config.crawler.request_delay_ms);

    let mut outcome = SeasonOutcome {
        discovered: locators.len(),
        ..SeasonOutcome::default()
    };

    for locator in &locators {
        let url = resolve_url(&base, &locator.url_fragment);
        match fetcher.fetch(&url).await {
            Ok(body) => outcome
                .records
                .push(assemble(&body, locator, &config.extraction)),
            Err(e) => {
                outcome.skipped += 1;
                log::warn!("Unable to reach {}, skipping: {}", url, e);
            }
        }

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    log::info!(
        "{} {}: {} of {} fixtures assembled, {} skipped",
        source.league_name,
        season,
        outcome.records.len(),
        outcome.discovered,
        outcome.skipped
    );
    Ok(outcome)
}
