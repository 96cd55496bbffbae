// src/pipeline/harvest.rs

//! Batch controller: checkpointed, resumable harvesting of league seasons.

use crate::error::{AppError, Result};
use crate::models::{Batch, Config, CrawlState, ErrorRecord, LeagueSource};
use crate::pipeline::season::scrape_season;
use crate::services::fetcher::Fetch;
use crate::storage::{RecordSink, StateStore};

/// Result of one controller step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// A batch was attempted and the checkpoint moved to `next`.
    Advanced {
        batch: Batch,
        succeeded: usize,
        failed: usize,
        next: CrawlState,
    },
    /// Every league and season has been attempted.
    Exhausted,
}

/// Totals for a multi-step run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub steps: usize,
    pub seasons_succeeded: usize,
    pub seasons_failed: usize,
    pub exhausted: bool,
}

/// Totals for a replay of recorded failures.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    pub recovered: usize,
    pub failed: usize,
    pub skipped: usize,
}

/// Drives the harvest over the configured league sources.
pub struct Harvester<'a> {
    config: &'a Config,
    sources: &'a [LeagueSource],
    fetcher: &'a dyn Fetch,
    store: &'a dyn StateStore,
    sink: &'a dyn RecordSink,
}

impl<'a> Harvester<'a> {
    pub fn new(
        config: &'a Config,
        sources: &'a [LeagueSource],
        fetcher: &'a dyn Fetch,
        store: &'a dyn StateStore,
        sink: &'a dyn RecordSink,
    ) -> Self {
        Self {
            config,
            sources,
            fetcher,
            store,
            sink,
        }
    }

    /// Current checkpoint, validated against the sources.
    pub async fn current_state(&self) -> Result<CrawlState> {
        let state = self.store.load_state().await?.unwrap_or_default();
        state.validate(self.sources)?;
        Ok(state)
    }

    /// Attempt the next batch of seasons and persist the new checkpoint.
    ///
    /// Season failures are logged and recorded; they never stop the batch.
    pub async fn step(&self) -> Result<StepOutcome> {
        let state = self.current_state().await?;
        let Some(batch) = state.next_batch(self.sources, self.config.harvest.batch_size) else {
            log::info!("Harvest exhausted, nothing to do");
            return Ok(StepOutcome::Exhausted);
        };

        let source = &self.sources[batch.league_index];
        log::info!(
            "Batch: {} seasons {:?} of {}",
            source.league_name,
            batch.seasons,
            source.seasons.len()
        );

        let mut succeeded = 0;
        let mut failed = 0;
        for season_index in batch.seasons.clone() {
            match self.harvest_season(batch.league_index, season_index).await {
                Ok(()) => succeeded += 1,
                Err(record) => {
                    failed += 1;
                    if let Err(e) = self.store.append_error(&record).await {
                        log::error!("Unable to record failure for {}: {}", record.url, e);
                    }
                }
            }
        }

        let next = batch.next_state();
        self.store.save_state(&next).await?;
        log::info!(
            "Checkpoint: league {} season {} (active: {})",
            next.league_index,
            next.season_index,
            next.active
        );

        Ok(StepOutcome::Advanced {
            batch,
            succeeded,
            failed,
            next,
        })
    }

    /// Step until exhausted or `max_steps` batches have run.
    pub async fn run_until_exhausted(&self, max_steps: Option<usize>) -> Result<RunSummary> {
        let mut summary = RunSummary::default();
        while max_steps.is_none_or(|max| summary.steps < max) {
            match self.step().await? {
                StepOutcome::Exhausted => {
                    summary.exhausted = true;
                    break;
                }
                StepOutcome::Advanced {
                    succeeded, failed, ..
                } => {
                    summary.steps += 1;
                    summary.seasons_succeeded += succeeded;
                    summary.seasons_failed += failed;
                }
            }
        }
        Ok(summary)
    }

    /// Re-run the seasons named by recorded failures. The checkpoint and the
    /// error log are left untouched.
    pub async fn replay(&self, errors: &[ErrorRecord]) -> Result<ReplaySummary> {
        let mut summary = ReplaySummary::default();
        for record in errors {
            let in_range = self
                .sources
                .get(record.league_index)
                .is_some_and(|s| record.season_index < s.seasons.len());
            if !in_range {
                log::warn!(
                    "Skipping replay of {}: league {} season {} not configured",
                    record.url,
                    record.league_index,
                    record.season_index
                );
                summary.skipped += 1;
                continue;
            }

            match self
                .harvest_season(record.league_index, record.season_index)
                .await
            {
                Ok(()) => summary.recovered += 1,
                Err(_) => summary.failed += 1,
            }
        }
        Ok(summary)
    }

    /// Scrape and sink one season. Any failure comes back as the record to log.
    async fn harvest_season(
        &self,
        league_index: usize,
        season_index: usize,
    ) -> std::result::Result<(), ErrorRecord> {
        let source = &self.sources[league_index];
        let season = &source.seasons[season_index];

        self.scrape_and_sink(source, season).await.map_err(|e| {
            let error = AppError::crawl(format!("{} {}", source.league_name, season), e);
            log::error!("{}", error);
            ErrorRecord {
                url: source.season_url(season),
                error: error.to_string(),
                league_index,
                season_index,
            }
        })
    }

    async fn scrape_and_sink(&self, source: &LeagueSource, season: &str) -> Result<()> {
        let outcome = scrape_season(self.fetcher, self.config, source, season).await?;
        self.sink.write_season(source, season, &outcome.records).await?;
        Ok(())
    }
}
