//! Fixture statistics harvester CLI
//!
//! Local execution entry point. Each `step` attempts one batch of seasons and
//! checkpoints, so the command can be scheduled repeatedly until exhausted.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use harvester::{
    error::{AppError, Result},
    models::{Config, LeagueSource},
    pipeline::{Harvester, StepOutcome},
    services::{HttpFetcher, RetryPolicy},
    storage::{LocalStorage, StateStore, csv::Table},
    utils::http,
};

/// Resumable harvester for historical football fixture statistics
#[derive(Parser, Debug)]
#[command(name = "harvester", version, about = "Historical fixture statistics harvester")]
struct Cli {
    /// Path to storage directory containing config, state and output
    #[arg(short, long, default_value = "storage")]
    storage_dir: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Harvest the next batch of seasons and checkpoint
    Step,

    /// Harvest batches until every league is done
    Run {
        /// Stop after this many batches
        #[arg(long)]
        max_steps: Option<usize>,
    },

    /// Show the current checkpoint
    Status,

    /// List recorded season failures
    Errors,

    /// Re-run the seasons listed in the error log (checkpoint unchanged)
    Replay,

    /// Validate configuration, league sources and checkpoint
    Validate,

    /// Summarize a season output file
    Info {
        /// CSV file to inspect
        file: PathBuf,
    },
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

fn load_sources(config: &Config, storage_dir: &Path) -> Result<Vec<LeagueSource>> {
    let path = config.paths.leagues_path(storage_dir);
    let sources = LeagueSource::load_all(&path)?;
    log::info!(
        "Loaded {} leagues ({} seasons) from {}",
        sources.len(),
        sources.iter().map(|s| s.seasons.len()).sum::<usize>(),
        path.display()
    );
    Ok(sources)
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // Load configuration
    let config_path = cli.storage_dir.join("config.toml");
    let config = Config::load_or_default(&config_path)?;
    config.validate()?;

    let storage = LocalStorage::new(&cli.storage_dir, config.paths.clone());

    match cli.command {
        Command::Step | Command::Run { .. } | Command::Replay => {
            let sources = load_sources(&config, &cli.storage_dir)?;
            let client = http::create_client(&config.crawler)?;
            let fetcher = HttpFetcher::new(client, RetryPolicy::from(&config.crawler));
            let harvester = Harvester::new(&config, &sources, &fetcher, &storage, &storage);

            match cli.command {
                Command::Step => match harvester.step().await? {
                    StepOutcome::Exhausted => log::info!("All leagues harvested."),
                    StepOutcome::Advanced {
                        succeeded,
                        failed,
                        next,
                        ..
                    } => {
                        log::info!("Batch done: {} seasons ok, {} failed", succeeded, failed);
                        if !next.active {
                            log::info!("That was the last batch.");
                        }
                    }
                },
                Command::Run { max_steps } => {
                    let summary = harvester.run_until_exhausted(max_steps).await?;
                    log::info!(
                        "{} batches: {} seasons ok, {} failed{}",
                        summary.steps,
                        summary.seasons_succeeded,
                        summary.seasons_failed,
                        if summary.exhausted { " (exhausted)" } else { "" }
                    );
                }
                _ => {
                    let errors = storage.load_errors().await?;
                    if errors.is_empty() {
                        log::info!("No recorded failures.");
                        return Ok(());
                    }
                    let summary = harvester.replay(&errors).await?;
                    log::info!(
                        "Replay: {} recovered, {} failed, {} skipped",
                        summary.recovered,
                        summary.failed,
                        summary.skipped
                    );
                }
            }
        }

        Command::Status => {
            let sources = load_sources(&config, &cli.storage_dir)?;
            match storage.load_state().await? {
                None => log::info!("No checkpoint yet; the next step starts at the first league."),
                Some(state) => {
                    state.validate(&sources)?;
                    let league = &sources[state.league_index];
                    log::info!(
                        "Active: {} | league {}/{} ({} {}) | season {}/{}",
                        state.active,
                        state.league_index + 1,
                        sources.len(),
                        league.country,
                        league.league_name,
                        state.season_index,
                        league.seasons.len()
                    );
                }
            }
        }

        Command::Errors => {
            let errors = storage.load_errors().await?;
            log::info!("{} recorded failures", errors.len());
            for e in &errors {
                log::info!(
                    "  [league {} season {}] {} - {}",
                    e.league_index,
                    e.season_index,
                    e.url,
                    e.error
                );
            }
        }

        Command::Validate => {
            log::info!("Validating configuration...");
            log::info!("✓ Config OK");

            let sources = load_sources(&config, &cli.storage_dir)?;
            log::info!("✓ League sources OK");

            if let Some(state) = storage.load_state().await? {
                if let Err(e) = state.validate(&sources) {
                    log::error!("Checkpoint validation failed: {}", e);
                    return Err(e);
                }
            }
            log::info!("✓ Checkpoint OK");

            log::info!("All validations passed!");
        }

        Command::Info { file } => {
            let content = std::fs::read_to_string(&file)?;
            let table = Table::parse(&content);
            if !table.has_record_header() {
                return Err(AppError::validation(format!(
                    "{} does not have the fixture record header",
                    file.display()
                )));
            }
            log::info!("{}: {} fixtures", file.display(), table.rows.len());

            let empty_columns = table
                .header
                .iter()
                .filter(|name| (0..table.rows.len()).all(|i| table.cell(i, name).is_none()))
                .count();
            log::info!(
                "{} of {} columns populated in at least one fixture",
                table.header.len() - empty_columns,
                table.header.len()
            );
        }
    }

    Ok(())
}
