//! Pipeline entry points for harvester operations.
//!
//! - `Harvester::step`: attempt the next batch of seasons and checkpoint
//! - `scrape_season`: listing -> fixtures -> records for one season

pub mod harvest;
pub mod season;

pub use harvest::{Harvester, ReplaySummary, RunSummary, StepOutcome};
pub use season::{SeasonOutcome, scrape_season};
