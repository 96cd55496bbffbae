// src/models/mod.rs

//! Domain models for the harvester.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod fixture;
mod league;
mod state;

// Re-export all public types
pub use config::{Config, CrawlerConfig, ExtractionConfig, HarvestConfig, PathsConfig};
pub use fixture::{Field, FixtureLocator, FixtureRecord, Partial, Value};
pub use league::{LeagueSource, validate_sources};
pub use state::{Batch, CrawlState, ErrorRecord};
