//! Service layer for the harvester.
//!
//! This module contains the business logic for:
//! - Document fetching with retry classification (`fetcher`)
//! - Fixture discovery on season listings (`discover`)
//! - Per-section extraction from fixture documents (`extract`)
//! - Record assembly with section isolation (`assemble`)
//! - The Poisson goal model (`model`)

mod assemble;
mod discover;
pub mod extract;
pub mod fetcher;
pub mod model;

pub use assemble::{Section, assemble};
pub use discover::discover;
pub use fetcher::{Fetch, FetchError, HttpFetcher, RetryPolicy};
