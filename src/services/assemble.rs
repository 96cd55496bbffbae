// src/services/assemble.rs

//! Record assembly.
//!
//! Runs every section extractor over one fixture document, swaps a failed
//! section for its default values and adds the derived fields. A record is
//! always produced.

use scraper::Html;

use crate::models::{ExtractionConfig, Field, FixtureLocator, FixtureRecord, Partial};
use crate::services::extract::history::{self, HistoryEntry};
use crate::services::extract::teams::{self, Context, ScoreCounts, Side};
use crate::services::extract::{
    FixturePage, SectionError, SectionResult, facts, league, odds, result,
};
use crate::services::model;

/// Named statistical concern within a fixture document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Facts,
    Result,
    HeadToHead,
    RecentForm,
    Teams,
    League,
    Odds,
}

impl Section {
    pub const ALL: [Section; 7] = [
        Section::Facts,
        Section::Result,
        Section::HeadToHead,
        Section::RecentForm,
        Section::Teams,
        Section::League,
        Section::Odds,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Section::Facts => "facts",
            Section::Result => "result",
            Section::HeadToHead => "head-to-head",
            Section::RecentForm => "recent form",
            Section::Teams => "team stats",
            Section::League => "league stats",
            Section::Odds => "odds",
        }
    }

    /// Values written when the section fails. Fields not listed stay absent.
    pub fn defaults(self) -> Partial {
        match self {
            Section::HeadToHead => vec![(Field::HeadToHead, Some("[]".into()))],
            Section::RecentForm => vec![
                (Field::RecentHome, Some("[]".into())),
                (Field::RecentAway, Some("[]".into())),
            ],
            Section::Teams => teams::split_count_defaults(),
            Section::Facts | Section::Result | Section::League | Section::Odds => Partial::new(),
        }
    }
}

/// Build the record for one fixture document.
pub fn assemble(body: &str, locator: &FixtureLocator, config: &ExtractionConfig) -> FixtureRecord {
    let document = Html::parse_document(body);
    let mut record = FixtureRecord::new();

    match FixturePage::locate(&document) {
        Ok(page) => extract_sections(&page, config, &mut record),
        Err(e) => {
            log::warn!(
                "No details wrapper in {}, every section takes its defaults: {}",
                locator.url_fragment,
                e
            );
            for section in Section::ALL {
                record.merge(section.defaults());
            }
        }
    }

    record.set(Field::Round, locator.round);
    record
}

fn extract_sections(page: &FixturePage<'_>, config: &ExtractionConfig, record: &mut FixtureRecord) {
    let names = match facts::extract(page) {
        Ok(facts) => {
            let names = facts.teams.clone();
            record.merge(facts.into_partial());
            Some(names)
        }
        Err(e) => {
            apply(record, Section::Facts, Err(e));
            None
        }
    };
    let names = names.as_ref().ok_or_else(|| SectionError::missing("team names"));

    apply(record, Section::Result, result::extract(page).map(|r| r.into_partial()));

    apply(
        record,
        Section::HeadToHead,
        names
            .clone()
            .and_then(|t| history::head_to_head(page, t))
            .and_then(|entries| history::head_to_head_partial(&entries)),
    );

    let recent = names.clone().and_then(|t| history::recent_form(page, t));
    let counts = recent.as_ref().ok().map(overall_counts);
    apply(
        record,
        Section::RecentForm,
        recent.and_then(|(home, away)| history::recent_form_partial(&home, &away)),
    );

    apply(
        record,
        Section::Teams,
        names.clone().and_then(|t| teams::extract(page, t)),
    );
    apply(record, Section::League, league::extract(page));
    apply(record, Section::Odds, odds::extract(page, config));

    if let Some(partial) = counts {
        record.merge(partial);
    }
    let derived = model_fields(record);
    record.merge(derived);
}

/// Merge a section's output, or its defaults on failure.
fn apply(record: &mut FixtureRecord, section: Section, outcome: SectionResult<Partial>) {
    match outcome {
        Ok(partial) => record.merge(partial),
        Err(e) => {
            log::warn!("Unable to parse {} ({}), using defaults", section.name(), e);
            record.merge(section.defaults());
        }
    }
}

/// Overall-context score counts from the league-only recent form.
fn overall_counts((home, away): &(Vec<HistoryEntry>, Vec<HistoryEntry>)) -> Partial {
    let scores = |entries: &[HistoryEntry]| -> Vec<(u32, u32)> {
        entries.iter().map(|e| (e.gf, e.ga)).collect()
    };
    let mut partial = ScoreCounts::from_scores(&scores(home)).into_partial(Side::Home, Context::Overall);
    partial.extend(ScoreCounts::from_scores(&scores(away)).into_partial(Side::Away, Context::Overall));
    partial
}

/// Poisson model fields; empty when any input is absent.
fn model_fields(record: &FixtureRecord) -> Partial {
    let inputs = [
        Field::HomeGsrHome,
        Field::HomeGcrHome,
        Field::AwayGsrAway,
        Field::AwayGcrAway,
        Field::LeagueHomeGsr,
        Field::LeagueAwayGsr,
    ]
    .map(|field| record.number(field));

    match inputs {
        [Some(h_gsr), Some(h_gcr), Some(a_gsr), Some(a_gcr), Some(lg_h), Some(lg_a)] => {
            model::model_partial(h_gsr, h_gcr, a_gsr, a_gcr, lg_h, lg_a)
        }
        _ => Partial::new(),
    }
}
