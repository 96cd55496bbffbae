//! League-wide aggregates from the "Overall Statistics" table.

use super::{FixturePage, LabelIndex, SectionResult, find, find_all, parse_digits, text};
use crate::models::{Field, Partial, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Int,
    Float,
}

/// Row label, target column and coercion for each looked-up statistic.
const STATS: &[(&str, Field, Kind)] = &[
    ("Home Win", Field::LeagueHomeWin, Kind::Int),
    ("Draw", Field::LeagueDraws, Kind::Int),
    ("Away Win", Field::LeagueAwayWin, Kind::Int),
    ("Goals per Game", Field::LeagueAvgGoals, Kind::Float),
    ("Home Goals per Game", Field::LeagueHomeGsr, Kind::Float),
    ("Away Goals per Game", Field::LeagueAwayGsr, Kind::Float),
    ("Home Team Scored in", Field::LeagueHomeScoredIn, Kind::Int),
    ("Away Team Scored in", Field::LeagueAwayScoredIn, Kind::Int),
    ("Both Teams to Score", Field::LeagueBothScored, Kind::Int),
    ("Over 1.5", Field::LeagueOver15, Kind::Int),
    ("Over 2.5", Field::LeagueOver25, Kind::Int),
    ("Over 3.5", Field::LeagueOver35, Kind::Int),
];

pub fn extract(page: &FixturePage<'_>) -> SectionResult<Partial> {
    let table = page.table_after("Overall Statistics for", "lperf")?;
    let rows = find_all(table, "tbody tr")?;

    // "Matches played (380)"
    let first = rows
        .first()
        .map(|row| text(*row))
        .unwrap_or_default();
    let played = first.rsplit('(').next().unwrap_or(&first);
    let mut partial: Partial = vec![(
        Field::LeagueMatchesPlayed,
        Some(parse_digits("league matches played", played)?.into()),
    )];

    let index: LabelIndex<String> = rows
        .iter()
        .filter_map(|row| {
            let label = text(find(*row, ".label").ok()?);
            let data = text(find(*row, ".data").ok()?);
            Some((label, data))
        })
        .collect();

    for (label, field, kind) in STATS {
        let value = index.get(label).and_then(|raw| coerce(raw, *kind));
        if value.is_none() {
            log::debug!("League statistic '{}' not found", label);
        }
        partial.push((*field, value));
    }
    Ok(partial)
}

/// `"48%"` -> 48, `"2.85"` -> 2.85.
fn coerce(raw: &str, kind: Kind) -> Option<Value> {
    let raw = raw.trim().trim_end_matches('%').trim();
    match kind {
        Kind::Int => raw.parse::<i64>().ok().map(Value::Int),
        Kind::Float => raw.parse::<f64>().ok().map(Value::Float),
    }
}
