//! Team aggregate statistics: standings, form, goal rates and score counts.
//!
//! Fields follow a `{side}_{stat}_{context}` layout: side `h`/`a`, context
//! `0` for overall, `1` for the home team's home games and `2` for the away
//! team's away games.

use scraper::ElementRef;

use super::{
    FixturePage, SectionError, SectionResult, Teams, find, find_all, parse_digits, parse_score,
    text, text_parts,
};
use crate::models::{Field, Partial, Value};
use crate::utils::normalize_label;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Home,
    Away,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Context {
    Overall,
    /// Home games for the home side, away games for the away side
    Split,
}

/// `value / matches` rounded to two decimals; zero when nothing was played.
pub fn rate(value: f64, matches: u32) -> f64 {
    if matches < 1 {
        return 0.0;
    }
    round2(value / f64::from(matches))
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Threshold counts over a list of `(goals_for, goals_against)` pairs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoreCounts {
    pub over_15: u32,
    pub over_25: u32,
    pub over_35: u32,
    pub both_scored: u32,
    pub clean_sheets: u32,
    pub failed_to_score: u32,
}

impl ScoreCounts {
    pub fn from_scores(scores: &[(u32, u32)]) -> Self {
        let mut counts = Self::default();
        for &(gf, ga) in scores {
            let total = gf.saturating_add(ga);
            counts.over_15 += u32::from(total > 1);
            counts.over_25 += u32::from(total > 2);
            counts.over_35 += u32::from(total > 3);
            counts.both_scored += u32::from(gf > 0 && ga > 0);
            counts.clean_sheets += u32::from(ga == 0);
            counts.failed_to_score += u32::from(gf == 0);
        }
        counts
    }

    /// Columns for one side and context, in the order of the count fields.
    pub fn fields(side: Side, context: Context) -> [Field; 6] {
        use Field::*;
        match (side, context) {
            (Side::Home, Context::Overall) => [
                HomeO15Overall, HomeO25Overall, HomeO35Overall,
                HomeGgOverall, HomeCsOverall, HomeFtsOverall,
            ],
            (Side::Home, Context::Split) => [
                HomeO15Home, HomeO25Home, HomeO35Home,
                HomeGgHome, HomeCsHome, HomeFtsHome,
            ],
            (Side::Away, Context::Overall) => [
                AwayO15Overall, AwayO25Overall, AwayO35Overall,
                AwayGgOverall, AwayCsOverall, AwayFtsOverall,
            ],
            (Side::Away, Context::Split) => [
                AwayO15Away, AwayO25Away, AwayO35Away,
                AwayGgAway, AwayCsAway, AwayFtsAway,
            ],
        }
    }

    pub fn into_partial(self, side: Side, context: Context) -> Partial {
        let values = [
            self.over_15,
            self.over_25,
            self.over_35,
            self.both_scored,
            self.clean_sheets,
            self.failed_to_score,
        ];
        Self::fields(side, context)
            .into_iter()
            .zip(values)
            .map(|(field, v)| (field, Some(Value::from(v))))
            .collect()
    }
}

/// Zeroed split-context counts, used when the scored-results table is unusable.
pub fn split_count_defaults() -> Partial {
    let mut partial = ScoreCounts::default().into_partial(Side::Home, Context::Split);
    partial.extend(ScoreCounts::default().into_partial(Side::Away, Context::Split));
    partial
}

pub fn extract(page: &FixturePage<'_>, teams: &Teams) -> SectionResult<Partial> {
    let mut partial = match scored_results(page, teams) {
        Ok(partial) => partial,
        Err(e) => {
            log::warn!("Home/away results unavailable, zeroing split counts: {}", e);
            split_count_defaults()
        }
    };
    partial.extend(performance(page)?);
    Ok(partial)
}

/// Split-context counts from the `Home/Away Matches` table, one column per team.
fn scored_results(page: &FixturePage<'_>, teams: &Teams) -> SectionResult<Partial> {
    let table = page.table_after("Home/Away Matches", "lgames")?;
    let headers: Vec<String> = find_all(table, "thead th")?
        .into_iter()
        .map(|th| normalize_label(&text(th)))
        .collect();

    let column = |team: &str| {
        let team = normalize_label(team);
        headers
            .iter()
            .position(|h| *h == team)
            .ok_or_else(|| SectionError::missing(format!("results column for {team}")))
    };
    let home_col = column(&teams.home)?;
    let away_col = column(&teams.away)?;

    let mut home_scores = Vec::new();
    let mut away_scores = Vec::new();
    for row in find_all(table, "tbody tr")? {
        let cells: Vec<String> = row.children().filter_map(ElementRef::wrap).map(text).collect();
        for (col, scores) in [(home_col, &mut home_scores), (away_col, &mut away_scores)] {
            match cells.get(col).map(String::as_str) {
                None | Some("") | Some("-") => {}
                Some(raw) => scores.push(parse_score(raw)?),
            }
        }
    }

    let mut partial = ScoreCounts::from_scores(&home_scores).into_partial(Side::Home, Context::Split);
    partial.extend(ScoreCounts::from_scores(&away_scores).into_partial(Side::Away, Context::Split));
    Ok(partial)
}

/// One team's numbers for one context.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Performance {
    position: u32,
    points: u32,
    played: u32,
    scored: u32,
    conceded: u32,
}

impl Performance {
    /// `fields`: matches played, position, points, scored rate, conceded
    /// rate, points per game.
    fn into_partial(self, fields: [Field; 6]) -> Partial {
        let [mp, pos, pts, gsr, gcr, ppg] = fields;
        vec![
            (mp, Some(self.played.into())),
            (pos, Some(self.position.into())),
            (pts, Some(self.points.into())),
            (gsr, Some(rate(f64::from(self.scored), self.played).into())),
            (gcr, Some(rate(f64::from(self.conceded), self.played).into())),
            (ppg, Some(rate(f64::from(self.points), self.played).into())),
        ]
    }
}

/// Standings, form and goals tables. Rows 1 and 2 (positions) or row 1
/// (form, goals) hold the overall numbers; the home/away rows follow.
fn performance(page: &FixturePage<'_>) -> SectionResult<Partial> {
    let positions = perf_rows(page, "League Position")?;
    let form = perf_rows(page, "League Form")?;
    let goals = perf_rows(page, "League Goals")?;

    let (pos_h0, pos_a0) = first_last(&pos_cells(row(&positions, 1)?)?, "overall position")?;
    let (pts_h0, pts_a0) = first_last(&pos_cells(row(&positions, 2)?)?, "overall points")?;
    let (pos_h1, pos_a2) = first_last(&pos_cells(row(&positions, 4)?)?, "home/away position")?;
    let (pts_h1, pts_a2) = first_last(&pos_cells(row(&positions, 5)?)?, "home/away points")?;

    let (form_h0, form_a0) = form_cells(row(&form, 1)?)?;
    let (form_h1, form_a2) = form_cells(row(&form, 3)?)?;
    let (goals_h0, goals_a0) = form_cells(row(&goals, 1)?)?;
    let (goals_h1, goals_a2) = form_cells(row(&goals, 3)?)?;

    let build = |position, points, form: Vec<u32>, goals: Vec<u32>| -> SectionResult<Performance> {
        let (scored, conceded) = first_last(&goals, "goals")?;
        Ok(Performance {
            position,
            points,
            played: form
                .iter()
                .try_fold(0u32, |acc, n| acc.checked_add(*n))
                .ok_or_else(|| SectionError::parse("matches played", format!("{form:?}")))?,
            scored,
            conceded,
        })
    };

    use Field::*;
    let mut partial = build(pos_h0, pts_h0, form_h0, goals_h0)?.into_partial([
        HomeMpOverall, HomePosOverall, HomePtsOverall, HomeGsrOverall, HomeGcrOverall,
        HomePpgOverall,
    ]);
    partial.extend(build(pos_h1, pts_h1, form_h1, goals_h1)?.into_partial([
        HomeMpHome, HomePosHome, HomePtsHome, HomeGsrHome, HomeGcrHome, HomePpgHome,
    ]));
    partial.extend(build(pos_a0, pts_a0, form_a0, goals_a0)?.into_partial([
        AwayMpOverall, AwayPosOverall, AwayPtsOverall, AwayGsrOverall, AwayGcrOverall,
        AwayPpgOverall,
    ]));
    partial.extend(build(pos_a2, pts_a2, form_a2, goals_a2)?.into_partial([
        AwayMpAway, AwayPosAway, AwayPtsAway, AwayGsrAway, AwayGcrAway, AwayPpgAway,
    ]));
    Ok(partial)
}

fn perf_rows<'a>(page: &FixturePage<'a>, heading: &str) -> SectionResult<Vec<ElementRef<'a>>> {
    find_all(page.table_after(heading, "perf")?, "tr")
}

fn row<'a>(rows: &[ElementRef<'a>], index: usize) -> SectionResult<ElementRef<'a>> {
    rows.get(index)
        .copied()
        .ok_or_else(|| SectionError::missing(format!("table row {index}")))
}

fn first_last(values: &[u32], what: &str) -> SectionResult<(u32, u32)> {
    match (values.first(), values.last()) {
        (Some(first), Some(last)) => Ok((*first, *last)),
        _ => Err(SectionError::missing(what)),
    }
}

/// Digits of every `.pos` cell in a row.
fn pos_cells(row: ElementRef<'_>) -> SectionResult<Vec<u32>> {
    find_all(row, ".pos")?
        .into_iter()
        .map(|cell| parse_digits("standing value", &text(cell)))
        .collect()
}

/// Numbers of the first (home) and last (away) `.form` cell in a row.
fn form_cells(row: ElementRef<'_>) -> SectionResult<(Vec<u32>, Vec<u32>)> {
    let cells = find_all(row, ".form")?;
    let (Some(home), Some(away)) = (cells.first(), cells.last()) else {
        return Err(SectionError::missing(".form cells"));
    };
    Ok((form_numbers(*home)?, form_numbers(*away)?))
}

fn form_numbers(cell: ElementRef<'_>) -> SectionResult<Vec<u32>> {
    let inner = find(cell, ".form-inner")?;
    Ok(text_parts(inner)
        .iter()
        .filter_map(|part| crate::utils::parse_digits(part))
        .collect())
}
