//! Section extractors for fixture documents.
//!
//! Every extractor works on a [`FixturePage`] (the `#game-details-wrapper`
//! cursor plus an index of its section headings) and returns its own
//! `Result`, so the assembler can swap a failed section for its defaults
//! without touching the others.

pub mod facts;
pub mod history;
pub mod league;
pub mod odds;
pub mod result;
pub mod teams;

use std::collections::HashMap;

use scraper::{ElementRef, Html, Selector};
use thiserror::Error;

use crate::utils::normalize_label;

/// Why one section could not be extracted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SectionError {
    #[error("missing element: {0}")]
    Missing(String),

    #[error("cannot parse {what} from '{value}'")]
    Parse { what: String, value: String },

    #[error("invalid selector '{0}'")]
    Selector(String),
}

impl SectionError {
    pub fn missing(what: impl Into<String>) -> Self {
        Self::Missing(what.into())
    }

    pub fn parse(what: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Parse {
            what: what.into(),
            value: value.into(),
        }
    }
}

pub type SectionResult<T> = std::result::Result<T, SectionError>;

/// Home and away team display names, as printed on the fixture page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Teams {
    pub home: String,
    pub away: String,
}

/// Navigation cursor into one fixture document.
pub struct FixturePage<'a> {
    pub wrapper: ElementRef<'a>,
    pub headings: Headings<'a>,
}

impl<'a> FixturePage<'a> {
    /// Locate the details wrapper and index its section headings.
    pub fn locate(document: &'a Html) -> SectionResult<Self> {
        let root = document.root_element();
        let wrapper = find(root, "div#game-details-wrapper")?;
        Ok(Self {
            wrapper,
            headings: Headings::build(wrapper),
        })
    }

    /// Table of the given class that follows the heading containing `needle`.
    pub fn table_after(&self, needle: &str, class: &str) -> SectionResult<ElementRef<'a>> {
        let heading = self
            .headings
            .containing(needle)
            .ok_or_else(|| SectionError::missing(format!("heading '{needle}'")))?;
        next_sibling(heading, "table", Some(class))
            .ok_or_else(|| SectionError::missing(format!("table.{class} after '{needle}'")))
    }
}

/// Section headings (`h2.games-title`) keyed by normalized text, built once
/// per document.
pub struct Headings<'a> {
    entries: Vec<(String, ElementRef<'a>)>,
}

impl<'a> Headings<'a> {
    pub fn build(scope: ElementRef<'a>) -> Self {
        let entries = find_all(scope, "h2.games-title")
            .unwrap_or_default()
            .into_iter()
            .map(|h| (normalize_label(&text(h)), h))
            .collect();
        Self { entries }
    }

    /// First heading whose text contains `needle`, case-insensitively.
    pub fn containing(&self, needle: &str) -> Option<ElementRef<'a>> {
        let needle = normalize_label(needle);
        self.entries
            .iter()
            .find(|(label, _)| label.contains(&needle))
            .map(|(_, h)| *h)
    }
}

/// Exact case-insensitive label lookup; the first occurrence of a label wins.
#[derive(Debug, Clone)]
pub struct LabelIndex<T> {
    map: HashMap<String, T>,
}

impl<T> LabelIndex<T> {
    pub fn get(&self, label: &str) -> Option<&T> {
        self.map.get(&normalize_label(label))
    }
}

impl<T> FromIterator<(String, T)> for LabelIndex<T> {
    fn from_iter<I: IntoIterator<Item = (String, T)>>(iter: I) -> Self {
        let mut map = HashMap::new();
        for (label, value) in iter {
            map.entry(normalize_label(&label)).or_insert(value);
        }
        Self { map }
    }
}

// --- DOM helpers ---

pub fn selector(css: &str) -> SectionResult<Selector> {
    Selector::parse(css).map_err(|_| SectionError::Selector(css.to_string()))
}

/// First descendant matching `css`.
pub fn find<'a>(scope: ElementRef<'a>, css: &str) -> SectionResult<ElementRef<'a>> {
    let sel = selector(css)?;
    scope
        .select(&sel)
        .next()
        .ok_or_else(|| SectionError::missing(css))
}

/// All descendants matching `css`, in document order.
pub fn find_all<'a>(scope: ElementRef<'a>, css: &str) -> SectionResult<Vec<ElementRef<'a>>> {
    let sel = selector(css)?;
    Ok(scope.select(&sel).collect())
}

/// All text under `el`, trimmed.
pub fn text(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

/// Trimmed, non-empty text nodes under `el`.
pub fn text_parts(el: ElementRef<'_>) -> Vec<String> {
    el.text()
        .map(|t| t.trim_matches(|c: char| c.is_whitespace() || c == '\u{a0}'))
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn has_class(el: ElementRef<'_>, class: &str) -> bool {
    el.value().classes().any(|c| c == class)
}

/// First following sibling element with the given tag (and class, if any).
pub fn next_sibling<'a>(el: ElementRef<'a>, tag: &str, class: Option<&str>) -> Option<ElementRef<'a>> {
    el.next_siblings()
        .filter_map(ElementRef::wrap)
        .find(|sib| sib.value().name() == tag && class.is_none_or(|c| has_class(*sib, c)))
}

/// The element directly after `el`, skipping text nodes.
pub fn next_element<'a>(el: ElementRef<'a>) -> Option<ElementRef<'a>> {
    el.next_siblings().find_map(ElementRef::wrap)
}

/// Parse only the digits of `raw` (`"12."` -> 12, `"(3)"` -> 3).
pub fn parse_digits(what: &str, raw: &str) -> SectionResult<u32> {
    crate::utils::parse_digits(raw).ok_or_else(|| SectionError::parse(what, raw))
}

/// Parse a `"G-G"` score into a goals pair, ignoring decorations like `*`.
pub fn parse_score(raw: &str) -> SectionResult<(u32, u32)> {
    let mut parts = raw.split('-');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(a), Some(b), None) => Ok((parse_digits("goals", a)?, parse_digits("goals", b)?)),
        _ => Err(SectionError::parse("score", raw)),
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Fixture document builders shared by the extractor tests.

    /// Wrap section markup in a minimal fixture page.
    pub fn page(body: &str) -> String {
        format!(
            r#"<html><body><div id="game-details-wrapper">{body}</div></body></html>"#
        )
    }

    pub const FACTS: &str = r#"
        <h1 class="game-league">Premier League - England</h1>
        <div class="game-time"><span>Saturday, </span><span>12.08.2023</span><span>15:00</span></div>
        <div class="team-flag-left"><h1> Arsenal </h1></div>
        <div class="team-flag-right"><h1>Nottingham Forest</h1></div>
        <div class="game-extended-result">(1-0, 1-1)</div>
    "#;

    pub const LEAGUE_TABLE: &str = r#"
        <h2 class="games-title">Table</h2>
        <table class="standing"><tbody>
            <tr><td class="position">1</td><td class="team">Arsenal</td></tr>
            <tr><td class="position">2</td><td class="team">Chelsea</td></tr>
            <tr><td class="position">3</td><td class="team">Nottingham Forest</td></tr>
            <tr><td class="position">4</td><td class="team">Everton</td></tr>
        </tbody></table>
    "#;

    pub const H2H: &str = r#"
        <h2 class="games-title">H2H last 6 games</h2>
        <table class="games-stat"><tbody>
            <tr><td class="date">2023-02-18</td><td class="hteam">Nottingham Forest</td>
                <td class="result">1-3</td><td class="ateam">Arsenal</td></tr>
            <tr><td class="date">2022-10-30</td><td class="hteam">Arsenal</td>
                <td class="result">5-0</td><td class="ateam">Nottingham Forest</td></tr>
        </tbody></table>
    "#;

    pub const RECENT: &str = r#"
        <h2 class="games-title">Arsenal last 12 games</h2>
        <table class="games-stat"><tbody>
            <tr><td class="date">2023-05-28</td><td class="hteam">Wolves</td>
                <td class="result">0-5</td><td class="ateam">Arsenal</td></tr>
            <tr><td class="date">2023-05-20</td><td class="hteam">Arsenal</td>
                <td class="result">2-1</td><td class="ateam">Chelsea</td></tr>
            <tr><td class="date">2023-05-14</td><td class="hteam">Everton</td>
                <td class="result">0-0</td><td class="ateam">Arsenal</td></tr>
        </tbody></table>
        <h2 class="games-title">Nottingham Forest last 12 games</h2>
        <table class="games-stat"><tbody>
            <tr><td class="date">2023-05-27</td><td class="hteam">Chelsea</td>
                <td class="result">2-2</td><td class="ateam">Nottingham Forest</td></tr>
            <tr><td class="date">2023-04-01</td><td class="hteam">Nottingham Forest</td>
                <td class="result">1-0</td><td class="ateam">Blackpool</td></tr>
        </tbody></table>
    "#;

    pub const TEAM_TABLES: &str = r#"
        <h2 class="games-title">Home/Away Matches</h2>
        <table class="lgames">
            <thead><tr><th>Round</th><th>Arsenal</th><th>Nottingham Forest</th></tr></thead>
            <tbody>
                <tr><td>1</td><td>2-1</td><td>0-2</td></tr>
                <tr><td>2</td><td>3-1</td><td>-</td></tr>
                <tr><td>3</td><td>0-0</td><td>1-1</td></tr>
            </tbody>
        </table>
        <h2 class="games-title">League Position</h2>
        <table class="perf">
            <tr><th>Overall</th></tr>
            <tr><td class="pos">2.</td><td class="pos">16.</td></tr>
            <tr><td class="pos">84</td><td class="pos">38</td></tr>
            <tr><th>Home/Away</th></tr>
            <tr><td class="pos">1.</td><td class="pos">19.</td></tr>
            <tr><td class="pos">45</td><td class="pos">11</td></tr>
        </table>
        <h2 class="games-title">League Form</h2>
        <table class="perf">
            <tr><th>Overall</th></tr>
            <tr><td class="form"><div class="form-inner"><span>26</span><span>6</span><span>6</span></div></td>
                <td class="form"><div class="form-inner"><span>9</span><span>11</span><span>18</span></div></td></tr>
            <tr><th>Home/Away</th></tr>
            <tr><td class="form"><div class="form-inner"><span>14</span><span>3</span><span>2</span></div></td>
                <td class="form"><div class="form-inner"><span>2</span><span>5</span><span>12</span></div></td></tr>
        </table>
        <h2 class="games-title">League Goals</h2>
        <table class="perf">
            <tr><th>Overall</th></tr>
            <tr><td class="form"><div class="form-inner"><span>88</span><span>:</span><span>43</span></div></td>
                <td class="form"><div class="form-inner"><span>38</span><span>:</span><span>68</span></div></td></tr>
            <tr><th>Home/Away</th></tr>
            <tr><td class="form"><div class="form-inner"><span>53</span><span>:</span><span>15</span></div></td>
                <td class="form"><div class="form-inner"><span>11</span><span>:</span><span>38</span></div></td></tr>
        </table>
    "#;

    pub const LEAGUE_STATS: &str = r#"
        <h2 class="games-title">Overall Statistics for Premier League</h2>
        <table class="lperf"><tbody>
            <tr><td colspan="2">Matches played (380)</td></tr>
            <tr><td class="label">Home Win</td><td class="data">48%</td></tr>
            <tr><td class="label">Draw</td><td class="data">22%</td></tr>
            <tr><td class="label">Away Win</td><td class="data">30%</td></tr>
            <tr><td class="label">Goals per Game</td><td class="data">2.85</td></tr>
            <tr><td class="label">Home Goals per Game</td><td class="data">1.63</td></tr>
            <tr><td class="label">Away Goals per Game</td><td class="data">1.22</td></tr>
            <tr><td class="label">Home Team Scored in</td><td class="data">79%</td></tr>
            <tr><td class="label">Away Team Scored in</td><td class="data">68%</td></tr>
            <tr><td class="label">Both Teams to Score</td><td class="data">52%</td></tr>
            <tr><td class="label">Over 1.5</td><td class="data">78%</td></tr>
            <tr><td class="label">Over 2.5</td><td class="data">53%</td></tr>
            <tr><td class="label">Over 3.5</td><td class="data">30%</td></tr>
        </tbody></table>
    "#;

    pub const ODDS: &str = r#"
        <h2 class="games-title">Coefficients and Probabilities</h2>
        <table class="odds">
            <thead><tr><th class="odds-type">Standard 1X2</th></tr></thead>
            <tbody>
                <tr><td class="odd">1.30</td><td class="odd">5.50</td><td class="odd">9.00</td></tr>
                <tr><td class="odd">72%</td><td class="odd">17%</td><td class="odd">11%</td></tr>
            </tbody>
        </table>
        <table class="odds">
            <thead><tr><th class="odds-type">Double Chance</th></tr></thead>
            <tbody>
                <tr><td class="odd">1.05</td><td class="odd">1.14</td><td class="odd">3.40</td></tr>
                <tr><td class="odd">89%</td><td class="odd">83%</td><td class="odd">28%</td></tr>
            </tbody>
        </table>
        <table class="odds">
            <thead><tr><th class="odds-type">Over/Under 2.5</th></tr></thead>
            <tbody>
                <tr><td class="odd">1.62</td><td class="odd">2.30</td></tr>
                <tr><td class="odd">60%</td><td class="odd">40%</td></tr>
            </tbody>
        </table>
        <table class="odds">
            <thead><tr><th class="odds-type">Both Teams to Score</th></tr></thead>
            <tbody>
                <tr><td class="odd">1.90</td><td class="odd">1.85</td></tr>
                <tr><td class="odd">49%</td><td class="odd">51%</td></tr>
            </tbody>
        </table>
    "#;

    /// A page with every section well formed.
    pub fn full_page() -> String {
        page(&[FACTS, H2H, LEAGUE_TABLE, RECENT, TEAM_TABLES, LEAGUE_STATS, ODDS].concat())
    }
}
