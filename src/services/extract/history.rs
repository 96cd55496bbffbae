//! Match history: head-to-head meetings and each team's recent league form.

use chrono::NaiveDate;
use scraper::ElementRef;
use serde::Serialize;

use super::{
    FixturePage, LabelIndex, SectionError, SectionResult, Teams, find, find_all, has_class,
    next_element, next_sibling, parse_digits, parse_score, text,
};
use crate::models::{Field, Partial};
use crate::utils::normalize_label;

/// Whether the subject team played at home (`hh`) or away (`ha`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Venue {
    #[serde(rename = "hh")]
    HomeHome,
    #[serde(rename = "ha")]
    HomeAway,
}

/// One past match from the subject team's point of view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    pub date: NaiveDate,
    pub gf: u32,
    pub ga: u32,
    pub venue: Venue,
    #[serde(flatten)]
    pub standing: Option<Standing>,
}

/// League placement of both sides, attached to recent-form entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Standing {
    pub home_team: String,
    pub away_team: String,
    pub home_pos: Option<u32>,
    pub away_pos: Option<u32>,
}

/// A parsed history row, before any league filtering.
#[derive(Debug, Clone)]
struct Row {
    entry: HistoryEntry,
    home: String,
    away: String,
}

impl Row {
    fn opponent(&self) -> &str {
        match self.entry.venue {
            Venue::HomeHome => &self.away,
            Venue::HomeAway => &self.home,
        }
    }
}

/// Current league table: team name (case-insensitive) to position.
pub struct LeagueMembers {
    positions: LabelIndex<u32>,
}

impl LeagueMembers {
    pub fn locate(page: &FixturePage<'_>) -> SectionResult<Self> {
        let table = page.table_after("Table", "standing")?;
        let mut rows = Vec::new();
        for row in find_all(table, "tbody tr")? {
            let name = text(find(row, "td.team")?);
            let pos = parse_digits("position", &text(find(row, "td.position")?))?;
            rows.push((name, pos));
        }
        Ok(Self {
            positions: rows.into_iter().collect(),
        })
    }

    pub fn contains(&self, team: &str) -> bool {
        self.positions.get(team).is_some()
    }

    pub fn position(&self, team: &str) -> Option<u32> {
        self.positions.get(team).copied()
    }
}

impl FromIterator<(String, u32)> for LeagueMembers {
    fn from_iter<I: IntoIterator<Item = (String, u32)>>(iter: I) -> Self {
        Self {
            positions: iter.into_iter().collect(),
        }
    }
}

/// Meetings between the two teams, from the home team's point of view.
pub fn head_to_head(page: &FixturePage<'_>, teams: &Teams) -> SectionResult<Vec<HistoryEntry>> {
    let heading = page
        .headings
        .containing("H2H last")
        .ok_or_else(|| SectionError::missing("heading 'H2H last'"))?;

    let no_data = next_element(heading)
        .is_some_and(|el| el.value().name() == "div" && has_class(el, "games-stat-no-data"));
    if no_data {
        return Ok(Vec::new());
    }

    let table = next_sibling(heading, "table", None)
        .ok_or_else(|| SectionError::missing("H2H table"))?;
    Ok(parse_rows(table, &teams.home)?
        .into_iter()
        .map(|row| row.entry)
        .collect())
}

/// Recent league matches for both teams. Matches against sides that are not
/// in the league table are dropped.
pub fn recent_form(
    page: &FixturePage<'_>,
    teams: &Teams,
) -> SectionResult<(Vec<HistoryEntry>, Vec<HistoryEntry>)> {
    let members = LeagueMembers::locate(page)?;

    let home_table = page.table_after(&format!("{} last 12 games", teams.home), "games-stat")?;
    let away_table = page.table_after(&format!("{} last 12 games", teams.away), "games-stat")?;

    let home = league_only(parse_rows(home_table, &teams.home)?, &members);
    let away = league_only(parse_rows(away_table, &teams.away)?, &members);
    Ok((home, away))
}

/// Keep rows whose opponent is a league member and attach standings.
fn league_only(rows: Vec<Row>, members: &LeagueMembers) -> Vec<HistoryEntry> {
    rows.into_iter()
        .filter(|row| members.contains(row.opponent()))
        .map(|row| {
            let standing = Standing {
                home_pos: members.position(&row.home),
                away_pos: members.position(&row.away),
                home_team: row.home,
                away_team: row.away,
            };
            HistoryEntry {
                standing: Some(standing),
                ..row.entry
            }
        })
        .collect()
}

fn parse_rows(table: ElementRef<'_>, subject: &str) -> SectionResult<Vec<Row>> {
    let subject = normalize_label(subject);
    let mut rows = Vec::new();

    for tr in find_all(table, "tbody tr")? {
        let raw_date = text(find(tr, ".date")?);
        let date = NaiveDate::parse_from_str(&raw_date, "%Y-%m-%d")
            .map_err(|_| SectionError::parse("match date", &raw_date))?;

        let home = normalize_label(&text(find(tr, ".hteam")?));
        let away = normalize_label(&text(find(tr, ".ateam")?));
        let (home_goals, away_goals) = parse_score(&text(find(tr, ".result")?))?;

        let (gf, ga, venue) = if home == subject {
            (home_goals, away_goals, Venue::HomeHome)
        } else {
            (away_goals, home_goals, Venue::HomeAway)
        };

        rows.push(Row {
            entry: HistoryEntry {
                date,
                gf,
                ga,
                venue,
                standing: None,
            },
            home,
            away,
        });
    }
    Ok(rows)
}

/// Serialize a history list into its JSON cell.
pub fn to_json(entries: &[HistoryEntry]) -> SectionResult<String> {
    serde_json::to_string(entries).map_err(|e| SectionError::parse("history json", e.to_string()))
}

pub fn head_to_head_partial(entries: &[HistoryEntry]) -> SectionResult<Partial> {
    Ok(vec![(Field::HeadToHead, Some(to_json(entries)?.into()))])
}

pub fn recent_form_partial(home: &[HistoryEntry], away: &[HistoryEntry]) -> SectionResult<Partial> {
    Ok(vec![
        (Field::RecentHome, Some(to_json(home)?.into())),
        (Field::RecentAway, Some(to_json(away)?.into())),
    ])
}
