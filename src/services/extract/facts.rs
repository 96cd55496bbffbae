//! Top-level fixture facts: competition, kickoff and team names.

use chrono::{NaiveDate, NaiveTime};

use super::{FixturePage, SectionError, SectionResult, Teams, find, text, text_parts};
use crate::models::{Field, Partial};

const DATE_FORMAT: &str = "%d.%m.%Y";
const TIME_FORMAT: &str = "%H:%M";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureFacts {
    pub date: NaiveDate,
    pub kickoff: NaiveTime,
    pub league: String,
    pub country: String,
    pub teams: Teams,
}

impl FixtureFacts {
    pub fn into_partial(self) -> Partial {
        vec![
            (Field::Date, Some(self.date.format("%Y-%m-%d").to_string().into())),
            (Field::Kickoff, Some(self.kickoff.format("%H:%M:%S").to_string().into())),
            (Field::League, Some(self.league.into())),
            (Field::Country, Some(self.country.into())),
            (Field::HomeTeam, Some(self.teams.home.into())),
            (Field::AwayTeam, Some(self.teams.away.into())),
        ]
    }
}

pub fn extract(page: &FixturePage<'_>) -> SectionResult<FixtureFacts> {
    let (league, country) = split_title(&text(find(page.wrapper, "h1.game-league")?));
    let (date, kickoff) = parse_game_time(&text_parts(find(page.wrapper, ".game-time")?).join("|"))?;

    let home = text(find(page.wrapper, ".team-flag-left h1")?);
    let away = text(find(page.wrapper, ".team-flag-right h1")?);
    if home.is_empty() || away.is_empty() {
        return Err(SectionError::missing("team name"));
    }

    Ok(FixtureFacts {
        date,
        kickoff,
        league,
        country,
        teams: Teams { home, away },
    })
}

/// `"Premier League - England"` -> (`"Premier League"`, `"England"`).
fn split_title(title: &str) -> (String, String) {
    let mut parts = title.split('-').map(str::trim);
    let league = parts.next().unwrap_or_default().to_string();
    let country = parts.last().map(str::to_string).unwrap_or_else(|| league.clone());
    (league, country)
}

/// `"Saturday, 12.08.2023|15:00"`: the part after the last comma holds the
/// date and the kickoff time.
fn parse_game_time(raw: &str) -> SectionResult<(NaiveDate, NaiveTime)> {
    let tail = raw.rsplit(',').next().unwrap_or(raw);
    let parts: Vec<&str> = tail.split('|').map(str::trim).filter(|p| !p.is_empty()).collect();
    let (Some(date_raw), Some(time_raw)) = (parts.first(), parts.last()) else {
        return Err(SectionError::parse("game time", raw));
    };

    let date = NaiveDate::parse_from_str(date_raw, DATE_FORMAT)
        .map_err(|_| SectionError::parse("date", *date_raw))?;
    let kickoff = NaiveTime::parse_from_str(time_raw, TIME_FORMAT)
        .map_err(|_| SectionError::parse("kickoff", *time_raw))?;
    Ok((date, kickoff))
}
