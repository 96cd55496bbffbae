//! Half-time and full-time result.

use std::cmp::Ordering;

use super::{FixturePage, SectionError, SectionResult, find, parse_score, text};
use crate::models::{Field, Partial};

/// Goals per half, parsed from `"(H1-A1, H2-A2)"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchResult {
    pub home_first_half: u32,
    pub away_first_half: u32,
    pub home_second_half: u32,
    pub away_second_half: u32,
}

impl MatchResult {
    pub fn parse(raw: &str) -> SectionResult<Self> {
        let inner = raw.trim().trim_start_matches('(').trim_end_matches(')');
        let mut halves = inner.split(',');
        let (Some(first), Some(second), None) = (halves.next(), halves.next(), halves.next()) else {
            return Err(SectionError::parse("result", raw));
        };

        let (home_first_half, away_first_half) = parse_score(first)?;
        let (home_second_half, away_second_half) = parse_score(second)?;
        if home_first_half.checked_add(home_second_half).is_none()
            || away_first_half.checked_add(away_second_half).is_none()
        {
            return Err(SectionError::parse("result", raw));
        }
        Ok(Self {
            home_first_half,
            away_first_half,
            home_second_half,
            away_second_half,
        })
    }

    pub fn home_goals(&self) -> u32 {
        self.home_first_half.saturating_add(self.home_second_half)
    }

    pub fn away_goals(&self) -> u32 {
        self.away_first_half.saturating_add(self.away_second_half)
    }

    /// `H`, `D` or `A` from the full-time score.
    pub fn outcome(&self) -> &'static str {
        match self.home_goals().cmp(&self.away_goals()) {
            Ordering::Greater => "H",
            Ordering::Equal => "D",
            Ordering::Less => "A",
        }
    }

    pub fn into_partial(self) -> Partial {
        vec![
            (Field::HomeGoalsFirstHalf, Some(self.home_first_half.into())),
            (Field::HomeGoalsSecondHalf, Some(self.home_second_half.into())),
            (Field::AwayGoalsFirstHalf, Some(self.away_first_half.into())),
            (Field::AwayGoalsSecondHalf, Some(self.away_second_half.into())),
            (Field::HomeGoalsFullTime, Some(self.home_goals().into())),
            (Field::AwayGoalsFullTime, Some(self.away_goals().into())),
            (Field::FullTimeResult, Some(self.outcome().into())),
        ]
    }
}

pub fn extract(page: &FixturePage<'_>) -> SectionResult<MatchResult> {
    MatchResult::parse(&text(find(page.wrapper, ".game-extended-result")?))
}
