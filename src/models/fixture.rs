//! Fixture locators and the flat fixture record schema.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Where a fixture document lives and which round it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixtureLocator {
    pub url_fragment: String,
    pub round: u32,
}

/// Declares the record columns once: variant, column name, in output order.
macro_rules! fields {
    ($($variant:ident => $name:literal),+ $(,)?) => {
        /// One column of a [`FixtureRecord`].
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum Field {
            $($variant),+
        }

        impl Field {
            /// Every field, in column order.
            pub const ALL: &'static [Field] = &[$(Field::$variant),+];

            /// Number of declared columns.
            pub const COUNT: usize = Self::ALL.len();

            /// Column name used in the output header.
            pub const fn name(self) -> &'static str {
                match self {
                    $(Field::$variant => $name),+
                }
            }

            /// Column position.
            pub const fn index(self) -> usize {
                self as usize
            }
        }
    };
}

fields! {
    // Fixture facts
    Date => "date",
    Kickoff => "kickoff",
    League => "league",
    Country => "country",
    Round => "round",
    HomeTeam => "home_team",
    AwayTeam => "away_team",

    // Result
    HomeGoalsFirstHalf => "hg_fh",
    HomeGoalsSecondHalf => "hg_sh",
    AwayGoalsFirstHalf => "ag_fh",
    AwayGoalsSecondHalf => "ag_sh",
    HomeGoalsFullTime => "hg_ft",
    AwayGoalsFullTime => "ag_ft",
    FullTimeResult => "ft_res",

    // Histories (JSON arrays)
    HeadToHead => "h2h",
    RecentHome => "pm_home",
    RecentAway => "pm_away",

    // Matches played
    HomeMpOverall => "h_mp_0",
    HomeMpHome => "h_mp_1",
    AwayMpOverall => "a_mp_0",
    AwayMpAway => "a_mp_2",

    // League positions
    HomePosOverall => "h_pos_0",
    HomePosHome => "h_pos_1",
    AwayPosOverall => "a_pos_0",
    AwayPosAway => "a_pos_2",

    // Points
    HomePtsOverall => "h_pts_0",
    HomePtsHome => "h_pts_1",
    AwayPtsOverall => "a_pts_0",
    AwayPtsAway => "a_pts_2",

    // Goals scored / conceded per match
    HomeGsrOverall => "h_gsr_0",
    HomeGcrOverall => "h_gcr_0",
    HomeGsrHome => "h_gsr_1",
    HomeGcrHome => "h_gcr_1",
    AwayGsrOverall => "a_gsr_0",
    AwayGcrOverall => "a_gcr_0",
    AwayGsrAway => "a_gsr_2",
    AwayGcrAway => "a_gcr_2",

    // Points per game
    HomePpgOverall => "h_ppg_0",
    HomePpgHome => "h_ppg_1",
    AwayPpgOverall => "a_ppg_0",
    AwayPpgAway => "a_ppg_2",

    // Score counts, home side
    HomeO15Overall => "h_o15_0",
    HomeO25Overall => "h_o25_0",
    HomeO35Overall => "h_o35_0",
    HomeGgOverall => "h_gg_0",
    HomeCsOverall => "h_cs_0",
    HomeFtsOverall => "h_fts_0",
    HomeO15Home => "h_o15_1",
    HomeO25Home => "h_o25_1",
    HomeO35Home => "h_o35_1",
    HomeGgHome => "h_gg_1",
    HomeCsHome => "h_cs_1",
    HomeFtsHome => "h_fts_1",

    // Score counts, away side
    AwayO15Overall => "a_o15_0",
    AwayO25Overall => "a_o25_0",
    AwayO35Overall => "a_o35_0",
    AwayGgOverall => "a_gg_0",
    AwayCsOverall => "a_cs_0",
    AwayFtsOverall => "a_fts_0",
    AwayO15Away => "a_o15_2",
    AwayO25Away => "a_o25_2",
    AwayO35Away => "a_o35_2",
    AwayGgAway => "a_gg_2",
    AwayCsAway => "a_cs_2",
    AwayFtsAway => "a_fts_2",

    // League aggregates
    LeagueMatchesPlayed => "lg_mp",
    LeagueHomeWin => "lg_hw",
    LeagueDraws => "lg_draws",
    LeagueAwayWin => "lg_aw",
    LeagueAvgGoals => "lg_avg_goals",
    LeagueHomeGsr => "lg_gsr_1",
    LeagueAwayGsr => "lg_gsr_2",
    LeagueHomeScoredIn => "lg_gsf_1",
    LeagueAwayScoredIn => "lg_gsf_2",
    LeagueBothScored => "lg_gg",
    LeagueOver15 => "lg_o15",
    LeagueOver25 => "lg_o25",
    LeagueOver35 => "lg_o35",

    // Market prices
    HomeWinOdds => "hw_odds",
    DrawOdds => "draw_odds",
    AwayWinOdds => "aw_odds",
    HomeOrDrawOdds => "1x_odds",
    DrawOrAwayOdds => "x2_odds",
    Over15Odds => "o15_odds",
    Under15Odds => "u15_odds",
    Over25Odds => "o25_odds",
    Under25Odds => "u25_odds",
    Over35Odds => "o35_odds",
    Under35Odds => "u35_odds",
    BothScoreYesOdds => "gg_yes_odds",
    BothScoreNoOdds => "gg_no_odds",

    // Market probabilities
    HomeWinProb => "hw_prima_prob",
    DrawProb => "draw_prima_prob",
    AwayWinProb => "aw_prima_prob",
    HomeOrDrawProb => "1x_prima_prob",
    DrawOrAwayProb => "x2_prima_prob",
    Over15Prob => "o15_prima_prob",
    Under15Prob => "u15_prima_prob",
    Over25Prob => "o25_prima_prob",
    Under25Prob => "u25_prima_prob",
    Over35Prob => "o35_prima_prob",
    Under35Prob => "u35_prima_prob",
    BothScoreYesProb => "gg_yes_prima_prob",
    BothScoreNoProb => "gg_no_prima_prob",

    // Poisson model
    HomeExpectedGoals => "xg_home",
    AwayExpectedGoals => "xg_away",
    ModelHomeWinProb => "model_hw_prob",
    ModelDrawProb => "model_draw_prob",
    ModelAwayWinProb => "model_aw_prob",
    ModelOver25Prob => "model_o25_prob",
    ModelBothScoreProb => "model_btts_prob",
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A scalar cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Text(String),
}

impl Value {
    /// Render for a delimited text cell.
    pub fn render(&self) -> String {
        match self {
            Value::Int(v) => v.to_string(),
            Value::Float(v) => v.to_string(),
            Value::Text(v) => v.clone(),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(v) => Some(*v as f64),
            Value::Float(v) => Some(*v),
            Value::Text(_) => None,
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

/// Field assignments produced by one extractor.
pub type Partial = Vec<(Field, Option<Value>)>;

/// One fixture's flat statistical record; one slot per declared field.
#[derive(Debug, Clone, PartialEq)]
pub struct FixtureRecord {
    values: Vec<Option<Value>>,
}

impl Default for FixtureRecord {
    fn default() -> Self {
        Self {
            values: vec![None; Field::COUNT],
        }
    }
}

impl FixtureRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: Field) -> Option<&Value> {
        self.values[field.index()].as_ref()
    }

    /// Numeric view of a field, if present and numeric.
    pub fn number(&self, field: Field) -> Option<f64> {
        self.get(field).and_then(Value::as_f64)
    }

    pub fn set(&mut self, field: Field, value: impl Into<Value>) {
        self.values[field.index()] = Some(value.into());
    }

    /// Apply a partial; later writes win.
    pub fn merge(&mut self, partial: Partial) {
        for (field, value) in partial {
            self.values[field.index()] = value;
        }
    }

    /// Cells in column order; absent fields render empty.
    pub fn to_row(&self) -> Vec<String> {
        self.values
            .iter()
            .map(|v| v.as_ref().map(Value::render).unwrap_or_default())
            .collect()
    }

    pub fn header() -> Vec<String> {
        Field::ALL.iter().map(|f| f.name().to_string()).collect()
    }
}
