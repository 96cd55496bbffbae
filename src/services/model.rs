//! Poisson goal model over already-extracted team and league rates.

use crate::models::{Field, Partial};
use crate::services::extract::teams::round2;

/// Goal counts considered per side.
const MAX_GOALS: usize = 10;

/// Expected goals for both sides from attack/defence strengths relative to
/// the league's home and away scoring rates. `None` when a league rate is not
/// positive.
pub fn expected_goals(
    home_gsr: f64,
    home_gcr: f64,
    away_gsr: f64,
    away_gcr: f64,
    league_home: f64,
    league_away: f64,
) -> Option<(f64, f64)> {
    if league_home <= 0.0 || league_away <= 0.0 {
        return None;
    }
    let home_attack = home_gsr / league_home;
    let home_defence = home_gcr / league_away;
    let away_attack = away_gsr / league_away;
    let away_defence = away_gcr / league_home;

    let home = home_attack * away_defence * league_home;
    let away = away_attack * home_defence * league_away;
    Some((round2(home), round2(away)))
}

/// Outcome probabilities in percent, rounded to two decimals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Outcomes {
    pub home_win: f64,
    pub draw: f64,
    pub away_win: f64,
    pub over_25: f64,
    pub both_score: f64,
}

impl Outcomes {
    pub fn from_expected(home_xg: f64, away_xg: f64) -> Self {
        let home = pmf_table(home_xg);
        let away = pmf_table(away_xg);

        let mut home_win = 0.0;
        let mut draw = 0.0;
        let mut away_win = 0.0;
        for (h, ph) in home.iter().enumerate() {
            for (a, pa) in away.iter().enumerate() {
                match h.cmp(&a) {
                    std::cmp::Ordering::Greater => home_win += ph * pa,
                    std::cmp::Ordering::Equal => draw += ph * pa,
                    std::cmp::Ordering::Less => away_win += ph * pa,
                }
            }
        }

        // Total goals of two independent Poisson sides is Poisson(sum).
        let total = pmf_table(home_xg + away_xg);
        let over_25 = 1.0 - total[..=2].iter().sum::<f64>();
        let both_score = (1.0 - home[0]) * (1.0 - away[0]);

        Self {
            home_win: percent(home_win),
            draw: percent(draw),
            away_win: percent(away_win),
            over_25: percent(over_25),
            both_score: percent(both_score),
        }
    }
}

/// Model fields for a fixture; empty when the rates do not allow a model.
pub fn model_partial(
    home_gsr: f64,
    home_gcr: f64,
    away_gsr: f64,
    away_gcr: f64,
    league_home: f64,
    league_away: f64,
) -> Partial {
    let Some((home_xg, away_xg)) =
        expected_goals(home_gsr, home_gcr, away_gsr, away_gcr, league_home, league_away)
    else {
        return Partial::new();
    };
    let outcomes = Outcomes::from_expected(home_xg, away_xg);
    vec![
        (Field::HomeExpectedGoals, Some(home_xg.into())),
        (Field::AwayExpectedGoals, Some(away_xg.into())),
        (Field::ModelHomeWinProb, Some(outcomes.home_win.into())),
        (Field::ModelDrawProb, Some(outcomes.draw.into())),
        (Field::ModelAwayWinProb, Some(outcomes.away_win.into())),
        (Field::ModelOver25Prob, Some(outcomes.over_25.into())),
        (Field::ModelBothScoreProb, Some(outcomes.both_score.into())),
    ]
}

/// P(X = k) for k in 0..=MAX_GOALS.
fn pmf_table(lambda: f64) -> [f64; MAX_GOALS + 1] {
    let mut table = [0.0; MAX_GOALS + 1];
    let mut p = (-lambda).exp();
    for (k, slot) in table.iter_mut().enumerate() {
        if k > 0 {
            p *= lambda / k as f64;
        }
        *slot = p;
    }
    table
}

fn percent(p: f64) -> f64 {
    round2(p * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Value;

    #[test]
    fn test_expected_goals_average_teams() {
        // Teams scoring and conceding at the league rates get the league rates.
        assert_eq!(
            expected_goals(1.6, 1.2, 1.2, 1.6, 1.6, 1.2),
            Some((1.6, 1.2))
        );
    }

    #[test]
    fn test_expected_goals_strong_home_side() {
        let (home, away) = expected_goals(2.4, 0.6, 1.0, 2.0, 1.6, 1.2).unwrap();
        assert_eq!(home, 3.0);
        assert_eq!(away, 0.5);
    }

    #[test]
    fn test_zero_league_rate() {
        assert_eq!(expected_goals(1.0, 1.0, 1.0, 1.0, 0.0, 1.2), None);
        assert!(model_partial(1.0, 1.0, 1.0, 1.0, 1.6, 0.0).is_empty());
    }

    #[test]
    fn test_outcomes_sum_to_about_hundred() {
        let o = Outcomes::from_expected(1.5, 1.1);
        let total = o.home_win + o.draw + o.away_win;
        assert!((total - 100.0).abs() < 0.1, "{total}");
        assert!(o.home_win > o.away_win);
    }

    #[test]
    fn test_symmetric_sides() {
        let o = Outcomes::from_expected(1.3, 1.3);
        assert!((o.home_win - o.away_win).abs() < 0.011);
    }

    #[test]
    fn test_goalless_model() {
        let o = Outcomes::from_expected(0.0, 0.0);
        assert_eq!(o.draw, 100.0);
        assert_eq!(o.over_25, 0.0);
        assert_eq!(o.both_score, 0.0);
    }

    #[test]
    fn test_model_partial_fields() {
        let partial = model_partial(1.6, 1.2, 1.2, 1.6, 1.6, 1.2);
        assert_eq!(partial.len(), 7);
        assert_eq!(partial[0], (Field::HomeExpectedGoals, Some(Value::Float(1.6))));
    }
}
