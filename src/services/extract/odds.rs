//! Market prices and implied probabilities.

use scraper::ElementRef;

use super::{FixturePage, SectionError, SectionResult, find, find_all, text};
use crate::models::{ExtractionConfig, Field, Partial, Value};
use crate::utils::normalize_label;

/// Market label as printed in the table header, and the columns its first
/// and last cells fill (price columns, then probability columns).
struct Market {
    label: &'static str,
    prices: (Field, Field),
    probs: (Field, Field),
}

const MARKETS: &[Market] = &[
    Market {
        label: "Standard 1X2",
        prices: (Field::HomeWinOdds, Field::AwayWinOdds),
        probs: (Field::HomeWinProb, Field::AwayWinProb),
    },
    Market {
        label: "Double Chance",
        prices: (Field::HomeOrDrawOdds, Field::DrawOrAwayOdds),
        probs: (Field::HomeOrDrawProb, Field::DrawOrAwayProb),
    },
    Market {
        label: "Over/Under 1.5",
        prices: (Field::Over15Odds, Field::Under15Odds),
        probs: (Field::Over15Prob, Field::Under15Prob),
    },
    Market {
        label: "Over/Under 2.5",
        prices: (Field::Over25Odds, Field::Under25Odds),
        probs: (Field::Over25Prob, Field::Under25Prob),
    },
    Market {
        label: "Over/Under 3.5",
        prices: (Field::Over35Odds, Field::Under35Odds),
        probs: (Field::Over35Prob, Field::Under35Prob),
    },
    Market {
        label: "Both Teams to Score",
        prices: (Field::BothScoreYesOdds, Field::BothScoreNoOdds),
        probs: (Field::BothScoreYesProb, Field::BothScoreNoProb),
    },
];

const RESULT_MARKET: &str = "Standard 1X2";

/// One labelled odds table.
struct OddsTable<'a> {
    label: String,
    table: ElementRef<'a>,
}

impl OddsTable<'_> {
    /// Cells of body row `index` (0 = prices, 1 = probabilities), with `%`
    /// and blanks stripped. `None` if the row is missing or a cell does not parse.
    fn row(&self, index: usize, kind: Kind) -> Option<Vec<Value>> {
        let rows = find_all(self.table, "tbody tr").ok()?;
        let cells = find_all(*rows.get(index)?, "td.odd").ok()?;
        cells
            .into_iter()
            .map(|cell| text(cell).replace('%', "").trim().to_string())
            .filter(|raw| !raw.is_empty())
            .map(|raw| match kind {
                Kind::Price => raw.parse::<f64>().ok().map(Value::Float),
                Kind::Prob => raw.parse::<i64>().ok().map(Value::Int),
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy)]
enum Kind {
    Price,
    Prob,
}

pub fn extract(page: &FixturePage<'_>, config: &ExtractionConfig) -> SectionResult<Partial> {
    let tables = find_all(page.wrapper, "table.odds")?
        .into_iter()
        .map(|table| {
            let label = find(table, "thead .odds-type")
                .map_err(|_| SectionError::missing("odds-type label in odds table"))?;
            Ok(OddsTable {
                label: normalize_label(&text(label)),
                table,
            })
        })
        .collect::<SectionResult<Vec<_>>>()?;

    let lookup = |label: &str, index: usize, kind: Kind| -> Vec<Value> {
        let wanted = normalize_label(label);
        tables
            .iter()
            .filter(|t| t.label == wanted)
            .find_map(|t| t.row(index, kind))
            .unwrap_or_default()
    };

    let mut partial = Partial::new();
    for market in MARKETS {
        let prices = lookup(market.label, 0, Kind::Price);
        let probs = lookup(market.label, 1, Kind::Prob);
        if prices.is_empty() && probs.is_empty() {
            log::debug!("Odds market '{}' not found", market.label);
        }
        partial.push((market.prices.0, prices.first().cloned()));
        partial.push((market.prices.1, prices.last().cloned()));
        partial.push((market.probs.0, probs.first().cloned()));
        partial.push((market.probs.1, probs.last().cloned()));

        if market.label == RESULT_MARKET {
            let draw_price = if config.legacy_draw_price {
                prices.last()
            } else {
                prices.get(1)
            };
            partial.push((Field::DrawOdds, draw_price.cloned()));
            partial.push((Field::DrawProb, probs.get(1).cloned()));
        }
    }
    Ok(partial)
}
