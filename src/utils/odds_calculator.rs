use crate::error::PredictionError;
use crate::models::{OddsTriple, ProbabilityTriple};

/// Convert decimal odds to implied probability
/// Decimal odds of 2.50 mean a 1 unit stake returns 2.50 units in total
pub fn decimal_odds_to_probability(odds: f64) -> f64 {
    1.0 / odds
}

fn check_price(outcome: &'static str, price: f64) -> Result<(), PredictionError> {
    // NaN fails the comparison as well
    if price > 1.0 && price.is_finite() {
        Ok(())
    } else {
        Err(PredictionError::InvalidOdds { outcome, price })
    }
}

/// Sum of the implied probabilities, i.e. the bookmaker's overround
pub fn market_margin(odds: &OddsTriple) -> f64 {
    decimal_odds_to_probability(odds.home)
        + decimal_odds_to_probability(odds.draw)
        + decimal_odds_to_probability(odds.away)
}

/// Strip the overround out of a 1X2 market and express each outcome as a
/// whole percentage.
///
/// Each field is rounded on its own, so the three percentages can sum to
/// 99 or 101.
pub fn normalize(odds: &OddsTriple) -> Result<ProbabilityTriple, PredictionError> {
    check_price("home", odds.home)?;
    check_price("draw", odds.draw)?;
    check_price("away", odds.away)?;

    let margin = market_margin(odds);
    let percent = |price: f64| (decimal_odds_to_probability(price) / margin * 100.0).round() as u8;

    Ok(ProbabilityTriple {
        home: percent(odds.home),
        draw: percent(odds.draw),
        away: percent(odds.away),
    })
}

/// Price of a double chance bet covering two outcomes
pub fn double_chance_odds(side_odds: f64, draw_odds: f64) -> f64 {
    1.0 / (1.0 / side_odds + 1.0 / draw_odds)
}

/// Format decimal odds as a fractional "N/1" price, e.g. 5.5 -> "4.5/1"
pub fn to_fractional(decimal_odds: f64) -> String {
    format!("{:.1}/1", decimal_odds - 1.0)
}
