use crate::config::PredictorConfig;
use crate::models::{MatchPrediction, Tip};
use crate::utils::odds_calculator::to_fractional;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BetKind {
    SafestBanker,
    ValueAccumulator,
    GoalsAccumulator,
}

impl fmt::Display for BetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BetKind::SafestBanker => f.write_str("Safest Banker"),
            BetKind::ValueAccumulator => f.write_str("Value Acca"),
            BetKind::GoalsAccumulator => f.write_str("Goals Acca"),
        }
    }
}

/// Confidence in a bet, either a percentage or a coarse label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BetConfidence {
    Percent(u8),
    Label(String),
}

impl fmt::Display for BetConfidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BetConfidence::Percent(p) => write!(f, "{}%", p),
            BetConfidence::Label(label) => f.write_str(label),
        }
    }
}

/// A suggested bet built from one or more predictions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendedBet {
    pub kind: BetKind,
    pub legs: Vec<Tip>,
    pub combined_odds: f64,
    pub confidence: BetConfidence,
    pub stake: f64,
    pub projected_return: f64,
    pub currency: String,
    /// The combined odds are an estimate rather than a quoted price
    pub estimated: bool,
}

impl RecommendedBet {
    fn new(
        kind: BetKind,
        legs: Vec<Tip>,
        confidence: BetConfidence,
        stake: f64,
        estimated: bool,
        config: &PredictorConfig,
    ) -> Self {
        let combined_odds: f64 = legs.iter().map(|leg| leg.reference_odd).product();
        Self {
            kind,
            legs,
            combined_odds,
            confidence,
            stake,
            projected_return: stake * combined_odds,
            currency: config.currency_symbol.clone(),
            estimated,
        }
    }

    /// "4.5/1 (5.50)", with "(Est)" for estimated prices
    pub fn odds_display(&self) -> String {
        let odds = if self.legs.len() > 1 {
            format!("{} ({:.2})", to_fractional(self.combined_odds), self.combined_odds)
        } else {
            format!("{:.2}", self.combined_odds)
        };
        if self.estimated {
            format!("{} (Est)", odds)
        } else {
            odds
        }
    }

    pub fn stake_display(&self) -> String {
        format!("{}{:.2}", self.currency, self.stake)
    }

    pub fn return_display(&self) -> String {
        format!("{}{:.2}", self.currency, self.projected_return)
    }

    /// Leg labels as shown on a bet slip; accumulator legs carry their price
    pub fn selections(&self) -> Vec<String> {
        if self.legs.len() > 1 {
            self.legs
                .iter()
                .map(|leg| format!("{} ({:.2})", leg.label, leg.reference_odd))
                .collect()
        } else {
            self.legs.iter().map(|leg| leg.label.clone()).collect()
        }
    }

    pub fn format(&self) -> String {
        format!(
            "{} | {} | Odds: {} | Confidence: {} | {} -> {}",
            self.kind,
            self.selections().join(" + "),
            self.odds_display(),
            self.confidence,
            self.stake_display(),
            self.return_display()
        )
    }
}

/// The single most confident tip; the first one wins a tie
fn safest_banker(predictions: &[MatchPrediction], config: &PredictorConfig) -> Option<RecommendedBet> {
    let mut best: Option<&MatchPrediction> = None;
    for prediction in predictions {
        if best.map_or(true, |b| prediction.tip.confidence > b.tip.confidence) {
            best = Some(prediction);
        }
    }

    best.map(|prediction| {
        RecommendedBet::new(
            BetKind::SafestBanker,
            vec![prediction.tip.clone()],
            BetConfidence::Percent(prediction.tip.confidence),
            config.banker_stake,
            false,
            config,
        )
    })
}

/// Stack the most confident tips until the next leg would take the price to
/// the ceiling
fn value_accumulator(
    predictions: &[MatchPrediction],
    config: &PredictorConfig,
) -> Option<RecommendedBet> {
    let mut ranked: Vec<&MatchPrediction> = predictions.iter().collect();
    // Stable, so equal confidences keep input order
    ranked.sort_by(|a, b| b.tip.confidence.cmp(&a.tip.confidence));

    let mut legs = Vec::new();
    let mut combined_odds = 1.0;
    for prediction in ranked {
        let next = combined_odds * prediction.tip.reference_odd;
        if next >= config.value_acca_ceiling {
            break;
        }
        combined_odds = next;
        legs.push(prediction.tip.clone());
    }

    if legs.len() < 2 {
        return None;
    }

    let weakest = legs.iter().map(|leg| leg.confidence).min().unwrap_or(0);
    let confidence = (weakest as f64 * config.value_acca_damping).round() as u8;

    Some(RecommendedBet::new(
        BetKind::ValueAccumulator,
        legs,
        BetConfidence::Percent(confidence),
        config.value_acca_stake,
        false,
        config,
    ))
}

/// Fixtures tipped for over 2.5 goals, at estimated prices
fn goals_accumulator(
    predictions: &[MatchPrediction],
    config: &PredictorConfig,
) -> Option<RecommendedBet> {
    let legs: Vec<Tip> = predictions
        .iter()
        .filter(|prediction| prediction.stats.goals.is_over())
        .take(config.goals_acca_max_legs)
        .map(|prediction| Tip {
            label: format!(
                "{} in {}",
                prediction.stats.goals.label,
                prediction.fixture.title()
            ),
            confidence: prediction.stats.goals.confidence,
            reference_odd: config.goals_leg_estimated_odds,
        })
        .collect();

    if legs.len() < 2 {
        return None;
    }

    Some(RecommendedBet::new(
        BetKind::GoalsAccumulator,
        legs,
        BetConfidence::Label("Medium".to_string()),
        config.goals_acca_stake,
        true,
        config,
    ))
}

/// Build the recommended bets for a fetch cycle: the banker first, then the
/// value and goals accumulators when there are enough legs for them.
pub fn compose(predictions: &[MatchPrediction], config: &PredictorConfig) -> Vec<RecommendedBet> {
    [
        safest_banker(predictions, config),
        value_accumulator(predictions, config),
        goals_accumulator(predictions, config),
    ]
    .into_iter()
    .flatten()
    .collect()
}
