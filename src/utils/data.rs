use crate::models::MatchPrediction;
use crate::utils::recommendations::RecommendedBet;
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    Ok(())
}

/// Save any serializable data to a JSON cache file
pub fn save_to_cache<T: Serialize + ?Sized>(data: &T, cache_file: &str) -> Result<()> {
    let path = Path::new(cache_file);
    ensure_parent(path)?;
    let json = serde_json::to_string_pretty(data).context("Failed to serialize cache data")?;
    std::fs::write(path, json).context("Failed to write cache file")?;
    Ok(())
}

/// Load data from a JSON cache file
pub fn load_from_cache<T: DeserializeOwned>(cache_file: &str) -> Result<T> {
    let json = std::fs::read_to_string(cache_file).context("Failed to read cache file")?;
    serde_json::from_str(&json).context("Failed to deserialize cache data")
}

#[derive(Serialize)]
struct PredictionRow<'a> {
    #[serde(rename = "Kickoff")]
    kickoff: String,
    #[serde(rename = "Home Team")]
    home_team: &'a str,
    #[serde(rename = "Away Team")]
    away_team: &'a str,
    #[serde(rename = "Bookmaker")]
    bookmaker: &'a str,
    #[serde(rename = "Home (%)")]
    home_pct: u8,
    #[serde(rename = "Draw (%)")]
    draw_pct: u8,
    #[serde(rename = "Away (%)")]
    away_pct: u8,
    #[serde(rename = "Tip")]
    tip: &'a str,
    #[serde(rename = "Confidence (%)")]
    confidence: u8,
    #[serde(rename = "Odds")]
    odds: String,
    #[serde(rename = "Expected Goals")]
    expected_goals: String,
    #[serde(rename = "Goals")]
    goals: &'a str,
    #[serde(rename = "Corners")]
    corners: u32,
    #[serde(rename = "Shots")]
    shots: String,
    #[serde(rename = "Shots on Target")]
    shots_on_target: String,
    #[serde(rename = "Fouls")]
    fouls: &'a str,
    #[serde(rename = "Bet Builder")]
    bet_builder: &'a str,
    #[serde(rename = "Stats")]
    stats: String,
}

/// Save predictions to CSV
pub fn save_predictions_to_csv(predictions: &[MatchPrediction], filename: &str) -> Result<()> {
    let path = Path::new(filename);
    ensure_parent(path)?;
    let mut writer = csv::Writer::from_path(path).context("Failed to create CSV file")?;

    for p in predictions {
        writer.serialize(PredictionRow {
            kickoff: p.fixture.commence_time.format("%Y-%m-%d %H:%M").to_string(),
            home_team: &p.fixture.home_team,
            away_team: &p.fixture.away_team,
            bookmaker: &p.bookmaker,
            home_pct: p.probabilities.home,
            draw_pct: p.probabilities.draw,
            away_pct: p.probabilities.away,
            tip: &p.tip.label,
            confidence: p.tip.confidence,
            odds: format!("{:.2}", p.tip.reference_odd),
            expected_goals: format!("{:.1}", p.stats.goals.expected_goals),
            goals: &p.stats.goals.label,
            corners: p.stats.corners.total,
            shots: format!("{}-{}", p.stats.shots.home, p.stats.shots.away),
            shots_on_target: format!(
                "{}-{}",
                p.stats.shots_on_target.home, p.stats.shots_on_target.away
            ),
            fouls: &p.stats.fouls,
            bet_builder: &p.stats.bet_builder,
            stats: p.stats.origin.to_string(),
        })?;
    }

    writer.flush().context("Failed to flush CSV file")?;
    Ok(())
}

#[derive(Serialize)]
struct BetRow {
    #[serde(rename = "Type")]
    kind: String,
    #[serde(rename = "Selections")]
    selections: String,
    #[serde(rename = "Odds")]
    odds: String,
    #[serde(rename = "Confidence")]
    confidence: String,
    #[serde(rename = "Stake")]
    stake: String,
    #[serde(rename = "Return")]
    projected_return: String,
}

/// Save recommended bets to CSV
pub fn save_bets_to_csv(bets: &[RecommendedBet], filename: &str) -> Result<()> {
    let path = Path::new(filename);
    ensure_parent(path)?;
    let mut writer = csv::Writer::from_path(path).context("Failed to create CSV file")?;

    for bet in bets {
        writer.serialize(BetRow {
            kind: bet.kind.to_string(),
            selections: bet.selections().join(" | "),
            odds: bet.odds_display(),
            confidence: bet.confidence.to_string(),
            stake: bet.stake_display(),
            projected_return: bet.return_display(),
        })?;
    }

    writer.flush().context("Failed to flush CSV file")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BookmakerOdds, Fixture, League, OutcomePrice};
    use chrono::Utc;

    fn temp_path(name: &str) -> String {
        std::env::temp_dir()
            .join(format!("football_predictor_{}_{}", std::process::id(), name))
            .to_string_lossy()
            .into_owned()
    }

    #[test]
    fn test_cache_round_trip_for_odds() {
        let games = vec![(
            Fixture {
                id: "abc".to_string(),
                home_team: "Arsenal".to_string(),
                away_team: "Chelsea".to_string(),
                commence_time: Utc::now(),
                league: League::PremierLeague,
            },
            vec![BookmakerOdds {
                fixture_id: "abc".to_string(),
                bookmaker: "Sky Bet".to_string(),
                last_update: Utc::now(),
                h2h: vec![OutcomePrice {
                    name: "Draw".to_string(),
                    price: 3.4,
                }],
            }],
        )];
        let path = temp_path("odds.json");
        save_to_cache(&games, &path).unwrap();
        let loaded: Vec<(Fixture, Vec<BookmakerOdds>)> = load_from_cache(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].0.home_team, "Arsenal");
        assert_eq!(loaded[0].1[0].h2h[0].price, 3.4);
    }

    #[test]
    fn test_load_missing_cache_fails() {
        let result: Result<Vec<u32>> = load_from_cache(&temp_path("missing.json"));
        assert!(result.is_err());
    }
}
