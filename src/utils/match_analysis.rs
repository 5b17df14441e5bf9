use crate::api::stats_api::StatsSource;
use crate::config::PredictorConfig;
use crate::error::PredictionError;
use crate::models::{BookmakerOdds, Fixture, MatchPrediction, OddsTriple};
use crate::utils::match_stats::synthesize;
use crate::utils::odds_calculator::normalize;
use crate::utils::tip_selector::select_tip;
use rand::Rng;
use tracing::{debug, warn};

const DRAW_OUTCOME: &str = "Draw";

/// Take the 1X2 prices from the first bookmaker that quotes all three
/// outcomes for this fixture
pub fn extract_odds(
    fixture: &Fixture,
    odds_list: &[BookmakerOdds],
) -> Result<(String, OddsTriple), PredictionError> {
    for bookmaker_odds in odds_list {
        let price_of = |name: &str| {
            bookmaker_odds
                .h2h
                .iter()
                .find(|outcome| outcome.name == name)
                .map(|outcome| outcome.price)
        };

        if let (Some(home), Some(draw), Some(away)) = (
            price_of(&fixture.home_team),
            price_of(DRAW_OUTCOME),
            price_of(&fixture.away_team),
        ) {
            return Ok((bookmaker_odds.bookmaker.clone(), OddsTriple { home, draw, away }));
        }
    }

    Err(PredictionError::MissingOutcome(fixture.title()))
}

/// Run one fixture through the normalizer, tip selector and statistics
/// synthesizer
pub fn predict_fixture<R: Rng + ?Sized>(
    fixture: &Fixture,
    odds_list: &[BookmakerOdds],
    stats: &StatsSource,
    config: &PredictorConfig,
    rng: &mut R,
) -> Result<MatchPrediction, PredictionError> {
    let (bookmaker, odds) = extract_odds(fixture, odds_list)?;
    let probabilities = normalize(&odds)?;
    let tip = select_tip(
        &probabilities,
        &fixture.home_team,
        &fixture.away_team,
        &odds,
        config,
    )?;

    let mode = stats.mode_for(fixture.league, &fixture.home_team, &fixture.away_team);
    let stats = synthesize(
        &fixture.home_team,
        &fixture.away_team,
        &probabilities,
        &mode,
        config,
        rng,
    );

    debug!(
        "{}: {} ({}%), {} stats",
        fixture.title(),
        tip.label,
        tip.confidence,
        stats.origin
    );

    Ok(MatchPrediction {
        fixture: fixture.clone(),
        bookmaker,
        odds,
        probabilities,
        tip,
        stats,
    })
}

/// Predict every fixture, in input order. Fixtures that fail are logged and
/// left out; the second value is how many were dropped.
pub fn predict_fixtures<R: Rng + ?Sized>(
    games_with_odds: &[(Fixture, Vec<BookmakerOdds>)],
    stats: &StatsSource,
    config: &PredictorConfig,
    rng: &mut R,
) -> (Vec<MatchPrediction>, usize) {
    let mut predictions = Vec::with_capacity(games_with_odds.len());
    let mut skipped = 0;

    for (fixture, odds_list) in games_with_odds {
        match predict_fixture(fixture, odds_list, stats, config, rng) {
            Ok(prediction) => predictions.push(prediction),
            Err(e) => {
                warn!("Skipping {}: {}", fixture.title(), e);
                skipped += 1;
            }
        }
    }

    (predictions, skipped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        League, OutcomePrice, StatsOrigin, TeamAverages, TeamRecord, TeamStatsDocument,
    };
    use chrono::Utc;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashMap;

    fn fixture(id: &str, home: &str, away: &str) -> Fixture {
        Fixture {
            id: id.to_string(),
            home_team: home.to_string(),
            away_team: away.to_string(),
            commence_time: Utc::now(),
            league: League::PremierLeague,
        }
    }

    fn book(name: &str, prices: &[(&str, f64)]) -> BookmakerOdds {
        BookmakerOdds {
            fixture_id: "x".to_string(),
            bookmaker: name.to_string(),
            last_update: Utc::now(),
            h2h: prices
                .iter()
                .map(|(n, p)| OutcomePrice {
                    name: n.to_string(),
                    price: *p,
                })
                .collect(),
        }
    }

    fn averages(shots: f64) -> TeamAverages {
        TeamAverages {
            shots_per_game: shots,
            shots_on_target_per_game: shots / 3.0,
            corners_per_game: 5.0,
            fouls_per_game: 11.0,
        }
    }

    #[test]
    fn test_extract_odds_skips_incomplete_bookmakers() {
        let f = fixture("1", "Arsenal", "Chelsea");
        let odds_list = vec![
            book("Two Way", &[("Arsenal", 1.8), ("Chelsea", 2.1)]),
            book(
                "Full",
                &[("Chelsea", 4.0), ("Draw", 3.0), ("Arsenal", 2.0)],
            ),
        ];
        let (bookmaker, odds) = extract_odds(&f, &odds_list).unwrap();
        assert_eq!(bookmaker, "Full");
        assert_eq!(
            odds,
            OddsTriple {
                home: 2.0,
                draw: 3.0,
                away: 4.0
            }
        );
    }

    #[test]
    fn test_extract_odds_missing_outcome() {
        let f = fixture("1", "Arsenal", "Chelsea");
        let odds_list = vec![book("Two Way", &[("Arsenal", 1.8), ("Chelsea", 2.1)])];
        assert_eq!(
            extract_odds(&f, &odds_list),
            Err(PredictionError::MissingOutcome("Arsenal v Chelsea".to_string()))
        );
        assert!(extract_odds(&f, &[]).is_err());
    }

    #[test]
    fn test_predict_fixture_with_real_stats() {
        let mut teams = HashMap::new();
        teams.insert(
            "Arsenal".to_string(),
            TeamRecord {
                home: averages(17.0),
                away: averages(15.0),
            },
        );
        teams.insert(
            "Chelsea".to_string(),
            TeamRecord {
                home: averages(15.0),
                away: averages(13.0),
            },
        );
        let mut leagues = HashMap::new();
        leagues.insert("soccer_epl".to_string(), teams);
        let stats = StatsSource::Available(TeamStatsDocument {
            last_updated: "2026-02-10T00:00:00Z".to_string(),
            season: None,
            data_source: None,
            leagues,
        });

        let f = fixture("1", "Arsenal", "Chelsea");
        let odds_list = vec![book(
            "Bet",
            &[("Arsenal", 2.0), ("Draw", 3.0), ("Chelsea", 4.0)],
        )];
        let mut rng = StdRng::seed_from_u64(1);
        let prediction =
            predict_fixture(&f, &odds_list, &stats, &PredictorConfig::default(), &mut rng)
                .unwrap();

        assert_eq!(prediction.probabilities.home, 46);
        assert_eq!(prediction.tip.label, "Arsenal Win");
        assert_eq!(prediction.stats.origin, StatsOrigin::Real);
        assert!((14..=20).contains(&prediction.stats.shots.home));
        assert!((11..=15).contains(&prediction.stats.shots.away));
    }

    #[test]
    fn test_predict_fixtures_drops_bad_fixtures() {
        let games = vec![
            (
                fixture("1", "Arsenal", "Chelsea"),
                vec![book("A", &[("Arsenal", 2.0), ("Draw", 3.0), ("Chelsea", 4.0)])],
            ),
            (
                fixture("2", "Everton", "Fulham"),
                vec![book("A", &[("Everton", 1.0), ("Draw", 3.0), ("Fulham", 4.0)])],
            ),
            (
                fixture("3", "Spurs", "Wolves"),
                vec![book("A", &[("Spurs", 2.0), ("Wolves", 4.0)])],
            ),
            (
                fixture("4", "", "Brentford"),
                vec![book("A", &[("", 2.0), ("Draw", 3.0), ("Brentford", 4.0)])],
            ),
            (
                fixture("5", "Leeds", "Burnley"),
                vec![book("A", &[("Leeds", 2.6), ("Draw", 3.1), ("Burnley", 2.9)])],
            ),
        ];
        let mut rng = StdRng::seed_from_u64(3);
        let (predictions, skipped) = predict_fixtures(
            &games,
            &StatsSource::Unavailable,
            &PredictorConfig::default(),
            &mut rng,
        );

        assert_eq!(skipped, 3);
        let ids: Vec<_> = predictions.iter().map(|p| p.fixture.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "5"]);
        assert!(predictions
            .iter()
            .all(|p| p.stats.origin == StatsOrigin::Simulated));
    }
}
