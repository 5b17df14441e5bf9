use crate::config::PredictorConfig;
use crate::error::PredictionError;
use crate::models::{OddsTriple, ProbabilityTriple, Tip};
use crate::utils::odds_calculator::double_chance_odds;

/// Pick the match-result tip for a fixture.
///
/// Rules are tried in order: a home win, an away win, a draw, and finally a
/// double chance on whichever side is more likely. Ties at the top go to
/// home, then away, then draw.
pub fn select_tip(
    probs: &ProbabilityTriple,
    home_team: &str,
    away_team: &str,
    odds: &OddsTriple,
    config: &PredictorConfig,
) -> Result<Tip, PredictionError> {
    let home_team = home_team.trim();
    let away_team = away_team.trim();
    if home_team.is_empty() || away_team.is_empty() {
        return Err(PredictionError::InvalidFixture(format!(
            "missing team name (home: {:?}, away: {:?})",
            home_team, away_team
        )));
    }

    let home_is_max = probs.home >= probs.away && probs.home >= probs.draw;
    let away_is_max = !home_is_max && probs.away >= probs.draw;
    let draw_is_max = !home_is_max && !away_is_max;

    if home_is_max && probs.home >= config.win_threshold {
        return Ok(Tip {
            label: format!("{} Win", home_team),
            confidence: probs.home,
            reference_odd: odds.home,
        });
    }

    if away_is_max && probs.away >= config.win_threshold {
        return Ok(Tip {
            label: format!("{} Win", away_team),
            confidence: probs.away,
            reference_odd: odds.away,
        });
    }

    if draw_is_max && probs.draw >= config.draw_threshold {
        return Ok(Tip {
            label: "Draw".to_string(),
            confidence: probs.draw,
            reference_odd: odds.draw,
        });
    }

    // Nothing is convincing on its own: cover the likelier side and the draw
    let (team, side_prob, side_odds) = if probs.home >= probs.away {
        (home_team, probs.home, odds.home)
    } else {
        (away_team, probs.away, odds.away)
    };

    Ok(Tip {
        label: format!("{} or Draw", team),
        confidence: side_prob.saturating_add(probs.draw).min(100),
        reference_odd: double_chance_odds(side_odds, odds.draw),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn probs(home: u8, draw: u8, away: u8) -> ProbabilityTriple {
        ProbabilityTriple { home, draw, away }
    }

    fn odds() -> OddsTriple {
        OddsTriple {
            home: 2.5,
            draw: 3.2,
            away: 2.9,
        }
    }

    fn tip(p: ProbabilityTriple) -> Tip {
        select_tip(&p, "Arsenal", "Chelsea", &odds(), &PredictorConfig::default()).unwrap()
    }

    #[test]
    fn test_home_win() {
        let t = tip(probs(61, 23, 16));
        assert_eq!(t.label, "Arsenal Win");
        assert_eq!(t.confidence, 61);
        assert_eq!(t.reference_odd, 2.5);
    }

    #[test]
    fn test_away_win() {
        let t = tip(probs(20, 26, 54));
        assert_eq!(t.label, "Chelsea Win");
        assert_eq!(t.confidence, 54);
        assert_eq!(t.reference_odd, 2.9);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        assert_eq!(tip(probs(45, 30, 25)).label, "Arsenal Win");
        assert_eq!(tip(probs(25, 30, 45)).label, "Chelsea Win");
    }

    #[test]
    fn test_configured_threshold() {
        let config = PredictorConfig {
            win_threshold: 55,
            ..PredictorConfig::default()
        };
        let t = select_tip(&probs(50, 28, 22), "Arsenal", "Chelsea", &odds(), &config).unwrap();
        assert_eq!(t.label, "Arsenal or Draw");
    }

    #[test]
    fn test_draw_tip() {
        let t = tip(probs(30, 38, 32));
        assert_eq!(t.label, "Draw");
        assert_eq!(t.confidence, 38);
        assert_eq!(t.reference_odd, 3.2);
    }

    #[test]
    fn test_double_chance_fallback() {
        let t = tip(probs(40, 28, 32));
        assert_eq!(t.label, "Arsenal or Draw");
        assert_eq!(t.confidence, 68);
        assert_relative_eq!(t.reference_odd, 1.0 / (1.0 / 2.5 + 1.0 / 3.2), epsilon = 1e-12);

        let t = tip(probs(33, 27, 40));
        assert_eq!(t.label, "Chelsea or Draw");
        assert_eq!(t.confidence, 67);
        assert_relative_eq!(t.reference_odd, 1.0 / (1.0 / 2.9 + 1.0 / 3.2), epsilon = 1e-12);
    }

    #[test]
    fn test_ties_prefer_home_then_away() {
        // Home and away level at the top but below the threshold
        let t = tip(probs(38, 24, 38));
        assert_eq!(t.label, "Arsenal or Draw");

        // Home level with the draw
        let t = tip(probs(46, 46, 8));
        assert_eq!(t.label, "Arsenal Win");

        // Away level with the draw
        let t = tip(probs(8, 46, 46));
        assert_eq!(t.label, "Chelsea Win");
    }

    #[test]
    fn test_deterministic() {
        let p = probs(42, 29, 29);
        let first = tip(p);
        for _ in 0..20 {
            assert_eq!(tip(p), first);
        }
    }

    #[test]
    fn test_missing_team_names() {
        let config = PredictorConfig::default();
        let err = select_tip(&probs(50, 25, 25), "", "Chelsea", &odds(), &config).unwrap_err();
        assert!(matches!(err, PredictionError::InvalidFixture(_)));
        assert!(select_tip(&probs(50, 25, 25), "Arsenal", "  ", &odds(), &config).is_err());
    }
}
