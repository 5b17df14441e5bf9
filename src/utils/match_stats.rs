use crate::config::{BandRanges, PredictorConfig, StatRange};
use crate::models::{
    CornersEstimate, GoalsPrediction, MatchStatistics, ProbabilityTriple, SidePair, StatsOrigin,
    TeamAverages,
};
use rand::Rng;

pub const OVER_LABEL: &str = "Over 2.5 Goals";
pub const UNDER_LABEL: &str = "Under 2.5 Goals";

/// The statistics available for a fixture
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StatsMode {
    /// Home side's home averages and away side's away averages
    Real {
        home: TeamAverages,
        away: TeamAverages,
    },
    Simulated,
}

/// How lopsided a fixture is, from the home/away probability gap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Band {
    StrongFavorite,
    ModerateFavorite,
    Balanced,
}

pub fn classify(probs: &ProbabilityTriple, config: &PredictorConfig) -> Band {
    let gap = probs.gap();
    if gap > config.strong_favorite_gap {
        Band::StrongFavorite
    } else if gap > config.moderate_favorite_gap {
        Band::ModerateFavorite
    } else {
        Band::Balanced
    }
}

pub fn goals_label(expected_goals: f64, config: &PredictorConfig) -> &'static str {
    // The "Over 2.5" label only kicks in above 2.6 expected goals
    if expected_goals > config.over_goals_threshold {
        OVER_LABEL
    } else {
        UNDER_LABEL
    }
}

fn pick<R: Rng + ?Sized>(range: StatRange, rng: &mut R) -> u32 {
    rng.gen_range(range.min..=range.max)
}

/// Scale an average by a random factor in [1 - spread, 1 + spread] and round
fn jitter<R: Rng + ?Sized>(average: f64, spread: f64, rng: &mut R) -> u32 {
    let factor = rng.gen_range((1.0 - spread)..=(1.0 + spread));
    (average * factor).round().max(0.0) as u32
}

struct RawStats {
    shots: SidePair,
    shots_on_target: SidePair,
    corners: SidePair,
}

fn from_averages<R: Rng + ?Sized>(
    home: &TeamAverages,
    away: &TeamAverages,
    config: &PredictorConfig,
    rng: &mut R,
) -> RawStats {
    let spread = config.stat_jitter;
    let shots = SidePair {
        home: jitter(home.shots_per_game, spread, rng),
        away: jitter(away.shots_per_game, spread, rng),
    };
    let shots_on_target = SidePair {
        home: jitter(home.shots_on_target_per_game, spread, rng),
        away: jitter(away.shots_on_target_per_game, spread, rng),
    };
    let corners = SidePair {
        home: jitter(home.corners_per_game, spread, rng),
        away: jitter(away.corners_per_game, spread, rng),
    };

    RawStats {
        shots,
        shots_on_target,
        corners,
    }
}

fn simulate<R: Rng + ?Sized>(
    band: Band,
    home_favored: bool,
    config: &PredictorConfig,
    rng: &mut R,
) -> RawStats {
    let ranges: &BandRanges = match band {
        Band::StrongFavorite => &config.strong_band,
        Band::ModerateFavorite => &config.moderate_band,
        Band::Balanced => &config.balanced_band,
    };

    let favored_shots = pick(ranges.favored_shots, rng);
    let other_shots = pick(ranges.other_shots, rng);
    let favored_corners = pick(ranges.favored_corners, rng);
    let other_corners = pick(ranges.other_corners, rng);

    // Balanced ranges are fixed per side rather than per favourite
    let home_gets_favored = home_favored || band == Band::Balanced;
    let (shots, corners) = if home_gets_favored {
        (
            SidePair {
                home: favored_shots,
                away: other_shots,
            },
            SidePair {
                home: favored_corners,
                away: other_corners,
            },
        )
    } else {
        (
            SidePair {
                home: other_shots,
                away: favored_shots,
            },
            SidePair {
                home: other_corners,
                away: favored_corners,
            },
        )
    };

    let home_rate = pick(config.sot_conversion_pct, rng);
    let away_rate = pick(config.sot_conversion_pct, rng);
    let shots_on_target = SidePair {
        home: shots.home * home_rate / 100,
        away: shots.away * away_rate / 100,
    };

    RawStats {
        shots,
        shots_on_target,
        corners,
    }
}

/// Estimate goals, corners, shots and fouls for a fixture.
///
/// With real averages each figure is the team's average with some jitter;
/// without them the figures are drawn from ranges that depend on how big
/// the favourite is. Fouls are always drawn from `fouls_range`.
pub fn synthesize<R: Rng + ?Sized>(
    home_team: &str,
    away_team: &str,
    probs: &ProbabilityTriple,
    mode: &StatsMode,
    config: &PredictorConfig,
    rng: &mut R,
) -> MatchStatistics {
    let band = classify(probs, config);
    // Level home/away probabilities favour the away side
    let home_favored = probs.home > probs.away;

    let (raw, origin) = match mode {
        StatsMode::Real { home, away } => {
            (from_averages(home, away, config, rng), StatsOrigin::Real)
        }
        StatsMode::Simulated => (
            simulate(band, home_favored, config, rng),
            StatsOrigin::Simulated,
        ),
    };

    let fouls = pick(config.fouls_range, rng);

    let expected_goals = raw.shots_on_target.home as f64 * config.home_sot_goal_weight
        + raw.shots_on_target.away as f64 * config.away_sot_goal_weight;

    let confidence = if band == Band::StrongFavorite {
        config.strong_goals_confidence
    } else {
        config.default_goals_confidence
    };

    let favored_team = if home_favored { home_team } else { away_team };
    let goals_leg = if expected_goals > config.bet_builder_goals_threshold {
        "Over 1.5 Goals"
    } else {
        "Under 3.5 Goals"
    };

    MatchStatistics {
        goals: GoalsPrediction {
            expected_goals,
            label: goals_label(expected_goals, config).to_string(),
            confidence,
        },
        corners: CornersEstimate {
            home: raw.corners.home,
            away: raw.corners.away,
            total: raw.corners.home + raw.corners.away,
        },
        shots: raw.shots,
        shots_on_target: raw.shots_on_target,
        fouls: format!("{} (Avg)", fouls),
        bet_builder: format!("{} to Win + {}", favored_team, goals_leg),
        origin,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn probs(home: u8, draw: u8, away: u8) -> ProbabilityTriple {
        ProbabilityTriple { home, draw, away }
    }

    fn averages(shots: f64, sot: f64, corners: f64) -> TeamAverages {
        TeamAverages {
            shots_per_game: shots,
            shots_on_target_per_game: sot,
            corners_per_game: corners,
            fouls_per_game: 11.0,
        }
    }

    fn fouls_value(label: &str) -> u32 {
        label.trim_end_matches(" (Avg)").parse().unwrap()
    }

    #[test]
    fn test_classify_bands() {
        let config = PredictorConfig::default();
        assert_eq!(classify(&probs(55, 20, 25), &config), Band::StrongFavorite);
        assert_eq!(classify(&probs(20, 20, 60), &config), Band::StrongFavorite);
        assert_eq!(classify(&probs(50, 25, 25), &config), Band::ModerateFavorite);
        assert_eq!(classify(&probs(46, 25, 29), &config), Band::ModerateFavorite);
        assert_eq!(classify(&probs(40, 25, 35), &config), Band::Balanced);
    }

    #[test]
    fn test_real_mode_jitter_stays_in_bounds() {
        let config = PredictorConfig::default();
        let mode = StatsMode::Real {
            home: averages(15.0, 6.0, 7.0),
            away: averages(15.0, 6.0, 7.0),
        };
        for seed in 0..500 {
            let mut rng = StdRng::seed_from_u64(seed);
            let stats = synthesize("Arsenal", "Chelsea", &probs(50, 25, 25), &mode, &config, &mut rng);
            assert_eq!(stats.origin, StatsOrigin::Real);
            for shots in [stats.shots.home, stats.shots.away] {
                assert!((13..=17).contains(&shots), "shots {} out of range", shots);
            }
            for sot in [stats.shots_on_target.home, stats.shots_on_target.away] {
                assert!((5..=7).contains(&sot), "sot {} out of range", sot);
            }
            assert_eq!(stats.corners.total, stats.corners.home + stats.corners.away);
            assert!((18..=26).contains(&fouls_value(&stats.fouls)));
        }
    }

    #[test]
    fn test_real_mode_fouls_ignore_averages() {
        let config = PredictorConfig::default();
        let mut heavy = averages(12.0, 4.0, 5.0);
        heavy.fouls_per_game = 40.0;
        let mode = StatsMode::Real {
            home: heavy,
            away: heavy,
        };
        for seed in 0..100 {
            let mut rng = StdRng::seed_from_u64(seed);
            let stats = synthesize("A", "B", &probs(40, 30, 30), &mode, &config, &mut rng);
            assert!((18..=26).contains(&fouls_value(&stats.fouls)));
        }
    }

    #[test]
    fn test_strong_favorite_band_skews_to_favorite() {
        let config = PredictorConfig::default();
        assert_eq!(classify(&probs(60, 10, 30), &config), Band::StrongFavorite);

        for seed in 0..300 {
            let mut rng = StdRng::seed_from_u64(seed);
            let home = synthesize("A", "B", &probs(60, 10, 30), &StatsMode::Simulated, &config, &mut rng);
            assert_eq!(home.origin, StatsOrigin::Simulated);
            assert!((14..=20).contains(&home.shots.home));
            assert!((5..=9).contains(&home.shots.away));
            assert!(home.shots.home > home.shots.away);
            assert!((6..=10).contains(&home.corners.home));
            assert!((2..=4).contains(&home.corners.away));

            let away = synthesize("A", "B", &probs(30, 10, 60), &StatsMode::Simulated, &config, &mut rng);
            assert!((5..=9).contains(&away.shots.home));
            assert!((14..=20).contains(&away.shots.away));
            assert!((2..=4).contains(&away.corners.home));
            assert!((6..=10).contains(&away.corners.away));
        }

        // Every favoured value beats every unfavoured one
        let band = config.strong_band;
        assert!(band.favored_shots.min > band.other_shots.max);
    }

    #[test]
    fn test_moderate_and_balanced_bands() {
        let config = PredictorConfig::default();
        for seed in 0..300 {
            let mut rng = StdRng::seed_from_u64(seed);
            let moderate =
                synthesize("A", "B", &probs(30, 25, 50), &StatsMode::Simulated, &config, &mut rng);
            assert!((7..=11).contains(&moderate.shots.home));
            assert!((12..=16).contains(&moderate.shots.away));
            assert!((3..=5).contains(&moderate.corners.home));
            assert!((5..=8).contains(&moderate.corners.away));

            let balanced =
                synthesize("A", "B", &probs(34, 30, 36), &StatsMode::Simulated, &config, &mut rng);
            assert!((10..=14).contains(&balanced.shots.home));
            assert!((9..=13).contains(&balanced.shots.away));
            assert!((4..=6).contains(&balanced.corners.home));
            assert!((3..=6).contains(&balanced.corners.away));
        }
    }

    #[test]
    fn test_simulated_shots_on_target_conversion() {
        let config = PredictorConfig::default();
        for seed in 0..300 {
            let mut rng = StdRng::seed_from_u64(seed);
            let stats = synthesize("A", "B", &probs(48, 27, 25), &StatsMode::Simulated, &config, &mut rng);
            for (shots, sot) in [
                (stats.shots.home, stats.shots_on_target.home),
                (stats.shots.away, stats.shots_on_target.away),
            ] {
                assert!(sot >= shots * 35 / 100);
                assert!(sot <= shots * 45 / 100);
            }
            let expected = stats.shots_on_target.home as f64 * 0.30
                + stats.shots_on_target.away as f64 * 0.25;
            assert_relative_eq!(stats.goals.expected_goals, expected, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_goals_label_threshold() {
        let config = PredictorConfig::default();
        assert_eq!(goals_label(2.7, &config), OVER_LABEL);
        assert_eq!(goals_label(2.6, &config), UNDER_LABEL);
        assert_eq!(goals_label(2.55, &config), UNDER_LABEL);
    }

    #[test]
    fn test_goals_confidence_and_bet_builder() {
        let config = PredictorConfig::default();
        // Fixed averages with no jitter make the figures exact
        let config = PredictorConfig {
            stat_jitter: 0.0,
            ..config
        };
        let mode = StatsMode::Real {
            home: averages(18.0, 7.0, 8.0),
            away: averages(12.0, 5.0, 4.0),
        };
        let mut rng = StdRng::seed_from_u64(7);

        let strong = synthesize("Man City", "Fulham", &probs(71, 18, 11), &mode, &config, &mut rng);
        assert_eq!(strong.goals.confidence, 75);
        assert_relative_eq!(strong.goals.expected_goals, 7.0 * 0.30 + 5.0 * 0.25, epsilon = 1e-12);
        assert_eq!(strong.goals.label, OVER_LABEL);
        assert!(strong.goals.is_over());
        assert_eq!(strong.bet_builder, "Man City to Win + Over 1.5 Goals");
        assert_eq!(strong.corners, CornersEstimate { home: 8, away: 4, total: 12 });

        let quiet = StatsMode::Real {
            home: averages(9.0, 3.0, 4.0),
            away: averages(8.0, 2.0, 3.0),
        };
        let close = synthesize("Everton", "Wolves", &probs(30, 30, 40), &quiet, &config, &mut rng);
        assert_eq!(close.goals.confidence, 60);
        assert_eq!(close.goals.label, UNDER_LABEL);
        assert_eq!(close.bet_builder, "Wolves to Win + Under 3.5 Goals");
    }

    #[test]
    fn test_bet_builder_names_away_side_on_level_probabilities() {
        let config = PredictorConfig::default();
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let stats = synthesize(
                "Brentford",
                "Fulham",
                &probs(38, 24, 38),
                &StatsMode::Simulated,
                &config,
                &mut rng,
            );
            assert!(stats.bet_builder.starts_with("Fulham to Win + "));
            // Balanced ranges still go to the home side
            assert!((10..=14).contains(&stats.shots.home));
        }
    }
}
