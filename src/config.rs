use crate::models::League;
use anyhow::{Context, Result};
use clap::Args;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Runtime settings shared by the `cli` and `web` binaries
#[derive(Args, Debug, Clone)]
pub struct Settings {
    /// The Odds API key (not needed when serving odds from the cache)
    #[arg(long, env = "ODDS_API_KEY", hide_env_values = true)]
    pub odds_api_key: Option<String>,

    /// Competition to fetch fixtures for
    #[arg(long, env = "LEAGUE", value_enum, default_value = "premier-league")]
    pub league: League,

    /// Team statistics document: a local path or an http(s) URL
    #[arg(long, env = "STATS_SOURCE", default_value = "static/teamStats.json")]
    pub stats_source: String,

    /// Seconds to wait for a remote statistics document before simulating
    #[arg(long, env = "STATS_TIMEOUT_SECS", default_value = "10")]
    pub stats_timeout_secs: u64,

    /// Only keep fixtures kicking off within this many days
    #[arg(
        long,
        env = "DAYS_AHEAD",
        default_value = "7",
        value_parser = clap::value_parser!(i64).range(0..=365)
    )]
    pub days_ahead: i64,

    /// Serve odds from the JSON cache when it exists
    #[arg(
        long,
        env = "USE_CACHE",
        default_value = "false",
        value_parser = clap::builder::FalseyValueParser::new()
    )]
    pub use_cache: bool,

    /// Directory for cached odds and CSV exports
    #[arg(long, env = "CACHE_DIR", default_value = "cache")]
    pub cache_dir: String,

    /// Seed for the statistics random source; omit for fresh randomness
    #[arg(long, env = "PREDICTOR_SEED")]
    pub seed: Option<u64>,

    /// JSON file overriding the prediction heuristics
    #[arg(long, env = "PREDICTOR_CONFIG")]
    pub config: Option<String>,
}

impl Settings {
    pub fn odds_cache_file(&self) -> String {
        format!("{}/{}_odds_cache.json", self.cache_dir, self.league.sport_key())
    }

    pub fn load_predictor_config(&self) -> Result<PredictorConfig> {
        match &self.config {
            Some(path) => PredictorConfig::from_file(path),
            None => Ok(PredictorConfig::default()),
        }
    }
}

/// An inclusive integer range for simulated statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatRange {
    pub min: u32,
    pub max: u32,
}

impl StatRange {
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }
}

/// Shot and corner ranges for one probability-gap band. `favored_*` apply to
/// the side with the higher win probability; in the balanced band they apply
/// to the home side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BandRanges {
    pub favored_shots: StatRange,
    pub other_shots: StatRange,
    pub favored_corners: StatRange,
    pub other_corners: StatRange,
}

/// Tunable heuristics behind every prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictorConfig {
    /// Minimum percentage for a straight home or away win tip
    pub win_threshold: u8,
    /// Minimum percentage for a draw tip when the draw is the favourite
    pub draw_threshold: u8,

    /// Home/away gap above which a side is a strong favourite
    pub strong_favorite_gap: u8,
    /// Home/away gap above which a side is a moderate favourite
    pub moderate_favorite_gap: u8,

    /// Multiplicative jitter applied to real averages (0.15 = ±15%)
    pub stat_jitter: f64,
    pub fouls_range: StatRange,
    /// Shots-on-target conversion rate range, in percent
    pub sot_conversion_pct: StatRange,
    pub strong_band: BandRanges,
    pub moderate_band: BandRanges,
    pub balanced_band: BandRanges,

    pub home_sot_goal_weight: f64,
    pub away_sot_goal_weight: f64,
    /// Expected goals above which the "Over 2.5 Goals" label is used
    pub over_goals_threshold: f64,
    /// Expected goals above which the bet builder pairs the win with "Over 1.5"
    pub bet_builder_goals_threshold: f64,
    pub strong_goals_confidence: u8,
    pub default_goals_confidence: u8,

    pub banker_stake: f64,
    pub value_acca_stake: f64,
    /// The value accumulator stops before its combined odds reach this
    pub value_acca_ceiling: f64,
    /// Scales the weakest leg's confidence to get the accumulator's
    pub value_acca_damping: f64,
    pub goals_acca_stake: f64,
    pub goals_acca_max_legs: usize,
    /// Estimated decimal price of a single "Over 2.5 Goals" leg
    pub goals_leg_estimated_odds: f64,
    pub currency_symbol: String,
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            win_threshold: 45,
            draw_threshold: 30,
            strong_favorite_gap: 25,
            moderate_favorite_gap: 15,
            stat_jitter: 0.15,
            fouls_range: StatRange::new(18, 26),
            sot_conversion_pct: StatRange::new(35, 45),
            strong_band: BandRanges {
                favored_shots: StatRange::new(14, 20),
                other_shots: StatRange::new(5, 9),
                favored_corners: StatRange::new(6, 10),
                other_corners: StatRange::new(2, 4),
            },
            moderate_band: BandRanges {
                favored_shots: StatRange::new(12, 16),
                other_shots: StatRange::new(7, 11),
                favored_corners: StatRange::new(5, 8),
                other_corners: StatRange::new(3, 5),
            },
            balanced_band: BandRanges {
                favored_shots: StatRange::new(10, 14),
                other_shots: StatRange::new(9, 13),
                favored_corners: StatRange::new(4, 6),
                other_corners: StatRange::new(3, 6),
            },
            home_sot_goal_weight: 0.30,
            away_sot_goal_weight: 0.25,
            over_goals_threshold: 2.6,
            bet_builder_goals_threshold: 2.2,
            strong_goals_confidence: 75,
            default_goals_confidence: 60,
            banker_stake: 20.0,
            value_acca_stake: 10.0,
            value_acca_ceiling: 5.5,
            value_acca_damping: 0.9,
            goals_acca_stake: 5.0,
            goals_acca_max_legs: 3,
            goals_leg_estimated_odds: 1.72,
            currency_symbol: "£".to_string(),
        }
    }
}

impl PredictorConfig {
    /// Load overrides from a JSON file; missing keys keep their defaults
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read predictor config {}", path.display()))?;
        let config: PredictorConfig =
            serde_json::from_str(&json).context("Failed to parse predictor config")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.win_threshold > 100 || self.draw_threshold > 100 {
            anyhow::bail!("tip thresholds must be percentages between 0 and 100");
        }
        if self.moderate_favorite_gap > self.strong_favorite_gap {
            anyhow::bail!("moderate_favorite_gap must not exceed strong_favorite_gap");
        }
        if !(0.0..1.0).contains(&self.stat_jitter) {
            anyhow::bail!("stat_jitter must be between 0.0 and 1.0");
        }
        let ranges = [
            self.fouls_range,
            self.sot_conversion_pct,
            self.strong_band.favored_shots,
            self.strong_band.other_shots,
            self.strong_band.favored_corners,
            self.strong_band.other_corners,
            self.moderate_band.favored_shots,
            self.moderate_band.other_shots,
            self.moderate_band.favored_corners,
            self.moderate_band.other_corners,
            self.balanced_band.favored_shots,
            self.balanced_band.other_shots,
            self.balanced_band.favored_corners,
            self.balanced_band.other_corners,
        ];
        if ranges.iter().any(|r| r.min > r.max) {
            anyhow::bail!("every statistics range needs min <= max");
        }
        if self.sot_conversion_pct.max > 100 {
            anyhow::bail!("sot_conversion_pct must be a percentage");
        }
        if self.value_acca_ceiling <= 1.0 {
            anyhow::bail!("value_acca_ceiling must be greater than 1.0");
        }
        if !(0.0..=1.0).contains(&self.value_acca_damping) {
            anyhow::bail!("value_acca_damping must be between 0.0 and 1.0");
        }
        if self.goals_leg_estimated_odds <= 1.0 {
            anyhow::bail!("goals_leg_estimated_odds must be greater than 1.0");
        }
        if self.banker_stake <= 0.0 || self.value_acca_stake <= 0.0 || self.goals_acca_stake <= 0.0
        {
            anyhow::bail!("stakes must be positive");
        }
        Ok(())
    }
}
