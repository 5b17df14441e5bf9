pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod scrapers;
pub mod utils;

pub use api::*;
pub use models::*;
pub use scrapers::*;
pub use utils::*;

use anyhow::{Context, Result};
use api::odds_api::OddsApiClient;
use api::stats_api::StatsClient;
use chrono::{DateTime, Utc};
use config::{PredictorConfig, Settings};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::{RwLock, RwLockReadGuard};
use tracing::{debug, info, warn};
use utils::data::{load_from_cache, save_to_cache};
use utils::match_analysis::predict_fixtures;
use utils::recommendations::{compose, RecommendedBet};

/// Everything one fetch cycle produces
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionData {
    pub league: League,
    pub generated_at: DateTime<Utc>,
    pub stats_available: bool,
    pub stats_last_updated: Option<String>,
    pub predictions: Vec<MatchPrediction>,
    pub recommended_bets: Vec<RecommendedBet>,
    /// Fixtures dropped for bad odds, missing outcomes or missing names
    pub skipped_fixtures: usize,
    /// Set when the odds source failed and this cycle has no fixtures
    pub upstream_error: Option<String>,
}

impl PredictionData {
    pub fn is_empty(&self) -> bool {
        self.predictions.is_empty()
    }
}

/// The latest published fetch cycle. Every cycle takes a generation number
/// when it starts, and only the newest generation may publish.
#[derive(Debug, Default)]
pub struct PredictionStore {
    data: RwLock<Option<PredictionData>>,
    generation: AtomicU64,
}

impl PredictionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_cycle(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Publish a finished cycle; returns whether it replaced the current data.
    /// A cycle overtaken by a newer one is discarded, as is a failed cycle.
    pub async fn publish(&self, generation: u64, result: Result<PredictionData>) -> bool {
        // Checked under the write lock so a stale cycle can't slip in
        let mut data = self.data.write().await;
        if self.generation.load(Ordering::SeqCst) != generation {
            debug!("Discarding fetch cycle {}: a newer one was started", generation);
            return false;
        }
        match result {
            Ok(fresh) => {
                info!(
                    "Published fetch cycle {} ({} fixtures)",
                    generation,
                    fresh.predictions.len()
                );
                *data = Some(fresh);
                true
            }
            Err(e) => {
                warn!("Fetch cycle {} failed: {:#}", generation, e);
                false
            }
        }
    }

    pub async fn current(&self) -> RwLockReadGuard<'_, Option<PredictionData>> {
        self.data.read().await
    }
}

type FixturesWithOdds = Vec<(Fixture, Vec<BookmakerOdds>)>;

async fn fetch_fixtures(settings: &Settings, odds_client: &OddsApiClient) -> Result<FixturesWithOdds> {
    let fixtures = odds_client
        .fetch_fixtures(settings.league, settings.days_ahead)
        .await
        .with_context(|| format!("Failed to fetch {} odds", settings.league))?;

    let cache_file = settings.odds_cache_file();
    match save_to_cache(&fixtures, &cache_file) {
        Ok(()) => info!("Saved odds to cache file: {}", cache_file),
        Err(e) => warn!("Could not cache odds: {:#}", e),
    }
    Ok(fixtures)
}

/// Run a full fetch cycle: odds, team statistics, predictions and bets
pub async fn fetch_all_prediction_data(
    settings: &Settings,
    config: &PredictorConfig,
) -> Result<PredictionData> {
    let cache_file = settings.odds_cache_file();

    // An unreachable odds source only empties this cycle
    let (games_with_odds, upstream_error) =
        if settings.use_cache && Path::new(&cache_file).exists() {
            info!("Loading odds from cache file: {}", cache_file);
            match load_from_cache::<FixturesWithOdds>(&cache_file)
                .with_context(|| format!("Failed to load cached odds from {}", cache_file))
            {
                Ok(fixtures) => (fixtures, None),
                Err(e) => {
                    warn!("No odds this cycle: {:#}", e);
                    (Vec::new(), Some(format!("{:#}", e)))
                }
            }
        } else {
            let api_key = settings
                .odds_api_key
                .clone()
                .context("ODDS_API_KEY not set in .env file")?;
            let odds_client = OddsApiClient::new(api_key);
            match fetch_fixtures(settings, &odds_client).await {
                Ok(fixtures) => (fixtures, None),
                Err(e) => {
                    warn!("No odds this cycle: {:#}", e);
                    (Vec::new(), Some(format!("{:#}", e)))
                }
            }
        };

    let stats_client = StatsClient::new(
        settings.stats_source.clone(),
        Duration::from_secs(settings.stats_timeout_secs),
    )?;
    let stats = stats_client.load().await;

    let mut rng = match settings.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let (predictions, skipped_fixtures) =
        predict_fixtures(&games_with_odds, &stats, config, &mut rng);
    let recommended_bets = compose(&predictions, config);

    if predictions.is_empty() {
        info!("No predictions for {} this cycle", settings.league);
    } else {
        info!(
            "Predicted {} fixtures ({} skipped), {} recommended bets",
            predictions.len(),
            skipped_fixtures,
            recommended_bets.len()
        );
    }

    Ok(PredictionData {
        league: settings.league,
        generated_at: Utc::now(),
        stats_available: stats.is_available(),
        stats_last_updated: stats.last_updated().map(str::to_string),
        predictions,
        recommended_bets,
        skipped_fixtures,
        upstream_error,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cycle(league: League) -> PredictionData {
        PredictionData {
            league,
            generated_at: Utc::now(),
            stats_available: false,
            stats_last_updated: None,
            predictions: Vec::new(),
            recommended_bets: Vec::new(),
            skipped_fixtures: 0,
            upstream_error: None,
        }
    }

    fn settings(cache_dir: &str) -> Settings {
        Settings {
            odds_api_key: None,
            league: League::PremierLeague,
            stats_source: "does/not/exist/teamStats.json".to_string(),
            stats_timeout_secs: 1,
            days_ahead: 7,
            use_cache: true,
            cache_dir: cache_dir.to_string(),
            seed: Some(1),
            config: None,
        }
    }

    #[tokio::test]
    async fn test_stale_cycle_is_discarded() {
        let store = PredictionStore::new();
        let first = store.begin_cycle();
        let second = store.begin_cycle();

        assert!(store.publish(second, Ok(cycle(League::LaLiga))).await);
        // The older cycle finishes last and must not overwrite the newer one
        assert!(!store.publish(first, Ok(cycle(League::PremierLeague))).await);

        let current = store.current().await;
        assert_eq!(current.as_ref().map(|d| d.league), Some(League::LaLiga));
    }

    #[tokio::test]
    async fn test_failed_cycle_keeps_previous_data() {
        let store = PredictionStore::new();
        let first = store.begin_cycle();
        assert!(store.publish(first, Ok(cycle(League::SerieA))).await);

        let second = store.begin_cycle();
        assert!(!store.publish(second, Err(anyhow::anyhow!("odds source down"))).await);

        let current = store.current().await;
        assert_eq!(current.as_ref().map(|d| d.league), Some(League::SerieA));
    }

    #[tokio::test]
    async fn test_corrupt_cache_gives_empty_cycle() {
        let cache_dir = std::env::temp_dir()
            .join(format!("football_predictor_corrupt_{}", std::process::id()))
            .to_string_lossy()
            .into_owned();
        let settings = settings(&cache_dir);
        std::fs::create_dir_all(&cache_dir).unwrap();
        std::fs::write(settings.odds_cache_file(), "{").unwrap();

        let data = fetch_all_prediction_data(&settings, &PredictorConfig::default())
            .await
            .unwrap();
        std::fs::remove_dir_all(&cache_dir).ok();

        assert!(data.is_empty());
        assert!(data.recommended_bets.is_empty());
        assert!(!data.stats_available);
        let error = data.upstream_error.unwrap_or_default();
        assert!(error.contains("cached odds"), "unexpected error: {}", error);
    }
}
