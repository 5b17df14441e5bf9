use crate::models::{League, TeamStatsDocument};
use crate::scrapers::team_stats::canonical_team_name;
use crate::utils::match_stats::StatsMode;
use anyhow::{Context, Result};
use std::time::Duration;
use tracing::{info, warn};

/// The team statistics available for a fetch cycle
#[derive(Debug, Clone)]
pub enum StatsSource {
    Available(TeamStatsDocument),
    /// No document this cycle; every fixture is simulated
    Unavailable,
}

impl StatsSource {
    /// Real averages when both sides are in the document, otherwise simulate
    pub fn mode_for(&self, league: League, home_team: &str, away_team: &str) -> StatsMode {
        let StatsSource::Available(document) = self else {
            return StatsMode::Simulated;
        };

        let home = document.team(league, canonical_team_name(home_team));
        let away = document.team(league, canonical_team_name(away_team));
        match (home, away) {
            (Some(home), Some(away)) => StatsMode::Real {
                home: home.home,
                away: away.away,
            },
            _ => {
                warn!(
                    "No stats for {} v {}, using simulated figures",
                    home_team, away_team
                );
                StatsMode::Simulated
            }
        }
    }

    pub fn last_updated(&self) -> Option<&str> {
        match self {
            StatsSource::Available(document) => Some(document.last_updated.as_str()),
            StatsSource::Unavailable => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, StatsSource::Available(_))
    }
}

/// Loads the team statistics document from a local path or an http(s) URL
pub struct StatsClient {
    source: String,
    client: reqwest::Client,
}

impl StatsClient {
    pub fn new(source: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            source: source.into(),
            client,
        })
    }

    async fn fetch_document(&self) -> Result<TeamStatsDocument> {
        let json = if self.source.starts_with("http://") || self.source.starts_with("https://") {
            let response = self
                .client
                .get(&self.source)
                .send()
                .await
                .context("Failed to fetch team stats")?;
            if !response.status().is_success() {
                anyhow::bail!("Team stats request returned {}", response.status());
            }
            response.text().await.context("Failed to read team stats")?
        } else {
            tokio::fs::read_to_string(&self.source)
                .await
                .with_context(|| format!("Failed to read {}", self.source))?
        };

        serde_json::from_str(&json).context("Failed to parse team stats document")
    }

    /// Never fails: any problem loading the document means simulated stats
    pub async fn load(&self) -> StatsSource {
        match self.fetch_document().await {
            Ok(document) => {
                info!(
                    "Loaded real team statistics for {} teams (last updated {})",
                    document.team_count(),
                    document.last_updated
                );
                StatsSource::Available(document)
            }
            Err(e) => {
                warn!("Could not load team stats, using simulated data: {:#}", e);
                StatsSource::Unavailable
            }
        }
    }
}
