use crate::models::{BookmakerOdds, Fixture, League, OutcomePrice};
use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use tracing::info;

const ODDS_API_BASE_URL: &str = "https://api.the-odds-api.com/v4";

/// Response from The Odds API for a single fixture
#[derive(Debug, Deserialize)]
struct OddsApiGame {
    id: String,
    commence_time: DateTime<Utc>,
    home_team: String,
    away_team: String,
    #[serde(default)]
    bookmakers: Vec<OddsApiBookmaker>,
}

/// Bookmaker data from The Odds API
#[derive(Debug, Deserialize)]
struct OddsApiBookmaker {
    title: String,
    last_update: DateTime<Utc>,
    markets: Vec<OddsApiMarket>,
}

/// Market data (h2h for 1X2 football) from The Odds API
#[derive(Debug, Deserialize)]
struct OddsApiMarket {
    key: String,
    outcomes: Vec<OddsApiOutcome>,
}

#[derive(Debug, Deserialize)]
struct OddsApiOutcome {
    name: String,
    price: f64,
}

/// Remaining and used request counts reported by The Odds API
#[derive(Debug, Clone, Default)]
pub struct ApiUsage {
    pub remaining: Option<String>,
    pub used: Option<String>,
}

pub struct OddsApiClient {
    api_key: String,
    client: reqwest::Client,
    base_url: String,
}

impl OddsApiClient {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            client: reqwest::Client::new(),
            base_url: ODDS_API_BASE_URL.to_string(),
        }
    }

    /// Fetch upcoming fixtures with decimal 1X2 odds for a league
    /// Only returns fixtures that kick off in the future and within `days_ahead` days
    pub async fn fetch_fixtures(
        &self,
        league: League,
        days_ahead: i64,
    ) -> Result<Vec<(Fixture, Vec<BookmakerOdds>)>> {
        let url = format!("{}/sports/{}/odds", self.base_url, league.sport_key());

        let response = self
            .client
            .get(&url)
            .query(&[
                ("apiKey", self.api_key.as_str()),
                ("regions", "uk"),
                ("markets", "h2h"), // h2h = 1X2 for football
                ("oddsFormat", "decimal"),
            ])
            .send()
            .await
            .context("Failed to fetch odds from The Odds API")?;

        if !response.status().is_success() {
            anyhow::bail!("Odds API returned error: {}", response.status());
        }

        let api_games: Vec<OddsApiGame> = response
            .json()
            .await
            .context("Failed to parse Odds API response")?;

        let fixtures = convert_games(api_games, league, Utc::now(), days_ahead);
        info!("Fetched {} {} fixtures", fixtures.len(), league);
        Ok(fixtures)
    }

    /// Check how many API requests you have remaining
    pub async fn check_usage(&self) -> Result<ApiUsage> {
        let url = format!("{}/sports", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[("apiKey", self.api_key.as_str())])
            .send()
            .await
            .context("Failed to query Odds API usage")?;

        let header = |name: &str| {
            response
                .headers()
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string)
        };

        Ok(ApiUsage {
            remaining: header("x-requests-remaining"),
            used: header("x-requests-used"),
        })
    }
}

fn convert_games(
    api_games: Vec<OddsApiGame>,
    league: League,
    now: DateTime<Utc>,
    days_ahead: i64,
) -> Vec<(Fixture, Vec<BookmakerOdds>)> {
    // A window too large for chrono has no upper bound
    let horizon = Duration::try_days(days_ahead).and_then(|window| now.checked_add_signed(window));

    api_games
        .into_iter()
        .filter(|api_game| {
            api_game.commence_time > now
                && horizon.map_or(true, |horizon| api_game.commence_time <= horizon)
        })
        .map(|api_game| {
            let fixture = Fixture {
                id: api_game.id.clone(),
                home_team: api_game.home_team,
                away_team: api_game.away_team,
                commence_time: api_game.commence_time,
                league,
            };

            let odds: Vec<BookmakerOdds> = api_game
                .bookmakers
                .into_iter()
                .filter_map(|bookmaker| {
                    let h2h_market = bookmaker.markets.into_iter().find(|m| m.key == "h2h")?;

                    Some(BookmakerOdds {
                        fixture_id: api_game.id.clone(),
                        bookmaker: bookmaker.title,
                        last_update: bookmaker.last_update,
                        h2h: h2h_market
                            .outcomes
                            .into_iter()
                            .map(|outcome| OutcomePrice {
                                name: outcome.name,
                                price: outcome.price,
                            })
                            .collect(),
                    })
                })
                .collect();

            (fixture, odds)
        })
        .collect()
}
