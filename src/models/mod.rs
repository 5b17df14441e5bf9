use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Competitions we can pull odds for. The odds API sport key doubles as the
/// league key inside the team statistics document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
pub enum League {
    PremierLeague,
    Championship,
    LaLiga,
    SerieA,
    Bundesliga,
    Ligue1,
}

impl League {
    pub fn sport_key(&self) -> &'static str {
        match self {
            League::PremierLeague => "soccer_epl",
            League::Championship => "soccer_efl_champ",
            League::LaLiga => "soccer_spain_la_liga",
            League::SerieA => "soccer_italy_serie_a",
            League::Bundesliga => "soccer_germany_bundesliga",
            League::Ligue1 => "soccer_france_ligue_one",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            League::PremierLeague => "Premier League",
            League::Championship => "Championship",
            League::LaLiga => "La Liga",
            League::SerieA => "Serie A",
            League::Bundesliga => "Bundesliga",
            League::Ligue1 => "Ligue 1",
        }
    }
}

impl fmt::Display for League {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// A scheduled football fixture
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fixture {
    pub id: String,
    pub home_team: String,
    pub away_team: String,
    pub commence_time: DateTime<Utc>,
    pub league: League,
}

impl Fixture {
    pub fn title(&self) -> String {
        format!("{} v {}", self.home_team, self.away_team)
    }
}

/// One outcome of a bookmaker's head-to-head market
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutcomePrice {
    pub name: String,
    pub price: f64, // Decimal odds (e.g. 1.95)
}

/// Head-to-head prices from a single bookmaker
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookmakerOdds {
    pub fixture_id: String,
    pub bookmaker: String,
    pub last_update: DateTime<Utc>,
    pub h2h: Vec<OutcomePrice>,
}

/// Decimal odds for the three match outcomes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OddsTriple {
    pub home: f64,
    pub draw: f64,
    pub away: f64,
}

/// Normalized outcome probabilities as whole percentages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbabilityTriple {
    pub home: u8,
    pub draw: u8,
    pub away: u8,
}

impl ProbabilityTriple {
    /// Absolute difference between the home and away percentages
    pub fn gap(&self) -> u8 {
        self.home.abs_diff(self.away)
    }

    pub fn sum(&self) -> u16 {
        self.home as u16 + self.draw as u16 + self.away as u16
    }
}

/// A single match-result selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tip {
    pub label: String,
    pub confidence: u8,
    pub reference_odd: f64,
}

/// Per-game averages for one team, either at home or away
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamAverages {
    pub shots_per_game: f64,
    pub shots_on_target_per_game: f64,
    pub corners_per_game: f64,
    pub fouls_per_game: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TeamRecord {
    pub home: TeamAverages,
    pub away: TeamAverages,
}

/// The static team statistics document
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamStatsDocument {
    pub last_updated: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_source: Option<String>,
    pub leagues: HashMap<String, HashMap<String, TeamRecord>>,
}

impl TeamStatsDocument {
    pub fn team(&self, league: League, team: &str) -> Option<&TeamRecord> {
        self.leagues.get(league.sport_key())?.get(team)
    }

    pub fn team_count(&self) -> usize {
        self.leagues.values().map(HashMap::len).sum()
    }
}

/// Where the statistics behind a prediction came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatsOrigin {
    Real,
    Simulated,
}

impl fmt::Display for StatsOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatsOrigin::Real => f.write_str("real"),
            StatsOrigin::Simulated => f.write_str("simulated"),
        }
    }
}

/// A home/away pair of integer estimates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SidePair {
    pub home: u32,
    pub away: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CornersEstimate {
    pub home: u32,
    pub away: u32,
    pub total: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalsPrediction {
    pub expected_goals: f64,
    pub label: String,
    pub confidence: u8,
}

impl GoalsPrediction {
    pub fn is_over(&self) -> bool {
        self.label == crate::utils::match_stats::OVER_LABEL
    }
}

/// Goals, corners, shots and fouls for a fixture
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchStatistics {
    pub goals: GoalsPrediction,
    pub corners: CornersEstimate,
    pub shots: SidePair,
    pub shots_on_target: SidePair,
    pub fouls: String,
    pub bet_builder: String,
    pub origin: StatsOrigin,
}

/// Everything we predict for a single fixture in one fetch cycle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchPrediction {
    pub fixture: Fixture,
    pub bookmaker: String,
    pub odds: OddsTriple,
    pub probabilities: ProbabilityTriple,
    pub tip: Tip,
    pub stats: MatchStatistics,
}
