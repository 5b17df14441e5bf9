use crate::models::{League, TeamAverages, TeamRecord, TeamStatsDocument};
use crate::utils::data::save_to_cache;
use anyhow::{Context, Result};
use chrono::Utc;
use scraper::{Html, Selector};
use std::collections::HashMap;

pub const SQUAD_SHOOTING_URL: &str = "https://fbref.com/en/comps/9/shooting/Premier-League-Stats";
pub const SEASON: &str = "2025-26";

/// Bookmaker and short names mapped to the names used in the stats document
const TEAM_ALIASES: &[(&str, &str)] = &[
    ("Man Utd", "Manchester United"),
    ("Manchester Utd", "Manchester United"),
    ("Man City", "Manchester City"),
    ("Spurs", "Tottenham Hotspur"),
    ("Tottenham", "Tottenham Hotspur"),
    ("Wolves", "Wolverhampton Wanderers"),
    ("Newcastle", "Newcastle United"),
    ("Newcastle Utd", "Newcastle United"),
    ("West Ham", "West Ham United"),
    ("Brighton", "Brighton & Hove Albion"),
    ("Brighton and Hove Albion", "Brighton & Hove Albion"),
    ("Nott'm Forest", "Nottingham Forest"),
    ("Nott'ham Forest", "Nottingham Forest"),
    ("Leicester", "Leicester City"),
    ("Ipswich", "Ipswich Town"),
];

/// Map a team name to its canonical stats-document name
pub fn canonical_team_name(name: &str) -> &str {
    let name = name.trim();
    TEAM_ALIASES
        .iter()
        .find(|(alias, _)| *alias == name)
        .map(|(_, canonical)| *canonical)
        .unwrap_or(name)
}

// (team, home: shots, sot, corners, fouls, away: shots, sot, corners, fouls)
type CuratedRow = (&'static str, [f64; 4], [f64; 4]);

/// Typical Premier League per-game averages
const CURATED_PREMIER_LEAGUE: &[CuratedRow] = &[
    ("Arsenal", [17.0, 6.5, 7.0, 10.0], [15.0, 5.8, 6.0, 11.0]),
    ("Liverpool", [18.0, 7.0, 7.5, 9.0], [16.0, 6.2, 6.5, 10.0]),
    ("Manchester City", [19.0, 7.2, 8.0, 10.0], [17.0, 6.5, 7.0, 11.0]),
    ("Chelsea", [15.0, 5.5, 6.5, 11.0], [13.0, 4.8, 5.5, 12.0]),
    ("Tottenham Hotspur", [16.0, 6.0, 6.8, 10.0], [14.0, 5.2, 5.8, 11.0]),
    ("Manchester United", [14.0, 5.2, 6.0, 11.0], [12.0, 4.5, 5.0, 12.0]),
    ("Newcastle United", [13.0, 4.8, 5.5, 11.0], [11.0, 4.0, 4.5, 12.0]),
    ("Aston Villa", [14.0, 5.0, 6.0, 11.0], [12.0, 4.3, 5.0, 12.0]),
    ("Brighton & Hove Albion", [13.0, 4.8, 5.5, 10.0], [11.0, 4.0, 4.5, 11.0]),
    ("West Ham United", [12.0, 4.5, 5.5, 12.0], [10.0, 3.8, 4.5, 13.0]),
    ("Brentford", [12.0, 4.5, 5.0, 12.0], [10.0, 3.8, 4.2, 13.0]),
    ("Fulham", [11.0, 4.2, 5.0, 12.0], [9.0, 3.5, 4.0, 13.0]),
    ("Crystal Palace", [11.0, 4.0, 5.0, 12.0], [9.0, 3.3, 4.0, 13.0]),
    ("Bournemouth", [11.0, 4.0, 5.0, 12.0], [9.0, 3.3, 4.0, 13.0]),
    ("Nottingham Forest", [10.0, 3.8, 4.5, 13.0], [8.0, 3.0, 3.5, 14.0]),
    ("Everton", [10.0, 3.5, 4.5, 13.0], [8.0, 2.8, 3.5, 14.0]),
    ("Leicester City", [10.0, 3.5, 4.5, 13.0], [8.0, 2.8, 3.5, 14.0]),
    ("Ipswich Town", [9.0, 3.2, 4.0, 13.0], [7.0, 2.5, 3.0, 14.0]),
    ("Wolverhampton Wanderers", [9.0, 3.2, 4.0, 13.0], [7.0, 2.5, 3.0, 14.0]),
    ("Southampton", [9.0, 3.0, 4.0, 13.0], [7.0, 2.3, 3.0, 14.0]),
];

fn to_averages(values: [f64; 4]) -> TeamAverages {
    TeamAverages {
        shots_per_game: values[0],
        shots_on_target_per_game: values[1],
        corners_per_game: values[2],
        fouls_per_game: values[3],
    }
}

pub fn curated_premier_league() -> HashMap<String, TeamRecord> {
    CURATED_PREMIER_LEAGUE
        .iter()
        .map(|(team, home, away)| {
            (
                team.to_string(),
                TeamRecord {
                    home: to_averages(*home),
                    away: to_averages(*away),
                },
            )
        })
        .collect()
}

/// Season-wide shooting figures for a squad
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SquadShooting {
    pub shots_per_game: f64,
    pub shots_on_target_per_game: f64,
}

pub struct TeamStatsScraper {
    client: reqwest::Client,
}

impl TeamStatsScraper {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36")
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client })
    }

    /// Scrape the squad shooting table
    pub async fn fetch_squad_shooting(&self, url: &str) -> Result<HashMap<String, SquadShooting>> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("Failed to fetch squad shooting page")?;
        if !response.status().is_success() {
            anyhow::bail!("Squad shooting page returned {}", response.status());
        }
        let html = response.text().await?;

        parse_squad_shooting(&html)
    }
}

/// Parse rows of a squad shooting table keyed by `data-stat` cells
pub fn parse_squad_shooting(html: &str) -> Result<HashMap<String, SquadShooting>> {
    let document = Html::parse_document(html);
    let row_selector = Selector::parse("table tbody tr")
        .ok()
        .context("Invalid row selector")?;
    let team_selector = Selector::parse(r#"[data-stat="team"]"#)
        .ok()
        .context("Invalid team selector")?;
    let shots_selector = Selector::parse(r#"[data-stat="shots_per90"]"#)
        .ok()
        .context("Invalid shots selector")?;
    let sot_selector = Selector::parse(r#"[data-stat="shots_on_target_per90"]"#)
        .ok()
        .context("Invalid shots on target selector")?;

    let mut squads = HashMap::new();
    for row in document.select(&row_selector) {
        let cell_text = |selector: &Selector| {
            row.select(selector)
                .next()
                .map(|cell| cell.text().collect::<String>().trim().to_string())
        };

        let Some(team) = cell_text(&team_selector).filter(|t| !t.is_empty()) else {
            continue;
        };
        let shots = cell_text(&shots_selector).and_then(|s| s.parse::<f64>().ok());
        let sot = cell_text(&sot_selector).and_then(|s| s.parse::<f64>().ok());

        if let (Some(shots_per_game), Some(shots_on_target_per_game)) = (shots, sot) {
            squads.insert(
                canonical_team_name(&team).to_string(),
                SquadShooting {
                    shots_per_game,
                    shots_on_target_per_game,
                },
            );
        }
    }

    Ok(squads)
}

/// Rescale a team's curated home/away split so its mean matches the scraped
/// season average. Corners and fouls keep their curated values.
pub fn apply_squad_shooting(
    teams: &mut HashMap<String, TeamRecord>,
    scraped: &HashMap<String, SquadShooting>,
) -> usize {
    let mut updated = 0;
    for (team, record) in teams.iter_mut() {
        let Some(shooting) = scraped.get(team) else {
            continue;
        };

        let shots_mean = (record.home.shots_per_game + record.away.shots_per_game) / 2.0;
        let sot_mean =
            (record.home.shots_on_target_per_game + record.away.shots_on_target_per_game) / 2.0;
        if shots_mean <= 0.0 || sot_mean <= 0.0 {
            continue;
        }

        let shots_scale = shooting.shots_per_game / shots_mean;
        let sot_scale = shooting.shots_on_target_per_game / sot_mean;
        for side in [&mut record.home, &mut record.away] {
            side.shots_per_game = round1(side.shots_per_game * shots_scale);
            side.shots_on_target_per_game = round1(side.shots_on_target_per_game * sot_scale);
        }
        updated += 1;
    }
    updated
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

pub fn build_document(
    league: League,
    teams: HashMap<String, TeamRecord>,
    data_source: &str,
) -> TeamStatsDocument {
    let mut leagues = HashMap::new();
    leagues.insert(league.sport_key().to_string(), teams);
    TeamStatsDocument {
        last_updated: Utc::now().to_rfc3339(),
        season: Some(SEASON.to_string()),
        data_source: Some(data_source.to_string()),
        leagues,
    }
}

pub fn write_document(document: &TeamStatsDocument, path: &str) -> Result<()> {
    save_to_cache(document, path).with_context(|| format!("Failed to write team stats to {}", path))
}
