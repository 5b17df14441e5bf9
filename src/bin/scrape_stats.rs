use anyhow::Result;
use clap::Parser;
use football_predictor::team_stats::{
    apply_squad_shooting, build_document, curated_premier_league, write_document,
    TeamStatsScraper, SQUAD_SHOOTING_URL,
};
use football_predictor::League;
use tracing::{info, warn};

/// Refresh the Premier League team statistics document
#[derive(Parser, Debug)]
#[command(name = "scrape_stats", version, about)]
struct Args {
    /// Where to write the statistics document
    #[arg(long, env = "STATS_OUTPUT", default_value = "static/teamStats.json")]
    output: String,

    /// Squad shooting table to scrape
    #[arg(long, default_value = SQUAD_SHOOTING_URL)]
    url: String,

    /// Skip scraping and write the curated figures as-is
    #[arg(long, default_value = "false")]
    offline: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let mut teams = curated_premier_league();

    println!("Building Premier League team statistics...\n");

    let data_source = if args.offline {
        "Curated averages based on Premier League patterns".to_string()
    } else {
        let scraped = match TeamStatsScraper::new() {
            Ok(scraper) => scraper.fetch_squad_shooting(&args.url).await,
            Err(e) => Err(e),
        };
        match scraped {
            Ok(squads) => {
                let updated = apply_squad_shooting(&mut teams, &squads);
                info!("Rescaled shooting figures for {} teams", updated);
                println!("Scraped {} squads, updated {} teams\n", squads.len(), updated);
                format!("Curated splits rescaled to {}", args.url)
            }
            Err(e) => {
                warn!("Scraping failed, using curated figures: {:#}", e);
                println!("Scraping failed, falling back to curated figures\n");
                "Curated averages (scraping failed)".to_string()
            }
        }
    };

    let document = build_document(League::PremierLeague, teams, &data_source);
    write_document(&document, &args.output)?;

    println!("Wrote {}", args.output);
    println!("Last updated: {}", document.last_updated);
    println!("Teams included: {}", document.team_count());
    if let Some(arsenal) = document.team(League::PremierLeague, "Arsenal") {
        println!(
            "\nSample (Arsenal): home {:.1} shots, {:.1} corners | away {:.1} shots, {:.1} corners",
            arsenal.home.shots_per_game,
            arsenal.home.corners_per_game,
            arsenal.away.shots_per_game,
            arsenal.away.corners_per_game
        );
    }

    Ok(())
}
