use anyhow::Result;
use clap::Parser;
use football_predictor::config::Settings;
use football_predictor::data::{save_bets_to_csv, save_predictions_to_csv};
use football_predictor::fetch_all_prediction_data;
use football_predictor::odds_api::OddsApiClient;
use football_predictor::MatchPrediction;

/// Football fixture predictions from live bookmaker odds
#[derive(Parser, Debug)]
#[command(name = "cli", version, about)]
struct Cli {
    #[command(flatten)]
    settings: Settings,

    /// Write predictions and recommended bets to CSV in the cache directory
    #[arg(
        long,
        env = "SAVE_CSV",
        default_value = "false",
        value_parser = clap::builder::FalseyValueParser::new()
    )]
    save_csv: bool,

    /// Print the remaining Odds API quota when done
    #[arg(long, default_value = "false")]
    check_usage: bool,
}

fn print_prediction(index: usize, p: &MatchPrediction) {
    let f = &p.fixture;
    println!(
        "{}. {} v {} ({})",
        index,
        f.home_team,
        f.away_team,
        f.commence_time.format("%a %d %b %H:%M")
    );
    println!(
        "   Home {}% | Draw {}% | Away {}%  [{}: {:.2} / {:.2} / {:.2}]",
        p.probabilities.home,
        p.probabilities.draw,
        p.probabilities.away,
        p.bookmaker,
        p.odds.home,
        p.odds.draw,
        p.odds.away
    );
    println!(
        "   Match Winner: {} ({}% @ {:.2})",
        p.tip.label, p.tip.confidence, p.tip.reference_odd
    );
    println!(
        "   Goals: {} (xG {:.1}, {}% Conf.)",
        p.stats.goals.label, p.stats.goals.expected_goals, p.stats.goals.confidence
    );
    println!(
        "   Corners: {}-{} ({} total) | Shots: {}-{} | On Target: {}-{} | Fouls: {}",
        p.stats.corners.home,
        p.stats.corners.away,
        p.stats.corners.total,
        p.stats.shots.home,
        p.stats.shots.away,
        p.stats.shots_on_target.home,
        p.stats.shots_on_target.away,
        p.stats.fouls
    );
    println!(
        "   Bet Builder: {}  [{} stats]\n",
        p.stats.bet_builder, p.stats.origin
    );
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = cli.settings.load_predictor_config()?;

    println!("{} Predictor\n", cli.settings.league);
    println!("Fetching odds and team statistics...\n");

    let data = fetch_all_prediction_data(&cli.settings, &config).await?;

    if let Some(error) = &data.upstream_error {
        eprintln!("Odds source unavailable: {}\n", error);
    }
    match &data.stats_last_updated {
        Some(updated) => println!("Using real team statistics (last updated {})\n", updated),
        None => println!("Team statistics unavailable, using simulated figures\n"),
    }

    println!("RECOMMENDED BETS\n");
    if data.recommended_bets.is_empty() {
        println!("No recommended bets this round.");
    } else {
        for (i, bet) in data.recommended_bets.iter().enumerate() {
            println!("{}. {}", i + 1, bet.format());
        }
    }

    println!("\nFIXTURES\n");
    if data.is_empty() {
        println!("No fixtures with complete odds found.");
    } else {
        for (i, prediction) in data.predictions.iter().enumerate() {
            print_prediction(i + 1, prediction);
        }
    }
    if data.skipped_fixtures > 0 {
        println!("Skipped {} fixtures with incomplete or invalid odds.", data.skipped_fixtures);
    }

    if cli.save_csv && !data.is_empty() {
        let predictions_file = format!("{}/predictions.csv", cli.settings.cache_dir);
        save_predictions_to_csv(&data.predictions, &predictions_file)?;
        println!("\nSaved predictions to {}", predictions_file);

        if !data.recommended_bets.is_empty() {
            let bets_file = format!("{}/recommended_bets.csv", cli.settings.cache_dir);
            save_bets_to_csv(&data.recommended_bets, &bets_file)?;
            println!("Saved recommended bets to {}", bets_file);
        }
    }

    // Check API usage
    if cli.check_usage {
        if let Some(api_key) = cli.settings.odds_api_key.clone() {
            let usage = OddsApiClient::new(api_key).check_usage().await?;
            println!(
                "\nAPI requests remaining: {}",
                usage.remaining.as_deref().unwrap_or("unknown")
            );
            println!("API requests used: {}", usage.used.as_deref().unwrap_or("unknown"));
        }
    }

    Ok(())
}
