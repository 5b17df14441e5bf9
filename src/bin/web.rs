use askama::Template;
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Json, Router,
};
use clap::Parser;
use football_predictor::config::{PredictorConfig, Settings};
use football_predictor::recommendations::RecommendedBet;
use football_predictor::{
    fetch_all_prediction_data, MatchPrediction, PredictionData, PredictionStore,
};
use std::sync::Arc;
use tower_http::services::ServeDir;

// Custom filters for formatting
mod filters {
    pub fn format_odds(odds: &f64) -> ::askama::Result<String> {
        Ok(format!("{:.2}", odds))
    }

    pub fn confidence_class(confidence: &u8) -> ::askama::Result<String> {
        let class = if *confidence >= 85 {
            "conf-high"
        } else if *confidence >= 70 {
            "conf-mid"
        } else {
            "conf-low"
        };
        Ok(class.to_string())
    }

    pub fn result_class(percentage: &u8) -> ::askama::Result<String> {
        let class = if *percentage >= 60 {
            "bar-strong"
        } else if *percentage >= 40 {
            "bar-mid"
        } else {
            "bar-weak"
        };
        Ok(class.to_string())
    }
}

/// Football predictions dashboard
#[derive(Parser, Debug)]
#[command(name = "web", version, about)]
struct Cli {
    #[command(flatten)]
    settings: Settings,

    /// Address to serve the dashboard on
    #[arg(long, env = "DASHBOARD_ADDR", default_value = "127.0.0.1:3000")]
    addr: String,
}

struct BetView {
    kind: String,
    selections: Vec<String>,
    odds: String,
    confidence: String,
    stake: String,
    projected_return: String,
}

impl From<&RecommendedBet> for BetView {
    fn from(bet: &RecommendedBet) -> Self {
        Self {
            kind: bet.kind.to_string(),
            selections: bet.selections(),
            odds: bet.odds_display(),
            confidence: bet.confidence.to_string(),
            stake: bet.stake_display(),
            projected_return: bet.return_display(),
        }
    }
}

struct MatchView {
    home_team: String,
    away_team: String,
    kickoff: String,
    home_pct: u8,
    draw_pct: u8,
    away_pct: u8,
    tip: String,
    tip_confidence: u8,
    tip_odds: f64,
    goals: String,
    goals_confidence: u8,
    expected_goals: String,
    corners: String,
    shots: String,
    shots_on_target: String,
    fouls: String,
    bet_builder: String,
    origin: String,
}

impl From<&MatchPrediction> for MatchView {
    fn from(p: &MatchPrediction) -> Self {
        Self {
            home_team: p.fixture.home_team.clone(),
            away_team: p.fixture.away_team.clone(),
            kickoff: p.fixture.commence_time.format("%a %d %b %H:%M").to_string(),
            home_pct: p.probabilities.home,
            draw_pct: p.probabilities.draw,
            away_pct: p.probabilities.away,
            tip: p.tip.label.clone(),
            tip_confidence: p.tip.confidence,
            tip_odds: p.tip.reference_odd,
            goals: p.stats.goals.label.clone(),
            goals_confidence: p.stats.goals.confidence,
            expected_goals: format!("{:.1}", p.stats.goals.expected_goals),
            corners: format!(
                "{} ({}-{})",
                p.stats.corners.total, p.stats.corners.home, p.stats.corners.away
            ),
            shots: format!("{}-{}", p.stats.shots.home, p.stats.shots.away),
            shots_on_target: format!(
                "{}-{}",
                p.stats.shots_on_target.home, p.stats.shots_on_target.away
            ),
            fouls: p.stats.fouls.clone(),
            bet_builder: p.stats.bet_builder.clone(),
            origin: p.stats.origin.to_string(),
        }
    }
}

#[derive(Template)]
#[template(path = "home.html")]
struct HomeTemplate {
    league: String,
    generated_at: String,
    stats_note: String,
    upstream_error: String,
    skipped_fixtures: usize,
    bets: Vec<BetView>,
    matches: Vec<MatchView>,
}

impl From<&PredictionData> for HomeTemplate {
    fn from(data: &PredictionData) -> Self {
        let stats_note = match &data.stats_last_updated {
            Some(updated) => format!("Real team statistics (updated {})", updated),
            None => "Simulated team statistics".to_string(),
        };
        Self {
            league: data.league.to_string(),
            generated_at: data.generated_at.format("%Y-%m-%d %H:%M UTC").to_string(),
            stats_note,
            upstream_error: data.upstream_error.clone().unwrap_or_default(),
            skipped_fixtures: data.skipped_fixtures,
            bets: data.recommended_bets.iter().map(BetView::from).collect(),
            matches: data.predictions.iter().map(MatchView::from).collect(),
        }
    }
}

struct HtmlTemplate<T>(T);

impl<T> IntoResponse for HtmlTemplate<T>
where
    T: Template,
{
    fn into_response(self) -> Response {
        match self.0.render() {
            Ok(html) => Html(html).into_response(),
            Err(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to render template: {}", err),
            )
                .into_response(),
        }
    }
}

struct AppState {
    store: PredictionStore,
    settings: Settings,
    config: PredictorConfig,
}

type SharedState = Arc<AppState>;

async fn run_cycle(state: SharedState, generation: u64) -> bool {
    let result = fetch_all_prediction_data(&state.settings, &state.config).await;
    state.store.publish(generation, result).await
}

async fn home(State(state): State<SharedState>) -> impl IntoResponse {
    let data = state.store.current().await;

    match data.as_ref() {
        Some(d) => HtmlTemplate(HomeTemplate::from(d)).into_response(),
        None => (StatusCode::SERVICE_UNAVAILABLE, "Data not loaded yet").into_response(),
    }
}

async fn refresh(State(state): State<SharedState>) -> impl IntoResponse {
    let generation = state.store.begin_cycle();
    tokio::spawn(run_cycle(state.clone(), generation));
    Redirect::to("/")
}

async fn api_predictions(State(state): State<SharedState>) -> impl IntoResponse {
    let data = state.store.current().await;

    match data.as_ref() {
        Some(d) => Json(d.clone()).into_response(),
        None => (StatusCode::SERVICE_UNAVAILABLE, "Data not loaded yet").into_response(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = cli.settings.load_predictor_config()?;

    let state = Arc::new(AppState {
        store: PredictionStore::new(),
        settings: cli.settings,
        config,
    });

    println!("Fetching predictions...");

    // Fetch data on startup
    let generation = state.store.begin_cycle();
    if !run_cycle(state.clone(), generation).await {
        eprintln!("Server will start but pages may show errors until a refresh succeeds");
    }

    println!("\nStarting web server at http://{}", cli.addr);
    println!("Press Ctrl+C to stop\n");

    let app = Router::new()
        .nest_service("/static", ServeDir::new("static"))
        .route("/", get(home))
        .route("/refresh", get(refresh).post(refresh))
        .route("/api/predictions", get(api_predictions))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&cli.addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
