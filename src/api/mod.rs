pub mod odds_api;
pub mod stats_api;
