pub mod data;
pub mod match_analysis;
pub mod match_stats;
pub mod odds_calculator;
pub mod recommendations;
pub mod tip_selector;
