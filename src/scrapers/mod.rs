pub mod team_stats;
