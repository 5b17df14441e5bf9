use thiserror::Error;

/// Per-fixture failures. Any of these drops the fixture from the cycle but
/// never aborts the cycle itself.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PredictionError {
    #[error("invalid {outcome} odds {price}: decimal odds must be greater than 1.0")]
    InvalidOdds { outcome: &'static str, price: f64 },

    #[error("invalid fixture: {0}")]
    InvalidFixture(String),

    #[error("no bookmaker offers a complete home/draw/away market for {0}")]
    MissingOutcome(String),
}
