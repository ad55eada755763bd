use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Score distribution is empty")]
    EmptyDistribution,

    #[error("Score distribution weights must sum to a positive finite value, got {sum}")]
    NonPositiveWeightSum { sum: f64 },

    #[error("Invalid weight {weight} for score {home}-{away}")]
    InvalidWeight { home: u32, away: u32, weight: f64 },

    #[error("Bet slip is empty")]
    EmptyBetSlip,

    #[error("Stake must be > 0, got {stake}")]
    InvalidStake { stake: f64 },

    #[error("Odds must be > 1.0, got {odds}")]
    InvalidOdds { odds: f64 },

    #[error("Stake and odds must be given together ({market}: '{outcome}')")]
    StakeOddsMismatch { market: String, outcome: String },

    #[error("RTP must be within [0, 1], got {rtp}")]
    InvalidRtp { rtp: f64 },

    #[error("Team name must not be empty")]
    EmptyTeamName,

    #[error("Cannot schedule {goals} goals into {capacity} available minutes")]
    GoalCapacityExceeded { goals: u32, capacity: u32 },

    #[error("Unknown market '{name}'")]
    UnknownMarket { name: String },

    #[error("Unknown volatility '{name}'")]
    UnknownVolatility { name: String },

    #[error("Cannot interpret outcome '{outcome}' for market {market}")]
    UnparseableOutcome { market: String, outcome: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type SimResult<T> = Result<T, SimError>;
