use thiserror::Error;

#[derive(Debug, Error)]
pub enum PulseError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("sprint window is missing its {0} bound")]
    MissingWindow(&'static str),

    #[error("cannot compare timezone-aware {aware} with naive {naive}")]
    TimestampComparison { aware: String, naive: String },

    #[error("unparsable timestamp: {0:?}")]
    UnparsableTimestamp(String),

    #[error("invalid sprint window: start {start} is after end {end}")]
    InvalidWindow { start: String, end: String },

    #[error("validation error: {0}")]
    Validation(String),

    #[error("io error: {0}")]
    Io(String),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type PulseResult<T> = Result<T, PulseError>;
