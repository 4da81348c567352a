//! Domain error types.

/// Top-level error type for pairtrader.
#[derive(Debug, thiserror::Error)]
pub enum PairtraderError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("invalid pair '{spec}': {reason}")]
    InvalidPair { spec: String, reason: String },

    #[error("no data for {symbol}: {reason}")]
    DataUnavailable { symbol: String, reason: String },

    #[error("insufficient data for {pair}: have {observations} aligned observations, need {minimum}")]
    InsufficientData {
        pair: String,
        observations: usize,
        minimum: usize,
    },

    #[error("pair {pair} not cointegrated: p-value {p_value:.3} exceeds {significance}")]
    NotCointegrated {
        pair: String,
        p_value: f64,
        significance: f64,
    },

    #[error("no viable pairs among {candidates} candidates")]
    NoViablePair { candidates: usize },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&PairtraderError> for std::process::ExitCode {
    fn from(err: &PairtraderError) -> Self {
        let code: u8 = match err {
            PairtraderError::Io(_) => 1,
            PairtraderError::ConfigParse { .. }
            | PairtraderError::ConfigMissing { .. }
            | PairtraderError::ConfigInvalid { .. }
            | PairtraderError::InvalidPair { .. } => 2,
            PairtraderError::DataUnavailable { .. } => 3,
            PairtraderError::InsufficientData { .. } => 4,
            PairtraderError::NotCointegrated { .. } => 5,
            PairtraderError::NoViablePair { .. } => 6,
        };
        std::process::ExitCode::from(code)
    }
}
