//! Domain error types.

use chrono::NaiveDate;

/// Top-level error type for testfolio.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TestfolioError {
    #[error("no price data for {ticker} between {start} and {end}")]
    MissingTicker {
        ticker: String,
        start: NaiveDate,
        end: NaiveDate,
    },

    #[error("insufficient history: aligned calendar has {dates} common dates, need at least 2")]
    InsufficientHistory { dates: usize },

    #[error("invalid price for {ticker} on {date}: {price}")]
    InvalidPrice {
        ticker: String,
        date: NaiveDate,
        price: f64,
    },

    #[error("invalid weights for portfolio \"{name}\": {reason}")]
    InvalidWeights { name: String, reason: String },

    #[error("optimization failed: {reason}")]
    OptimizationFailure { reason: String },

    #[error("rate search did not converge: {reason}")]
    NonConvergence { reason: String },

    #[error("no solution for {unknown}: {reason}")]
    NoSolution { unknown: String, reason: String },

    #[error("nothing to solve: pv, fv, rate and nper are all set")]
    Underdetermined,

    #[error("{unset} of pv, fv, rate, nper are unset; leave exactly one blank")]
    Overdetermined { unset: usize },

    #[error("no data available for {ticker}")]
    DataUnavailable { ticker: String },

    #[error("data error: {reason}")]
    Data { reason: String },

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

    #[error("io error: {reason}")]
    Io { reason: String },
}

impl From<std::io::Error> for TestfolioError {
    fn from(err: std::io::Error) -> Self {
        TestfolioError::Io {
            reason: err.to_string(),
        }
    }
}

impl From<&TestfolioError> for std::process::ExitCode {
    fn from(err: &TestfolioError) -> Self {
        let code: u8 = match err {
            TestfolioError::Io { .. } => 1,
            TestfolioError::ConfigParse { .. }
            | TestfolioError::ConfigMissing { .. }
            | TestfolioError::ConfigInvalid { .. } => 2,
            TestfolioError::DataUnavailable { .. } | TestfolioError::Data { .. } => 3,
            TestfolioError::MissingTicker { .. }
            | TestfolioError::InsufficientHistory { .. }
            | TestfolioError::InvalidPrice { .. } => 4,
            TestfolioError::InvalidWeights { .. } => 5,
            TestfolioError::OptimizationFailure { .. }
            | TestfolioError::NonConvergence { .. }
            | TestfolioError::NoSolution { .. }
            | TestfolioError::Underdetermined
            | TestfolioError::Overdetermined { .. } => 6,
        };
        std::process::ExitCode::from(code)
    }
}
