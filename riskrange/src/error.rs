use crate::{horizon::Horizon, stage::StageKind};
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use thiserror::Error;

/// All errors generated in `riskrange`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Error)]
pub enum AnalyticsError {
    #[error("bar {timestamp} for {ticker} is missing required field: {field}")]
    MissingField {
        ticker: SmolStr,
        timestamp: i64,
        field: SmolStr,
    },

    #[error("bar keyed {key} for {ticker} carries timestamp {timestamp}")]
    TimestampMismatch {
        ticker: SmolStr,
        key: i64,
        timestamp: i64,
    },

    #[error("duplicate bar {timestamp} for {ticker}")]
    DuplicateTimestamp { ticker: SmolStr, timestamp: i64 },

    #[error("bar {timestamp} for {ticker} has invalid {field}: {value}")]
    InvalidPrice {
        ticker: SmolStr,
        timestamp: i64,
        field: SmolStr,
        value: f64,
    },

    #[error("no bars supplied for {0}")]
    EmptySeries(SmolStr),

    #[error("zero {horizon} realized volatility feeding risk range for {ticker} at {timestamp}")]
    ZeroVolatility {
        ticker: SmolStr,
        timestamp: i64,
        horizon: Horizon,
    },

    #[error("zero {horizon} volume ratio feeding adjusted risk range for {ticker} at {timestamp}")]
    ZeroVolumeRatio {
        ticker: SmolStr,
        timestamp: i64,
        horizon: Horizon,
    },

    #[error(
        "\
        degenerate {horizon} volatility range for {ticker} at {timestamp}: \
        high {high} equals low {low} \
    "
    )]
    DegenerateVolatilityRange {
        ticker: SmolStr,
        timestamp: i64,
        horizon: Horizon,
        high: f64,
        low: f64,
    },

    #[error("stage {stage} cannot run for {ticker}: {missing} has not completed")]
    MissingPrerequisite {
        ticker: SmolStr,
        stage: StageKind,
        missing: StageKind,
    },

    #[error("stage {stage} is enabled but its prerequisite {requires} is disabled")]
    StageDependency {
        stage: StageKind,
        requires: StageKind,
    },

    #[error("unknown stage name: {0}")]
    UnknownStage(String),

    #[error("probability adjustment must lie within [0, 0.5], got {0}")]
    InvalidProbability(f64),

    #[error("annualized return undefined: {0}")]
    ReturnUndefined(String),
}

impl AnalyticsError {
    /// Determine if an error ended a ticker's pipeline run (or the whole run, for
    /// configuration errors) rather than skipping a single computation.
    #[allow(clippy::match_like_matches_macro)]
    pub fn is_fatal(&self) -> bool {
        match self {
            AnalyticsError::ZeroVolatility { .. }
            | AnalyticsError::ZeroVolumeRatio { .. }
            | AnalyticsError::DegenerateVolatilityRange { .. }
            | AnalyticsError::ReturnUndefined(_) => false,
            _ => true,
        }
    }

    /// Ticker the error relates to, if any.
    pub fn ticker(&self) -> Option<&SmolStr> {
        match self {
            AnalyticsError::MissingField { ticker, .. }
            | AnalyticsError::TimestampMismatch { ticker, .. }
            | AnalyticsError::DuplicateTimestamp { ticker, .. }
            | AnalyticsError::InvalidPrice { ticker, .. }
            | AnalyticsError::EmptySeries(ticker)
            | AnalyticsError::ZeroVolatility { ticker, .. }
            | AnalyticsError::ZeroVolumeRatio { ticker, .. }
            | AnalyticsError::DegenerateVolatilityRange { ticker, .. }
            | AnalyticsError::MissingPrerequisite { ticker, .. } => Some(ticker),
            _ => None,
        }
    }
}
