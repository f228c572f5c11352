#![forbid(unsafe_code)]
#![warn(unused, clippy::cognitive_complexity, unused_crate_dependencies)]

//! # RiskRange
//! Windowed volatility and risk-range analytics over daily OHLCV bars.
//!
//! A [`Pipeline`] takes a per-ticker collection of validated [`Candle`]s and runs a
//! fixed sequence of stages over it:
//! * Realized volatility over 30/60/90 day look-back windows.
//! * Trade/trend/tail risk ranges, raw and volume adjusted.
//! * Velocity and acceleration of volatility.
//! * Position of volatility within its own window extremes.
//! * Probability-adjusted (narrowed) ranges.
//!
//! Every stage reports non-fatal computational errors alongside its output rather
//! than aborting the run.

/// Asset classification and annualization constants.
pub mod asset;

/// Raw and validated bar types plus the derived [`Metrics`](candle::Metrics) block.
pub mod candle;

/// [`EngineConfig`] and per-stage toggles.
pub mod config;

/// All [`Error`](std::error::Error)s generated in RiskRange.
pub mod error;

/// Look-back [`Horizon`]s and per-horizon storage.
pub mod horizon;

/// Orchestrates the stages in their required order.
pub mod pipeline;

/// Verbose and condensed JSON renderings.
pub mod render;

/// Annualized return calculators.
pub mod returns;

/// Per-ticker candle collections.
pub mod series;

/// Analytics stages.
pub mod stage;

/// Calendar look-back window selection.
pub mod window;

#[cfg(test)]
mod test_util;

pub use candle::{Candle, Metrics, Range, RawBar};
pub use config::{EngineConfig, StageToggles};
pub use error::AnalyticsError;
pub use horizon::{Horizon, PerHorizon};
pub use pipeline::{Pipeline, PipelineOutput};
pub use series::{RawBars, RawTimeSeries, Series, TimeSeries};
pub use stage::{Stage, StageKind};

// Only used by unit and integration tests
#[cfg(test)]
use tracing_subscriber as _;
