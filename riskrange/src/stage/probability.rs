use super::{Stage, StageKind};
use crate::{candle::Range, error::AnalyticsError, horizon::Horizon, series::Series};
use serde::{Deserialize, Serialize};

/// Fraction used when none (or zero) is configured.
pub const DEFAULT_PROBABILITY_ADJUSTMENT: f64 = 0.1;

/// Narrow a band from both ends by `fraction * (high - low)`.
pub fn probability_adjusted(range: Range, fraction: f64) -> Range {
    let trim = fraction * (range.high - range.low);
    Range::new(range.low + trim, range.high - trim)
}

/// Validated, never-zero probability adjustment fraction.
#[derive(Debug, Copy, Clone, PartialEq, Deserialize, Serialize)]
pub struct ProbabilityAdjustment(f64);

impl ProbabilityAdjustment {
    /// Zero selects [`DEFAULT_PROBABILITY_ADJUSTMENT`]. Fractions above 0.5 would
    /// invert the band and are rejected.
    pub fn new(fraction: f64) -> Result<Self, AnalyticsError> {
        if fraction == 0.0 {
            Ok(Self::default())
        } else if fraction.is_finite() && (0.0..=0.5).contains(&fraction) {
            Ok(Self(fraction))
        } else {
            Err(AnalyticsError::InvalidProbability(fraction))
        }
    }

    pub fn fraction(&self) -> f64 {
        self.0
    }

    pub fn apply(&self, range: Range) -> Range {
        probability_adjusted(range, self.0)
    }
}

impl Default for ProbabilityAdjustment {
    fn default() -> Self {
        Self(DEFAULT_PROBABILITY_ADJUSTMENT)
    }
}

/// Writes `probable_range` and `probable_volume_adjusted_range` from whichever
/// bands exist on each candle.
#[derive(Debug, Copy, Clone, Default)]
pub struct ProbabilityAdjustmentStage {
    adjustment: ProbabilityAdjustment,
}

impl ProbabilityAdjustmentStage {
    pub fn new(adjustment: ProbabilityAdjustment) -> Self {
        Self { adjustment }
    }
}

impl Stage for ProbabilityAdjustmentStage {
    fn kind(&self) -> StageKind {
        StageKind::ProbabilityAdjustment
    }

    fn apply_series(&self, series: &mut Series) -> Vec<AnalyticsError> {
        for candle in series.candles_mut() {
            let metrics = &mut candle.metrics;
            for horizon in Horizon::ALL {
                metrics.probable_range[horizon] =
                    metrics.risk_range[horizon].map(|range| self.adjustment.apply(range));
                metrics.probable_volume_adjusted_range[horizon] = metrics.volume_adjusted_range
                    [horizon]
                    .map(|range| self.adjustment.apply(range));
            }
        }

        Vec::new()
    }
}
