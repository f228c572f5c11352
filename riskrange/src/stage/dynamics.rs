use super::{Stage, StageKind};
use crate::{
    error::AnalyticsError,
    horizon::{Horizon, PerHorizon},
    series::Series,
};

/// Day-over-day difference, unset unless both days carry a value.
pub fn difference(current: Option<f64>, previous: Option<f64>) -> Option<f64> {
    Some(current? - previous?)
}

/// Writes `velocity` (first difference of realized volatility) and then
/// `acceleration` (first difference of velocity), each in one ascending pass.
/// The first chronological candle has no predecessor and keeps zero derivatives.
#[derive(Debug, Copy, Clone, Default)]
pub struct VolatilityDynamicsStage;

impl VolatilityDynamicsStage {
    fn velocity_pass(series: &mut Series) {
        let mut previous: Option<PerHorizon<Option<f64>>> = None;
        for candle in series.candles_mut() {
            let current = candle.metrics.realized_volatility;
            candle.metrics.velocity = derivative(current, previous);
            previous = Some(current);
        }
    }

    fn acceleration_pass(series: &mut Series) {
        let mut previous: Option<PerHorizon<Option<f64>>> = None;
        for candle in series.candles_mut() {
            let current = candle.metrics.velocity;
            candle.metrics.acceleration = derivative(current, previous);
            previous = Some(current);
        }
    }
}

fn derivative(
    current: PerHorizon<Option<f64>>,
    previous: Option<PerHorizon<Option<f64>>>,
) -> PerHorizon<Option<f64>> {
    match previous {
        None => PerHorizon::from_fn(|_| Some(0.0)),
        Some(previous) => {
            PerHorizon::from_fn(|horizon: Horizon| difference(current[horizon], previous[horizon]))
        }
    }
}

impl Stage for VolatilityDynamicsStage {
    fn kind(&self) -> StageKind {
        StageKind::VolatilityDynamics
    }

    fn apply_series(&self, series: &mut Series) -> Vec<AnalyticsError> {
        Self::velocity_pass(series);
        Self::acceleration_pass(series);
        Vec::new()
    }
}
