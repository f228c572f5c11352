use super::{Stage, StageKind};
use crate::{candle::Range, error::AnalyticsError, horizon::Horizon, series::Series};

/// Band around `price` implied by `volatility` over `duration_days`.
///
/// Volatility is scaled linearly by duration (`volatility / factor * duration`),
/// not by the square root of time.
pub fn risk_range(price: f64, volatility: f64, duration_days: f64, annualization_factor: f64) -> Range {
    let scale = volatility / annualization_factor * duration_days;
    Range::new(price * (1.0 - scale), price * (1.0 + scale))
}

/// Realized volatility rescaled by the volume ratio, unset for a zero ratio.
pub fn volume_adjusted_volatility(volatility: f64, volume_ratio: f64) -> Option<f64> {
    (volume_ratio != 0.0).then(|| volatility / volume_ratio)
}

/// Writes the trade/trend/tail `risk_range` anchored on each bar's weighted price.
#[derive(Debug, Copy, Clone, Default)]
pub struct RiskRangeStage;

impl Stage for RiskRangeStage {
    fn kind(&self) -> StageKind {
        StageKind::RiskRange
    }

    fn apply_series(&self, series: &mut Series) -> Vec<AnalyticsError> {
        let factor = series.annualization_factor();
        let ticker = series.ticker().clone();
        let mut errors = Vec::new();

        for candle in series.candles_mut() {
            for horizon in Horizon::ALL {
                match candle.metrics.realized_volatility[horizon] {
                    None => {}
                    Some(volatility) if volatility == 0.0 => {
                        errors.push(AnalyticsError::ZeroVolatility {
                            ticker: ticker.clone(),
                            timestamp: candle.key(),
                            horizon,
                        });
                    }
                    Some(volatility) => {
                        candle.metrics.risk_range[horizon] = Some(risk_range(
                            candle.weighted_price,
                            volatility,
                            horizon.days() as f64,
                            factor,
                        ));
                    }
                }
            }
        }

        errors
    }
}

/// Writes `volume_adjusted_range`: the risk range of volatility divided by the
/// same-window volume ratio.
///
/// A populated average volume with no usable ratio (zero average, or zero volume
/// today) is reported as `ZeroVolumeRatio`. Zero volatility is only reported here
/// when [`RiskRangeStage`] has not already done so for the series.
#[derive(Debug, Copy, Clone, Default)]
pub struct VolumeAdjustedRangeStage;

impl Stage for VolumeAdjustedRangeStage {
    fn kind(&self) -> StageKind {
        StageKind::VolumeAdjustedRange
    }

    fn apply_series(&self, series: &mut Series) -> Vec<AnalyticsError> {
        let factor = series.annualization_factor();
        let ticker = series.ticker().clone();
        let report_zero_volatility = !series.has_completed(StageKind::RiskRange);
        let mut errors = Vec::new();

        for candle in series.candles_mut() {
            for horizon in Horizon::ALL {
                let metrics = &candle.metrics;
                let (Some(volatility), Some(_)) = (
                    metrics.realized_volatility[horizon],
                    metrics.average_volume[horizon],
                ) else {
                    continue;
                };

                if volatility == 0.0 {
                    if report_zero_volatility {
                        errors.push(AnalyticsError::ZeroVolatility {
                            ticker: ticker.clone(),
                            timestamp: candle.key(),
                            horizon,
                        });
                    }
                    continue;
                }

                let adjusted = metrics.volume_ratio[horizon]
                    .and_then(|ratio| volume_adjusted_volatility(volatility, ratio));

                match adjusted {
                    Some(adjusted) => {
                        candle.metrics.volume_adjusted_range[horizon] = Some(risk_range(
                            candle.weighted_price,
                            adjusted,
                            horizon.days() as f64,
                            factor,
                        ));
                    }
                    None => errors.push(AnalyticsError::ZeroVolumeRatio {
                        ticker: ticker.clone(),
                        timestamp: candle.key(),
                        horizon,
                    }),
                }
            }
        }

        errors
    }
}
