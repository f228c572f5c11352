use super::{Stage, StageKind};
use crate::{error::AnalyticsError, horizon::Horizon, series::Series, window::WindowSelector};
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Log returns `ln(P_t / P_{t-1})` between consecutive prices.
pub fn log_returns(prices: &[f64]) -> Vec<f64> {
    prices.windows(2).map(|pair| (pair[1] / pair[0]).ln()).collect()
}

/// Unbiased (n - 1) sample variance, `None` with fewer than two values.
pub fn sample_variance(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }

    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let sum_squares = values.iter().map(|value| (value - mean).powi(2)).sum::<f64>();

    Some(sum_squares / (n - 1.0))
}

/// Annualized standard deviation of log returns over chronologically ordered prices.
///
/// Fewer than two returns leave the variance undefined; that window reports zero
/// volatility instead of failing.
pub fn realized_volatility(prices: &[f64], annualization_factor: f64) -> f64 {
    sample_variance(&log_returns(prices))
        .map(|variance| (variance * annualization_factor).sqrt())
        .unwrap_or(0.0)
}

/// Writes `realized_volatility` and `window_prices` for every anchor with a valid window.
#[derive(Debug, Copy, Clone, Default)]
pub struct RealizedVolatilityStage;

impl Stage for RealizedVolatilityStage {
    fn kind(&self) -> StageKind {
        StageKind::RealizedVolatility
    }

    fn apply_series(&self, series: &mut Series) -> Vec<AnalyticsError> {
        let selector = WindowSelector::from_series(series);
        let factor = series.annualization_factor();

        let mut updates = Vec::new();
        for horizon in Horizon::ALL {
            for (anchor, window) in selector.windows(horizon) {
                let Some(window) = window else { continue };

                // Window members are newest first, returns need oldest first
                let members: Vec<(NaiveDate, f64)> = window
                    .iter()
                    .rev()
                    .filter_map(|key| series.get(*key))
                    .map(|candle| (candle.date(), candle.close))
                    .collect();

                let closes: Vec<f64> = members.iter().map(|(_, close)| *close).collect();
                let volatility = realized_volatility(&closes, factor);
                let prices: BTreeMap<NaiveDate, f64> = members.into_iter().collect();

                updates.push((anchor, horizon, volatility, prices));
            }
        }

        for (anchor, horizon, volatility, prices) in updates {
            if let Some(candle) = series.get_mut(anchor) {
                candle.metrics.realized_volatility[horizon] = Some(volatility);
                candle.metrics.window_prices[horizon] = Some(prices);
            }
        }

        Vec::new()
    }
}
