//! JSON renderings of an analysed [`TimeSeries`].
//!
//! The verbose rendering is the full collection. The condensed rendering keeps one
//! [`CondensedCandle`] per bar, grouping the derived metrics by horizon.

use crate::{
    candle::{Candle, Range},
    horizon::Horizon,
    series::TimeSeries,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::collections::BTreeMap;

/// Metrics of one horizon, as shown in the condensed rendering.
#[derive(Debug, Copy, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct HorizonSummary {
    pub average_volume: Option<f64>,
    pub volume_ratio: Option<f64>,
    pub realized_volatility: Option<f64>,
    pub velocity: Option<f64>,
    pub acceleration: Option<f64>,
    pub relative_volatility: Option<f64>,
    pub volatility_high: Option<f64>,
    pub volatility_low: Option<f64>,
    pub volume_adjusted_range: Option<Range>,
    pub probable_volume_adjusted_range: Option<Range>,
}

impl HorizonSummary {
    pub fn new(candle: &Candle, horizon: Horizon) -> Self {
        let metrics = &candle.metrics;
        Self {
            average_volume: metrics.average_volume[horizon],
            volume_ratio: metrics.volume_ratio[horizon],
            realized_volatility: metrics.realized_volatility[horizon],
            velocity: metrics.velocity[horizon],
            acceleration: metrics.acceleration[horizon],
            relative_volatility: metrics.relative_volatility[horizon],
            volatility_high: metrics.volatility_high[horizon],
            volatility_low: metrics.volatility_low[horizon],
            volume_adjusted_range: metrics.volume_adjusted_range[horizon],
            probable_volume_adjusted_range: metrics.probable_volume_adjusted_range[horizon],
        }
    }
}

/// Condensed projection of a [`Candle`].
#[derive(Debug, Copy, Clone, PartialEq, Deserialize, Serialize)]
pub struct CondensedCandle {
    pub close: f64,
    pub volume: f64,
    pub timestamp: DateTime<Utc>,
    pub short: HorizonSummary,
    pub medium: HorizonSummary,
    pub long: HorizonSummary,
}

impl From<&Candle> for CondensedCandle {
    fn from(candle: &Candle) -> Self {
        Self {
            close: candle.close,
            volume: candle.volume,
            timestamp: candle.timestamp,
            short: HorizonSummary::new(candle, Horizon::Short),
            medium: HorizonSummary::new(candle, Horizon::Medium),
            long: HorizonSummary::new(candle, Horizon::Long),
        }
    }
}

/// Ticker → epoch ms → [`CondensedCandle`], tickers sorted for stable output.
pub fn condense(time_series: &TimeSeries) -> BTreeMap<SmolStr, BTreeMap<i64, CondensedCandle>> {
    time_series
        .iter()
        .map(|series| {
            let candles = series
                .candles()
                .map(|candle| (candle.key(), CondensedCandle::from(candle)))
                .collect();
            (series.ticker().clone(), candles)
        })
        .collect()
}

/// Pretty JSON of either the full collection (`verbose`) or its condensed projection.
pub fn render_json(time_series: &TimeSeries, verbose: bool) -> Result<String, serde_json::Error> {
    if verbose {
        serde_json::to_string_pretty(time_series)
    } else {
        serde_json::to_string_pretty(&condense(time_series))
    }
}
