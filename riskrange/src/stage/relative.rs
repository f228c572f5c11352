use super::{Stage, StageKind};
use crate::{error::AnalyticsError, horizon::Horizon, series::Series, window::WindowSelector};

/// Extremes of realized volatility across a window.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct VolatilityExtremes {
    /// Largest value seen, zero when the window holds no positive value.
    pub high: f64,
    /// Smallest strictly positive value seen.
    pub low: Option<f64>,
}

impl VolatilityExtremes {
    /// Zeros never become the low bound: they are early, not-yet-meaningful entries.
    pub fn from_values<Iter>(values: Iter) -> Self
    where
        Iter: IntoIterator<Item = f64>,
    {
        values.into_iter().fold(
            Self {
                high: 0.0,
                low: None,
            },
            |extremes, value| Self {
                high: extremes.high.max(value),
                low: if value > 0.0 {
                    Some(extremes.low.map_or(value, |low| low.min(value)))
                } else {
                    extremes.low
                },
            },
        )
    }

    /// Position of `current` between low and high, `None` when the range is degenerate.
    pub fn position(&self, current: f64) -> Option<f64> {
        let low = self.low.unwrap_or(0.0);
        let width = self.high - low;
        (width != 0.0).then(|| (current - low) / width)
    }
}

/// Writes `volatility_high`, `volatility_low` and `relative_volatility` for every
/// anchor with a valid window.
#[derive(Debug, Copy, Clone, Default)]
pub struct RelativeVolatilityStage;

impl Stage for RelativeVolatilityStage {
    fn kind(&self) -> StageKind {
        StageKind::RelativeVolatility
    }

    fn apply_series(&self, series: &mut Series) -> Vec<AnalyticsError> {
        let selector = WindowSelector::from_series(series);

        let mut updates = Vec::new();
        for horizon in Horizon::ALL {
            for (anchor, window) in selector.windows(horizon) {
                let Some(window) = window else { continue };

                let extremes = VolatilityExtremes::from_values(
                    window
                        .iter()
                        .filter_map(|key| series.get(*key))
                        .filter_map(|candle| candle.metrics.realized_volatility[horizon]),
                );

                updates.push((anchor, horizon, extremes));
            }
        }

        let ticker = series.ticker().clone();
        let mut errors = Vec::new();
        for (anchor, horizon, extremes) in updates {
            let Some(candle) = series.get_mut(anchor) else { continue };

            candle.metrics.volatility_high[horizon] = Some(extremes.high);
            candle.metrics.volatility_low[horizon] = extremes.low;

            let Some(current) = candle.metrics.realized_volatility[horizon] else {
                continue;
            };

            match extremes.position(current) {
                Some(position) => candle.metrics.relative_volatility[horizon] = Some(position),
                None => errors.push(AnalyticsError::DegenerateVolatilityRange {
                    ticker: ticker.clone(),
                    timestamp: anchor,
                    horizon,
                    high: extremes.high,
                    low: extremes.low.unwrap_or(0.0),
                }),
            }
        }

        errors
    }
}
