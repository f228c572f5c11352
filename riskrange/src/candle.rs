//! Candle model: the raw bar handed over by a market-data client and the validated
//! [`Candle`] that analytics stages progressively enrich with derived [`Metrics`].

use crate::{error::AnalyticsError, horizon::PerHorizon};
use chrono::{DateTime, NaiveDate, Utc};
use derive_more::{Constructor, Display};
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::collections::BTreeMap;

/// Price band bounding expected movement.
#[derive(Debug, Copy, Clone, Default, PartialEq, Deserialize, Serialize, Constructor, Display)]
#[display("[{low}, {high}]")]
pub struct Range {
    pub low: f64,
    pub high: f64,
}

impl Range {
    pub fn width(&self) -> f64 {
        self.high - self.low
    }

    pub fn contains(&self, price: f64) -> bool {
        self.low <= price && price <= self.high
    }
}

/// Bar as received from upstream.
///
/// Every field is optional so a missing value is distinguishable from a genuine
/// zero. Short aliases match the aggregate-bar payloads of common providers.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct RawBar {
    #[serde(alias = "o")]
    pub open: Option<f64>,
    #[serde(alias = "h")]
    pub high: Option<f64>,
    #[serde(alias = "l")]
    pub low: Option<f64>,
    #[serde(alias = "c")]
    pub close: Option<f64>,
    #[serde(alias = "v")]
    pub volume: Option<f64>,
    #[serde(alias = "vw")]
    pub weighted_price: Option<f64>,
    #[serde(alias = "n")]
    pub transactions: Option<u64>,
    #[serde(alias = "t")]
    pub timestamp: Option<DateTime<Utc>>,
}

/// Metrics derived from a ticker's history, attached to each [`Candle`].
///
/// `None` means "not computed" (insufficient history, or a degenerate input);
/// `Some(0.0)` is a genuine zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Metrics {
    pub realized_volatility: PerHorizon<Option<f64>>,
    /// Date → close pairs that composed each realized volatility window.
    pub window_prices: PerHorizon<Option<BTreeMap<NaiveDate, f64>>>,
    pub average_volume: PerHorizon<Option<f64>>,
    pub volume_ratio: PerHorizon<Option<f64>>,
    pub risk_range: PerHorizon<Option<Range>>,
    pub volume_adjusted_range: PerHorizon<Option<Range>>,
    pub probable_range: PerHorizon<Option<Range>>,
    pub probable_volume_adjusted_range: PerHorizon<Option<Range>>,
    pub velocity: PerHorizon<Option<f64>>,
    pub acceleration: PerHorizon<Option<f64>>,
    pub volatility_high: PerHorizon<Option<f64>>,
    pub volatility_low: PerHorizon<Option<f64>>,
    pub relative_volatility: PerHorizon<Option<f64>>,
}

/// One bar for one ticker at one timestamp.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candle {
    pub ticker: SmolStr,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub weighted_price: f64,
    pub transactions: u64,
    pub timestamp: DateTime<Utc>,
    pub metrics: Metrics,
}

impl Candle {
    /// Validate a [`RawBar`] stored under `key` (epoch milliseconds).
    pub fn from_raw(ticker: &SmolStr, key: i64, raw: RawBar) -> Result<Self, AnalyticsError> {
        let missing = |field: &str| AnalyticsError::MissingField {
            ticker: ticker.clone(),
            timestamp: key,
            field: SmolStr::new(field),
        };

        let timestamp = raw.timestamp.ok_or_else(|| missing("timestamp"))?;
        if timestamp.timestamp_millis() != key {
            return Err(AnalyticsError::TimestampMismatch {
                ticker: ticker.clone(),
                key,
                timestamp: timestamp.timestamp_millis(),
            });
        }

        let price = |field: &str, value: Option<f64>| -> Result<f64, AnalyticsError> {
            let value = value.ok_or_else(|| missing(field))?;
            if value.is_finite() && value > 0.0 {
                Ok(value)
            } else {
                Err(AnalyticsError::InvalidPrice {
                    ticker: ticker.clone(),
                    timestamp: key,
                    field: SmolStr::new(field),
                    value,
                })
            }
        };

        let volume = raw.volume.ok_or_else(|| missing("volume"))?;
        if !volume.is_finite() || volume < 0.0 {
            return Err(AnalyticsError::InvalidPrice {
                ticker: ticker.clone(),
                timestamp: key,
                field: SmolStr::new("volume"),
                value: volume,
            });
        }

        Ok(Self {
            ticker: ticker.clone(),
            open: price("open", raw.open)?,
            high: price("high", raw.high)?,
            low: price("low", raw.low)?,
            close: price("close", raw.close)?,
            volume,
            weighted_price: price("weighted_price", raw.weighted_price)?,
            transactions: raw.transactions.ok_or_else(|| missing("transactions"))?,
            timestamp,
            metrics: Metrics::default(),
        })
    }

    /// Epoch milliseconds, the candle's key within its series.
    pub fn key(&self) -> i64 {
        self.timestamp.timestamp_millis()
    }

    /// Calendar date (UTC) of the bar.
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }
}
