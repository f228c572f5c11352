//! Per-ticker candle collections threaded through the analytics stages.

use crate::{
    asset::AssetClass,
    candle::{Candle, RawBar},
    error::AnalyticsError,
    stage::{StageKind, StageSet},
};
use fnv::FnvHashMap;
use serde::{
    Deserialize, Deserializer, Serialize, Serializer,
    de::{MapAccess, Visitor},
};
use smol_str::SmolStr;
use std::{collections::BTreeMap, fmt};
use tracing::warn;

/// Input handed over by a market-data client: ticker → epoch ms → bar.
pub type RawTimeSeries = FnvHashMap<SmolStr, RawBars>;

/// One ticker's bars exactly as supplied, in input order and with any repeated
/// keys kept, so [`Series::from_raw`] can reject them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawBars(Vec<(i64, RawBar)>);

impl RawBars {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(i64, RawBar)> for RawBars {
    fn from_iter<Iter: IntoIterator<Item = (i64, RawBar)>>(iter: Iter) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for RawBars {
    type Item = (i64, RawBar);
    type IntoIter = std::vec::IntoIter<(i64, RawBar)>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl Serialize for RawBars {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_map(self.0.iter().map(|(key, bar)| (key, bar)))
    }
}

impl<'de> Deserialize<'de> for RawBars {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct RawBarsVisitor;

        impl<'de> Visitor<'de> for RawBarsVisitor {
            type Value = RawBars;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a map of epoch millisecond keys to bars")
            }

            fn visit_map<Access>(self, mut map: Access) -> Result<Self::Value, Access::Error>
            where
                Access: MapAccess<'de>,
            {
                let mut bars = Vec::with_capacity(map.size_hint().unwrap_or_default());
                while let Some((key, bar)) = map.next_entry::<SmolStr, RawBar>()? {
                    // Parsed rather than compared as text: "017..." and "17..." collide
                    let key: i64 = key.trim().parse().map_err(serde::de::Error::custom)?;
                    bars.push((key, bar));
                }
                Ok(RawBars(bars))
            }
        }

        deserializer.deserialize_map(RawBarsVisitor)
    }
}

/// Validated candles of a single ticker, keyed by epoch milliseconds.
///
/// Also records which stages have completed over it, so each stage can assert the
/// fields it reads have already been written.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    ticker: SmolStr,
    asset_class: AssetClass,
    candles: BTreeMap<i64, Candle>,
    completed: StageSet,
}

impl Series {
    /// Validate every bar of one ticker. Any malformed bar, or a key supplied more
    /// than once, rejects the whole series.
    pub fn from_raw<Iter>(ticker: SmolStr, bars: Iter) -> Result<Self, AnalyticsError>
    where
        Iter: IntoIterator<Item = (i64, RawBar)>,
    {
        let mut candles = BTreeMap::new();
        for (key, bar) in bars {
            if candles.contains_key(&key) {
                return Err(AnalyticsError::DuplicateTimestamp {
                    ticker,
                    timestamp: key,
                });
            }

            let candle = Candle::from_raw(&ticker, key, bar)?;
            candles.insert(key, candle);
        }

        Self::from_map(ticker, candles)
    }

    /// Build a series from already validated candles, keyed by their own timestamps.
    pub fn from_candles<Iter>(ticker: SmolStr, candles: Iter) -> Result<Self, AnalyticsError>
    where
        Iter: IntoIterator<Item = Candle>,
    {
        let mut map = BTreeMap::new();
        for candle in candles {
            if let Some(existing) = map.insert(candle.key(), candle) {
                return Err(AnalyticsError::DuplicateTimestamp {
                    ticker,
                    timestamp: existing.key(),
                });
            }
        }

        Self::from_map(ticker, map)
    }

    fn from_map(ticker: SmolStr, candles: BTreeMap<i64, Candle>) -> Result<Self, AnalyticsError> {
        if candles.is_empty() {
            return Err(AnalyticsError::EmptySeries(ticker));
        }

        Ok(Self {
            asset_class: AssetClass::from_ticker(&ticker),
            ticker,
            candles,
            completed: StageSet::default(),
        })
    }

    pub fn ticker(&self) -> &SmolStr {
        &self.ticker
    }

    pub fn asset_class(&self) -> AssetClass {
        self.asset_class
    }

    pub fn annualization_factor(&self) -> f64 {
        self.asset_class.annualization_factor()
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn get(&self, key: i64) -> Option<&Candle> {
        self.candles.get(&key)
    }

    /// Candles in chronological order.
    pub fn candles(&self) -> impl DoubleEndedIterator<Item = &Candle> {
        self.candles.values()
    }

    /// Most recent candle.
    pub fn latest(&self) -> Option<&Candle> {
        self.candles.values().next_back()
    }

    /// Keys sorted newest first, the order windows are scanned in.
    pub fn keys_descending(&self) -> Vec<i64> {
        self.candles.keys().rev().copied().collect()
    }

    pub fn has_completed(&self, stage: StageKind) -> bool {
        self.completed.contains(stage)
    }

    pub(crate) fn candles_mut(&mut self) -> impl DoubleEndedIterator<Item = &mut Candle> {
        self.candles.values_mut()
    }

    pub(crate) fn get_mut(&mut self, key: i64) -> Option<&mut Candle> {
        self.candles.get_mut(&key)
    }

    pub(crate) fn mark_completed(&mut self, stage: StageKind) {
        self.completed.insert(stage);
    }
}

impl Serialize for Series {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.candles.serialize(serializer)
    }
}

/// Every ticker's [`Series`]; serialises as ticker → epoch ms → candle.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TimeSeries {
    series: FnvHashMap<SmolStr, Series>,
}

impl TimeSeries {
    /// Validate raw input ticker by ticker. Malformed tickers are dropped and
    /// reported, the remaining tickers are unaffected.
    pub fn from_raw(raw: RawTimeSeries) -> (Self, Vec<AnalyticsError>) {
        let mut time_series = Self::default();
        let mut errors = Vec::new();

        for (ticker, bars) in raw {
            match Series::from_raw(ticker.clone(), bars) {
                Ok(series) => {
                    time_series.insert(series);
                }
                Err(error) => {
                    warn!(%ticker, %error, "rejected malformed ticker input");
                    errors.push(error);
                }
            }
        }

        (time_series, errors)
    }

    /// Insert a series, returning any series it replaced for the same ticker.
    pub fn insert(&mut self, series: Series) -> Option<Series> {
        self.series.insert(series.ticker.clone(), series)
    }

    pub fn get(&self, ticker: &str) -> Option<&Series> {
        self.series.get(ticker)
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn tickers(&self) -> impl Iterator<Item = &SmolStr> {
        self.series.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Series> {
        self.series.values()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Series> {
        self.series.values_mut()
    }
}

impl FromIterator<Series> for TimeSeries {
    fn from_iter<Iter: IntoIterator<Item = Series>>(iter: Iter) -> Self {
        let mut time_series = Self::default();
        for series in iter {
            time_series.insert(series);
        }
        time_series
    }
}
