use crate::{
    candle::{Candle, RawBar},
    series::Series,
};
use chrono::{DateTime, Days, TimeZone, Utc};
use smol_str::SmolStr;
use std::collections::BTreeMap;

pub fn day(offset: u64) -> DateTime<Utc> {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    start.checked_add_days(Days::new(offset)).unwrap()
}

/// One bar per calendar day starting 2024-01-01, volume rising by one each day.
pub fn daily_raw_bars(closes: &[f64]) -> BTreeMap<i64, RawBar> {
    let volumes: Vec<f64> = (0..closes.len()).map(|index| 1_000.0 + index as f64).collect();
    daily_raw_bars_with_volume(closes, &volumes)
}

pub fn daily_raw_bars_with_volume(closes: &[f64], volumes: &[f64]) -> BTreeMap<i64, RawBar> {
    closes
        .iter()
        .zip(volumes)
        .enumerate()
        .map(|(index, (close, volume))| {
            let timestamp = day(index as u64);
            let bar = RawBar {
                open: Some(*close),
                high: Some(*close),
                low: Some(*close),
                close: Some(*close),
                volume: Some(*volume),
                weighted_price: Some(*close),
                transactions: Some(1),
                timestamp: Some(timestamp),
            };
            (timestamp.timestamp_millis(), bar)
        })
        .collect()
}

pub fn daily_series(ticker: &str, closes: &[f64]) -> Series {
    Series::from_raw(SmolStr::new(ticker), daily_raw_bars(closes)).unwrap()
}

pub fn daily_series_with_volume(ticker: &str, closes: &[f64], volumes: &[f64]) -> Series {
    Series::from_raw(SmolStr::new(ticker), daily_raw_bars_with_volume(closes, volumes)).unwrap()
}

/// Deterministic zig-zag closes with varying amplitude, so every window has variance.
pub fn zigzag_closes(len: usize) -> Vec<f64> {
    (0..len)
        .map(|index| {
            let swing = 1.0 + (index % 7) as f64 * 0.25;
            if index % 2 == 0 { 100.0 + swing } else { 100.0 - swing }
        })
        .collect()
}

pub fn candle_at(series: &Series, offset: u64) -> &Candle {
    series.get(day(offset).timestamp_millis()).unwrap()
}
