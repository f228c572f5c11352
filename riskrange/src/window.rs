//! Calendar-bounded look-back windows over sparse, irregularly dated series.

use crate::{horizon::Horizon, series::Series};
use chrono::{DateTime, Days, Utc};

/// Newest-first view over a series' timestamps used to select trailing windows.
///
/// A window anchored at position `i` holds every timestamp `t` with
/// `anchor - days <= t <= anchor`. It is only valid when at least `days` older
/// samples exist in the history, so early dates never produce partial windows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowSelector {
    keys: Vec<i64>,
}

impl WindowSelector {
    /// Keys must be sorted newest first.
    pub fn new(keys: Vec<i64>) -> Self {
        debug_assert!(keys.windows(2).all(|pair| pair[0] > pair[1]));
        Self { keys }
    }

    pub fn from_series(series: &Series) -> Self {
        Self::new(series.keys_descending())
    }

    pub fn keys(&self) -> &[i64] {
        &self.keys
    }

    /// Whether the window anchored at `anchor_index` has enough history behind it.
    pub fn is_valid(&self, anchor_index: usize, horizon: Horizon) -> bool {
        let Ok(days) = usize::try_from(horizon.days()) else {
            return false;
        };
        anchor_index
            .checked_add(days)
            .is_some_and(|end| end < self.keys.len())
    }

    /// Members of the window anchored at `anchor_index`, newest first.
    pub fn select(&self, anchor_index: usize, horizon: Horizon) -> Option<&[i64]> {
        if !self.is_valid(anchor_index, horizon) {
            return None;
        }

        let anchor = *self.keys.get(anchor_index)?;
        let cutoff = window_start(anchor, horizon.days())?;

        let trailing = &self.keys[anchor_index..];
        let len = trailing.iter().take_while(|key| **key >= cutoff).count();

        Some(&trailing[..len])
    }

    /// Every anchor with its window, newest anchor first.
    pub fn windows(&self, horizon: Horizon) -> impl Iterator<Item = (i64, Option<&[i64]>)> {
        self.keys
            .iter()
            .enumerate()
            .map(move |(index, anchor)| (*anchor, self.select(index, horizon)))
    }
}

/// Epoch ms `days` calendar days before `anchor`.
fn window_start(anchor: i64, days: u64) -> Option<i64> {
    DateTime::<Utc>::from_timestamp_millis(anchor)?
        .checked_sub_days(Days::new(days))
        .map(|start| start.timestamp_millis())
}
