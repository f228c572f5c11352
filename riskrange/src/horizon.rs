//! Look-back windows and the per-window storage used by every derived metric.

use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

/// Look-back window length a metric is computed over.
#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Deserialize, Serialize, Display,
)]
#[serde(rename_all = "snake_case")]
pub enum Horizon {
    /// 30 calendar days, feeds the trade range.
    #[display("short")]
    Short,
    /// 60 calendar days, feeds the trend range.
    #[display("medium")]
    Medium,
    /// 90 calendar days, feeds the tail range.
    #[display("long")]
    Long,
}

impl Horizon {
    pub const ALL: [Horizon; 3] = [Horizon::Short, Horizon::Medium, Horizon::Long];

    /// Window length in calendar days.
    pub const fn days(self) -> u64 {
        match self {
            Horizon::Short => 30,
            Horizon::Medium => 60,
            Horizon::Long => 90,
        }
    }

    /// Name of the risk range derived from this window.
    pub const fn range_name(self) -> &'static str {
        match self {
            Horizon::Short => "trade",
            Horizon::Medium => "trend",
            Horizon::Long => "tail",
        }
    }
}

/// One value per [`Horizon`].
#[derive(Debug, Copy, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct PerHorizon<T> {
    pub short: T,
    pub medium: T,
    pub long: T,
}

impl<T> PerHorizon<T> {
    /// Build a value for every horizon from a closure.
    pub fn from_fn<F>(mut f: F) -> Self
    where
        F: FnMut(Horizon) -> T,
    {
        Self {
            short: f(Horizon::Short),
            medium: f(Horizon::Medium),
            long: f(Horizon::Long),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Horizon, &T)> {
        Horizon::ALL.into_iter().map(move |horizon| (horizon, &self[horizon]))
    }

    pub fn map<U, F>(self, mut f: F) -> PerHorizon<U>
    where
        F: FnMut(T) -> U,
    {
        PerHorizon {
            short: f(self.short),
            medium: f(self.medium),
            long: f(self.long),
        }
    }
}

impl<T> Index<Horizon> for PerHorizon<T> {
    type Output = T;

    fn index(&self, horizon: Horizon) -> &Self::Output {
        match horizon {
            Horizon::Short => &self.short,
            Horizon::Medium => &self.medium,
            Horizon::Long => &self.long,
        }
    }
}

impl<T> IndexMut<Horizon> for PerHorizon<T> {
    fn index_mut(&mut self, horizon: Horizon) -> &mut Self::Output {
        match horizon {
            Horizon::Short => &mut self.short,
            Horizon::Medium => &mut self.medium,
            Horizon::Long => &mut self.long,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_horizon_days_ascending() {
        let days: Vec<u64> = Horizon::ALL.iter().map(|horizon| horizon.days()).collect();
        assert_eq!(days, vec![30, 60, 90]);
    }

    #[test]
    fn test_horizon_display() {
        assert_eq!(Horizon::Short.to_string(), "short");
        assert_eq!(Horizon::Long.range_name(), "tail");
    }

    #[test]
    fn test_per_horizon_index_and_from_fn() {
        let mut values = PerHorizon::from_fn(|horizon| horizon.days() as f64);
        assert_eq!(values[Horizon::Medium], 60.0);

        values[Horizon::Medium] = 1.0;
        assert_eq!(values.medium, 1.0);

        let doubled = values.map(|value| value * 2.0);
        let collected: Vec<_> = doubled.iter().map(|(_, value)| *value).collect();
        assert_eq!(collected, vec![60.0, 2.0, 180.0]);
    }
}
