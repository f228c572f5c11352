use crate::{error::AnalyticsError, series::Series, series::TimeSeries};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::{fmt::Debug, str::FromStr};

/// Realized volatility per look-back window.
pub mod realized_volatility;

/// Average volume and volume ratios per look-back window.
pub mod volume;

/// Raw and volume-adjusted risk ranges.
pub mod risk_range;

/// Probability-adjusted (narrowed) risk ranges.
pub mod probability;

/// Velocity and acceleration of realized volatility.
pub mod dynamics;

/// Position of realized volatility within its own window extremes.
pub mod relative;

/// Analytics stage, listed in the order a [`Pipeline`](crate::pipeline::Pipeline) runs them.
#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Deserialize, Serialize, Display,
)]
#[serde(rename_all = "snake_case")]
pub enum StageKind {
    #[display("realized_volatility")]
    RealizedVolatility,
    #[display("risk_range")]
    RiskRange,
    #[display("volatility_dynamics")]
    VolatilityDynamics,
    #[display("relative_volatility")]
    RelativeVolatility,
    #[display("average_volume")]
    AverageVolume,
    #[display("volume_adjusted_range")]
    VolumeAdjustedRange,
    #[display("probability_adjustment")]
    ProbabilityAdjustment,
}

impl StageKind {
    /// Mandated execution order.
    pub const ORDER: [StageKind; 7] = [
        StageKind::RealizedVolatility,
        StageKind::RiskRange,
        StageKind::VolatilityDynamics,
        StageKind::RelativeVolatility,
        StageKind::AverageVolume,
        StageKind::VolumeAdjustedRange,
        StageKind::ProbabilityAdjustment,
    ];

    /// Stages whose output this stage reads.
    pub const fn requires(self) -> &'static [StageKind] {
        match self {
            StageKind::RealizedVolatility | StageKind::AverageVolume => &[],
            StageKind::RiskRange
            | StageKind::VolatilityDynamics
            | StageKind::RelativeVolatility => &[StageKind::RealizedVolatility],
            StageKind::VolumeAdjustedRange => {
                &[StageKind::RealizedVolatility, StageKind::AverageVolume]
            }
            StageKind::ProbabilityAdjustment => &[StageKind::RiskRange],
        }
    }

    const fn bit(self) -> u8 {
        1 << self as u8
    }
}

impl FromStr for StageKind {
    type Err = AnalyticsError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        StageKind::ORDER
            .into_iter()
            .find(|kind| kind.to_string().eq_ignore_ascii_case(input.trim()))
            .ok_or_else(|| AnalyticsError::UnknownStage(input.to_string()))
    }
}

/// Set of completed [`StageKind`]s.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct StageSet(u8);

impl StageSet {
    pub fn contains(&self, kind: StageKind) -> bool {
        self.0 & kind.bit() != 0
    }

    pub fn insert(&mut self, kind: StageKind) {
        self.0 |= kind.bit();
    }
}

/// One step of the analytics pipeline.
///
/// Implementors compute over a single ticker in [`Stage::apply_series`]; the
/// provided [`Stage::apply`] checks each series' prerequisites before delegating
/// and records completion afterwards.
pub trait Stage: Debug {
    fn kind(&self) -> StageKind;

    /// Compute this stage for one series, returning non-fatal computational errors.
    fn apply_series(&self, series: &mut Series) -> Vec<AnalyticsError>;

    fn apply(&self, mut time_series: TimeSeries) -> (TimeSeries, Vec<AnalyticsError>) {
        let kind = self.kind();
        let mut errors = Vec::new();

        for series in time_series.iter_mut() {
            let missing = kind
                .requires()
                .iter()
                .copied()
                .find(|required| !series.has_completed(*required));

            if let Some(missing) = missing {
                errors.push(AnalyticsError::MissingPrerequisite {
                    ticker: series.ticker().clone(),
                    stage: kind,
                    missing,
                });
                continue;
            }

            errors.extend(self.apply_series(series));
            series.mark_completed(kind);
        }

        (time_series, errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_kind_from_str() {
        struct TestCase {
            input: &'static str,
            expected: Result<StageKind, AnalyticsError>,
        }

        let tests = vec![
            TestCase {
                // TC0: exact name
                input: "risk_range",
                expected: Ok(StageKind::RiskRange),
            },
            TestCase {
                // TC1: case and whitespace insensitive
                input: " Relative_Volatility ",
                expected: Ok(StageKind::RelativeVolatility),
            },
            TestCase {
                // TC2: unknown name
                input: "implied_volatility",
                expected: Err(AnalyticsError::UnknownStage("implied_volatility".to_string())),
            },
        ];

        for (index, test) in tests.into_iter().enumerate() {
            let actual = test.input.parse::<StageKind>();
            assert_eq!(actual, test.expected, "TC{} failed", index);
        }
    }

    #[test]
    fn test_requirements_precede_stage_in_order() {
        for (position, kind) in StageKind::ORDER.iter().enumerate() {
            for required in kind.requires() {
                let required_position = StageKind::ORDER
                    .iter()
                    .position(|candidate| candidate == required)
                    .unwrap();
                assert!(required_position < position, "{kind} runs before {required}");
            }
        }
    }

    #[test]
    fn test_stage_set() {
        let mut set = StageSet::default();
        assert!(!set.contains(StageKind::AverageVolume));

        set.insert(StageKind::AverageVolume);
        assert!(set.contains(StageKind::AverageVolume));
        assert!(!set.contains(StageKind::RealizedVolatility));
    }
}
