use crate::{
    config::EngineConfig,
    error::AnalyticsError,
    series::{RawTimeSeries, TimeSeries},
    stage::{
        Stage, StageKind,
        dynamics::VolatilityDynamicsStage,
        probability::{ProbabilityAdjustment, ProbabilityAdjustmentStage},
        realized_volatility::RealizedVolatilityStage,
        relative::RelativeVolatilityStage,
        risk_range::{RiskRangeStage, VolumeAdjustedRangeStage},
        volume::AverageVolumeStage,
    },
};
use itertools::Itertools;
use tracing::{debug, info, warn};

/// Result of a [`Pipeline`] run: the enriched collection plus every error
/// reported along the way.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineOutput {
    pub time_series: TimeSeries,
    pub errors: Vec<AnalyticsError>,
}

impl PipelineOutput {
    /// Errors that ended a ticker's run (eg/ rejected input).
    pub fn fatal_errors(&self) -> impl Iterator<Item = &AnalyticsError> {
        self.errors.iter().filter(|error| error.is_fatal())
    }
}

/// Ordered, configured set of analytics stages.
#[derive(Debug)]
pub struct Pipeline {
    stages: Vec<Box<dyn Stage>>,
}

impl Pipeline {
    /// Build the enabled stages in [`StageKind::ORDER`].
    ///
    /// Fails if an enabled stage depends on a disabled one, or if the configured
    /// probability fraction is out of bounds.
    pub fn new(config: &EngineConfig) -> Result<Self, AnalyticsError> {
        let adjustment = ProbabilityAdjustment::new(config.probability_adjustment)?;

        let stages = StageKind::ORDER
            .into_iter()
            .filter(|kind| config.stages.is_enabled(*kind))
            .map(|kind| -> Result<Box<dyn Stage>, AnalyticsError> {
                if let Some(requires) = kind
                    .requires()
                    .iter()
                    .find(|required| !config.stages.is_enabled(**required))
                {
                    return Err(AnalyticsError::StageDependency {
                        stage: kind,
                        requires: *requires,
                    });
                }

                Ok(build_stage(kind, adjustment))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { stages })
    }

    /// Kinds of the configured stages, in execution order.
    pub fn stages(&self) -> Vec<StageKind> {
        self.stages.iter().map(|stage| stage.kind()).collect()
    }

    /// Run every configured stage over `time_series`.
    pub fn run(&self, time_series: TimeSeries) -> PipelineOutput {
        info!(
            tickers = time_series.len(),
            stages = %self.stages().iter().join(","),
            "running analytics pipeline"
        );

        let mut errors = Vec::new();
        let time_series = self.stages.iter().fold(time_series, |time_series, stage| {
            debug!(stage = %stage.kind(), "stage started");
            let (time_series, stage_errors) = stage.apply(time_series);

            if !stage_errors.is_empty() {
                warn!(
                    stage = %stage.kind(),
                    count = stage_errors.len(),
                    "stage reported errors"
                );
            }

            debug!(stage = %stage.kind(), "stage finished");
            errors.extend(stage_errors);
            time_series
        });

        PipelineOutput {
            time_series,
            errors,
        }
    }

    /// Validate raw input, then [`Pipeline::run`] it. Rejected tickers are
    /// reported ahead of stage errors.
    pub fn run_raw(&self, raw: RawTimeSeries) -> PipelineOutput {
        let (time_series, mut errors) = TimeSeries::from_raw(raw);
        let output = self.run(time_series);
        errors.extend(output.errors);

        PipelineOutput {
            time_series: output.time_series,
            errors,
        }
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self {
            stages: StageKind::ORDER
                .into_iter()
                .map(|kind| build_stage(kind, ProbabilityAdjustment::default()))
                .collect(),
        }
    }
}

fn build_stage(kind: StageKind, adjustment: ProbabilityAdjustment) -> Box<dyn Stage> {
    match kind {
        StageKind::RealizedVolatility => Box::new(RealizedVolatilityStage),
        StageKind::RiskRange => Box::new(RiskRangeStage),
        StageKind::VolatilityDynamics => Box::new(VolatilityDynamicsStage),
        StageKind::RelativeVolatility => Box::new(RelativeVolatilityStage),
        StageKind::AverageVolume => Box::new(AverageVolumeStage),
        StageKind::VolumeAdjustedRange => Box::new(VolumeAdjustedRangeStage),
        StageKind::ProbabilityAdjustment => Box::new(ProbabilityAdjustmentStage::new(adjustment)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::StageToggles,
        test_util::{candle_at, daily_series, zigzag_closes},
    };

    #[test]
    fn test_new_validates_config() {
        struct TestCase {
            input: EngineConfig,
            expected: Result<Vec<StageKind>, AnalyticsError>,
        }

        let without = |kinds: &[StageKind]| {
            let mut stages = StageToggles::default();
            for kind in kinds {
                stages.set(*kind, false);
            }
            EngineConfig {
                stages,
                ..EngineConfig::default()
            }
        };

        let tests = vec![
            TestCase {
                // TC0: default config enables every stage in order
                input: EngineConfig::default(),
                expected: Ok(StageKind::ORDER.to_vec()),
            },
            TestCase {
                // TC1: dropping a leaf stage is fine
                input: without(&[StageKind::RelativeVolatility]),
                expected: Ok(vec![
                    StageKind::RealizedVolatility,
                    StageKind::RiskRange,
                    StageKind::VolatilityDynamics,
                    StageKind::AverageVolume,
                    StageKind::VolumeAdjustedRange,
                    StageKind::ProbabilityAdjustment,
                ]),
            },
            TestCase {
                // TC2: dependant left enabled
                input: without(&[StageKind::AverageVolume]),
                expected: Err(AnalyticsError::StageDependency {
                    stage: StageKind::VolumeAdjustedRange,
                    requires: StageKind::AverageVolume,
                }),
            },
            TestCase {
                // TC3: dependants disabled alongside
                input: without(&[StageKind::AverageVolume, StageKind::VolumeAdjustedRange]),
                expected: Ok(vec![
                    StageKind::RealizedVolatility,
                    StageKind::RiskRange,
                    StageKind::VolatilityDynamics,
                    StageKind::RelativeVolatility,
                    StageKind::ProbabilityAdjustment,
                ]),
            },
            TestCase {
                // TC4: out of bounds probability fraction
                input: EngineConfig {
                    probability_adjustment: 0.6,
                    ..EngineConfig::default()
                },
                expected: Err(AnalyticsError::InvalidProbability(0.6)),
            },
        ];

        for (index, test) in tests.into_iter().enumerate() {
            let actual = Pipeline::new(&test.input).map(|pipeline| pipeline.stages());
            assert_eq!(actual, test.expected, "TC{} failed", index);
        }
    }

    #[test]
    fn test_default_matches_default_config() {
        let configured = Pipeline::new(&EngineConfig::default()).unwrap();
        assert_eq!(Pipeline::default().stages(), configured.stages());
    }

    #[test]
    fn test_run_populates_every_stage() {
        let time_series: TimeSeries = [daily_series("AAPL", &zigzag_closes(100))]
            .into_iter()
            .collect();

        let output = Pipeline::default().run(time_series);
        assert!(output.fatal_errors().next().is_none());

        let series = output.time_series.get("AAPL").unwrap();
        assert!(StageKind::ORDER.iter().all(|kind| series.has_completed(*kind)));

        let latest = &candle_at(series, 99).metrics;
        assert!(latest.realized_volatility.long.is_some());
        assert!(latest.risk_range.long.is_some());
        assert!(latest.volume_adjusted_range.long.is_some());
        assert!(latest.probable_range.long.is_some());
        assert!(latest.probable_volume_adjusted_range.long.is_some());
        assert!(latest.relative_volatility.long.is_some());
        assert!(latest.acceleration.long.is_some());
    }
}
