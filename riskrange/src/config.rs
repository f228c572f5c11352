use crate::{error::AnalyticsError, stage::StageKind, stage::probability::DEFAULT_PROBABILITY_ADJUSTMENT};
use serde::{Deserialize, Serialize};

/// Env var holding the probability adjustment fraction (default: 0.1).
pub const ENV_PROBABILITY_ADJUSTMENT: &str = "PROBABLE_RANGE_ADJ";

/// Env var holding a comma separated list of stages to skip, eg/ "relative_volatility".
pub const ENV_DISABLE_STAGES: &str = "DISABLE_STAGES";

/// Per-stage on/off switches, all enabled by default.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct StageToggles {
    pub realized_volatility: bool,
    pub risk_range: bool,
    pub volatility_dynamics: bool,
    pub relative_volatility: bool,
    pub average_volume: bool,
    pub volume_adjusted_range: bool,
    pub probability_adjustment: bool,
}

impl StageToggles {
    pub fn is_enabled(&self, kind: StageKind) -> bool {
        *self.flag(kind)
    }

    pub fn set(&mut self, kind: StageKind, enabled: bool) {
        *self.flag_mut(kind) = enabled;
    }

    fn flag(&self, kind: StageKind) -> &bool {
        match kind {
            StageKind::RealizedVolatility => &self.realized_volatility,
            StageKind::RiskRange => &self.risk_range,
            StageKind::VolatilityDynamics => &self.volatility_dynamics,
            StageKind::RelativeVolatility => &self.relative_volatility,
            StageKind::AverageVolume => &self.average_volume,
            StageKind::VolumeAdjustedRange => &self.volume_adjusted_range,
            StageKind::ProbabilityAdjustment => &self.probability_adjustment,
        }
    }

    fn flag_mut(&mut self, kind: StageKind) -> &mut bool {
        match kind {
            StageKind::RealizedVolatility => &mut self.realized_volatility,
            StageKind::RiskRange => &mut self.risk_range,
            StageKind::VolatilityDynamics => &mut self.volatility_dynamics,
            StageKind::RelativeVolatility => &mut self.relative_volatility,
            StageKind::AverageVolume => &mut self.average_volume,
            StageKind::VolumeAdjustedRange => &mut self.volume_adjusted_range,
            StageKind::ProbabilityAdjustment => &mut self.probability_adjustment,
        }
    }
}

impl Default for StageToggles {
    fn default() -> Self {
        Self {
            realized_volatility: true,
            risk_range: true,
            volatility_dynamics: true,
            relative_volatility: true,
            average_volume: true,
            volume_adjusted_range: true,
            probability_adjustment: true,
        }
    }
}

/// Configuration consumed by [`Pipeline::new`](crate::pipeline::Pipeline::new).
#[derive(Debug, Copy, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Fraction each probability-adjusted band is narrowed by, from both ends.
    pub probability_adjustment: f64,
    pub stages: StageToggles,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            probability_adjustment: DEFAULT_PROBABILITY_ADJUSTMENT,
            stages: StageToggles::default(),
        }
    }
}

impl EngineConfig {
    /// Read overrides from the process environment.
    pub fn from_env() -> Result<Self, AnalyticsError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read overrides through `lookup`, falling back to defaults for unset or
    /// unparsable values.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AnalyticsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(fraction) = lookup(ENV_PROBABILITY_ADJUSTMENT).and_then(|v| v.parse().ok()) {
            config.probability_adjustment = fraction;
        }

        if let Some(disabled) = lookup(ENV_DISABLE_STAGES) {
            for name in disabled.split(',').map(str::trim).filter(|name| !name.is_empty()) {
                config.stages.set(name.parse()?, false);
            }
        }

        Ok(config)
    }
}
