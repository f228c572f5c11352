use super::{Stage, StageKind};
use crate::{error::AnalyticsError, horizon::Horizon, series::Series, window::WindowSelector};

/// Arithmetic mean, `None` for an empty slice.
pub fn average(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Today's volume relative to its trailing average, unset for a zero average.
pub fn volume_ratio(volume: f64, average_volume: f64) -> Option<f64> {
    (average_volume != 0.0).then(|| volume / average_volume)
}

/// Writes `average_volume` and `volume_ratio`, windowed exactly like realized volatility.
#[derive(Debug, Copy, Clone, Default)]
pub struct AverageVolumeStage;

impl Stage for AverageVolumeStage {
    fn kind(&self) -> StageKind {
        StageKind::AverageVolume
    }

    fn apply_series(&self, series: &mut Series) -> Vec<AnalyticsError> {
        let selector = WindowSelector::from_series(series);

        let mut updates = Vec::new();
        for horizon in Horizon::ALL {
            for (anchor, window) in selector.windows(horizon) {
                let Some(window) = window else { continue };

                let volumes: Vec<f64> = window
                    .iter()
                    .filter_map(|key| series.get(*key))
                    .map(|candle| candle.volume)
                    .collect();

                if let Some(average_volume) = average(&volumes) {
                    updates.push((anchor, horizon, average_volume));
                }
            }
        }

        for (anchor, horizon, average_volume) in updates {
            if let Some(candle) = series.get_mut(anchor) {
                candle.metrics.average_volume[horizon] = Some(average_volume);
                candle.metrics.volume_ratio[horizon] = volume_ratio(candle.volume, average_volume);
            }
        }

        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{candle_at, daily_series, daily_series_with_volume};

    #[test]
    fn test_average() {
        assert_eq!(average(&[]), None);
        assert_eq!(average(&[2.0, 4.0, 6.0]), Some(4.0));
    }

    #[test]
    fn test_volume_ratio() {
        assert_eq!(volume_ratio(150.0, 100.0), Some(1.5));
        assert_eq!(volume_ratio(0.0, 100.0), Some(0.0));
        assert_eq!(volume_ratio(150.0, 0.0), None);
    }

    #[test]
    fn test_stage_averages_window_volume() {
        let mut series = daily_series("AAPL", &vec![100.0; 40]);
        AverageVolumeStage.apply_series(&mut series);

        // Volumes are 1000 + day: day 39 window spans days 9..=39
        let latest = candle_at(&series, 39);
        let expected_average = (9..=39).map(|day| 1_000.0 + day as f64).sum::<f64>() / 31.0;

        assert_eq!(latest.metrics.average_volume.short, Some(expected_average));
        assert_eq!(latest.metrics.volume_ratio.short, Some(1_039.0 / expected_average));
        assert_eq!(latest.metrics.average_volume.medium, None);

        assert_eq!(candle_at(&series, 5).metrics.average_volume.short, None);
    }

    #[test]
    fn test_stage_leaves_ratio_unset_for_zero_average() {
        let mut series = daily_series_with_volume("AAPL", &vec![100.0; 35], &vec![0.0; 35]);
        AverageVolumeStage.apply_series(&mut series);

        let latest = candle_at(&series, 34);
        assert_eq!(latest.metrics.average_volume.short, Some(0.0));
        assert_eq!(latest.metrics.volume_ratio.short, None);
    }
}
