use std::collections::{BTreeMap, VecDeque};

use crate::models::{Metric, Reading, SensorStat, Trend};

/// Samples considered for min/max/trend per metric
pub const STAT_WINDOW: usize = 50;

/// Min/max/trend over the most recent numeric samples of each metric
#[derive(Debug, Clone, Default)]
pub struct SensorStats {
    history: BTreeMap<Metric, VecDeque<f64>>,
}

impl SensorStats {
    /// Add one sample to a metric's window, dropping the oldest past 50
    ///
    /// Gaps are ignored, so they never count towards the window.
    pub fn record(&mut self, metric: Metric, value: Option<f64>) {
        let Some(value) = value else {
            return;
        };
        let history = self.history.entry(metric).or_default();
        history.push_back(value);
        if history.len() > STAT_WINDOW {
            history.pop_front();
        }
    }

    /// Record every metric of a reading
    pub fn record_reading(&mut self, reading: &Reading) {
        for metric in Metric::ALL {
            self.record(metric, metric.value(reading));
        }
    }

    /// Summary of one metric's window
    ///
    /// The trend compares the two most recent samples.
    ///
    /// # Returns
    /// `None` until at least two numeric samples were recorded
    pub fn stat(&self, metric: Metric) -> Option<SensorStat> {
        let history = self.history.get(&metric)?;
        if history.len() < 2 {
            return None;
        }

        let min = history.iter().copied().fold(f64::INFINITY, f64::min);
        let max = history.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        let current = history[history.len() - 1];
        let previous = history[history.len() - 2];
        let trend = if current > previous {
            Trend::Up
        } else if current < previous {
            Trend::Down
        } else {
            Trend::Flat
        };

        Some(SensorStat { min, max, trend })
    }

    pub fn reset(&mut self) {
        self.history.clear();
    }
}
