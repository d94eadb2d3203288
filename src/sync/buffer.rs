/// Rolling per-metric sample windows for the detail charts
use std::collections::{BTreeMap, VecDeque};

use crate::models::{Metric, Reading};
use crate::utils::time_label;

pub const DEFAULT_CAPACITY: usize = 40;

/// Samples and labels of one chart, oldest first
///
/// `values` and `labels` always have the same length. A `None` sample is a gap
/// in the line, never a zero.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartSeries {
    values: VecDeque<Option<f64>>,
    labels: VecDeque<String>,
}

impl ChartSeries {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> impl Iterator<Item = Option<f64>> + '_ {
        self.values.iter().copied()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> + '_ {
        self.labels.iter().map(String::as_str)
    }

    /// Smallest and largest numeric sample; gaps are ignored
    pub fn range(&self) -> Option<(f64, f64)> {
        self.values.iter().flatten().fold(None, |acc, &v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
    }

    pub fn latest(&self) -> Option<f64> {
        self.values.back().copied().flatten()
    }

    fn push(&mut self, value: Option<f64>, label: String, capacity: usize) {
        while self.values.len() >= capacity {
            self.values.pop_front();
            self.labels.pop_front();
        }
        self.values.push_back(value);
        self.labels.push_back(label);
    }
}

#[derive(Debug, Clone)]
pub struct TimeSeriesBuffer {
    capacity: usize,
    series: BTreeMap<Metric, ChartSeries>,
}

impl Default for TimeSeriesBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl TimeSeriesBuffer {
    /// A zero capacity is raised to one
    pub fn new(capacity: usize) -> Self {
        TimeSeriesBuffer {
            capacity: capacity.max(1),
            series: BTreeMap::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Append one unlabeled sample, evicting the oldest when full
    pub fn push(&mut self, metric: Metric, value: Option<f64>) {
        self.push_labeled(metric, value, String::new());
    }

    /// Append one sample with its x-axis label
    ///
    /// # Arguments
    /// * `metric` - Chart to append to; created on first use
    /// * `value` - Sample value, `None` for a gap
    /// * `label` - Time label shown under the sample
    pub fn push_labeled(&mut self, metric: Metric, value: Option<f64>, label: String) {
        let capacity = self.capacity;
        self.series
            .entry(metric)
            .or_default()
            .push(value, label, capacity);
    }

    /// Append every metric of a reading under the reading's time label
    pub fn push_reading(&mut self, reading: &Reading) {
        let label = time_label(reading.timestamp.as_deref());
        for metric in Metric::ALL {
            self.push_labeled(metric, metric.value(reading), label.clone());
        }
    }

    /// Replace the contents with the newest `capacity` readings of a batch
    ///
    /// Used for the history load when a detail view opens. Readings must be
    /// ordered oldest first, as the API returns them.
    pub fn load_batch(&mut self, readings: &[Reading]) {
        self.reset();
        let start = readings.len().saturating_sub(self.capacity);
        for reading in &readings[start..] {
            self.push_reading(reading);
        }
    }

    /// Drop every series
    pub fn reset(&mut self) {
        self.series.clear();
    }

    pub fn series(&self, metric: Metric) -> Option<&ChartSeries> {
        self.series.get(&metric)
    }

    pub fn len(&self, metric: Metric) -> usize {
        self.series.get(&metric).map_or(0, ChartSeries::len)
    }

    pub fn is_empty(&self) -> bool {
        self.series.values().all(ChartSeries::is_empty)
    }

    pub fn range(&self, metric: Metric) -> Option<(f64, f64)> {
        self.series.get(&metric).and_then(ChartSeries::range)
    }
}
