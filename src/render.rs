//! Presentation interface driven by the view controller

use log::{info, warn};
use time::OffsetDateTime;

use crate::controller::ViewMode;
use crate::models::{Company, Device, Metric, Reading};
use crate::sync::{SensorStats, TimeSeriesBuffer};
use crate::utils::{format_datetime, format_last_seen, format_metric_value};

/// Everything the grid needs for one render
#[derive(Debug)]
pub struct GridView<'a> {
    pub company_id: Option<i64>,
    /// Devices after the status filter and search term
    pub devices: Vec<&'a Device>,
    pub online_count: usize,
    pub total_count: usize,
    pub last_updated: Option<OffsetDateTime>,
}

#[derive(Debug)]
pub struct DetailView<'a> {
    pub device_id: i64,
    pub device_name: &'a str,
    pub series: &'a TimeSeriesBuffer,
    pub stats: &'a SensorStats,
    pub latest: Option<&'a Reading>,
    pub last_updated: Option<OffsetDateTime>,
}

pub trait Renderer {
    fn render_companies(&mut self, companies: &[Company]);

    fn render_grid(&mut self, view: &GridView<'_>);

    fn render_detail(&mut self, view: &DetailView<'_>);

    fn view_mode_changed(&mut self, mode: &ViewMode);

    /// Toast for a device that just came back online
    fn device_came_online(&mut self, device: &Device);

    /// Transient user-visible message
    fn notify(&mut self, message: &str);
}

/// Renders every update to the log
#[derive(Debug, Default)]
pub struct LogRenderer;

impl Renderer for LogRenderer {
    fn render_companies(&mut self, companies: &[Company]) {
        info!("{} companies available", companies.len());
        for company in companies {
            info!("  [{}] {}", company.id, company.name);
        }
    }

    fn render_grid(&mut self, view: &GridView<'_>) {
        let updated = view
            .last_updated
            .map(|t| format_datetime(&t))
            .unwrap_or_else(|| "never".to_string());
        info!(
            "{} online / {} total (showing {}, updated {})",
            view.online_count,
            view.total_count,
            view.devices.len(),
            updated
        );
        for device in &view.devices {
            info!(
                "  [{}] {:<24} {:<7} last seen {}",
                device.device_id,
                device.device_name,
                device.status,
                format_last_seen(device.last_read_at.as_deref())
            );
        }
    }

    fn render_detail(&mut self, view: &DetailView<'_>) {
        info!("{} (#{})", view.device_name, view.device_id);
        for metric in Metric::ALL {
            let current = format_metric_value(metric, view.latest.and_then(|r| metric.value(r)));
            let samples = view.series.len(metric);
            match view.stats.stat(metric) {
                Some(stat) => info!(
                    "  {:<12} {:>10} {} min {} max {} ({} samples)",
                    metric.label(),
                    current,
                    stat.trend.arrow(),
                    format_metric_value(metric, Some(stat.min)),
                    format_metric_value(metric, Some(stat.max)),
                    samples
                ),
                None => info!("  {:<12} {:>10} ({} samples)", metric.label(), current, samples),
            }
        }
    }

    fn view_mode_changed(&mut self, mode: &ViewMode) {
        match mode {
            ViewMode::Grid => info!("Showing device grid"),
            ViewMode::Detail {
                device_id,
                device_name,
            } => info!("Showing charts for {} (#{})", device_name, device_id),
        }
    }

    fn device_came_online(&mut self, device: &Device) {
        info!("{} is now online", device.device_name);
    }

    fn notify(&mut self, message: &str) {
        warn!("{}", message);
    }
}
