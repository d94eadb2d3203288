#![allow(dead_code)]

use futures_util::future::{self, FutureExt};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

use sensor_dashboard_sync::api::{ApiFuture, TelemetryApi};
use sensor_dashboard_sync::error::FetchError;
use sensor_dashboard_sync::models::{Company, Device, DeviceStatus, Reading};
use sensor_dashboard_sync::render::{DetailView, GridView, Renderer};
use sensor_dashboard_sync::{DashboardConfig, ViewMode};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Companies,
    Devices(i64),
    Readings { device_id: i64, limit: usize },
}

/// Scripted response; an `Err` is the HTTP status to fail with
#[derive(Clone)]
struct Scripted<T> {
    result: Result<T, u16>,
    delay: Duration,
}

impl<T> Scripted<T> {
    fn now(result: Result<T, u16>) -> Self {
        Scripted {
            result,
            delay: Duration::ZERO,
        }
    }
}

#[derive(Default)]
struct Script {
    companies: Vec<Company>,
    devices: VecDeque<Scripted<Vec<Device>>>,
    readings: VecDeque<Scripted<Vec<Reading>>>,
    calls: Vec<Call>,
}

/// In-memory API answering from queued responses
///
/// Responses are taken when the request is issued. The last queued response
/// keeps being returned once the queue is down to one entry.
#[derive(Clone, Default)]
pub struct ScriptedApi {
    script: Rc<RefCell<Script>>,
}

impl ScriptedApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_companies(self, companies: Vec<Company>) -> Self {
        self.script.borrow_mut().companies = companies;
        self
    }

    pub fn push_devices(&self, devices: Vec<Device>) {
        self.script
            .borrow_mut()
            .devices
            .push_back(Scripted::now(Ok(devices)));
    }

    /// Device list that only arrives after `delay`
    pub fn push_devices_after(&self, delay: Duration, devices: Vec<Device>) {
        self.script.borrow_mut().devices.push_back(Scripted {
            result: Ok(devices),
            delay,
        });
    }

    pub fn push_devices_failure(&self, status: u16) {
        self.script
            .borrow_mut()
            .devices
            .push_back(Scripted::now(Err(status)));
    }

    pub fn push_readings(&self, readings: Vec<Reading>) {
        self.script
            .borrow_mut()
            .readings
            .push_back(Scripted::now(Ok(readings)));
    }

    pub fn calls(&self) -> Vec<Call> {
        self.script.borrow().calls.clone()
    }

    pub fn count(&self, predicate: impl Fn(&Call) -> bool) -> usize {
        self.script.borrow().calls.iter().filter(|c| predicate(c)).count()
    }
}

fn take<T: Clone>(queue: &mut VecDeque<Scripted<T>>, empty: T) -> Scripted<T> {
    let next = if queue.len() > 1 {
        queue.pop_front()
    } else {
        queue.front().cloned()
    };
    next.unwrap_or_else(|| Scripted::now(Ok(empty)))
}

fn respond<T: 'static>(scripted: Scripted<T>, url: String) -> ApiFuture<T> {
    let result = scripted
        .result
        .map_err(|status| FetchError::Status { status, url });
    if scripted.delay.is_zero() {
        return future::ready(result).boxed_local();
    }
    let delay = scripted.delay;
    async move {
        tokio::time::sleep(delay).await;
        result
    }
    .boxed_local()
}

impl TelemetryApi for ScriptedApi {
    fn companies(&self) -> ApiFuture<Vec<Company>> {
        let mut script = self.script.borrow_mut();
        script.calls.push(Call::Companies);
        respond(
            Scripted::now(Ok(script.companies.clone())),
            "companies/".to_string(),
        )
    }

    fn devices(&self, company_id: i64) -> ApiFuture<Vec<Device>> {
        let mut script = self.script.borrow_mut();
        script.calls.push(Call::Devices(company_id));
        let result = take(&mut script.devices, Vec::new());
        respond(result, format!("devices/company/{}", company_id))
    }

    fn readings(&self, device_id: i64, limit: usize) -> ApiFuture<Vec<Reading>> {
        let mut script = self.script.borrow_mut();
        script.calls.push(Call::Readings { device_id, limit });
        let result = take(&mut script.readings, Vec::new());
        respond(result, format!("devices/readings/device/{}", device_id))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Rendered {
    Companies(Vec<i64>),
    Grid {
        device_ids: Vec<i64>,
        online: usize,
        total: usize,
    },
    Detail {
        device_id: i64,
        temperature: Vec<Option<f64>>,
    },
    Mode(ViewMode),
    CameOnline(i64),
    Notice(String),
}

#[derive(Debug, Default)]
pub struct RecordingRenderer {
    pub events: Vec<Rendered>,
}

impl RecordingRenderer {
    pub fn last_grid(&self) -> Option<&Rendered> {
        self.events
            .iter()
            .rev()
            .find(|e| matches!(e, Rendered::Grid { .. }))
    }

    pub fn notices(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Rendered::Notice(message) => Some(message.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn came_online(&self) -> Vec<i64> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Rendered::CameOnline(id) => Some(*id),
                _ => None,
            })
            .collect()
    }
}

impl Renderer for RecordingRenderer {
    fn render_companies(&mut self, companies: &[Company]) {
        self.events
            .push(Rendered::Companies(companies.iter().map(|c| c.id).collect()));
    }

    fn render_grid(&mut self, view: &GridView<'_>) {
        self.events.push(Rendered::Grid {
            device_ids: view.devices.iter().map(|d| d.device_id).collect(),
            online: view.online_count,
            total: view.total_count,
        });
    }

    fn render_detail(&mut self, view: &DetailView<'_>) {
        let temperature = view
            .series
            .series(sensor_dashboard_sync::models::Metric::Temperature)
            .map(|s| s.values().collect())
            .unwrap_or_default();
        self.events.push(Rendered::Detail {
            device_id: view.device_id,
            temperature,
        });
    }

    fn view_mode_changed(&mut self, mode: &ViewMode) {
        self.events.push(Rendered::Mode(mode.clone()));
    }

    fn device_came_online(&mut self, device: &Device) {
        self.events.push(Rendered::CameOnline(device.device_id));
    }

    fn notify(&mut self, message: &str) {
        self.events.push(Rendered::Notice(message.to_string()));
    }
}

pub fn device(id: i64, name: &str, status: DeviceStatus) -> Device {
    Device {
        device_id: id,
        device_name: name.to_string(),
        status,
        last_read_at: None,
    }
}

pub fn reading(second: u32, temperature: Option<f64>) -> Reading {
    Reading {
        timestamp: Some(format!("2025-10-14T10:00:{:02}Z", second)),
        temperature,
        humidity: Some(40.0),
        ..Default::default()
    }
}

pub fn test_config() -> DashboardConfig {
    DashboardConfig {
        list_poll_interval: Duration::from_secs(10),
        detail_poll_interval: Duration::from_secs(3),
        ..DashboardConfig::default()
    }
}
