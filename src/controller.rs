//! View controller: owns the grid/detail mode and everything polled for it
//!
//! All state lives here and is only touched from the task that runs
//! [`ViewController::run`]. Fetches are kept as local futures in a
//! `FuturesUnordered`, so a response is applied between two events and never
//! concurrently with another one. Whether it is applied at all depends on the
//! session token it was issued under.

use futures_util::future::LocalBoxFuture;
use futures_util::stream::{FuturesUnordered, StreamExt};
use futures_util::FutureExt;
use log::{debug, info, warn};
use std::time::Duration;
use time::OffsetDateTime;
use tokio::sync::mpsc;

use crate::api::TelemetryApi;
use crate::commands::Command;
use crate::config::DashboardConfig;
use crate::error::{FetchError, SyncError};
use crate::models::{Company, Device, Reading, StatusFilter};
use crate::render::{DetailView, GridView, Renderer};
use crate::sync::{
    filter, DeviceStateStore, PollRequest, PollTarget, PollingScheduler, SensorStats,
    SessionToken, TimeSeriesBuffer, TransitionEvent,
};

/// Readings requested on each detail tick; only the newest is charted
const LATEST_LIMIT: usize = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewMode {
    Grid,
    Detail { device_id: i64, device_name: String },
}

#[derive(Debug)]
enum Payload {
    Companies(Result<Vec<Company>, FetchError>),
    Devices(Result<Vec<Device>, FetchError>),
    History(Result<Vec<Reading>, FetchError>),
    Latest(Result<Vec<Reading>, FetchError>),
}

/// A completed fetch, tagged with the session that issued it
///
/// Company list fetches are not part of any polling loop and carry no token.
/// `seq` is the issue order across all fetches of the controller.
#[derive(Debug)]
pub struct FetchOutcome {
    session: Option<SessionToken>,
    seq: u64,
    payload: Payload,
}

pub struct ViewController<A, R> {
    api: A,
    renderer: R,
    list_interval: Duration,
    detail_interval: Duration,
    history_limit: usize,

    scheduler: PollingScheduler,
    store: DeviceStateStore,
    buffer: TimeSeriesBuffer,
    stats: SensorStats,

    mode: ViewMode,
    companies: Vec<Company>,
    company_id: Option<i64>,
    status_filter: StatusFilter,
    search_term: String,
    auto_refresh: bool,
    paused: bool,
    latest_reading: Option<Reading>,
    last_updated: Option<OffsetDateTime>,

    issued: u64,
    /// Newest snapshot (device list or latest reading) applied, per session
    newest_applied: Option<(SessionToken, u64)>,
    in_flight: FuturesUnordered<LocalBoxFuture<'static, FetchOutcome>>,
}

impl<A, R> ViewController<A, R>
where
    A: TelemetryApi,
    R: Renderer,
{
    pub fn new(api: A, renderer: R, config: &DashboardConfig) -> Self {
        ViewController {
            api,
            renderer,
            list_interval: config.list_poll_interval,
            detail_interval: config.detail_poll_interval,
            history_limit: config.history_limit,
            scheduler: PollingScheduler::new(),
            store: DeviceStateStore::default(),
            buffer: TimeSeriesBuffer::new(config.chart_capacity),
            stats: SensorStats::default(),
            mode: ViewMode::Grid,
            companies: Vec::new(),
            company_id: None,
            status_filter: StatusFilter::All,
            search_term: String::new(),
            auto_refresh: config.auto_refresh,
            paused: false,
            latest_reading: None,
            last_updated: None,
            issued: 0,
            newest_applied: None,
            in_flight: FuturesUnordered::new(),
        }
    }

    /// Process commands, timer ticks and fetch results until `Quit`
    pub async fn run(&mut self, mut commands: mpsc::UnboundedReceiver<Command>) {
        info!("Starting dashboard sync");
        self.on_companies_requested();

        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(Command::Quit) | None => break,
                    Some(command) => self.handle_command(command),
                },
                request = self.scheduler.next_tick() => self.dispatch(request),
                Some(outcome) = self.in_flight.next(), if !self.in_flight.is_empty() => {
                    self.handle_outcome(outcome)
                }
            }
        }

        self.scheduler.stop();
        info!("Dashboard sync stopped");
    }

    /// Route a user command to its handler
    pub fn handle_command(&mut self, command: Command) {
        debug!("Command: {:?}", command);
        match command {
            Command::Companies => self.on_companies_requested(),
            Command::SelectCompany(company_id) => self.on_company_selected(company_id),
            Command::OpenDevice {
                device_id,
                device_name,
            } => {
                let device_name = device_name
                    .or_else(|| self.device_name(device_id))
                    .unwrap_or_else(|| format!("Device {}", device_id));
                self.on_device_card_clicked(device_id, &device_name);
            }
            Command::CloseDetail => self.on_close_detail(),
            Command::Filter(filter) => self.on_filter_changed(filter),
            Command::Search(term) => self.on_search_changed(&term),
            Command::AutoRefresh(enabled) => self.on_auto_refresh_changed(enabled),
            Command::TogglePause => self.on_pause_toggled(),
            Command::Refresh => self.on_refresh_requested(),
            Command::Dashboard => self.on_dashboard_requested(),
            Command::Quit => self.scheduler.stop(),
        }
    }

    /// Load the company list; not tied to any polling session
    pub fn on_companies_requested(&mut self) {
        let seq = self.next_seq();
        let fetch = self.api.companies();
        self.in_flight.push(
            async move {
                FetchOutcome {
                    session: None,
                    seq,
                    payload: Payload::Companies(fetch.await),
                }
            }
            .boxed_local(),
        );
    }

    /// Switch to another company; an open detail view is closed first
    pub fn on_company_selected(&mut self, company_id: i64) {
        let left_detail = matches!(self.mode, ViewMode::Detail { .. });
        if left_detail {
            self.leave_detail();
        }
        let changed = self.company_id != Some(company_id);
        if changed {
            info!("Selected company {}", company_id);
            self.store.clear();
            self.last_updated = None;
            self.company_id = Some(company_id);
        }
        if changed || left_detail {
            self.render_grid();
        }
        self.start_loop(PollTarget::Grid { company_id });
    }

    /// Grid -> Detail: stop list polling, start over with this device's history
    ///
    /// Chart series and stats of any previous device are discarded before the
    /// history request goes out.
    ///
    /// # Arguments
    /// * `device_id` - Device to chart
    /// * `device_name` - Name shown in the detail header
    pub fn on_device_card_clicked(&mut self, device_id: i64, device_name: &str) {
        self.scheduler.stop();
        self.buffer.reset();
        self.stats.reset();
        self.latest_reading = None;

        self.mode = ViewMode::Detail {
            device_id,
            device_name: device_name.to_string(),
        };
        self.renderer.view_mode_changed(&self.mode);

        // The first request of a detail session is the history batch
        self.start_loop(PollTarget::Detail { device_id });
    }

    /// Detail -> Grid for the last selected company
    pub fn on_close_detail(&mut self) {
        if !matches!(self.mode, ViewMode::Detail { .. }) {
            return;
        }
        self.leave_detail();
        self.render_grid();
        if let Some(company_id) = self.company_id {
            self.start_loop(PollTarget::Grid { company_id });
        }
    }

    /// Re-render the grid from the cached snapshot; no fetch
    pub fn on_filter_changed(&mut self, filter: StatusFilter) {
        self.status_filter = filter;
        if self.mode == ViewMode::Grid {
            self.render_grid();
        }
    }

    pub fn on_search_changed(&mut self, term: &str) {
        self.search_term = term.to_string();
        if self.mode == ViewMode::Grid {
            self.render_grid();
        }
    }

    pub fn on_auto_refresh_changed(&mut self, enabled: bool) {
        self.auto_refresh = enabled;
        self.apply_polling_flags();
    }

    pub fn on_pause_toggled(&mut self) {
        self.paused = !self.paused;
        info!("{}", if self.paused { "Paused" } else { "Resumed" });
        self.apply_polling_flags();
    }

    /// One immediate fetch for the visible view, without touching the cadence
    pub fn on_refresh_requested(&mut self) {
        match self.current_target() {
            Some(target) => {
                let request = self.scheduler.fetch_once(target);
                self.dispatch(request);
            }
            None => self.renderer.notify("Please select a company first"),
        }
    }

    /// Open the charts of the first device of the current snapshot
    pub fn on_dashboard_requested(&mut self) {
        match self.store.latest().first() {
            Some(device) => {
                let (device_id, device_name) = (device.device_id, device.device_name.clone());
                self.on_device_card_clicked(device_id, &device_name);
            }
            None => self.renderer.notify("Please select a company first"),
        }
    }

    /// Wait for the next in-flight fetch and apply it
    ///
    /// Returns `false` when nothing is in flight.
    pub async fn process_next_outcome(&mut self) -> bool {
        match self.in_flight.next().await {
            Some(outcome) => {
                self.handle_outcome(outcome);
                true
            }
            None => false,
        }
    }

    /// Apply a finished fetch, or drop it when it is no longer wanted
    ///
    /// Responses of stopped sessions and responses overtaken by a newer one
    /// of the same session are discarded silently. A failed fetch keeps all
    /// state as it was and produces a single notice; polling carries on.
    pub fn handle_outcome(&mut self, outcome: FetchOutcome) {
        match self.apply_outcome(outcome) {
            Ok(()) => {}
            Err(SyncError::StaleResponse(session)) => {
                debug!("Discarding response from stale session {}", session);
            }
            Err(err @ SyncError::Superseded { .. }) => {
                debug!("Discarding out-of-order response: {}", err);
            }
            Err(SyncError::Fetch(err)) => {
                warn!("Fetch failed, keeping last known state: {}", err);
                self.renderer.notify(&format!("Update failed: {}", err));
            }
        }
    }

    /// Issue the fetch for a scheduler request
    ///
    /// The fetch is queued in flight and applied by a later call to
    /// `handle_outcome`, provided its session is still active by then.
    ///
    /// # Arguments
    /// * `request` - Request handed out by the scheduler; an initial detail
    ///   request loads the history batch, later ones only the newest reading
    pub fn dispatch(&mut self, request: PollRequest) {
        let session = Some(request.session);
        let seq = self.next_seq();
        let outcome = match request.target {
            PollTarget::Grid { company_id } => {
                let fetch = self.api.devices(company_id);
                async move {
                    FetchOutcome {
                        session,
                        seq,
                        payload: Payload::Devices(fetch.await),
                    }
                }
                .boxed_local()
            }
            PollTarget::Detail { device_id } if request.initial => {
                let fetch = self.api.readings(device_id, self.history_limit);
                async move {
                    FetchOutcome {
                        session,
                        seq,
                        payload: Payload::History(fetch.await),
                    }
                }
                .boxed_local()
            }
            PollTarget::Detail { device_id } => {
                let fetch = self.api.readings(device_id, LATEST_LIMIT);
                async move {
                    FetchOutcome {
                        session,
                        seq,
                        payload: Payload::Latest(fetch.await),
                    }
                }
                .boxed_local()
            }
        };
        self.in_flight.push(outcome);
    }

    pub fn mode(&self) -> &ViewMode {
        &self.mode
    }

    pub fn company_id(&self) -> Option<i64> {
        self.company_id
    }

    pub fn companies(&self) -> &[Company] {
        &self.companies
    }

    pub fn scheduler(&self) -> &PollingScheduler {
        &self.scheduler
    }

    pub fn store(&self) -> &DeviceStateStore {
        &self.store
    }

    pub fn buffer(&self) -> &TimeSeriesBuffer {
        &self.buffer
    }

    pub fn stats(&self) -> &SensorStats {
        &self.stats
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn last_updated(&self) -> Option<OffsetDateTime> {
        self.last_updated
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Loops run only with auto-refresh on and not paused
    pub fn is_polling_enabled(&self) -> bool {
        self.auto_refresh && !self.paused
    }

    fn apply_outcome(&mut self, outcome: FetchOutcome) -> Result<(), SyncError> {
        let FetchOutcome {
            session,
            seq,
            payload,
        } = outcome;
        if let Some(session) = session {
            if !self.scheduler.is_active(session) {
                return Err(SyncError::StaleResponse(session));
            }
            if matches!(payload, Payload::Devices(_) | Payload::Latest(_)) {
                if let Some((applied, newest)) = self.newest_applied {
                    if applied == session && seq < newest {
                        return Err(SyncError::Superseded {
                            session,
                            seq,
                            newest,
                        });
                    }
                }
            }
        }

        match payload {
            Payload::Companies(result) => {
                self.companies = result?;
                self.renderer.render_companies(&self.companies);
            }
            Payload::Devices(result) => {
                let devices = result?;
                self.mark_applied(session, seq);
                let events = self.store.reconcile(devices);
                self.last_updated = Some(OffsetDateTime::now_utc());
                for TransitionEvent::DeviceCameOnline(device) in &events {
                    self.renderer.device_came_online(device);
                }
                if self.mode == ViewMode::Grid {
                    self.render_grid();
                }
            }
            Payload::History(result) => {
                let readings = result?;
                self.buffer.load_batch(&readings);
                self.stats.reset();
                for reading in &readings {
                    self.stats.record_reading(reading);
                }
                self.latest_reading = readings.last().cloned();
                self.last_updated = Some(OffsetDateTime::now_utc());
                self.render_detail();
            }
            Payload::Latest(result) => {
                let readings = result?;
                self.mark_applied(session, seq);
                if let Some(reading) = readings.last() {
                    if self.is_new_reading(reading) {
                        self.buffer.push_reading(reading);
                        self.stats.record_reading(reading);
                        self.latest_reading = Some(reading.clone());
                    } else {
                        debug!("No new reading since {:?}", reading.timestamp);
                    }
                }
                self.last_updated = Some(OffsetDateTime::now_utc());
                self.render_detail();
            }
        }
        Ok(())
    }

    fn next_seq(&mut self) -> u64 {
        self.issued += 1;
        self.issued
    }

    fn mark_applied(&mut self, session: Option<SessionToken>, seq: u64) {
        if let Some(session) = session {
            self.newest_applied = Some((session, seq));
        }
    }

    /// A reading with the same timestamp as the last charted one is a repeat
    fn is_new_reading(&self, reading: &Reading) -> bool {
        match (&self.latest_reading, &reading.timestamp) {
            (Some(previous), Some(timestamp)) => previous.timestamp.as_ref() != Some(timestamp),
            _ => true,
        }
    }

    fn current_target(&self) -> Option<PollTarget> {
        match &self.mode {
            ViewMode::Grid => self
                .company_id
                .map(|company_id| PollTarget::Grid { company_id }),
            ViewMode::Detail { device_id, .. } => Some(PollTarget::Detail {
                device_id: *device_id,
            }),
        }
    }

    /// Run the loop for `target` when polling is enabled, otherwise fetch once
    fn start_loop(&mut self, target: PollTarget) {
        let request = if self.is_polling_enabled() {
            match target {
                PollTarget::Grid { company_id } => self
                    .scheduler
                    .start_grid_polling(company_id, self.list_interval),
                PollTarget::Detail { device_id } => self
                    .scheduler
                    .start_detail_polling(device_id, self.detail_interval),
            }
        } else {
            Some(self.scheduler.fetch_once(target))
        };

        if let Some(request) = request {
            self.dispatch(request);
        }
    }

    fn apply_polling_flags(&mut self) {
        if !self.is_polling_enabled() {
            self.scheduler.stop();
            return;
        }
        if let Some(target) = self.current_target() {
            self.start_loop(target);
        }
    }

    fn leave_detail(&mut self) {
        self.scheduler.stop();
        self.buffer.reset();
        self.stats.reset();
        self.latest_reading = None;
        self.mode = ViewMode::Grid;
        self.renderer.view_mode_changed(&self.mode);
    }

    fn device_name(&self, device_id: i64) -> Option<String> {
        self.store
            .latest()
            .iter()
            .find(|d| d.device_id == device_id)
            .map(|d| d.device_name.clone())
    }

    fn render_grid(&mut self) {
        let devices = self.store.latest();
        let view = GridView {
            company_id: self.company_id,
            devices: filter::apply(devices, self.status_filter, Some(&self.search_term)),
            online_count: self.store.online_count(),
            total_count: devices.len(),
            last_updated: self.last_updated,
        };
        self.renderer.render_grid(&view);
    }

    fn render_detail(&mut self) {
        let ViewMode::Detail {
            device_id,
            device_name,
        } = &self.mode
        else {
            return;
        };
        let view = DetailView {
            device_id: *device_id,
            device_name,
            series: &self.buffer,
            stats: &self.stats,
            latest: self.latest_reading.as_ref(),
            last_updated: self.last_updated,
        };
        self.renderer.render_detail(&view);
    }
}
