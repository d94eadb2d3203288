//! Mutually exclusive grid/detail polling loops with session tokens
//!
//! The scheduler never performs a fetch itself. It hands out `PollRequest`s
//! tagged with the token of the session that produced them, and the owner
//! checks `is_active` before applying the matching response. Stopping or
//! replacing a session makes every request issued under it inert.

use log::debug;
use std::fmt;
use std::time::Duration;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionToken(u64);

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What a session polls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollTarget {
    Grid { company_id: i64 },
    Detail { device_id: i64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollRequest {
    pub session: SessionToken,
    pub target: PollTarget,
    /// First request of a session, issued without waiting for the timer
    pub initial: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    GridPolling { company_id: i64 },
    DetailPolling { device_id: i64 },
}

#[derive(Debug, Clone, Copy)]
struct ActiveSession {
    token: SessionToken,
    target: PollTarget,
}

#[derive(Debug, Default)]
pub struct PollingScheduler {
    generation: u64,
    active: Option<ActiveSession>,
    timer: Option<Interval>,
}

impl PollingScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Poll a company's device list every `period`
    ///
    /// Any other session, grid or detail, is stopped first.
    ///
    /// # Arguments
    /// * `company_id` - Company whose devices are listed
    /// * `period` - Time between ticks; the first tick comes one period
    ///   after the immediate request
    ///
    /// # Returns
    /// The immediate request, or `None` when this exact loop is already
    /// running
    pub fn start_grid_polling(&mut self, company_id: i64, period: Duration) -> Option<PollRequest> {
        self.start(PollTarget::Grid { company_id }, period)
    }

    /// Poll one device's readings every `period`
    ///
    /// Same rules as `start_grid_polling`. The immediate request is marked
    /// `initial` so the owner can load the history batch for it.
    pub fn start_detail_polling(&mut self, device_id: i64, period: Duration) -> Option<PollRequest> {
        self.start(PollTarget::Detail { device_id }, period)
    }

    /// A single request for `target` without arming the timer
    ///
    /// Reuses the active token when it already targets the same thing,
    /// otherwise the current session is replaced.
    pub fn fetch_once(&mut self, target: PollTarget) -> PollRequest {
        match self.active {
            Some(active) if active.target == target => PollRequest {
                session: active.token,
                target,
                initial: false,
            },
            _ => {
                self.stop();
                let token = self.open_session(target);
                PollRequest {
                    session: token,
                    target,
                    initial: true,
                }
            }
        }
    }

    /// Invalidate the current session and clear the timer
    pub fn stop(&mut self) {
        if let Some(active) = self.active.take() {
            debug!("Stopping poll session {} ({:?})", active.token, active.target);
        }
        self.timer = None;
    }

    /// Whether responses issued under `token` may still be applied
    ///
    /// # Arguments
    /// * `token` - Session carried by the request that produced the response
    ///
    /// # Returns
    /// `true` only for the current session; stopped and replaced sessions
    /// never become active again
    pub fn is_active(&self, token: SessionToken) -> bool {
        self.active.map_or(false, |active| active.token == token)
    }

    pub fn active_session(&self) -> Option<SessionToken> {
        self.active.map(|active| active.token)
    }

    pub fn is_timer_running(&self) -> bool {
        self.timer.is_some()
    }

    /// Polling state; a session without a timer (after `fetch_once`) counts as idle
    pub fn state(&self) -> SchedulerState {
        match (self.active, self.timer.is_some()) {
            (Some(active), true) => match active.target {
                PollTarget::Grid { company_id } => SchedulerState::GridPolling { company_id },
                PollTarget::Detail { device_id } => SchedulerState::DetailPolling { device_id },
            },
            _ => SchedulerState::Idle,
        }
    }

    /// Wait for the next timer tick of the active loop
    ///
    /// Never resolves while idle. Cancel-safe, so it can sit in a `select!`
    /// next to other event sources.
    pub async fn next_tick(&mut self) -> PollRequest {
        let (Some(timer), Some(active)) = (self.timer.as_mut(), self.active) else {
            return std::future::pending().await;
        };
        timer.tick().await;
        PollRequest {
            session: active.token,
            target: active.target,
            initial: false,
        }
    }

    fn start(&mut self, target: PollTarget, period: Duration) -> Option<PollRequest> {
        if self.timer.is_some() && self.active.map(|a| a.target) == Some(target) {
            debug!("Already polling {:?}", target);
            return None;
        }

        // Always through idle, so two loops never overlap
        self.stop();
        let token = self.open_session(target);

        let mut timer = interval_at(Instant::now() + period, period);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        self.timer = Some(timer);

        debug!("Polling {:?} every {:?} in session {}", target, period, token);
        Some(PollRequest {
            session: token,
            target,
            initial: true,
        })
    }

    fn open_session(&mut self, target: PollTarget) -> SessionToken {
        self.generation += 1;
        let token = SessionToken(self.generation);
        self.active = Some(ActiveSession { token, target });
        token
    }
}
