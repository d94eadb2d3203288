pub mod buffer;
pub mod filter;
pub mod scheduler;
pub mod stats;
pub mod store;

pub use buffer::{ChartSeries, TimeSeriesBuffer};
pub use scheduler::{PollRequest, PollTarget, PollingScheduler, SchedulerState, SessionToken};
pub use stats::SensorStats;
pub use store::{DeviceStateStore, TransitionEvent};
