pub mod api;
pub mod commands;
pub mod config;
pub mod controller;
pub mod error;
pub mod models;
pub mod render;
pub mod sync;
pub mod utils;

pub use commands::Command;
pub use config::DashboardConfig;
pub use controller::{ViewController, ViewMode};
