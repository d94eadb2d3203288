pub mod connection;
pub mod operations;

use futures_util::future::LocalBoxFuture;

use crate::error::FetchError;
use crate::models::{Company, Device, Reading};

pub use connection::ApiEndpoint;
pub use operations::HttpApi;

pub type ApiFuture<T> = LocalBoxFuture<'static, Result<T, FetchError>>;

/// Read-only access to the dashboard REST backend
///
/// Each call returns an owned future so the caller can keep several requests
/// in flight on one task and drop the ones it no longer cares about.
pub trait TelemetryApi {
    fn companies(&self) -> ApiFuture<Vec<Company>>;

    fn devices(&self, company_id: i64) -> ApiFuture<Vec<Device>>;

    /// Most recent `limit` readings, oldest first
    fn readings(&self, device_id: i64, limit: usize) -> ApiFuture<Vec<Reading>>;
}
