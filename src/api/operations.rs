/// HTTP implementation of the dashboard API
use futures_util::FutureExt;

use crate::api::connection::{get_json, ApiEndpoint};
use crate::api::{ApiFuture, TelemetryApi};
use crate::models::{Company, Device, Reading};

#[derive(Debug, Clone)]
pub struct HttpApi {
    client: reqwest::Client,
    endpoint: ApiEndpoint,
}

impl HttpApi {
    pub fn new(endpoint: ApiEndpoint) -> Self {
        Self::with_client(reqwest::Client::new(), endpoint)
    }

    /// Use a preconfigured client (timeouts, proxy settings)
    ///
    /// # Arguments
    /// * `client` - Client shared by every request of this API
    /// * `endpoint` - Base address the routes are joined onto
    pub fn with_client(client: reqwest::Client, endpoint: ApiEndpoint) -> Self {
        HttpApi { client, endpoint }
    }
}

impl TelemetryApi for HttpApi {
    /// Fetch all companies, ordered by name on the server side
    fn companies(&self) -> ApiFuture<Vec<Company>> {
        let client = self.client.clone();
        let url = self.endpoint.companies();
        async move { get_json::<Vec<Company>>(&client, url?).await }.boxed_local()
    }

    /// Fetch the current device snapshot for one company
    ///
    /// The backend derives `status` from the age of the newest reading, so
    /// every call is a complete point-in-time list.
    fn devices(&self, company_id: i64) -> ApiFuture<Vec<Device>> {
        let client = self.client.clone();
        let url = self.endpoint.devices(company_id);
        async move { get_json::<Vec<Device>>(&client, url?).await }.boxed_local()
    }

    /// Fetch the newest `limit` readings of one device
    ///
    /// The server answers oldest first, with `inserted_at` as the timestamp.
    fn readings(&self, device_id: i64, limit: usize) -> ApiFuture<Vec<Reading>> {
        let client = self.client.clone();
        let url = self.endpoint.readings(device_id, limit);
        async move { get_json::<Vec<Reading>>(&client, url?).await }.boxed_local()
    }
}
