use log::{debug, warn};
use serde::de::DeserializeOwned;
use url::Url;

use crate::config::DashboardConfig;
use crate::error::FetchError;

/// Base address of the dashboard API, e.g. `http://localhost:5000/api/`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiEndpoint {
    base: Url,
}

impl ApiEndpoint {
    pub fn new(host: &str, port: u16, prefix: &str) -> Result<Self, FetchError> {
        let mut base = Url::parse(&format!("http://{}:{}", host, port))?;
        // Trailing slash so that joined paths land below the prefix
        base.set_path(&format!("{}/", prefix.trim_end_matches('/')));
        Ok(ApiEndpoint { base })
    }

    pub fn from_config(config: &DashboardConfig) -> Result<Self, FetchError> {
        Self::new(&config.api_host, config.api_port, &config.api_prefix)
    }

    pub fn companies(&self) -> Result<Url, FetchError> {
        Ok(self.base.join("companies/")?)
    }

    pub fn devices(&self, company_id: i64) -> Result<Url, FetchError> {
        Ok(self.base.join(&format!("devices/company/{}", company_id))?)
    }

    pub fn readings(&self, device_id: i64, limit: usize) -> Result<Url, FetchError> {
        let mut url = self
            .base
            .join(&format!("devices/readings/device/{}", device_id))?;
        url.query_pairs_mut()
            .append_pair("limit", &limit.to_string());
        Ok(url)
    }
}

/// GET a URL and decode the JSON body
///
/// Any non-2xx status is reported as a failure; the body is only decoded for
/// successful responses.
pub async fn get_json<T>(client: &reqwest::Client, url: Url) -> Result<T, FetchError>
where
    T: DeserializeOwned,
{
    debug!("GET {}", url);
    let response = client.get(url.clone()).send().await?;

    let status = response.status();
    if !status.is_success() {
        warn!("{} returned {}", url, status);
        return Err(FetchError::Status {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }

    let body = response.text().await?;
    Ok(serde_json::from_str(&body)?)
}
