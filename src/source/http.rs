//! HTTP client for the alert/record service.
//!
//! Issues plain `GET` requests against two endpoints below a base URL:
//!
//! - `GET <base>/alerts` → `[Alert]`
//! - `GET <base>/records` → `[Record]`
//!
//! ## Example
//!
//! ```rust,no_run
//! use prevenix_dashboard::{HttpSensorApi, SensorApi};
//! use prevenix_dashboard::config::ApiSettings;
//!
//! # tokio_test::block_on(async {
//! let api = HttpSensorApi::new(&ApiSettings::default()).unwrap();
//! let records = api.fetch_records().await.unwrap();
//! println!("{} records", records.len());
//! # });
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use super::SensorApi;
use crate::config::ApiSettings;
use crate::data::{Alert, Record};
use crate::error::RetrievalError;

/// [`SensorApi`] backed by the remote HTTP service.
#[derive(Debug, Clone)]
pub struct HttpSensorApi {
    client: Client,
    alerts_url: Url,
    records_url: Url,
    description: String,
}

impl HttpSensorApi {
    /// Build a client for the configured endpoints.
    pub fn new(settings: &ApiSettings) -> Result<Self, RetrievalError> {
        let base = base_url(&settings.base_url)?;
        let alerts_url = join(&base, &settings.alerts_path)?;
        let records_url = join(&base, &settings.records_path)?;

        let client = Client::builder()
            .timeout(Duration::from_millis(settings.timeout_ms))
            .build()?;

        Ok(Self {
            client,
            alerts_url,
            records_url,
            description: format!("http: {}", base),
        })
    }

    pub fn alerts_url(&self) -> &Url {
        &self.alerts_url
    }

    pub fn records_url(&self) -> &Url {
        &self.records_url
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &Url) -> Result<T, RetrievalError> {
        debug!(%url, "fetching");
        let response = self.client.get(url.clone()).send().await?;

        if !response.status().is_success() {
            return Err(RetrievalError::Status(response.status().as_u16()));
        }

        response.json().await.map_err(|e| RetrievalError::Parse(e.to_string()))
    }
}

#[async_trait]
impl SensorApi for HttpSensorApi {
    async fn fetch_alerts(&self) -> Result<Vec<Alert>, RetrievalError> {
        self.get_json(&self.alerts_url).await
    }

    async fn fetch_records(&self) -> Result<Vec<Record>, RetrievalError> {
        self.get_json(&self.records_url).await
    }

    fn description(&self) -> &str {
        &self.description
    }
}

/// Parse the base URL, making sure its path ends in a slash so that
/// endpoint paths are joined below it rather than replacing its last segment.
fn base_url(raw: &str) -> Result<Url, RetrievalError> {
    let mut url = Url::parse(raw).map_err(|e| RetrievalError::Endpoint {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

fn join(base: &Url, path: &str) -> Result<Url, RetrievalError> {
    base.join(path.trim_start_matches('/')).map_err(|e| RetrievalError::Endpoint {
        url: format!("{}{}", base, path),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(base: &str) -> ApiSettings {
        ApiSettings {
            base_url: base.to_string(),
            ..ApiSettings::default()
        }
    }

    #[test]
    fn test_endpoints_below_bare_host() {
        let api = HttpSensorApi::new(&settings("https://sensors.example.com")).unwrap();
        assert_eq!(api.alerts_url().as_str(), "https://sensors.example.com/alerts");
        assert_eq!(api.records_url().as_str(), "https://sensors.example.com/records");
    }

    #[test]
    fn test_endpoints_below_base_path() {
        let api = HttpSensorApi::new(&settings("http://localhost:8080/api/v1")).unwrap();
        assert_eq!(api.alerts_url().as_str(), "http://localhost:8080/api/v1/alerts");
        assert_eq!(api.description(), "http: http://localhost:8080/api/v1/");
    }

    #[test]
    fn test_custom_paths() {
        let mut s = settings("http://localhost:8080/");
        s.alerts_path = "/v2/alerts".to_string();
        let api = HttpSensorApi::new(&s).unwrap();
        assert_eq!(api.alerts_url().as_str(), "http://localhost:8080/v2/alerts");
    }

    #[test]
    fn test_invalid_base_url() {
        let err = HttpSensorApi::new(&settings("not a url")).unwrap_err();
        assert!(matches!(err, RetrievalError::Endpoint { .. }));
    }

    #[tokio::test]
    async fn test_unreachable_service_is_a_retrieval_error() {
        // Port 9 (discard) is not expected to serve HTTP.
        let mut s = settings("http://127.0.0.1:9");
        s.timeout_ms = 500;
        let api = HttpSensorApi::new(&s).unwrap();
        assert!(api.fetch_alerts().await.is_err());
    }
}
