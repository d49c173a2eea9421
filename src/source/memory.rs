//! In-memory sensor service.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use super::SensorApi;
use crate::data::{Alert, Record};
use crate::error::RetrievalError;

/// A [`SensorApi`] serving fixed payloads.
///
/// Payloads can be swapped at runtime and the service can be switched into
/// a failing state, which makes it suitable for tests and offline demos.
#[derive(Debug)]
pub struct StaticSensorApi {
    alerts: Mutex<Vec<Alert>>,
    records: Mutex<Vec<Record>>,
    failure: Mutex<Option<String>>,
    records_failure: Mutex<Option<String>>,
    fetches: AtomicUsize,
}

impl StaticSensorApi {
    pub fn new(alerts: Vec<Alert>, records: Vec<Record>) -> Self {
        Self {
            alerts: Mutex::new(alerts),
            records: Mutex::new(records),
            failure: Mutex::new(None),
            records_failure: Mutex::new(None),
            fetches: AtomicUsize::new(0),
        }
    }

    /// A service whose every fetch fails with a connection error.
    pub fn failing(reason: &str) -> Self {
        let api = Self::new(Vec::new(), Vec::new());
        api.fail_with(Some(reason));
        api
    }

    pub fn set_alerts(&self, alerts: Vec<Alert>) {
        *self.alerts.lock() = alerts;
    }

    pub fn set_records(&self, records: Vec<Record>) {
        *self.records.lock() = records;
    }

    /// Make fetches fail (`Some`) or succeed again (`None`).
    pub fn fail_with(&self, reason: Option<&str>) {
        *self.failure.lock() = reason.map(str::to_string);
    }

    /// Make only record fetches fail (`Some`) or succeed again (`None`).
    pub fn fail_records_with(&self, reason: Option<&str>) {
        *self.records_failure.lock() = reason.map(str::to_string);
    }

    /// Total number of fetches served, successful or not.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<(), RetrievalError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        match self.failure.lock().as_ref() {
            Some(reason) => Err(RetrievalError::Connection(reason.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl SensorApi for StaticSensorApi {
    async fn fetch_alerts(&self) -> Result<Vec<Alert>, RetrievalError> {
        self.check()?;
        Ok(self.alerts.lock().clone())
    }

    async fn fetch_records(&self) -> Result<Vec<Record>, RetrievalError> {
        self.check()?;
        if let Some(reason) = self.records_failure.lock().as_ref() {
            return Err(RetrievalError::Connection(reason.clone()));
        }
        Ok(self.records.lock().clone())
    }

    fn description(&self) -> &str {
        "static"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[tokio::test]
    async fn test_serves_payloads() {
        let api = StaticSensorApi::new(
            vec![Alert::new("Temperature", "hot", 55.0)],
            vec![Record::new("Vibration", 3.0, Utc::now())],
        );

        assert_eq!(api.fetch_alerts().await.unwrap().len(), 1);
        assert_eq!(api.fetch_records().await.unwrap().len(), 1);
        assert_eq!(api.fetch_count(), 2);
    }

    #[tokio::test]
    async fn test_failing_service() {
        let api = StaticSensorApi::failing("unreachable");
        let err = api.fetch_records().await.unwrap_err();
        assert!(err.to_string().contains("unreachable"));

        api.fail_with(None);
        assert!(api.fetch_records().await.unwrap().is_empty());
    }
}
