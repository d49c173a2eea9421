//! Alert and record payloads as delivered by the sensor service.
//!
//! These types match the JSON served by the bulk endpoints and carried by
//! `newAlert` / `newRecord` push events. Timestamps are accepted either as
//! RFC 3339 strings or as epoch milliseconds.

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

/// A user-facing notice tied to a sensor threshold breach.
///
/// `message` and `value` are optional on the wire. An alert missing either
/// is still listed, but never produces a notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    /// Sensor identifier (e.g. "Temperature").
    #[serde(default)]
    pub sensor: String,

    /// Human-readable description of the breach.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Reading that triggered the alert.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,

    /// When the alert was raised. Locally synthesized alerts may omit it.
    #[serde(default, with = "timestamp::option", skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl Alert {
    /// Create an alert with a message and value but no timestamp.
    pub fn new(sensor: impl Into<String>, message: impl Into<String>, value: f64) -> Self {
        Self {
            sensor: sensor.into(),
            message: Some(message.into()),
            value: Some(value),
            timestamp: None,
        }
    }

    /// Attach a timestamp.
    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }
}

/// A raw sensor reading, delivered independent of threshold state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Sensor identifier (e.g. "Vibration").
    pub sensor: String,
    /// The reading.
    pub value: f64,
    /// When the reading was taken.
    #[serde(with = "timestamp")]
    pub timestamp: DateTime<Utc>,
}

impl Record {
    pub fn new(sensor: impl Into<String>, value: f64, timestamp: DateTime<Utc>) -> Self {
        Self {
            sensor: sensor.into(),
            value,
            timestamp,
        }
    }
}

/// Format a timestamp as local time-of-day, as used for chart labels.
pub fn time_label(ts: &DateTime<Utc>) -> String {
    ts.with_timezone(&Local).format("%H:%M:%S").to_string()
}

/// Format a timestamp as a local date and time, as used on cards.
pub fn display_time(ts: &DateTime<Utc>) -> String {
    ts.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Timestamp (de)serialization accepting RFC 3339 text or epoch milliseconds.
mod timestamp {
    use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum WireTimestamp {
        Millis(i64),
        Text(String),
    }

    impl WireTimestamp {
        fn into_datetime<E: Error>(self) -> Result<DateTime<Utc>, E> {
            match self {
                WireTimestamp::Millis(ms) => Utc
                    .timestamp_millis_opt(ms)
                    .single()
                    .ok_or_else(|| E::custom(format!("timestamp out of range: {}", ms))),
                WireTimestamp::Text(text) => DateTime::parse_from_rfc3339(&text)
                    .map(|dt| dt.with_timezone(&Utc))
                    .map_err(|e| E::custom(format!("invalid timestamp {:?}: {}", text, e))),
            }
        }
    }

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        WireTimestamp::deserialize(deserializer)?.into_datetime()
    }

    pub mod option {
        use super::*;

        pub fn serialize<S: Serializer>(
            ts: &Option<DateTime<Utc>>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match ts {
                Some(ts) => super::serialize(ts, serializer),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<DateTime<Utc>>, D::Error> {
            Option::<WireTimestamp>::deserialize(deserializer)?
                .map(WireTimestamp::into_datetime)
                .transpose()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_deserialize_record_with_rfc3339_timestamp() {
        let json = r#"{"sensor":"Temperature","value":51.5,"timestamp":"2024-03-01T10:15:00Z"}"#;
        let record: Record = serde_json::from_str(json).unwrap();

        assert_eq!(record.sensor, "Temperature");
        assert_eq!(record.value, 51.5);
        assert_eq!(record.timestamp, Utc.with_ymd_and_hms(2024, 3, 1, 10, 15, 0).unwrap());
    }

    #[test]
    fn test_deserialize_record_with_epoch_millis() {
        let json = r#"{"sensor":"Vibration","value":12,"timestamp":1709288100000}"#;
        let record: Record = serde_json::from_str(json).unwrap();

        assert_eq!(record.timestamp, Utc.with_ymd_and_hms(2024, 3, 1, 10, 15, 0).unwrap());
    }

    #[test]
    fn test_record_rejects_garbage_timestamp() {
        let json = r#"{"sensor":"Vibration","value":12,"timestamp":"yesterday"}"#;
        assert!(serde_json::from_str::<Record>(json).is_err());
    }

    #[test]
    fn test_alert_optional_fields() {
        let json = r#"{"sensor":"Pressure"}"#;
        let alert: Alert = serde_json::from_str(json).unwrap();

        assert_eq!(alert.sensor, "Pressure");
        assert!(alert.message.is_none());
        assert!(alert.value.is_none());
        assert!(alert.timestamp.is_none());
    }

    #[test]
    fn test_alert_serializes_without_missing_fields() {
        let alert = Alert::new("Temperature", "Temperature threshold crossed!", 55.0);
        let json = serde_json::to_value(&alert).unwrap();

        assert_eq!(json["message"], "Temperature threshold crossed!");
        assert!(json.get("timestamp").is_none());
    }

    #[test]
    fn test_time_label_is_local_time_of_day() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 1, 10, 15, 30).unwrap();
        let expected = ts.with_timezone(&Local).format("%H:%M:%S").to_string();
        assert_eq!(time_label(&ts), expected);
    }
}
