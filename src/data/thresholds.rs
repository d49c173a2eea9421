//! Charted sensors and the threshold rules that synthesize local alerts.

use serde::{Deserialize, Serialize};

use super::reading::{Alert, Record};

/// A sensor that has its own chart series and threshold rule.
///
/// Identifiers are matched exactly (case-sensitive); any other sensor name
/// is listed but neither charted nor checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sensor {
    Temperature,
    Vibration,
}

impl Sensor {
    /// All charted sensors, in display order.
    pub const ALL: [Sensor; 2] = [Sensor::Temperature, Sensor::Vibration];

    /// Look up a sensor by its wire identifier.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Temperature" => Some(Sensor::Temperature),
            "Vibration" => Some(Sensor::Vibration),
            _ => None,
        }
    }

    /// The wire identifier, also used as the chart label.
    pub fn name(&self) -> &'static str {
        match self {
            Sensor::Temperature => "Temperature",
            Sensor::Vibration => "Vibration",
        }
    }

    /// Message carried by alerts synthesized for this sensor.
    pub fn breach_message(&self) -> &'static str {
        match self {
            Sensor::Temperature => "Temperature threshold crossed!",
            Sensor::Vibration => "Vibration threshold crossed!",
        }
    }
}

/// Limits above which a record synthesizes a local alert.
///
/// Comparisons are strict: a reading equal to the limit does not alert.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Temperature limit.
    pub temperature: f64,
    /// Vibration limit.
    pub vibration: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            temperature: 50.0,
            vibration: 30.0,
        }
    }
}

impl Thresholds {
    /// The limit configured for a sensor.
    pub fn limit(&self, sensor: Sensor) -> f64 {
        match sensor {
            Sensor::Temperature => self.temperature,
            Sensor::Vibration => self.vibration,
        }
    }

    /// Synthesize an alert if `record` breaches the limit for `sensor`.
    pub fn check(&self, sensor: Sensor, record: &Record) -> Option<Alert> {
        if record.value > self.limit(sensor) {
            let alert = Alert::new(sensor.name(), sensor.breach_message(), record.value);
            Some(alert.at(record.timestamp))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn record(sensor: &str, value: f64) -> Record {
        Record::new(sensor, value, Utc::now())
    }

    #[test]
    fn test_sensor_names_are_case_sensitive() {
        assert_eq!(Sensor::from_name("Temperature"), Some(Sensor::Temperature));
        assert_eq!(Sensor::from_name("Vibration"), Some(Sensor::Vibration));
        assert_eq!(Sensor::from_name("temperature"), None);
        assert_eq!(Sensor::from_name("Humidity"), None);
    }

    #[test]
    fn test_temperature_threshold_is_strict() {
        let t = Thresholds::default();

        assert!(t.check(Sensor::Temperature, &record("Temperature", 50.0)).is_none());

        let alert = t.check(Sensor::Temperature, &record("Temperature", 50.1)).unwrap();
        assert_eq!(alert.sensor, "Temperature");
        assert_eq!(alert.message.as_deref(), Some("Temperature threshold crossed!"));
        assert_eq!(alert.value, Some(50.1));
    }

    #[test]
    fn test_vibration_threshold_is_strict() {
        let t = Thresholds::default();

        assert!(t.check(Sensor::Vibration, &record("Vibration", 30.0)).is_none());

        let alert = t.check(Sensor::Vibration, &record("Vibration", 35.0)).unwrap();
        assert_eq!(alert.message.as_deref(), Some("Vibration threshold crossed!"));
    }

    #[test]
    fn test_custom_limits() {
        let t = Thresholds {
            temperature: 80.0,
            vibration: 5.0,
        };
        assert!(t.check(Sensor::Temperature, &record("Temperature", 60.0)).is_none());
        assert!(t.check(Sensor::Vibration, &record("Vibration", 6.0)).is_some());
    }
}
