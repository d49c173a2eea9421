//! Sliding chart windows for the charted sensors.

use std::collections::VecDeque;

use serde::Serialize;

use super::reading::{time_label, Record};
use super::thresholds::Sensor;

/// Default number of points kept per series.
pub const SERIES_CAPACITY: usize = 10;

/// Placeholder points shown before any live reading arrives.
const PLACEHOLDER: [(&str, f64); 5] = [
    ("10:00", 20.0),
    ("10:05", 25.0),
    ("10:10", 22.0),
    ("10:15", 28.0),
    ("10:20", 24.0),
];

/// One bar on a chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    /// Formatted time-of-day.
    pub label: String,
    pub value: f64,
}

impl SeriesPoint {
    pub fn new(label: impl Into<String>, value: f64) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

impl From<&Record> for SeriesPoint {
    fn from(record: &Record) -> Self {
        Self::new(time_label(&record.timestamp), record.value)
    }
}

/// A fixed-capacity, chronologically ordered window of recent readings.
///
/// Appending to a full series evicts the oldest point, so the window always
/// holds the most recent `capacity` points in arrival order.
#[derive(Debug, Clone)]
pub struct Series {
    sensor: Sensor,
    points: VecDeque<SeriesPoint>,
    capacity: usize,
}

impl Series {
    /// Create an empty series with the default capacity.
    pub fn new(sensor: Sensor) -> Self {
        Self::with_capacity(sensor, SERIES_CAPACITY)
    }

    /// Create an empty series holding at most `capacity` points (minimum 1).
    pub fn with_capacity(sensor: Sensor, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            sensor,
            points: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Create a series seeded with placeholder points.
    pub fn seeded(sensor: Sensor, capacity: usize) -> Self {
        let mut series = Self::with_capacity(sensor, capacity);
        for (label, value) in PLACEHOLDER {
            series.push(SeriesPoint::new(label, value));
        }
        series
    }

    /// Append a point, evicting the oldest if the window is full.
    pub fn push(&mut self, point: SeriesPoint) {
        while self.points.len() >= self.capacity {
            self.points.pop_front();
        }
        self.points.push_back(point);
    }

    /// Append the point derived from a record.
    pub fn record(&mut self, record: &Record) {
        self.push(SeriesPoint::from(record));
    }

    pub fn sensor(&self) -> Sensor {
        self.sensor
    }

    /// Chart label for this series.
    pub fn label(&self) -> &'static str {
        self.sensor.name()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Points, oldest first.
    pub fn points(&self) -> impl Iterator<Item = &SeriesPoint> {
        self.points.iter()
    }

    /// The most recently appended point.
    pub fn last(&self) -> Option<&SeriesPoint> {
        self.points.back()
    }

    /// Largest value in the window, if any.
    pub fn max_value(&self) -> Option<f64> {
        self.points.iter().map(|p| p.value).reduce(f64::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_push_appends_in_order() {
        let mut s = Series::new(Sensor::Temperature);
        s.push(SeriesPoint::new("a", 1.0));
        s.push(SeriesPoint::new("b", 2.0));

        let labels: Vec<_> = s.points().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, vec!["a", "b"]);
        assert_eq!(s.last().unwrap().value, 2.0);
    }

    #[test]
    fn test_window_evicts_oldest_at_capacity() {
        let mut s = Series::new(Sensor::Vibration);
        for i in 0..15 {
            s.push(SeriesPoint::new(format!("{}", i), i as f64));
        }

        assert_eq!(s.len(), 10);
        assert_eq!(s.points().next().unwrap().value, 5.0);
        assert_eq!(s.last().unwrap().value, 14.0);
    }

    #[test]
    fn test_seeded_series_has_placeholder_points() {
        let s = Series::seeded(Sensor::Temperature, SERIES_CAPACITY);
        assert_eq!(s.len(), 5);
        assert_eq!(s.points().next().unwrap(), &SeriesPoint::new("10:00", 20.0));
        assert_eq!(s.max_value(), Some(28.0));
    }

    #[test]
    fn test_seeded_series_respects_small_capacity() {
        let s = Series::seeded(Sensor::Temperature, 3);
        assert_eq!(s.len(), 3);
        assert_eq!(s.points().next().unwrap().label, "10:10");
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let mut s = Series::with_capacity(Sensor::Temperature, 0);
        s.push(SeriesPoint::new("a", 1.0));
        s.push(SeriesPoint::new("b", 2.0));
        assert_eq!(s.capacity(), 1);
        assert_eq!(s.len(), 1);
        assert_eq!(s.last().unwrap().label, "b");
    }

    #[test]
    fn test_record_derives_time_label() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 5).unwrap();
        let mut s = Series::new(Sensor::Temperature);
        s.record(&Record::new("Temperature", 42.0, ts));

        assert_eq!(s.last().unwrap(), &SeriesPoint::new(time_label(&ts), 42.0));
    }

    #[test]
    fn test_empty_series_has_no_max() {
        let s = Series::new(Sensor::Vibration);
        assert!(s.is_empty());
        assert!(s.max_value().is_none());
        assert_eq!(s.label(), "Vibration");
    }
}
