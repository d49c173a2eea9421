//! Data models for the dashboard.
//!
//! ## Submodules
//!
//! - [`reading`]: Wire payloads ([`Alert`], [`Record`]) and time formatting
//! - [`thresholds`]: Charted [`Sensor`]s and the [`Thresholds`] that synthesize alerts
//! - [`series`]: Fixed-capacity chart windows ([`Series`], [`SeriesPoint`])
//! - [`feed`]: Newest-first lists that merge bulk fetches with push events
//!
//! ## Data Flow
//!
//! ```text
//! GET /alerts ───────────────▶ Feed<Alert>
//! GET /records ──────────────▶ Feed<Record>
//! newAlert ──────────────────▶ Feed<Alert> ──▶ Notifier
//! newRecord ─────────────────▶ Feed<Record>
//!        │
//!        └── Temperature/Vibration ──▶ Series
//!                                  └──▶ Thresholds::check() ──▶ Notifier
//! ```

pub mod feed;
pub mod reading;
pub mod series;
pub mod thresholds;

pub use feed::{Feed, FetchTicket};
pub use reading::{display_time, time_label, Alert, Record};
pub use series::{Series, SeriesPoint, SERIES_CAPACITY};
pub use thresholds::{Sensor, Thresholds};
