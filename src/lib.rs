//! # prevenix-dashboard
//!
//! A terminal dashboard and library for monitoring sensor alerts and records.
//!
//! The dashboard loads every alert and record from a sensor service over HTTP,
//! then keeps them current from a push channel (Socket.IO over WebSocket by
//! default). Temperature and vibration readings feed two rolling bar charts,
//! and readings above their threshold raise a notice that must be
//! acknowledged before anything else is processed.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Application                          │
//! │  ┌─────────┐    ┌───────────┐    ┌─────────┐   ┌─────────┐  │
//! │  │  app    │───▶│ dashboard │───▶│   ui    │──▶│ Terminal│  │
//! │  │ (state) │    │ (state)   │    │(render) │   │         │  │
//! │  └─────────┘    └─────┬─────┘    └─────────┘   └─────────┘  │
//! │                       │  ▲                                  │
//! │                       ▼  │ Notice                           │
//! │  ┌─────────┐     ┌─────────┐                                │
//! │  │ source  │     │ notify  │                                │
//! │  │ (input) │     └─────────┘                                │
//! │  └─────────┘◀── HttpSensorApi | WebSocketPush | ChannelPush │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`dashboard`]**: The controller owning alerts, records and both chart
//!   series; the only place they are mutated
//! - **[`source`]**: The bulk-read service ([`SensorApi`]) and the push channel
//!   ([`PushChannel`]) with HTTP, WebSocket and in-memory implementations
//! - **[`data`]**: Payload types, thresholds, chart series and the fetch/push merge
//! - **[`notify`]**: How alerts reach the user ([`Notifier`])
//! - **[`app`]** and **[`ui`]**: Terminal state and rendering using ratatui
//! - **[`config`]**: Layered settings
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Watch the configured service in the terminal
//! prevenix --api https://sensors.example.com --push http://localhost:4000
//!
//! # Log notices to stdout instead of the TUI
//! prevenix --headless
//!
//! # Fetch once and write the state as JSON
//! prevenix --export state.json
//! ```
//!
//! ### As a library
//!
//! ```
//! use std::sync::Arc;
//! use prevenix_dashboard::{
//!     Alert, ChannelPush, Dashboard, DashboardOptions, LogNotifier, PushEvent, StaticSensorApi,
//! };
//!
//! # tokio_test::block_on(async {
//! let api = Arc::new(StaticSensorApi::new(vec![], vec![]));
//! let (tx, push) = ChannelPush::create("in-process");
//!
//! let mut dashboard =
//!     Dashboard::new(api, Box::new(push), Box::new(LogNotifier), DashboardOptions::default());
//! dashboard.activate();
//!
//! tx.send(PushEvent::NewAlert(Alert::new("Temperature", "Overheat", 72.0))).await.unwrap();
//! while dashboard.alerts().is_empty() {
//!     dashboard.next().await;
//! }
//! assert_eq!(dashboard.alerts()[0].sensor, "Temperature");
//! # });
//! ```

pub mod app;
pub mod config;
pub mod dashboard;
pub mod data;
pub mod error;
pub mod events;
pub mod notify;
pub mod source;
pub mod ui;

// Re-export main types for convenience
pub use app::App;
pub use config::Settings;
pub use dashboard::{Dashboard, DashboardOptions, DashboardSnapshot, Lifecycle};
pub use data::{Alert, Record, Sensor, Series, SeriesPoint, Thresholds};
pub use error::{NoticeError, PushError, RetrievalError};
pub use notify::{LogNotifier, ModalNotifier, Notice, NoticeBoard, Notifier};
pub use source::{
    CancelHandle, ChannelPush, Framing, HttpSensorApi, PushChannel, PushEvent, PushSender,
    SensorApi, StaticSensorApi, Subscription, WebSocketPush,
};
