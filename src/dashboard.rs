//! The dashboard controller.
//!
//! [`Dashboard`] owns the four displayed collections and is the only place
//! they are mutated. Network I/O happens on tokio tasks that merely forward
//! results into channels; the owner of the dashboard applies them one at a
//! time with [`Dashboard::step`] or [`Dashboard::next`], each to completion.
//!
//! ```text
//!            activate()
//!  Idle ─────────────────▶ Active ─────────────────▶ Released
//!              │             │  ▲     deactivate()
//!              │             │  │
//!   fetch_alerts/records     step()/next()
//!   + push subscribe         applies Fetched | PushEvent
//! ```

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::data::{Alert, Feed, FetchTicket, Record, Sensor, Series, SeriesPoint, Thresholds};
use crate::error::RetrievalError;
use crate::notify::{Notice, Notifier};
use crate::source::{PushChannel, PushEvent, SensorApi, Subscription};

/// Tunables for the controller.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardOptions {
    pub thresholds: Thresholds,
    /// Points kept per chart series.
    pub series_capacity: usize,
    /// Seed both series with placeholder points.
    pub placeholder_series: bool,
}

impl Default for DashboardOptions {
    fn default() -> Self {
        Self {
            thresholds: Thresholds::default(),
            series_capacity: crate::data::SERIES_CAPACITY,
            placeholder_series: true,
        }
    }
}

/// Where the dashboard is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// Constructed, not yet activated.
    Idle,
    /// Fetches issued and push channel subscribed.
    Active,
    /// Push channel released; state is frozen.
    Released,
}

/// A completed bulk fetch.
#[derive(Debug)]
enum Fetched {
    Alerts(FetchTicket, Result<Vec<Alert>, RetrievalError>),
    Records(FetchTicket, Result<Vec<Record>, RetrievalError>),
}

/// Live view state for alerts, records, and the two charted series.
pub struct Dashboard {
    api: Arc<dyn SensorApi>,
    push: Box<dyn PushChannel>,
    notifier: Box<dyn Notifier>,
    thresholds: Thresholds,
    lifecycle: Lifecycle,

    alerts: Feed<Alert>,
    records: Feed<Record>,
    temperature: Series,
    vibration: Series,

    subscription: Option<Subscription>,
    fetch_tx: mpsc::UnboundedSender<Fetched>,
    fetch_rx: mpsc::UnboundedReceiver<Fetched>,
    fetches_in_flight: usize,

    // Latest failure per source; logged, never rendered.
    alerts_error: Option<String>,
    records_error: Option<String>,
    push_error: Option<String>,
}

impl Dashboard {
    /// Create a dashboard wired to its collaborators. Nothing is fetched or
    /// subscribed until [`activate`](Self::activate).
    pub fn new(
        api: Arc<dyn SensorApi>,
        push: Box<dyn PushChannel>,
        notifier: Box<dyn Notifier>,
        options: DashboardOptions,
    ) -> Self {
        let series = |sensor| {
            if options.placeholder_series {
                Series::seeded(sensor, options.series_capacity)
            } else {
                Series::with_capacity(sensor, options.series_capacity)
            }
        };
        let (fetch_tx, fetch_rx) = mpsc::unbounded_channel();

        Self {
            api,
            push,
            notifier,
            thresholds: options.thresholds,
            lifecycle: Lifecycle::Idle,
            alerts: Feed::new(),
            records: Feed::new(),
            temperature: series(Sensor::Temperature),
            vibration: series(Sensor::Vibration),
            subscription: None,
            fetch_tx,
            fetch_rx,
            fetches_in_flight: 0,
            alerts_error: None,
            records_error: None,
            push_error: None,
        }
    }

    /// Issue both bulk reads and subscribe to the push channel.
    ///
    /// Must be called from within a tokio runtime. A failed subscription is
    /// logged and the dashboard carries on without live updates.
    pub fn activate(&mut self) {
        if self.lifecycle != Lifecycle::Idle {
            warn!(state = ?self.lifecycle, "dashboard already activated");
            return;
        }
        self.lifecycle = Lifecycle::Active;
        info!(api = self.api.description(), push = self.push.description(), "activating dashboard");

        self.issue_fetches();

        match self.push.subscribe() {
            Ok(subscription) => self.subscription = Some(subscription),
            Err(e) => {
                warn!(error = %e, "push subscription failed; continuing without live updates");
                self.push_error = Some(format!("push: {}", e));
            }
        }
    }

    /// Re-issue both bulk reads. Each completion replaces its collection.
    pub fn refresh(&mut self) {
        if self.lifecycle == Lifecycle::Active {
            self.issue_fetches();
        }
    }

    /// Release the push channel and freeze all state.
    ///
    /// Returns false if the dashboard was not active.
    pub fn deactivate(&mut self) -> bool {
        if self.lifecycle != Lifecycle::Active {
            return false;
        }
        self.lifecycle = Lifecycle::Released;
        if let Some(mut subscription) = self.subscription.take() {
            subscription.cancel();
        }
        info!("dashboard deactivated");
        true
    }

    fn issue_fetches(&mut self) {
        let ticket = self.alerts.begin_fetch();
        let api = self.api.clone();
        let tx = self.fetch_tx.clone();
        tokio::spawn(async move {
            let result = api.fetch_alerts().await;
            let _ = tx.send(Fetched::Alerts(ticket, result));
        });

        let ticket = self.records.begin_fetch();
        let api = self.api.clone();
        let tx = self.fetch_tx.clone();
        tokio::spawn(async move {
            let result = api.fetch_records().await;
            let _ = tx.send(Fetched::Records(ticket, result));
        });

        self.fetches_in_flight += 2;
    }

    /// Apply one queued input without waiting.
    ///
    /// Completed fetches are applied before push events. Returns false if
    /// nothing was queued or the dashboard is not active.
    pub fn step(&mut self) -> bool {
        if self.lifecycle != Lifecycle::Active {
            return false;
        }
        if let Ok(fetched) = self.fetch_rx.try_recv() {
            self.apply_fetched(fetched);
            return true;
        }
        match self.subscription.as_mut().and_then(Subscription::try_next) {
            Some(event) => {
                self.handle_event(event);
                true
            }
            None => false,
        }
    }

    /// Apply everything queued right now. Returns the number of inputs applied.
    pub fn drain(&mut self) -> usize {
        let mut applied = 0;
        while self.step() {
            applied += 1;
        }
        applied
    }

    /// Wait for the next input and apply it.
    ///
    /// Returns false once nothing more can arrive: the dashboard is not
    /// active, no fetch is outstanding and the push channel has ended.
    pub async fn next(&mut self) -> bool {
        if self.lifecycle != Lifecycle::Active {
            return false;
        }

        let fetch_pending = self.fetches_in_flight > 0;
        let fetches = &mut self.fetch_rx;
        let subscription = self.subscription.as_mut();

        let input = tokio::select! {
            biased;
            Some(fetched) = fetches.recv(), if fetch_pending => Ok(fetched),
            Some(event) = next_event(subscription) => Err(event),
            else => return false,
        };

        match input {
            Ok(fetched) => self.apply_fetched(fetched),
            Err(event) => self.handle_event(event),
        }
        true
    }

    /// Apply a push event.
    ///
    /// Ignored unless the dashboard is active.
    pub fn handle_event(&mut self, event: PushEvent) {
        if self.lifecycle != Lifecycle::Active {
            debug!(event = event.name(), "ignoring push event while inactive");
            return;
        }
        match event {
            PushEvent::NewAlert(alert) => {
                self.alerts.prepend(alert.clone());
                self.raise(&alert);
            }
            PushEvent::NewRecord(record) => self.ingest_record(record),
        }
    }

    fn ingest_record(&mut self, record: Record) {
        self.records.prepend(record.clone());

        let Some(sensor) = Sensor::from_name(&record.sensor) else {
            return;
        };
        self.series_mut(sensor).record(&record);

        // Synthesized alerts are announced but not listed.
        if let Some(alert) = self.thresholds.check(sensor, &record) {
            self.raise(&alert);
        }
    }

    fn raise(&mut self, alert: &Alert) {
        if let Ok(notice) = Notice::try_from(alert) {
            self.notifier.notify(notice);
        }
    }

    fn apply_fetched(&mut self, fetched: Fetched) {
        self.fetches_in_flight = self.fetches_in_flight.saturating_sub(1);
        if self.lifecycle != Lifecycle::Active {
            return;
        }

        match fetched {
            Fetched::Alerts(ticket, Ok(alerts)) => {
                info!(count = alerts.len(), "fetched alerts");
                self.alerts.complete_fetch(ticket, alerts);
                self.alerts_error = None;
            }
            Fetched::Alerts(ticket, Err(e)) => {
                warn!(error = %e, "error fetching alerts");
                self.alerts.abandon_fetch(ticket);
                self.alerts_error = Some(format!("alerts: {}", e));
            }
            Fetched::Records(ticket, Ok(records)) => {
                info!(count = records.len(), "fetched records");
                self.records.complete_fetch(ticket, records);
                self.records_error = None;
            }
            Fetched::Records(ticket, Err(e)) => {
                warn!(error = %e, "error fetching records");
                self.records.abandon_fetch(ticket);
                self.records_error = Some(format!("records: {}", e));
            }
        }
    }

    fn series_mut(&mut self, sensor: Sensor) -> &mut Series {
        match sensor {
            Sensor::Temperature => &mut self.temperature,
            Sensor::Vibration => &mut self.vibration,
        }
    }

    /// Alerts, newest first.
    pub fn alerts(&self) -> &[Alert] {
        self.alerts.items()
    }

    /// Records, newest first.
    pub fn records(&self) -> &[Record] {
        self.records.items()
    }

    pub fn temperature(&self) -> &Series {
        &self.temperature
    }

    pub fn vibration(&self) -> &Series {
        &self.vibration
    }

    /// The chart series for a sensor.
    pub fn series(&self, sensor: Sensor) -> &Series {
        match sensor {
            Sensor::Temperature => &self.temperature,
            Sensor::Vibration => &self.vibration,
        }
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn is_active(&self) -> bool {
        self.lifecycle == Lifecycle::Active
    }

    /// Whether push events can still arrive.
    pub fn is_live(&self) -> bool {
        self.subscription.as_ref().is_some_and(|s| !s.is_cancelled())
    }

    /// Whether any bulk read is still outstanding.
    pub fn is_loading(&self) -> bool {
        self.fetches_in_flight > 0
    }

    /// Failures not since recovered, at most one per source.
    ///
    /// Each bulk read clears only its own entry when it next succeeds.
    pub fn failures(&self) -> impl Iterator<Item = &str> {
        [&self.alerts_error, &self.records_error, &self.push_error]
            .into_iter()
            .flatten()
            .map(String::as_str)
    }

    pub fn api_description(&self) -> &str {
        self.api.description()
    }

    pub fn push_description(&self) -> &str {
        self.push.description()
    }

    /// A serializable copy of the current state.
    pub fn snapshot(&self) -> DashboardSnapshot {
        DashboardSnapshot {
            summary: SnapshotSummary {
                alerts: self.alerts.len(),
                records: self.records.len(),
            },
            alerts: self.alerts().to_vec(),
            records: self.records().to_vec(),
            temperature: self.temperature.points().cloned().collect(),
            vibration: self.vibration.points().cloned().collect(),
        }
    }
}

impl Drop for Dashboard {
    fn drop(&mut self) {
        self.deactivate();
    }
}

impl std::fmt::Debug for Dashboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dashboard")
            .field("lifecycle", &self.lifecycle)
            .field("alerts", &self.alerts.len())
            .field("records", &self.records.len())
            .field("fetches_in_flight", &self.fetches_in_flight)
            .finish()
    }
}

async fn next_event(subscription: Option<&mut Subscription>) -> Option<PushEvent> {
    match subscription {
        Some(subscription) => subscription.next().await,
        None => None,
    }
}

/// Exported dashboard state.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    pub summary: SnapshotSummary,
    pub alerts: Vec<Alert>,
    pub records: Vec<Record>,
    pub temperature: Vec<SeriesPoint>,
    pub vibration: Vec<SeriesPoint>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SnapshotSummary {
    pub alerts: usize,
    pub records: usize,
}

impl DashboardSnapshot {
    /// Write the snapshot as pretty-printed JSON.
    pub fn write_json(&self, path: &std::path::Path) -> anyhow::Result<()> {
        use std::io::Write;

        let json = serde_json::to_string_pretty(self)?;
        let mut file = std::fs::File::create(path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }
}
