//! End-to-end tests through the public API.

use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use tokio::net::TcpListener;
use tokio_tungstenite::{accept_async, tungstenite::Message};

use prevenix_dashboard::data::time_label;
use prevenix_dashboard::{
    Alert, ChannelPush, Dashboard, DashboardOptions, Framing, Notice, Notifier, PushEvent,
    Record, SeriesPoint, StaticSensorApi, WebSocketPush,
};

#[derive(Clone, Default)]
struct Collect(Arc<Mutex<Vec<Notice>>>);

impl Notifier for Collect {
    fn notify(&mut self, notice: Notice) {
        self.0.lock().push(notice);
    }
}

fn reading(sensor: &str, value: f64, minute: u32) -> Record {
    Record::new(sensor, value, Utc.with_ymd_and_hms(2024, 6, 1, 8, minute, 0).unwrap())
}

#[tokio::test]
async fn test_session_lifecycle() {
    let api = Arc::new(StaticSensorApi::new(
        vec![Alert::new("Temperature", "Overheat", 61.0)],
        vec![reading("Humidity", 40.0, 0), reading("Vibration", 5.0, 1)],
    ));
    let (tx, push) = ChannelPush::create("integration");
    let notices = Collect::default();
    let mut dashboard = Dashboard::new(
        api,
        Box::new(push),
        Box::new(notices.clone()),
        DashboardOptions::default(),
    );

    dashboard.activate();
    while dashboard.is_loading() {
        assert!(dashboard.next().await);
    }
    assert_eq!(dashboard.alerts().len(), 1);
    assert_eq!(dashboard.records().len(), 2);

    // Vibration 35 then 10: two points, one notice
    let first = reading("Vibration", 35.0, 2);
    let second = reading("Vibration", 10.0, 3);
    tx.send(PushEvent::NewRecord(first.clone())).await.unwrap();
    tx.send(PushEvent::NewRecord(second.clone())).await.unwrap();
    assert!(dashboard.next().await);
    assert!(dashboard.next().await);

    let points: Vec<&SeriesPoint> = dashboard.vibration().points().collect();
    assert_eq!(points.len(), 7);
    assert_eq!(points[5], &SeriesPoint::new(time_label(&first.timestamp), 35.0));
    assert_eq!(points[6], &SeriesPoint::new(time_label(&second.timestamp), 10.0));
    {
        let notices = notices.0.lock();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].message, "Vibration threshold crossed!");
        assert_eq!(notices[0].value, 35.0);
    }
    assert_eq!(dashboard.alerts().len(), 1);
    assert_eq!(dashboard.records()[0], second);

    // A pushed alert is listed first and notified
    let alert = Alert::new("Vibration", "Bearing wear", 33.0);
    tx.send(PushEvent::NewAlert(alert.clone())).await.unwrap();
    assert!(dashboard.next().await);
    assert_eq!(dashboard.alerts()[0], alert);
    assert_eq!(notices.0.lock().len(), 2);

    // Refresh replaces the lists with what the service holds
    dashboard.refresh();
    while dashboard.is_loading() {
        assert!(dashboard.next().await);
    }
    assert_eq!(dashboard.alerts().len(), 1);
    assert_eq!(dashboard.records().len(), 2);

    // Teardown releases once and freezes everything
    tx.send(PushEvent::NewRecord(reading("Temperature", 90.0, 4))).await.unwrap();
    assert!(dashboard.deactivate());
    assert!(!dashboard.next().await);
    assert_eq!(dashboard.records().len(), 2);
    assert_eq!(notices.0.lock().len(), 2);
    assert_eq!(tx.release_count(), 1);
    assert!(tx.is_closed());
}

#[tokio::test]
async fn test_json_push_over_websocket() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = tokio::spawn(async move {
        let (socket, _) = listener.accept().await.unwrap();
        let mut ws = accept_async(socket).await.unwrap();
        ws.send(Message::Text(
            r#"{"event":"newRecord","data":{"sensor":"Temperature","value":55,"timestamp":"2024-06-01T08:00:00Z"}}"#
                .to_string(),
        ))
        .await
        .unwrap();
        while let Some(Ok(message)) = ws.next().await {
            if message.is_close() {
                break;
            }
        }
    });

    let push = WebSocketPush::new(&format!("ws://{}/events", addr), Framing::Json).unwrap();
    let notices = Collect::default();
    let mut dashboard = Dashboard::new(
        Arc::new(StaticSensorApi::new(vec![], vec![])),
        Box::new(push),
        Box::new(notices.clone()),
        DashboardOptions::default(),
    );
    dashboard.activate();

    tokio::time::timeout(Duration::from_secs(5), async {
        while dashboard.records().is_empty() {
            assert!(dashboard.next().await);
        }
    })
    .await
    .unwrap();

    assert_eq!(dashboard.records()[0].sensor, "Temperature");
    assert_eq!(dashboard.temperature().last().unwrap().value, 55.0);
    assert_eq!(notices.0.lock()[0].message, "Temperature threshold crossed!");

    dashboard.deactivate();
    tokio::time::timeout(Duration::from_secs(5), server).await.unwrap().unwrap();
}

#[tokio::test]
async fn test_unreachable_push_channel_leaves_bulk_data() {
    let api = Arc::new(StaticSensorApi::new(vec![], vec![reading("Vibration", 1.0, 0)]));
    // Nothing listens on port 9.
    let push = WebSocketPush::new("http://127.0.0.1:9", Framing::SocketIo).unwrap();
    let mut dashboard = Dashboard::new(
        api,
        Box::new(push),
        Box::new(Collect::default()),
        DashboardOptions::default(),
    );
    dashboard.activate();

    tokio::time::timeout(Duration::from_secs(5), async { while dashboard.next().await {} })
        .await
        .unwrap();

    assert_eq!(dashboard.records().len(), 1);
    assert!(dashboard.is_active());
}
