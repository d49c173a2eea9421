//! Channel-based push source.
//!
//! Receives push events via a tokio mpsc channel. This is useful for
//! embedding the dashboard next to an existing event producer, and as a
//! stand-in for the network in tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use super::{CancelHandle, PushChannel, PushEvent, Subscription};
use crate::error::PushError;

/// Default number of events buffered between producer and dashboard.
const CHANNEL_CAPACITY: usize = 64;

/// A push channel fed from an in-process sender.
///
/// # Example
///
/// ```
/// use prevenix_dashboard::ChannelPush;
///
/// // Create a channel pair
/// let (tx, push) = ChannelPush::create("in-process");
/// ```
#[derive(Debug)]
pub struct ChannelPush {
    receiver: Option<mpsc::Receiver<PushEvent>>,
    description: String,
    releases: Arc<AtomicUsize>,
}

/// Sending half of a [`ChannelPush`].
#[derive(Debug, Clone)]
pub struct PushSender {
    tx: mpsc::Sender<PushEvent>,
    releases: Arc<AtomicUsize>,
}

impl ChannelPush {
    /// Create a channel pair.
    ///
    /// Returns (sender, channel) where the sender pushes events and the
    /// channel is handed to the dashboard.
    pub fn create(source_description: &str) -> (PushSender, Self) {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        let releases = Arc::new(AtomicUsize::new(0));
        let push = Self {
            receiver: Some(rx),
            description: format!("channel: {}", source_description),
            releases: releases.clone(),
        };
        (PushSender { tx, releases }, push)
    }

    /// A channel that never delivers anything.
    pub fn detached(source_description: &str) -> Self {
        let (_, push) = Self::create(source_description);
        push
    }
}

impl PushChannel for ChannelPush {
    fn subscribe(&mut self) -> Result<Subscription, PushError> {
        let receiver = self.receiver.take().ok_or(PushError::Closed)?;
        let releases = self.releases.clone();
        let cancel = CancelHandle::new(move || {
            releases.fetch_add(1, Ordering::SeqCst);
        });
        Ok(Subscription::new(receiver, cancel))
    }

    fn description(&self) -> &str {
        &self.description
    }
}

impl PushSender {
    /// Push an event, waiting for buffer space.
    pub async fn send(&self, event: PushEvent) -> Result<(), PushError> {
        self.tx.send(event).await.map_err(|_| PushError::Closed)
    }

    /// Push an event without waiting.
    ///
    /// Fails with [`PushError::Full`] while the dashboard is behind (for
    /// instance with a notice pending) and [`PushError::Closed`] once the
    /// subscription has been released.
    pub fn try_send(&self, event: PushEvent) -> Result<(), PushError> {
        self.tx.try_send(event).map_err(|e| match e {
            TrySendError::Full(_) => PushError::Full,
            TrySendError::Closed(_) => PushError::Closed,
        })
    }

    /// How many times the subscription on the other end was released.
    pub fn release_count(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }

    /// Whether the receiving side has gone away.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Alert;

    fn alert() -> PushEvent {
        PushEvent::NewAlert(Alert::new("Temperature", "hot", 60.0))
    }

    #[test]
    fn test_channel_push_delivers_events() {
        let (tx, mut push) = ChannelPush::create("test");
        let mut sub = push.subscribe().unwrap();

        assert!(sub.try_next().is_none());
        tx.try_send(alert()).unwrap();
        assert_eq!(sub.try_next(), Some(alert()));
    }

    #[test]
    fn test_channel_push_subscribes_once() {
        let (_tx, mut push) = ChannelPush::create("test");
        let _sub = push.subscribe().unwrap();
        assert!(matches!(push.subscribe(), Err(PushError::Closed)));
    }

    #[test]
    fn test_release_is_observable() {
        let (tx, mut push) = ChannelPush::create("test");
        let mut sub = push.subscribe().unwrap();
        assert_eq!(tx.release_count(), 0);

        sub.cancel();
        drop(sub);
        assert_eq!(tx.release_count(), 1);
        assert!(tx.is_closed());
        assert!(matches!(tx.try_send(alert()), Err(PushError::Closed)));
    }

    #[test]
    fn test_full_buffer_is_not_closed() {
        let (tx, mut push) = ChannelPush::create("test");
        let mut sub = push.subscribe().unwrap();
        for _ in 0..CHANNEL_CAPACITY {
            tx.try_send(alert()).unwrap();
        }

        assert!(matches!(tx.try_send(alert()), Err(PushError::Full)));
        assert!(!tx.is_closed());

        // Taking one event makes room again
        assert!(sub.try_next().is_some());
        tx.try_send(alert()).unwrap();
    }

    #[test]
    fn test_description() {
        let push = ChannelPush::detached("bridge");
        assert_eq!(push.description(), "channel: bridge");
    }
}
