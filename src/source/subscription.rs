//! The owned handle to a live push connection.

use std::fmt;

use tokio::sync::mpsc;

use super::PushEvent;

/// Releases a push connection. Runs its release action at most once.
pub struct CancelHandle {
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl CancelHandle {
    /// Create a handle that runs `release` when cancelled.
    pub fn new<F>(release: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            release: Some(Box::new(release)),
        }
    }

    /// A handle with nothing to release.
    pub fn noop() -> Self {
        Self { release: None }
    }

    /// Run the release action. Returns false if it already ran.
    pub fn cancel(&mut self) -> bool {
        match self.release.take() {
            Some(release) => {
                release();
                true
            }
            None => false,
        }
    }
}

impl fmt::Debug for CancelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancelHandle").field("armed", &self.release.is_some()).finish()
    }
}

/// A live subscription to a push channel.
///
/// Owns the event receiver and the connection's [`CancelHandle`]. Once
/// cancelled, no further events are handed out, even ones already buffered.
/// Dropping a subscription cancels it.
#[derive(Debug)]
pub struct Subscription {
    events: mpsc::Receiver<PushEvent>,
    cancel: CancelHandle,
    cancelled: bool,
}

impl Subscription {
    pub fn new(events: mpsc::Receiver<PushEvent>, cancel: CancelHandle) -> Self {
        Self {
            events,
            cancel,
            cancelled: false,
        }
    }

    /// Take the next queued event without waiting.
    pub fn try_next(&mut self) -> Option<PushEvent> {
        if self.cancelled {
            return None;
        }
        self.events.try_recv().ok()
    }

    /// Wait for the next event. Returns `None` once the channel has ended.
    pub async fn next(&mut self) -> Option<PushEvent> {
        if self.cancelled {
            return None;
        }
        self.events.recv().await
    }

    /// Release the connection. Returns false if it was already released.
    pub fn cancel(&mut self) -> bool {
        if self.cancelled {
            return false;
        }
        self.cancelled = true;
        self.events.close();
        self.cancel.cancel();
        true
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use crate::data::Alert;

    fn counted() -> (CancelHandle, Arc<AtomicUsize>) {
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        let handle = CancelHandle::new(move || {
            c.fetch_add(1, Ordering::SeqCst);
        });
        (handle, count)
    }

    #[test]
    fn test_cancel_releases_once() {
        let (tx, rx) = mpsc::channel(4);
        let (handle, count) = counted();
        let mut sub = Subscription::new(rx, handle);

        assert!(sub.cancel());
        assert!(!sub.cancel());
        drop(sub);
        drop(tx);

        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_drop_releases() {
        let (_tx, rx) = mpsc::channel(4);
        let (handle, count) = counted();
        drop(Subscription::new(rx, handle));
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_buffered_events_are_withheld_after_cancel() {
        let (tx, rx) = mpsc::channel(4);
        let mut sub = Subscription::new(rx, CancelHandle::noop());
        tx.try_send(PushEvent::NewAlert(Alert::new("A", "m", 1.0))).unwrap();

        sub.cancel();
        assert!(sub.try_next().is_none());
        assert!(sub.is_cancelled());
    }

    #[tokio::test]
    async fn test_next_ends_when_sender_dropped() {
        let (tx, rx) = mpsc::channel(4);
        let mut sub = Subscription::new(rx, CancelHandle::noop());
        tx.send(PushEvent::NewAlert(Alert::new("A", "m", 1.0))).await.unwrap();
        drop(tx);

        assert!(sub.next().await.is_some());
        assert!(sub.next().await.is_none());
    }
}
