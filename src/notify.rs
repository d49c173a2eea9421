//! User notification for new and synthesized alerts.
//!
//! The dashboard raises every pushed alert and every threshold breach through
//! a [`Notifier`]. What "notify" means is up to the implementation:
//!
//! - [`ModalNotifier`]: queues notices for the TUI, which shows them as a
//!   modal and stops processing further events until each is dismissed
//! - [`LogNotifier`]: prints notices for headless operation

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::warn;

use crate::data::Alert;
use crate::error::NoticeError;

/// A formatted, user-facing alert notice.
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub sensor: String,
    pub message: String,
    pub value: f64,
}

/// An alert is announced only with a non-empty message and a truthy value:
/// a missing, zero or NaN value counts as no value at all.
impl TryFrom<&Alert> for Notice {
    type Error = NoticeError;

    fn try_from(alert: &Alert) -> Result<Self, Self::Error> {
        match (&alert.message, alert.value) {
            (Some(message), Some(value)) if !message.is_empty() && is_truthy(value) => Ok(Self {
                sensor: alert.sensor.clone(),
                message: message.clone(),
                value,
            }),
            _ => Err(NoticeError::PayloadMissing),
        }
    }
}

fn is_truthy(value: f64) -> bool {
    value != 0.0 && !value.is_nan()
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ALERT: {} - {} (Value: {})", self.sensor, self.message, self.value)
    }
}

/// Capability for presenting a notice to the user.
pub trait Notifier: Send {
    fn notify(&mut self, notice: Notice);
}

/// Notifier backing the TUI's modal overlay.
///
/// Notices are queued in a shared board; the UI shows the oldest one and
/// holds back further event processing until it is dismissed.
#[derive(Debug, Clone, Default)]
pub struct ModalNotifier {
    board: NoticeBoard,
}

impl ModalNotifier {
    /// Create a notifier and the board the UI reads from.
    pub fn create() -> (Self, NoticeBoard) {
        let board = NoticeBoard::default();
        (
            Self {
                board: board.clone(),
            },
            board,
        )
    }
}

impl Notifier for ModalNotifier {
    fn notify(&mut self, notice: Notice) {
        self.board.pending.lock().push_back(notice);
    }
}

/// Shared queue of notices awaiting acknowledgement.
#[derive(Debug, Clone, Default)]
pub struct NoticeBoard {
    pending: Arc<Mutex<VecDeque<Notice>>>,
}

impl NoticeBoard {
    /// The notice currently shown, if any.
    pub fn current(&self) -> Option<Notice> {
        self.pending.lock().front().cloned()
    }

    /// Number of notices waiting, including the current one.
    pub fn len(&self) -> usize {
        self.pending.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.lock().is_empty()
    }

    /// Whether a notice is waiting for acknowledgement.
    pub fn is_blocking(&self) -> bool {
        !self.is_empty()
    }

    /// Acknowledge the current notice.
    pub fn dismiss(&self) -> Option<Notice> {
        self.pending.lock().pop_front()
    }
}

/// Notifier that prints notices to stdout and the log.
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&mut self, notice: Notice) {
        warn!(sensor = %notice.sensor, value = notice.value, "{}", notice.message);
        println!("{}", notice);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notice_text() {
        let alert = Alert::new("Vibration", "Vibration threshold crossed!", 35.0);
        let notice = Notice::try_from(&alert).unwrap();
        assert_eq!(
            notice.to_string(),
            "ALERT: Vibration - Vibration threshold crossed! (Value: 35)"
        );
    }

    #[test]
    fn test_notice_requires_message_and_value() {
        let mut alert = Alert::new("Temperature", "hot", 60.0);
        alert.message = None;
        assert_eq!(Notice::try_from(&alert), Err(NoticeError::PayloadMissing));

        let mut alert = Alert::new("Temperature", "", 60.0);
        assert_eq!(Notice::try_from(&alert), Err(NoticeError::PayloadMissing));

        alert.message = Some("hot".to_string());
        alert.value = None;
        assert_eq!(Notice::try_from(&alert), Err(NoticeError::PayloadMissing));
    }

    #[test]
    fn test_zero_or_nan_value_counts_as_missing() {
        let alert = Alert::new("Vibration", "sensor stalled", 0.0);
        assert_eq!(Notice::try_from(&alert), Err(NoticeError::PayloadMissing));

        let alert = Alert::new("Vibration", "sensor stalled", f64::NAN);
        assert_eq!(Notice::try_from(&alert), Err(NoticeError::PayloadMissing));

        let alert = Alert::new("Vibration", "sensor reversed", -1.5);
        assert!(Notice::try_from(&alert).is_ok());
    }

    #[test]
    fn test_modal_notifier_queues_in_order() {
        let (mut notifier, board) = ModalNotifier::create();
        assert!(!board.is_blocking());

        notifier.notify(Notice::try_from(&Alert::new("A", "first", 1.0)).unwrap());
        notifier.notify(Notice::try_from(&Alert::new("B", "second", 2.0)).unwrap());

        assert!(board.is_blocking());
        assert_eq!(board.len(), 2);
        assert_eq!(board.current().unwrap().message, "first");

        assert_eq!(board.dismiss().unwrap().message, "first");
        assert_eq!(board.current().unwrap().message, "second");
        board.dismiss();
        assert!(!board.is_blocking());
        assert!(board.dismiss().is_none());
    }
}
