//! Outbound notification hook.
//!
//! After a transition commits, the engine hands a [`TransitionOccurred`] to
//! its [`TransitionNotifier`]. Delivery is fire-and-forget: a failing notifier
//! is logged and otherwise ignored, and can never undo a committed change.

use crate::config::EngineConfig;
use crate::core::{ActorId, QuestionId, Status, TransitionKind, WorkflowTransition};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::broadcast;

/// Default buffer capacity for the broadcast channel.
pub const DEFAULT_CAPACITY: usize = 1024;

/// A committed status change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionOccurred {
    pub question_id: QuestionId,
    pub from: Status,
    pub to: Status,
    pub actor: ActorId,
    pub kind: TransitionKind,
    pub timestamp: DateTime<Utc>,
}

impl From<&WorkflowTransition> for TransitionOccurred {
    fn from(transition: &WorkflowTransition) -> Self {
        Self {
            question_id: transition.question_id,
            from: transition.from,
            to: transition.to,
            actor: transition.actor.clone(),
            kind: transition.kind,
            timestamp: transition.timestamp,
        }
    }
}

/// Delivery failure reported by a notifier.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("Notification delivery failed: {0}")]
pub struct NotifyError(pub String);

/// Receives committed transitions.
pub trait TransitionNotifier: Send + Sync {
    fn notify(&self, event: TransitionOccurred) -> Result<(), NotifyError>;
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

impl TransitionNotifier for NoopNotifier {
    fn notify(&self, _event: TransitionOccurred) -> Result<(), NotifyError> {
        Ok(())
    }
}

/// In-process fan-out over a `tokio::sync::broadcast` channel.
///
/// Slow subscribers that fall more than the channel capacity behind observe
/// `RecvError::Lagged` and miss the oldest events.
#[derive(Debug, Clone)]
pub struct BroadcastNotifier {
    sender: broadcast::Sender<TransitionOccurred>,
}

impl BroadcastNotifier {
    /// A zero `capacity` is raised to one.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Notifier sized by `config.notify_capacity`.
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.notify_capacity)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TransitionOccurred> {
        self.sender.subscribe()
    }

    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for BroadcastNotifier {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl TransitionNotifier for BroadcastNotifier {
    fn notify(&self, event: TransitionOccurred) -> Result<(), NotifyError> {
        // A send error only means there are zero receivers; the event is dropped.
        let _ = self.sender.send(event);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event() -> TransitionOccurred {
        TransitionOccurred::from(&WorkflowTransition::manual(
            QuestionId::new(),
            Status::Draft,
            Status::Review,
            ActorId::from("author"),
            None,
            Utc::now(),
        ))
    }

    #[tokio::test]
    async fn subscribers_receive_events() {
        let notifier = BroadcastNotifier::default();
        let mut rx1 = notifier.subscribe();
        let mut rx2 = notifier.subscribe();

        let sent = event();
        notifier.notify(sent.clone()).unwrap();

        assert_eq!(rx1.recv().await.unwrap(), sent);
        assert_eq!(rx2.recv().await.unwrap(), sent);
    }

    #[test]
    fn events_without_subscribers_are_dropped() {
        let notifier = BroadcastNotifier::from_config(&EngineConfig::default());
        assert_eq!(notifier.receiver_count(), 0);
        assert_eq!(notifier.notify(event()), Ok(()));
    }

    #[tokio::test]
    async fn zero_capacity_is_raised_to_one() {
        let config: EngineConfig = serde_json::from_str(r#"{"notify_capacity": 0}"#).unwrap();
        let notifier = BroadcastNotifier::from_config(&config);
        let mut rx = notifier.subscribe();

        let sent = event();
        notifier.notify(sent.clone()).unwrap();
        assert_eq!(rx.recv().await.unwrap(), sent);
    }

    #[test]
    fn event_mirrors_ledger_entry() {
        let occurred = event();
        assert_eq!(occurred.from, Status::Draft);
        assert_eq!(occurred.to, Status::Review);
        assert_eq!(occurred.kind, TransitionKind::Manual);
        assert_eq!(occurred.actor.as_str(), "author");
        assert!(NoopNotifier.notify(occurred).is_ok());
    }
}
