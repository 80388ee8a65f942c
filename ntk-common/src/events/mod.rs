//! Event types for the NTK event system
//!
//! Provides shared event definitions and EventBus for all NTK crates.

mod advice_types;

pub use advice_types::{AdvicePriority, DropReason, PlayerState};

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// NTK event types
///
/// Events are broadcast via EventBus and are serializable so they can be
/// logged or forwarded as JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum NtkEvent {
    /// Advice handed to the playback backend
    AdviceStarted {
        /// Advice request id
        advice_id: Uuid,
        /// Clip names in playback order
        clips: Vec<String>,
        /// Advice priority
        priority: AdvicePriority,
        /// Number of clips actually read from the sound store
        resolved_clips: usize,
        /// When playback started
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Advice stored in the pending slot while another one plays
    AdviceQueued {
        /// Advice request id
        advice_id: Uuid,
        /// Advice priority
        priority: AdvicePriority,
        /// Pending advice that was overwritten, if any
        replaced: Option<Uuid>,
        /// When the advice was queued
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Advice discarded without playing
    AdviceDropped {
        /// Advice request id
        advice_id: Uuid,
        /// Why the advice was discarded
        reason: DropReason,
        /// When the advice was discarded
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Advice finished (normally or after an engine error)
    AdviceFinished {
        /// Advice request id
        advice_id: Uuid,
        /// False if the backend reported an error
        completed: bool,
        /// When the advice finished
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Playback backend reported an error for the active advice
    AdvicePlaybackFailed {
        /// Advice request id
        advice_id: Uuid,
        /// Backend-specific error code
        code: i32,
        /// When the error was reported
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Playback stopped by the caller
    AdviceStopped {
        /// Advice that was playing, if any
        advice_id: Option<Uuid>,
        /// When playback was stopped
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Mute flag toggled
    MuteChanged {
        /// New mute flag
        muted: bool,
        /// When the flag changed
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

impl NtkEvent {
    /// Event type name, matching the serialized `type` tag
    pub fn event_type(&self) -> &'static str {
        match self {
            NtkEvent::AdviceStarted { .. } => "AdviceStarted",
            NtkEvent::AdviceQueued { .. } => "AdviceQueued",
            NtkEvent::AdviceDropped { .. } => "AdviceDropped",
            NtkEvent::AdviceFinished { .. } => "AdviceFinished",
            NtkEvent::AdvicePlaybackFailed { .. } => "AdvicePlaybackFailed",
            NtkEvent::AdviceStopped { .. } => "AdviceStopped",
            NtkEvent::MuteChanged { .. } => "MuteChanged",
        }
    }
}

/// Central event distribution bus
///
/// Wraps a `tokio::sync::broadcast` channel. Slow subscribers lag and lose
/// the oldest events rather than blocking emitters.
pub struct EventBus {
    tx: broadcast::Sender<NtkEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with specified channel capacity
    ///
    /// # Examples
    ///
    /// ```
    /// use ntk_common::events::EventBus;
    ///
    /// let event_bus = EventBus::new(100);
    /// assert_eq!(event_bus.capacity(), 100);
    /// ```
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<NtkEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Ok(subscriber_count)` if at least one subscriber exists.
    /// Returns `Err` if no subscribers are listening.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: NtkEvent,
    ) -> Result<usize, broadcast::error::SendError<NtkEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: NtkEvent) {
        let _ = self.tx.send(event);
    }

    /// Get the current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Get the configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mute_event(muted: bool) -> NtkEvent {
        NtkEvent::MuteChanged {
            muted,
            timestamp: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_eventbus_subscribe() {
        let bus = EventBus::new(10);
        assert_eq!(bus.subscriber_count(), 0);

        let _rx = bus.subscribe();
        let _rx2 = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);
    }

    #[test]
    fn test_eventbus_emit_no_subscribers() {
        let bus = EventBus::new(10);
        assert!(bus.emit(mute_event(true)).is_err());

        // Lossy emission never fails
        bus.emit_lossy(mute_event(true));
    }

    #[tokio::test]
    async fn test_eventbus_emit_with_subscriber() {
        let bus = EventBus::new(10);
        let mut rx = bus.subscribe();

        assert_eq!(bus.emit(mute_event(true)).unwrap(), 1);

        match rx.recv().await.unwrap() {
            NtkEvent::MuteChanged { muted, .. } => assert!(muted),
            other => panic!("Unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_event_serialization_tag() {
        let event = NtkEvent::AdviceDropped {
            advice_id: Uuid::new_v4(),
            reason: DropReason::Outranked,
            timestamp: chrono::Utc::now(),
        };

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "AdviceDropped");
        assert_eq!(json["reason"], "outranked");
        assert_eq!(event.event_type(), "AdviceDropped");
    }

    #[test]
    fn test_priority_ordering() {
        assert!(AdvicePriority::USER < AdvicePriority::NAVIGATION);
        assert!(AdvicePriority::NAVIGATION < AdvicePriority::SPEED_WARNING);

        // Better or equal priority replaces, worse does not
        assert!(AdvicePriority::USER.replaces(AdvicePriority::SPEED_WARNING));
        assert!(AdvicePriority::NAVIGATION.replaces(AdvicePriority::NAVIGATION));
        assert!(!AdvicePriority::SPEED_WARNING.replaces(AdvicePriority::NAVIGATION));

        assert_eq!(AdvicePriority::SPEED_WARNING.to_string(), "speed-warning");
        assert_eq!(AdvicePriority::from(7).to_string(), "priority-7");
    }
}
