//! Events published by the timer engine and chime sequencer

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::trace;

use crate::{chime::VisualMarker, state::TimerState};

/// Capacity of the event channel; slow subscribers lag instead of blocking
pub const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Observer notifications, sent synchronously at the point of change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TimerEvent {
    /// Configured duration changed
    DurationChanged { minutes: u32 },
    /// Countdown progress for the current run
    Tick {
        minutes_left: u64,
        seconds_left: u64,
        progress: f64,
        remaining_ms: u64,
    },
    /// The run reached zero; fired once per run
    Completed,
    StateChanged { state: TimerState },
    /// Visual cue from the completion chime
    Chime { marker: VisualMarker },
}

/// Fan-out of [`TimerEvent`]s to any number of subscribers
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<TimerEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TimerEvent> {
        self.tx.subscribe()
    }

    /// Publish an event; having no subscribers is not an error
    pub fn emit(&self, event: TimerEvent) {
        if self.tx.send(event).is_err() {
            trace!("Event dropped, no subscribers");
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emit_without_subscribers_is_silent() {
        EventBus::new().emit(TimerEvent::Completed);
    }

    #[test]
    fn subscribers_see_events_in_order() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();

        bus.emit(TimerEvent::DurationChanged { minutes: 5 });
        bus.emit(TimerEvent::StateChanged { state: TimerState::Running });

        assert_eq!(rx.try_recv().ok(), Some(TimerEvent::DurationChanged { minutes: 5 }));
        assert_eq!(
            rx.try_recv().ok(),
            Some(TimerEvent::StateChanged { state: TimerState::Running })
        );
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn events_serialize_with_a_type_tag() {
        let json = serde_json::to_value(TimerEvent::DurationChanged { minutes: 3 }).expect("encode");
        assert_eq!(json["type"], "duration_changed");
        assert_eq!(json["minutes"], 3);
    }
}
