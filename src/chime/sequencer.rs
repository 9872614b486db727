//! Completion chime playback

use std::{sync::Arc, time::Duration};
use tokio::{
    task::JoinHandle,
    time::{sleep_until, Instant},
};
use tracing::{debug, info};

use crate::{
    engine::{EventBus, TimerEvent},
    services::ToneGenerator,
};
use super::sequence::{ChimeStep, WESTMINSTER_QUARTERS};

/// Length of the single alert played when no tone generator is available
const FALLBACK_ALERT: Duration = Duration::from_millis(1000);

/// Plays the Westminster quarters on its own task.
///
/// The steps are timed relative to the moment `play_sequence` is called and
/// do not depend on the engine's tick scheduling.
pub struct ChimeSequencer {
    tone: Option<Arc<dyn ToneGenerator>>,
    fallback: Arc<dyn ToneGenerator>,
    events: EventBus,
    steps: &'static [ChimeStep],
    in_flight: Option<JoinHandle<()>>,
}

impl ChimeSequencer {
    /// `tone` is `None` when the platform has no tone generator; `fallback`
    /// then plays a single alert instead of the melody
    pub fn new(
        tone: Option<Arc<dyn ToneGenerator>>,
        fallback: Arc<dyn ToneGenerator>,
        events: EventBus,
    ) -> Self {
        Self {
            tone,
            fallback,
            events,
            steps: &WESTMINSTER_QUARTERS,
            in_flight: None,
        }
    }

    pub fn has_tone_generator(&self) -> bool {
        self.tone.is_some()
    }

    /// Whether a previously started sequence is still playing
    pub fn is_playing(&self) -> bool {
        self.in_flight.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Start the sequence. Never fails; tone errors only silence a step.
    pub fn play_sequence(&mut self) {
        let Some(tone) = self.tone.clone() else {
            info!("Playing fallback completion alert");
            if let Err(e) = self.fallback.play_tone(0.0, FALLBACK_ALERT) {
                debug!("Fallback alert failed: {}", e);
            }
            return;
        };

        self.silence();
        info!("Playing Westminster quarters");

        let events = self.events.clone();
        let steps = self.steps;
        let started = Instant::now();

        self.in_flight = Some(tokio::spawn(async move {
            for step in steps {
                sleep_until(started + Duration::from_millis(step.offset_ms)).await;

                if let Some(note) = step.tone {
                    let sustain = Duration::from_millis(note.sustain_ms);
                    if let Err(e) = tone.play_tone(note.frequency_hz, sustain) {
                        debug!("Chime step at {}ms failed: {}", step.offset_ms, e);
                    }
                }
                events.emit(TimerEvent::Chime { marker: step.marker });
            }
            debug!("Chime sequence finished");
        }));
    }

    /// Abort an in-flight sequence; no-op if nothing is playing
    pub fn silence(&mut self) {
        if let Some(task) = self.in_flight.take() {
            if !task.is_finished() {
                debug!("Silencing chime");
            }
            task.abort();
        }
    }
}

impl Drop for ChimeSequencer {
    fn drop(&mut self) {
        self.silence();
    }
}
