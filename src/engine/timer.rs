//! Countdown state machine
//!
//! The engine never counts down on its own. Every tick re-derives the time
//! left from the absolute end timestamp and the clock, so a late or missed
//! tick simply observes less time remaining (or completion) instead of
//! drifting.
//!
//! ```text
//! Idle -> Running <-> Paused
//!          |
//!          +-> Completed -> Idle
//! ```

use std::{sync::Arc, time::Duration};
use tokio::sync::watch;
use tracing::{debug, info};

use crate::{
    clock::Clock,
    state::{
        timer_state::{display_parts, progress_fraction, RunPhase, MAX_MINUTES, MIN_MINUTES},
        Settings, SettingsHandle, TimerConfig, TimerSnapshot, TimerState,
    },
};
use super::{
    events::{EventBus, TimerEvent},
    scheduler::{TickHandle, TickScheduler},
};

/// Interval between ticks while running; not adjusted for drift
pub const TICK_INTERVAL: Duration = Duration::from_millis(1000);

/// Side effects of a finished run (chime, notification)
pub trait CompletionEffects: Send {
    /// Called once per completed run, after the engine is back to idle
    fn on_completed(&mut self, settings: &Settings);

    /// Stop anything still playing from a previous completion
    fn suppress(&mut self);
}

/// Single countdown timer.
///
/// All state lives in this struct; commands are plain method calls made by
/// whoever owns it (normally the driver task).
pub struct TimerEngine {
    clock: Arc<dyn Clock>,
    scheduler: Box<dyn TickScheduler>,
    effects: Box<dyn CompletionEffects>,
    settings: SettingsHandle,
    events: EventBus,
    snapshot_tx: watch::Sender<TimerSnapshot>,
    config: TimerConfig,
    phase: RunPhase,
    pending_tick: Option<TickHandle>,
}

impl TimerEngine {
    /// Create an idle engine configured from `settings.lastMinutes`
    pub fn new(
        clock: Arc<dyn Clock>,
        scheduler: Box<dyn TickScheduler>,
        effects: Box<dyn CompletionEffects>,
        settings: SettingsHandle,
        events: EventBus,
    ) -> Self {
        let config = TimerConfig::new(settings.snapshot().last_minutes);
        let (snapshot_tx, _) = watch::channel(TimerSnapshot::idle(config.minutes()));

        Self {
            clock,
            scheduler,
            effects,
            settings,
            events,
            snapshot_tx,
            config,
            phase: RunPhase::Idle,
            pending_tick: None,
        }
    }

    // Queries

    pub fn state(&self) -> TimerState {
        self.phase.state()
    }

    pub fn duration_minutes(&self) -> u32 {
        self.config.minutes()
    }

    /// Total duration of the current run, fixed when it started
    pub fn total_duration_ms(&self) -> Option<u64> {
        self.phase.total_ms()
    }

    pub fn remaining_ms(&self) -> Option<u64> {
        self.phase.remaining_ms(self.clock.now_ms())
    }

    /// Absolute end of the run; only set while running
    pub fn end_timestamp_ms(&self) -> Option<i64> {
        match self.phase {
            RunPhase::Running { end_at_ms, .. } => Some(end_at_ms),
            _ => None,
        }
    }

    pub fn pending_tick(&self) -> Option<TickHandle> {
        self.pending_tick
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        let now = self.clock.now_ms();
        let remaining_ms = self.phase.remaining_ms(now);
        let total_ms = self.phase.total_ms();
        let progress = match (total_ms, remaining_ms) {
            (Some(total), Some(remaining)) => progress_fraction(total, remaining as i64),
            _ => 0.0,
        };

        TimerSnapshot {
            state: self.state(),
            duration_minutes: self.config.minutes(),
            remaining_ms,
            total_ms,
            progress,
        }
    }

    /// Receiver that always holds the latest snapshot
    pub fn watch(&self) -> watch::Receiver<TimerSnapshot> {
        self.snapshot_tx.subscribe()
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    // Commands

    /// Configure the duration of the next run.
    ///
    /// NaN and infinities are ignored. A run in progress is discarded first.
    pub fn set_duration(&mut self, minutes: f64) {
        let Some(config) = TimerConfig::from_input(minutes) else {
            debug!("Ignoring non-numeric duration input: {}", minutes);
            return;
        };

        if self.phase != RunPhase::Idle {
            info!("Duration changed during a run, resetting");
            self.reset(true);
        }

        self.apply_config(config);
    }

    /// Nudge the configured duration by `delta` minutes.
    ///
    /// Unlike `set_duration` this leaves a run in progress alone; the new
    /// value applies to the next run.
    pub fn step_duration(&mut self, delta: i32) {
        let current = self.config.minutes() as i64;
        let target =
            (current + i64::from(delta)).clamp(i64::from(MIN_MINUTES), i64::from(MAX_MINUTES));
        if target == current {
            return;
        }
        self.apply_config(TimerConfig::new(target as u32));
    }

    /// Begin a run from idle, or resume a paused one
    pub fn start(&mut self) {
        match self.phase {
            RunPhase::Idle => {
                let total_ms = self.config.total_ms();
                let end_at_ms = self.clock.now_ms() + total_ms as i64;
                self.phase = RunPhase::Running { end_at_ms, total_ms };

                info!("Timer started for {} minutes", self.config.minutes());
                self.emit_state();
                self.tick();
            }
            RunPhase::Paused { .. } => self.resume(),
            RunPhase::Running { .. } => debug!("Start ignored, already running"),
        }
    }

    pub fn pause(&mut self) {
        let RunPhase::Running { end_at_ms, total_ms } = self.phase else {
            debug!("Pause ignored, timer not running");
            return;
        };

        self.cancel_pending_tick();
        let remaining_ms = (end_at_ms - self.clock.now_ms()).max(0) as u64;
        self.phase = RunPhase::Paused { remaining_ms, total_ms };

        info!("Timer paused with {}ms remaining", remaining_ms);
        self.emit_state();
    }

    pub fn resume(&mut self) {
        let RunPhase::Paused { remaining_ms, total_ms } = self.phase else {
            debug!("Resume ignored, timer not paused");
            return;
        };

        let end_at_ms = self.clock.now_ms() + remaining_ms as i64;
        self.phase = RunPhase::Running { end_at_ms, total_ms };

        info!("Timer resumed with {}ms remaining", remaining_ms);
        self.emit_state();
        self.tick();
    }

    /// Start, pause or resume depending on the current state
    pub fn toggle(&mut self) {
        match self.phase {
            RunPhase::Idle => self.start(),
            RunPhase::Running { .. } => self.pause(),
            RunPhase::Paused { .. } => self.resume(),
        }
    }

    /// Return to idle, discarding any run.
    ///
    /// With `suppress_completion_effects` set, anything still playing from a
    /// completion is silenced as well.
    pub fn reset(&mut self, suppress_completion_effects: bool) {
        self.cancel_pending_tick();

        if suppress_completion_effects {
            self.effects.suppress();
        }

        if self.phase == RunPhase::Idle {
            return;
        }

        self.phase = RunPhase::Idle;
        info!("Timer reset");
        self.emit_state();
    }

    /// Stop any completion effects still playing
    pub fn silence(&mut self) {
        self.effects.suppress();
    }

    /// Scheduler callback. Only the currently pending tick is honoured.
    pub fn on_tick_fired(&mut self, handle: TickHandle) {
        if self.pending_tick != Some(handle) {
            debug!("Ignoring stale tick {}", handle.id());
            return;
        }
        self.pending_tick = None;
        self.tick();
    }

    /// Recompute the countdown and either complete or schedule the next tick
    pub fn tick(&mut self) {
        let RunPhase::Running { end_at_ms, total_ms } = self.phase else {
            return;
        };
        self.cancel_pending_tick();

        let time_left = end_at_ms - self.clock.now_ms();
        if time_left <= 0 {
            self.complete();
            return;
        }

        let (minutes_left, seconds_left) = display_parts(time_left);
        self.events.emit(TimerEvent::Tick {
            minutes_left,
            seconds_left,
            progress: progress_fraction(total_ms, time_left),
            remaining_ms: time_left as u64,
        });
        self.publish_snapshot();

        self.pending_tick = Some(self.scheduler.schedule(TICK_INTERVAL));
    }

    fn complete(&mut self) {
        self.phase = RunPhase::Idle;
        info!("Timer completed");

        self.events.emit(TimerEvent::Tick {
            minutes_left: 0,
            seconds_left: 0,
            progress: 1.0,
            remaining_ms: 0,
        });
        self.events.emit(TimerEvent::StateChanged { state: TimerState::Completed });
        self.events.emit(TimerEvent::Completed);

        let settings = self.settings.snapshot();
        self.effects.on_completed(&settings);

        self.emit_state();
    }

    fn apply_config(&mut self, config: TimerConfig) {
        self.config = config;
        let minutes = config.minutes();
        self.settings.update(|s| s.last_minutes = minutes);

        debug!("Duration set to {} minutes", minutes);
        self.events.emit(TimerEvent::DurationChanged { minutes });
        self.publish_snapshot();
    }

    fn cancel_pending_tick(&mut self) {
        if let Some(handle) = self.pending_tick.take() {
            self.scheduler.cancel(handle);
        }
    }

    fn emit_state(&self) {
        self.events.emit(TimerEvent::StateChanged { state: self.state() });
        self.publish_snapshot();
    }

    fn publish_snapshot(&self) {
        self.snapshot_tx.send_replace(self.snapshot());
    }
}

impl std::fmt::Debug for TimerEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerEngine")
            .field("config", &self.config)
            .field("phase", &self.phase)
            .field("pending_tick", &self.pending_tick)
            .finish_non_exhaustive()
    }
}
