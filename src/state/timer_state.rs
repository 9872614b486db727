//! Timer state structures

use serde::{Deserialize, Serialize};

/// Smallest duration a run can be configured with, in minutes
pub const MIN_MINUTES: u32 = 1;
/// Largest duration a run can be configured with, in minutes
pub const MAX_MINUTES: u32 = 180;
/// Duration used when nothing has been persisted yet
pub const DEFAULT_MINUTES: u32 = 25;

pub const MS_PER_MINUTE: u64 = 60_000;

/// Externally observable timer state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    Idle,
    Running,
    Paused,
    /// Momentary state between the final tick and the return to `Idle`
    Completed,
}

/// Configured duration of the next run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerConfig {
    duration_minutes: u32,
}

impl TimerConfig {
    /// Create a config, clamping `minutes` into the supported range
    pub fn new(minutes: u32) -> Self {
        Self {
            duration_minutes: minutes.clamp(MIN_MINUTES, MAX_MINUTES),
        }
    }

    /// Coerce free-form user input into a config.
    ///
    /// Returns `None` for NaN and infinities; everything else is rounded to
    /// the nearest minute and clamped.
    pub fn from_input(minutes: f64) -> Option<Self> {
        if !minutes.is_finite() {
            return None;
        }
        let rounded = minutes
            .round()
            .clamp(f64::from(MIN_MINUTES), f64::from(MAX_MINUTES));
        Some(Self::new(rounded as u32))
    }

    pub fn minutes(&self) -> u32 {
        self.duration_minutes
    }

    pub fn total_ms(&self) -> u64 {
        u64::from(self.duration_minutes) * MS_PER_MINUTE
    }
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self::new(DEFAULT_MINUTES)
    }
}

/// Run data held by the engine.
///
/// The end timestamp only exists while running and the remaining time only
/// while paused; `total_ms` is fixed for the whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Idle,
    Running { end_at_ms: i64, total_ms: u64 },
    Paused { remaining_ms: u64, total_ms: u64 },
}

impl RunPhase {
    pub fn state(&self) -> TimerState {
        match self {
            RunPhase::Idle => TimerState::Idle,
            RunPhase::Running { .. } => TimerState::Running,
            RunPhase::Paused { .. } => TimerState::Paused,
        }
    }

    pub fn total_ms(&self) -> Option<u64> {
        match *self {
            RunPhase::Idle => None,
            RunPhase::Running { total_ms, .. } | RunPhase::Paused { total_ms, .. } => Some(total_ms),
        }
    }

    /// Remaining time of the run as seen at `now_ms`
    pub fn remaining_ms(&self, now_ms: i64) -> Option<u64> {
        match *self {
            RunPhase::Idle => None,
            RunPhase::Running { end_at_ms, .. } => Some((end_at_ms - now_ms).max(0) as u64),
            RunPhase::Paused { remaining_ms, .. } => Some(remaining_ms),
        }
    }
}

/// Elapsed share of `total_ms` given `time_left_ms`, in `[0, 1]`
pub fn progress_fraction(total_ms: u64, time_left_ms: i64) -> f64 {
    if total_ms == 0 {
        return 0.0;
    }
    let total = total_ms as f64;
    ((total - time_left_ms as f64) / total).clamp(0.0, 1.0)
}

/// Split a positive remaining time into the minutes and seconds shown on the dial
pub fn display_parts(time_left_ms: i64) -> (u64, u64) {
    let whole_seconds = (time_left_ms.max(0) / 1000) as u64;
    let seconds = whole_seconds % 60;
    let minutes = (whole_seconds / 60) % 60;
    (minutes, seconds)
}

/// Point-in-time view of the engine, published after every change
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    pub state: TimerState,
    pub duration_minutes: u32,
    pub remaining_ms: Option<u64>,
    pub total_ms: Option<u64>,
    pub progress: f64,
}

impl TimerSnapshot {
    /// Snapshot of an idle timer configured with `duration_minutes`
    pub fn idle(duration_minutes: u32) -> Self {
        Self {
            state: TimerState::Idle,
            duration_minutes,
            remaining_ms: None,
            total_ms: None,
            progress: 0.0,
        }
    }
}

impl Default for TimerSnapshot {
    fn default() -> Self {
        Self::idle(DEFAULT_MINUTES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_is_rounded_and_clamped() {
        assert_eq!(TimerConfig::from_input(0.0).map(|c| c.minutes()), Some(1));
        assert_eq!(TimerConfig::from_input(-12.0).map(|c| c.minutes()), Some(1));
        assert_eq!(TimerConfig::from_input(999.0).map(|c| c.minutes()), Some(180));
        assert_eq!(TimerConfig::from_input(24.5).map(|c| c.minutes()), Some(25));
        assert_eq!(TimerConfig::from_input(24.4).map(|c| c.minutes()), Some(24));
    }

    #[test]
    fn non_finite_input_is_rejected() {
        assert!(TimerConfig::from_input(f64::NAN).is_none());
        assert!(TimerConfig::from_input(f64::INFINITY).is_none());
        assert!(TimerConfig::from_input(f64::NEG_INFINITY).is_none());
    }

    #[test]
    fn display_parts_wrap_at_the_hour() {
        assert_eq!(display_parts(60_000), (1, 0));
        assert_eq!(display_parts(59_999), (0, 59));
        assert_eq!(display_parts(3_600_000 + 61_000), (1, 1));
        assert_eq!(display_parts(-5), (0, 0));
    }

    #[test]
    fn progress_is_clamped() {
        assert_eq!(progress_fraction(600_000, 600_000), 0.0);
        assert_eq!(progress_fraction(600_000, 300_000), 0.5);
        assert_eq!(progress_fraction(600_000, -10), 1.0);
        assert_eq!(progress_fraction(600_000, 700_000), 0.0);
        assert_eq!(progress_fraction(0, 0), 0.0);
    }

    #[test]
    fn paused_phase_reports_frozen_remaining() {
        let phase = RunPhase::Paused { remaining_ms: 1_234, total_ms: 60_000 };
        assert_eq!(phase.remaining_ms(0), Some(1_234));
        assert_eq!(phase.remaining_ms(999_999), Some(1_234));
        assert_eq!(phase.state(), TimerState::Paused);
    }
}
