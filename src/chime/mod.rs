//! Completion chime module
//!
//! The Westminster quarters table, the sequencer that plays it and the
//! completion effects that tie the chime and notifier to the engine.

pub mod effects;
pub mod sequence;
pub mod sequencer;

// Re-export main types
pub use effects::ChimeAndNotify;
pub use sequence::{ChimeStep, Tone, VisualMarker, WESTMINSTER_QUARTERS};
pub use sequencer::ChimeSequencer;
