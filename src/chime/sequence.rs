//! The Westminster quarters step table

use serde::{Deserialize, Serialize};

pub const G_SHARP_4: f32 = 415.3;
pub const F_SHARP_4: f32 = 369.99;
pub const E_4: f32 = 329.63;
pub const B_3: f32 = 246.94;

const SHORT_MS: u64 = 1000;
const FULL_MS: u64 = 2000;

/// Visual cue attached to a chime step.
///
/// Fill values are the share of the ring drawn, in quarters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "ring", content = "fill", rename_all = "snake_case")]
pub enum VisualMarker {
    SecondsRing(f32),
    MinutesRing(f32),
    /// End of the chime highlight
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tone {
    pub frequency_hz: f32,
    pub sustain_ms: u64,
}

/// One step of the sequence, fired `offset_ms` after the chime starts
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChimeStep {
    pub offset_ms: u64,
    pub tone: Option<Tone>,
    pub marker: VisualMarker,
}

const fn step(offset_ms: u64, frequency_hz: f32, sustain_ms: u64, marker: VisualMarker) -> ChimeStep {
    ChimeStep {
        offset_ms,
        tone: Some(Tone { frequency_hz, sustain_ms }),
        marker,
    }
}

/// Four quarter notes filling the seconds ring, four emptying the minutes
/// ring, then the closing marker
pub const WESTMINSTER_QUARTERS: [ChimeStep; 9] = [
    step(0, E_4, SHORT_MS, VisualMarker::SecondsRing(0.25)),
    step(500, G_SHARP_4, SHORT_MS, VisualMarker::SecondsRing(0.5)),
    step(1000, F_SHARP_4, SHORT_MS, VisualMarker::SecondsRing(0.75)),
    step(1500, B_3, FULL_MS, VisualMarker::SecondsRing(1.0)),
    step(2500, E_4, SHORT_MS, VisualMarker::MinutesRing(0.75)),
    step(3000, F_SHARP_4, SHORT_MS, VisualMarker::MinutesRing(0.5)),
    step(3500, G_SHARP_4, SHORT_MS, VisualMarker::MinutesRing(0.25)),
    step(4000, E_4, FULL_MS, VisualMarker::MinutesRing(0.0)),
    ChimeStep {
        offset_ms: 4250,
        tone: None,
        marker: VisualMarker::Finished,
    },
];
