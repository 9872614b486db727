//! Tone generation backends

use std::{
    io::Write,
    process::Stdio,
    time::Duration,
};
use tokio::process::Command;
use tracing::{debug, info};

/// Plays a single sine tone, fire-and-forget.
///
/// Implementations return immediately; the tone keeps sounding for
/// `duration` after the call.
pub trait ToneGenerator: Send + Sync {
    fn play_tone(&self, frequency_hz: f32, duration: Duration) -> Result<(), String>;
}

/// Tones synthesized by SoX's `play` command
#[derive(Debug, Clone)]
pub struct SoxTone {
    program: String,
}

impl SoxTone {
    pub fn new() -> Self {
        Self::with_program("play")
    }

    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Arguments for one tone: short linear attack, fade out over the rest
    pub fn synth_args(frequency_hz: f32, duration: Duration) -> Vec<String> {
        let secs = duration.as_secs_f32().max(0.02);
        vec![
            "-q".to_string(),
            "-n".to_string(),
            "synth".to_string(),
            format!("{:.3}", secs),
            "sine".to_string(),
            format!("{:.2}", frequency_hz),
            "fade".to_string(),
            "q".to_string(),
            "0.01".to_string(),
            format!("{:.3}", secs),
            format!("{:.3}", secs - 0.01),
        ]
    }
}

impl Default for SoxTone {
    fn default() -> Self {
        Self::new()
    }
}

impl ToneGenerator for SoxTone {
    fn play_tone(&self, frequency_hz: f32, duration: Duration) -> Result<(), String> {
        debug!("Playing {:.2}Hz for {:?}", frequency_hz, duration);

        Command::new(&self.program)
            .args(Self::synth_args(frequency_hz, duration))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map(|_child| ())
            .map_err(|e| format!("Failed to spawn {}: {}", self.program, e))
    }
}

/// Fallback alert: the terminal bell
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalBell;

impl ToneGenerator for TerminalBell {
    fn play_tone(&self, _frequency_hz: f32, _duration: Duration) -> Result<(), String> {
        let mut stdout = std::io::stdout();
        stdout
            .write_all(b"\x07")
            .and_then(|_| stdout.flush())
            .map_err(|e| format!("Failed to ring terminal bell: {}", e))
    }
}

/// Check whether SoX `play` is installed
pub async fn detect_tone_generator() -> Option<SoxTone> {
    let probe = Command::new("play")
        .arg("--version")
        .stdin(Stdio::null())
        .output()
        .await;

    match probe {
        Ok(output) if output.status.success() => {
            info!("Tone generation available via sox");
            Some(SoxTone::new())
        }
        Ok(_) | Err(_) => {
            info!("sox `play` not available, completion chime falls back to the terminal bell");
            None
        }
    }
}
