//! Terminal rendering of engine events

use std::io::Write;
use tokio::sync::{broadcast, watch};
use tracing::{debug, warn};

use crate::{
    chime::VisualMarker,
    engine::TimerEvent,
    state::{TimerSnapshot, TimerState},
};

const BAR_WIDTH: usize = 20;

/// Zero-padded `MM:SS`, with an hours prefix once the countdown exceeds one
pub fn format_remaining(remaining_ms: u64) -> String {
    let total_seconds = remaining_ms / 1000;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{:02}:{:02}", minutes, seconds)
    }
}

/// Filled/empty block bar for a progress fraction
pub fn progress_bar(progress: f64) -> String {
    let filled = ((progress.clamp(0.0, 1.0)) * BAR_WIDTH as f64) as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled))
}

/// Whole-number percentage shown next to the bar
pub fn progress_percent(progress: f64) -> u8 {
    (progress.clamp(0.0, 1.0) * 100.0).round() as u8
}

/// Render one event as a status line; `None` for events with no output
pub fn render_event(event: &TimerEvent, snapshot: &TimerSnapshot) -> Option<String> {
    match event {
        TimerEvent::Tick { progress, remaining_ms, .. } => Some(format!(
            "⏱  {} remaining [{}] {}%",
            format_remaining(*remaining_ms),
            progress_bar(*progress),
            progress_percent(*progress)
        )),
        TimerEvent::DurationChanged { minutes } if snapshot.state == TimerState::Idle => Some(format!(
            "⏱  {} ready [{}] 0%",
            format_remaining(u64::from(*minutes) * 60_000),
            progress_bar(0.0)
        )),
        TimerEvent::DurationChanged { minutes } => Some(format!("Next run: {} minutes", minutes)),
        TimerEvent::StateChanged { state: TimerState::Paused } => Some("⏸  Paused".to_string()),
        TimerEvent::StateChanged { state: TimerState::Idle } => Some(format!(
            "⏱  {} ready [{}] 0%",
            format_remaining(u64::from(snapshot.duration_minutes) * 60_000),
            progress_bar(0.0)
        )),
        TimerEvent::StateChanged { .. } => None,
        TimerEvent::Completed => Some("🔔 Time's up! Your countdown has finished.".to_string()),
        TimerEvent::Chime { marker: VisualMarker::Finished } => None,
        TimerEvent::Chime { marker } => Some(chime_line(marker)),
    }
}

fn chime_line(marker: &VisualMarker) -> String {
    let (ring, fill) = match marker {
        VisualMarker::SecondsRing(fill) => ("◔", *fill),
        VisualMarker::MinutesRing(fill) => ("◕", *fill),
        VisualMarker::Finished => ("", 0.0),
    };
    format!("🔔 {} [{}]", ring, progress_bar(f64::from(fill)))
}

/// Print events until the channel closes
pub async fn render_loop(
    mut events: broadcast::Receiver<TimerEvent>,
    snapshots: watch::Receiver<TimerSnapshot>,
) {
    loop {
        let event = match events.recv().await {
            Ok(event) => event,
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                debug!("Renderer skipped {} events", skipped);
                continue;
            }
            Err(broadcast::error::RecvError::Closed) => break,
        };

        let snapshot = *snapshots.borrow();
        let Some(line) = render_event(&event, &snapshot) else {
            continue;
        };

        let mut stdout = std::io::stdout();
        let persistent = matches!(
            event,
            TimerEvent::Completed | TimerEvent::StateChanged { state: TimerState::Paused }
        );
        let written = if persistent {
            writeln!(stdout, "\r\x1b[2K{}", line)
        } else {
            write!(stdout, "\r\x1b[2K{}", line)
        };
        if let Err(e) = written.and_then(|_| stdout.flush()) {
            warn!("Failed to write to terminal: {}", e);
            break;
        }
    }
}
