//! Keyboard input handling
//!
//! Input is line based: each line is one key or a number of minutes.

use std::sync::Arc;
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::mpsc,
};
use tracing::{debug, info, warn};

use crate::{
    engine::TimerCommand,
    services::{toggle_notifications, NotificationToggle, Notifier},
    state::SettingsHandle,
};

/// What a line of input asks for
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputAction {
    Timer(TimerCommand),
    ToggleMute,
    CycleTheme,
    ToggleNotifications,
    Help,
    Quit,
}

pub const HELP: &str = "\
  <enter>/space  start / pause / resume
  r              reset
  + / -          one minute more / less
  <number>       set minutes (1-180)
  m              mute / unmute chime
  t              cycle theme
  n              toggle notifications
  q              quit";

/// Map one line of input to an action; unrecognised input yields `None`
pub fn parse_line(line: &str) -> Option<InputAction> {
    let trimmed = line.trim();
    let action = match trimmed {
        "" | "s" | "space" => InputAction::Timer(TimerCommand::Toggle),
        "p" => InputAction::Timer(TimerCommand::Pause),
        "r" | "R" => InputAction::Timer(TimerCommand::Reset { suppress: true }),
        "+" | "=" => InputAction::Timer(TimerCommand::StepDuration(1)),
        "-" | "_" => InputAction::Timer(TimerCommand::StepDuration(-1)),
        "m" => InputAction::ToggleMute,
        "t" => InputAction::CycleTheme,
        "n" => InputAction::ToggleNotifications,
        "h" | "?" | "help" => InputAction::Help,
        "q" | "quit" | "exit" => InputAction::Quit,
        other => {
            let minutes: f64 = other.parse().ok()?;
            InputAction::Timer(TimerCommand::SetDuration(minutes))
        }
    };
    Some(action)
}

/// Read stdin until EOF or `q`, forwarding timer commands to the engine
/// and applying settings toggles directly
pub async fn input_loop(
    commands: mpsc::UnboundedSender<TimerCommand>,
    settings: SettingsHandle,
    notifier: Option<Arc<dyn Notifier>>,
) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => {
                debug!("stdin closed");
                break;
            }
            Err(e) => {
                warn!("Failed to read input: {}", e);
                break;
            }
        };

        let Some(action) = parse_line(&line) else {
            debug!("Ignoring input: {:?}", line);
            continue;
        };

        match action {
            InputAction::Timer(command) => {
                if commands.send(command).is_err() {
                    break;
                }
            }
            InputAction::ToggleMute => {
                let updated = settings.update(|s| s.muted = !s.muted);
                if updated.muted {
                    let _ = commands.send(TimerCommand::Silence);
                }
                println!("\r{}", if updated.muted { "Sound: Off" } else { "Sound: On" });
            }
            InputAction::CycleTheme => {
                let updated = settings.update(|s| s.theme = s.theme.next());
                println!("\rTheme: {}", updated.theme.label());
            }
            InputAction::ToggleNotifications => {
                let outcome = toggle_notifications(notifier.as_deref(), &settings).await;
                println!("\r{}", notification_label(outcome));
            }
            InputAction::Help => println!("{}", HELP),
            InputAction::Quit => break,
        }
    }

    info!("Input closed, shutting down");
    let _ = commands.send(TimerCommand::Shutdown);
}

fn notification_label(outcome: NotificationToggle) -> &'static str {
    match outcome {
        NotificationToggle::Unsupported => "Notifications unsupported on this system",
        NotificationToggle::Enabled => "Notifications: On",
        NotificationToggle::Disabled => "Notifications: Off",
        NotificationToggle::Blocked => "Notifications are blocked",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_map_to_commands() {
        assert_eq!(parse_line(""), Some(InputAction::Timer(TimerCommand::Toggle)));
        assert_eq!(parse_line(" "), Some(InputAction::Timer(TimerCommand::Toggle)));
        assert_eq!(
            parse_line("r"),
            Some(InputAction::Timer(TimerCommand::Reset { suppress: true }))
        );
        assert_eq!(parse_line("+"), Some(InputAction::Timer(TimerCommand::StepDuration(1))));
        assert_eq!(parse_line("_"), Some(InputAction::Timer(TimerCommand::StepDuration(-1))));
        assert_eq!(parse_line("q"), Some(InputAction::Quit));
        assert_eq!(parse_line("m"), Some(InputAction::ToggleMute));
    }

    #[test]
    fn numbers_set_duration() {
        assert_eq!(
            parse_line(" 37 "),
            Some(InputAction::Timer(TimerCommand::SetDuration(37.0)))
        );
        assert_eq!(
            parse_line("2.6"),
            Some(InputAction::Timer(TimerCommand::SetDuration(2.6)))
        );
    }

    #[test]
    fn unknown_input_is_ignored() {
        assert_eq!(parse_line("banana"), None);
        assert_eq!(parse_line("12abc"), None);
    }
}
