//! Desktop notifications

use std::{process::Stdio, sync::Mutex};
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::state::SettingsHandle;

pub const COMPLETION_TITLE: &str = "Time's up!";
pub const COMPLETION_BODY: &str = "Your countdown has finished.";
pub const ENABLED_TITLE: &str = "Notifications enabled";
pub const ENABLED_BODY: &str = "You will be notified when the timer completes.";

/// Permission to show notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    Granted,
    Denied,
    /// Not decided yet; a request may change it
    Default,
}

/// Platform notification capability
pub trait Notifier: Send + Sync {
    fn permission(&self) -> Permission;

    /// Ask for permission; resolves with the resulting decision
    fn request_permission(&self) -> BoxFuture<'_, Permission>;

    fn notify(&self, title: &str, body: &str) -> Result<(), String>;
}

/// Notifications sent through `notify-send`.
///
/// Desktops reachable through `notify-send` have no permission prompt, so the
/// notifier starts out granted once detected.
#[derive(Debug)]
pub struct DesktopNotifier {
    program: String,
    permission: Mutex<Permission>,
}

impl DesktopNotifier {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            permission: Mutex::new(Permission::Granted),
        }
    }
}

impl Notifier for DesktopNotifier {
    fn permission(&self) -> Permission {
        self.permission.lock().map(|p| *p).unwrap_or(Permission::Denied)
    }

    fn request_permission(&self) -> BoxFuture<'_, Permission> {
        Box::pin(async move {
            let granted = Command::new(&self.program)
                .arg("--version")
                .stdin(Stdio::null())
                .output()
                .await
                .map(|output| output.status.success())
                .unwrap_or(false);

            let permission = if granted { Permission::Granted } else { Permission::Denied };
            if let Ok(mut slot) = self.permission.lock() {
                *slot = permission;
            }
            permission
        })
    }

    fn notify(&self, title: &str, body: &str) -> Result<(), String> {
        debug!("Sending notification: {}", title);

        Command::new(&self.program)
            .args(["--app-name=chime-timer", title, body])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map(|_child| ())
            .map_err(|e| format!("Failed to spawn {}: {}", self.program, e))
    }
}

/// Check whether `notify-send` is installed
pub async fn detect_notifier() -> Option<DesktopNotifier> {
    let probe = Command::new("notify-send")
        .arg("--version")
        .stdin(Stdio::null())
        .output()
        .await;

    match probe {
        Ok(output) if output.status.success() => {
            info!("Desktop notifications available via notify-send");
            Some(DesktopNotifier::new("notify-send"))
        }
        Ok(_) | Err(_) => {
            info!("notify-send not available, notifications disabled");
            None
        }
    }
}

/// Send a notification if the platform supports it, permission is granted
/// and the user has them enabled. Returns whether one was sent.
pub fn notify_if_allowed(
    notifier: Option<&dyn Notifier>,
    notifications_enabled: bool,
    title: &str,
    body: &str,
) -> bool {
    let Some(notifier) = notifier else {
        return false;
    };
    if notifier.permission() != Permission::Granted || !notifications_enabled {
        return false;
    }

    match notifier.notify(title, body) {
        Ok(()) => true,
        Err(e) => {
            debug!("Notification failed: {}", e);
            false
        }
    }
}

/// Outcome of the notifications toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationToggle {
    Unsupported,
    Enabled,
    Disabled,
    Blocked,
}

/// Flip the app-level notifications flag, requesting permission first if it
/// has not been decided yet
pub async fn toggle_notifications(
    notifier: Option<&dyn Notifier>,
    settings: &SettingsHandle,
) -> NotificationToggle {
    let Some(notifier) = notifier else {
        return NotificationToggle::Unsupported;
    };

    match notifier.permission() {
        Permission::Granted => {
            let updated = settings.update(|s| s.notifications_enabled = !s.notifications_enabled);
            if updated.notifications_enabled {
                notify_if_allowed(Some(notifier), true, ENABLED_TITLE, ENABLED_BODY);
                NotificationToggle::Enabled
            } else {
                NotificationToggle::Disabled
            }
        }
        Permission::Default => match notifier.request_permission().await {
            Permission::Granted => {
                settings.update(|s| s.notifications_enabled = true);
                notify_if_allowed(Some(notifier), true, ENABLED_TITLE, ENABLED_BODY);
                NotificationToggle::Enabled
            }
            Permission::Denied => {
                warn!("Notification permission denied");
                NotificationToggle::Blocked
            }
            Permission::Default => NotificationToggle::Disabled,
        },
        Permission::Denied => NotificationToggle::Blocked,
    }
}
