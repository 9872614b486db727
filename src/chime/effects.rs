//! What happens when a run completes

use std::sync::Arc;
use tracing::debug;

use crate::{
    engine::CompletionEffects,
    services::{notify_if_allowed, Notifier, COMPLETION_BODY, COMPLETION_TITLE},
    state::Settings,
};
use super::sequencer::ChimeSequencer;

/// Chime plus desktop notification, gated by the user's settings
pub struct ChimeAndNotify {
    chime: ChimeSequencer,
    notifier: Option<Arc<dyn Notifier>>,
}

impl ChimeAndNotify {
    pub fn new(chime: ChimeSequencer, notifier: Option<Arc<dyn Notifier>>) -> Self {
        Self { chime, notifier }
    }
}

impl CompletionEffects for ChimeAndNotify {
    fn on_completed(&mut self, settings: &Settings) {
        if settings.muted {
            debug!("Muted, skipping completion chime");
        } else {
            self.chime.play_sequence();
        }

        notify_if_allowed(
            self.notifier.as_deref(),
            settings.notifications_enabled,
            COMPLETION_TITLE,
            COMPLETION_BODY,
        );
    }

    fn suppress(&mut self) {
        self.chime.silence();
    }
}
