//! Shared, persisting access to the settings record

use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

use super::settings::{Settings, SettingsStore};

/// Settings shared between the engine and the presentation layer.
///
/// Every update is written through to the backing store. Storage failures
/// are logged and dropped; the in-memory record stays authoritative for the
/// rest of the session.
#[derive(Clone)]
pub struct SettingsHandle {
    settings: Arc<Mutex<Settings>>,
    store: Arc<dyn SettingsStore>,
}

impl SettingsHandle {
    /// Load the record from `store`, falling back to defaults on any failure
    pub fn load(store: Arc<dyn SettingsStore>) -> Self {
        let settings = match store.read_raw() {
            Ok(Some(raw)) => Settings::from_json_lenient(&raw),
            Ok(None) => {
                info!("No saved settings, using defaults");
                Settings::default()
            }
            Err(e) => {
                warn!("Failed to read settings, using defaults: {}", e);
                Settings::default()
            }
        };

        Self {
            settings: Arc::new(Mutex::new(settings)),
            store,
        }
    }

    /// Copy of the current record
    pub fn snapshot(&self) -> Settings {
        match self.settings.lock() {
            Ok(settings) => settings.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Apply `updater` to the record and persist the result.
    ///
    /// The write happens under the lock so the store sees records in the
    /// same order as the updates that produced them.
    pub fn update<F>(&self, updater: F) -> Settings
    where
        F: FnOnce(&mut Settings),
    {
        let mut settings = match self.settings.lock() {
            Ok(settings) => settings,
            Err(poisoned) => poisoned.into_inner(),
        };
        updater(&mut settings);
        self.persist(&settings);
        settings.clone()
    }

    fn persist(&self, settings: &Settings) {
        let result = settings.to_json().and_then(|raw| self.store.write_raw(&raw));
        match result {
            Ok(()) => debug!("Settings saved"),
            Err(e) => warn!("Failed to save settings: {}", e),
        }
    }
}

impl std::fmt::Debug for SettingsHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsHandle")
            .field("settings", &self.snapshot())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::settings::{MemoryStore, SettingsError, Theme};
    use std::{
        sync::{mpsc, Mutex as StdMutex},
        thread,
        time::Duration,
    };

    struct BrokenStore;

    impl SettingsStore for BrokenStore {
        fn read_raw(&self) -> Result<Option<String>, SettingsError> {
            Err(SettingsError::Unavailable("quota exceeded".into()))
        }

        fn write_raw(&self, _raw: &str) -> Result<(), SettingsError> {
            Err(SettingsError::Unavailable("quota exceeded".into()))
        }
    }

    #[test]
    fn update_writes_through() {
        let store = Arc::new(MemoryStore::new());
        let handle = SettingsHandle::load(store.clone());

        handle.update(|s| {
            s.last_minutes = 37;
            s.theme = Theme::Light;
        });

        let reloaded = SettingsHandle::load(store).snapshot();
        assert_eq!(reloaded.last_minutes, 37);
        assert_eq!(reloaded.theme, Theme::Light);
    }

    #[test]
    fn broken_store_keeps_memory_state() {
        let handle = SettingsHandle::load(Arc::new(BrokenStore));
        assert_eq!(handle.snapshot(), Settings::default());

        let updated = handle.update(|s| s.muted = true);
        assert!(updated.muted);
        assert!(handle.snapshot().muted);
    }

    /// Store whose first write blocks until released
    struct GatedStore {
        inner: MemoryStore,
        entered: StdMutex<Option<mpsc::Sender<()>>>,
        release: StdMutex<Option<mpsc::Receiver<()>>>,
    }

    impl SettingsStore for GatedStore {
        fn read_raw(&self) -> Result<Option<String>, SettingsError> {
            self.inner.read_raw()
        }

        fn write_raw(&self, raw: &str) -> Result<(), SettingsError> {
            let entered = self.entered.lock().expect("lock").take();
            if let Some(entered) = entered {
                let _ = entered.send(());
                if let Some(release) = self.release.lock().expect("lock").take() {
                    let _ = release.recv();
                }
            }
            self.inner.write_raw(raw)
        }
    }

    #[test]
    fn concurrent_updates_persist_latest_record() {
        let (entered_tx, entered_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        let store = Arc::new(GatedStore {
            inner: MemoryStore::new(),
            entered: StdMutex::new(Some(entered_tx)),
            release: StdMutex::new(Some(release_rx)),
        });
        let handle = SettingsHandle::load(store.clone());

        let first = {
            let handle = handle.clone();
            thread::spawn(move || {
                handle.update(|s| s.muted = true);
            })
        };
        entered_rx.recv().expect("first write started");

        let second = {
            let handle = handle.clone();
            thread::spawn(move || {
                handle.update(|s| s.last_minutes = 37);
            })
        };
        // Give the second update time to race the stalled write
        thread::sleep(Duration::from_millis(50));
        release_tx.send(()).expect("release");

        first.join().expect("first update");
        second.join().expect("second update");

        let raw = store.read_raw().expect("read").expect("record written");
        let persisted = Settings::from_json_lenient(&raw);
        assert_eq!(persisted, handle.snapshot());
        assert!(persisted.muted);
        assert_eq!(persisted.last_minutes, 37);
    }

    #[test]
    fn clones_share_one_record() {
        let handle = SettingsHandle::load(Arc::new(MemoryStore::new()));
        let other = handle.clone();

        other.update(|s| s.notifications_enabled = false);
        assert!(!handle.snapshot().notifications_enabled);
    }
}
