//! State management module
//!
//! Timer state types, the persisted settings record and the shared handle
//! through which the engine and presentation read and update it.

pub mod settings;
pub mod settings_handle;
pub mod timer_state;

// Re-export main types
pub use settings::{JsonFileStore, MemoryStore, Settings, SettingsError, SettingsStore, Theme};
pub use settings_handle::SettingsHandle;
pub use timer_state::{TimerConfig, TimerSnapshot, TimerState};
