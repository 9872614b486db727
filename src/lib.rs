//! Chime Timer - a countdown timer with a Westminster-quarters chime
//!
//! This library provides a wall-clock correct countdown engine, the
//! completion chime sequencer and the terminal front end built on them.

pub mod chime;
pub mod cli;
pub mod clock;
pub mod config;
pub mod engine;
pub mod services;
pub mod state;
pub mod utils;

// Re-export commonly used types
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::Config;
pub use engine::{run_engine, TimerCommand, TimerEngine, TimerEvent};
pub use state::{Settings, SettingsHandle, TimerState};
pub use utils::signals::shutdown_signal;
