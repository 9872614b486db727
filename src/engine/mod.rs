//! Timer engine module
//!
//! The countdown state machine, its tick scheduling, the events it publishes
//! and the task that drives it.

pub mod driver;
pub mod events;
pub mod scheduler;
pub mod timer;

// Re-export main types
pub use driver::{run_engine, TimerCommand};
pub use events::{EventBus, TimerEvent};
pub use scheduler::{ManualScheduler, TickHandle, TickScheduler, TokioScheduler};
pub use timer::{CompletionEffects, TimerEngine, TICK_INTERVAL};
