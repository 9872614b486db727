//! Platform service module
//!
//! Wrappers around the external programs used for sound and desktop
//! notifications. Each is probed once at startup; a missing program degrades
//! the feature instead of failing.

pub mod notifier;
pub mod tone;

// Re-export main types
pub use notifier::*;
pub use tone::*;
