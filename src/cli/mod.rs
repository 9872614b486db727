//! Terminal presentation module
//!
//! Renders engine events and turns keyboard input into commands.

pub mod input;
pub mod render;

pub use input::{input_loop, parse_line, InputAction};
pub use render::render_loop;
