//! CLI command implementations.

pub mod common;
pub mod play;
pub mod presets;
pub mod render;
pub mod status;
