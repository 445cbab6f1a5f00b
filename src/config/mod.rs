//! Application configuration module
//!
//! Environment-driven settings plus the constants shared by every layer.

mod constants;
mod settings;

pub use constants::*;
pub use settings::Config;
