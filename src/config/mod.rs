//! Configuration Management
//!
//! Unified configuration system with hierarchical resolution:
//! 1. Built-in defaults
//! 2. Global config (~/.config/repcoach/config.toml)
//! 3. Project config (.repcoach.toml)
//! 4. Environment variables (REPCOACH_*)

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::*;
