//! Config Command
//!
//! Manage repcoach configuration.
//!
//! Usage:
//!   repcoach config show [-f json]
//!   repcoach config path
//!   repcoach config init [-g] [--force]

use crate::config::ConfigLoader;
use crate::types::Result;

/// Show merged effective configuration
pub fn show(format: &str) -> Result<()> {
    let as_json = format == "json";
    ConfigLoader::show_config(as_json)
}

/// Show configuration paths
pub fn path() -> Result<()> {
    ConfigLoader::show_path();
    Ok(())
}

/// Initialize global configuration
pub fn init_global(force: bool) -> Result<()> {
    let path = ConfigLoader::init_global(force)?;
    println!("✓ Initialized global configuration");
    println!("  Config: {}", path.display());
    Ok(())
}

/// Initialize project configuration
pub fn init_project(force: bool) -> Result<()> {
    let path = ConfigLoader::init_project(force)?;
    println!("✓ Initialized project configuration");
    println!("  Config: {}", path.display());
    Ok(())
}
