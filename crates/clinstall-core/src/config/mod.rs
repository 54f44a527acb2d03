//! Installer configuration
//!
//! YAML-backed settings for the tool being installed, its package manager,
//! and where the bundled binary comes from and goes to.

pub mod loader;
pub mod types;

pub use loader::*;
pub use types::*;
