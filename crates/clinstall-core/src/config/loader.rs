//! Configuration loader for YAML files
//!
//! Missing fields fall back to their defaults, so an empty document yields
//! the default configuration.

use crate::config::types::InstallerConfig;
use crate::errors::InstallationError;
use std::path::Path;
use tokio::fs;

/// Configuration loader with validation
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a YAML file
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<InstallerConfig, InstallationError> {
        let path = path.as_ref();

        let content = fs::read_to_string(path).await.map_err(|e| {
            InstallationError::InvalidConfiguration {
                message: format!("Failed to read config file {}: {}", path.display(), e),
            }
        })?;

        Self::from_str(&content)
    }

    /// Load configuration from a YAML string
    pub fn from_str(content: &str) -> Result<InstallerConfig, InstallationError> {
        let config: InstallerConfig = if content.trim().is_empty() {
            InstallerConfig::default()
        } else {
            serde_yaml::from_str(content).map_err(|e| InstallationError::InvalidConfiguration {
                message: format!("Failed to parse YAML config: {}", e),
            })?
        };

        config.validate()?;

        Ok(config)
    }

    /// Load from `path` when given, otherwise use the defaults
    pub async fn load_or_default(path: Option<&Path>) -> Result<InstallerConfig, InstallationError> {
        match path {
            Some(path) => Self::from_file(path).await,
            None => {
                let config = InstallerConfig::default();
                config.validate()?;
                Ok(config)
            }
        }
    }
}
