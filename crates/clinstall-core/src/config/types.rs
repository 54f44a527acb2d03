//! Configuration types for the installer

use crate::errors::InstallationError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstallerConfig {
    #[serde(default)]
    pub tool: ToolConfig,
    #[serde(default)]
    pub package_manager: PackageManagerConfig,
    #[serde(default)]
    pub download: DownloadConfig,
    /// Where the bundled binary is placed; `~` expands to the home directory
    #[serde(default)]
    pub install_dir: Option<PathBuf>,
    /// Environment variable holding the host's connectivity status
    #[serde(default = "default_connectivity_env")]
    pub connectivity_env: String,
}

impl Default for InstallerConfig {
    fn default() -> Self {
        Self {
            tool: ToolConfig::default(),
            package_manager: PackageManagerConfig::default(),
            download: DownloadConfig::default(),
            install_dir: None,
            connectivity_env: default_connectivity_env(),
        }
    }
}

impl InstallerConfig {
    pub fn validate(&self) -> Result<(), InstallationError> {
        if self.tool.name.trim().is_empty() {
            return Err(config_error("Tool name cannot be empty"));
        }

        if self.tool.binary_name.trim().is_empty() {
            return Err(config_error("Binary name cannot be empty"));
        }

        if self.tool.binary_name.contains(['/', '\\']) {
            return Err(config_error("Binary name must not contain path separators"));
        }

        if self.package_manager.enabled {
            if self.package_manager.version_command.trim().is_empty() {
                return Err(config_error("Package manager version_command cannot be empty"));
            }
            if self.package_manager.install_command.trim().is_empty() {
                return Err(config_error("Package manager install_command cannot be empty"));
            }
        }

        if self.connectivity_env.is_empty() {
            return Err(config_error("connectivity_env cannot be empty"));
        }

        match (&self.download.source.url, &self.download.source.github) {
            (Some(_), Some(_)) => {
                return Err(config_error("Download source must set either url or github, not both"));
            }
            (None, None) => {
                return Err(config_error("Download source must set either url or github"));
            }
            (Some(url), None) => {
                if !(url.starts_with("http://") || url.starts_with("https://")) {
                    return Err(config_error(&format!(
                        "Download url '{}' must start with http:// or https://",
                        url
                    )));
                }
            }
            (None, Some(github)) => {
                if github.org.is_empty() || github.repo.is_empty() {
                    return Err(config_error("GitHub source requires both org and repo"));
                }
            }
        }

        Ok(())
    }

    /// Resolve the directory the bundled binary is installed into.
    ///
    /// Defaults to `<home>/.local/bin`.
    pub fn resolve_install_dir(&self) -> Result<PathBuf, InstallationError> {
        match &self.install_dir {
            Some(dir) => expand_home(dir),
            None => Ok(home_dir()?.join(".local").join("bin")),
        }
    }
}

/// Home directory of the current user
pub fn home_dir() -> Result<PathBuf, InstallationError> {
    dirs::home_dir().ok_or_else(|| config_error("Could not determine the home directory"))
}

fn expand_home(path: &Path) -> Result<PathBuf, InstallationError> {
    match path.strip_prefix("~") {
        Ok(rest) => Ok(home_dir()?.join(rest)),
        Err(_) => Ok(path.to_path_buf()),
    }
}

fn config_error(message: &str) -> InstallationError {
    InstallationError::InvalidConfiguration {
        message: message.to_string(),
    }
}

/// The command-line tool being installed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolConfig {
    #[serde(default = "default_tool_name")]
    pub name: String,
    #[serde(default = "default_tool_name")]
    pub binary_name: String,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            name: default_tool_name(),
            binary_name: default_tool_name(),
        }
    }
}

/// Package manager used when it is available on the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageManagerConfig {
    #[serde(default = "default_package_manager")]
    pub name: String,
    #[serde(default = "default_version_command")]
    pub version_command: String,
    #[serde(default = "default_install_command")]
    pub install_command: String,
    #[serde(default = "default_permissions_help_url")]
    pub permissions_help_url: String,
    /// When false the probe is skipped and the bundled binary is always used
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for PackageManagerConfig {
    fn default() -> Self {
        Self {
            name: default_package_manager(),
            version_command: default_version_command(),
            install_command: default_install_command(),
            permissions_help_url: default_permissions_help_url(),
            enabled: true,
        }
    }
}

/// Bundled binary download settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownloadConfig {
    #[serde(default)]
    pub source: DownloadSourceConfig,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            source: DownloadSourceConfig::default(),
            connect_timeout_secs: default_connect_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

/// Exactly one of `url` or `github` must be set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownloadSourceConfig {
    /// Direct download URL; `{name}` and `{platform}` are substituted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github: Option<GitHubSourceConfig>,
}

impl Default for DownloadSourceConfig {
    fn default() -> Self {
        Self {
            url: None,
            github: Some(GitHubSourceConfig::default()),
        }
    }
}

/// Binary published as a GitHub release asset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GitHubSourceConfig {
    #[serde(default = "default_github_org")]
    pub org: String,
    #[serde(default = "default_github_repo")]
    pub repo: String,
    /// Exact asset name; `{name}`, `{platform}` and `{version}` are substituted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_pattern: Option<String>,
    /// Release tag; the latest release when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl Default for GitHubSourceConfig {
    fn default() -> Self {
        Self {
            org: default_github_org(),
            repo: default_github_repo(),
            asset_pattern: None,
            version: None,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_tool_name() -> String {
    "now".to_string()
}

fn default_package_manager() -> String {
    "npm".to_string()
}

fn default_version_command() -> String {
    "npm -v".to_string()
}

fn default_install_command() -> String {
    "npm install -g now".to_string()
}

fn default_permissions_help_url() -> String {
    "https://docs.npmjs.com/getting-started/fixing-npm-permissions".to_string()
}

fn default_connect_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    concat!("clinstall/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_github_org() -> String {
    "zeit".to_string()
}

fn default_github_repo() -> String {
    "now-cli".to_string()
}

fn default_connectivity_env() -> String {
    "CONNECTION".to_string()
}
