//! Download URL resolution from a direct URL template or GitHub releases

use crate::config::GitHubSourceConfig;
use crate::errors::DownloadError;
use crate::installation::traits::Platform;
use reqwest::Client;
use serde::{Deserialize, Serialize};

pub const GITHUB_API_BASE: &str = "https://api.github.com";

/// Where the bundled binary is published
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReleaseSource {
    /// A URL template with `{name}` and `{platform}` placeholders
    Direct { template: String },
    GitHub(GitHubRelease),
}

impl ReleaseSource {
    /// Resolve the download URL for `binary_name` on `platform`
    pub async fn resolve(
        &self,
        client: &Client,
        binary_name: &str,
        platform: &Platform,
    ) -> Result<String, DownloadError> {
        match self {
            ReleaseSource::Direct { template } => Ok(template
                .replace("{name}", binary_name)
                .replace("{platform}", &platform.to_asset_format())),
            ReleaseSource::GitHub(release) => release.resolve(client, binary_name, platform).await,
        }
    }
}

/// A binary published as a GitHub release asset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitHubRelease {
    pub org: String,
    pub repo: String,
    pub asset_pattern: Option<String>,
    pub version: Option<String>,
    pub api_base: String,
}

impl GitHubRelease {
    pub fn new(org: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            org: org.into(),
            repo: repo.into(),
            asset_pattern: None,
            version: None,
            api_base: GITHUB_API_BASE.to_string(),
        }
    }

    pub fn from_config(config: &GitHubSourceConfig) -> Self {
        Self {
            org: config.org.clone(),
            repo: config.repo.clone(),
            asset_pattern: config.asset_pattern.clone(),
            version: config.version.clone(),
            api_base: GITHUB_API_BASE.to_string(),
        }
    }

    /// Point API requests somewhere other than api.github.com
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    /// Get the GitHub API URL for the release
    pub fn releases_url(&self) -> String {
        if let Some(version) = &self.version {
            format!(
                "{}/repos/{}/{}/releases/tags/{}",
                self.api_base, self.org, self.repo, version
            )
        } else {
            format!("{}/repos/{}/{}/releases/latest", self.api_base, self.org, self.repo)
        }
    }

    async fn resolve(
        &self,
        client: &Client,
        binary_name: &str,
        platform: &Platform,
    ) -> Result<String, DownloadError> {
        let url = self.releases_url();
        let response = client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(DownloadError::Failed(format!(
                "GitHub API returned status {} for {}",
                response.status(),
                url
            )));
        }

        let release: ReleaseInfo = response.json().await.map_err(|e| {
            DownloadError::Failed(format!("Failed to parse GitHub release: {}", e))
        })?;

        let asset = self
            .find_matching_asset(&release, binary_name, platform)
            .ok_or_else(|| {
                DownloadError::Failed(format!(
                    "No asset in release {} matches '{}' on '{}'",
                    release.tag_name,
                    binary_name,
                    platform.to_asset_format()
                ))
            })?;

        log::debug!("Selected release asset {} from {}", asset.name, release.tag_name);
        Ok(asset.browser_download_url.clone())
    }

    /// Find the best matching asset for `platform`.
    ///
    /// An explicit asset pattern wins. Otherwise the asset must contain the
    /// binary name and an OS alias; one that also names the architecture is
    /// preferred over one that names no architecture at all.
    pub fn find_matching_asset<'a>(
        &self,
        release: &'a ReleaseInfo,
        binary_name: &str,
        platform: &Platform,
    ) -> Option<&'a ReleaseAsset> {
        if let Some(pattern) = &self.asset_pattern {
            let expected_name = pattern
                .replace("{name}", binary_name)
                .replace("{platform}", &platform.to_asset_format())
                .replace("{version}", &release.tag_name);

            return release.assets.iter().find(|a| a.name == expected_name);
        }

        let binary_name = binary_name.to_lowercase();
        let candidates: Vec<&ReleaseAsset> = release
            .assets
            .iter()
            .filter(|asset| {
                let name = asset.name.to_lowercase();
                name.contains(&binary_name)
                    && !is_checksum(&name)
                    && platform.os_aliases().iter().any(|os| name.contains(os))
            })
            .collect();

        let names_arch = |asset: &ReleaseAsset| {
            let name = asset.name.to_lowercase();
            platform.arch_aliases().iter().any(|arch| name.contains(arch))
        };
        let names_any_arch = |asset: &ReleaseAsset| {
            let name = asset.name.to_lowercase();
            KNOWN_ARCHES.iter().any(|arch| name.contains(arch))
        };

        candidates
            .iter()
            .copied()
            .find(|asset| names_arch(*asset))
            .or_else(|| candidates.iter().copied().find(|asset| !names_any_arch(*asset)))
    }
}

const KNOWN_ARCHES: &[&str] = &["x86_64", "amd64", "x64", "aarch64", "arm64", "armv7", "i686", "386"];

fn is_checksum(name: &str) -> bool {
    name.ends_with(".sha256") || name.ends_with(".sha512") || name.ends_with(".sig") || name.ends_with(".asc")
}

/// GitHub release API response
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReleaseInfo {
    pub tag_name: String,
    #[serde(default)]
    pub assets: Vec<ReleaseAsset>,
}

/// GitHub release asset
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReleaseAsset {
    pub name: String,
    pub browser_download_url: String,
}
