//! Bundled binary provisioning
//!
//! Resolves the download URL (direct template or GitHub release), streams the
//! binary into a temporary directory, unpacks tarballs, and moves the result
//! into the install directory.

pub mod archive;
pub mod provisioner;
pub mod release;

pub use provisioner::{HttpBinaryProvisioner, ProgressTracker};
pub use release::{GitHubRelease, ReleaseAsset, ReleaseInfo, ReleaseSource};
