//! Build version information derived from source control.
//!
//! `build.rs` stamps the binary with the short commit hash of HEAD. The
//! value is always trimmed and non-empty; builds outside a git checkout
//! carry the `"unknown"` placeholder.

use serde::Serialize;
use utoipa::ToSchema;

/// Short commit hash embedded at compile time.
pub const BUILD_COMMIT_HASH: &str = env!("BUILD_COMMIT_HASH");

/// Version payload reported by the meta endpoint.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VersionInfo {
    /// Semantic version from the crate manifest.
    pub package_version: &'static str,
    /// Short commit hash of the checkout the binary was built from.
    pub commit_hash: &'static str,
}

impl VersionInfo {
    /// Capture the compile-time version information.
    pub fn current() -> Self {
        Self {
            package_version: env!("CARGO_PKG_VERSION"),
            commit_hash: BUILD_COMMIT_HASH,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn commit_hash_is_trimmed_and_non_empty() {
        assert!(!BUILD_COMMIT_HASH.is_empty());
        assert_eq!(BUILD_COMMIT_HASH, BUILD_COMMIT_HASH.trim());
    }

    #[rstest]
    fn version_info_reports_manifest_version() {
        let info = VersionInfo::current();
        assert_eq!(info.package_version, env!("CARGO_PKG_VERSION"));
        assert_eq!(info.commit_hash, BUILD_COMMIT_HASH);
    }
}
