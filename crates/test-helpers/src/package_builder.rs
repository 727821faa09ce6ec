//! Package builder that returns canned artifacts.

use async_trait::async_trait;
use kiosk_provisioner_core::{BuildError, PackageBuilder};
use kiosk_provisioner_types::BuildArtifact;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Serves a fixed artifact per package path.
///
/// Unknown paths fail with [`BuildError::MissingPackage`], like a missing
/// directory would.
#[derive(Default)]
pub struct FakePackageBuilder {
    packages: Mutex<HashMap<PathBuf, Result<BuildArtifact, BuildError>>>,
    builds: Mutex<Vec<PathBuf>>,
}

impl FakePackageBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `artifact` for `path`.
    pub fn with_package(self, path: impl Into<PathBuf>, artifact: BuildArtifact) -> Self {
        self.packages.lock().insert(path.into(), Ok(artifact));
        self
    }

    /// Fail builds of `path` with `error`.
    pub fn with_failure(self, path: impl Into<PathBuf>, error: BuildError) -> Self {
        self.packages.lock().insert(path.into(), Err(error));
        self
    }

    /// Paths built so far, in call order.
    pub fn builds(&self) -> Vec<PathBuf> {
        self.builds.lock().clone()
    }
}

#[async_trait]
impl PackageBuilder for FakePackageBuilder {
    async fn build(&self, package_path: &Path) -> Result<BuildArtifact, BuildError> {
        self.builds.lock().push(package_path.to_path_buf());
        self.packages
            .lock()
            .get(package_path)
            .cloned()
            .unwrap_or_else(|| Err(BuildError::MissingPackage(package_path.to_path_buf())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::sword_artifact;

    #[tokio::test]
    async fn test_serves_configured_artifacts() {
        let builder = FakePackageBuilder::new()
            .with_package("../sword", sword_artifact())
            .with_failure(
                "../broken",
                BuildError::ToolchainFailed {
                    status: Some(1),
                    stderr: "error[E01001]".to_string(),
                },
            );

        assert_eq!(
            builder.build(Path::new("../sword")).await.unwrap(),
            sword_artifact()
        );
        assert!(matches!(
            builder.build(Path::new("../broken")).await,
            Err(BuildError::ToolchainFailed { .. })
        ));
        assert!(matches!(
            builder.build(Path::new("../missing")).await,
            Err(BuildError::MissingPackage(_))
        ));
        assert_eq!(builder.builds().len(), 3);
    }
}
