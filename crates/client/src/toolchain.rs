//! Move package builds through the `sui` command-line toolchain.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use kiosk_provisioner_core::{BuildError, PackageBuilder};
use kiosk_provisioner_types::{BuildArtifact, PackageId};
use serde::Deserialize;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Default toolchain binary, looked up on `PATH`.
pub const DEFAULT_BINARY: &str = "sui";

/// Builds packages with `sui move build --dump-bytecode-as-base64`.
#[derive(Debug, Clone)]
pub struct MoveToolchain {
    binary: String,
}

impl Default for MoveToolchain {
    fn default() -> Self {
        Self {
            binary: DEFAULT_BINARY.to_string(),
        }
    }
}

impl MoveToolchain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different toolchain binary.
    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }

    pub fn binary(&self) -> &str {
        &self.binary
    }
}

#[derive(Deserialize)]
struct DumpedPackage {
    modules: Vec<String>,
    dependencies: Vec<String>,
}

/// Parse the JSON the toolchain prints after a successful build.
///
/// Compiler diagnostics may precede it, so only the last line that opens a
/// JSON object is considered.
pub fn parse_build_output(stdout: &str) -> Result<BuildArtifact, BuildError> {
    let line = stdout
        .lines()
        .rev()
        .map(str::trim)
        .find(|line| line.starts_with('{'))
        .ok_or_else(|| BuildError::MalformedOutput("no JSON object in output".to_string()))?;

    let dumped: DumpedPackage =
        serde_json::from_str(line).map_err(|e| BuildError::MalformedOutput(e.to_string()))?;

    let modules = dumped
        .modules
        .iter()
        .map(|module| {
            BASE64
                .decode(module)
                .map_err(|e| BuildError::MalformedOutput(format!("module bytecode: {e}")))
        })
        .collect::<Result<Vec<_>, _>>()?;
    let dependencies = dumped
        .dependencies
        .iter()
        .map(|dependency| {
            PackageId::from_hex_literal(dependency)
                .map_err(|e| BuildError::MalformedOutput(format!("dependency {dependency}: {e}")))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(BuildArtifact::new(modules, dependencies))
}

#[async_trait]
impl PackageBuilder for MoveToolchain {
    async fn build(&self, package_path: &Path) -> Result<BuildArtifact, BuildError> {
        if !package_path.is_dir() {
            return Err(BuildError::MissingPackage(package_path.to_path_buf()));
        }

        debug!(binary = %self.binary, path = %package_path.display(), "Building Move package");

        let output = Command::new(&self.binary)
            .args(["move", "build", "--dump-bytecode-as-base64", "--path"])
            .arg(package_path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| BuildError::Spawn(format!("{}: {e}", self.binary)))?;

        if !output.status.success() {
            return Err(BuildError::ToolchainFailed {
                status: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let artifact = parse_build_output(&String::from_utf8_lossy(&output.stdout))?;
        debug!(
            modules = artifact.modules().len(),
            bytes = artifact.bytecode_len(),
            "Move package built"
        );
        Ok(artifact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_output_after_diagnostics() {
        let stdout = format!(
            "INCLUDING DEPENDENCY Sui\nBUILDING sword\n{{\"modules\":[\"{}\",\"{}\"],\"dependencies\":[\"0x1\",\"0x2\"],\"digest\":[1,2]}}\n",
            BASE64.encode(b"sword"),
            BASE64.encode(b"hero"),
        );

        let artifact = parse_build_output(&stdout).unwrap();

        assert_eq!(artifact.modules(), &[b"sword".to_vec(), b"hero".to_vec()]);
        assert_eq!(
            artifact.dependencies(),
            &[PackageId::MOVE_STDLIB, PackageId::SUI_FRAMEWORK]
        );
    }

    #[test]
    fn test_parse_output_without_json() {
        assert!(matches!(
            parse_build_output("error[E01002]: unexpected token\n"),
            Err(BuildError::MalformedOutput(_))
        ));
    }

    #[test]
    fn test_parse_output_bad_module_encoding() {
        assert!(matches!(
            parse_build_output(r#"{"modules":["***"],"dependencies":[]}"#),
            Err(BuildError::MalformedOutput(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_package_directory() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent");

        let result = MoveToolchain::new().build(&missing).await;

        assert!(matches!(result, Err(BuildError::MissingPackage(path)) if path == missing));
    }

    #[tokio::test]
    async fn test_missing_binary_is_spawn_error() {
        let dir = tempfile::tempdir().unwrap();
        let toolchain = MoveToolchain::new().with_binary("kiosk-provisioner-no-such-binary");

        let result = toolchain.build(dir.path()).await;

        assert!(matches!(result, Err(BuildError::Spawn(_))));
    }
}
