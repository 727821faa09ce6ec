//! Compiled package artifacts.

use crate::PackageId;

/// Bytecode and dependency list produced by the package build toolchain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildArtifact {
    modules: Vec<Vec<u8>>,
    dependencies: Vec<PackageId>,
}

impl BuildArtifact {
    /// Create a new artifact. Order of both lists is preserved.
    pub fn new(modules: Vec<Vec<u8>>, dependencies: Vec<PackageId>) -> Self {
        Self {
            modules,
            dependencies,
        }
    }

    /// Compiled modules, in build order.
    pub fn modules(&self) -> &[Vec<u8>] {
        &self.modules
    }

    /// Dependency package ids, in build order.
    pub fn dependencies(&self) -> &[PackageId] {
        &self.dependencies
    }

    /// Total bytecode size.
    pub fn bytecode_len(&self) -> usize {
        self.modules.iter().map(Vec::len).sum()
    }

    /// Consume into `(modules, dependencies)`.
    pub fn into_parts(self) -> (Vec<Vec<u8>>, Vec<PackageId>) {
        (self.modules, self.dependencies)
    }
}
