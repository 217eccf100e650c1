// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Builder for test manifests.

use hearth_loader::Manifest;

/// Fluent builder around [`Manifest`].
#[derive(Debug, Clone)]
pub struct MockManifest {
    manifest: Manifest,
}

impl MockManifest {
    pub fn new(domain: &str) -> Self {
        Self {
            manifest: Manifest::new(domain),
        }
    }

    /// Custom integration with a valid version.
    pub fn custom(domain: &str) -> Self {
        Self::new(domain).version("1.0.0")
    }

    pub fn name(mut self, name: &str) -> Self {
        self.manifest.name = name.to_string();
        self
    }

    pub fn version(mut self, version: &str) -> Self {
        self.manifest.version = Some(version.to_string());
        self
    }

    pub fn without_version(mut self) -> Self {
        self.manifest.version = None;
        self
    }

    pub fn dependencies(mut self, deps: &[&str]) -> Self {
        self.manifest.dependencies = deps.iter().map(|d| d.to_string()).collect();
        self
    }

    pub fn after_dependencies(mut self, deps: &[&str]) -> Self {
        self.manifest.after_dependencies = deps.iter().map(|d| d.to_string()).collect();
        self
    }

    pub fn config_flow(mut self, enabled: bool) -> Self {
        self.manifest.config_flow = enabled;
        self
    }

    pub fn import_executor(mut self, enabled: bool) -> Self {
        self.manifest.import_executor = enabled;
        self
    }

    pub fn issue_tracker(mut self, url: &str) -> Self {
        self.manifest.issue_tracker = Some(url.to_string());
        self
    }

    pub fn build(self) -> Manifest {
        self.manifest
    }
}

impl From<MockManifest> for Manifest {
    fn from(mock: MockManifest) -> Self {
        mock.build()
    }
}
