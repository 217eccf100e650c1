// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end loader testing.
//!
//! `TestHarness` assembles a [`Loader`] over a mock built-in registry, a
//! [`StaticSource`] of custom manifests, and two [`MockImporter`]s, keeping
//! handles to every mock for assertions.

use std::sync::Arc;
use std::time::Duration;

use hearth_config::model::LoaderConfig;
use hearth_loader::{BuiltinRegistry, Loader, Manifest, ManifestSource};

use crate::mock_importer::MockImporter;
use crate::mock_source::StaticSource;

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    builtin: Vec<Manifest>,
    custom: Vec<Manifest>,
    recovery_mode: bool,
    import_workers: usize,
    scan_delay: Option<Duration>,
    import_delay: Option<Duration>,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            builtin: Vec::new(),
            custom: Vec::new(),
            recovery_mode: false,
            import_workers: LoaderConfig::default().import_workers,
            scan_delay: None,
            import_delay: None,
        }
    }

    /// Add a built-in manifest.
    pub fn builtin(mut self, manifest: impl Into<Manifest>) -> Self {
        self.builtin.push(manifest.into());
        self
    }

    /// Add a custom manifest, returned by the static source.
    pub fn custom(mut self, manifest: impl Into<Manifest>) -> Self {
        self.custom.push(manifest.into());
        self
    }

    pub fn recovery_mode(mut self, enabled: bool) -> Self {
        self.recovery_mode = enabled;
        self
    }

    pub fn import_workers(mut self, workers: usize) -> Self {
        self.import_workers = workers;
        self
    }

    /// Delay every custom scan.
    pub fn scan_delay(mut self, delay: Duration) -> Self {
        self.scan_delay = Some(delay);
        self
    }

    /// Delay every module import on both importers.
    pub fn import_delay(mut self, delay: Duration) -> Self {
        self.import_delay = Some(delay);
        self
    }

    /// Build the harness.
    pub fn build(self) -> TestHarness {
        let mut registry = BuiltinRegistry::new();
        for manifest in self.builtin {
            registry.register(manifest);
        }

        let mut source = StaticSource::new(self.custom);
        if let Some(delay) = self.scan_delay {
            source = source.with_delay(delay);
        }
        let source = Arc::new(source);

        let importer = || match self.import_delay {
            Some(delay) => MockImporter::new().with_delay(delay),
            None => MockImporter::new(),
        };
        let builtin_importer = Arc::new(importer());
        let custom_importer = Arc::new(importer());

        let config = LoaderConfig {
            recovery_mode: self.recovery_mode,
            import_workers: self.import_workers,
            ..LoaderConfig::default()
        };
        let loader = Loader::with_importers(
            &config,
            Arc::new(registry),
            Some(Arc::clone(&source) as Arc<dyn ManifestSource>),
            builtin_importer.clone(),
            custom_importer.clone(),
        );

        TestHarness {
            loader,
            source,
            builtin_importer,
            custom_importer,
        }
    }
}

/// A fully wired loader plus handles to its mocks.
pub struct TestHarness {
    pub loader: Loader,
    pub source: Arc<StaticSource>,
    pub builtin_importer: Arc<MockImporter>,
    pub custom_importer: Arc<MockImporter>,
}

impl TestHarness {
    /// Create a builder for configuring the test harness.
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }
}
