// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Hearth loader integration tests.
//!
//! Provides mock importers, manifest sources and a harness that wires a
//! [`hearth_loader::Loader`] for fast, deterministic tests without touching
//! the filesystem.
//!
//! # Components
//!
//! - [`MockImporter`] - Module importer with per-path call counts and scripted failures
//! - [`StaticSource`] - In-memory custom manifest source that counts scans
//! - [`MockManifest`] - Builder for test manifests
//! - [`TestHarness`] - Loader wired to the mocks above

pub mod harness;
pub mod mock_importer;
pub mod mock_manifest;
pub mod mock_source;

pub use harness::TestHarness;
pub use mock_importer::{MockImporter, MockModule};
pub use mock_manifest::MockManifest;
pub use mock_source::StaticSource;
