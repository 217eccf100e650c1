// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration loading for Hearth.
//!
//! Manifests come from the built-in [`BuiltinRegistry`] and from an optional
//! [`ManifestSource`] for custom integrations. The [`Loader`] resolves domains
//! to [`Integration`] handles exactly once per process, validates dependency
//! graphs with the [`DependencyResolver`], and serves the aggregated
//! [`DiscoveryIndex`].

pub mod catalog;
pub mod discovery;
pub mod executor;
pub mod integration;
pub mod issue_tracker;
pub mod loader;
pub mod manifest;
pub mod registry;
pub mod resolver;
pub mod source;
pub mod store;

pub use catalog::builtin_registry;
pub use discovery::{DiscoveryIndex, HomeKitDiscovered};
pub use executor::ImportExecutor;
pub use integration::Integration;
pub use issue_tracker::{issue_tracker, suggest_report_issue};
pub use loader::Loader;
pub use manifest::{parse_manifest, parse_version, Manifest};
pub use registry::{BuiltinRegistry, StaticModule};
pub use resolver::DependencyResolver;
pub use source::{DirectoryManifestSource, DiscoveredManifest, ManifestSource};
pub use store::{CustomSnapshot, ManifestStore};
