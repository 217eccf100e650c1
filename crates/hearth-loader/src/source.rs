// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Custom integration sources.
//!
//! A [`ManifestSource`] produces the set of externally supplied manifests.
//! The store calls it once per snapshot; the source itself does no caching.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use hearth_core::HearthError;
use tracing::{debug, error};

use crate::manifest::{parse_manifest, Manifest};

/// File name of a manifest inside an integration directory.
pub const MANIFEST_FILE: &str = "manifest.json";

/// A manifest found by a scan, with the place it was found.
#[derive(Debug, Clone)]
pub struct DiscoveredManifest {
    pub manifest: Manifest,
    pub location: Option<PathBuf>,
}

impl DiscoveredManifest {
    pub fn new(manifest: Manifest) -> Self {
        Self {
            manifest,
            location: None,
        }
    }
}

/// Scanner for externally supplied integrations.
#[async_trait]
pub trait ManifestSource: Send + Sync + 'static {
    /// Enumerate every custom manifest currently available.
    async fn scan(&self) -> Result<Vec<DiscoveredManifest>, HearthError>;
}

/// Reads `<root>/<domain>/manifest.json` for every sub-directory of `root`.
#[derive(Debug, Clone)]
pub struct DirectoryManifestSource {
    root: PathBuf,
}

impl DirectoryManifestSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl ManifestSource for DirectoryManifestSource {
    async fn scan(&self) -> Result<Vec<DiscoveredManifest>, HearthError> {
        let root = self.root.clone();
        tokio::task::spawn_blocking(move || scan_directory(&root))
            .await
            .map_err(|e| HearthError::Scan(format!("scan task failed: {e}")))?
    }
}

fn scan_directory(root: &Path) -> Result<Vec<DiscoveredManifest>, HearthError> {
    if !root.is_dir() {
        debug!(path = %root.display(), "custom integrations directory does not exist");
        return Ok(Vec::new());
    }

    let entries = std::fs::read_dir(root)
        .map_err(|e| HearthError::Scan(format!("{}: {e}", root.display())))?;

    let mut found = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| HearthError::Scan(format!("{}: {e}", root.display())))?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let Some(domain) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let manifest_path = path.join(MANIFEST_FILE);
        let Ok(contents) = std::fs::read_to_string(&manifest_path) else {
            debug!(path = %path.display(), "skipping directory without a manifest");
            continue;
        };

        match parse_manifest(domain, &contents) {
            Ok(manifest) => found.push(DiscoveredManifest {
                manifest,
                location: Some(path.clone()),
            }),
            Err(e) => {
                error!(domain = %domain, error = %e, "skipping custom integration with an invalid manifest");
            }
        }
    }

    found.sort_by(|a, b| a.manifest.domain.cmp(&b.manifest.domain));
    debug!(path = %root.display(), count = found.len(), "scanned custom integrations");
    Ok(found)
}
