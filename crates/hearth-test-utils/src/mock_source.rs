// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory custom manifest source.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use hearth_core::HearthError;
use hearth_loader::{DiscoveredManifest, Manifest, ManifestSource};

/// A [`ManifestSource`] backed by a vector, counting how often it is scanned.
#[derive(Default)]
pub struct StaticSource {
    manifests: Mutex<Vec<Manifest>>,
    scans: AtomicUsize,
    delay: Option<Duration>,
}

impl StaticSource {
    pub fn new(manifests: Vec<Manifest>) -> Self {
        Self {
            manifests: Mutex::new(manifests),
            ..Self::default()
        }
    }

    /// Suspend each scan for `delay` before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Replace the manifests returned by subsequent scans.
    pub fn set_manifests(&self, manifests: Vec<Manifest>) {
        *self.manifests.lock().unwrap_or_else(PoisonError::into_inner) = manifests;
    }

    pub fn scan_count(&self) -> usize {
        self.scans.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ManifestSource for StaticSource {
    async fn scan(&self) -> Result<Vec<DiscoveredManifest>, HearthError> {
        self.scans.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let manifests = self
            .manifests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        Ok(manifests.into_iter().map(DiscoveredManifest::new).collect())
    }
}
