// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Manifest Store: built-in registry plus a scanned snapshot of custom manifests.
//!
//! The custom snapshot is taken lazily, once, and shared by every caller until
//! [`ManifestStore::refresh`] swaps in an empty cell. Concurrent first-time
//! callers all wait on the same scan.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

use arc_swap::ArcSwap;
use hearth_core::HearthError;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use crate::discovery::DiscoveryIndex;
use crate::manifest::{check_custom_version, Manifest};
use crate::registry::BuiltinRegistry;
use crate::source::ManifestSource;

/// One custom manifest and where it was found.
#[derive(Debug, Clone)]
pub struct CustomEntry {
    pub manifest: Arc<Manifest>,
    pub location: Option<PathBuf>,
}

/// Immutable result of one custom-integration scan.
#[derive(Debug, Default)]
pub struct CustomSnapshot {
    entries: BTreeMap<String, CustomEntry>,
    discovery: OnceLock<Arc<DiscoveryIndex>>,
}

impl CustomSnapshot {
    pub fn get(&self, domain: &str) -> Option<&CustomEntry> {
        self.entries.get(domain)
    }

    /// Custom domains, sorted.
    pub fn domains(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Custom manifests whose version passes the custom-integration policy.
    fn loadable(&self) -> impl Iterator<Item = &Manifest> {
        self.entries
            .values()
            .map(|e| e.manifest.as_ref())
            .filter(|m| check_custom_version(m).is_ok())
    }
}

/// Read-only manifest lookup over the built-in set and one custom snapshot.
///
/// Built-in manifests win. Custom manifests failing the version policy are
/// invisible.
#[derive(Clone, Copy)]
pub struct ManifestView<'a> {
    builtin: &'a BuiltinRegistry,
    custom: &'a CustomSnapshot,
}

impl<'a> ManifestView<'a> {
    pub fn get(&self, domain: &str) -> Option<&'a Arc<Manifest>> {
        if let Some(manifest) = self.builtin.get(domain) {
            return Some(manifest);
        }
        self.custom
            .get(domain)
            .map(|e| &e.manifest)
            .filter(|m| check_custom_version(m).is_ok())
    }
}

/// Owner of all manifests known to the process.
pub struct ManifestStore {
    builtin: Arc<BuiltinRegistry>,
    source: Option<Arc<dyn ManifestSource>>,
    recovery_mode: bool,
    custom: ArcSwap<OnceCell<Arc<CustomSnapshot>>>,
}

impl ManifestStore {
    pub fn new(
        builtin: Arc<BuiltinRegistry>,
        source: Option<Arc<dyn ManifestSource>>,
        recovery_mode: bool,
    ) -> Self {
        Self {
            builtin,
            source,
            recovery_mode,
            custom: ArcSwap::from_pointee(OnceCell::new()),
        }
    }

    pub fn builtin(&self) -> &BuiltinRegistry {
        &self.builtin
    }

    /// The current custom snapshot, scanning on first use.
    ///
    /// A failed scan is not cached; the next caller retries it.
    pub async fn custom_components(&self) -> Result<Arc<CustomSnapshot>, HearthError> {
        let cell = self.custom.load_full();
        cell.get_or_try_init(|| self.scan()).await.cloned()
    }

    /// Manifest for `domain`: built-in first, then the custom snapshot.
    ///
    /// No version policy is applied here; see [`ManifestView`] for that.
    pub async fn get(&self, domain: &str) -> Result<Arc<Manifest>, HearthError> {
        if let Some(manifest) = self.builtin.get(domain) {
            return Ok(Arc::clone(manifest));
        }
        let snapshot = self.custom_components().await?;
        snapshot
            .get(domain)
            .map(|e| Arc::clone(&e.manifest))
            .ok_or_else(|| HearthError::not_found(domain))
    }

    /// Drop the custom snapshot. The next access rescans and rebuilds the
    /// discovery index.
    pub fn refresh(&self) {
        debug!("dropping custom integration snapshot");
        self.custom.store(Arc::new(OnceCell::new()));
    }

    /// Lookup view bound to a snapshot.
    pub fn view<'a>(&'a self, snapshot: &'a CustomSnapshot) -> ManifestView<'a> {
        ManifestView {
            builtin: &self.builtin,
            custom: snapshot,
        }
    }

    /// Discovery indexes over built-in and loadable custom manifests, cached
    /// for the lifetime of the current snapshot.
    pub async fn discovery(&self) -> Result<Arc<DiscoveryIndex>, HearthError> {
        let snapshot = self.custom_components().await?;
        let index = snapshot.discovery.get_or_init(|| {
            let builtin = self.builtin.list_all().into_iter().map(|m| m.as_ref());
            let index = DiscoveryIndex::build(builtin.chain(snapshot.loadable()));
            debug!(
                zeroconf = index.zeroconf.len(),
                config_flows = index.config_flows.len(),
                "built discovery indexes"
            );
            Arc::new(index)
        });
        Ok(Arc::clone(index))
    }

    async fn scan(&self) -> Result<Arc<CustomSnapshot>, HearthError> {
        if self.recovery_mode {
            info!("recovery mode active, not loading custom integrations");
            return Ok(Arc::default());
        }
        let Some(source) = &self.source else {
            return Ok(Arc::default());
        };

        let mut entries = BTreeMap::new();
        for found in source.scan().await? {
            let domain = found.manifest.domain.clone();
            if self.builtin.get(&domain).is_some() {
                warn!(domain = %domain, "custom integration shadows a built-in one and is ignored");
                continue;
            }
            entries.insert(
                domain,
                CustomEntry {
                    manifest: Arc::new(found.manifest),
                    location: found.location,
                },
            );
        }

        info!(count = entries.len(), "loaded custom integration snapshot");
        Ok(Arc::new(CustomSnapshot {
            entries,
            discovery: OnceLock::new(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::source::DiscoveredManifest;

    struct CountingSource {
        scans: AtomicUsize,
        manifests: Vec<Manifest>,
    }

    #[async_trait]
    impl ManifestSource for CountingSource {
        async fn scan(&self) -> Result<Vec<DiscoveredManifest>, HearthError> {
            self.scans.fetch_add(1, Ordering::SeqCst);
            tokio::task::yield_now().await;
            Ok(self.manifests.iter().cloned().map(DiscoveredManifest::new).collect())
        }
    }

    fn versioned(domain: &str) -> Manifest {
        let mut m = Manifest::new(domain);
        m.version = Some("1.0.0".into());
        m
    }

    fn store_with(manifests: Vec<Manifest>, recovery_mode: bool) -> (ManifestStore, Arc<CountingSource>) {
        let source = Arc::new(CountingSource {
            scans: AtomicUsize::new(0),
            manifests,
        });
        let mut registry = BuiltinRegistry::new();
        registry.register(Manifest::new("hue"));
        let store = ManifestStore::new(
            Arc::new(registry),
            Some(source.clone() as Arc<dyn ManifestSource>),
            recovery_mode,
        );
        (store, source)
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_first_scans_are_deduplicated() {
        let (store, source) = store_with(vec![versioned("test_1")], false);
        let store = Arc::new(store);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                tokio::spawn(async move { store.custom_components().await.unwrap() })
            })
            .collect();
        let mut snapshots = Vec::new();
        for handle in handles {
            snapshots.push(handle.await.unwrap());
        }

        assert_eq!(source.scans.load(Ordering::SeqCst), 1);
        assert!(snapshots.iter().all(|s| Arc::ptr_eq(s, &snapshots[0])));
    }

    #[tokio::test]
    async fn recovery_mode_skips_the_scan() {
        let (store, source) = store_with(vec![versioned("test_1")], true);
        assert!(store.custom_components().await.unwrap().is_empty());
        assert_eq!(source.scans.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn refresh_forces_a_rescan() {
        let (store, source) = store_with(vec![versioned("test_1")], false);
        let first = store.custom_components().await.unwrap();
        let first_index = store.discovery().await.unwrap();
        store.refresh();
        let second = store.custom_components().await.unwrap();
        let second_index = store.discovery().await.unwrap();

        assert_eq!(source.scans.load(Ordering::SeqCst), 2);
        assert!(!Arc::ptr_eq(&first, &second));
        assert!(!Arc::ptr_eq(&first_index, &second_index));
    }

    #[tokio::test]
    async fn discovery_is_cached_per_snapshot() {
        let (store, _source) = store_with(vec![versioned("test_1")], false);
        let a = store.discovery().await.unwrap();
        let b = store.discovery().await.unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[tokio::test]
    async fn builtin_wins_over_custom() {
        let mut shadow = versioned("hue");
        shadow.name = "Not Hue".into();
        let (store, _source) = store_with(vec![shadow, versioned("test_1")], false);

        let snapshot = store.custom_components().await.unwrap();
        assert_eq!(snapshot.domains().collect::<Vec<_>>(), vec!["test_1"]);
        assert_eq!(store.view(&snapshot).get("hue").unwrap().name, "hue");
    }

    #[tokio::test]
    async fn get_checks_builtin_then_custom() {
        let (store, source) = store_with(vec![versioned("test_1")], false);
        assert_eq!(store.get("hue").await.unwrap().domain, "hue");
        assert_eq!(source.scans.load(Ordering::SeqCst), 0);
        assert_eq!(store.get("test_1").await.unwrap().domain, "test_1");
        assert!(store.get("ghost").await.unwrap_err().is_not_found());
        assert_eq!(source.scans.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn view_hides_unversioned_custom_manifests() {
        let (store, _source) = store_with(vec![Manifest::new("test_no_version")], false);
        let snapshot = store.custom_components().await.unwrap();
        assert!(snapshot.get("test_no_version").is_some());
        assert!(store.view(&snapshot).get("test_no_version").is_none());
    }
}
