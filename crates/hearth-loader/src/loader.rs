// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Load Cache & Deduplicator.
//!
//! [`Loader`] is the per-process owner of every resolved [`Integration`].
//! Lookups for a domain are single-flight: the first caller spawns the
//! resolution task, later callers attach to the same shared result. The task
//! runs to completion even if every caller goes away.
//!
//! Successful lookups are kept for the process lifetime. Failed lookups are
//! only shared with the callers of the same burst; the next call starts over,
//! which is cheap because the custom snapshot itself stays cached.

use std::collections::{BTreeSet, HashMap};
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::future::{BoxFuture, FutureExt, Shared};
use hearth_config::model::LoaderConfig;
use hearth_core::{
    validate_domain, HearthError, IntegrationOrigin, ModuleImporter, ModuleRef, NotFoundReason,
};
use tracing::{debug, error, info, warn, Instrument, Span};

use crate::discovery::DiscoveryIndex;
use crate::executor::ImportExecutor;
use crate::integration::Integration;
use crate::manifest::check_custom_version;
use crate::registry::BuiltinRegistry;
use crate::resolver::DependencyResolver;
use crate::source::ManifestSource;
use crate::store::{CustomSnapshot, ManifestStore};

type LookupResult = Result<Arc<Integration>, HearthError>;
type PendingLookup = Shared<BoxFuture<'static, LookupResult>>;

#[derive(Default)]
struct LoaderState {
    integrations: HashMap<String, Arc<Integration>>,
    pending: HashMap<String, PendingLookup>,
}

struct LoaderInner {
    store: ManifestStore,
    builtin_importer: Arc<dyn ModuleImporter>,
    custom_importer: Arc<dyn ModuleImporter>,
    executor: ImportExecutor,
    state: Mutex<LoaderState>,
}

/// Resolves, caches and loads integrations. Cheap to clone.
#[derive(Clone)]
pub struct Loader {
    inner: Arc<LoaderInner>,
}

impl Loader {
    /// Create a loader over the built-in registry and an optional custom source.
    ///
    /// Built-in modules are imported through the registry itself; custom
    /// modules through `custom_importer`.
    pub fn new(
        config: &LoaderConfig,
        registry: Arc<BuiltinRegistry>,
        source: Option<Arc<dyn ManifestSource>>,
        custom_importer: Arc<dyn ModuleImporter>,
    ) -> Self {
        let builtin_importer: Arc<dyn ModuleImporter> = registry.clone();
        Self::with_importers(config, registry, source, builtin_importer, custom_importer)
    }

    /// Like [`Loader::new`] with an explicit importer for built-in modules.
    pub fn with_importers(
        config: &LoaderConfig,
        registry: Arc<BuiltinRegistry>,
        source: Option<Arc<dyn ManifestSource>>,
        builtin_importer: Arc<dyn ModuleImporter>,
        custom_importer: Arc<dyn ModuleImporter>,
    ) -> Self {
        info!(
            builtin = registry.len(),
            recovery_mode = config.recovery_mode,
            import_workers = config.import_workers,
            "integration loader initialized"
        );
        Self {
            inner: Arc::new(LoaderInner {
                store: ManifestStore::new(registry, source, config.recovery_mode),
                builtin_importer,
                custom_importer,
                executor: ImportExecutor::new(config.import_workers),
                state: Mutex::new(LoaderState::default()),
            }),
        }
    }

    pub fn store(&self) -> &ManifestStore {
        &self.inner.store
    }

    /// Resolve `domain` to its integration handle, deduplicating concurrent
    /// requests for the same domain.
    pub async fn get_integration(&self, domain: &str) -> LookupResult {
        validate_domain(domain)?;

        let pending = {
            let mut state = self.inner.lock_state();
            if let Some(integration) = state.integrations.get(domain) {
                return Ok(Arc::clone(integration));
            }
            match state.pending.get(domain) {
                Some(pending) => pending.clone(),
                None => {
                    let pending = self.inner.start_lookup(domain);
                    state.pending.insert(domain.to_string(), pending.clone());
                    pending
                }
            }
        };
        pending.await
    }

    /// Resolve several domains concurrently. Duplicates collapse to one entry.
    pub async fn get_integrations(&self, domains: &[&str]) -> HashMap<String, LookupResult> {
        let unique: BTreeSet<&str> = domains.iter().copied().collect();
        let results = futures::future::join_all(unique.iter().map(|d| self.get_integration(d))).await;
        unique
            .into_iter()
            .map(str::to_string)
            .zip(results)
            .collect()
    }

    /// An integration previously resolved in this process. Never triggers a load.
    pub fn get_loaded_integration(&self, domain: &str) -> LookupResult {
        self.inner
            .lock_state()
            .integrations
            .get(domain)
            .cloned()
            .ok_or_else(|| HearthError::IntegrationNotLoaded {
                domain: domain.to_string(),
            })
    }

    /// Domains resolved so far, sorted.
    pub fn loaded_domains(&self) -> Vec<String> {
        let mut domains: Vec<String> = self.inner.lock_state().integrations.keys().cloned().collect();
        domains.sort();
        domains
    }

    /// Transitive hard-dependency closure of `domain`, including itself.
    pub async fn resolve_dependencies(&self, domain: &str) -> Result<BTreeSet<String>, HearthError> {
        validate_domain(domain)?;
        let snapshot = self.inner.store.custom_components().await?;
        let view = self.inner.store.view(&snapshot);
        let resolver = DependencyResolver::new(|d: &str| view.get(d).cloned());

        resolver.resolve(domain).inspect_err(|e| match e {
            HearthError::CircularDependency { cycle } => {
                error!(domain = %domain, cycle = %cycle.join(" -> "), "unable to resolve dependencies");
            }
            HearthError::MissingDependency { missing, chain, .. } => {
                error!(
                    domain = %domain,
                    missing = %missing,
                    chain = %chain.join(" -> "),
                    "unable to resolve dependencies"
                );
            }
            _ => {}
        })
    }

    /// Resolve the integration, validate its dependency closure, then import
    /// its root component.
    pub async fn load_component(&self, domain: &str) -> Result<ModuleRef, HearthError> {
        let integration = self.get_integration(domain).await?;
        let closure = self.resolve_dependencies(domain).await?;
        debug!(domain = %domain, dependencies = closure.len() - 1, "dependencies resolved");
        integration.async_get_component().await
    }

    /// Custom integrations in the current snapshot (empty in recovery mode).
    pub async fn custom_components(&self) -> Result<Arc<CustomSnapshot>, HearthError> {
        self.inner.store.custom_components().await
    }

    /// Discovery indexes across every known manifest.
    pub async fn discovery(&self) -> Result<Arc<DiscoveryIndex>, HearthError> {
        self.inner.store.discovery().await
    }

    /// Rescan custom integrations on next use. Already resolved handles stay.
    pub fn refresh(&self) {
        self.inner.store.refresh();
    }
}

impl LoaderInner {
    fn lock_state(&self) -> MutexGuard<'_, LoaderState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn start_lookup(self: &Arc<Self>, domain: &str) -> PendingLookup {
        let inner = Arc::clone(self);
        let task_domain = domain.to_string();
        let task = tokio::spawn(
            async move {
                let result = AssertUnwindSafe(inner.resolve(&task_domain))
                    .catch_unwind()
                    .await
                    .unwrap_or_else(|_| {
                        Err(HearthError::Internal(format!("lookup of `{task_domain}` panicked")))
                    });
                inner.finish_lookup(&task_domain, result)
            }
            .instrument(Span::current()),
        );
        let error_domain = domain.to_string();
        async move {
            task.await.unwrap_or_else(|e| {
                Err(HearthError::Internal(format!(
                    "lookup of `{error_domain}` failed: {e}"
                )))
            })
        }
        .boxed()
        .shared()
    }

    fn finish_lookup(&self, domain: &str, result: LookupResult) -> LookupResult {
        let mut state = self.lock_state();
        state.pending.remove(domain);
        match result {
            Ok(integration) => Ok(Arc::clone(
                state
                    .integrations
                    .entry(domain.to_string())
                    .or_insert(integration),
            )),
            Err(e) => Err(e),
        }
    }

    async fn resolve(&self, domain: &str) -> LookupResult {
        if let Some(manifest) = self.store.builtin().get(domain) {
            return Ok(Arc::new(Integration::new(
                Arc::clone(manifest),
                IntegrationOrigin::BuiltIn,
                None,
                Arc::clone(&self.builtin_importer),
                self.executor.clone(),
            )));
        }

        let snapshot = self.store.custom_components().await?;
        let Some(entry) = snapshot.get(domain) else {
            debug!(domain = %domain, "integration not found");
            return Err(HearthError::not_found(domain));
        };

        if let Err(reason) = check_custom_version(&entry.manifest) {
            match &reason {
                NotFoundReason::MissingVersion => error!(
                    domain = %domain,
                    "The custom integration '{domain}' does not have a version key in the manifest file and was blocked from loading."
                ),
                NotFoundReason::InvalidVersion(version) => error!(
                    domain = %domain,
                    "The custom integration '{domain}' does not have a valid version key ({version}) in the manifest file and was blocked from loading."
                ),
                NotFoundReason::Absent => {}
            }
            return Err(HearthError::IntegrationNotFound {
                domain: domain.to_string(),
                reason,
            });
        }

        warn!(
            domain = %domain,
            "We found a custom integration {domain} which has not been tested by the hearth maintainers. \
             This integration might cause stability problems, be sure to disable it if you experience issues"
        );
        Ok(Arc::new(Integration::new(
            Arc::clone(&entry.manifest),
            IntegrationOrigin::Custom,
            entry.location.clone(),
            Arc::clone(&self.custom_importer),
            self.executor.clone(),
        )))
    }
}
