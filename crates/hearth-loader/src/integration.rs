// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration handle: one manifest bound to its module location, owning the
//! memoized root component and platform modules.
//!
//! Platform import outcomes follow an asymmetric policy. Successes are always
//! kept. Failures are kept only once the root component has loaded; before
//! that, every call retries the import. Concurrent async requests for the
//! same module share one in-flight import.

use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

use futures::future::{BoxFuture, FutureExt, Shared};
use hearth_core::{HearthError, ImportError, IntegrationOrigin, ModuleImporter, ModuleRef};
use tracing::{debug, warn, Instrument, Span};

use crate::executor::ImportExecutor;
use crate::manifest::{parse_version, Manifest};
use crate::registry::{BUILTIN_PACKAGE, CUSTOM_PACKAGE};

type ImportResult = Result<ModuleRef, ImportError>;
type SharedImport = Shared<BoxFuture<'static, ImportResult>>;

#[derive(Default)]
struct ImportState {
    /// Settled platform outcomes, keyed by module path.
    platforms: HashMap<String, ImportResult>,
    /// Imports currently running, keyed by module path.
    in_flight: HashMap<String, SharedImport>,
}

/// A resolved integration.
pub struct Integration {
    manifest: Arc<Manifest>,
    origin: IntegrationOrigin,
    pkg_path: String,
    location: Option<PathBuf>,
    version: Option<semver::Version>,
    importer: Arc<dyn ModuleImporter>,
    executor: ImportExecutor,
    component: OnceLock<ModuleRef>,
    imports: Mutex<ImportState>,
}

impl std::fmt::Debug for Integration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Integration")
            .field("domain", &self.manifest.domain)
            .field("origin", &self.origin)
            .field("pkg_path", &self.pkg_path)
            .field("component_loaded", &self.is_component_loaded())
            .finish_non_exhaustive()
    }
}

impl Integration {
    pub fn new(
        manifest: Arc<Manifest>,
        origin: IntegrationOrigin,
        location: Option<PathBuf>,
        importer: Arc<dyn ModuleImporter>,
        executor: ImportExecutor,
    ) -> Self {
        let package = match origin {
            IntegrationOrigin::BuiltIn => BUILTIN_PACKAGE,
            IntegrationOrigin::Custom => CUSTOM_PACKAGE,
        };
        let pkg_path = format!("{package}.{}", manifest.domain);
        let version = manifest.version.as_deref().and_then(parse_version);
        Self {
            manifest,
            origin,
            pkg_path,
            location,
            version,
            importer,
            executor,
            component: OnceLock::new(),
            imports: Mutex::new(ImportState::default()),
        }
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    pub fn domain(&self) -> &str {
        &self.manifest.domain
    }

    pub fn name(&self) -> &str {
        &self.manifest.name
    }

    pub fn dependencies(&self) -> &[String] {
        &self.manifest.dependencies
    }

    pub fn after_dependencies(&self) -> &[String] {
        &self.manifest.after_dependencies
    }

    pub fn requirements(&self) -> &[String] {
        &self.manifest.requirements
    }

    pub fn loggers(&self) -> &[String] {
        &self.manifest.loggers
    }

    /// Parsed manifest version, if present and valid.
    pub fn version(&self) -> Option<&semver::Version> {
        self.version.as_ref()
    }

    pub fn origin(&self) -> IntegrationOrigin {
        self.origin
    }

    pub fn is_built_in(&self) -> bool {
        self.origin == IntegrationOrigin::BuiltIn
    }

    pub fn issue_tracker(&self) -> Option<&str> {
        self.manifest.issue_tracker.as_deref()
    }

    pub fn documentation(&self) -> Option<&str> {
        self.manifest.documentation.as_deref()
    }

    pub fn config_flow(&self) -> bool {
        self.manifest.config_flow
    }

    pub fn import_executor(&self) -> bool {
        self.manifest.import_executor
    }

    /// Module path of the root component.
    pub fn pkg_path(&self) -> &str {
        &self.pkg_path
    }

    /// Directory the manifest was read from, for scanned integrations.
    pub fn location(&self) -> Option<&Path> {
        self.location.as_deref()
    }

    pub fn is_component_loaded(&self) -> bool {
        self.component.get().is_some()
    }

    /// Module path of a platform of this integration.
    pub fn platform_path(&self, platform: &str) -> String {
        format!("{}.{platform}", self.pkg_path)
    }

    /// Import the root component, blocking the calling thread.
    ///
    /// Failures are not cached.
    pub fn get_component(&self) -> Result<ModuleRef, HearthError> {
        if let Some(component) = self.component.get() {
            return Ok(Arc::clone(component));
        }
        let module = self.importer.import_module(&self.pkg_path)?;
        Ok(Arc::clone(self.component.get_or_init(|| module)))
    }

    /// Import the root component without blocking the scheduler.
    pub async fn async_get_component(self: &Arc<Self>) -> Result<ModuleRef, HearthError> {
        if let Some(component) = self.component.get() {
            return Ok(Arc::clone(component));
        }
        let pending = {
            let mut state = self.lock_imports();
            self.join_or_start(&mut state, self.pkg_path.clone())
        };
        pending.await.map_err(HearthError::from)
    }

    /// Import a platform, blocking the calling thread.
    ///
    /// Does not join an async import of the same platform that is still
    /// running; both settle through the same cache, so whichever outcome is
    /// recorded first is what later calls observe.
    pub fn get_platform(&self, platform: &str) -> Result<ModuleRef, HearthError> {
        let path = self.platform_path(platform);
        if let Some(cached) = self.lock_imports().platforms.get(&path) {
            return cached.clone().map_err(HearthError::from);
        }

        let result = self.importer.import_module(&path);
        let mut state = self.lock_imports();
        self.settle_platform(&mut state, &path, result)
            .map_err(HearthError::from)
    }

    /// Import a platform without blocking the scheduler.
    pub async fn async_get_platform(self: &Arc<Self>, platform: &str) -> Result<ModuleRef, HearthError> {
        let path = self.platform_path(platform);
        let pending = {
            let mut state = self.lock_imports();
            if let Some(cached) = state.platforms.get(&path) {
                return cached.clone().map_err(HearthError::from);
            }
            self.join_or_start(&mut state, path)
        };
        pending.await.map_err(HearthError::from)
    }

    /// Import several platforms concurrently, in the order given.
    pub async fn async_get_platforms(
        self: &Arc<Self>,
        platforms: &[&str],
    ) -> Vec<Result<ModuleRef, HearthError>> {
        futures::future::join_all(platforms.iter().map(|p| self.async_get_platform(p))).await
    }

    fn lock_imports(&self) -> MutexGuard<'_, ImportState> {
        self.imports.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn join_or_start(self: &Arc<Self>, state: &mut ImportState, path: String) -> SharedImport {
        if let Some(pending) = state.in_flight.get(&path) {
            return pending.clone();
        }

        let this = Arc::clone(self);
        let task_path = path.clone();
        let task = tokio::spawn(
            async move {
                let result = AssertUnwindSafe(this.import_isolated(&task_path))
                    .catch_unwind()
                    .await
                    .unwrap_or_else(|_| Err(ImportError::new(task_path.as_str(), "import panicked")));
                this.finish_import(&task_path, result)
            }
            .instrument(Span::current()),
        );
        let error_path = path.clone();
        let pending = async move {
            task.await
                .unwrap_or_else(|e| Err(ImportError::new(error_path, format!("import task failed: {e}"))))
        }
        .boxed()
        .shared();

        state.in_flight.insert(path, pending.clone());
        pending
    }

    /// Run the import on a blocking thread. Manifests that flag their imports
    /// as expensive go through the bounded import pool instead.
    async fn import_isolated(&self, path: &str) -> ImportResult {
        let importer = Arc::clone(&self.importer);
        let job_path = path.to_string();
        let job = move || importer.import_module(&job_path);

        if self.manifest.import_executor {
            debug!(domain = %self.manifest.domain, module = %path, "importing on the import pool");
            return self
                .executor
                .run(job)
                .await
                .unwrap_or_else(|e| Err(ImportError::new(path, e)));
        }
        tokio::task::spawn_blocking(job)
            .await
            .unwrap_or_else(|e| Err(ImportError::new(path, format!("import task failed: {e}"))))
    }

    fn finish_import(&self, path: &str, result: ImportResult) -> ImportResult {
        let mut state = self.lock_imports();
        state.in_flight.remove(path);

        if path == self.pkg_path {
            return match result {
                Ok(module) => Ok(Arc::clone(self.component.get_or_init(|| module))),
                Err(e) => {
                    warn!(domain = %self.manifest.domain, error = %e, "failed to import component");
                    Err(e)
                }
            };
        }
        self.settle_platform(&mut state, path, result)
    }

    /// Record a platform outcome under the caching policy and return the
    /// canonical result for `path`.
    fn settle_platform(&self, state: &mut ImportState, path: &str, result: ImportResult) -> ImportResult {
        if let Some(existing) = state.platforms.get(path) {
            return existing.clone();
        }
        let keep = result.is_ok() || self.is_component_loaded();
        if let Err(e) = &result {
            debug!(
                domain = %self.manifest.domain,
                module = %path,
                error = %e,
                cached = keep,
                "platform import failed"
            );
        }
        if keep {
            state.platforms.insert(path.to_string(), result.clone());
        }
        result
    }
}
