// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Registry of built-in integrations.
//!
//! The `BuiltinRegistry` holds the manifests shipped with the host, keyed by
//! domain, plus the in-process modules that back them. It doubles as the
//! [`ModuleImporter`] for built-in module paths.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use hearth_core::{ImportError, Module, ModuleImporter, ModuleRef};

use crate::manifest::Manifest;

/// Package prefix of built-in module paths.
pub const BUILTIN_PACKAGE: &str = "hearth.integrations";

/// Package prefix of custom module paths.
pub const CUSTOM_PACKAGE: &str = "custom_integrations";

/// A module compiled into the host, identified only by its path.
#[derive(Debug)]
pub struct StaticModule {
    path: String,
}

impl StaticModule {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

impl Module for StaticModule {
    fn path(&self) -> &str {
        &self.path
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Static registry of built-in manifests and their modules.
#[derive(Default)]
pub struct BuiltinRegistry {
    manifests: HashMap<String, Arc<Manifest>>,
    modules: HashMap<String, ModuleRef>,
}

impl BuiltinRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a manifest. A later registration for the same domain replaces it.
    pub fn register(&mut self, manifest: Manifest) {
        self.manifests
            .insert(manifest.domain.clone(), Arc::new(manifest));
    }

    /// Register a manifest together with its root component and platforms.
    pub fn register_with_modules(&mut self, manifest: Manifest, platforms: &[&str]) {
        let root = format!("{BUILTIN_PACKAGE}.{}", manifest.domain);
        for platform in platforms {
            let path = format!("{root}.{platform}");
            self.register_module(Arc::new(StaticModule::new(path)));
        }
        self.register_module(Arc::new(StaticModule::new(root)));
        self.register(manifest);
    }

    /// Register a single module under its own path.
    pub fn register_module(&mut self, module: ModuleRef) {
        self.modules.insert(module.path().to_string(), module);
    }

    /// Get a manifest by domain.
    pub fn get(&self, domain: &str) -> Option<&Arc<Manifest>> {
        self.manifests.get(domain)
    }

    /// All manifests, sorted by domain.
    pub fn list_all(&self) -> Vec<&Arc<Manifest>> {
        let mut manifests: Vec<&Arc<Manifest>> = self.manifests.values().collect();
        manifests.sort_by(|a, b| a.domain.cmp(&b.domain));
        manifests
    }

    pub fn len(&self) -> usize {
        self.manifests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.manifests.is_empty()
    }
}

impl ModuleImporter for BuiltinRegistry {
    fn import_module(&self, path: &str) -> Result<ModuleRef, ImportError> {
        self.modules
            .get(path)
            .cloned()
            .ok_or_else(|| ImportError::new(path, "no module registered at this path"))
    }
}
