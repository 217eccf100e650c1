// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock module importer for deterministic testing.
//!
//! Every call is counted per path. Paths marked with [`MockImporter::fail`]
//! return an import error until [`MockImporter::succeed`] clears them. Each
//! successful call hands out a fresh module, so identity checks in tests
//! exercise the loader's own memoization.

use std::any::Any;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use hearth_core::{ImportError, Module, ModuleImporter, ModuleRef};

/// Module produced by [`MockImporter`].
#[derive(Debug)]
pub struct MockModule {
    path: String,
}

impl MockModule {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

impl Module for MockModule {
    fn path(&self) -> &str {
        &self.path
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Default)]
struct Script {
    calls: HashMap<String, usize>,
    failing: HashSet<String>,
}

/// A module importer with scripted outcomes.
#[derive(Default)]
pub struct MockImporter {
    script: Mutex<Script>,
    delay: Option<Duration>,
}

impl MockImporter {
    /// Create an importer where every path imports successfully.
    pub fn new() -> Self {
        Self::default()
    }

    /// Block each import for `delay`, to widen concurrency windows.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Make imports of `path` fail from now on.
    pub fn fail(&self, path: &str) {
        self.lock().failing.insert(path.to_string());
    }

    /// Make imports of `path` succeed again.
    pub fn succeed(&self, path: &str) {
        self.lock().failing.remove(path);
    }

    /// Number of import attempts for `path`.
    pub fn calls(&self, path: &str) -> usize {
        self.lock().calls.get(path).copied().unwrap_or(0)
    }

    /// Number of import attempts across all paths.
    pub fn total_calls(&self) -> usize {
        self.lock().calls.values().sum()
    }

    fn lock(&self) -> MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ModuleImporter for MockImporter {
    fn import_module(&self, path: &str) -> Result<ModuleRef, ImportError> {
        let fails = {
            let mut script = self.lock();
            *script.calls.entry(path.to_string()).or_default() += 1;
            script.failing.contains(path)
        };
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        if fails {
            return Err(ImportError::new(path, "Boom"));
        }
        Ok(Arc::new(MockModule::new(path)))
    }
}
