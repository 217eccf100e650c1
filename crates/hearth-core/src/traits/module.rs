// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Loaded code objects and the importer that produces them.

use std::any::Any;
use std::fmt::Debug;
use std::sync::Arc;

use crate::error::ImportError;

/// A loaded component or platform module.
///
/// Hosts downcast through [`Module::as_any`] to reach the concrete type.
pub trait Module: Debug + Send + Sync + 'static {
    /// Fully qualified module path, e.g. `hearth.integrations.hue.light`.
    fn path(&self) -> &str;

    /// Access the concrete module for downcasting.
    fn as_any(&self) -> &dyn Any;
}

/// Shared handle to a loaded module. Identity is `Arc` pointer identity.
pub type ModuleRef = Arc<dyn Module>;

/// Imports modules by path.
///
/// Implementations may touch the filesystem and block; the loader decides
/// whether to call them inline or on the bounded import pool.
pub trait ModuleImporter: Send + Sync + 'static {
    /// Import the module at `path`.
    fn import_module(&self, path: &str) -> Result<ModuleRef, ImportError>;
}
