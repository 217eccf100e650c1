// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Module importer for custom integrations on disk.
//!
//! `custom_integrations.<domain>` is importable when `<root>/<domain>/` exists.
//! `custom_integrations.<domain>.<platform>` additionally needs a
//! `<platform>` file or directory (any extension) inside it.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use hearth_core::{ImportError, ModuleImporter, ModuleRef};
use hearth_loader::registry::CUSTOM_PACKAGE;
use hearth_loader::StaticModule;

pub struct DirectoryImporter {
    root: Option<PathBuf>,
}

impl DirectoryImporter {
    pub fn new(root: Option<PathBuf>) -> Self {
        Self { root }
    }
}

impl ModuleImporter for DirectoryImporter {
    fn import_module(&self, path: &str) -> Result<ModuleRef, ImportError> {
        let root = self
            .root
            .as_deref()
            .ok_or_else(|| ImportError::new(path, "no custom integrations directory configured"))?;

        let mut parts = path.split('.');
        if parts.next() != Some(CUSTOM_PACKAGE) {
            return Err(ImportError::new(path, "not a custom integration module"));
        }
        let Some(domain) = parts.next() else {
            return Err(ImportError::new(path, "missing integration domain"));
        };
        let dir = root.join(domain);
        if !dir.is_dir() {
            return Err(ImportError::new(path, format!("{} does not exist", dir.display())));
        }

        match parts.next() {
            None => {}
            Some(platform) if has_entry(&dir, platform) => {}
            Some(platform) => {
                return Err(ImportError::new(path, format!("no platform `{platform}` in {}", dir.display())));
            }
        }
        Ok(Arc::new(StaticModule::new(path)))
    }
}

fn has_entry(dir: &Path, name: &str) -> bool {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return false;
    };
    entries
        .filter_map(Result::ok)
        .any(|e| e.path().file_stem().and_then(|s| s.to_str()) == Some(name))
}
