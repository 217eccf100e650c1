// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dependency Graph Resolver.
//!
//! Depth-first walk over `dependencies` and `after_dependencies`. Both kinds of
//! edge take part in cycle and missing-domain detection; only hard
//! dependencies end up in the returned closure. Per-domain closures are
//! memoized for the duration of one `resolve` call.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use hearth_core::HearthError;

use crate::manifest::Manifest;

/// Resolves hard-dependency closures against a manifest lookup.
pub struct DependencyResolver<F> {
    lookup: F,
}

impl<F> DependencyResolver<F>
where
    F: Fn(&str) -> Option<Arc<Manifest>>,
{
    pub fn new(lookup: F) -> Self {
        Self { lookup }
    }

    /// Transitive hard dependencies of `domain`, including `domain` itself.
    pub fn resolve(&self, domain: &str) -> Result<BTreeSet<String>, HearthError> {
        let root = (self.lookup)(domain).ok_or_else(|| HearthError::not_found(domain))?;
        let mut walk = Walk {
            lookup: &self.lookup,
            stack: Vec::new(),
            closures: HashMap::new(),
        };
        walk.visit(domain, &root)?;
        walk.closures
            .remove(domain)
            .ok_or_else(|| HearthError::Internal(format!("no closure recorded for `{domain}`")))
    }
}

struct Walk<'a, F> {
    lookup: &'a F,
    /// Domains currently being expanded, outermost first.
    stack: Vec<String>,
    /// Finished domains and their hard closures.
    closures: HashMap<String, BTreeSet<String>>,
}

impl<F> Walk<'_, F>
where
    F: Fn(&str) -> Option<Arc<Manifest>>,
{
    fn visit(&mut self, domain: &str, manifest: &Manifest) -> Result<(), HearthError> {
        if self.closures.contains_key(domain) {
            return Ok(());
        }
        if let Some(pos) = self.stack.iter().position(|d| d == domain) {
            let mut cycle = self.stack[pos..].to_vec();
            cycle.push(domain.to_string());
            return Err(HearthError::CircularDependency { cycle });
        }

        self.stack.push(domain.to_string());
        for dep in manifest.all_edges() {
            let Some(dep_manifest) = (self.lookup)(dep) else {
                let mut chain = self.stack.clone();
                chain.push(dep.to_string());
                return Err(HearthError::MissingDependency {
                    domain: domain.to_string(),
                    missing: dep.to_string(),
                    chain,
                });
            };
            self.visit(dep, &dep_manifest)?;
        }
        self.stack.pop();

        let mut closure = BTreeSet::from([domain.to_string()]);
        for dep in &manifest.dependencies {
            if let Some(sub) = self.closures.get(dep) {
                closure.extend(sub.iter().cloned());
            }
        }
        self.closures.insert(domain.to_string(), closure);
        Ok(())
    }
}
