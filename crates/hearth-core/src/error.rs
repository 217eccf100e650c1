// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Hearth integration loader.
//!
//! Every variant carries owned, cloneable detail so a single in-flight load
//! outcome can be handed to every task waiting on it.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

/// Why an integration lookup ended in "not found".
///
/// Version rejections are reported through the same error class as a truly
/// absent domain, but remain distinguishable for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotFoundReason {
    /// Neither the built-in nor the custom store knows the domain.
    Absent,
    /// A custom integration was found but its manifest has no `version`.
    MissingVersion,
    /// A custom integration was found but its `version` does not parse.
    InvalidVersion(String),
}

impl fmt::Display for NotFoundReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotFoundReason::Absent => write!(f, "no manifest"),
            NotFoundReason::MissingVersion => write!(f, "custom integration has no version"),
            NotFoundReason::InvalidVersion(v) => {
                write!(f, "custom integration has an invalid version ({v})")
            }
        }
    }
}

/// The primary error type used across the loader.
#[derive(Debug, Clone, Error)]
pub enum HearthError {
    /// Configuration errors (invalid TOML, bad values).
    #[error("configuration error: {0}")]
    Config(String),

    /// A manifest document could not be parsed or is inconsistent.
    #[error("invalid manifest for `{domain}`: {message}")]
    Manifest { domain: String, message: String },

    /// The domain key is malformed, e.g. contains the platform separator.
    #[error("invalid domain `{domain}`")]
    InvalidDomain { domain: String },

    /// No usable manifest exists for the domain.
    #[error("integration `{domain}` not found ({reason})")]
    IntegrationNotFound {
        domain: String,
        reason: NotFoundReason,
    },

    /// A synchronous accessor was used before the domain was ever loaded.
    #[error("integration `{domain}` has not been loaded yet")]
    IntegrationNotLoaded { domain: String },

    /// A dependency (hard or after) of `domain` does not exist.
    ///
    /// `chain` runs from the requested domain down to `missing`.
    #[error(
        "integration `{domain}` depends on `{missing}`, which could not be found ({})",
        chain.join(" -> ")
    )]
    MissingDependency {
        domain: String,
        missing: String,
        chain: Vec<String>,
    },

    /// The dependency graph contains a cycle; `cycle` starts and ends on the same domain.
    #[error("circular dependency detected: {}", cycle.join(" -> "))]
    CircularDependency { cycle: Vec<String> },

    /// Importing a component or platform module failed.
    #[error(transparent)]
    Import(#[from] ImportError),

    /// Scanning for custom integrations failed.
    #[error("custom integration scan failed: {0}")]
    Scan(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl HearthError {
    /// Returns true for both flavours of not-found (absent or version-rejected).
    pub fn is_not_found(&self) -> bool {
        matches!(self, HearthError::IntegrationNotFound { .. })
    }

    /// Shorthand for an absent-domain error.
    pub fn not_found(domain: impl Into<String>) -> Self {
        HearthError::IntegrationNotFound {
            domain: domain.into(),
            reason: NotFoundReason::Absent,
        }
    }
}

/// Failure to import a module.
///
/// Cheap to clone: the message is shared, so every holder of a cached failure
/// sees the very same allocation.
#[derive(Debug, Clone, Error)]
#[error("unable to import `{module}`: {message}")]
pub struct ImportError {
    module: String,
    message: Arc<str>,
}

impl ImportError {
    /// Create an import error for the given module path.
    pub fn new(module: impl Into<String>, message: impl fmt::Display) -> Self {
        Self {
            module: module.into(),
            message: Arc::from(message.to_string()),
        }
    }

    /// The module path that failed to import.
    pub fn module(&self) -> &str {
        &self.module
    }

    /// The underlying failure message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// True if both errors are clones of one recorded failure.
    pub fn same_failure(&self, other: &ImportError) -> bool {
        Arc::ptr_eq(&self.message, &other.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_renders_as_chain() {
        let err = HearthError::CircularDependency {
            cycle: vec!["mod4".into(), "mod2".into(), "mod1".into(), "mod4".into()],
        };
        assert_eq!(
            err.to_string(),
            "circular dependency detected: mod4 -> mod2 -> mod1 -> mod4"
        );
    }

    #[test]
    fn missing_dependency_names_both_domains() {
        let err = HearthError::MissingDependency {
            domain: "mod1".into(),
            missing: "nonexistent".into(),
            chain: vec!["mod4".into(), "mod2".into(), "mod1".into(), "nonexistent".into()],
        };
        assert_eq!(
            err.to_string(),
            "integration `mod1` depends on `nonexistent`, which could not be found \
             (mod4 -> mod2 -> mod1 -> nonexistent)"
        );
    }

    #[test]
    fn version_rejection_is_still_not_found() {
        let err = HearthError::IntegrationNotFound {
            domain: "test_no_version".into(),
            reason: NotFoundReason::MissingVersion,
        };
        assert!(err.is_not_found());
        assert!(!HearthError::IntegrationNotLoaded { domain: "x".into() }.is_not_found());
    }

    #[test]
    fn cloned_import_error_is_same_failure() {
        let err = ImportError::new("hearth.integrations.hue.light", "Boom");
        let clone = err.clone();
        let other = ImportError::new("hearth.integrations.hue.light", "Boom");
        assert!(err.same_failure(&clone));
        assert!(!err.same_failure(&other));
        assert_eq!(err.message(), "Boom");
        assert_eq!(err.module(), "hearth.integrations.hue.light");
    }

    #[test]
    fn import_error_converts_into_hearth_error() {
        let err: HearthError = ImportError::new("x", "y").into();
        assert!(matches!(err, HearthError::Import(_)));
    }
}
