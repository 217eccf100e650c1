// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Hearth integration loader.
//!
//! This crate provides the error taxonomy, domain-key rules, and the
//! capability traits (`Module`, `ModuleImporter`) that the loader depends on.
//! It deliberately knows nothing about how modules are located or imported.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::{HearthError, ImportError, NotFoundReason};
pub use traits::{Module, ModuleImporter, ModuleRef};
pub use types::{validate_domain, IntegrationOrigin};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hearth_errors_render_their_details() {
        let cases = [
            (HearthError::Config("bad level".into()), "configuration error: bad level"),
            (
                HearthError::Manifest {
                    domain: "hue".into(),
                    message: "name is empty".into(),
                },
                "invalid manifest for `hue`: name is empty",
            ),
            (
                HearthError::InvalidDomain {
                    domain: "some.thing".into(),
                },
                "invalid domain `some.thing`",
            ),
            (
                HearthError::IntegrationNotFound {
                    domain: "hue".into(),
                    reason: NotFoundReason::InvalidVersion("abc".into()),
                },
                "integration `hue` not found (custom integration has an invalid version (abc))",
            ),
            (
                HearthError::IntegrationNotLoaded {
                    domain: "hue".into(),
                },
                "integration `hue` has not been loaded yet",
            ),
            (
                HearthError::CircularDependency {
                    cycle: vec!["a".into(), "b".into(), "a".into()],
                },
                "circular dependency detected: a -> b -> a",
            ),
            (
                HearthError::Import(ImportError::new("hue", "boom")),
                "unable to import `hue`: boom",
            ),
            (HearthError::Scan("denied".into()), "custom integration scan failed: denied"),
            (HearthError::Internal("oops".into()), "internal error: oops"),
        ];
        for (err, expected) in cases {
            assert_eq!(err.to_string(), expected);
        }
    }

    #[test]
    fn integration_origin_round_trips_through_strings() {
        use std::str::FromStr;

        for origin in [IntegrationOrigin::BuiltIn, IntegrationOrigin::Custom] {
            let s = origin.to_string();
            let parsed = IntegrationOrigin::from_str(&s).expect("should parse back");
            assert_eq!(origin, parsed);
        }
        assert_eq!(IntegrationOrigin::BuiltIn.to_string(), "built-in");
    }

    #[test]
    fn integration_origin_serialization() {
        let json = serde_json::to_string(&IntegrationOrigin::Custom).expect("should serialize");
        assert_eq!(json, "\"custom\"");
    }
}
