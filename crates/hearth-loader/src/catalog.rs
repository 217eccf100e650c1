// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Built-in integration catalog.
//!
//! The integrations compiled into the host binary. No filesystem access.

use std::collections::BTreeMap;

use crate::manifest::{HomeKitFragment, Manifest, MatcherFields, ZeroconfEntry, ZeroconfMatcher};
use crate::registry::BuiltinRegistry;

fn fields(pairs: &[(&str, &str)]) -> MatcherFields {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), serde_json::Value::String(v.to_string())))
        .collect()
}

/// Manifests and platform names for every built-in integration.
pub fn builtin_manifests() -> Vec<(Manifest, &'static [&'static str])> {
    let mut http = Manifest::new("http");
    http.name = "HTTP".to_string();

    let mut credentials = Manifest::new("application_credentials");
    credentials.name = "Application Credentials".to_string();
    credentials.dependencies = vec!["http".to_string()];

    let mut notification = Manifest::new("persistent_notification");
    notification.name = "Persistent Notification".to_string();

    let mut light = Manifest::new("light");
    light.name = "Light".to_string();

    let mut hue = Manifest::new("hue");
    hue.name = "Philips Hue".to_string();
    hue.config_flow = true;
    hue.after_dependencies = vec!["light".to_string()];
    hue.documentation = Some("https://hearth.example/integrations/hue".to_string());
    hue.zeroconf = Some(vec![ZeroconfEntry::Matcher(ZeroconfMatcher {
        service_type: "_hue._tcp.local.".to_string(),
        name: None,
        properties: Some(BTreeMap::new()),
        macaddress: None,
        manufacturer: None,
        model: None,
    })]);
    hue.homekit = Some(HomeKitFragment {
        models: vec!["BSB002".to_string()],
    });
    hue.ssdp = Some(vec![
        fields(&[
            ("manufacturer", "Royal Philips Electronics"),
            ("modelName", "Philips hue bridge 2012"),
        ]),
        fields(&[("manufacturer", "Signify"), ("modelName", "Philips hue bridge 2015")]),
    ]);

    vec![
        (http, &[]),
        (credentials, &[]),
        (notification, &[]),
        (light, &[]),
        (hue, &["light", "config_flow"]),
    ]
}

/// Registry pre-populated with the built-in catalog.
pub fn builtin_registry() -> BuiltinRegistry {
    let mut registry = BuiltinRegistry::new();
    for (manifest, platforms) in builtin_manifests() {
        registry.register_with_modules(manifest, platforms);
    }
    registry
}

#[cfg(test)]
mod tests {
    use hearth_core::ModuleImporter;

    use super::*;

    #[test]
    fn catalog_dependencies_are_all_builtin() {
        let registry = builtin_registry();
        for manifest in registry.list_all() {
            for dep in manifest.all_edges() {
                assert!(registry.get(dep).is_some(), "{dep} missing from catalog");
            }
        }
    }

    #[test]
    fn hue_platforms_are_importable() {
        let registry = builtin_registry();
        assert!(registry.import_module("hearth.integrations.hue").is_ok());
        assert!(registry.import_module("hearth.integrations.hue.light").is_ok());
        assert!(registry.import_module("hearth.integrations.hue.sensor").is_err());
    }
}
