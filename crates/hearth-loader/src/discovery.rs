// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Discovery indexes aggregated from every known manifest.
//!
//! [`DiscoveryIndex::build`] is pure: it reads manifests and nothing else.
//! Caching per store snapshot happens in [`crate::store`].

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use crate::manifest::{Manifest, MatcherFields, ZeroconfEntry, ZeroconfMatcher};

/// Domain that marks an integration as a credential provider consumer.
pub const APPLICATION_CREDENTIALS: &str = "application_credentials";

/// Zeroconf properties that used to live at the top level of a matcher.
const MOVED_ZEROCONF_PROPS: [&str; 3] = ["macaddress", "model", "manufacturer"];

/// Bridge-discoverable integration, keyed by accessory model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HomeKitDiscovered {
    pub domain: String,
    /// Offer discovery even when the device is already paired elsewhere.
    pub always_discover: bool,
}

/// All discovery indexes for one manifest snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DiscoveryIndex {
    /// Service type -> matchers, each carrying its `domain`.
    pub zeroconf: BTreeMap<String, Vec<MatcherFields>>,
    pub dhcp: Vec<MatcherFields>,
    pub usb: Vec<MatcherFields>,
    pub bluetooth: Vec<MatcherFields>,
    /// Accessory model -> integration.
    pub homekit: BTreeMap<String, HomeKitDiscovered>,
    /// Domain -> SSDP matchers.
    pub ssdp: BTreeMap<String, Vec<MatcherFields>>,
    /// Domain -> MQTT discovery topics.
    pub mqtt: BTreeMap<String, Vec<String>>,
    pub application_credentials: Vec<String>,
    pub config_flows: Vec<String>,
}

impl DiscoveryIndex {
    /// Build every index from the given manifests.
    ///
    /// Manifests are visited in domain order so list-shaped indexes are
    /// deterministic.
    pub fn build<'a>(manifests: impl IntoIterator<Item = &'a Manifest>) -> Self {
        let mut manifests: Vec<&Manifest> = manifests.into_iter().collect();
        manifests.sort_by(|a, b| a.domain.cmp(&b.domain));

        let mut index = DiscoveryIndex::default();
        for manifest in manifests {
            index.add(manifest);
        }
        index
    }

    fn add(&mut self, manifest: &Manifest) {
        let domain = manifest.domain.as_str();

        if manifest.config_flow {
            self.config_flows.push(domain.to_string());
            if manifest.dependencies.iter().any(|d| d == APPLICATION_CREDENTIALS) {
                self.application_credentials.push(domain.to_string());
            }
        }

        for entry in manifest.zeroconf.iter().flatten() {
            let matcher = match entry {
                ZeroconfEntry::ServiceType(_) => with_domain(domain, MatcherFields::new()),
                ZeroconfEntry::Matcher(m) => with_domain(domain, zeroconf_fields(domain, m)),
            };
            self.zeroconf
                .entry(entry.service_type().to_string())
                .or_default()
                .push(matcher);
        }

        self.dhcp.extend(
            manifest
                .dhcp
                .iter()
                .flatten()
                .map(|m| with_domain(domain, m.clone())),
        );

        self.usb.extend(manifest.usb.iter().flatten().map(|m| {
            let mut fields = m.clone();
            fields.remove("known_devices");
            with_domain(domain, fields)
        }));

        self.bluetooth.extend(
            manifest
                .bluetooth
                .iter()
                .flatten()
                .map(|m| with_domain(domain, m.clone())),
        );

        if let Some(homekit) = &manifest.homekit {
            for model in &homekit.models {
                self.homekit.insert(
                    model.clone(),
                    HomeKitDiscovered {
                        domain: domain.to_string(),
                        always_discover: manifest.config_flow,
                    },
                );
            }
        }

        if let Some(ssdp) = manifest.ssdp.as_ref().filter(|s| !s.is_empty()) {
            self.ssdp.insert(domain.to_string(), ssdp.clone());
        }

        if let Some(topics) = manifest.mqtt.as_ref().filter(|t| !t.is_empty()) {
            self.mqtt.insert(domain.to_string(), topics.clone());
        }
    }
}

fn with_domain(domain: &str, mut fields: MatcherFields) -> MatcherFields {
    fields.insert("domain".to_string(), Value::String(domain.to_string()));
    fields
}

/// Normalize an object-form matcher into the current shape.
///
/// Legacy top-level properties move into `properties`; a legacy MAC address
/// prefix is lower-cased on the way.
fn zeroconf_fields(domain: &str, matcher: &ZeroconfMatcher) -> MatcherFields {
    let mut fields = MatcherFields::new();
    if let Some(name) = &matcher.name {
        fields.insert("name".to_string(), Value::String(name.clone()));
    }

    let mut properties: Option<serde_json::Map<String, Value>> =
        matcher.properties.as_ref().map(|props| {
            props
                .iter()
                .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                .collect()
        });

    let legacy = [
        (MOVED_ZEROCONF_PROPS[0], matcher.macaddress.as_deref()),
        (MOVED_ZEROCONF_PROPS[1], matcher.model.as_deref()),
        (MOVED_ZEROCONF_PROPS[2], matcher.manufacturer.as_deref()),
    ];
    for (key, value) in legacy {
        let Some(value) = value.filter(|v| !v.is_empty()) else {
            continue;
        };
        warn!(
            domain = %domain,
            property = key,
            "Matching the zeroconf property \"{key}\" at top-level is deprecated and should be moved into a properties dict"
        );
        let value = if key == "macaddress" {
            value.to_lowercase()
        } else {
            value.to_string()
        };
        properties
            .get_or_insert_with(serde_json::Map::new)
            .insert(key.to_string(), Value::String(value));
    }

    if let Some(properties) = properties {
        fields.insert("properties".to_string(), Value::Object(properties));
    }
    fields
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::manifest::parse_manifest;

    fn manifest(json: Value) -> Manifest {
        let domain = json["domain"].as_str().unwrap().to_string();
        parse_manifest(&domain, &json.to_string()).unwrap()
    }

    fn fields(value: Value) -> MatcherFields {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn legacy_zeroconf_matcher_is_normalized() {
        let legacy = manifest(json!({
            "domain": "test_2",
            "name": "test_2",
            "zeroconf": [{
                "type": "_test_2._tcp.local.",
                "macaddress": "AABBCC*",
                "manufacturer": "Legacy*",
                "model": "legacy*",
                "name": "test_2*"
            }]
        }));
        let plain = manifest(json!({
            "domain": "test_1",
            "name": "test_1",
            "zeroconf": ["_test_1._tcp.local."]
        }));

        let index = DiscoveryIndex::build([&legacy, &plain]);
        assert_eq!(
            index.zeroconf["_test_1._tcp.local."],
            vec![fields(json!({"domain": "test_1"}))]
        );
        assert_eq!(
            index.zeroconf["_test_2._tcp.local."],
            vec![fields(json!({
                "domain": "test_2",
                "name": "test_2*",
                "properties": {
                    "macaddress": "aabbcc*",
                    "model": "legacy*",
                    "manufacturer": "Legacy*"
                }
            }))]
        );
    }

    #[test]
    fn current_shape_properties_are_not_lowercased() {
        let m = manifest(json!({
            "domain": "shelly",
            "name": "Shelly",
            "zeroconf": [{"type": "_http._tcp.local.", "properties": {"macaddress": "AABB*"}}]
        }));
        let index = DiscoveryIndex::build([&m]);
        assert_eq!(
            index.zeroconf["_http._tcp.local."][0]["properties"]["macaddress"],
            json!("AABB*")
        );
    }

    #[test]
    fn usb_drops_known_devices() {
        let m = manifest(json!({
            "domain": "test_1",
            "name": "test_1",
            "usb": [
                {"vid": "10C4", "pid": "EA60", "known_devices": ["slae.sh cc2652rb stick"]},
                {"vid": "1CF1", "pid": "0030", "known_devices": ["Conbee II"]}
            ]
        }));
        let index = DiscoveryIndex::build([&m]);
        assert_eq!(
            index.usb,
            vec![
                fields(json!({"domain": "test_1", "vid": "10C4", "pid": "EA60"})),
                fields(json!({"domain": "test_1", "vid": "1CF1", "pid": "0030"})),
            ]
        );
    }

    #[test]
    fn dhcp_and_bluetooth_carry_domain() {
        let m = manifest(json!({
            "domain": "test_1",
            "name": "test_1",
            "dhcp": [{"hostname": "tesla_*", "macaddress": "4CFCAA*"}],
            "bluetooth": [{"local_name": "Prodigio_*"}]
        }));
        let index = DiscoveryIndex::build([&m]);
        assert_eq!(
            index.dhcp,
            vec![fields(json!({"domain": "test_1", "hostname": "tesla_*", "macaddress": "4CFCAA*"}))]
        );
        assert_eq!(
            index.bluetooth,
            vec![fields(json!({"domain": "test_1", "local_name": "Prodigio_*"}))]
        );
    }

    #[test]
    fn homekit_ssdp_and_mqtt_are_keyed() {
        let m = manifest(json!({
            "domain": "test_1",
            "name": "test_1",
            "config_flow": true,
            "homekit": {"models": ["test_1"]},
            "ssdp": [{"manufacturer": "test_1", "modelName": "test_1"}],
            "mqtt": ["test_1/discovery"]
        }));
        let index = DiscoveryIndex::build([&m]);
        assert_eq!(
            index.homekit["test_1"],
            HomeKitDiscovered {
                domain: "test_1".into(),
                always_discover: true
            }
        );
        assert_eq!(
            index.ssdp["test_1"],
            vec![fields(json!({"manufacturer": "test_1", "modelName": "test_1"}))]
        );
        assert_eq!(index.mqtt["test_1"], vec!["test_1/discovery"]);
    }

    #[test]
    fn application_credentials_requires_config_flow() {
        let gated = manifest(json!({
            "domain": "test_2",
            "name": "test_2",
            "config_flow": true,
            "dependencies": ["application_credentials"]
        }));
        let ungated = manifest(json!({
            "domain": "test_3",
            "name": "test_3",
            "config_flow": false,
            "dependencies": ["application_credentials"]
        }));
        let plain = manifest(json!({"domain": "test_1", "name": "test_1", "config_flow": true}));

        let index = DiscoveryIndex::build([&gated, &ungated, &plain]);
        assert_eq!(index.application_credentials, vec!["test_2"]);
        assert_eq!(index.config_flows, vec!["test_1", "test_2"]);
    }

    #[test]
    fn empty_fragments_contribute_nothing() {
        let m = manifest(json!({
            "domain": "quiet",
            "name": "Quiet",
            "zeroconf": [],
            "ssdp": [],
            "mqtt": []
        }));
        let index = DiscoveryIndex::build([&m]);
        assert_eq!(index, DiscoveryIndex::default());
    }
}
