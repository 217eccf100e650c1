// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration manifest model and `manifest.json` parsing.
//!
//! A manifest is the immutable description of one integration: identity,
//! hard and soft dependencies, opaque requirements, and the per-protocol
//! discovery fragments that feed the discovery indexes.

use std::collections::BTreeMap;

use hearth_core::{validate_domain, HearthError, NotFoundReason};
use serde::{Deserialize, Serialize};

/// Protocol-specific matcher fields, kept as an ordered field mapping.
pub type MatcherFields = serde_json::Map<String, serde_json::Value>;

/// Parsed integration manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    /// Unique lowercase key (e.g. "hue").
    pub domain: String,
    /// Display name.
    pub name: String,
    /// Hard requirements: must resolve before this domain.
    #[serde(default)]
    pub dependencies: Vec<String>,
    /// Ordering hints only; still part of cycle detection.
    #[serde(default)]
    pub after_dependencies: Vec<String>,
    /// External package specifiers, opaque to the loader.
    #[serde(default)]
    pub requirements: Vec<String>,
    /// Version string. Mandatory (and validated) for custom integrations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Whether the integration can be set up through a config flow.
    #[serde(default)]
    pub config_flow: bool,
    /// Imports are expensive and must run on the import pool.
    #[serde(default)]
    pub import_executor: bool,
    /// Where to report bugs for this integration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue_tracker: Option<String>,
    /// Documentation URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documentation: Option<String>,
    /// Logger names owned by the integration, passed through untouched.
    #[serde(default)]
    pub loggers: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zeroconf: Option<Vec<ZeroconfEntry>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dhcp: Option<Vec<MatcherFields>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usb: Option<Vec<MatcherFields>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bluetooth: Option<Vec<MatcherFields>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssdp: Option<Vec<MatcherFields>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mqtt: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub homekit: Option<HomeKitFragment>,
}

impl Manifest {
    /// Minimal manifest with the domain doubling as display name.
    pub fn new(domain: impl Into<String>) -> Self {
        let domain = domain.into();
        Self {
            name: domain.clone(),
            domain,
            dependencies: Vec::new(),
            after_dependencies: Vec::new(),
            requirements: Vec::new(),
            version: None,
            config_flow: false,
            import_executor: false,
            issue_tracker: None,
            documentation: None,
            loggers: Vec::new(),
            zeroconf: None,
            dhcp: None,
            usb: None,
            bluetooth: None,
            ssdp: None,
            mqtt: None,
            homekit: None,
        }
    }

    /// Hard dependencies followed by after-dependencies.
    pub fn all_edges(&self) -> impl Iterator<Item = &str> {
        self.dependencies
            .iter()
            .chain(self.after_dependencies.iter())
            .map(String::as_str)
    }
}

/// One network-service discovery entry.
///
/// The bare string form is the service type alone. The object form is either
/// the current shape (`type`, `name`, `properties`) or the legacy shape that
/// put `macaddress`/`manufacturer`/`model` at the top level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ZeroconfEntry {
    ServiceType(String),
    Matcher(ZeroconfMatcher),
}

impl ZeroconfEntry {
    pub fn service_type(&self) -> &str {
        match self {
            ZeroconfEntry::ServiceType(t) => t,
            ZeroconfEntry::Matcher(m) => &m.service_type,
        }
    }
}

/// Object-form zeroconf matcher, current or legacy shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZeroconfMatcher {
    #[serde(rename = "type")]
    pub service_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<BTreeMap<String, String>>,
    /// Legacy top-level property.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub macaddress: Option<String>,
    /// Legacy top-level property.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    /// Legacy top-level property.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

/// Home-automation bridge discovery fragment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HomeKitFragment {
    #[serde(default)]
    pub models: Vec<String>,
}

/// Parse a `manifest.json` document.
///
/// `expected_domain` is the key the document was found under; a manifest
/// claiming a different domain is rejected.
pub fn parse_manifest(expected_domain: &str, json: &str) -> Result<Manifest, HearthError> {
    let manifest: Manifest = serde_json::from_str(json).map_err(|e| HearthError::Manifest {
        domain: expected_domain.to_string(),
        message: e.to_string(),
    })?;

    validate_domain(&manifest.domain)?;

    if manifest.domain != expected_domain {
        return Err(HearthError::Manifest {
            domain: expected_domain.to_string(),
            message: format!("manifest declares domain `{}`", manifest.domain),
        });
    }

    if manifest.name.trim().is_empty() {
        return Err(HearthError::Manifest {
            domain: expected_domain.to_string(),
            message: "name must not be empty".to_string(),
        });
    }

    Ok(manifest)
}

/// Parse a version leniently: full semver, or one to three numeric components.
pub fn parse_version(raw: &str) -> Option<semver::Version> {
    if let Ok(version) = semver::Version::parse(raw) {
        return Some(version);
    }

    let parts: Vec<&str> = raw.split('.').collect();
    if parts.len() > 3
        || parts
            .iter()
            .any(|p| p.is_empty() || !p.bytes().all(|b| b.is_ascii_digit()))
    {
        return None;
    }
    let component = |i: usize| parts.get(i).map_or(Some(0), |p| p.parse::<u64>().ok());
    Some(semver::Version::new(component(0)?, component(1)?, component(2)?))
}

/// Enforce the version policy for custom integrations.
pub fn check_custom_version(manifest: &Manifest) -> Result<semver::Version, NotFoundReason> {
    let raw = manifest
        .version
        .as_deref()
        .ok_or(NotFoundReason::MissingVersion)?;
    parse_version(raw).ok_or_else(|| NotFoundReason::InvalidVersion(raw.to_string()))
}
