// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the loader crates.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::HearthError;

/// Separator reserved for platform sub-addressing (`hue.light`).
pub const PLATFORM_SEPARATOR: char = '.';

/// Where an integration's manifest came from.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum IntegrationOrigin {
    /// Shipped with the host.
    BuiltIn,
    /// Supplied by a third party at runtime.
    Custom,
}

/// Reject compound or namespaced domain keys.
pub fn validate_domain(domain: &str) -> Result<(), HearthError> {
    if domain.is_empty() || domain.contains(PLATFORM_SEPARATOR) {
        return Err(HearthError::InvalidDomain {
            domain: domain.to_string(),
        });
    }
    Ok(())
}
