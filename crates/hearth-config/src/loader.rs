// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./hearth.toml` > `~/.config/hearth/hearth.toml` > `/etc/hearth/hearth.toml`
//! with environment variable overrides via `HEARTH_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::HearthConfig;

/// System-wide configuration file.
pub const SYSTEM_CONFIG: &str = "/etc/hearth/hearth.toml";

/// Configuration file in the working directory.
pub const LOCAL_CONFIG: &str = "hearth.toml";

/// Path of the per-user configuration file, if a config dir is known.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("hearth/hearth.toml"))
}

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/hearth/hearth.toml`
/// 3. `~/.config/hearth/hearth.toml`
/// 4. `./hearth.toml`
/// 5. `HEARTH_*` environment variables
pub fn load_config() -> Result<HearthConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<HearthConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(HearthConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<HearthConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(HearthConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used for config loading, before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(HearthConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG))
        .merge(env_provider())
}

/// Environment provider with explicit section mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` because key names contain
/// underscores: `HEARTH_LOADER_IMPORT_WORKERS` must become `loader.import_workers`.
fn env_provider() -> Env {
    Env::prefixed("HEARTH_").map(|key| {
        key.as_str()
            .replacen("loader_", "loader.", 1)
            .replacen("issues_", "issues.", 1)
            .replacen("logging_", "logging.", 1)
            .into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_overrides_nested_keys() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("HEARTH_LOADER_RECOVERY_MODE", "true");
            jail.set_env("HEARTH_LOADER_IMPORT_WORKERS", "2");
            jail.set_env("HEARTH_LOGGING_LEVEL", "debug");

            let config = load_config_from_path(Path::new("missing.toml"))?;
            assert!(config.loader.recovery_mode);
            assert_eq!(config.loader.import_workers, 2);
            assert_eq!(config.logging.level, "debug");
            Ok(())
        });
    }

    #[test]
    fn local_file_is_picked_up() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                LOCAL_CONFIG,
                r#"
[loader]
custom_integrations_dir = "/srv/hearth/custom"
"#,
            )?;
            let config = load_config()?;
            assert_eq!(
                config.loader.custom_integrations_dir.as_deref(),
                Some(Path::new("/srv/hearth/custom"))
            );
            Ok(())
        });
    }
}
