// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Subcommand implementations.

use hearth_core::HearthError;
use hearth_loader::{suggest_report_issue, Loader};
use tracing::info;

/// Run `hearth check`. Every domain is checked; the first failure is returned
/// after all results are printed.
pub async fn run_check(loader: &Loader, domains: &[String]) -> Result<(), HearthError> {
    let domains = if domains.is_empty() {
        known_domains(loader).await?
    } else {
        domains.to_vec()
    };

    let mut first_error = None;
    for domain in &domains {
        let outcome = match loader.get_integration(domain).await {
            Ok(_) => loader.resolve_dependencies(domain).await,
            Err(e) => Err(e),
        };
        match outcome {
            Ok(closure) => {
                let deps: Vec<&str> = closure
                    .iter()
                    .map(String::as_str)
                    .filter(|d| *d != domain.as_str())
                    .collect();
                println!("ok    {domain} [{}]", deps.join(", "));
            }
            Err(e) => {
                println!("fail  {domain}: {e}");
                first_error.get_or_insert(e);
            }
        }
    }

    info!(checked = domains.len(), failed = first_error.is_some(), "dependency check finished");
    first_error.map_or(Ok(()), Err)
}

/// Run `hearth load`.
pub async fn run_load(loader: &Loader, domain: &str, platforms: &[String]) -> Result<(), HearthError> {
    let component = loader.load_component(domain).await?;
    println!("loaded {}", component.path());

    let integration = loader.get_loaded_integration(domain)?;
    let names: Vec<&str> = platforms.iter().map(String::as_str).collect();
    for (name, result) in names.iter().zip(integration.async_get_platforms(&names).await) {
        match result {
            Ok(module) => println!("loaded {}", module.path()),
            Err(e) => println!("failed {name}: {e}"),
        }
    }
    Ok(())
}

/// Run `hearth discovery`.
pub async fn run_discovery(loader: &Loader, json: bool) -> Result<(), HearthError> {
    let index = loader.discovery().await?;
    if json {
        let rendered = serde_json::to_string_pretty(&*index)
            .map_err(|e| HearthError::Internal(format!("failed to render discovery index: {e}")))?;
        println!("{rendered}");
        return Ok(());
    }

    println!("zeroconf service types:  {}", index.zeroconf.len());
    println!("dhcp matchers:           {}", index.dhcp.len());
    println!("usb matchers:            {}", index.usb.len());
    println!("bluetooth matchers:      {}", index.bluetooth.len());
    println!("homekit models:          {}", index.homekit.len());
    println!("ssdp integrations:       {}", index.ssdp.len());
    println!("mqtt integrations:       {}", index.mqtt.len());
    println!("config flows:            {}", index.config_flows.join(", "));
    println!("application credentials: {}", index.application_credentials.join(", "));
    Ok(())
}

/// Run `hearth report-issue`. The domain is resolved first so custom
/// integrations are recognized.
pub async fn run_report_issue(
    loader: &Loader,
    tracker_url: &str,
    domain: Option<&str>,
    module: Option<&str>,
) -> Result<(), HearthError> {
    if let Some(domain) = domain
        && let Err(e) = loader.get_integration(domain).await
    {
        if !e.is_not_found() {
            return Err(e);
        }
    }
    println!(
        "{}",
        suggest_report_issue(Some(loader), tracker_url, domain, module)
    );
    Ok(())
}

async fn known_domains(loader: &Loader) -> Result<Vec<String>, HearthError> {
    let mut domains: Vec<String> = loader
        .store()
        .builtin()
        .list_all()
        .iter()
        .map(|m| m.domain.clone())
        .collect();
    let custom = loader.custom_components().await?;
    domains.extend(custom.domains().map(str::to_string));
    Ok(domains)
}
