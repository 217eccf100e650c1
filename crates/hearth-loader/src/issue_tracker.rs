// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Where to send bug reports for a domain or module.

use crate::loader::Loader;
use crate::registry::CUSTOM_PACKAGE;

/// Issue tracker URL for an integration, if one can be determined.
///
/// Precedence: a resolved custom integration's own tracker (or nothing),
/// then "no tracker" for custom module paths, then the core tracker filtered
/// by domain label, then the unfiltered core tracker. Without a loader an
/// unresolvable domain is assumed to be built in.
pub fn issue_tracker(
    loader: Option<&Loader>,
    tracker_url: &str,
    domain: Option<&str>,
    module: Option<&str>,
) -> Option<String> {
    if domain.is_none() && module.is_none() {
        return Some(tracker_url.to_string());
    }

    let integration = match (loader, domain) {
        (Some(loader), Some(domain)) => loader.get_loaded_integration(domain).ok(),
        _ => None,
    };

    if let Some(integration) = &integration
        && !integration.is_built_in()
    {
        return integration.issue_tracker().map(str::to_string);
    }

    if module.is_some_and(is_custom_module) {
        return None;
    }

    let domain = integration.as_ref().map(|i| i.domain()).or(domain);
    Some(match domain {
        Some(domain) => format!("{tracker_url}+label%3A%22integration%3A+{domain}%22"),
        None => tracker_url.to_string(),
    })
}

/// Human-facing sentence telling the user how to report a problem.
pub fn suggest_report_issue(
    loader: Option<&Loader>,
    tracker_url: &str,
    domain: Option<&str>,
    module: Option<&str>,
) -> String {
    match issue_tracker(loader, tracker_url, domain, module) {
        Some(url) => format!("create a bug report at {url}"),
        None => match domain {
            Some(domain) => format!("report it to the author of the '{domain}' custom integration"),
            None => "report it to the custom integration author".to_string(),
        },
    }
}

fn is_custom_module(module: &str) -> bool {
    module
        .strip_prefix(CUSTOM_PACKAGE)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('.'))
}

#[cfg(test)]
mod tests {
    use super::*;

    const CORE: &str = "https://github.com/hearth-rs/hearth/issues?q=is%3Aopen+is%3Aissue";

    #[test]
    fn nothing_known_points_at_core() {
        assert_eq!(issue_tracker(None, CORE, None, None).as_deref(), Some(CORE));
    }

    #[test]
    fn domain_adds_label_filter() {
        assert_eq!(
            issue_tracker(None, CORE, Some("hue"), Some("hearth.integrations.mqtt.sensor")),
            Some(format!("{CORE}+label%3A%22integration%3A+hue%22"))
        );
    }

    #[test]
    fn module_alone_does_not_imply_domain() {
        assert_eq!(
            issue_tracker(None, CORE, None, Some("hearth.integrations.hue.sensor")).as_deref(),
            Some(CORE)
        );
    }

    #[test]
    fn custom_module_has_no_tracker() {
        assert_eq!(issue_tracker(None, CORE, None, Some("custom_integrations.bla.sensor")), None);
        assert_eq!(
            issue_tracker(None, CORE, Some("hue"), Some("custom_integrations.bla.sensor")),
            None
        );
        assert!(!is_custom_module("custom_integrations_extra.bla"));
    }

    #[test]
    fn suggestions_without_loader() {
        assert_eq!(
            suggest_report_issue(None, CORE, None, None),
            format!("create a bug report at {CORE}")
        );
        assert_eq!(
            suggest_report_issue(None, CORE, None, Some("custom_integrations.hue.sensor")),
            "report it to the custom integration author"
        );
        assert_eq!(
            suggest_report_issue(None, CORE, Some("bla"), Some("custom_integrations.bla.sensor")),
            "report it to the author of the 'bla' custom integration"
        );
    }
}
