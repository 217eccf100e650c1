// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for dependency resolution through the loader.

use std::collections::BTreeSet;

use hearth_core::HearthError;
use hearth_test_utils::{MockManifest, TestHarness};
use tracing_test::traced_test;

fn set(domains: &[&str]) -> BTreeSet<String> {
    domains.iter().map(|d| d.to_string()).collect()
}

#[tokio::test]
async fn diamond_then_cycle() {
    let acyclic = TestHarness::builder()
        .builtin(MockManifest::new("mod1"))
        .builtin(MockManifest::new("mod2").dependencies(&["mod1"]))
        .builtin(MockManifest::new("mod3").dependencies(&["mod1"]))
        .builtin(MockManifest::new("mod4").dependencies(&["mod2", "mod3"]))
        .build();
    assert_eq!(
        acyclic.loader.resolve_dependencies("mod4").await.unwrap(),
        set(&["mod1", "mod2", "mod3", "mod4"])
    );

    let cyclic = TestHarness::builder()
        .builtin(MockManifest::new("mod1").dependencies(&["mod4"]))
        .builtin(MockManifest::new("mod2").dependencies(&["mod1"]))
        .builtin(MockManifest::new("mod3").dependencies(&["mod1"]))
        .builtin(MockManifest::new("mod4").dependencies(&["mod2", "mod3"]))
        .build();
    let err = cyclic.loader.resolve_dependencies("mod4").await.unwrap_err();
    assert!(matches!(
        err,
        HearthError::CircularDependency { ref cycle } if cycle == &["mod4", "mod2", "mod1", "mod4"]
    ));
}

#[tokio::test]
async fn after_dependency_cycle_fails_every_member() {
    let h = TestHarness::builder()
        .builtin(MockManifest::new("mod1").after_dependencies(&["mod2"]))
        .builtin(MockManifest::new("mod2").after_dependencies(&["mod1"]))
        .build();
    for domain in ["mod1", "mod2"] {
        assert!(matches!(
            h.loader.resolve_dependencies(domain).await,
            Err(HearthError::CircularDependency { .. })
        ));
    }
}

#[tokio::test]
#[traced_test]
async fn nonexistent_dependency_is_reported() {
    let h = TestHarness::builder()
        .builtin(MockManifest::new("mod1").dependencies(&["nonexistent"]))
        .build();
    let err = h.loader.resolve_dependencies("mod1").await.unwrap_err();
    assert!(matches!(
        err,
        HearthError::MissingDependency { ref domain, ref missing, .. }
            if domain == "mod1" && missing == "nonexistent"
    ));
    assert!(logs_contain("unable to resolve dependencies"));
}

#[tokio::test]
#[traced_test]
async fn nested_missing_dependency_logs_chain() {
    let h = TestHarness::builder()
        .builtin(MockManifest::new("mod1").dependencies(&["nonexistent"]))
        .builtin(MockManifest::new("mod2").dependencies(&["mod1"]))
        .builtin(MockManifest::new("mod4").dependencies(&["mod2"]))
        .build();
    let err = h.loader.resolve_dependencies("mod4").await.unwrap_err();
    assert!(err.to_string().contains("mod4 -> mod2 -> mod1 -> nonexistent"));
    assert!(logs_contain("chain=mod4 -> mod2 -> mod1 -> nonexistent"));
}

#[tokio::test]
async fn builtin_may_depend_on_custom() {
    let h = TestHarness::builder()
        .builtin(MockManifest::new("hue").dependencies(&["test_package"]))
        .custom(MockManifest::custom("test_package"))
        .build();
    assert_eq!(
        h.loader.resolve_dependencies("hue").await.unwrap(),
        set(&["hue", "test_package"])
    );
}

#[tokio::test]
async fn unversioned_custom_dependency_counts_as_missing() {
    let h = TestHarness::builder()
        .builtin(MockManifest::new("hue").dependencies(&["test_no_version"]))
        .custom(MockManifest::new("test_no_version"))
        .build();
    assert!(matches!(
        h.loader.resolve_dependencies("hue").await,
        Err(HearthError::MissingDependency { ref missing, .. }) if missing == "test_no_version"
    ));
}

#[tokio::test]
async fn resolution_is_recomputed_per_call() {
    let h = TestHarness::builder()
        .builtin(MockManifest::new("hue").dependencies(&["late"]))
        .build();
    assert!(h.loader.resolve_dependencies("hue").await.is_err());

    h.source.set_manifests(vec![MockManifest::custom("late").build()]);
    h.loader.refresh();
    assert_eq!(
        h.loader.resolve_dependencies("hue").await.unwrap(),
        set(&["hue", "late"])
    );
}
