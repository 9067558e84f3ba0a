//! Integration tests for loading manifests from disk and composing them.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::io::Write;
use std::sync::Arc;

use componentry_common::config::RegistryConfig;
use componentry_core::compose::rebuild;
use componentry_core::context::{NamedCollection, WorkContext};
use componentry_manifest::load_manifest;
use serde_json::json;

fn write_manifest(value: &serde_json::Value) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(value.to_string().as_bytes())
        .expect("write manifest");
    file
}

fn speech_manifest() -> serde_json::Value {
    json!({"modules": [
        {
            "name": "speech_extra",
            "depends": ["speech"],
            "components": [
                {"inherit": "foo", "attributes": {"volume": 11}}
            ]
        },
        {
            "name": "speech",
            "depends": ["component"],
            "components": [
                {"name": "speech.base", "abstract": true, "collection": "coll"},
                {"name": "foo", "inherit": "speech.base", "apply_on": "res.users",
                 "usage": "speak", "attributes": {"volume": 3, "lang": "en"}},
                {"name": "bar", "inherit": "speech.base", "apply_on": ["res.users"],
                 "usage": "yell"}
            ]
        }
    ]})
}

#[test]
fn manifest_composes_into_registry() {
    let file = write_manifest(&speech_manifest());
    let set = load_manifest(file.path()).expect("load");
    let order: Vec<_> = set.modules().map(|(id, _)| id.as_str()).collect();
    assert_eq!(order, vec!["component", "speech", "speech_extra"]);

    let registry = rebuild(&set, &RegistryConfig::default()).expect("rebuild");
    let names: Vec<_> = registry.names().collect();
    assert_eq!(names, vec!["base", "speech.base", "foo", "bar"]);

    let foo = registry.get("foo").expect("foo");
    assert_eq!(foo.collection(), Some("coll"));
    assert_eq!(foo.usage(), Some("speak"));
    assert!(!foo.is_abstract());
    assert!(registry.get("speech.base").expect("base").is_abstract());
}

#[test]
fn extension_attributes_override_from_dependent_module() {
    let file = write_manifest(&speech_manifest());
    let set = load_manifest(file.path()).expect("load");
    let registry = rebuild(&set, &RegistryConfig::default()).expect("rebuild");

    let work = WorkContext::builder(Arc::new(NamedCollection::new("coll")), "res.users")
        .registry(Arc::new(registry))
        .build();
    let foo = work.resolve_one(Some("speak"), None).expect("foo");
    assert_eq!(foo.name(), "foo");
    assert_eq!(foo.attr("volume").expect("volume"), json!(11));
    assert_eq!(foo.attr("lang").expect("lang"), json!("en"));
}

#[test]
fn composition_errors_surface_after_loading() {
    let manifest = json!({"modules": [
        {"name": "a", "components": [{"name": "dup"}]},
        {"name": "b", "components": [{"name": "dup"}]}
    ]});
    let file = write_manifest(&manifest);
    let set = load_manifest(file.path()).expect("load");
    let err = rebuild(&set, &RegistryConfig::default()).unwrap_err();
    assert!(err.is_build_error());
    assert!(err.to_string().contains("'dup'"), "got: {err}");
}

#[test]
fn empty_manifest_only_has_base() {
    let file = write_manifest(&json!({}));
    let set = load_manifest(file.path()).expect("load");
    let registry = rebuild(&set, &RegistryConfig::default()).expect("rebuild");
    assert_eq!(registry.names().collect::<Vec<_>>(), vec!["base"]);
}
