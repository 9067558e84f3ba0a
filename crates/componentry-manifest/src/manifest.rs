//! Manifest data model.
//!
//! A manifest lists modules, each with the modules it depends on and the
//! components it declares. Component entries are data only: they carry the
//! lookup criteria and plain attributes, never behaviour.

use componentry_common::types::ApplyOn;
use componentry_core::declaration::Declaration;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Root of a manifest file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    /// Modules in manifest order.
    #[serde(default)]
    pub modules: Vec<ModuleSpec>,
}

/// A module and the components it contributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModuleSpec {
    /// Module name, unique within the manifest.
    pub name: String,
    /// Modules that must be loaded before this one.
    #[serde(default)]
    pub depends: Vec<String>,
    /// Component declarations, in source order.
    #[serde(default)]
    pub components: Vec<ComponentSpec>,
}

/// Parents listed by a component entry: one name or several.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Inherit {
    /// A single parent.
    One(String),
    /// Several parents, highest priority first.
    Many(Vec<String>),
}

impl Inherit {
    /// Returns the parent names in priority order.
    #[must_use]
    pub fn names(&self) -> &[String] {
        match self {
            Self::One(name) => std::slice::from_ref(name),
            Self::Many(names) => names,
        }
    }
}

/// A data-only component declaration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ComponentSpec {
    /// Name of the component created; absent for an in-place extension.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Parent components.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inherit: Option<Inherit>,
    /// Collection the component is scoped to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection: Option<String>,
    /// Entity types the component is restricted to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apply_on: Option<ApplyOn>,
    /// Usage tag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<String>,
    /// Whether the declaration is abstract.
    #[serde(default, rename = "abstract")]
    pub is_abstract: bool,
    /// Data attributes exposed as members.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub attributes: IndexMap<String, Value>,
}

impl ComponentSpec {
    /// Converts the entry into a declaration.
    #[must_use]
    pub fn to_declaration(&self) -> Declaration {
        let mut decl = if self.is_abstract {
            Declaration::abstract_component()
        } else {
            Declaration::component()
        };
        if let Some(name) = &self.name {
            decl = decl.name(name.as_str());
        }
        if let Some(inherit) = &self.inherit {
            decl = decl.inherits(inherit.names().iter().map(String::as_str));
        }
        if let Some(collection) = &self.collection {
            decl = decl.collection(collection.as_str());
        }
        if let Some(apply_on) = &self.apply_on {
            decl = decl.apply_on(apply_on.clone());
        }
        if let Some(usage) = &self.usage {
            decl = decl.usage(usage.as_str());
        }
        for (key, value) in &self.attributes {
            decl = decl.attribute(key.as_str(), value.clone());
        }
        decl
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn inherit_accepts_string_or_list() {
        let one: ComponentSpec = serde_json::from_value(json!({"inherit": "base"})).expect("one");
        let many: ComponentSpec =
            serde_json::from_value(json!({"inherit": ["a", "b"]})).expect("many");
        assert_eq!(one.inherit.expect("inherit").names(), ["base"]);
        assert_eq!(many.inherit.expect("inherit").names(), ["a", "b"]);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let result: Result<ComponentSpec, _> =
            serde_json::from_value(json!({"name": "a", "_usage": "typo"}));
        assert!(result.is_err());
    }

    #[test]
    fn declaration_carries_every_field() {
        let spec: ComponentSpec = serde_json::from_str(
            r#"{
                "name": "foo",
                "inherit": ["speech.base"],
                "collection": "coll",
                "apply_on": "res.users",
                "usage": "speak",
                "abstract": true,
                "attributes": {"volume": 3, "lang": "en"}
            }"#,
        )
        .expect("spec");

        let decl = spec.to_declaration();
        assert_eq!(decl.declared_name(), Some("foo"));
        assert_eq!(decl.parents(), ["speech.base"]);
        assert_eq!(decl.declared_collection(), Some("coll"));
        assert_eq!(decl.declared_usage(), Some("speak"));
        assert_eq!(
            decl.declared_apply_on().map(ApplyOn::entity_types),
            Some(vec!["res.users".to_string()])
        );
        assert!(decl.is_abstract());
        assert_eq!(decl.member_names().collect::<Vec<_>>(), vec!["volume", "lang"]);
    }

    #[test]
    fn extension_entry_has_no_name() {
        let spec: ComponentSpec =
            serde_json::from_value(json!({"inherit": "foo", "usage": "yell"})).expect("spec");
        assert_eq!(spec.to_declaration().target_name(), Some("foo"));
    }
}
