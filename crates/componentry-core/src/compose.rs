//! Composition of declarations into component types.
//!
//! Declarations are replayed one at a time, in module load order then
//! source order, against a registry being built. Each one either extends an
//! existing component in place (it lists the component as its own parent)
//! or derives a new named component from its parents. Every component other
//! than the universal base implicitly inherits from the base.
//!
//! Parents must be composed before their children: the caller owns the
//! processing order.

use std::sync::Arc;

use componentry_common::config::RegistryConfig;
use componentry_common::constants::BASE_COMPONENT;
use componentry_common::error::{ComponentError, Result};
use componentry_common::types::ModuleId;
use indexmap::{IndexMap, IndexSet};
use serde_json::Value;

use crate::component_type::{Base, ComponentType};
use crate::declaration::{Declaration, DeclarationSet, Member};
use crate::linearize::{BaseGraph, linearize};
use crate::registry::ComponentRegistry;

#[derive(Debug, Default)]
struct Node {
    bases: Vec<Base>,
    children: IndexSet<String>,
    metadata: IndexMap<String, Value>,
}

/// Mutable view handed to compose hooks.
pub struct ComposedView<'a> {
    name: &'a str,
    linearization: &'a [Arc<Declaration>],
    metadata: &'a mut IndexMap<String, Value>,
}

impl ComposedView<'_> {
    /// Name of the component just composed.
    #[must_use]
    pub const fn name(&self) -> &str {
        self.name
    }

    /// Contributing declarations, highest priority first.
    #[must_use]
    pub const fn linearization(&self) -> &[Arc<Declaration>] {
        self.linearization
    }

    /// Every definition of the attribute `member`, highest priority first.
    #[must_use]
    pub fn attribute_chain(&self, member: &str) -> Vec<&Value> {
        self.linearization
            .iter()
            .filter_map(|decl| match decl.member(member) {
                Some(Member::Attribute(value)) => Some(value),
                _ => None,
            })
            .collect()
    }

    /// Metadata recorded so far on this component.
    #[must_use]
    pub const fn metadata(&self) -> &IndexMap<String, Value> {
        self.metadata
    }

    /// Records a metadata entry, returning the previous value.
    pub fn set_metadata(
        &mut self,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> Option<Value> {
        self.metadata.insert(key.into(), value.into())
    }
}

/// Incrementally composes declarations into component types.
#[derive(Debug, Default)]
pub struct ComponentBuilder {
    nodes: IndexMap<String, Node>,
    config: RegistryConfig,
}

impl BaseGraph for ComponentBuilder {
    fn bases_of(&self, name: &str) -> Option<&[Base]> {
        self.nodes.get(name).map(|node| node.bases.as_slice())
    }
}

impl ComponentBuilder {
    /// Creates an empty builder for a registry with the given configuration.
    #[must_use]
    pub fn new(config: RegistryConfig) -> Self {
        Self {
            nodes: IndexMap::new(),
            config,
        }
    }

    /// Returns whether `name` has been composed so far.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.nodes.contains_key(name)
    }

    /// Composes one declaration contributed by `module` and returns the
    /// name of the component it composed into.
    ///
    /// # Errors
    ///
    /// - [`ComponentError::DuplicateComponent`] if the declared name exists.
    /// - [`ComponentError::MissingName`] if there is no name and not exactly
    ///   one parent.
    /// - [`ComponentError::UnknownParent`] if a parent, or the component
    ///   extended in place, is not composed yet.
    /// - [`ComponentError::InconsistentHierarchy`] if the bases cannot be
    ///   linearized.
    /// - Any error returned by the compose hook.
    pub fn build(&mut self, module: &ModuleId, declaration: &Arc<Declaration>) -> Result<String> {
        if let Some(declared) = declaration.declared_name() {
            if self.nodes.contains_key(declared) {
                return Err(ComponentError::DuplicateComponent {
                    name: declared.to_string(),
                    module: module.to_string(),
                });
            }
        }
        let name = declaration
            .target_name()
            .ok_or_else(|| ComponentError::MissingName {
                module: module.to_string(),
            })?
            .to_string();

        let mut parents = declaration.parents().to_vec();
        if name != BASE_COMPONENT {
            parents.push(BASE_COMPONENT.to_string());
        }
        if let Some(missing) = parents.iter().find(|p| !self.nodes.contains_key(*p)) {
            return Err(ComponentError::UnknownParent {
                name,
                parent: missing.clone(),
            });
        }

        let in_place = parents.contains(&name);
        let mut bases = vec![Base::Declaration(Arc::clone(declaration))];
        for parent in &parents {
            if *parent == name {
                let previous = self.nodes[parent].bases.clone();
                for base in previous {
                    push_last(&mut bases, base);
                }
            } else {
                push_last(&mut bases, Base::Component(parent.clone()));
                let _ = self.nodes[parent].children.insert(name.clone());
            }
        }
        self.nodes.entry(name.clone()).or_default().bases = bases;

        let linearization = linearize(&*self, &name)?;
        let hook = linearization
            .declarations
            .iter()
            .find_map(|decl| decl.compose_hook().cloned());
        if let Some(hook) = hook {
            let node = self.nodes.entry(name.clone()).or_default();
            let mut view = ComposedView {
                name: &name,
                linearization: &linearization.declarations,
                metadata: &mut node.metadata,
            };
            hook(&mut view)?;
        }

        tracing::debug!(
            component = %name,
            module = %module,
            in_place,
            declarations = linearization.declarations.len(),
            "component composed"
        );
        Ok(name)
    }

    /// Seals every composed component into an immutable registry.
    ///
    /// Linearizations are recomputed against the final state, so a
    /// component derived from a parent that was later extended in place
    /// sees the extension.
    ///
    /// # Errors
    ///
    /// Returns [`ComponentError::InconsistentHierarchy`] if a component can
    /// no longer be linearized.
    pub fn finish(self) -> Result<ComponentRegistry> {
        let mut components = IndexMap::with_capacity(self.nodes.len());
        for (name, node) in &self.nodes {
            let linearization = linearize(&self, name)?;
            let component = ComponentType::new(
                name.clone(),
                node.bases.clone(),
                linearization,
                node.children.clone(),
                node.metadata.clone(),
            );
            let _ = components.insert(name.clone(), Arc::new(component));
        }
        Ok(ComponentRegistry::from_parts(components, self.config))
    }
}

/// Inserts `base` at the end of `bases`, dropping an earlier occurrence.
fn push_last(bases: &mut Vec<Base>, base: Base) {
    bases.retain(|existing| !existing.same_as(&base));
    bases.push(base);
}

/// Builds a fresh registry from every declaration in `set`.
///
/// Nothing from a previous build is reused: the result is a pure function
/// of the declaration set and configuration.
///
/// # Errors
///
/// Returns the first composition error; see [`ComponentBuilder::build`].
pub fn rebuild(set: &DeclarationSet, config: &RegistryConfig) -> Result<ComponentRegistry> {
    let mut builder = ComponentBuilder::new(config.clone());
    for (module, declarations) in set.modules() {
        for declaration in declarations {
            let _ = builder.build(module, declaration)?;
        }
    }
    let registry = builder.finish()?;
    tracing::info!(
        components = registry.len(),
        declarations = set.len(),
        "component registry rebuilt"
    );
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn base_set() -> DeclarationSet {
        DeclarationSet::with_base()
    }

    fn declared(component: &ComponentType) -> Vec<Option<&str>> {
        component
            .linearization()
            .iter()
            .map(|d| d.declared_name())
            .collect()
    }

    #[test]
    fn new_component_inherits_base() {
        let mut set = base_set();
        set.declare("m", Declaration::component().name("a"));
        let registry = rebuild(&set, &RegistryConfig::default()).expect("rebuild");

        let a = registry.get("a").expect("a");
        assert_eq!(a.ancestors(), ["base"]);
        assert_eq!(declared(a), vec![Some("a"), Some("base")]);
        let base = registry.get("base").expect("base");
        assert!(base.children().contains("a"));
    }

    #[test]
    fn extension_takes_priority_over_previous_declarations() {
        let mut set = base_set();
        set.declare(
            "m1",
            Declaration::component().name("a").attribute("greeting", "hello"),
        );
        set.declare("m2", Declaration::extend("a").attribute("greeting", "hi"));
        let registry = rebuild(&set, &RegistryConfig::default()).expect("rebuild");

        let a = registry.get("a").expect("a");
        assert_eq!(declared(a), vec![None, Some("a"), Some("base")]);
        let (pos, member) = a.find_member("greeting", 0).expect("greeting");
        assert_eq!(pos, 0);
        assert!(matches!(member, Member::Attribute(v) if v == &json!("hi")));
        let (pos, _) = a.find_member("greeting", 1).expect("shadowed greeting");
        assert_eq!(pos, 1);
    }

    #[test]
    fn extension_keeps_registry_position() {
        let mut set = base_set();
        set.declare("m", Declaration::component().name("a"));
        set.declare("m", Declaration::component().name("b"));
        set.declare("m", Declaration::extend("a"));
        let registry = rebuild(&set, &RegistryConfig::default()).expect("rebuild");

        let names: Vec<_> = registry.names().collect();
        assert_eq!(names, vec!["base", "a", "b"]);
    }

    #[test]
    fn derivation_records_child_and_leaves_parent_alone() {
        let mut set = base_set();
        set.declare("m", Declaration::component().name("a").usage("speak"));
        set.declare(
            "m",
            Declaration::component()
                .name("b")
                .inherit("a")
                .attribute("only_b", true),
        );
        set.declare("m", Declaration::extend("b").usage("yell"));
        let registry = rebuild(&set, &RegistryConfig::default()).expect("rebuild");

        let a = registry.get("a").expect("a");
        let b = registry.get("b").expect("b");
        assert!(a.children().contains("b"));
        assert_eq!(a.usage(), Some("speak"));
        assert!(a.find_member("only_b", 0).is_none());
        assert_eq!(b.usage(), Some("yell"));
        assert_eq!(b.ancestors(), ["a", "base"]);
    }

    #[test]
    fn derived_component_sees_later_parent_extension() {
        let mut set = base_set();
        set.declare("m1", Declaration::component().name("a"));
        set.declare("m1", Declaration::component().name("b").inherit("a"));
        set.declare("m2", Declaration::extend("a").attribute("late", 1));
        let registry = rebuild(&set, &RegistryConfig::default()).expect("rebuild");

        let b = registry.get("b").expect("b");
        assert!(b.find_member("late", 0).is_some());
        assert_eq!(declared(b), vec![Some("b"), None, Some("a"), Some("base")]);
    }

    #[test]
    fn derived_component_inherits_collection() {
        let mut set = base_set();
        set.declare(
            "m",
            Declaration::abstract_component()
                .name("backend.base")
                .collection("backend"),
        );
        set.declare(
            "m",
            Declaration::component()
                .name("backend.importer")
                .inherit("backend.base")
                .usage("importer"),
        );
        let registry = rebuild(&set, &RegistryConfig::default()).expect("rebuild");

        let importer = registry.get("backend.importer").expect("importer");
        assert_eq!(importer.collection(), Some("backend"));
        assert!(!importer.is_abstract());
        assert!(registry.get("backend.base").expect("base").is_abstract());
    }

    #[test]
    fn duplicate_name_is_rejected() {
        let mut set = base_set();
        set.declare("m1", Declaration::component().name("foo"));
        set.declare("m2", Declaration::component().name("foo"));

        let err = rebuild(&set, &RegistryConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            ComponentError::DuplicateComponent { ref name, ref module }
                if name == "foo" && module == "m2"
        ));
    }

    #[test]
    fn missing_name_is_rejected() {
        let mut set = base_set();
        set.declare("m", Declaration::component().name("a"));
        set.declare("m", Declaration::component().name("b"));
        set.declare("m", Declaration::component().inherits(["a", "b"]));

        let err = rebuild(&set, &RegistryConfig::default()).unwrap_err();
        assert!(matches!(err, ComponentError::MissingName { .. }));
    }

    #[test]
    fn unknown_parent_is_rejected() {
        let mut set = base_set();
        set.declare("m", Declaration::component().name("a").inherit("ghost"));

        let err = rebuild(&set, &RegistryConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            ComponentError::UnknownParent { ref name, ref parent }
                if name == "a" && parent == "ghost"
        ));
    }

    #[test]
    fn extending_unknown_component_is_rejected() {
        let mut set = base_set();
        set.declare("m", Declaration::extend("ghost"));

        let err = rebuild(&set, &RegistryConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            ComponentError::UnknownParent { ref parent, .. } if parent == "ghost"
        ));
    }

    #[test]
    fn missing_base_is_reported_as_unknown_parent() {
        let mut set = DeclarationSet::new();
        set.declare("m", Declaration::component().name("a"));

        let err = rebuild(&set, &RegistryConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            ComponentError::UnknownParent { ref parent, .. } if parent == BASE_COMPONENT
        ));
    }

    #[test]
    fn compose_hook_is_inherited_and_rerun_on_extension() {
        let mut set = base_set();
        set.declare(
            "m",
            Declaration::abstract_component()
                .name("mapper")
                .on_composed(|view| {
                    let fields: Vec<Value> = view
                        .attribute_chain("direct")
                        .into_iter()
                        .filter_map(Value::as_array)
                        .flatten()
                        .cloned()
                        .collect();
                    let _ = view.set_metadata("fields", fields);
                    Ok(())
                }),
        );
        set.declare(
            "m",
            Declaration::component()
                .name("partner.mapper")
                .inherit("mapper")
                .attribute("direct", json!(["name"])),
        );
        set.declare(
            "m",
            Declaration::extend("partner.mapper").attribute("direct", json!(["email"])),
        );
        let registry = rebuild(&set, &RegistryConfig::default()).expect("rebuild");

        let mapper = registry.get("partner.mapper").expect("mapper");
        assert_eq!(mapper.metadata()["fields"], json!(["email", "name"]));
    }

    #[test]
    fn compose_hook_error_aborts_build() {
        let mut set = base_set();
        set.declare(
            "m",
            Declaration::component()
                .name("picky")
                .on_composed(|view| Err(ComponentError::behavior(view.name(), "rejected"))),
        );

        let err = rebuild(&set, &RegistryConfig::default()).unwrap_err();
        assert!(err.to_string().contains("rejected"));
    }

    #[test]
    fn multiple_parents_are_linearized_in_priority_order() {
        let mut set = base_set();
        set.declare("m", Declaration::component().name("a").attribute("who", "a"));
        set.declare("m", Declaration::component().name("b").attribute("who", "b"));
        set.declare("m", Declaration::component().name("c").inherits(["a", "b"]));
        let registry = rebuild(&set, &RegistryConfig::default()).expect("rebuild");

        let c = registry.get("c").expect("c");
        assert_eq!(c.ancestors(), ["a", "b", "base"]);
        assert!(c.is_a("b"));
        let (pos, _) = c.find_member("who", 0).expect("who");
        assert_eq!(c.linearization()[pos].declared_name(), Some("a"));
        assert!(registry.get("a").expect("a").children().contains("c"));
        assert!(registry.get("b").expect("b").children().contains("c"));
    }

    #[test]
    fn builder_reports_composed_name() {
        let mut builder = ComponentBuilder::new(RegistryConfig::default());
        let module = ModuleId::new("m");
        let base = Arc::new(Declaration::base());
        let ext = Arc::new(Declaration::extend(BASE_COMPONENT));

        assert_eq!(builder.build(&module, &base).expect("base"), BASE_COMPONENT);
        assert_eq!(builder.build(&module, &ext).expect("extension"), BASE_COMPONENT);
        assert!(builder.contains(BASE_COMPONENT));

        let registry = builder.finish().expect("finish");
        let base = registry.get(BASE_COMPONENT).expect("base");
        assert!(base.ancestors().is_empty());
        assert_eq!(base.linearization().len(), 2);
        // A concrete extension makes the base concrete.
        assert!(!base.is_abstract());
    }
}
