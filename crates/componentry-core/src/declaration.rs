//! Component declarations: the authored units that composition merges.
//!
//! A declaration is pure data. It names the component it creates (or
//! extends), lists its parents in priority order, carries the lookup
//! criteria (collection, entity types, usage), and holds a member table of
//! methods and attributes. Declarations are grouped per module in a
//! [`DeclarationSet`], in module load order then source order.

use std::fmt;
use std::sync::Arc;

use componentry_common::constants::{BASE_COMPONENT, BASE_MODULE};
use componentry_common::error::Result;
use componentry_common::types::{ApplyOn, ModuleId};
use indexmap::IndexMap;
use serde_json::Value;

use crate::component::Call;
use crate::compose::ComposedView;

/// Signature of a component method.
///
/// The [`Call`] gives access to the component instance and to the next
/// definition of the same member further down the linearization.
pub type MethodFn = dyn Fn(&Call<'_>, Value) -> Result<Value> + Send + Sync;

/// Signature of the hook run after a component has been composed.
pub type ComposeHook = dyn Fn(&mut ComposedView<'_>) -> Result<()> + Send + Sync;

/// A named member contributed by a declaration.
#[derive(Clone)]
pub enum Member {
    /// Callable behaviour.
    Method(Arc<MethodFn>),
    /// Plain data attribute.
    Attribute(Value),
}

impl fmt::Debug for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Method(_) => f.write_str("Method(..)"),
            Self::Attribute(value) => f.debug_tuple("Attribute").field(value).finish(),
        }
    }
}

/// One unit of authored component behaviour.
#[derive(Clone)]
pub struct Declaration {
    name: Option<String>,
    parents: Vec<String>,
    collection: Option<String>,
    apply_on: Option<ApplyOn>,
    usage: Option<String>,
    is_abstract: bool,
    members: IndexMap<String, Member>,
    on_composed: Option<Arc<ComposeHook>>,
}

impl Declaration {
    /// Starts a concrete declaration, resolvable by criteria once composed.
    #[must_use]
    pub fn component() -> Self {
        Self::with_abstract(false)
    }

    /// Starts an abstract declaration, only usable as a parent.
    #[must_use]
    pub fn abstract_component() -> Self {
        Self::with_abstract(true)
    }

    /// Starts a concrete declaration extending `parent` in place.
    #[must_use]
    pub fn extend(parent: impl Into<String>) -> Self {
        Self::component().inherit(parent)
    }

    /// The universal base component every component inherits from.
    #[must_use]
    pub fn base() -> Self {
        Self::abstract_component().name(BASE_COMPONENT)
    }

    fn with_abstract(is_abstract: bool) -> Self {
        Self {
            name: None,
            parents: Vec::new(),
            collection: None,
            apply_on: None,
            usage: None,
            is_abstract,
            members: IndexMap::new(),
            on_composed: None,
        }
    }

    /// Sets the name of the component this declaration creates.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Appends a parent. Earlier parents take priority.
    #[must_use]
    pub fn inherit(mut self, parent: impl Into<String>) -> Self {
        self.parents.push(parent.into());
        self
    }

    /// Appends several parents, in priority order.
    #[must_use]
    pub fn inherits<I, S>(mut self, parents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.parents.extend(parents.into_iter().map(Into::into));
        self
    }

    /// Scopes the component to a collection.
    #[must_use]
    pub fn collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = Some(collection.into());
        self
    }

    /// Restricts the component to one or several entity types.
    #[must_use]
    pub fn apply_on(mut self, apply_on: impl Into<ApplyOn>) -> Self {
        self.apply_on = Some(apply_on.into());
        self
    }

    /// Sets the usage tag used by criteria lookups.
    #[must_use]
    pub fn usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = Some(usage.into());
        self
    }

    /// Adds a method.
    #[must_use]
    pub fn method<F>(mut self, name: impl Into<String>, method: F) -> Self
    where
        F: Fn(&Call<'_>, Value) -> Result<Value> + Send + Sync + 'static,
    {
        let _ = self.members.insert(name.into(), Member::Method(Arc::new(method)));
        self
    }

    /// Adds a data attribute.
    #[must_use]
    pub fn attribute(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        let _ = self
            .members
            .insert(name.into(), Member::Attribute(value.into()));
        self
    }

    /// Installs the hook run each time a component inheriting this
    /// declaration is composed.
    #[must_use]
    pub fn on_composed<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut ComposedView<'_>) -> Result<()> + Send + Sync + 'static,
    {
        self.on_composed = Some(Arc::new(hook));
        self
    }

    /// Returns the declared name, if any.
    #[must_use]
    pub fn declared_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the declared parents, in priority order.
    #[must_use]
    pub fn parents(&self) -> &[String] {
        &self.parents
    }

    /// Returns the declared collection, if any.
    #[must_use]
    pub fn declared_collection(&self) -> Option<&str> {
        self.collection.as_deref()
    }

    /// Returns the declared entity-type restriction, if any.
    #[must_use]
    pub const fn declared_apply_on(&self) -> Option<&ApplyOn> {
        self.apply_on.as_ref()
    }

    /// Returns the declared usage, if any.
    #[must_use]
    pub fn declared_usage(&self) -> Option<&str> {
        self.usage.as_deref()
    }

    /// Returns whether this declaration is abstract.
    #[must_use]
    pub const fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    /// Looks up a member defined by this declaration.
    #[must_use]
    pub fn member(&self, name: &str) -> Option<&Member> {
        self.members.get(name)
    }

    /// Iterates over member names in declaration order.
    pub fn member_names(&self) -> impl Iterator<Item = &str> {
        self.members.keys().map(String::as_str)
    }

    pub(crate) fn compose_hook(&self) -> Option<&Arc<ComposeHook>> {
        self.on_composed.as_ref()
    }

    /// The component name this declaration composes into: its own name, or
    /// its single parent when it extends in place.
    #[must_use]
    pub fn target_name(&self) -> Option<&str> {
        match (&self.name, self.parents.as_slice()) {
            (Some(name), _) => Some(name),
            (None, [single]) => Some(single),
            (None, _) => None,
        }
    }
}

impl fmt::Debug for Declaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Declaration")
            .field("name", &self.name)
            .field("parents", &self.parents)
            .field("collection", &self.collection)
            .field("apply_on", &self.apply_on)
            .field("usage", &self.usage)
            .field("is_abstract", &self.is_abstract)
            .field("members", &self.members.keys().collect::<Vec<_>>())
            .field("on_composed", &self.on_composed.is_some())
            .finish()
    }
}

/// Declarations grouped by module, in module load order.
#[derive(Debug, Clone, Default)]
pub struct DeclarationSet {
    modules: IndexMap<ModuleId, Vec<Arc<Declaration>>>,
}

impl DeclarationSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a set whose first module contributes the universal base.
    #[must_use]
    pub fn with_base() -> Self {
        let mut set = Self::new();
        set.declare(ModuleId::new(BASE_MODULE), Declaration::base());
        set
    }

    /// Appends a declaration to a module. A module seen for the first time
    /// is placed after every module already in the set.
    pub fn declare(&mut self, module: impl Into<ModuleId>, declaration: Declaration) {
        self.modules
            .entry(module.into())
            .or_default()
            .push(Arc::new(declaration));
    }

    /// Appends several declarations to a module, in source order.
    pub fn declare_all<I>(&mut self, module: impl Into<ModuleId>, declarations: I)
    where
        I: IntoIterator<Item = Declaration>,
    {
        let entry = self.modules.entry(module.into()).or_default();
        entry.extend(declarations.into_iter().map(Arc::new));
    }

    /// Iterates over modules and their declarations in load order.
    pub fn modules(&self) -> impl Iterator<Item = (&ModuleId, &[Arc<Declaration>])> {
        self.modules.iter().map(|(id, decls)| (id, decls.as_slice()))
    }

    /// Returns the declarations of a single module.
    #[must_use]
    pub fn module(&self, id: &ModuleId) -> Option<&[Arc<Declaration>]> {
        self.modules.get(id).map(Vec::as_slice)
    }

    /// Total number of declarations across modules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.modules.values().map(Vec::len).sum()
    }

    /// Returns `true` when no module declares anything.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_name_prefers_declared_name() {
        let decl = Declaration::component().name("b").inherit("a");
        assert_eq!(decl.target_name(), Some("b"));
    }

    #[test]
    fn target_name_falls_back_to_single_parent() {
        assert_eq!(Declaration::extend("a").target_name(), Some("a"));
    }

    #[test]
    fn target_name_absent_with_several_parents() {
        let decl = Declaration::component().inherits(["a", "b"]);
        assert_eq!(decl.target_name(), None);
    }

    #[test]
    fn base_is_abstract_and_named() {
        let base = Declaration::base();
        assert!(base.is_abstract());
        assert_eq!(base.declared_name(), Some(BASE_COMPONENT));
        assert!(base.parents().is_empty());
    }

    #[test]
    fn set_keeps_module_then_source_order() {
        let mut set = DeclarationSet::with_base();
        set.declare("sale", Declaration::component().name("s1"));
        set.declare("stock", Declaration::component().name("t1"));
        set.declare("sale", Declaration::component().name("s2"));

        let order: Vec<_> = set.modules().map(|(id, _)| id.as_str()).collect();
        assert_eq!(order, vec![BASE_MODULE, "sale", "stock"]);

        let sale = set.module(&ModuleId::new("sale")).expect("sale module");
        let names: Vec<_> = sale.iter().filter_map(|d| d.declared_name()).collect();
        assert_eq!(names, vec!["s1", "s2"]);
        assert_eq!(set.len(), 4);
    }

    #[test]
    fn members_keep_declaration_order() {
        let decl = Declaration::component()
            .name("mapper")
            .attribute("direct", vec!["name", "email"])
            .method("map", |_, args| Ok(args));
        let names: Vec<_> = decl.member_names().collect();
        assert_eq!(names, vec!["direct", "map"]);
        assert!(matches!(decl.member("map"), Some(Member::Method(_))));
    }
}
