//! Composed component types: the merged result of every declaration
//! contributing to one component name.

use std::sync::Arc;

use componentry_common::types::ApplyOn;
use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use serde_json::Value;

use crate::declaration::{Declaration, Member};
use crate::linearize::Linearization;

/// A direct base of a composed component.
#[derive(Debug, Clone)]
pub enum Base {
    /// Behaviour authored in a declaration.
    Declaration(Arc<Declaration>),
    /// Another composed component, referenced by name.
    Component(String),
}

impl Base {
    /// Returns the referenced component name, if this base is a component.
    #[must_use]
    pub fn component_name(&self) -> Option<&str> {
        match self {
            Self::Component(name) => Some(name),
            Self::Declaration(_) => None,
        }
    }

    pub(crate) fn same_as(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Component(a), Self::Component(b)) => a == b,
            (Self::Declaration(a), Self::Declaration(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// A fully composed component, immutable once the registry is published.
#[derive(Debug)]
pub struct ComponentType {
    name: String,
    bases: Vec<Base>,
    linearization: Vec<Arc<Declaration>>,
    ancestors: Vec<String>,
    children: IndexSet<String>,
    collection: Option<String>,
    usage: Option<String>,
    apply_on: Option<Vec<String>>,
    is_abstract: bool,
    metadata: IndexMap<String, Value>,
}

impl ComponentType {
    pub(crate) fn new(
        name: String,
        bases: Vec<Base>,
        linearization: Linearization,
        children: IndexSet<String>,
        metadata: IndexMap<String, Value>,
    ) -> Self {
        let declarations = linearization.declarations;
        let collection = first_declared(&declarations, |d| {
            d.declared_collection().map(str::to_string)
        });
        let usage = first_declared(&declarations, |d| d.declared_usage().map(str::to_string));
        let apply_on = first_declared(&declarations, |d| {
            d.declared_apply_on().map(ApplyOn::entity_types)
        });
        let is_abstract = declarations.iter().all(|d| d.is_abstract());
        let ancestors = linearization.components.into_iter().skip(1).collect();

        Self {
            name,
            bases,
            linearization: declarations,
            ancestors,
            children,
            collection,
            usage,
            apply_on,
            is_abstract,
            metadata,
        }
    }

    /// Component name, unique within its registry.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Direct bases, highest priority first.
    #[must_use]
    pub fn bases(&self) -> &[Base] {
        &self.bases
    }

    /// Every contributing declaration in member resolution order.
    #[must_use]
    pub fn linearization(&self) -> &[Arc<Declaration>] {
        &self.linearization
    }

    /// Composed components this one inherits from, in resolution order.
    #[must_use]
    pub fn ancestors(&self) -> &[String] {
        &self.ancestors
    }

    /// Names of the components derived from this one.
    #[must_use]
    pub const fn children(&self) -> &IndexSet<String> {
        &self.children
    }

    /// Collection the component is scoped to; `None` means every collection.
    #[must_use]
    pub fn collection(&self) -> Option<&str> {
        self.collection.as_deref()
    }

    /// Usage tag for criteria lookups.
    #[must_use]
    pub fn usage(&self) -> Option<&str> {
        self.usage.as_deref()
    }

    /// Entity types the component is restricted to; `None` means any.
    #[must_use]
    pub fn apply_on(&self) -> Option<&[String]> {
        self.apply_on.as_deref()
    }

    /// Abstract components are never returned by criteria lookups.
    #[must_use]
    pub const fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    /// Metadata recorded by compose hooks.
    #[must_use]
    pub const fn metadata(&self) -> &IndexMap<String, Value> {
        &self.metadata
    }

    /// Returns whether the component can be used for `entity_type`.
    #[must_use]
    pub fn applies_to(&self, entity_type: Option<&str>) -> bool {
        self.apply_on.as_ref().is_none_or(|entities| {
            entity_type.is_some_and(|entity| entities.iter().any(|e| e == entity))
        })
    }

    /// Returns whether this component is `name` or inherits from it.
    #[must_use]
    pub fn is_a(&self, name: &str) -> bool {
        self.name == name || self.ancestors.iter().any(|a| a == name)
    }

    /// Finds the first definition of `member` at or after position `from`
    /// in the linearization.
    #[must_use]
    pub fn find_member(&self, member: &str, from: usize) -> Option<(usize, &Member)> {
        self.linearization
            .iter()
            .enumerate()
            .skip(from)
            .find_map(|(pos, decl)| decl.member(member).map(|m| (pos, m)))
    }

    /// Returns a serializable description of the component.
    #[must_use]
    pub fn summary(&self) -> ComponentSummary {
        ComponentSummary {
            name: self.name.clone(),
            bases: self
                .bases
                .iter()
                .map(|base| match base {
                    Base::Component(name) => name.clone(),
                    Base::Declaration(decl) => decl
                        .declared_name()
                        .map_or_else(|| format!("<extension of {}>", self.name), str::to_string),
                })
                .collect(),
            ancestors: self.ancestors.clone(),
            children: self.children.iter().cloned().collect(),
            collection: self.collection.clone(),
            usage: self.usage.clone(),
            apply_on: self.apply_on.clone(),
            is_abstract: self.is_abstract,
            declarations: self.linearization.len(),
            metadata: self.metadata.clone(),
        }
    }
}

fn first_declared<T>(
    declarations: &[Arc<Declaration>],
    field: impl Fn(&Declaration) -> Option<T>,
) -> Option<T> {
    declarations.iter().find_map(|d| field(d))
}

/// Serializable description of a composed component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComponentSummary {
    /// Component name.
    pub name: String,
    /// Direct bases; declarations are shown by name.
    pub bases: Vec<String>,
    /// Inherited components in resolution order.
    pub ancestors: Vec<String>,
    /// Derived components.
    pub children: Vec<String>,
    /// Resolved collection.
    pub collection: Option<String>,
    /// Resolved usage.
    pub usage: Option<String>,
    /// Resolved entity types.
    pub apply_on: Option<Vec<String>>,
    /// Whether the component is abstract.
    pub is_abstract: bool,
    /// Number of contributing declarations.
    pub declarations: usize,
    /// Hook metadata.
    pub metadata: IndexMap<String, Value>,
}
