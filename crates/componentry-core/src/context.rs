//! Work contexts propagated through chained resolutions.
//!
//! A [`WorkContext`] carries the collection being worked on, the current
//! entity type, the registry to resolve against, and arbitrary extra
//! attributes. It is never mutated: pivoting to another entity type derives
//! a new context that shares the collection, registry, and extras.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use componentry_common::error::Result;
use indexmap::IndexMap;

use crate::component::Component;
use crate::registry::{self, ComponentRegistry};
use crate::resolve::Resolver;

/// The only capability the core needs from a host collection.
pub trait CollectionHandle: fmt::Debug + Send + Sync {
    /// Stable name of the collection, matched against component collections.
    fn collection_name(&self) -> &str;
}

/// A collection known only by its name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedCollection {
    name: String,
}

impl NamedCollection {
    /// Creates a collection handle from its name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl CollectionHandle for NamedCollection {
    fn collection_name(&self) -> &str {
        &self.name
    }
}

type ExtraValue = Arc<dyn Any + Send + Sync>;

/// Caller-defined attributes carried by a context.
#[derive(Clone, Default)]
pub struct Extras {
    values: IndexMap<String, ExtraValue>,
}

impl Extras {
    /// Returns the attribute `key` if it holds a `T`.
    #[must_use]
    pub fn get<T: Any>(&self, key: &str) -> Option<&T> {
        self.values.get(key)?.downcast_ref::<T>()
    }

    /// Returns whether an attribute named `key` exists.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Iterates over attribute names in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Number of attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` when no attribute is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Debug for Extras {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.values.keys()).finish()
    }
}

/// Context threaded through every resolution of a chain.
#[derive(Debug, Clone)]
pub struct WorkContext {
    collection: Arc<dyn CollectionHandle>,
    entity_type: String,
    registry: Arc<ComponentRegistry>,
    extra: Arc<Extras>,
}

impl WorkContext {
    /// Creates a context resolving against the process-wide registry.
    #[must_use]
    pub fn new(collection: Arc<dyn CollectionHandle>, entity_type: impl Into<String>) -> Self {
        Self::builder(collection, entity_type).build()
    }

    /// Starts a context with an explicit registry or extra attributes.
    #[must_use]
    pub fn builder(
        collection: Arc<dyn CollectionHandle>,
        entity_type: impl Into<String>,
    ) -> WorkContextBuilder {
        WorkContextBuilder {
            collection,
            entity_type: entity_type.into(),
            registry: None,
            extra: Extras::default(),
        }
    }

    /// Collection handle being worked on.
    #[must_use]
    pub fn collection(&self) -> &Arc<dyn CollectionHandle> {
        &self.collection
    }

    /// Name of the collection being worked on.
    #[must_use]
    pub fn collection_name(&self) -> &str {
        self.collection.collection_name()
    }

    /// Entity type resolutions target by default.
    #[must_use]
    pub fn entity_type(&self) -> &str {
        &self.entity_type
    }

    /// Registry resolutions run against.
    #[must_use]
    pub const fn registry(&self) -> &Arc<ComponentRegistry> {
        &self.registry
    }

    /// Extra attributes propagated to derived contexts.
    #[must_use]
    pub fn extra(&self) -> &Extras {
        &self.extra
    }

    /// Shortcut for `self.extra().get(key)`.
    #[must_use]
    pub fn get<T: Any>(&self, key: &str) -> Option<&T> {
        self.extra.get(key)
    }

    /// Derives a context for another entity type, keeping the collection,
    /// registry, and extra attributes.
    #[must_use]
    pub fn derive(&self, entity_type: impl Into<String>) -> Self {
        Self {
            collection: Arc::clone(&self.collection),
            entity_type: entity_type.into(),
            registry: Arc::clone(&self.registry),
            extra: Arc::clone(&self.extra),
        }
    }

    /// Returns the resolution engine bound to this context.
    #[must_use]
    pub const fn resolver(&self) -> Resolver<'_> {
        Resolver::new(self)
    }

    /// Resolves a component by name; see [`Resolver::by_name`].
    ///
    /// # Errors
    ///
    /// Returns `NoComponent` if the name is unknown or does not apply to the
    /// entity type.
    pub fn resolve_by_name(&self, name: &str, entity_type: Option<&str>) -> Result<Component> {
        self.resolver().by_name(name, entity_type)
    }

    /// Resolves the single component matching the criteria; see
    /// [`Resolver::one`].
    ///
    /// # Errors
    ///
    /// Returns `NoComponent` when nothing matches and `AmbiguousComponent`
    /// when several components match.
    pub fn resolve_one(&self, usage: Option<&str>, entity_type: Option<&str>) -> Result<Component> {
        self.resolver().one(usage, entity_type)
    }

    /// Resolves every component matching the criteria; see
    /// [`Resolver::many`].
    #[must_use]
    pub fn resolve_many(&self, usage: Option<&str>, entity_type: Option<&str>) -> Vec<Component> {
        self.resolver().many(usage, entity_type)
    }
}

impl fmt::Display for WorkContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "WorkContext({}, {})",
            self.collection_name(),
            self.entity_type
        )
    }
}

/// Builder for a [`WorkContext`].
#[derive(Debug)]
pub struct WorkContextBuilder {
    collection: Arc<dyn CollectionHandle>,
    entity_type: String,
    registry: Option<Arc<ComponentRegistry>>,
    extra: Extras,
}

impl WorkContextBuilder {
    /// Resolves against `registry` instead of the process-wide one.
    #[must_use]
    pub fn registry(mut self, registry: Arc<ComponentRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Adds an extra attribute.
    #[must_use]
    pub fn extra<T: Any + Send + Sync>(mut self, key: impl Into<String>, value: T) -> Self {
        let _ = self.extra.values.insert(key.into(), Arc::new(value));
        self
    }

    /// Builds the context. Without an explicit registry, the process-wide
    /// registry published at this moment is used.
    #[must_use]
    pub fn build(self) -> WorkContext {
        WorkContext {
            collection: self.collection,
            entity_type: self.entity_type,
            registry: self
                .registry
                .unwrap_or_else(|| registry::global().snapshot()),
            extra: Arc::new(self.extra),
        }
    }
}
