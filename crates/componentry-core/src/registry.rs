//! Component registries and the process-wide registry.
//!
//! A [`ComponentRegistry`] is an immutable, insertion-ordered mapping from
//! component name to composed type. Modules loaded first have their
//! components found first. The process-wide [`GlobalRegistry`] publishes a
//! new registry with an atomic pointer swap, so readers observe either the
//! previous registry or the rebuilt one, never a partial state.

use std::sync::{Arc, OnceLock};

use arc_swap::ArcSwap;
use componentry_common::config::{RegistryConfig, UsageFallback};
use componentry_common::error::Result;
use indexmap::IndexMap;

use crate::compose;
use crate::component_type::ComponentType;
use crate::declaration::DeclarationSet;

/// Immutable registry of composed components.
#[derive(Debug, Default)]
pub struct ComponentRegistry {
    components: IndexMap<String, Arc<ComponentType>>,
    config: RegistryConfig,
}

impl ComponentRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) const fn from_parts(
        components: IndexMap<String, Arc<ComponentType>>,
        config: RegistryConfig,
    ) -> Self {
        Self { components, config }
    }

    /// Returns the component composed under `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Arc<ComponentType>> {
        self.components.get(name)
    }

    /// Returns whether a component named `name` exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.components.contains_key(name)
    }

    /// Number of composed components.
    #[must_use]
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Returns `true` if nothing has been composed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Iterates over components in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<ComponentType>> {
        self.components.values()
    }

    /// Iterates over component names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.components.keys().map(String::as_str)
    }

    /// Configuration this registry was built with.
    #[must_use]
    pub const fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Finds the components matching a collection, usage and entity type.
    ///
    /// Components without a collection are shared by every collection.
    /// Abstract components are never returned. When `usage` is given but no
    /// candidate declares it, the usage filter is dropped under
    /// [`UsageFallback::Unfiltered`] and the result is empty under
    /// [`UsageFallback::Strict`]. Components without an entity-type
    /// restriction match any `entity_type`; restricted ones only match an
    /// entity type they list. Results keep registration order.
    #[must_use]
    pub fn lookup(
        &self,
        collection_name: &str,
        usage: Option<&str>,
        entity_type: Option<&str>,
    ) -> Vec<Arc<ComponentType>> {
        let in_collection: Vec<&Arc<ComponentType>> = self
            .components
            .values()
            .filter(|c| c.collection().is_none_or(|coll| coll == collection_name))
            .filter(|c| !c.is_abstract())
            .collect();

        let candidates = match usage {
            None => in_collection,
            Some(usage) => {
                let by_usage: Vec<_> = in_collection
                    .iter()
                    .copied()
                    .filter(|c| c.usage() == Some(usage))
                    .collect();
                if !by_usage.is_empty() {
                    by_usage
                } else if self.config.usage_fallback == UsageFallback::Strict {
                    Vec::new()
                } else {
                    tracing::warn!(
                        collection = collection_name,
                        usage,
                        "no component declares this usage, ignoring the usage filter"
                    );
                    in_collection
                }
            }
        };

        let found: Vec<_> = candidates
            .into_iter()
            .filter(|c| c.applies_to(entity_type))
            .cloned()
            .collect();
        tracing::debug!(
            collection = collection_name,
            usage,
            entity_type,
            found = found.len(),
            "component lookup"
        );
        found
    }
}

/// Process-wide registry holder with atomic publication.
#[derive(Debug, Default)]
pub struct GlobalRegistry {
    current: ArcSwap<ComponentRegistry>,
}

impl GlobalRegistry {
    /// Creates a holder publishing an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the currently published registry.
    ///
    /// The snapshot stays valid and unchanged even if a rebuild publishes a
    /// new registry afterwards.
    #[must_use]
    pub fn snapshot(&self) -> Arc<ComponentRegistry> {
        self.current.load_full()
    }

    /// Publishes `registry`, returning the previously published one.
    pub fn publish(&self, registry: ComponentRegistry) -> Arc<ComponentRegistry> {
        self.current.swap(Arc::new(registry))
    }

    /// Rebuilds from scratch and publishes the result.
    ///
    /// The new registry is fully composed before it is swapped in; on error
    /// the published registry is left untouched.
    ///
    /// # Errors
    ///
    /// Returns the first composition error.
    pub fn rebuild(
        &self,
        set: &DeclarationSet,
        config: &RegistryConfig,
    ) -> Result<Arc<ComponentRegistry>> {
        let registry = Arc::new(compose::rebuild(set, config)?);
        self.current.store(Arc::clone(&registry));
        Ok(registry)
    }
}

static GLOBAL: OnceLock<GlobalRegistry> = OnceLock::new();

/// Returns the process-wide registry holder.
pub fn global() -> &'static GlobalRegistry {
    GLOBAL.get_or_init(GlobalRegistry::new)
}
