//! Resolution of component instances from a work context.
//!
//! Criteria lookups must be unambiguous: when several components match a
//! single-result request, the engine reports them all instead of picking
//! one by registration order.

use std::sync::Arc;

use componentry_common::error::{ComponentError, Result};

use crate::component::Component;
use crate::component_type::ComponentType;
use crate::context::WorkContext;

/// Resolution engine bound to a [`WorkContext`].
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    work: &'a WorkContext,
}

impl<'a> Resolver<'a> {
    /// Binds the engine to `work`.
    #[must_use]
    pub const fn new(work: &'a WorkContext) -> Self {
        Self { work }
    }

    /// Returns the component named `name`, bound to a context for
    /// `entity_type` (the current entity type when `None`).
    ///
    /// # Errors
    ///
    /// Returns [`ComponentError::NoComponent`] if no component has this
    /// name, or if the component is restricted to other entity types. The
    /// message then hints at the entity types to pass instead. An empty
    /// restriction list does not restrict.
    pub fn by_name(&self, name: &str, entity_type: Option<&str>) -> Result<Component> {
        let component = self
            .work
            .registry()
            .get(name)
            .ok_or_else(|| ComponentError::NoComponent {
                message: format!("No component with name '{name}' found."),
            })?;
        let entity_type = entity_type.unwrap_or_else(|| self.work.entity_type());

        if let Some(apply_on) = component.apply_on().filter(|a| !a.is_empty()) {
            if !apply_on.iter().any(|e| e == entity_type) {
                let hint = match apply_on {
                    [single] => format!("'{single}'"),
                    many => format!("<one of {many:?}>"),
                };
                return Err(ComponentError::NoComponent {
                    message: format!(
                        "Component with name '{name}' can't be used for entity type \
                         '{entity_type}'.\nHint: you might want to use: \
                         resolve_by_name('{name}', entity_type={hint})"
                    ),
                });
            }
        }

        Ok(Component::new(
            Arc::clone(component),
            self.context_for(entity_type),
        ))
    }

    /// Returns the only component matching `usage` and `entity_type` in the
    /// context's collection.
    ///
    /// # Errors
    ///
    /// Returns [`ComponentError::NoComponent`] when nothing matches and
    /// [`ComponentError::AmbiguousComponent`] when several components match.
    pub fn one(&self, usage: Option<&str>, entity_type: Option<&str>) -> Result<Component> {
        let entity_type = entity_type.unwrap_or_else(|| self.work.entity_type());
        let mut found = self.candidates(usage, entity_type);

        if found.len() > 1 {
            return Err(ComponentError::AmbiguousComponent {
                collection: self.work.collection_name().to_string(),
                usage: usage.map(str::to_string),
                entity_type: Some(entity_type.to_string()),
                candidates: found.iter().map(|c| c.name().to_string()).collect(),
            });
        }
        let component = found.pop().ok_or_else(|| ComponentError::NoComponent {
            message: format!(
                "No component found for collection '{}', usage '{}', entity type '{entity_type}'.",
                self.work.collection_name(),
                usage.unwrap_or_default(),
            ),
        })?;
        Ok(Component::new(component, self.context_for(entity_type)))
    }

    /// Returns every component matching `usage` and `entity_type`, possibly
    /// none.
    #[must_use]
    pub fn many(&self, usage: Option<&str>, entity_type: Option<&str>) -> Vec<Component> {
        let entity_type = entity_type.unwrap_or_else(|| self.work.entity_type());
        let found = self.candidates(usage, entity_type);
        if found.is_empty() {
            return Vec::new();
        }
        let work = self.context_for(entity_type);
        found
            .into_iter()
            .map(|component| Component::new(component, work.clone()))
            .collect()
    }

    /// Runs the registry lookup for the context's collection.
    #[must_use]
    pub fn candidates(&self, usage: Option<&str>, entity_type: &str) -> Vec<Arc<ComponentType>> {
        self.work
            .registry()
            .lookup(self.work.collection_name(), usage, Some(entity_type))
    }

    fn context_for(&self, entity_type: &str) -> WorkContext {
        if entity_type == self.work.entity_type() {
            self.work.clone()
        } else {
            self.work.derive(entity_type)
        }
    }
}
