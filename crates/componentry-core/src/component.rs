//! Component instances and member dispatch.

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use componentry_common::error::{ComponentError, Result};
use serde_json::Value;

use crate::component_type::ComponentType;
use crate::context::WorkContext;
use crate::declaration::Member;

/// A composed component bound to a work context.
///
/// Instances are short-lived and cheap to clone: they share the composed
/// type and the context's collection, registry, and extras.
#[derive(Debug, Clone)]
pub struct Component {
    ty: Arc<ComponentType>,
    work: WorkContext,
}

impl Component {
    /// Binds `ty` to `work`.
    #[must_use]
    pub const fn new(ty: Arc<ComponentType>, work: WorkContext) -> Self {
        Self { ty, work }
    }

    /// Component name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.ty.name()
    }

    /// Composed type of the instance.
    #[must_use]
    pub const fn component_type(&self) -> &Arc<ComponentType> {
        &self.ty
    }

    /// Context the instance was resolved in.
    #[must_use]
    pub const fn work(&self) -> &WorkContext {
        &self.work
    }

    /// Name of the collection being worked on.
    #[must_use]
    pub fn collection(&self) -> &str {
        self.work.collection_name()
    }

    /// Entity type the instance works on.
    #[must_use]
    pub fn entity_type(&self) -> &str {
        self.work.entity_type()
    }

    /// Returns whether `member` is defined anywhere in the linearization.
    #[must_use]
    pub fn responds_to(&self, member: &str) -> bool {
        self.ty.find_member(member, 0).is_some()
    }

    /// Invokes `member` with `args`. The highest-priority definition wins;
    /// attributes evaluate to their value and ignore `args`.
    ///
    /// # Errors
    ///
    /// Returns [`ComponentError::NoMember`] if no declaration defines
    /// `member`, or whatever the method itself returns.
    pub fn call(&self, member: &str, args: Value) -> Result<Value> {
        self.dispatch(member, 0, args)
    }

    /// Returns the value of the attribute `member`.
    ///
    /// # Errors
    ///
    /// Returns [`ComponentError::NoMember`] if `member` is not defined.
    pub fn attr(&self, member: &str) -> Result<Value> {
        self.dispatch(member, 0, Value::Null)
    }

    /// Resolves a component by name from this instance's context.
    ///
    /// # Errors
    ///
    /// See [`WorkContext::resolve_by_name`].
    pub fn resolve_by_name(&self, name: &str, entity_type: Option<&str>) -> Result<Self> {
        self.work.resolve_by_name(name, entity_type)
    }

    /// Resolves the single matching component from this instance's context.
    ///
    /// # Errors
    ///
    /// See [`WorkContext::resolve_one`].
    pub fn resolve_one(&self, usage: Option<&str>, entity_type: Option<&str>) -> Result<Self> {
        self.work.resolve_one(usage, entity_type)
    }

    /// Resolves every matching component from this instance's context.
    #[must_use]
    pub fn resolve_many(&self, usage: Option<&str>, entity_type: Option<&str>) -> Vec<Self> {
        self.work.resolve_many(usage, entity_type)
    }

    fn dispatch(&self, member: &str, from: usize, args: Value) -> Result<Value> {
        let (position, found) = self.ty.find_member(member, from).ok_or_else(|| {
            ComponentError::NoMember {
                component: self.name().to_string(),
                member: member.to_string(),
            }
        })?;
        match found {
            Member::Attribute(value) => Ok(value.clone()),
            Member::Method(method) => {
                let call = Call {
                    component: self,
                    member,
                    position,
                };
                method(&call, args)
            }
        }
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Component({})", self.name())
    }
}

/// A method invocation in progress.
///
/// Dereferences to the [`Component`] the method runs on.
#[derive(Debug, Clone, Copy)]
pub struct Call<'a> {
    component: &'a Component,
    member: &'a str,
    position: usize,
}

impl Call<'_> {
    /// Instance the method runs on.
    #[must_use]
    pub const fn component(&self) -> &Component {
        self.component
    }

    /// Name of the member being invoked.
    #[must_use]
    pub const fn member(&self) -> &str {
        self.member
    }

    /// Position in the linearization of the declaration providing the
    /// method.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.position
    }

    /// Invokes the next definition of the same member further down the
    /// linearization.
    ///
    /// # Errors
    ///
    /// Returns [`ComponentError::NoMember`] when no lower-priority
    /// declaration defines the member.
    pub fn call_super(&self, args: Value) -> Result<Value> {
        self.component.dispatch(self.member, self.position + 1, args)
    }
}

impl Deref for Call<'_> {
    type Target = Component;

    fn deref(&self) -> &Component {
        self.component
    }
}
