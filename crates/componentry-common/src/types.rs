//! Domain primitive types used across the Componentry workspace.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of the module (addon) that contributed a declaration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ModuleId(String);

impl ModuleId {
    /// Creates a module ID from a string value.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the inner string representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ModuleId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Entity types a component restricts itself to.
///
/// Accepts either a single entity type or a list when deserialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ApplyOn {
    /// A single entity type.
    One(String),
    /// Several entity types.
    Many(Vec<String>),
}

impl ApplyOn {
    /// Returns the entity types as a list.
    #[must_use]
    pub fn entity_types(&self) -> Vec<String> {
        match self {
            Self::One(entity) => vec![entity.clone()],
            Self::Many(entities) => entities.clone(),
        }
    }
}

impl From<&str> for ApplyOn {
    fn from(value: &str) -> Self {
        Self::One(value.to_string())
    }
}

impl From<Vec<String>> for ApplyOn {
    fn from(value: Vec<String>) -> Self {
        Self::Many(value)
    }
}

impl From<Vec<&str>> for ApplyOn {
    fn from(value: Vec<&str>) -> Self {
        Self::Many(value.into_iter().map(str::to_string).collect())
    }
}
