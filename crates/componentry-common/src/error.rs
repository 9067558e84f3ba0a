//! Unified error types for the Componentry workspace.
//!
//! Composition failures (`MissingName`, `DuplicateComponent`,
//! `UnknownParent`, `InconsistentHierarchy`) abort a registry rebuild.
//! Resolution failures (`NoComponent`, `AmbiguousComponent`) are reported to
//! the caller, who decides whether to try an alternate usage or surface them.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type shared across the workspace.
#[derive(Debug, Error)]
pub enum ComponentError {
    /// A declaration has no name and no single parent to extend.
    #[error("component declared in module '{module}' must have a name or exactly one parent")]
    MissingName {
        /// Module that contributed the declaration.
        module: String,
    },

    /// A new component name collides with an already composed one.
    #[error(
        "component '{name}' (module '{module}') already exists; \
         extend it by listing it as the only parent or pick a different name"
    )]
    DuplicateComponent {
        /// Colliding component name.
        name: String,
        /// Module that contributed the second declaration.
        module: String,
    },

    /// A declaration references a component that is not composed yet.
    #[error("component '{name}' inherits from non-existing component '{parent}'")]
    UnknownParent {
        /// Component being composed.
        name: String,
        /// Missing parent (equal to `name` for an in-place extension).
        parent: String,
    },

    /// The bases of a component cannot be linearized.
    #[error("cannot linearize component '{name}': {reason}")]
    InconsistentHierarchy {
        /// Component whose bases conflict.
        name: String,
        /// Description of the conflict.
        reason: String,
    },

    /// No component satisfies a name or criteria lookup.
    #[error("{message}")]
    NoComponent {
        /// Human-readable description, including hints when available.
        message: String,
    },

    /// A single-result lookup matched several components.
    #[error(
        "several components found for collection '{collection}', usage '{}', \
         entity type '{}'. Found: {candidates:?}",
        .usage.as_deref().unwrap_or_default(),
        .entity_type.as_deref().unwrap_or_default()
    )]
    AmbiguousComponent {
        /// Collection the lookup ran in.
        collection: String,
        /// Requested usage, if any.
        usage: Option<String>,
        /// Requested entity type, if any.
        entity_type: Option<String>,
        /// Names of every matching component, in registry order.
        candidates: Vec<String>,
    },

    /// A component has no method or attribute with the requested name.
    #[error("component '{component}' has no member '{member}'")]
    NoMember {
        /// Component that was asked.
        component: String,
        /// Missing member name.
        member: String,
    },

    /// A member implementation reported a failure.
    #[error("component '{component}' failed: {message}")]
    Behavior {
        /// Component whose member failed.
        component: String,
        /// Failure description.
        message: String,
    },

    /// An I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path where the I/O error occurred.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A configuration or manifest value is invalid.
    #[error("invalid configuration: {message}")]
    Config {
        /// Description of the invalid configuration.
        message: String,
    },

    /// A required resource was not found.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// Type of the missing resource.
        kind: &'static str,
        /// Identifier of the missing resource.
        id: String,
    },

    /// Serialization or deserialization failed.
    #[error("serialization error: {source}")]
    Serialization {
        /// Underlying serialization error.
        #[from]
        source: serde_json::Error,
    },
}

impl ComponentError {
    /// Builds a [`ComponentError::Behavior`] for a member implementation.
    #[must_use]
    pub fn behavior(component: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Behavior {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Returns `true` for the errors that abort a registry rebuild.
    #[must_use]
    pub const fn is_build_error(&self) -> bool {
        matches!(
            self,
            Self::MissingName { .. }
                | Self::DuplicateComponent { .. }
                | Self::UnknownParent { .. }
                | Self::InconsistentHierarchy { .. }
        )
    }
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, ComponentError>;
