//! Registry configuration model.

use serde::{Deserialize, Serialize};

/// What a criteria lookup does when the usage filter matches nothing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UsageFallback {
    /// Keep the candidates of the collection, ignoring the usage filter.
    #[default]
    Unfiltered,
    /// Return no candidates.
    Strict,
}

/// Configuration a component registry is built with.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Lookup behaviour for a usage filter without matches.
    #[serde(default)]
    pub usage_fallback: UsageFallback,
}

impl RegistryConfig {
    /// Returns a configuration with the strict usage policy.
    #[must_use]
    pub const fn strict() -> Self {
        Self {
            usage_fallback: UsageFallback::Strict,
        }
    }
}
