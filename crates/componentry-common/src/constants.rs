//! System-wide constants.

/// Name of the universal base component every other component inherits from.
pub const BASE_COMPONENT: &str = "base";

/// Module that contributes the universal base component.
pub const BASE_MODULE: &str = "component";

/// Default manifest file name looked up by the CLI.
pub const DEFAULT_MANIFEST: &str = "components.json";
