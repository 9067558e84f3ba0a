//! Formatted output helpers for CLI commands.

use componentry_core::component_type::ComponentSummary;

/// Placeholder printed for an unset value.
pub const NONE: &str = "-";

/// Formats an optional value, using [`NONE`] when absent.
#[must_use]
pub fn format_optional(value: Option<&str>) -> &str {
    value.unwrap_or(NONE)
}

/// Joins names with commas, using [`NONE`] for an empty list.
#[must_use]
pub fn format_list<S: AsRef<str>>(items: &[S]) -> String {
    if items.is_empty() {
        return NONE.to_string();
    }
    items
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Renders the one-line plan entry of a component.
#[must_use]
pub fn summary_line(summary: &ComponentSummary) -> String {
    let kind = if summary.is_abstract { " (abstract)" } else { "" };
    format!(
        "{}{kind}  collection={} usage={} apply_on={}",
        summary.name,
        format_optional(summary.collection.as_deref()),
        format_optional(summary.usage.as_deref()),
        summary
            .apply_on
            .as_deref()
            .map_or_else(|| NONE.to_string(), format_list),
    )
}
