//! `componentry inspect`: Show the composed type of one component.

use std::collections::HashSet;
use std::path::PathBuf;

use clap::Args;
use componentry_common::config::RegistryConfig;
use componentry_common::error::ComponentError;
use componentry_core::declaration::Member;

use crate::output::{self, format_list, format_optional};

/// Arguments for the `inspect` command.
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Path to the component manifest.
    pub manifest: PathBuf,

    /// Component name.
    pub name: String,

    /// Print the summary as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Executes the `inspect` command.
///
/// # Errors
///
/// Returns an error if loading or composition fails, or if no component has
/// the requested name.
pub fn execute(args: InspectArgs, config: &RegistryConfig) -> anyhow::Result<()> {
    let (_, registry) = super::load_registry(&args.manifest, config)?;
    let component = registry
        .get(&args.name)
        .ok_or_else(|| ComponentError::NotFound {
            kind: "component",
            id: args.name.clone(),
        })?;
    let summary = component.summary();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("{}", summary.name);
    println!("  abstract:      {}", summary.is_abstract);
    println!("  collection:    {}", format_optional(summary.collection.as_deref()));
    println!("  usage:         {}", format_optional(summary.usage.as_deref()));
    println!(
        "  apply_on:      {}",
        summary
            .apply_on
            .as_deref()
            .map_or_else(|| output::NONE.to_string(), format_list)
    );
    println!("  bases:         {}", format_list(&summary.bases));
    println!("  ancestors:     {}", format_list(&summary.ancestors));
    println!("  children:      {}", format_list(&summary.children));
    println!("  declarations:  {}", summary.declarations);

    let mut seen = HashSet::new();
    let members: Vec<&str> = component
        .linearization()
        .iter()
        .flat_map(|decl| decl.member_names())
        .filter(|name| seen.insert(*name))
        .collect();
    println!("  members:       {}", format_list(&members));
    for name in &members {
        if let Some((_, Member::Attribute(value))) = component.find_member(name, 0) {
            println!("    {name} = {value}");
        }
    }

    for (key, value) in &summary.metadata {
        println!("  metadata.{key}: {value}");
    }
    Ok(())
}
