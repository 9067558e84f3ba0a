//! `componentry lookup`: Find components by collection, usage and entity type.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use componentry_common::config::RegistryConfig;
use componentry_common::constants::DEFAULT_MANIFEST;
use componentry_core::context::{NamedCollection, WorkContext};

use crate::output;

/// Arguments for the `lookup` command.
#[derive(Args, Debug)]
pub struct LookupArgs {
    /// Path to the component manifest.
    #[arg(default_value = DEFAULT_MANIFEST)]
    pub manifest: PathBuf,

    /// Collection to look in.
    #[arg(long)]
    pub collection: String,

    /// Usage to filter on.
    #[arg(long)]
    pub usage: Option<String>,

    /// Entity type the component must apply to.
    #[arg(long)]
    pub entity: Option<String>,

    /// Require exactly one match.
    #[arg(long)]
    pub one: bool,
}

/// Executes the `lookup` command.
///
/// # Errors
///
/// Returns an error if loading or composition fails, or, with `--one`,
/// if zero or several components match.
pub fn execute(args: LookupArgs, config: &RegistryConfig) -> anyhow::Result<()> {
    let (_, registry) = super::load_registry(&args.manifest, config)?;

    if args.one {
        let work = WorkContext::builder(
            Arc::new(NamedCollection::new(args.collection.as_str())),
            args.entity.as_deref().unwrap_or_default(),
        )
        .registry(registry)
        .build();
        let component = work.resolve_one(args.usage.as_deref(), None)?;
        println!("{}", output::summary_line(&component.component_type().summary()));
        return Ok(());
    }

    let found = registry.lookup(
        &args.collection,
        args.usage.as_deref(),
        args.entity.as_deref(),
    );
    if found.is_empty() {
        println!("No component found.");
        return Ok(());
    }
    for component in &found {
        println!("{}", output::summary_line(&component.summary()));
    }
    Ok(())
}
