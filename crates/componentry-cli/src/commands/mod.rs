//! CLI command definitions and dispatch.

pub mod inspect;
pub mod lookup;
pub mod plan;

use std::path::Path;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use componentry_common::config::RegistryConfig;
use componentry_core::declaration::DeclarationSet;
use componentry_core::registry::{self, ComponentRegistry};

/// Componentry: composable components resolved from a work context.
#[derive(Parser, Debug)]
#[command(name = "componentry", version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,

    /// Return nothing, instead of every candidate, when no component
    /// declares the requested usage.
    #[arg(long, global = true, env = "COMPONENTRY_STRICT_USAGE")]
    pub strict_usage: bool,
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Display the module load order and the components each one declares.
    Plan(plan::PlanArgs),
    /// Find the components matching a collection, usage and entity type.
    Lookup(lookup::LookupArgs),
    /// Show the composed type of one component.
    Inspect(inspect::InspectArgs),
}

/// Dispatches the parsed CLI command to its handler.
///
/// # Errors
///
/// Returns an error if the command execution fails.
pub fn execute(cli: Cli) -> anyhow::Result<()> {
    let config = if cli.strict_usage {
        RegistryConfig::strict()
    } else {
        RegistryConfig::default()
    };
    match cli.command {
        Command::Plan(args) => plan::execute(args, &config),
        Command::Lookup(args) => lookup::execute(args, &config),
        Command::Inspect(args) => inspect::execute(args, &config),
    }
}

/// Loads `manifest`, rebuilds the process-wide registry from it, and
/// returns the declarations with the published registry.
fn load_registry(
    manifest: &Path,
    config: &RegistryConfig,
) -> anyhow::Result<(DeclarationSet, Arc<ComponentRegistry>)> {
    let set = componentry_manifest::load_manifest(manifest)?;
    let registry = registry::global().rebuild(&set, config)?;
    Ok((set, registry))
}
