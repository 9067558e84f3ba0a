//! `componentry plan`: Display the module load order and composed components.

use std::path::PathBuf;

use clap::Args;
use componentry_common::config::RegistryConfig;
use componentry_common::constants::DEFAULT_MANIFEST;

use crate::output;

/// Arguments for the `plan` command.
#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Path to the component manifest.
    #[arg(default_value = DEFAULT_MANIFEST)]
    pub manifest: PathBuf,
}

/// Executes the `plan` command.
///
/// Loads the manifest, composes the registry, and lists every module in
/// load order with the components it contributed.
///
/// # Errors
///
/// Returns an error if loading or composition fails.
pub fn execute(args: PlanArgs, config: &RegistryConfig) -> anyhow::Result<()> {
    let (set, registry) = super::load_registry(&args.manifest, config)?;

    println!("Load plan for: {}", args.manifest.display());
    println!();
    for (position, (module, declarations)) in set.modules().enumerate() {
        println!("  {}. {module}", position + 1);
        for declaration in declarations {
            let Some(target) = declaration.target_name() else {
                continue;
            };
            let verb = if declaration.declared_name().is_some() {
                "+"
            } else {
                "~"
            };
            println!("       {verb} {target}");
        }
    }

    println!();
    println!("  Components:");
    for component in registry.iter() {
        println!("    {}", output::summary_line(&component.summary()));
    }
    println!();
    println!(
        "  {} component(s) composed from {} declaration(s).",
        registry.len(),
        set.len()
    );
    Ok(())
}
