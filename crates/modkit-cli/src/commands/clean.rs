use colored::Colorize;

use crate::context::CliContext;
use crate::GlobalOpts;
use modkit_logger as logger;

pub fn clean_manifest(yes: bool, opts: &GlobalOpts) -> Result<(), String> {
    let mut context =
        CliContext::load(opts).map_err(|e| format!("Failed to open the registry: {e}"))?;
    let registry = context.registry();

    if registry.is_empty() && !registry.store().exists() {
        logger::warn("There is nothing to clean.");
        return Ok(());
    }

    let total = registry.len();
    logger::debug(&format!("Manifest tracks {total} module(s)."));

    if !yes {
        println!("To actually clean, run with --yes flag.");
        return Ok(());
    }

    context
        .registry_mut()
        .clear()
        .map_err(|e| format!("Failed to clean the manifest: {e}"))?;

    println!("{}", format!("Removed {total} module(s) from the manifest").dimmed());
    Ok(())
}
