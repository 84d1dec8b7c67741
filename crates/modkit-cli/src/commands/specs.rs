use crate::context::CliContext;
use crate::GlobalOpts;
use colored::Colorize;

pub fn list_specs(opts: &GlobalOpts) -> Result<(), String> {
    let mut context =
        CliContext::load(opts).map_err(|e| format!("Failed to open the registry: {e}"))?;

    // Specs are not cached in the manifest, so a registry opened from cache
    // has not seen them yet. Rescan without rewriting the manifest.
    context
        .registry_mut()
        .refresh(false)
        .map_err(|e| format!("Failed to scan for build specs: {e}"))?;

    let registry = context.registry();
    if registry.specs().is_empty() {
        println!("No build specs found.\n");
        println!("Spec files are read from:\n  {}", context.config().specs_path());
        return Ok(());
    }

    println!("{}", "Build specs:".bold().green());
    for spec in registry.specs() {
        println!(
            " {} {}",
            spec.id().bold().blue(),
            format!("({})", spec.namespace()).dimmed()
        );
        println!("    {}: {}", "Name".dimmed(), spec.name());
        println!("    {}: {}", "File".dimmed(), spec.config_path());
        println!();
    }

    println!("{}: {}", "Total specs".bold(), registry.specs().len());
    Ok(())
}
