use crate::context::CliContext;
use crate::GlobalOpts;
use colored::Colorize;
use modkit_registry::{HealthStatus, ModuleDescriptor};

pub fn list_modules(opts: &GlobalOpts, as_json: bool) -> Result<(), String> {
    let context =
        CliContext::load(opts).map_err(|e| format!("Failed to open the registry: {e}"))?;
    let registry = context.registry();

    if registry.is_empty() {
        println!("No modules have been discovered.\n");
        println!(
            "To scan the metadata sources, run:\n  {} reload",
            "modkit".bold().cyan()
        );
        return Ok(());
    }

    if as_json {
        let payload = serde_json::to_string_pretty(registry.all())
            .map_err(|e| format!("Failed to render module list as JSON: {e}"))?;
        println!("{payload}");
        return Ok(());
    }

    println!("{}", "Modules:".bold().green());

    for module in registry.all().values() {
        print_module(module, opts.verbose);
        println!();
    }

    println!("{}: {}", "Total modules".bold(), registry.len());
    Ok(())
}

fn print_module(module: &ModuleDescriptor, verbose_level: u8) {
    let mut header = format!(" {}:", module.id().bold().blue());
    header.push_str(&format!(" {}", format!("v{}", module.version()).dimmed()));
    let status = match module.health() {
        HealthStatus::Healthy => "[enabled]".green(),
        HealthStatus::Disabled => "[disabled]".yellow(),
        HealthStatus::NotInstalled => "[not installed]".red(),
        HealthStatus::MissingFiles => "[missing files]".red(),
    };
    header.push_str(&format!(" {status}"));
    println!("{header}");

    if module.name() != module.id() {
        println!("    {}: {}", "Name".dimmed(), module.name());
    }
    if !module.base_path().is_empty() {
        println!("    {}: {}", "Path".dimmed(), module.base_path());
    }
    if !module.providers().is_empty() {
        println!("    {}:", "Providers".dimmed());
        for provider in module.providers() {
            println!("      - {provider}");
        }
    }

    if verbose_level > 0 {
        if !module.capabilities().is_empty() {
            println!(
                "    {}: {}",
                "Capabilities".dimmed(),
                module.capabilities().join(", ")
            );
        }
        for (key, value) in module.paths() {
            println!("    {}: {}", key.dimmed(), value.as_list().join(", "));
        }
    }
}
