use colored::Colorize;
use std::path::Path;

use crate::context::CliContext;
use crate::GlobalOpts;
use modkit_logger as logger;
use modkit_registry::HealthStatus;

pub fn run_doctor(opts: &GlobalOpts) -> Result<(), String> {
    let context =
        CliContext::load(opts).map_err(|e| format!("Failed to open the registry: {e}"))?;
    let config = context.config();
    let registry = context.registry();

    println!("{}", "Registry check".bold().green());
    println!();

    let mut problems = 0;
    problems += check_path("Base path", config.base_path(), true, true);
    problems += check_path("Modules directory", config.modules_path(), true, false);
    problems += check_path("Specs directory", config.specs_path(), true, false);
    problems += check_path("Package metadata", config.installed_path(), false, false);
    problems += check_path("Manifest", config.manifest_path(), false, false);
    println!();

    println!(
        "{}: {} total, {} installed, {} enabled",
        "Modules".bold(),
        registry.len(),
        registry.installed().len(),
        registry.enabled().len()
    );

    for module in registry.all().values() {
        match module.health() {
            HealthStatus::Healthy => {}
            HealthStatus::MissingFiles => {
                println!(
                    "  {} {} is {} (expected at {})",
                    "✗".red().bold(),
                    module.id().bold(),
                    "missing files".red(),
                    module.base_path()
                );
                problems += 1;
            }
            status => {
                // Disabled or not installed is a choice, not a problem
                println!(
                    "  {} {} is {}",
                    "-".dimmed(),
                    module.id(),
                    status.as_str().dimmed()
                );
            }
        }
    }
    println!();

    if problems == 0 {
        logger::success("No problems found");
        Ok(())
    } else {
        Err(format!("{problems} problem(s) found"))
    }
}

fn check_path(label: &str, path: &str, want_dir: bool, required: bool) -> u32 {
    let present = if want_dir {
        Path::new(path).is_dir()
    } else {
        Path::new(path).is_file()
    };

    if present {
        println!("  {} {}: {}", "✔".green().bold(), label, path);
        0
    } else if required {
        println!(
            "  {} {}: {} {}",
            "✗".red().bold(),
            label,
            path,
            "(missing)".red()
        );
        1
    } else {
        println!(
            "  {} {}: {} {}",
            "-".dimmed(),
            label,
            path,
            "(not found)".dimmed()
        );
        0
    }
}
