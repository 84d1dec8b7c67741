use colored::Colorize;
use std::fs;
use std::path::Path;

use crate::GlobalOpts;
use modkit_logger as logger;

const STARTER_CONFIG: &str = r#"# modkit registry configuration
#
# Relative paths are resolved against base_path; base_path itself defaults
# to the directory modkit runs in.

# base_path = "."
# modules_path = "modules"
# manifest_path = "cache/modules.json"
# installed_path = "vendor/installed.json"
# specs_path = "specs/modules"
# module_json_paths = ["vendor/*/*/module.json", "modules/*/module.json", "packages/*/*/module.json"]
# default_vendor = "acme"

auto_install = true
auto_enable = true
"#;

const STARTER_DIRS: &[&str] = &["modules", "specs/modules", "cache"];

pub fn handle_init(force: bool, opts: &GlobalOpts) -> Result<(), String> {
    let base = match opts.base.as_deref().map(str::trim) {
        Some(base) if !base.is_empty() => base.to_string(),
        _ => ".".to_string(),
    };

    let config_path = Path::new(&base).join("modkit.toml");
    if config_path.exists() && !force {
        return Err(format!(
            "{} already exists. Use --force to overwrite it.",
            config_path.display()
        ));
    }

    fs::write(&config_path, STARTER_CONFIG)
        .map_err(|e| format!("Failed to write {}: {e}", config_path.display()))?;

    for dir in STARTER_DIRS {
        let path = Path::new(&base).join(dir);
        fs::create_dir_all(&path)
            .map_err(|e| format!("Failed to create {}: {e}", path.display()))?;
    }

    logger::success(&format!("Created {}", config_path.display()));
    println!("Next steps:");
    println!(
        "  1. Adjust {} to match your project layout",
        "modkit.toml".bold()
    );
    println!(
        "  2. Run {} to discover your modules",
        "modkit reload".bold().cyan()
    );
    Ok(())
}
