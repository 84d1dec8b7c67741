use colored::Colorize;

use crate::context::CliContext;
use crate::GlobalOpts;
use modkit_logger as logger;

pub fn reload_modules(no_cache: bool, opts: &GlobalOpts) -> Result<(), String> {
    let mut context =
        CliContext::load(opts).map_err(|e| format!("Failed to open the registry: {e}"))?;

    logger::spinner_start("Scanning module sources...");
    match context.registry_mut().refresh(!no_cache) {
        Ok(()) => {
            let registry = context.registry();
            logger::spinner_success(&format!(
                "Discovered {} module(s), {} build spec(s)",
                registry.len(),
                registry.specs().len()
            ));
            if no_cache {
                println!("{}", "Manifest write skipped (--no-cache)".dimmed());
            }
            Ok(())
        }
        Err(e) => {
            logger::spinner_error("Module scan failed");
            Err(format!("Failed to reload modules: {e}"))
        }
    }
}
