//! Install, uninstall, enable, and disable commands

use crate::context::CliContext;
use crate::GlobalOpts;
use modkit_logger as logger;

pub fn install_module(id: &str, opts: &GlobalOpts) -> Result<(), String> {
    let mut context =
        CliContext::load(opts).map_err(|e| format!("Failed to open the registry: {e}"))?;

    context
        .registry_mut()
        .install(id)
        .map_err(|e| e.to_string())?;

    let registry = context.registry();
    if let Ok(module) = registry.get(id) {
        logger::success(&format!("Installed '{}' ({})", module.id(), module.health()));
    }
    Ok(())
}

pub fn uninstall_module(id: &str, opts: &GlobalOpts) -> Result<(), String> {
    let mut context =
        CliContext::load(opts).map_err(|e| format!("Failed to open the registry: {e}"))?;

    context
        .registry_mut()
        .uninstall(id)
        .map_err(|e| e.to_string())?;

    logger::success(&format!("Uninstalled '{id}'"));
    Ok(())
}

pub fn enable_module(id: &str, install: bool, opts: &GlobalOpts) -> Result<(), String> {
    let mut context =
        CliContext::load(opts).map_err(|e| format!("Failed to open the registry: {e}"))?;

    if install {
        context
            .registry_mut()
            .install(id)
            .map_err(|e| e.to_string())?;
    }
    context
        .registry_mut()
        .enable(id)
        .map_err(|e| e.to_string())?;

    let registry = context.registry();
    match registry.get(id) {
        Ok(module) if module.is_enabled() => {
            logger::success(&format!("Enabled '{id}'"));
            Ok(())
        }
        _ => Err(format!(
            "Module [{id}] is not installed; run with --install or install it first"
        )),
    }
}

pub fn disable_module(id: &str, opts: &GlobalOpts) -> Result<(), String> {
    let mut context =
        CliContext::load(opts).map_err(|e| format!("Failed to open the registry: {e}"))?;

    context
        .registry_mut()
        .disable(id)
        .map_err(|e| e.to_string())?;

    logger::success(&format!("Disabled '{id}'"));
    Ok(())
}
