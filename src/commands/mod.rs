pub mod facts;
pub mod run;
pub mod validate;

use anyhow::Result;
use reconcile::{CommandExecutor, Invocation, ModuleContext, ModuleResult, NoExecutor};

use crate::Context;
use crate::cli::OutputArgs;
use crate::config::{Device, Settings};
use crate::device::{DeviceExecutor, DeviceFacts};
use crate::ui;

/// Settings plus the device chosen for this run
pub(crate) fn select_device(ctx: &Context) -> Result<Option<Device>> {
    let settings = Settings::load(ctx.config.as_deref())?;
    let device = settings.device(ctx.device.as_deref())?;
    match &device {
        Some(device) => log::info!("using device '{}'", device.name),
        None => log::debug!("no device selected"),
    }
    Ok(device)
}

/// Run one invocation against `device` (or offline without one)
pub(crate) fn execute(invocation: &Invocation, device: Option<&Device>) -> Result<ModuleResult> {
    let mut facts = DeviceFacts::for_device(device);
    let mut sink = DeviceExecutor::for_device(device);
    let mut offline = NoExecutor;
    let executor: &mut dyn CommandExecutor = match sink.as_mut() {
        Some(sink) => sink,
        None => &mut offline,
    };

    let mut module = ModuleContext::new(&mut facts, executor);
    Ok(reconcile::execute(invocation, &mut module)?)
}

/// Print a result in the requested format
pub(crate) fn emit(
    ctx: &Context,
    result: &ModuleResult,
    check_mode: bool,
    output: OutputArgs,
) -> Result<()> {
    if output.json {
        ui::print_json(result)
    } else if ctx.quiet {
        for warning in &result.warnings {
            ui::warn(warning);
        }
        Ok(())
    } else {
        ui::report(result, check_mode);
        Ok(())
    }
}
