use anyhow::{Context as _, Result};
use reconcile::{Invocation, Platform, State};

use crate::Context;
use crate::cli::{RenderArgs, RunArgs};
use crate::config::{self, Device};
use crate::ui;

pub fn run(ctx: &Context, args: RunArgs) -> Result<()> {
    let mut invocation = config::load_invocation(&args.file)?;
    if let Some(state) = args.state {
        invocation.state = state;
    }
    invocation.check_mode |= args.check;

    let device = super::select_device(ctx)?;
    if invocation.state.is_action() && device.is_none() {
        anyhow::bail!(
            "state {} needs a device; pass --device or set default_device",
            invocation.state
        );
    }

    if !args.output.json && !ctx.quiet {
        print_target(&invocation, device.as_ref());
    }

    let needs_prompt = invocation.state.is_action() && !invocation.check_mode && !args.yes;
    if needs_prompt {
        let preview = Invocation {
            check_mode: true,
            ..invocation.clone()
        };
        let planned = super::execute(&preview, device.as_ref())?;
        let pending = planned.commands.as_deref().unwrap_or_default();
        if pending.is_empty() {
            return super::emit(ctx, &planned, false, args.output);
        }

        ui::commands("Pending commands", pending);
        println!();
        if !confirm_proceed()? {
            ui::warn("Aborted, nothing was applied");
            return Ok(());
        }
    }

    let result = super::execute(&invocation, device.as_ref())?;
    super::emit(ctx, &result, invocation.check_mode, args.output)
}

pub fn render(ctx: &Context, args: RenderArgs) -> Result<()> {
    let mut invocation = config::load_invocation(&args.file)?;
    invocation.state = State::Rendered;

    if let Some(platform) = args.platform {
        invocation.platform = Some(Platform::new(platform));
    } else if invocation.platform.is_none()
        && let Some(device) = super::select_device(ctx)?
    {
        invocation.platform = device.profile.platform.map(Platform::new);
    }

    let result = super::execute(&invocation, None)?;
    super::emit(ctx, &result, false, args.output)
}

fn print_target(invocation: &Invocation, device: Option<&Device>) {
    ui::header("Spanning-tree reconciliation");
    ui::kv("state", invocation.state.as_str());
    ui::kv(
        "device",
        device.map_or("(none)", |device| device.name.as_str()),
    );
    ui::kv("records", &invocation.config.len().to_string());
    if invocation.check_mode {
        ui::kv("mode", "check");
    }
}

fn confirm_proceed() -> Result<bool> {
    use dialoguer::Confirm;

    let confirmed = Confirm::new()
        .with_prompt("Apply these commands?")
        .default(false)
        .interact()
        .context("Confirmation prompt failed; pass --yes to apply without asking")?;

    Ok(confirmed)
}
