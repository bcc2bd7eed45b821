use anyhow::{Context as _, Result};
use reconcile::{Invocation, State};
use std::fs;

use crate::Context;
use crate::cli::{OutputArgs, ParseArgs};

pub fn gather(ctx: &Context, output: OutputArgs) -> Result<()> {
    let device = super::select_device(ctx)?
        .context("gather needs a device; pass --device or set default_device")?;

    let invocation = Invocation {
        state: State::Gathered,
        ..Default::default()
    };
    let result = super::execute(&invocation, Some(&device))?;
    super::emit(ctx, &result, false, output)
}

pub fn parse(ctx: &Context, args: ParseArgs) -> Result<()> {
    let text = fs::read_to_string(&args.file)
        .with_context(|| format!("Could not read {}", args.file.display()))?;

    let invocation = Invocation {
        state: State::Parsed,
        running_config: Some(text),
        ..Default::default()
    };
    let result = super::execute(&invocation, None)?;
    super::emit(ctx, &result, false, args.output)
}
