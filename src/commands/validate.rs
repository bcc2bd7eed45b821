use anyhow::Result;
use reconcile::Invocation;
use std::path::Path;

use crate::Context;
use crate::config;
use crate::ui;

pub fn run(ctx: &Context, file: &Path) -> Result<()> {
    let invocation = config::load_invocation(file)?;
    let problems = check(&invocation);

    if !ctx.quiet {
        ui::header(&format!("Validating {}", file.display()));
        ui::kv("state", invocation.state.as_str());
        ui::kv("records", &invocation.config.len().to_string());
    }

    if problems.is_empty() {
        if !ctx.quiet {
            ui::success("Invocation is valid");
        }
        return Ok(());
    }

    for problem in &problems {
        ui::error(problem);
    }
    anyhow::bail!("{} problem(s) found in {}", problems.len(), file.display())
}

/// Every problem with an invocation, not just the first
fn check(invocation: &Invocation) -> Vec<String> {
    let mut problems = Vec::new();

    if let Err(e) = reconcile::validate_want(invocation.state, &invocation.config) {
        problems.push(e.to_string());
    }
    for record in &invocation.config {
        if let Err(e) = record.validate() {
            let message = e.to_string();
            if !problems.contains(&message) {
                problems.push(message);
            }
        }
    }
    if invocation.state == reconcile::State::Parsed
        && invocation
            .running_config
            .as_deref()
            .is_none_or(|raw| raw.trim().is_empty())
    {
        problems.push(reconcile::Error::MissingRunningConfig.to_string());
    }
    problems
}
