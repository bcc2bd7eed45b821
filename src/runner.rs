use anyhow::{Context, Result};
use std::io::Write;
use std::process::{Command, Stdio};

fn split(argv: &[String]) -> Result<(&String, &[String])> {
    argv.split_first().context("Command line is empty")
}

/// Run a command and capture output
pub fn run_capture(argv: &[String]) -> Result<String> {
    let (cmd, args) = split(argv)?;
    log::debug!("running: {}", argv.join(" "));

    let output = Command::new(cmd)
        .args(args)
        .stdin(Stdio::null())
        .output()
        .with_context(|| format!("Failed to execute: {}", argv.join(" ")))?;

    if output.status.success() {
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr);
        anyhow::bail!("Command failed ({}): {}", output.status, stderr.trim())
    }
}

/// Run a command with `input` written to its stdin and capture output
pub fn run_with_input(argv: &[String], input: &str) -> Result<String> {
    let (cmd, args) = split(argv)?;
    log::debug!("running with {} byte(s) of input: {}", input.len(), argv.join(" "));

    let mut child = Command::new(cmd)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .with_context(|| format!("Failed to execute: {}", argv.join(" ")))?;

    // Dropping stdin closes the pipe so the child sees EOF.
    {
        let mut stdin = child.stdin.take().context("Child stdin was not captured")?;
        stdin
            .write_all(input.as_bytes())
            .with_context(|| format!("Failed to write to {cmd}"))?;
    }

    let output = child
        .wait_with_output()
        .with_context(|| format!("Failed to wait for {cmd}"))?;

    if output.status.success() {
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr);
        anyhow::bail!("Command failed ({}): {}", output.status, stderr.trim())
    }
}
