use anyhow::Result;
use colored::Colorize;
use reconcile::{ModuleResult, SpanningTree};
use similar::{ChangeTag, TextDiff};

/// Print an info message
pub fn info(msg: &str) {
    println!("{} {}", "ℹ".blue(), msg);
}

/// Print a success message
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print a warning message
pub fn warn(msg: &str) {
    println!("{} {}", "⚠".yellow(), msg);
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Print a dim/muted message
pub fn dim(msg: &str) {
    println!("  {}", msg.dimmed());
}

/// Print a header/title
pub fn header(title: &str) {
    println!();
    println!("{}", title.bold());
    println!("{}", "─".repeat(title.chars().count()).dimmed());
}

/// Print a section header
pub fn section(title: &str) {
    println!();
    println!("{}", title.cyan().bold());
}

/// Print a key-value pair
pub fn kv(key: &str, value: &str) {
    println!("  {}: {}", key.dimmed(), value);
}

// ============================================================================
// Reports
// ============================================================================

/// Print a run result as pretty JSON
pub fn print_json(result: &ModuleResult) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(result)?);
    Ok(())
}

/// Print a command listing, indenting the body of context blocks
pub fn commands(title: &str, commands: &[String]) {
    section(title);
    if commands.is_empty() {
        dim("(none)");
        return;
    }
    for line in indent_blocks(commands) {
        println!("  {line}");
    }
}

/// Print records as pretty JSON
pub fn records(title: &str, records: &[SpanningTree]) {
    section(title);
    if records.is_empty() {
        dim("(no spanning-tree configuration)");
        return;
    }
    println!("{}", records_text(records));
}

/// Print the line diff between two record sets
pub fn records_diff(before: &[SpanningTree], after: &[SpanningTree]) {
    section("Changes");
    let old = records_text(before);
    let new = records_text(after);
    let diff = TextDiff::from_lines(&old, &new);
    let mut has_changes = false;

    for change in diff.iter_all_changes() {
        match change.tag() {
            ChangeTag::Delete => {
                has_changes = true;
                print!("    {}", format!("- {change}").red());
            }
            ChangeTag::Insert => {
                has_changes = true;
                print!("    {}", format!("+ {change}").green());
            }
            ChangeTag::Equal => {}
        }
    }

    if !has_changes {
        dim("(device configuration unchanged)");
    }
}

/// Print the human-readable report of one run
pub fn report(result: &ModuleResult, check_mode: bool) {
    for warning in &result.warnings {
        warn(warning);
    }

    if let Some(cmds) = &result.commands {
        commands("Commands", cmds);
    }
    if let Some(rendered) = &result.rendered {
        commands("Rendered", rendered);
    }
    if let Some(gathered) = &result.gathered {
        records("Gathered", gathered);
    }
    if let Some(parsed) = &result.parsed {
        records("Parsed", parsed);
    }
    if let (Some(before), Some(after)) = (&result.before, &result.after) {
        records_diff(before, after);
    }

    println!();
    if result.commands.is_some() {
        match (result.changed, check_mode) {
            (false, _) => success("Device already in the declared state"),
            (true, true) => info("Check mode: changes were not applied"),
            (true, false) => success("Changes applied"),
        }
    }
}

fn records_text(records: &[SpanningTree]) -> String {
    let mut text = serde_json::to_string_pretty(records).unwrap_or_default();
    text.push('\n');
    text
}

// Lines between a context entry and its `exit` get a two-space indent.
fn indent_blocks(commands: &[String]) -> Vec<String> {
    let mut in_context = false;
    commands
        .iter()
        .map(|line| {
            if line == "exit" {
                in_context = false;
                line.clone()
            } else if in_context {
                format!("  {line}")
            } else {
                in_context = line.ends_with(" configuration");
                line.clone()
            }
        })
        .collect()
}
