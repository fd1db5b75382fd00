use std::fs;
use std::path::Path;

use anyhow::Context;
use blend_engine::{blend, blend_with_changes, Change, ChangeSet};
use blend_store::{StateStore, StoreConfig};
use blend_types::Value;
use colored::Colorize;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let lines = match cli.command {
        Command::Merge(args) => cmd_merge(&args, cli.format)?,
        Command::Diff(args) => cmd_diff(&args, cli.format)?,
        Command::Replay(args) => cmd_replay(&args, cli.format)?,
    };
    for line in lines {
        println!("{line}");
    }
    Ok(())
}

fn read_json(path: &Path) -> anyhow::Result<Value> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let json: serde_json::Value = serde_json::from_str(&text)
        .with_context(|| format!("invalid JSON in {}", path.display()))?;
    Ok(Value::from_json(json))
}

fn cmd_merge(args: &PairArgs, format: OutputFormat) -> anyhow::Result<Vec<String>> {
    let old = read_json(&args.old)?;
    let new = read_json(&args.new)?;
    let merged = blend(&old, &new).to_json()?;
    let text = match format {
        OutputFormat::Text => serde_json::to_string_pretty(&merged)?,
        OutputFormat::Json => serde_json::to_string(&merged)?,
    };
    Ok(vec![text])
}

fn cmd_diff(args: &PairArgs, format: OutputFormat) -> anyhow::Result<Vec<String>> {
    let old = read_json(&args.old)?;
    let new = read_json(&args.new)?;
    let blended = blend_with_changes(&old, &new);
    render_changes(&blended.changes, format)
}

fn cmd_replay(args: &ReplayArgs, format: OutputFormat) -> anyhow::Result<Vec<String>> {
    let config = match &args.config {
        Some(path) => StoreConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => StoreConfig::default(),
    };
    let text = fs::read_to_string(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))?;
    replay(&text, config, &args.file.display().to_string(), format)
}

fn replay(
    text: &str,
    config: StoreConfig,
    source: &str,
    format: OutputFormat,
) -> anyhow::Result<Vec<String>> {
    let store = StateStore::with_config(Value::absent(), config);
    let mut out = Vec::new();

    for (index, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let lineno = index + 1;
        let json: serde_json::Value = serde_json::from_str(line)
            .with_context(|| format!("{source}:{lineno}: invalid JSON"))?;
        let t = store.commit(Value::from_json(json))?;

        out.push(match format {
            OutputFormat::Text if t.changed => format!(
                "{} line {lineno}: revision {}, {} added, {} removed, {} modified",
                "●".green(),
                t.revision,
                t.changes.additions(),
                t.changes.removals(),
                t.changes.modifications(),
            ),
            OutputFormat::Text => format!(
                "{} line {lineno}: revision {}, unchanged",
                "○".dimmed(),
                t.revision
            ),
            OutputFormat::Json => serde_json::to_string(&serde_json::json!({
                "line": lineno,
                "revision": t.revision,
                "changed": t.changed,
                "changes": t.changes.changes,
            }))?,
        });
    }
    Ok(out)
}

fn render_changes(changes: &ChangeSet, format: OutputFormat) -> anyhow::Result<Vec<String>> {
    if let OutputFormat::Json = format {
        return Ok(vec![serde_json::to_string(&changes.changes)?]);
    }
    if changes.is_empty() {
        return Ok(vec!["No changes.".to_string()]);
    }
    let mut lines = changes
        .changes
        .iter()
        .map(render_change)
        .collect::<anyhow::Result<Vec<_>>>()?;
    lines.push(format!(
        "{} added, {} removed, {} modified, {} shared",
        changes.additions(),
        changes.removals(),
        changes.modifications(),
        changes.shared
    ));
    Ok(lines)
}

fn render_change(change: &Change) -> anyhow::Result<String> {
    Ok(match change {
        Change::Added { path, value } => {
            format!("{} {path} = {}", "+".green(), compact(value)?)
        }
        Change::Removed { path, value } => {
            format!("{} {path} = {}", "-".red(), compact(value)?)
        }
        Change::Modified { path, old, new } => {
            format!("{} {path}: {} -> {}", "~".yellow(), compact(old)?, compact(new)?)
        }
    })
}

fn compact(value: &Value) -> anyhow::Result<String> {
    if value.is_absent() {
        return Ok("(absent)".to_string());
    }
    Ok(serde_json::to_string(&value.to_json()?)?)
}
