//! gqtmatch CLI — driving adapter for the template matcher.
//!
//! Subcommands:
//! - `check <workspace>` — initialize from a workspace and report errors
//! - `match <workspace> [--operation NAME]` — run the workspace's operations
//! - `inspect <file> [--schema FILE]` — list the named operations in a document
//!
//! Logging goes to stderr and is filtered by `GQTMATCH_LOG` (default `warn`).

use std::process;

use gqtmatch::workspace::{Workspace, WorkspaceOperation};
use gqtmatch::{Bridge, ErrorReport, MatchOutcome};
use tracing_subscriber::EnvFilter;

fn main() {
    init_logging();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let result = match args[1].as_str() {
        "check" => cmd_check(&args[2..]),
        "match" => cmd_match(&args[2..]),
        "inspect" => cmd_inspect(&args[2..]),
        "--help" | "-h" | "help" => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("error: unknown command \"{other}\"");
            print_usage();
            process::exit(1);
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("GQTMATCH_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

// ═══════════════════════════════════════════════════════════════════════════════
// Commands
// ═══════════════════════════════════════════════════════════════════════════════

fn cmd_check(args: &[String]) -> Result<(), String> {
    let [path] = args else {
        return Err("check requires a workspace file path".into());
    };

    let workspace = load_workspace(path)?;
    build_bridge(&workspace)?;

    println!(
        "Workspace valid: {} template(s), {}",
        workspace.templates.len(),
        if workspace.schema_source().is_empty() {
            "schema-less"
        } else {
            "with schema"
        }
    );
    Ok(())
}

fn cmd_match(args: &[String]) -> Result<(), String> {
    let Some((path, rest)) = args.split_first() else {
        return Err("match requires a workspace file path".into());
    };
    let only = parse_flag(rest, "--operation")?;

    let workspace = load_workspace(path)?;
    let bridge = build_bridge(&workspace)?;

    let operations: Vec<&WorkspaceOperation> = match &only {
        Some(name) => vec![workspace
            .operation(name)
            .ok_or_else(|| format!("workspace has no operation \"{name}\""))?],
        None => workspace.operations.iter().collect(),
    };

    for operation in operations {
        let outcome = run_operation(&bridge, operation)?;
        println!("{}: {}", operation.name, render_outcome(&outcome));
    }
    Ok(())
}

fn cmd_inspect(args: &[String]) -> Result<(), String> {
    let Some((path, rest)) = args.split_first() else {
        return Err("inspect requires an operation file path".into());
    };
    let schema_path = parse_flag(rest, "--schema")?;

    let source = read_file(path)?;
    let mut bridge = Bridge::default();
    if let Some(schema_path) = schema_path {
        if let Some(report) = bridge.init(&read_file(&schema_path)?, &[]) {
            return Err(describe_report(&report));
        }
    }

    let response = bridge
        .parse_operation(&source)
        .ok_or("inspect aborted by an internal fault")?;
    let json = serde_json::to_string_pretty(&response)
        .map_err(|e| format!("failed to encode response: {e}"))?;
    println!("{json}");
    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════════════
// Workspace assembly (composition root)
// ═══════════════════════════════════════════════════════════════════════════════

fn load_workspace(path: &str) -> Result<Workspace, String> {
    Workspace::load(path).map_err(|e| e.to_string())
}

fn build_bridge(workspace: &Workspace) -> Result<Bridge, String> {
    let mut bridge = Bridge::default();
    match bridge.init(workspace.schema_source(), &workspace.template_sources()) {
        Some(report) => Err(describe_report(&report)),
        None if bridge.is_active() => {
            tracing::info!(workspace = %workspace.name, "workspace initialized");
            Ok(bridge)
        }
        None => Err("init aborted by an internal fault".into()),
    }
}

fn run_operation(bridge: &Bridge, operation: &WorkspaceOperation) -> Result<MatchOutcome, String> {
    bridge
        .match_all(&operation.source, "", &operation.variables)
        .ok_or_else(|| format!("operation \"{}\" aborted by an internal fault", operation.name))
}

fn render_outcome(outcome: &MatchOutcome) -> String {
    let mut line = if outcome.matched.is_empty() {
        "(no match)".to_string()
    } else {
        outcome.matched.join(", ")
    };
    if let Some(error) = &outcome.error {
        line.push_str(&format!(" (error: {error})"));
    }
    line
}

fn describe_report(report: &ErrorReport) -> String {
    let mut text = report.kind().code().to_string();
    for message in report.messages() {
        text.push_str("\n  ");
        text.push_str(&message);
    }
    text
}

fn read_file(path: &str) -> Result<String, String> {
    std::fs::read_to_string(path).map_err(|e| format!("failed to read \"{path}\": {e}"))
}

// ═══════════════════════════════════════════════════════════════════════════════
// Argument parsing
// ═══════════════════════════════════════════════════════════════════════════════

fn parse_flag(args: &[String], flag: &str) -> Result<Option<String>, String> {
    match args {
        [] => Ok(None),
        [name, value] if name == flag => Ok(Some(value.clone())),
        [name] if name == flag => Err(format!("{flag} requires a value")),
        [other, ..] => Err(format!("unexpected argument \"{other}\"")),
    }
}

fn print_usage() {
    eprintln!(
        "Usage: gqtmatch <command> [options]

Commands:
  check <workspace>                        Validate schema and templates
  match <workspace> [--operation NAME]     Match the workspace's operations
  inspect <file> [--schema FILE]           List named operations in a document
  help                                     Show this help

Workspaces are JSON (.json) or YAML (anything else).
Set GQTMATCH_LOG to control logging (e.g. GQTMATCH_LOG=gqtmatch=debug)."
    );
}
