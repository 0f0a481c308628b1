//! Command dispatch and handlers.

pub mod pages;
pub mod reconcile;
pub mod routes;

use std::env;
use std::io::Write;
use std::path::Path;

use crate::cli::{Command, SourceArgs};
use crate::config::{Overrides, ReconcileConfig};
use crate::context::ServiceContext;

/// Dispatch a parsed command to its handler with live adapters, the process
/// environment and stdout.
///
/// # Errors
///
/// Returns an error string if the selected command handler fails.
pub fn dispatch(command: &Command) -> Result<(), String> {
    let ctx = ServiceContext::live();
    let cwd = env::current_dir().map_err(|e| format!("Failed to read working directory: {e}"))?;
    let mut stdout = std::io::stdout().lock();
    dispatch_with_context(command, &ctx, &cwd, |key| env::var(key).ok(), &mut stdout)
}

/// Dispatch a command with the given service context, environment lookup
/// and output sink.
///
/// # Errors
///
/// Returns an error string if configuration fails or the handler fails.
pub fn dispatch_with_context(
    command: &Command,
    ctx: &ServiceContext,
    cwd: &Path,
    env: impl Fn(&str) -> Option<String>,
    out: &mut dyn Write,
) -> Result<(), String> {
    match command {
        Command::Reconcile { sources, apply, fuzzy_threshold, backup_dir, format } => {
            let overrides = Overrides {
                apply: *apply,
                fuzzy_threshold: *fuzzy_threshold,
                backup_dir: backup_dir.clone(),
                ..overrides_for(sources)
            };
            let config = load_config(ctx, &overrides, cwd, env)?;
            reconcile::run(ctx, &config, *format, out)
        }
        Command::Routes { sources, format } => {
            let config = load_config(ctx, &overrides_for(sources), cwd, env)?;
            routes::run(ctx, &config, *format, out)
        }
        Command::Pages { sources, format } => {
            let config = load_config(ctx, &overrides_for(sources), cwd, env)?;
            pages::run(&config, *format, out)
        }
    }
}

fn overrides_for(sources: &SourceArgs) -> Overrides {
    Overrides {
        config: sources.config.clone(),
        router_source: sources.router_source.clone(),
        pages_root: sources.pages_root.clone(),
        ..Overrides::default()
    }
}

fn load_config(
    ctx: &ServiceContext,
    overrides: &Overrides,
    cwd: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> Result<ReconcileConfig, String> {
    ReconcileConfig::load(ctx.fs.as_ref(), overrides, env, cwd)
        .map_err(|e| format!("Invalid configuration: {e}"))
}

/// Writes `text` to `out`, adding a trailing newline if missing.
fn emit(out: &mut dyn Write, text: &str) -> Result<(), String> {
    let result = if text.ends_with('\n') {
        out.write_all(text.as_bytes())
    } else {
        writeln!(out, "{text}")
    };
    result.map_err(|e| format!("Failed to write output: {e}"))
}
