//! `routesync routes` command.

use std::fmt::Write as _;
use std::io::Write;

use serde_json::json;

use super::emit;
use crate::cli::OutputFormat;
use crate::config::ReconcileConfig;
use crate::context::ServiceContext;
use crate::model::Route;
use crate::pipeline::load_routes;

/// Execute the `routes` command: lists extracted routes and warnings.
///
/// # Errors
///
/// Returns an error string if the router source cannot be read.
pub fn run(
    ctx: &ServiceContext,
    config: &ReconcileConfig,
    format: OutputFormat,
    out: &mut dyn Write,
) -> Result<(), String> {
    let listing = load_routes(ctx, config).map_err(|e| format!("Failed to load routes: {e}"))?;

    if format == OutputFormat::Json {
        let value = json!({ "routes": listing.routes, "warnings": listing.warnings });
        let text = serde_json::to_string_pretty(&value)
            .map_err(|e| format!("Failed to render routes: {e}"))?;
        return emit(out, &text);
    }

    if listing.routes.is_empty() {
        emit(out, "No routes found.")?;
    } else {
        let path_width = listing.routes.iter().map(|r| r.path.len()).max().unwrap_or(4).max(4);
        let mut text = String::new();
        let _ = writeln!(text, "{:<path_width$}  {:<5}  REFERENCE", "PATH", "FLAGS");
        let _ = writeln!(text, "{:-<path_width$}  {:-<5}  {:-<9}", "", "", "");
        for route in &listing.routes {
            let _ = writeln!(
                text,
                "{:<path_width$}  {:<5}  {}",
                route.path,
                flags(route),
                reference(route)
            );
        }
        let _ = write!(text, "\n{} route(s) total.", listing.routes.len());
        emit(out, &text)?;
    }
    for warning in &listing.warnings {
        emit(out, &format!("warning: {warning}"))?;
    }
    Ok(())
}

/// `P` parameterized, `D` disabled, `R` redirect.
fn flags(route: &Route) -> String {
    [(route.is_parameterized, 'P'), (route.is_disabled, 'D'), (route.is_redirect, 'R')]
        .iter()
        .map(|&(set, c)| if set { c } else { '-' })
        .collect()
}

fn reference(route: &Route) -> String {
    match &route.resolved_path {
        Some(path) => format!("{} => {}", route.raw_component_ref, path.display()),
        None if route.raw_component_ref.is_empty() => String::new(),
        None => format!("{} (unresolved)", route.raw_component_ref),
    }
}
