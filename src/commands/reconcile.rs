//! `routesync reconcile` command.

use std::io::Write;

use tracing::error;

use super::emit;
use crate::apply::apply_plan;
use crate::cli::OutputFormat;
use crate::config::ReconcileConfig;
use crate::context::ServiceContext;
use crate::pipeline::analyze;
use crate::report::{format_text, Report};

/// Execute the `reconcile` command.
///
/// Prints the report. In apply mode the plan is applied first and the
/// outcome is attached; residual actions are not an error.
///
/// # Errors
///
/// Returns an error string if analysis fails, or if the apply step aborts.
/// In the latter case the report computed before the apply is still printed.
pub fn run(
    ctx: &ServiceContext,
    config: &ReconcileConfig,
    format: OutputFormat,
    out: &mut dyn Write,
) -> Result<(), String> {
    let analysis = analyze(ctx, config).map_err(|e| format!("Analysis failed: {e}"))?;
    let report = Report::build(config, &analysis);

    if !config.apply {
        return emit(out, &render(&report, format)?);
    }

    match apply_plan(ctx, config, &analysis) {
        Ok(outcome) => emit(out, &render(&report.with_apply(outcome), format)?),
        Err(e) => {
            error!(error = %e, "apply aborted");
            emit(out, &render(&report, format)?)?;
            Err(format!("Apply aborted: {e}"))
        }
    }
}

fn render(report: &Report, format: OutputFormat) -> Result<String, String> {
    match format {
        OutputFormat::Text => Ok(format_text(report)),
        OutputFormat::Json => report.to_json().map_err(|e| format!("Failed to render report: {e}")),
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::context::testing::disk_context;

    fn write(root: &Path, rel: &str, contents: &str) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, contents).unwrap();
    }

    const ROUTER: &str = "\
const routes = [
  { path: '/', component: () => import('@/pages/Home.vue') },
  { path: '/billing/invoices', component: () => import('@/pages/fiannce/Invoices.vue') },
]
";

    fn project() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "src/router/index.js", ROUTER);
        write(dir.path(), "src/pages/Home.vue", "<template />");
        write(dir.path(), "src/pages/finance/Invoices.vue", "<template />");
        dir
    }

    #[test]
    fn report_mode_leaves_files_untouched() {
        let dir = project();
        let router = dir.path().join("src/router/index.js");
        let config = ReconcileConfig::with_roots(&router, &dir.path().join("src/pages"));
        let mut out = Vec::new();
        run(&disk_context(), &config, OutputFormat::Json, &mut out).unwrap();

        let json: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(json["summary"]["fuzzy"], 1);
        assert_eq!(json["actions"][0]["kind"], "rewrite_component_ref");
        assert_eq!(std::fs::read_to_string(router).unwrap(), ROUTER);
    }

    #[test]
    fn apply_mode_fixes_and_reports_outcome() {
        let dir = project();
        let router = dir.path().join("src/router/index.js");
        let mut config = ReconcileConfig::with_roots(&router, &dir.path().join("src/pages"));
        config.apply = true;
        let mut out = Vec::new();
        run(&disk_context(), &config, OutputFormat::Text, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Apply complete: 1 applied, 0 failed, 0 residual"));
        assert!(std::fs::read_to_string(&router).unwrap().contains("@/pages/finance/Invoices.vue"));
        let backup = dir.path().join("src/router/.routesync-backups/index.js.20250615T100000Z.bak");
        assert_eq!(std::fs::read_to_string(backup).unwrap(), ROUTER);
    }
}
