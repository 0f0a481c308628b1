//! Serializable reconciliation report and its text rendering.

use std::fmt::Write as _;
use std::path::PathBuf;

use serde::Serialize;

use crate::apply::{ApplyOutcome, ApplyStatus};
use crate::config::ReconcileConfig;
use crate::error::{Result, Warning};
use crate::model::{FixAction, MatchKind};
use crate::pipeline::Analysis;

/// Counts per classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    /// Extracted routes, excluded ones included.
    pub routes: usize,
    /// Scanned page files.
    pub files: usize,
    /// Exact matches.
    pub exact: usize,
    /// Fuzzy matches.
    pub fuzzy: usize,
    /// Routes without a file.
    pub route_needs_file: usize,
    /// Files without a route.
    pub file_needs_route: usize,
    /// Parameterized, disabled or redirect routes with no exact match.
    pub excluded_routes: usize,
    /// Planned actions.
    pub actions: usize,
    /// Warnings.
    pub warnings: usize,
}

/// One route and how it was classified.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteEntry {
    /// Effective path.
    pub path: String,
    /// Route name.
    pub name: Option<String>,
    /// Component reference as extracted.
    pub reference: String,
    /// Resolved file path.
    pub resolved_path: Option<PathBuf>,
    /// Declaring file.
    pub source: PathBuf,
    /// Line of the `path` declaration.
    pub line: usize,
    /// Has a parameter segment.
    pub parameterized: bool,
    /// Commented out.
    pub disabled: bool,
    /// Redirect without component.
    pub redirect: bool,
    /// Classification; `None` for excluded routes.
    pub kind: Option<MatchKind>,
    /// Relative path of the paired file.
    pub file: Option<String>,
    /// Fuzzy score.
    pub score: Option<f64>,
}

/// One page file and how it was classified.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileEntry {
    /// Path relative to the pages root.
    pub relative_path: String,
    /// Classification.
    pub kind: MatchKind,
    /// Path of the paired route.
    pub route: Option<String>,
    /// Fuzzy score.
    pub score: Option<f64>,
}

/// A planned action with its description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionEntry {
    /// Human-readable summary.
    pub description: String,
    /// The action itself.
    #[serde(flatten)]
    pub action: FixAction,
}

/// Everything a run reports. Collections keep pipeline order, so two runs
/// over the same inputs serialize identically.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    /// Router source analysed.
    pub router_source: PathBuf,
    /// Pages root analysed.
    pub pages_root: PathBuf,
    /// Threshold in effect.
    pub fuzzy_threshold: f64,
    /// Counts.
    pub summary: Summary,
    /// Routes in extraction order.
    pub routes: Vec<RouteEntry>,
    /// Files in scanner order.
    pub files: Vec<FileEntry>,
    /// Files skipped as noise.
    pub skipped_files: Vec<String>,
    /// Planned actions in application order.
    pub actions: Vec<ActionEntry>,
    /// Parse and resolution warnings.
    pub warnings: Vec<Warning>,
    /// Present in apply mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub apply: Option<ApplyOutcome>,
}

impl Report {
    /// Builds the report for one analysis.
    #[must_use]
    pub fn build(config: &ReconcileConfig, analysis: &Analysis) -> Self {
        let mut routes: Vec<RouteEntry> = analysis
            .routes
            .iter()
            .map(|r| RouteEntry {
                path: r.path.clone(),
                name: r.name.clone(),
                reference: r.raw_component_ref.clone(),
                resolved_path: r.resolved_path.clone(),
                source: r.source.clone(),
                line: r.line,
                parameterized: r.is_parameterized,
                disabled: r.is_disabled,
                redirect: r.is_redirect,
                kind: None,
                file: None,
                score: None,
            })
            .collect();
        let mut files: Vec<Option<FileEntry>> = vec![None; analysis.files.len()];

        for result in &analysis.results {
            let file_path = result.file.map(|f| analysis.files[f].relative_path.clone());
            let route_path = result.route.map(|r| analysis.routes[r].path.clone());
            if let Some(index) = result.route {
                let entry = &mut routes[index];
                entry.kind = Some(result.kind);
                entry.file.clone_from(&file_path);
                entry.score = result.score;
            }
            if let Some(index) = result.file {
                files[index] = Some(FileEntry {
                    relative_path: analysis.files[index].relative_path.clone(),
                    kind: result.kind,
                    route: route_path,
                    score: result.score,
                });
            }
        }

        let summary = Summary {
            routes: analysis.routes.len(),
            files: analysis.files.len(),
            exact: analysis.count(MatchKind::Exact),
            fuzzy: analysis.count(MatchKind::Fuzzy),
            route_needs_file: analysis.count(MatchKind::RouteNeedsFile),
            file_needs_route: analysis.count(MatchKind::FileNeedsRoute),
            excluded_routes: routes.iter().filter(|r| r.kind.is_none()).count(),
            actions: analysis.actions.len(),
            warnings: analysis.warnings.len(),
        };

        Self {
            router_source: config.router_source.clone(),
            pages_root: config.pages_root.clone(),
            fuzzy_threshold: config.fuzzy_threshold,
            summary,
            routes,
            files: files.into_iter().flatten().collect(),
            skipped_files: analysis.skipped.clone(),
            actions: analysis
                .actions
                .iter()
                .map(|a| ActionEntry { description: a.describe(), action: a.clone() })
                .collect(),
            warnings: analysis.warnings.clone(),
            apply: None,
        }
    }

    /// Attaches an apply outcome.
    #[must_use]
    pub fn with_apply(mut self, outcome: ApplyOutcome) -> Self {
        self.apply = Some(outcome);
        self
    }

    /// Pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Renders `report` for a terminal.
#[must_use]
pub fn format_text(report: &Report) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Router source: {}", report.router_source.display());
    let _ = writeln!(out, "Pages root:    {}", report.pages_root.display());
    let _ = writeln!(out, "Threshold:     {:.2}", report.fuzzy_threshold);

    let _ = writeln!(out, "\nRoutes ({})", report.routes.len());
    let route_rows: Vec<(String, String)> = report.routes.iter().map(route_row).collect();
    write_rows(&mut out, &route_rows);

    let _ = writeln!(out, "\nFiles ({})", report.files.len());
    let file_rows: Vec<(String, String)> = report
        .files
        .iter()
        .map(|f| {
            let target = f.route.as_ref().map_or_else(
                || f.relative_path.clone(),
                |r| format!("{} <- {r}", f.relative_path),
            );
            (label(Some(f.kind), f.score), target)
        })
        .collect();
    write_rows(&mut out, &file_rows);

    if !report.skipped_files.is_empty() {
        let _ = writeln!(out, "\nSkipped ({})", report.skipped_files.len());
        for skipped in &report.skipped_files {
            let _ = writeln!(out, "  {skipped}");
        }
    }

    let _ = writeln!(out, "\nActions ({})", report.actions.len());
    for (i, entry) in report.actions.iter().enumerate() {
        let _ = writeln!(out, "  {}. {}", i + 1, entry.description);
    }

    if !report.warnings.is_empty() {
        let _ = writeln!(out, "\nWarnings ({})", report.warnings.len());
        for warning in &report.warnings {
            let _ = writeln!(out, "  - {warning}");
        }
    }

    let s = &report.summary;
    let _ = writeln!(
        out,
        "\n{} exact, {} fuzzy, {} route-needs-file, {} file-needs-route, {} excluded; {} action(s)",
        s.exact, s.fuzzy, s.route_needs_file, s.file_needs_route, s.excluded_routes, s.actions
    );

    if let Some(outcome) = &report.apply {
        out.push_str(&format_apply(outcome));
    }
    out
}

fn format_apply(outcome: &ApplyOutcome) -> String {
    let mut out = String::new();
    let status = match outcome.status {
        ApplyStatus::Complete => "complete",
        ApplyStatus::Incomplete => "incomplete",
    };
    let _ = writeln!(
        out,
        "\nApply {status}: {} applied, {} failed, {} residual after {} pass(es)",
        outcome.applied.len(),
        outcome.failed.len(),
        outcome.residual(),
        outcome.passes
    );
    for backup in &outcome.backup_paths {
        let _ = writeln!(out, "  backup: {}", backup.display());
    }
    for failed in &outcome.failed {
        let _ = writeln!(out, "  failed: {} ({})", failed.action.describe(), failed.reason);
    }
    for residual in &outcome.residual_actions {
        let _ = writeln!(out, "  residual: {}", residual.describe());
    }
    out
}

fn route_row(route: &RouteEntry) -> (String, String) {
    let mut target = route.path.clone();
    if let Some(file) = &route.file {
        let _ = write!(target, " -> {file}");
    } else if route.kind.is_none() {
        let reason = if route.disabled {
            "disabled"
        } else if route.parameterized {
            "parameterized"
        } else {
            "redirect"
        };
        let _ = write!(target, " ({reason})");
    }
    (label(route.kind, route.score), target)
}

fn label(kind: Option<MatchKind>, score: Option<f64>) -> String {
    match (kind, score) {
        (Some(kind), Some(score)) => format!("{} ({score:.2})", kind.label()),
        (Some(kind), None) => kind.label().to_string(),
        (None, _) => "excluded".to_string(),
    }
}

fn write_rows(out: &mut String, rows: &[(String, String)]) {
    let width = rows.iter().map(|r| r.0.len()).max().unwrap_or(0);
    for (label, target) in rows {
        let _ = writeln!(out, "  {label:<width$}  {target}");
    }
}
