//! Fix applier: backs up the router source, executes the plan and
//! re-verifies.
//!
//! Source edits are whole-field or whole-block splices computed against the
//! text the plan was made from, applied back to front so earlier offsets stay
//! valid.

pub mod template;

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;
use tracing::{info, warn};

use crate::config::ReconcileConfig;
use crate::context::ServiceContext;
use crate::error::{Result, RouteSyncError, Warning};
use crate::extract::lexer::{classify, find_matching, innermost_open_bracket, Class};
use crate::extract::SourceFile;
use crate::model::{ComponentField, FixAction, Route, Span, SynthesizedRoute};
use crate::pipeline::{analyze, Analysis};

use template::{escape_js, PageTemplate};

const INDENT_STEP: &str = "  ";

/// Whether re-verification found nothing left to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplyStatus {
    /// No actions remain.
    Complete,
    /// Actions remain after the retry pass.
    Incomplete,
}

/// An action that could not be executed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedAction {
    /// The action.
    pub action: FixAction,
    /// Why it failed.
    pub reason: String,
}

/// What an apply run did.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApplyOutcome {
    /// One backup per router source file.
    pub backup_paths: Vec<PathBuf>,
    /// Actions executed, across both passes.
    pub applied: Vec<FixAction>,
    /// Actions that failed, across both passes.
    pub failed: Vec<FailedAction>,
    /// Number of passes that executed actions (0, 1 or 2).
    pub passes: usize,
    /// Actions still planned after the final re-verification.
    pub residual_actions: Vec<FixAction>,
    /// Problems met while applying.
    pub warnings: Vec<Warning>,
    /// Overall status.
    pub status: ApplyStatus,
}

impl ApplyOutcome {
    /// Number of residual actions.
    #[must_use]
    pub fn residual(&self) -> usize {
        self.residual_actions.len()
    }
}

#[derive(Debug, Default)]
struct PassOutcome {
    applied: Vec<FixAction>,
    failed: Vec<FailedAction>,
    warnings: Vec<Warning>,
}

/// Applies `analysis.actions`, then re-runs the pipeline. When actions
/// remain, one retry pass applies the new plan and the pipeline runs a final
/// time.
///
/// Every router source file is backed up before the first mutation.
///
/// # Errors
///
/// Returns [`RouteSyncError::Backup`] if a backup cannot be written, in which
/// case nothing was mutated, or an I/O error if re-verification fails.
pub fn apply_plan(
    ctx: &ServiceContext,
    config: &ReconcileConfig,
    analysis: &Analysis,
) -> Result<ApplyOutcome> {
    if analysis.actions.is_empty() {
        info!("nothing to apply");
        return Ok(ApplyOutcome {
            backup_paths: Vec::new(),
            applied: Vec::new(),
            failed: Vec::new(),
            passes: 0,
            residual_actions: Vec::new(),
            warnings: Vec::new(),
            status: ApplyStatus::Complete,
        });
    }

    let backup_paths = backup_sources(ctx, &analysis.sources, &config.backup_dir)?;

    let mut total = execute(ctx, analysis);
    let mut passes = 1;
    let mut current = reverify(ctx, config, &backup_paths, total.applied.len())?;
    if !current.actions.is_empty() {
        info!(remaining = current.actions.len(), "retrying residual actions");
        let retry = execute(ctx, &current);
        total.applied.extend(retry.applied);
        total.failed.extend(retry.failed);
        total.warnings.extend(retry.warnings);
        passes = 2;
        current = reverify(ctx, config, &backup_paths, total.applied.len())?;
    }

    let status = if current.actions.is_empty() {
        ApplyStatus::Complete
    } else {
        ApplyStatus::Incomplete
    };
    info!(
        applied = total.applied.len(),
        failed = total.failed.len(),
        residual = current.actions.len(),
        "apply finished"
    );
    Ok(ApplyOutcome {
        backup_paths,
        applied: total.applied,
        failed: total.failed,
        passes,
        residual_actions: current.actions,
        warnings: total.warnings,
        status,
    })
}

/// Re-runs the pipeline once fixes have been written. A failure here keeps
/// the backup paths so the caller can still report what was changed.
fn reverify(
    ctx: &ServiceContext,
    config: &ReconcileConfig,
    backup_paths: &[PathBuf],
    applied: usize,
) -> Result<Analysis> {
    analyze(ctx, config).map_err(|e| {
        warn!(
            backups = ?backup_paths,
            applied,
            error = %e,
            "re-verification failed after applying fixes"
        );
        RouteSyncError::Reverify { backups: backup_paths.to_vec(), applied, source: Box::new(e) }
    })
}

/// Copies every source file to `<backup_dir>/<file name>.<stamp>.bak`.
fn backup_sources(
    ctx: &ServiceContext,
    sources: &[SourceFile],
    backup_dir: &Path,
) -> Result<Vec<PathBuf>> {
    let stamp = ctx.clock.now().format("%Y%m%dT%H%M%SZ").to_string();
    let mut taken = BTreeSet::new();
    let mut paths = Vec::with_capacity(sources.len());

    for source in sources {
        let file_name = source
            .path
            .file_name()
            .map_or_else(|| "router".to_string(), |n| n.to_string_lossy().into_owned());
        let mut target = backup_dir.join(format!("{file_name}.{stamp}.bak"));
        let mut n = 2;
        while taken.contains(&target) || ctx.fs.exists(&target) {
            target = backup_dir.join(format!("{file_name}.{n}.{stamp}.bak"));
            n += 1;
        }
        ctx.fs
            .write(&target, &source.text)
            .map_err(|e| RouteSyncError::Backup { path: source.path.clone(), source: e })?;
        info!(
            source = %source.path.display(),
            backup = %target.display(),
            "backed up router source"
        );
        taken.insert(target.clone());
        paths.push(target);
    }
    Ok(paths)
}

/// A replacement of `span` with `text`. Empty spans are insertions.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Edit {
    span: Span,
    text: String,
}

impl Edit {
    fn insert(at: usize, text: String) -> Self {
        Self { span: Span::new(at, at), text }
    }
}

/// Applies non-overlapping edits back to front.
fn splice(text: &str, mut edits: Vec<Edit>) -> String {
    edits.sort_by(|a, b| b.span.start.cmp(&a.span.start));
    let mut out = text.to_string();
    for edit in edits {
        out.replace_range(edit.span.start..edit.span.end, &edit.text);
    }
    out
}

struct SourceEdits<'a> {
    source: &'a SourceFile,
    classes: Vec<Class>,
    edits: Vec<Edit>,
    actions: Vec<FixAction>,
}

/// Executes one plan. Failures are collected; nothing here aborts.
fn execute(ctx: &ServiceContext, analysis: &Analysis) -> PassOutcome {
    let mut outcome = PassOutcome::default();
    let mut per_source: BTreeMap<&Path, SourceEdits<'_>> = BTreeMap::new();
    for source in &analysis.sources {
        per_source.insert(
            source.path.as_path(),
            SourceEdits {
                source,
                classes: classify(source.text.as_bytes()),
                edits: Vec::new(),
                actions: Vec::new(),
            },
        );
    }
    let mut inserts: Vec<(&FixAction, &SynthesizedRoute)> = Vec::new();

    for action in &analysis.actions {
        match action {
            FixAction::RewriteComponentRef { route, new_reference, .. } => {
                let route = &analysis.routes[*route];
                match per_source.get_mut(route.source.as_path()) {
                    Some(entry) => {
                        let edit =
                            rewrite_edit(&entry.source.text, &entry.classes, route, new_reference);
                        entry.edits.push(edit);
                        entry.actions.push(action.clone());
                    }
                    None => {
                        let reason = format!("source {} was not loaded", route.source.display());
                        fail(&mut outcome, action, reason);
                    }
                }
            }
            FixAction::ScaffoldFile { route_path, title, target, .. } => {
                if ctx.fs.exists(target) {
                    warn!(target = %target.display(), "scaffold target already exists");
                    outcome.warnings.push(Warning::ScaffoldCollision { path: target.clone() });
                    fail(&mut outcome, action, format!("{} already exists", target.display()));
                    continue;
                }
                let page = PageTemplate::for_path(target).render(target, route_path, title);
                match ctx.fs.write(target, &page) {
                    Ok(()) => {
                        info!(action = %action.describe(), "applied");
                        outcome.applied.push(action.clone());
                    }
                    Err(e) => fail(&mut outcome, action, format!("write failed: {e}")),
                }
            }
            FixAction::InsertRoute { route, .. } => inserts.push((action, route)),
        }
    }

    if !inserts.is_empty() {
        let primary =
            insertion_source(&analysis.sources, &analysis.routes).map(|s| s.path.as_path());
        let entry = primary.and_then(|p| per_source.get_mut(p));
        let located = entry.and_then(|entry| {
            let list = locate_route_list(
                &entry.source.text,
                &entry.classes,
                &analysis.routes,
                &entry.source.path,
            )?;
            Some((entry, list))
        });
        match located {
            Some((entry, list)) => {
                let routes: Vec<&SynthesizedRoute> = inserts.iter().map(|(_, r)| *r).collect();
                entry.edits.push(insert_edit(&entry.source.text, &entry.classes, &list, &routes));
                entry.actions.extend(inserts.iter().map(|(a, _)| (*a).clone()));
            }
            None => {
                for (action, _) in &inserts {
                    let reason = "no top-level route list found in the router source";
                    fail(&mut outcome, action, reason.to_string());
                }
            }
        }
    }

    for entry in per_source.into_values() {
        if entry.edits.is_empty() {
            continue;
        }
        let updated = splice(&entry.source.text, entry.edits);
        match ctx.fs.write(&entry.source.path, &updated) {
            Ok(()) => {
                for action in entry.actions {
                    info!(action = %action.describe(), "applied");
                    outcome.applied.push(action);
                }
            }
            Err(e) => {
                for action in &entry.actions {
                    let reason = format!("write of {} failed: {e}", entry.source.path.display());
                    fail(&mut outcome, action, reason);
                }
            }
        }
    }

    outcome.applied.sort_by_key(FixAction::rank);
    outcome
}

fn fail(outcome: &mut PassOutcome, action: &FixAction, reason: String) {
    warn!(action = %action.describe(), %reason, "action failed");
    outcome.failed.push(FailedAction { action: action.clone(), reason });
}

/// Replaces the route's component reference, or adds a component field to a
/// block that has none.
fn rewrite_edit(text: &str, classes: &[Class], route: &Route, reference: &str) -> Edit {
    let reference = escape_js(reference);
    match &route.component {
        Some(ComponentField { literal: Some(literal), .. }) => {
            Edit { span: *literal, text: reference }
        }
        Some(ComponentField { value, literal: None }) => {
            Edit { span: *value, text: format!("() => import('{reference}')") }
        }
        None => {
            let bytes = text.as_bytes();
            let close = route.block.end - 1;
            let last = last_significant(bytes, classes, route.block.start + 1, close)
                .unwrap_or(route.block.start);
            let comma = if matches!(bytes[last], b',' | b'{') { "" } else { "," };
            let field = format!("component: () => import('{reference}')");
            let block_text = &text[route.block.start..route.block.end];
            if block_text.contains('\n') {
                let first_field = route.block.start + 1 + leading_ws(block_text);
                let indent = line_indent(text, line_start_of(text, first_field));
                Edit::insert(last + 1, format!("{comma}\n{indent}{field},"))
            } else {
                Edit::insert(last + 1, format!("{comma} {field}"))
            }
        }
    }
}

/// Opening and closing bracket of the top-level route array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RouteList {
    open: usize,
    close: usize,
    /// Start of the first active top-level route block, if any.
    anchor: Option<usize>,
}

fn routes_array_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\broutes\b\s*(?::[^=\n]*?)?[:=]\s*\[").expect("valid routes regex")
    })
}

/// The source file whose top-level route list receives inserted routes.
///
/// That is the first source declaring an active top-level route, else the
/// first source with a `routes` array literal.
pub(crate) fn insertion_source<'a>(
    sources: &'a [SourceFile],
    routes: &[Route],
) -> Option<&'a SourceFile> {
    sources
        .iter()
        .find(|source| routes.iter().any(|r| is_anchor(r, &source.path)))
        .or_else(|| sources.iter().find(|source| has_routes_array(&source.text)))
}

fn is_anchor(route: &Route, source: &Path) -> bool {
    route.source == source && route.depth == 0 && !route.is_disabled
}

fn has_routes_array(text: &str) -> bool {
    let classes = classify(text.as_bytes());
    routes_array_re().find_iter(text).any(|m| classes[m.start()] == Class::Code)
}

/// The array enclosing the first active top-level route of `source`, else
/// the first `routes` array literal.
fn locate_route_list(
    text: &str,
    classes: &[Class],
    routes: &[Route],
    source: &Path,
) -> Option<RouteList> {
    let bytes = text.as_bytes();
    let anchor = routes.iter().find(|r| is_anchor(r, source));
    if let Some(route) = anchor {
        if let Some(open) = innermost_open_bracket(bytes, classes, route.block.start) {
            if let Some(close) = find_matching(bytes, classes, open) {
                return Some(RouteList { open, close, anchor: Some(route.block.start) });
            }
        }
    }
    let open = routes_array_re()
        .find_iter(text)
        .find(|m| classes[m.start()] == Class::Code)
        .map(|m| m.end() - 1)?;
    let close = find_matching(bytes, classes, open)?;
    Some(RouteList { open, close, anchor: None })
}

/// Appends serialized route blocks after the last element of `list`.
fn insert_edit(
    text: &str,
    classes: &[Class],
    list: &RouteList,
    routes: &[&SynthesizedRoute],
) -> Edit {
    let bytes = text.as_bytes();
    let list_indent = line_indent(text, line_start_of(text, list.open));
    let element_indent = match list.anchor {
        Some(anchor) => line_indent(text, line_start_of(text, anchor)).to_string(),
        None => format!("{list_indent}{INDENT_STEP}"),
    };

    let mut out = String::new();
    let last = last_significant(bytes, classes, list.open + 1, list.close);
    let at = match last {
        Some(last) => {
            if bytes[last] != b',' {
                out.push(',');
            }
            last + 1
        }
        None => list.open + 1,
    };
    for route in routes {
        out.push('\n');
        out.push_str(&serialize_route(route, &element_indent));
    }
    if last.is_none() {
        out.push('\n');
        out.push_str(list_indent);
    }
    Edit::insert(at, out)
}

/// Route block text, first line indented by `indent`, ending in `},`.
fn serialize_route(route: &SynthesizedRoute, indent: &str) -> String {
    let inner = format!("{indent}{INDENT_STEP}");
    format!(
        "{indent}{{
{inner}path: '{}',
{inner}name: '{}',
{inner}component: () => import('{}'),
{inner}meta: {{ title: '{}' }},
{indent}}},",
        escape_js(&route.path),
        escape_js(&route.name),
        escape_js(&route.component_ref),
        escape_js(&route.title),
    )
}

/// Last byte in `[from, to)` that is neither whitespace nor comment.
fn last_significant(bytes: &[u8], classes: &[Class], from: usize, to: usize) -> Option<usize> {
    (from..to).rev().find(|&i| classes[i] != Class::Comment && !bytes[i].is_ascii_whitespace())
}

fn line_start_of(text: &str, pos: usize) -> usize {
    text[..pos].rfind('\n').map_or(0, |i| i + 1)
}

fn line_indent(text: &str, line_start: usize) -> &str {
    let rest = &text[line_start..];
    let len = rest.len() - rest.trim_start_matches([' ', '\t']).len();
    &rest[..len]
}

fn leading_ws(text: &str) -> usize {
    let body = &text[1..];
    body.len() - body.trim_start().len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::testing::{disk_context, fixed_clock, MemFs};
    use crate::extract::extract_routes;

    const SOURCE: &str = "/app/src/router/index.js";

    fn routes_of(text: &str) -> Vec<Route> {
        extract_routes(&[SourceFile { path: PathBuf::from(SOURCE), text: text.to_string() }]).routes
    }

    fn synthesized(path: &str, name: &str) -> SynthesizedRoute {
        SynthesizedRoute {
            path: path.into(),
            name: name.into(),
            title: "Quarterly Summary".into(),
            component_ref: "@/pages/reports/QuarterlySummary.vue".into(),
        }
    }

    fn insert_into(text: &str) -> String {
        let classes = classify(text.as_bytes());
        let routes = routes_of(text);
        let list = locate_route_list(text, &classes, &routes, Path::new(SOURCE)).unwrap();
        let route = synthesized("/reports/quarterly-summary", "QuarterlySummary");
        splice(text, vec![insert_edit(text, &classes, &list, &[&route])])
    }

    #[test]
    fn rewrite_replaces_only_the_literal() {
        let text = "\
const routes = [
  {
    path: '/billing/invoices',
    component: () => import(\"@/pages/fiannce/Invoices.vue\"), // typo
  },
]
";
        let routes = routes_of(text);
        let classes = classify(text.as_bytes());
        let edit = rewrite_edit(text, &classes, &routes[0], "@/pages/finance/Invoices.vue");
        let updated = splice(text, vec![edit]);
        assert_eq!(updated, text.replace("fiannce", "finance"));
    }

    #[test]
    fn rewrite_replaces_identifier_value() {
        let text = "\
const routes = [
  { path: '/settings', component: SettingsView, meta: { auth: true } },
]
";
        let routes = routes_of(text);
        let classes = classify(text.as_bytes());
        let edit = rewrite_edit(text, &classes, &routes[0], "@/pages/Settings.vue");
        let updated = splice(text, vec![edit]);
        assert!(updated
            .contains("component: () => import('@/pages/Settings.vue'), meta: { auth: true }"));
    }

    #[test]
    fn rewrite_adds_missing_component_field() {
        let text = "const routes = [\n  {\n    path: '/team',\n    name: 'Team'\n  },\n]\n";
        let routes = routes_of(text);
        let edit = rewrite_edit(text, &classify(text.as_bytes()), &routes[0], "@/pages/Team.vue");
        let updated = splice(text, vec![edit]);
        assert_eq!(
            updated,
            "\
const routes = [
  {
    path: '/team',
    name: 'Team',
    component: () => import('@/pages/Team.vue'),
  },
]
"
        );
    }

    #[test]
    fn insert_appends_after_last_top_level_route() {
        let text = "\
const routes = [
  {
    path: '/',
    component: Home,
    children: [
      { path: 'nested', component: Nested },
    ],
  }
]
";
        let updated = insert_into(text);
        let expected = "\
const routes = [
  {
    path: '/',
    component: Home,
    children: [
      { path: 'nested', component: Nested },
    ],
  },
  {
    path: '/reports/quarterly-summary',
    name: 'QuarterlySummary',
    component: () => import('@/pages/reports/QuarterlySummary.vue'),
    meta: { title: 'Quarterly Summary' },
  },
]
";
        assert_eq!(updated, expected);
        assert_eq!(routes_of(&updated).len(), 3);
    }

    #[test]
    fn insert_skips_trailing_comments() {
        let text = "\
const routes = [
  { path: '/', component: Home },
  // { path: '/legacy', component: Legacy },
]
";
        let updated = insert_into(text);
        assert!(updated.starts_with("const routes = [\n  { path: '/', component: Home },\n  {\n"));
        assert!(updated.contains("  // { path: '/legacy', component: Legacy },\n]\n"));
    }

    #[test]
    fn insert_into_empty_routes_array() {
        let text = "export const routes = []\n";
        let updated = insert_into(text);
        assert!(updated
            .starts_with("export const routes = [\n  {\n    path: '/reports/quarterly-summary',"));
        assert!(updated.ends_with("  },\n]\n"));
    }

    #[test]
    fn insertion_source_skips_files_without_routes() {
        let source = |path: &str, text: &str| SourceFile {
            path: PathBuf::from(path),
            text: text.to_string(),
        };
        let sources = vec![
            source("/app/src/router/guards.js", "export const requireAuth = (to) => !!to\n"),
            source(
                "/app/src/router/index.js",
                "const routes = [\n  { path: '/', component: Home },\n]\n",
            ),
        ];
        let routes = extract_routes(&sources).routes;
        let chosen = insertion_source(&sources, &routes).unwrap();
        assert_eq!(chosen.path, Path::new("/app/src/router/index.js"));

        let declared = vec![
            source("/app/src/router/a.js", "// routes = [ ]\n"),
            source("/app/src/router/b.js", "export const routes: RouteRecordRaw[] = []\n"),
        ];
        let chosen = insertion_source(&declared, &[]).unwrap();
        assert_eq!(chosen.path, Path::new("/app/src/router/b.js"));
        assert!(insertion_source(&declared[..1], &[]).is_none());
    }

    #[test]
    fn missing_route_list_is_a_failed_action() {
        let fs = MemFs::default().with_file(SOURCE, "export default {}\n");
        let ctx = ServiceContext::new(Box::new(fixed_clock()), Box::new(fs));
        let action = FixAction::InsertRoute {
            file: 0,
            relative_path: "reports/QuarterlySummary.vue".into(),
            route: synthesized("/reports/quarterly-summary", "QuarterlySummary"),
        };
        let analysis = Analysis {
            sources: vec![SourceFile {
                path: PathBuf::from(SOURCE),
                text: "export default {}\n".into(),
            }],
            routes: Vec::new(),
            files: Vec::new(),
            skipped: Vec::new(),
            results: Vec::new(),
            actions: vec![action],
            warnings: Vec::new(),
        };
        let outcome = execute(&ctx, &analysis);
        assert!(outcome.applied.is_empty());
        assert_eq!(outcome.failed.len(), 1);
        assert!(outcome.failed[0].reason.contains("route list"));
    }

    #[test]
    fn backup_failure_aborts_before_mutation() {
        let original =
            "const routes = [\n  { path: '/a', component: () => import('@/pages/Aa.vue') },\n]\n";
        let fs = MemFs::default().with_file(SOURCE, original).deny_writes_under("/backups");
        let ctx = ServiceContext::new(Box::new(fixed_clock()), Box::new(fs));
        let mut config =
            ReconcileConfig::with_roots(Path::new(SOURCE), Path::new("/app/src/pages"));
        config.backup_dir = PathBuf::from("/backups");
        let mut routes = routes_of(original);
        routes[0].resolved_path = Some(PathBuf::from("/app/src/pages/Aa.vue"));
        let analysis = Analysis {
            sources: vec![SourceFile { path: PathBuf::from(SOURCE), text: original.into() }],
            routes,
            files: Vec::new(),
            skipped: Vec::new(),
            results: Vec::new(),
            actions: vec![FixAction::RewriteComponentRef {
                route: 0,
                route_path: "/a".into(),
                source: PathBuf::from(SOURCE),
                new_resolved_path: PathBuf::from("/app/src/pages/A.vue"),
                new_reference: "@/pages/A.vue".into(),
            }],
            warnings: Vec::new(),
        };

        let err = apply_plan(&ctx, &config, &analysis).unwrap_err();
        assert!(matches!(err, RouteSyncError::Backup { .. }));
        assert_eq!(ctx.fs.read_to_string(Path::new(SOURCE)).unwrap(), original);
    }

    #[test]
    fn failed_reverification_keeps_backups_and_counts() {
        let dir = tempfile::tempdir().unwrap();
        let router = dir.path().join("src/router/index.js");
        let pages = dir.path().join("src/pages");
        std::fs::create_dir_all(router.parent().unwrap()).unwrap();
        std::fs::create_dir_all(pages.join("finance")).unwrap();
        std::fs::write(
            &router,
            "\
const routes = [
  { path: '/billing/invoices', component: () => import('@/pages/fiannce/Invoices.vue') },
]
",
        )
        .unwrap();
        std::fs::write(pages.join("finance/Invoices.vue"), "<template />").unwrap();

        let ctx = disk_context();
        let mut config = ReconcileConfig::with_roots(&router, &pages);
        config.backup_dir = dir.path().join("backups");
        let analysis = analyze(&ctx, &config).unwrap();
        assert_eq!(analysis.actions.len(), 1);
        std::fs::remove_dir_all(&pages).unwrap();

        let err = apply_plan(&ctx, &config, &analysis).unwrap_err();
        let RouteSyncError::Reverify { backups, applied, .. } = &err else {
            panic!("unexpected error: {err}");
        };
        assert_eq!(*applied, 1);
        assert_eq!(backups.len(), 1);
        assert!(backups[0].is_file());
        assert!(err.to_string().contains(&backups[0].display().to_string()));
        assert!(std::fs::read_to_string(&router).unwrap().contains("@/pages/finance/Invoices.vue"));
    }

    #[test]
    fn backups_are_stamped_and_deduplicated() {
        let fs = MemFs::default().with_file("/bk/index.js.20250615T100000Z.bak", "older");
        let ctx = ServiceContext::new(Box::new(fixed_clock()), Box::new(fs));
        let sources = vec![
            SourceFile { path: PathBuf::from("/r/index.js"), text: "a".into() },
            SourceFile { path: PathBuf::from("/r/admin/index.js"), text: "b".into() },
        ];
        let paths = backup_sources(&ctx, &sources, Path::new("/bk")).unwrap();
        assert_eq!(
            paths,
            vec![
                PathBuf::from("/bk/index.js.2.20250615T100000Z.bak"),
                PathBuf::from("/bk/index.js.3.20250615T100000Z.bak")
            ]
        );
        assert_eq!(ctx.fs.read_to_string(&paths[1]).unwrap(), "b");
    }

    #[test]
    fn scaffold_collision_is_reported_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let existing = dir.path().join("Old.vue");
        std::fs::write(&existing, "keep me").unwrap();
        let fresh = dir.path().join("New.vue");
        let analysis = Analysis {
            sources: Vec::new(),
            routes: Vec::new(),
            files: Vec::new(),
            skipped: Vec::new(),
            results: Vec::new(),
            actions: vec![
                FixAction::ScaffoldFile {
                    route: 0,
                    route_path: "/old".into(),
                    name: None,
                    title: "Old".into(),
                    target: existing.clone(),
                },
                FixAction::ScaffoldFile {
                    route: 1,
                    route_path: "/new".into(),
                    name: None,
                    title: "New".into(),
                    target: fresh.clone(),
                },
            ],
            warnings: Vec::new(),
        };
        let outcome = execute(&disk_context(), &analysis);
        assert_eq!(outcome.applied.len(), 1);
        assert_eq!(outcome.failed.len(), 1);
        assert_eq!(outcome.warnings, vec![Warning::ScaffoldCollision { path: existing.clone() }]);
        assert_eq!(std::fs::read_to_string(existing).unwrap(), "keep me");
        assert!(std::fs::read_to_string(fresh).unwrap().contains("<h1>New</h1>"));
    }
}
