//! One full analysis pass: extract, resolve, scan, match, plan.

use tracing::info;

use crate::apply::insertion_source;
use crate::config::ReconcileConfig;
use crate::context::ServiceContext;
use crate::error::{Result, Warning};
use crate::extract::{extract_routes, load_sources, SourceFile};
use crate::inventory::{scan_pages, ScanOptions};
use crate::matching::{match_routes, MatchOptions};
use crate::model::{FixAction, MatchKind, MatchResult, PageFile, Route};
use crate::plan::Planner;
use crate::resolve::Resolver;

/// Everything one pass computed. Match results and actions index into
/// `routes` and `files`.
#[derive(Debug, Clone)]
pub struct Analysis {
    /// Router source files as read.
    pub sources: Vec<SourceFile>,
    /// Extracted and resolved routes.
    pub routes: Vec<Route>,
    /// Scanned page files.
    pub files: Vec<PageFile>,
    /// Relative paths the scanner skipped as noise.
    pub skipped: Vec<String>,
    /// Match classification.
    pub results: Vec<MatchResult>,
    /// Planned fixes, in application order.
    pub actions: Vec<FixAction>,
    /// Parse and resolution warnings.
    pub warnings: Vec<Warning>,
}

impl Analysis {
    /// Number of results of `kind`.
    #[must_use]
    pub fn count(&self, kind: MatchKind) -> usize {
        self.results.iter().filter(|r| r.kind == kind).count()
    }
}

/// Routes read from the router source, references resolved.
#[derive(Debug, Clone)]
pub struct RouteListing {
    /// Router source files as read.
    pub sources: Vec<SourceFile>,
    /// Routes in extraction order.
    pub routes: Vec<Route>,
    /// Parse and resolution warnings.
    pub warnings: Vec<Warning>,
}

/// Loads, extracts and resolves the routes.
///
/// # Errors
///
/// Returns an error if the router source cannot be read.
pub fn load_routes(ctx: &ServiceContext, config: &ReconcileConfig) -> Result<RouteListing> {
    let sources = load_sources(ctx.fs.as_ref(), &config.router_source, &config.source_extensions)?;
    let extraction = extract_routes(&sources);
    let mut routes = extraction.routes;
    let mut warnings = extraction.warnings;
    warnings.extend(Resolver::new(&config.aliases).resolve_routes(&mut routes));
    info!(
        sources = sources.len(),
        routes = routes.len(),
        warnings = warnings.len(),
        "extracted routes"
    );
    Ok(RouteListing { sources, routes, warnings })
}

/// Scan options taken from the configuration.
#[must_use]
pub fn scan_options(config: &ReconcileConfig) -> ScanOptions {
    ScanOptions {
        page_extensions: config.page_extensions.clone(),
        denylist: config.denylist.clone(),
    }
}

/// Runs the read-only pipeline.
///
/// # Errors
///
/// Returns an error if the router source or the pages root cannot be read.
pub fn analyze(ctx: &ServiceContext, config: &ReconcileConfig) -> Result<Analysis> {
    let RouteListing { sources, routes, warnings } = load_routes(ctx, config)?;
    let resolver = Resolver::new(&config.aliases);

    let inventory = scan_pages(&config.pages_root, &scan_options(config))?;

    let options = MatchOptions { fuzzy_threshold: config.fuzzy_threshold };
    let results = match_routes(&routes, &inventory.files, &options);

    let primary_source = insertion_source(&sources, &routes)
        .or_else(|| sources.first())
        .map_or(config.router_source.as_path(), |s| s.path.as_path());
    let planner = Planner {
        resolver: &resolver,
        pages_root: &config.pages_root,
        default_page_extension: &config.default_page_extension,
        primary_source,
    };
    let actions = planner.plan(&routes, &inventory.files, &results);

    let analysis = Analysis {
        sources,
        routes,
        files: inventory.files,
        skipped: inventory.skipped,
        results,
        actions,
        warnings,
    };
    info!(
        routes = analysis.routes.len(),
        files = analysis.files.len(),
        exact = analysis.count(MatchKind::Exact),
        fuzzy = analysis.count(MatchKind::Fuzzy),
        route_needs_file = analysis.count(MatchKind::RouteNeedsFile),
        file_needs_route = analysis.count(MatchKind::FileNeedsRoute),
        actions = analysis.actions.len(),
        "analysis complete"
    );
    Ok(analysis)
}
