//! Fix planner: turns match results into an ordered list of fix actions.

pub mod titles;

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::model::{FixAction, MatchKind, MatchResult, PageFile, Route, SynthesizedRoute};
use crate::resolve::Resolver;
use crate::tokens::{is_param_segment, kebab_case, pascal_case};

pub use titles::title_for;

/// Everything the planner needs besides the match results.
#[derive(Debug, Clone, Copy)]
pub struct Planner<'a> {
    /// Resolver used to write new references.
    pub resolver: &'a Resolver,
    /// Root of the page inventory.
    pub pages_root: &'a Path,
    /// Extension for scaffolded pages whose target has none.
    pub default_page_extension: &'a str,
    /// Source file new routes are inserted into.
    pub primary_source: &'a Path,
}

impl Planner<'_> {
    /// Maps every non-exact result to one action. Rewrites come first, then
    /// scaffolds, then inserts; within a kind, result order is kept.
    #[must_use]
    pub fn plan(
        &self,
        routes: &[Route],
        files: &[PageFile],
        results: &[MatchResult],
    ) -> Vec<FixAction> {
        let mut taken_names: BTreeSet<String> =
            routes.iter().filter_map(|r| r.name.clone()).collect();
        let mut actions = Vec::new();

        for result in results {
            let action = match (result.kind, result.route, result.file) {
                (MatchKind::Fuzzy, Some(route), Some(file)) => {
                    Some(self.rewrite(route, &routes[route], &files[file]))
                }
                (MatchKind::RouteNeedsFile, Some(route), _) => {
                    Some(self.scaffold(route, &routes[route]))
                }
                (MatchKind::FileNeedsRoute, _, Some(file)) => {
                    Some(self.insert(file, &files[file], &mut taken_names))
                }
                _ => None,
            };
            if let Some(action) = action {
                debug!(action = %action.describe(), "planned");
                actions.push(action);
            }
        }

        actions.sort_by_key(FixAction::rank);
        actions
    }

    fn rewrite(&self, index: usize, route: &Route, file: &PageFile) -> FixAction {
        FixAction::RewriteComponentRef {
            route: index,
            route_path: route.path.clone(),
            source: route.source.clone(),
            new_resolved_path: file.absolute_path.clone(),
            new_reference: self.resolver.reference_for(&file.absolute_path, &route.source),
        }
    }

    fn scaffold(&self, index: usize, route: &Route) -> FixAction {
        let segments = literal_segments(&route.path);
        let last = segments.last().copied().unwrap_or("home");
        FixAction::ScaffoldFile {
            route: index,
            route_path: route.path.clone(),
            name: route.name.clone(),
            title: title_for(last),
            target: self.scaffold_target(route, &segments),
        }
    }

    fn scaffold_target(&self, route: &Route, segments: &[&str]) -> PathBuf {
        match &route.resolved_path {
            Some(path) if path.extension().is_some() => path.clone(),
            Some(path) => path.with_extension(self.default_page_extension),
            None => {
                let mut target = self.pages_root.to_path_buf();
                let (last, dirs) =
                    segments.split_last().map_or(("home", &[][..]), |(l, d)| (*l, d));
                for dir in dirs {
                    target.push(kebab_case(dir));
                }
                target.push(format!("{}.{}", pascal_case(last), self.default_page_extension));
                target
            }
        }
    }

    fn insert(
        &self,
        index: usize,
        file: &PageFile,
        taken_names: &mut BTreeSet<String>,
    ) -> FixAction {
        let component_ref = self.resolver.reference_for(&file.absolute_path, self.primary_source);
        let route = synthesize_route(&file.relative_path, taken_names, component_ref);
        taken_names.insert(route.name.clone());
        FixAction::InsertRoute { file: index, relative_path: file.relative_path.clone(), route }
    }
}

/// Path segments that are neither empty nor parameters.
fn literal_segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty() && !is_param_segment(s)).collect()
}

/// Builds a route for an orphaned file: extension and a trailing `index`
/// segment stripped, kebab-cased path, PascalCase name unique among
/// `taken_names`.
fn synthesize_route(
    relative_path: &str,
    taken_names: &BTreeSet<String>,
    component_ref: String,
) -> SynthesizedRoute {
    let mut segments: Vec<&str> = relative_path.split('/').filter(|s| !s.is_empty()).collect();
    if let Some(last) = segments.pop() {
        segments.push(Path::new(last).file_stem().and_then(|s| s.to_str()).unwrap_or(last));
    }
    if segments.len() > 1 && segments.last().is_some_and(|s| s.eq_ignore_ascii_case("index")) {
        segments.pop();
    }
    let is_root_index = segments.len() == 1 && segments[0].eq_ignore_ascii_case("index");
    if is_root_index {
        segments.clear();
    }

    let path = format!("/{}", segments.iter().map(|s| kebab_case(s)).collect::<Vec<_>>().join("/"));
    let last = segments.last().copied().unwrap_or("home");
    let name = unique_name(&segments, taken_names);
    SynthesizedRoute { path, title: title_for(last), name, component_ref }
}

fn unique_name(segments: &[&str], taken_names: &BTreeSet<String>) -> String {
    let short = segments.last().map_or_else(|| "Home".to_string(), |s| pascal_case(s));
    if !taken_names.contains(&short) {
        return short;
    }
    let long: String = segments.iter().map(|s| pascal_case(s)).collect();
    if !taken_names.contains(&long) {
        return long;
    }
    (2..)
        .map(|n| format!("{long}{n}"))
        .find(|candidate| !taken_names.contains(candidate))
        .unwrap_or(long)
}
