//! Matching engine: pairs routes with page files.
//!
//! Three stages run in order:
//! 1. exact pairing of resolved references with existing files,
//! 2. fuzzy assignment between the remaining actionable routes and files,
//! 3. residual classification of everything still unpaired.
//!
//! The fuzzy assignment itself never looks at the threshold. Candidate pairs
//! are chosen against fixed floors and the threshold only decides which of
//! them are accepted, so raising it can only turn fuzzy pairs into residuals.

pub mod score;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::model::{MatchResult, PageFile, Route};

pub use score::{route_tokens, similarity};

/// Minimum score for a route-major candidate.
pub const ROUTE_TO_FILE_FLOOR: f64 = 0.5;
/// Minimum score for a file-major candidate.
pub const FILE_TO_ROUTE_FLOOR: f64 = 0.3;
/// Share of the threshold a file-major candidate must reach.
pub const FILE_TO_ROUTE_FACTOR: f64 = 0.6;
/// Default acceptance threshold.
pub const DEFAULT_FUZZY_THRESHOLD: f64 = 0.5;

const EPSILON: f64 = 1e-9;

/// Tuning for the fuzzy stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchOptions {
    /// Acceptance threshold in [0,1].
    pub fuzzy_threshold: f64,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self { fuzzy_threshold: DEFAULT_FUZZY_THRESHOLD }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    RouteToFile,
    FileToRoute,
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    route: usize,
    file: usize,
    score: f64,
    direction: Direction,
}

impl Candidate {
    fn accepted(&self, threshold: f64) -> bool {
        let bar = match self.direction {
            Direction::RouteToFile => threshold,
            Direction::FileToRoute => threshold * FILE_TO_ROUTE_FACTOR,
        };
        self.score + EPSILON >= bar
    }
}

/// Classifies every route and file.
///
/// Each file appears in at most one result. Each actionable route appears in
/// exactly one result; parameterized, disabled and redirect routes appear
/// only when they match a file exactly. Results are ordered exact, fuzzy,
/// route-needs-file, file-needs-route; within a kind they follow route or
/// file arena order.
#[must_use]
pub fn match_routes(
    routes: &[Route],
    files: &[PageFile],
    options: &MatchOptions,
) -> Vec<MatchResult> {
    let mut route_used = vec![false; routes.len()];
    let mut file_used = vec![false; files.len()];
    let mut results = Vec::new();

    exact_pass(routes, files, &mut route_used, &mut file_used, &mut results);

    let candidates = assign(routes, files, &mut route_used, &mut file_used);
    for candidate in candidates {
        if candidate.accepted(options.fuzzy_threshold) {
            debug!(
                route = %routes[candidate.route].path,
                file = %files[candidate.file].relative_path,
                score = candidate.score,
                "fuzzy match"
            );
            results.push(MatchResult::fuzzy(candidate.route, candidate.file, candidate.score));
        } else {
            debug!(
                route = %routes[candidate.route].path,
                file = %files[candidate.file].relative_path,
                score = candidate.score,
                "fuzzy candidate below threshold"
            );
            route_used[candidate.route] = false;
            file_used[candidate.file] = false;
        }
    }

    for (index, route) in routes.iter().enumerate() {
        if !route_used[index] && route.is_actionable() {
            results.push(MatchResult::route_needs_file(index));
        }
    }
    for (index, used) in file_used.iter().enumerate() {
        if !used {
            results.push(MatchResult::file_needs_route(index));
        }
    }
    results
}

fn exact_pass(
    routes: &[Route],
    files: &[PageFile],
    route_used: &mut [bool],
    file_used: &mut [bool],
    results: &mut Vec<MatchResult>,
) {
    let mut by_path: BTreeMap<&Path, usize> = BTreeMap::new();
    let mut by_stem: BTreeMap<PathBuf, usize> = BTreeMap::new();
    for (index, file) in files.iter().enumerate() {
        by_path.entry(file.absolute_path.as_path()).or_insert(index);
        by_stem.entry(file.absolute_path.with_extension("")).or_insert(index);
    }

    // Actionable routes claim their files before inactive ones do.
    let mut exact = Vec::new();
    for actionable in [true, false] {
        for (index, route) in routes.iter().enumerate() {
            if route.is_actionable() != actionable {
                continue;
            }
            let Some(resolved) = &route.resolved_path else {
                continue;
            };
            let hit = by_path.get(resolved.as_path()).copied().or_else(|| {
                if resolved.extension().is_none() {
                    by_stem.get(resolved).copied()
                } else {
                    None
                }
            });
            if let Some(file) = hit.filter(|f| !file_used[*f]) {
                route_used[index] = true;
                file_used[file] = true;
                exact.push(MatchResult::exact(index, file));
            }
        }
    }
    exact.sort_by_key(|r| r.route);
    results.extend(exact);
}

/// Route-major pass then file-major pass over whatever is still free.
fn assign(
    routes: &[Route],
    files: &[PageFile],
    route_used: &mut [bool],
    file_used: &mut [bool],
) -> Vec<Candidate> {
    let tokens: Vec<_> = routes.iter().map(route_tokens).collect();
    let eligible = |index: usize, used: &[bool]| !used[index] && routes[index].is_actionable();
    let mut candidates = Vec::new();

    for route in 0..routes.len() {
        if !eligible(route, route_used) {
            continue;
        }
        let mut best: Option<(usize, f64)> = None;
        for (file, page) in files.iter().enumerate() {
            if file_used[file] {
                continue;
            }
            let score = similarity(&routes[route], &tokens[route], page);
            if score + EPSILON >= ROUTE_TO_FILE_FLOOR && beats(best, score) {
                best = Some((file, score));
            }
        }
        if let Some((file, score)) = best {
            route_used[route] = true;
            file_used[file] = true;
            candidates.push(Candidate { route, file, score, direction: Direction::RouteToFile });
        }
    }

    for (file, page) in files.iter().enumerate() {
        if file_used[file] {
            continue;
        }
        let mut best: Option<(usize, f64)> = None;
        for route in 0..routes.len() {
            if !eligible(route, route_used) {
                continue;
            }
            let score = similarity(&routes[route], &tokens[route], page);
            if score + EPSILON >= FILE_TO_ROUTE_FLOOR && beats(best, score) {
                best = Some((route, score));
            }
        }
        if let Some((route, score)) = best {
            route_used[route] = true;
            file_used[file] = true;
            candidates.push(Candidate { route, file, score, direction: Direction::FileToRoute });
        }
    }

    candidates
}

/// Strictly better than the current best; ties keep the earlier candidate.
fn beats(best: Option<(usize, f64)>, score: f64) -> bool {
    best.map_or(true, |(_, s)| score > s + EPSILON)
}
