//! Core records shared by every pipeline stage.
//!
//! Routes and files live in two arenas owned by the caller; match results and
//! fix actions refer to them by index.

pub mod action;

use std::collections::BTreeSet;
use std::path::PathBuf;

use serde::Serialize;

pub use action::{FixAction, SynthesizedRoute};

/// Half-open byte range into a router source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Span {
    /// First byte.
    pub start: usize,
    /// One past the last byte.
    pub end: usize,
}

impl Span {
    /// Creates a span.
    #[must_use]
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// Where a route's `component` field sits in its source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComponentField {
    /// The whole value expression after `component:`.
    pub value: Span,
    /// Contents of the string literal inside the value, without quotes.
    /// `None` when the value is a bare identifier.
    pub literal: Option<Span>,
}

/// One entry in the router source.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Route {
    /// Effective URL pattern, parent prefixes joined in.
    pub path: String,
    /// Optional route name.
    pub name: Option<String>,
    /// Component reference after binding substitution; empty when the block
    /// declares no component.
    pub raw_component_ref: String,
    /// Canonical file path, set by the reference resolver.
    pub resolved_path: Option<PathBuf>,
    /// Path contains a `:param` or wildcard segment.
    pub is_parameterized: bool,
    /// Route block is commented out.
    pub is_disabled: bool,
    /// Block has a `redirect` and no `component`.
    pub is_redirect: bool,
    /// Source file declaring the route.
    pub source: PathBuf,
    /// 1-based line of the `path` declaration.
    pub line: usize,
    /// The captured `{ ... }` block.
    pub block: Span,
    /// Location of the component field, if any.
    pub component: Option<ComponentField>,
    /// Nesting depth; 0 for top-level routes.
    pub depth: usize,
}

impl Route {
    /// Returns `true` if the route takes part in fuzzy matching and residual
    /// classification.
    #[must_use]
    pub fn is_actionable(&self) -> bool {
        !self.is_parameterized && !self.is_disabled && !self.is_redirect
    }

    /// Returns `true` if the reference was a bare identifier that no binding
    /// could substitute.
    #[must_use]
    pub fn is_unresolved(&self) -> bool {
        self.resolved_path.is_none() && !self.raw_component_ref.is_empty()
    }
}

/// One page-implementation file on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageFile {
    /// Path relative to the pages root, `/`-separated.
    pub relative_path: String,
    /// Absolute, lexically normalized path.
    pub absolute_path: PathBuf,
    /// Lowercase word tokens from directory segments and file stem.
    pub tokens: BTreeSet<String>,
}

/// Classification of a reconciled pairing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    /// Resolved reference points at an existing file.
    Exact,
    /// Reference is stale; a similar file was found.
    Fuzzy,
    /// No file backs the route.
    RouteNeedsFile,
    /// No route references the file.
    FileNeedsRoute,
}

impl MatchKind {
    /// Short label used in text reports.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Fuzzy => "fuzzy",
            Self::RouteNeedsFile => "route-needs-file",
            Self::FileNeedsRoute => "file-needs-route",
        }
    }
}

/// One reconciled pairing, indexing into the route and file arenas.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    /// Classification.
    pub kind: MatchKind,
    /// Index into the route arena.
    pub route: Option<usize>,
    /// Index into the file arena.
    pub file: Option<usize>,
    /// Similarity in [0,1]; only set for `Fuzzy`.
    pub score: Option<f64>,
}

impl MatchResult {
    /// An exact pairing.
    #[must_use]
    pub fn exact(route: usize, file: usize) -> Self {
        Self { kind: MatchKind::Exact, route: Some(route), file: Some(file), score: None }
    }

    /// A fuzzy pairing with its score.
    #[must_use]
    pub fn fuzzy(route: usize, file: usize, score: f64) -> Self {
        Self { kind: MatchKind::Fuzzy, route: Some(route), file: Some(file), score: Some(score) }
    }

    /// A route with no backing file.
    #[must_use]
    pub fn route_needs_file(route: usize) -> Self {
        Self { kind: MatchKind::RouteNeedsFile, route: Some(route), file: None, score: None }
    }

    /// A file with no route.
    #[must_use]
    pub fn file_needs_route(file: usize) -> Self {
        Self { kind: MatchKind::FileNeedsRoute, route: None, file: Some(file), score: None }
    }
}
