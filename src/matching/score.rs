//! Token-similarity scoring between a route and a page file.

use std::collections::BTreeSet;

use crate::model::{PageFile, Route};
use crate::tokens::{overlap_count, path_tokens, token_set};

/// Tokens describing a route: its path, its name and, when the reference
/// stayed unresolved, the leftover identifier.
#[must_use]
pub fn route_tokens(route: &Route) -> BTreeSet<String> {
    let mut tokens = path_tokens(&route.path);
    if let Some(name) = &route.name {
        tokens.extend(token_set([name.as_str()]));
    }
    if route.is_unresolved() {
        tokens.extend(token_set([route.raw_component_ref.as_str()]));
    }
    tokens
}

/// Similarity in [0,1] between a route and a file.
///
/// A reference that literally contains the file's relative path scores 1.0
/// regardless of token overlap. Otherwise the score is the number of route
/// tokens sharing a substring with some file token, divided by the larger
/// token set.
#[must_use]
pub fn similarity(route: &Route, tokens: &BTreeSet<String>, file: &PageFile) -> f64 {
    let reference = &route.raw_component_ref;
    if !reference.is_empty() && reference.contains(&file.relative_path) {
        return 1.0;
    }
    let denominator = tokens.len().max(file.tokens.len());
    if denominator == 0 {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let score = overlap_count(tokens, &file.tokens) as f64 / denominator as f64;
    score.clamp(0.0, 1.0)
}
