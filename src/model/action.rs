//! Fix actions produced by the planner.

use std::path::PathBuf;

use serde::Serialize;

/// A route record synthesized from an orphaned file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SynthesizedRoute {
    /// URL path, e.g. `/reports/quarterly-summary`.
    pub path: String,
    /// Route name, e.g. `QuarterlySummary`.
    pub name: String,
    /// Page title for `meta.title`.
    pub title: String,
    /// Component reference as it will be written into the source.
    pub component_ref: String,
}

/// One proposed remediation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FixAction {
    /// Point a route's component field at the matched file.
    RewriteComponentRef {
        /// Route arena index.
        route: usize,
        /// Route path, for display.
        route_path: String,
        /// Source file holding the route.
        source: PathBuf,
        /// The file the route should now reference.
        new_resolved_path: PathBuf,
        /// Reference text to write.
        new_reference: String,
    },
    /// Create a boilerplate page for a route with no file.
    ScaffoldFile {
        /// Route arena index.
        route: usize,
        /// Route path.
        route_path: String,
        /// Route name.
        name: Option<String>,
        /// Title rendered into the page.
        title: String,
        /// Where the page will be written.
        target: PathBuf,
    },
    /// Append a route for an orphaned file.
    InsertRoute {
        /// File arena index.
        file: usize,
        /// Relative path of the orphaned file.
        relative_path: String,
        /// Route to append.
        route: SynthesizedRoute,
    },
}

impl FixAction {
    /// Plan/apply ordering rank: rewrites first.
    #[must_use]
    pub fn rank(&self) -> u8 {
        match self {
            Self::RewriteComponentRef { .. } => 0,
            Self::ScaffoldFile { .. } => 1,
            Self::InsertRoute { .. } => 2,
        }
    }

    /// Short kind label.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::RewriteComponentRef { .. } => "rewrite-component-ref",
            Self::ScaffoldFile { .. } => "scaffold-file",
            Self::InsertRoute { .. } => "insert-route",
        }
    }

    /// Human-readable description.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::RewriteComponentRef { route_path, new_reference, .. } => {
                format!("Rewrite component of route {route_path} to '{new_reference}'")
            }
            Self::ScaffoldFile { route_path, target, title, .. } => format!(
                "Scaffold page '{title}' for route {route_path} at {}",
                target.display()
            ),
            Self::InsertRoute { relative_path, route, .. } => format!(
                "Insert route {} (name '{}') for orphaned file {relative_path}",
                route.path, route.name
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewrite_ranks_before_scaffold_and_insert() {
        let rewrite = FixAction::RewriteComponentRef {
            route: 0,
            route_path: "/a".into(),
            source: PathBuf::from("r.js"),
            new_resolved_path: PathBuf::from("/p/A.vue"),
            new_reference: "@/pages/A.vue".into(),
        };
        let insert = FixAction::InsertRoute {
            file: 0,
            relative_path: "B.vue".into(),
            route: SynthesizedRoute {
                path: "/b".into(),
                name: "B".into(),
                title: "B".into(),
                component_ref: "@/pages/B.vue".into(),
            },
        };
        assert!(rewrite.rank() < insert.rank());
        assert_eq!(insert.label(), "insert-route");
        assert!(insert.describe().contains("/b"));
    }

    #[test]
    fn action_serializes_with_kind_tag() {
        let action = FixAction::ScaffoldFile {
            route: 3,
            route_path: "/help".into(),
            name: None,
            title: "Help".into(),
            target: PathBuf::from("/p/Help.vue"),
        };
        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(json["kind"], "scaffold_file");
        assert_eq!(json["title"], "Help");
    }
}
