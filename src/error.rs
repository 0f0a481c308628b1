//! Error and warning types.
//!
//! `RouteSyncError` aborts a step. `Warning` is recorded on the report and the
//! pipeline carries on.

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

/// Result alias used throughout the library.
pub type Result<T> = std::result::Result<T, RouteSyncError>;

/// Fatal errors for a pipeline step.
#[derive(Debug, Error)]
pub enum RouteSyncError {
    /// A read or write against the filesystem failed.
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        /// Path being accessed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The router source could not be backed up; nothing was mutated.
    #[error("backup of {} failed: {source}", path.display())]
    Backup {
        /// Source file that could not be copied.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The pipeline could not be re-run after fixes were written. The
    /// router sources can be restored from `backups`.
    #[error(
        "re-verification failed after {applied} applied action(s), backups at [{}]: {source}",
        join_paths(.backups)
    )]
    Reverify {
        /// Backups taken before the first mutation.
        backups: Vec<PathBuf>,
        /// Actions already written.
        applied: usize,
        /// Why the re-run failed.
        #[source]
        source: Box<RouteSyncError>,
    },

    /// Invalid or missing configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// The YAML config file could not be parsed.
    #[error("failed to parse config file: {0}")]
    ConfigFile(#[from] serde_yaml::Error),

    /// The report could not be serialized.
    #[error("failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl RouteSyncError {
    /// Wraps a port error with the path that produced it.
    pub fn io(path: impl Into<PathBuf>, source: Box<dyn std::error::Error + Send + Sync>) -> Self {
        Self::Io { path: path.into(), source }
    }
}

fn join_paths(paths: &[PathBuf]) -> String {
    paths.iter().map(|p| p.display().to_string()).collect::<Vec<_>>().join(", ")
}

/// Recoverable problems surfaced on the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    /// A route block whose braces never rebalanced; the block was skipped.
    ParseFailure {
        /// Source file containing the block.
        source: PathBuf,
        /// 1-based line of the `path` declaration.
        line: usize,
        /// What went wrong.
        message: String,
    },
    /// A component reference that could not be turned into a path.
    UnresolvedReference {
        /// Source file declaring the route.
        source: PathBuf,
        /// Effective route path.
        route_path: String,
        /// The reference as written (after binding substitution).
        reference: String,
    },
    /// A scaffold target already existed; the action was skipped.
    ScaffoldCollision {
        /// The existing file.
        path: PathBuf,
    },
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ParseFailure { source, line, message } => {
                write!(f, "parse failure at {}:{line}: {message}", source.display())
            }
            Self::UnresolvedReference { source, route_path, reference } => write!(
                f,
                "unresolved component reference '{reference}' for route {route_path} ({})",
                source.display()
            ),
            Self::ScaffoldCollision { path } => {
                write!(f, "scaffold target already exists: {}", path.display())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warning_serializes_with_kind_tag() {
        let warning = Warning::ParseFailure {
            source: PathBuf::from("src/router/index.js"),
            line: 12,
            message: "unbalanced block".to_string(),
        };
        let json = serde_json::to_value(&warning).unwrap();
        assert_eq!(json["kind"], "parse_failure");
        assert_eq!(json["line"], 12);
    }

    #[test]
    fn warning_display_names_reference() {
        let warning = Warning::UnresolvedReference {
            source: PathBuf::from("router.js"),
            route_path: "/about".to_string(),
            reference: "AboutView".to_string(),
        };
        assert!(warning.to_string().contains("'AboutView'"));
        assert!(warning.to_string().contains("/about"));
    }

    #[test]
    fn io_error_display_includes_path() {
        let err = RouteSyncError::io("/tmp/x", "denied".into());
        assert_eq!(err.to_string(), "I/O error at /tmp/x: denied");
    }
}
