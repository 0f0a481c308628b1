//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Top-level CLI parser for `routesync`.
#[derive(Debug, Parser)]
#[command(name = "routesync", version, about = "Reconcile router definitions with page files")]
pub struct Cli {
    /// Log at debug level unless `RUST_LOG` is set.
    #[arg(short, long, global = true)]
    pub verbose: bool,
    /// The command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Where to find the router source, the pages and the config file.
#[derive(Debug, Clone, Default, Args)]
pub struct SourceArgs {
    /// Router source file or directory.
    #[arg(long)]
    pub router_source: Option<PathBuf>,
    /// Root directory of the page components.
    #[arg(long)]
    pub pages_root: Option<PathBuf>,
    /// YAML config file (defaults to `./routesync.yaml` when present).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// Report rendering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// Pretty-printed JSON.
    Json,
}

/// Supported top-level subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Match routes against page files and report or apply fixes.
    Reconcile {
        /// Source locations.
        #[command(flatten)]
        sources: SourceArgs,
        /// Apply the fix plan after backing up the router source.
        #[arg(long)]
        apply: bool,
        /// Fuzzy acceptance threshold in [0, 1].
        #[arg(long)]
        fuzzy_threshold: Option<f64>,
        /// Directory for router source backups.
        #[arg(long)]
        backup_dir: Option<PathBuf>,
        /// Output format.
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },
    /// List the routes extracted from the router source.
    Routes {
        /// Source locations.
        #[command(flatten)]
        sources: SourceArgs,
        /// Output format.
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },
    /// List the page files found under the pages root.
    Pages {
        /// Source locations.
        #[command(flatten)]
        sources: SourceArgs,
        /// Output format.
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },
}

#[cfg(test)]
mod tests {
    use super::{Cli, Command, OutputFormat};
    use clap::Parser;

    #[test]
    fn parses_reconcile_with_flags() {
        let cli = Cli::parse_from([
            "routesync",
            "reconcile",
            "--router-source",
            "src/router/index.js",
            "--pages-root",
            "src/pages",
            "--apply",
            "--fuzzy-threshold",
            "0.7",
            "--format",
            "json",
        ]);
        let Command::Reconcile { sources, apply, fuzzy_threshold, format, backup_dir } = cli.command
        else {
            panic!("expected reconcile");
        };
        assert_eq!(sources.router_source.unwrap().to_str(), Some("src/router/index.js"));
        assert!(apply);
        assert_eq!(fuzzy_threshold, Some(0.7));
        assert_eq!(format, OutputFormat::Json);
        assert!(backup_dir.is_none());
    }

    #[test]
    fn format_defaults_to_text() {
        let cli = Cli::parse_from(["routesync", "pages", "--pages-root", "p"]);
        assert!(matches!(cli.command, Command::Pages { format: OutputFormat::Text, .. }));
    }

    #[test]
    fn verbose_is_global() {
        let cli = Cli::parse_from(["routesync", "routes", "-v"]);
        assert!(cli.verbose);
    }

    #[test]
    fn rejects_unknown_format() {
        assert!(Cli::try_parse_from(["routesync", "routes", "--format", "xml"]).is_err());
    }
}
