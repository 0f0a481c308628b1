//! Layered run configuration.
//!
//! Later layers override earlier ones: built-in defaults, an optional YAML
//! file, `ROUTESYNC_*` environment variables, then command-line flags.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::{Result, RouteSyncError};
use crate::matching::DEFAULT_FUZZY_THRESHOLD;
use crate::ports::FileSystem;
use crate::resolve::normalize_lexically;

/// Config file looked up in the working directory when none is named.
pub const DEFAULT_CONFIG_FILE: &str = "routesync.yaml";

const DEFAULT_PAGE_EXTENSIONS: &[&str] = &["vue", "jsx", "tsx", "js", "ts", "svelte"];
const DEFAULT_SOURCE_EXTENSIONS: &[&str] = &["js", "ts", "mjs", "cjs"];
const DEFAULT_DENYLIST: &[&str] = &[
    "backup", "bak", "template", "example", "demo", "temp", "tmp", "copy", "old", "orig", "draft",
    "sample", "test", "spec", "stories",
];
const DEFAULT_ALIAS_MARKERS: &[&str] = &["@/", "~/"];
const BACKUP_DIR_NAME: &str = ".routesync-backups";

/// Fully resolved settings for one run. All paths are absolute.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconcileConfig {
    /// Router source file or directory.
    pub router_source: PathBuf,
    /// Root of the page inventory.
    pub pages_root: PathBuf,
    /// Apply the plan instead of only reporting it.
    pub apply: bool,
    /// Fuzzy acceptance threshold in [0,1].
    pub fuzzy_threshold: f64,
    /// Reference alias marker to root directory.
    pub aliases: BTreeMap<String, PathBuf>,
    /// Noise markers for the inventory scanner.
    pub denylist: Vec<String>,
    /// Extensions of page files.
    pub page_extensions: Vec<String>,
    /// Extensions of router source files inside a source directory.
    pub source_extensions: Vec<String>,
    /// Where backups of the router source go.
    pub backup_dir: PathBuf,
    /// Extension for scaffolded pages when the target has none.
    pub default_page_extension: String,
}

/// Shape of `routesync.yaml`. Every key is optional.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// Router source, relative to the config file.
    pub router_source: Option<PathBuf>,
    /// Pages root, relative to the config file.
    pub pages_root: Option<PathBuf>,
    /// Fuzzy acceptance threshold.
    pub fuzzy_threshold: Option<f64>,
    /// Extra or replacement aliases, merged over the defaults.
    pub aliases: BTreeMap<String, PathBuf>,
    /// Replaces the default denylist.
    pub denylist: Option<Vec<String>>,
    /// Replaces the default page extensions.
    pub page_extensions: Option<Vec<String>>,
    /// Replaces the default source extensions.
    pub source_extensions: Option<Vec<String>>,
    /// Backup directory, relative to the config file.
    pub backup_dir: Option<PathBuf>,
    /// Extension for scaffolded pages.
    pub default_page_extension: Option<String>,
}

/// Values given on the command line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overrides {
    /// `--config`.
    pub config: Option<PathBuf>,
    /// `--router-source`.
    pub router_source: Option<PathBuf>,
    /// `--pages-root`.
    pub pages_root: Option<PathBuf>,
    /// `--apply`.
    pub apply: bool,
    /// `--fuzzy-threshold`.
    pub fuzzy_threshold: Option<f64>,
    /// `--backup-dir`.
    pub backup_dir: Option<PathBuf>,
}

impl ReconcileConfig {
    /// Builds the configuration from every layer.
    ///
    /// `env` looks up environment variables; `cwd` anchors relative paths
    /// given on the command line or in the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed, a value
    /// is malformed, or a required path is missing.
    pub fn load(
        fs: &dyn FileSystem,
        overrides: &Overrides,
        env: impl Fn(&str) -> Option<String>,
        cwd: &Path,
    ) -> Result<Self> {
        let absolute = |p: &Path, base: &Path| normalize_lexically(&base.join(p));

        let config_path = overrides
            .config
            .clone()
            .or_else(|| env("ROUTESYNC_CONFIG").map(PathBuf::from))
            .map(|p| absolute(&p, cwd))
            .or_else(|| Some(cwd.join(DEFAULT_CONFIG_FILE)).filter(|p| fs.exists(p)));

        let (file, file_dir) = match &config_path {
            Some(path) => {
                let text = fs.read_to_string(path).map_err(|e| RouteSyncError::io(path, e))?;
                let file: FileConfig = serde_yaml::from_str(&text)?;
                debug!(path = %path.display(), "loaded config file");
                (file, path.parent().map_or_else(|| cwd.to_path_buf(), Path::to_path_buf))
            }
            None => (FileConfig::default(), cwd.to_path_buf()),
        };

        let router_source = overrides
            .router_source
            .as_ref()
            .map(|p| absolute(p, cwd))
            .or_else(|| env("ROUTESYNC_ROUTER_SOURCE").map(|p| absolute(Path::new(&p), cwd)))
            .or_else(|| file.router_source.as_ref().map(|p| absolute(p, &file_dir)))
            .ok_or_else(|| {
                RouteSyncError::Config("router source is required (--router-source)".into())
            })?;
        let pages_root = overrides
            .pages_root
            .as_ref()
            .map(|p| absolute(p, cwd))
            .or_else(|| env("ROUTESYNC_PAGES_ROOT").map(|p| absolute(Path::new(&p), cwd)))
            .or_else(|| file.pages_root.as_ref().map(|p| absolute(p, &file_dir)))
            .ok_or_else(|| RouteSyncError::Config("pages root is required (--pages-root)".into()))?;

        let env_threshold = env("ROUTESYNC_FUZZY_THRESHOLD")
            .map(|raw| {
                raw.trim().parse::<f64>().map_err(|_| {
                    RouteSyncError::Config(format!(
                        "ROUTESYNC_FUZZY_THRESHOLD is not a number: {raw}"
                    ))
                })
            })
            .transpose()?;
        let fuzzy_threshold = overrides
            .fuzzy_threshold
            .or(env_threshold)
            .or(file.fuzzy_threshold)
            .unwrap_or(DEFAULT_FUZZY_THRESHOLD);

        let mut aliases: BTreeMap<String, PathBuf> = BTreeMap::new();
        if let Some(parent) = pages_root.parent() {
            for marker in DEFAULT_ALIAS_MARKERS {
                aliases.insert((*marker).to_string(), parent.to_path_buf());
            }
        }
        for (marker, root) in &file.aliases {
            aliases.insert(marker.clone(), absolute(root, &file_dir));
        }

        let backup_dir = overrides
            .backup_dir
            .as_ref()
            .map(|p| absolute(p, cwd))
            .or_else(|| env("ROUTESYNC_BACKUP_DIR").map(|p| absolute(Path::new(&p), cwd)))
            .or_else(|| file.backup_dir.as_ref().map(|p| absolute(p, &file_dir)))
            .unwrap_or_else(|| default_backup_dir(&router_source));

        let config = Self {
            router_source,
            pages_root,
            apply: overrides.apply,
            fuzzy_threshold,
            aliases,
            denylist: file.denylist.unwrap_or_else(|| owned(DEFAULT_DENYLIST)),
            page_extensions: file
                .page_extensions
                .map_or_else(|| owned(DEFAULT_PAGE_EXTENSIONS), |v| trim_dots(&v)),
            source_extensions: file
                .source_extensions
                .map_or_else(|| owned(DEFAULT_SOURCE_EXTENSIONS), |v| trim_dots(&v)),
            backup_dir,
            default_page_extension: file
                .default_page_extension
                .map_or_else(|| "vue".to_string(), |e| e.trim_start_matches('.').to_string()),
        };
        config.validate()?;
        Ok(config)
    }

    /// Configuration with defaults for everything but the two roots.
    #[must_use]
    pub fn with_roots(router_source: &Path, pages_root: &Path) -> Self {
        let router_source = normalize_lexically(router_source);
        let pages_root = normalize_lexically(pages_root);
        let mut aliases = BTreeMap::new();
        if let Some(parent) = pages_root.parent() {
            for marker in DEFAULT_ALIAS_MARKERS {
                aliases.insert((*marker).to_string(), parent.to_path_buf());
            }
        }
        Self {
            backup_dir: default_backup_dir(&router_source),
            router_source,
            pages_root,
            apply: false,
            fuzzy_threshold: DEFAULT_FUZZY_THRESHOLD,
            aliases,
            denylist: owned(DEFAULT_DENYLIST),
            page_extensions: owned(DEFAULT_PAGE_EXTENSIONS),
            source_extensions: owned(DEFAULT_SOURCE_EXTENSIONS),
            default_page_extension: "vue".to_string(),
        }
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`RouteSyncError::Config`] describing the first bad value.
    pub fn validate(&self) -> Result<()> {
        if !self.fuzzy_threshold.is_finite() || !(0.0..=1.0).contains(&self.fuzzy_threshold) {
            return Err(RouteSyncError::Config(format!(
                "fuzzy threshold must be within [0, 1], got {}",
                self.fuzzy_threshold
            )));
        }
        if self.page_extensions.is_empty() {
            return Err(RouteSyncError::Config("at least one page extension is required".into()));
        }
        if self.source_extensions.is_empty() {
            return Err(RouteSyncError::Config("at least one source extension is required".into()));
        }
        if self.default_page_extension.is_empty() {
            return Err(RouteSyncError::Config("default page extension must not be empty".into()));
        }
        Ok(())
    }
}

fn default_backup_dir(router_source: &Path) -> PathBuf {
    let base = if router_source.is_dir() {
        router_source
    } else {
        router_source.parent().unwrap_or(router_source)
    };
    base.join(BACKUP_DIR_NAME)
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

fn trim_dots(items: &[String]) -> Vec<String> {
    items.iter().map(|s| s.trim_start_matches('.').to_string()).filter(|s| !s.is_empty()).collect()
}
