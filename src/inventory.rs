//! Component inventory scanning.

use std::cmp::Ordering;
use std::path::{Component, Path};

use tracing::{debug, info};
use walkdir::{DirEntry, WalkDir};

use crate::error::{Result, RouteSyncError};
use crate::model::PageFile;
use crate::tokens::{file_tokens, split_words};

/// What the scanner keeps.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Extensions of page files, without dots.
    pub page_extensions: Vec<String>,
    /// Noise markers; a file whose name contains one as a word is skipped.
    pub denylist: Vec<String>,
}

/// Output of one scanner pass.
#[derive(Debug, Clone, Default)]
pub struct Inventory {
    /// Page files in deterministic walk order.
    pub files: Vec<PageFile>,
    /// Relative paths skipped by the denylist.
    pub skipped: Vec<String>,
}

/// Walks `root` depth-first, directories before files, alphabetic within a
/// directory. Hidden entries and `node_modules` are not descended into.
///
/// # Errors
///
/// Returns an error if `root` is missing or cannot be walked.
pub fn scan_pages(root: &Path, options: &ScanOptions) -> Result<Inventory> {
    if !root.is_dir() {
        return Err(RouteSyncError::io(root, "pages root is not a directory".into()));
    }

    let mut inventory = Inventory::default();
    let walker = WalkDir::new(root)
        .sort_by(directories_first)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || keep_entry(e));

    for entry in walker {
        let entry = entry.map_err(|e| RouteSyncError::io(root, Box::new(e)))?;
        if !entry.file_type().is_file()
            || !has_page_extension(entry.path(), &options.page_extensions)
        {
            continue;
        }
        let Some(relative_path) = relative_slash_path(root, entry.path()) else {
            continue;
        };
        let file_name = entry.file_name().to_string_lossy();
        if is_denylisted(&file_name, &options.denylist) {
            debug!(file = %relative_path, "skipping denylisted file");
            inventory.skipped.push(relative_path);
            continue;
        }
        inventory.files.push(PageFile {
            tokens: file_tokens(&relative_path),
            absolute_path: root.join(&relative_path),
            relative_path,
        });
    }

    info!(
        root = %root.display(),
        files = inventory.files.len(),
        skipped = inventory.skipped.len(),
        "scanned page inventory"
    );
    Ok(inventory)
}

fn directories_first(a: &DirEntry, b: &DirEntry) -> Ordering {
    b.file_type()
        .is_dir()
        .cmp(&a.file_type().is_dir())
        .then_with(|| a.file_name().cmp(b.file_name()))
}

fn keep_entry(entry: &DirEntry) -> bool {
    let name = entry.file_name().to_string_lossy();
    !name.starts_with('.') && name != "node_modules"
}

fn has_page_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| extensions.iter().any(|x| x.eq_ignore_ascii_case(ext)))
}

fn relative_slash_path(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    (!parts.is_empty()).then(|| parts.join("/"))
}

/// Returns `true` if any word of `file_name` (extension included) is a
/// denylisted marker.
#[must_use]
pub fn is_denylisted(file_name: &str, denylist: &[String]) -> bool {
    split_words(file_name)
        .iter()
        .any(|word| denylist.iter().any(|marker| marker.eq_ignore_ascii_case(word)))
}
