//! Route extraction from router source text.
//!
//! Scanning is line-oriented around `path:` declarations: each declaration
//! opens a brace-balanced block capture, fields are read from the block's own
//! level, and a `children` array is extracted recursively with the parent
//! path as prefix. An unbalanced block is skipped with a warning.

pub mod bindings;
pub mod lexer;

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use tracing::{debug, warn};

use crate::error::{Result, RouteSyncError, Warning};
use crate::model::{ComponentField, Route, Span};
use crate::ports::FileSystem;
use crate::tokens::is_param_segment;

pub use bindings::BindingTable;
use lexer::{
    classify, find_matching, innermost_open_brace, own_level, path_decl_re, Class, CommentView,
};

/// One physical router source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Absolute path of the file.
    pub path: PathBuf,
    /// Full text.
    pub text: String,
}

/// Output of one extractor pass.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    /// Routes in order of first appearance.
    pub routes: Vec<Route>,
    /// Parse failures encountered along the way.
    pub warnings: Vec<Warning>,
}

fn field_re(field: &str) -> Regex {
    Regex::new(&format!(r#"\b{field}\s*:\s*(?:'([^'\n]*)'|"([^"\n]*)"|`([^`\n]*)`)"#))
        .expect("valid field regex")
}

fn path_field_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| field_re("path"))
}

fn name_field_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| field_re("name"))
}

fn component_field_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\bcomponent\s*:\s*").expect("valid component regex"))
}

fn redirect_field_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\bredirect\s*:").expect("valid redirect regex"))
}

fn children_field_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\bchildren\s*:\s*\[").expect("valid children regex"))
}

fn string_literal_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"'([^'\n]*)'|"([^"\n]*)"|`([^`\n]*)`"#).expect("valid literal regex")
    })
}

fn identifier_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z_$][\w$]*$").expect("valid identifier regex"))
}

/// Reads every router source file.
///
/// A directory is walked recursively; files whose extension is in
/// `extensions` are read in sorted path order.
///
/// # Errors
///
/// Returns an error if the path cannot be walked or a file cannot be read.
pub fn load_sources(
    fs: &dyn FileSystem,
    root: &Path,
    extensions: &[String],
) -> Result<Vec<SourceFile>> {
    let paths: Vec<PathBuf> = if root.is_dir() {
        let mut found = Vec::new();
        for entry in walkdir::WalkDir::new(root).sort_by_file_name() {
            let entry = entry.map_err(|e| RouteSyncError::io(root, Box::new(e)))?;
            let has_ext = entry
                .path()
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| extensions.iter().any(|x| x.eq_ignore_ascii_case(e)));
            if entry.file_type().is_file() && has_ext {
                found.push(entry.into_path());
            }
        }
        found
    } else {
        vec![root.to_path_buf()]
    };

    paths
        .into_iter()
        .map(|path| {
            let text = fs.read_to_string(&path).map_err(|e| RouteSyncError::io(&path, e))?;
            Ok(SourceFile { path, text })
        })
        .collect()
}

/// Extracts routes from all source files of one conceptual router source.
///
/// Bare-identifier component references are substituted through a binding
/// table built across every file.
#[must_use]
pub fn extract_routes(sources: &[SourceFile]) -> Extraction {
    let views: Vec<CommentView> = sources.iter().map(|s| CommentView::new(&s.text)).collect();
    let table = BindingTable::build(views.iter().map(|v| v.text.as_str()));
    debug!(bindings = table.len(), files = sources.len(), "built binding table");

    let mut extraction = Extraction::default();
    for (source, view) in sources.iter().zip(&views) {
        let mut scanner = BlockScanner::new(&source.path, view, &table);
        scanner.scan(0, view.text.len(), "", false, 0);
        debug!(source = %source.path.display(), routes = scanner.routes.len(), "extracted routes");
        extraction.routes.append(&mut scanner.routes);
        extraction.warnings.append(&mut scanner.warnings);
    }
    extraction
}

/// Joins a parent prefix and a child path with exactly one separator.
#[must_use]
pub fn join_route_path(prefix: &str, child: &str) -> String {
    if prefix.is_empty() {
        return child.to_string();
    }
    if child.is_empty() {
        return prefix.to_string();
    }
    format!("{}/{}", prefix.trim_end_matches('/'), child.trim_start_matches('/'))
}

/// Returns `true` if any segment of `path` is a parameter or wildcard.
#[must_use]
pub fn is_parameterized(path: &str) -> bool {
    path.split('/').any(is_param_segment)
}

struct BlockScanner<'a> {
    source: &'a Path,
    view: &'a CommentView,
    classes: Vec<Class>,
    table: &'a BindingTable,
    routes: Vec<Route>,
    warnings: Vec<Warning>,
}

impl<'a> BlockScanner<'a> {
    fn new(source: &'a Path, view: &'a CommentView, table: &'a BindingTable) -> Self {
        let classes = classify(view.text.as_bytes());
        Self { source, view, classes, table, routes: Vec::new(), warnings: Vec::new() }
    }

    /// Captures every route block whose `path` declaration lies in
    /// `[lo, hi)`.
    fn scan(&mut self, lo: usize, hi: usize, prefix: &str, parent_disabled: bool, depth: usize) {
        let view = self.view;
        let text = view.text.as_str();
        let bytes = text.as_bytes();
        let mut cursor = lo;

        let decls: Vec<usize> =
            path_decl_re().find_iter(&text[lo..hi]).map(|m| lo + m.start()).collect();
        for decl in decls {
            if decl < cursor || self.classes[decl] != Class::Code {
                continue;
            }
            let Some(open) = innermost_open_brace(bytes, &self.classes, decl).filter(|&o| o >= lo)
            else {
                continue;
            };
            if is_property_value(bytes, &self.classes, open) {
                continue;
            }
            let line = self.view.line_number(decl);
            match find_matching(bytes, &self.classes, open).filter(|&close| close < hi) {
                Some(close) => {
                    self.capture(open, close, prefix, parent_disabled, depth);
                    cursor = close + 1;
                }
                None => {
                    warn!(source = %self.source.display(), line, "unbalanced route block skipped");
                    self.warnings.push(Warning::ParseFailure {
                        source: self.source.to_path_buf(),
                        line,
                        message: "route block never rebalances".to_string(),
                    });
                    cursor = self.view.next_line_start(decl);
                }
            }
        }
    }

    fn capture(
        &mut self,
        open: usize,
        close: usize,
        prefix: &str,
        parent_disabled: bool,
        depth: usize,
    ) {
        let view = self.view;
        let text = view.text.as_str();
        let own = own_level(text, &self.classes, open, close);

        let Some(path_caps) = path_field_re().captures(&own) else {
            return;
        };
        let path_match = path_caps.get(0).map_or(0, |m| m.start());
        let raw_path = first_group(&path_caps);
        let decl_pos = open + path_match;

        let path = join_route_path(prefix, &raw_path);
        let name = name_field_re().captures(&own).map(|caps| first_group(&caps));
        let is_disabled = parent_disabled || self.view.is_disabled_at(decl_pos);

        let (raw_component_ref, component) = match component_field_re().find(&own) {
            Some(m) => self.read_component(open + m.end(), close),
            None => (String::new(), None),
        };
        let is_redirect = component.is_none() && redirect_field_re().is_match(&own);

        let route = Route {
            is_parameterized: is_parameterized(&path),
            path: path.clone(),
            name,
            raw_component_ref,
            resolved_path: None,
            is_disabled,
            is_redirect,
            source: self.source.to_path_buf(),
            line: self.view.line_number(decl_pos),
            block: Span::new(open, close + 1),
            component,
            depth,
        };
        debug!(
            path = %route.path,
            reference = %route.raw_component_ref,
            disabled = route.is_disabled,
            "captured route block"
        );
        self.routes.push(route);

        if let Some(m) = children_field_re().find(&own) {
            let bracket = open + m.end() - 1;
            match find_matching(text.as_bytes(), &self.classes, bracket) {
                Some(end) => self.scan(bracket + 1, end, &path, is_disabled, depth + 1),
                None => self.warnings.push(Warning::ParseFailure {
                    source: self.source.to_path_buf(),
                    line: self.view.line_number(bracket),
                    message: "children array never rebalances".to_string(),
                }),
            }
        }
    }

    /// Reads the value of a `component:` field starting at `start`.
    fn read_component(&self, start: usize, close: usize) -> (String, Option<ComponentField>) {
        let bytes = self.view.text.as_bytes();
        let mut parens = 0usize;
        let mut end = start;
        while end < close {
            let b = bytes[end];
            if self.classes[end] == Class::Code {
                match b {
                    b'(' | b'{' | b'[' => parens += 1,
                    b')' | b'}' | b']' if parens > 0 => parens -= 1,
                    b',' | b'\n' | b'}' if parens == 0 => break,
                    _ => {}
                }
            } else if self.classes[end] == Class::Comment && parens == 0 {
                break;
            }
            end += 1;
        }
        let value_text = self.view.text[start..end].trim_end();
        let value = Span::new(start, start + value_text.len());

        if let Some(caps) = bindings::dynamic_import_re().captures(value_text) {
            if let Some(lit) = caps.get(1) {
                let literal = Some(Span::new(start + lit.start(), start + lit.end()));
                return (lit.as_str().to_string(), Some(ComponentField { value, literal }));
            }
        }
        if identifier_re().is_match(value_text) {
            let reference = self.table.lookup(value_text).unwrap_or(value_text).to_string();
            return (reference, Some(ComponentField { value, literal: None }));
        }
        if let Some(caps) = string_literal_re().captures(value_text) {
            if let Some(lit) = caps.iter().skip(1).flatten().next() {
                let literal = Some(Span::new(start + lit.start(), start + lit.end()));
                return (lit.as_str().to_string(), Some(ComponentField { value, literal }));
            }
        }
        (value_text.to_string(), Some(ComponentField { value, literal: None }))
    }
}

/// `true` when the brace at `open` is the value of an object property, as in
/// `meta: { path: '/x' }`. Such an object is never a route block itself.
fn is_property_value(bytes: &[u8], classes: &[Class], open: usize) -> bool {
    (0..open)
        .rev()
        .find(|&i| classes[i] == Class::Code && !bytes[i].is_ascii_whitespace())
        .is_some_and(|i| bytes[i] == b':')
}

fn first_group(caps: &regex::Captures<'_>) -> String {
    caps.iter().skip(1).flatten().next().map(|m| m.as_str().to_string()).unwrap_or_default()
}
