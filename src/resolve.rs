//! Reference resolution: turns a route's component reference into a
//! canonical file path.
//!
//! Resolution is lexical and pure; nothing here touches the filesystem.

use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

use tracing::debug;

use crate::error::Warning;
use crate::model::Route;

/// Resolves component references against configured root aliases and the
/// declaring source file's directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolver {
    /// Alias marker to root, longest marker first.
    aliases: Vec<(String, PathBuf)>,
}

impl Resolver {
    /// Creates a resolver. Alias roots should already be absolute.
    #[must_use]
    pub fn new(aliases: &BTreeMap<String, PathBuf>) -> Self {
        let mut aliases: Vec<(String, PathBuf)> = aliases
            .iter()
            .map(|(marker, root)| (marker.clone(), normalize_lexically(root)))
            .collect();
        aliases.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(&b.0)));
        Self { aliases }
    }

    /// Resolves `reference` as written in `source_file`.
    ///
    /// Returns `None` when the reference is empty or, after alias
    /// substitution, has no path separator (a bare identifier).
    #[must_use]
    pub fn resolve(&self, reference: &str, source_file: &Path) -> Option<PathBuf> {
        let reference = reference.trim();
        if reference.is_empty() {
            return None;
        }
        for (marker, root) in &self.aliases {
            if let Some(rest) = reference.strip_prefix(marker.as_str()) {
                return Some(normalize_lexically(&root.join(rest.trim_start_matches('/'))));
            }
        }
        if !reference.contains('/') {
            return None;
        }
        if reference.starts_with('/') {
            return Some(normalize_lexically(Path::new(reference)));
        }
        let base = source_file.parent().unwrap_or_else(|| Path::new(""));
        Some(normalize_lexically(&base.join(reference)))
    }

    /// Sets `resolved_path` on every route and reports the references that
    /// could not be resolved.
    pub fn resolve_routes(&self, routes: &mut [Route]) -> Vec<Warning> {
        let mut warnings = Vec::new();
        for route in routes.iter_mut() {
            if route.raw_component_ref.is_empty() {
                continue;
            }
            route.resolved_path = self.resolve(&route.raw_component_ref, &route.source);
            if route.resolved_path.is_none() {
                debug!(
                    path = %route.path,
                    reference = %route.raw_component_ref,
                    "unresolved reference"
                );
                warnings.push(Warning::UnresolvedReference {
                    source: route.source.clone(),
                    route_path: route.path.clone(),
                    reference: route.raw_component_ref.clone(),
                });
            }
        }
        warnings
    }

    /// Reference text that resolves back to `target` from `source_file`.
    ///
    /// Uses the alias with the most specific root containing `target`,
    /// otherwise a `./` or `../` path relative to the source file.
    #[must_use]
    pub fn reference_for(&self, target: &Path, source_file: &Path) -> String {
        let target = normalize_lexically(target);
        let best = self
            .aliases
            .iter()
            .filter(|(_, root)| target.starts_with(root))
            .max_by(|a, b| {
                a.1.components().count().cmp(&b.1.components().count()).then_with(|| b.0.cmp(&a.0))
            });
        if let Some((marker, root)) = best {
            if let Ok(rest) = target.strip_prefix(root) {
                let rest = slash_path(rest);
                return if marker.ends_with('/') {
                    format!("{marker}{rest}")
                } else {
                    format!("{marker}/{rest}")
                };
            }
        }
        let base = normalize_lexically(source_file.parent().unwrap_or_else(|| Path::new("")));
        relative_reference(&base, &target)
    }
}

/// Collapses `.` and `..` components without consulting the filesystem.
#[must_use]
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let popped = matches!(out.components().next_back(), Some(Component::Normal(_)))
                    && out.pop();
                if !popped && !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

fn slash_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

fn relative_reference(base: &Path, target: &Path) -> String {
    let base_parts: Vec<Component<'_>> = base.components().collect();
    let target_parts: Vec<Component<'_>> = target.components().collect();
    let common = base_parts.iter().zip(&target_parts).take_while(|(a, b)| a == b).count();

    let ups = base_parts.len() - common;
    let downs: Vec<String> = target_parts[common..]
        .iter()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    if ups == 0 {
        format!("./{}", downs.join("/"))
    } else {
        let mut parts = vec![".."; ups].into_iter().map(String::from).collect::<Vec<_>>();
        parts.extend(downs);
        parts.join("/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::route;

    fn resolver() -> Resolver {
        let mut aliases = BTreeMap::new();
        aliases.insert("@/".to_string(), PathBuf::from("/app/src"));
        aliases.insert("~pages/".to_string(), PathBuf::from("/app/src/pages"));
        Resolver::new(&aliases)
    }

    const SOURCE: &str = "/app/src/router/index.js";

    #[test]
    fn substitutes_alias_root() {
        let r = resolver();
        assert_eq!(
            r.resolve("@/pages/fiannce/Invoices.vue", Path::new(SOURCE)),
            Some(PathBuf::from("/app/src/pages/fiannce/Invoices.vue"))
        );
        assert_eq!(
            r.resolve("~pages/Home.vue", Path::new(SOURCE)),
            Some(PathBuf::from("/app/src/pages/Home.vue"))
        );
    }

    #[test]
    fn resolves_relative_to_source_directory() {
        let r = resolver();
        assert_eq!(
            r.resolve("../pages/About.vue", Path::new(SOURCE)),
            Some(PathBuf::from("/app/src/pages/About.vue"))
        );
        assert_eq!(
            r.resolve("./views/Local.vue", Path::new(SOURCE)),
            Some(PathBuf::from("/app/src/router/views/Local.vue"))
        );
    }

    #[test]
    fn bare_identifier_is_unresolved() {
        let r = resolver();
        assert_eq!(r.resolve("SettingsView", Path::new(SOURCE)), None);
        assert_eq!(r.resolve("", Path::new(SOURCE)), None);
    }

    #[test]
    fn resolution_is_idempotent() {
        let r = resolver();
        let first = r.resolve("@/pages/./a/../Home.vue", Path::new(SOURCE));
        let second = r.resolve("@/pages/./a/../Home.vue", Path::new(SOURCE));
        assert_eq!(first, second);
        assert_eq!(first, Some(PathBuf::from("/app/src/pages/Home.vue")));
    }

    #[test]
    fn reference_for_prefers_most_specific_alias() {
        let r = resolver();
        let target = Path::new("/app/src/pages/finance/Invoices.vue");
        let reference = r.reference_for(target, Path::new(SOURCE));
        assert_eq!(reference, "~pages/finance/Invoices.vue");
        assert_eq!(r.resolve(&reference, Path::new(SOURCE)).as_deref(), Some(target));
    }

    #[test]
    fn reference_for_falls_back_to_relative_path() {
        let r = Resolver::new(&BTreeMap::new());
        let target = Path::new("/app/pages/Home.vue");
        let reference = r.reference_for(target, Path::new("/app/src/router/index.js"));
        assert_eq!(reference, "../../pages/Home.vue");
        let source = Path::new("/app/src/router/index.js");
        assert_eq!(r.resolve(&reference, source).as_deref(), Some(target));

        let sibling = r.reference_for(Path::new("/app/src/router/views/A.vue"), Path::new(SOURCE));
        assert_eq!(sibling, "./views/A.vue");
    }

    #[test]
    fn resolve_routes_warns_on_unresolved() {
        let r = resolver();
        let mut routes = vec![
            route("/settings", "SettingsView"),
            route("/home", "@/pages/Home.vue"),
            route("/gone", ""),
        ];
        let warnings = r.resolve_routes(&mut routes);
        assert_eq!(warnings.len(), 1);
        assert!(matches!(
            &warnings[0],
            Warning::UnresolvedReference { reference, .. } if reference == "SettingsView"
        ));
        assert_eq!(routes[0].resolved_path, None);
        assert_eq!(routes[1].resolved_path, Some(PathBuf::from("/app/src/pages/Home.vue")));
        assert_eq!(routes[2].resolved_path, None);
    }
}
