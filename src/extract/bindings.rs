//! Symbol table of top-level identifiers bound to imports.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;

fn static_import_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?m)^import\s+([A-Za-z_$][\w$]*)\s+from\s+['"]([^'"]+)['"]"#)
            .expect("valid import regex")
    })
}

fn declaration_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?m)^(?:export\s+)?(?:const|let|var)\s+([A-Za-z_$][\w$]*)\s*(?::[^=\n]+)?=(.*)$",
        )
        .expect("valid declaration regex")
    })
}

/// Dynamic `import('x')` or `require('x')`, allowing an inline comment before
/// the literal. Group 1 is the literal contents.
pub(crate) fn dynamic_import_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"\b(?:import|require)\s*\(\s*(?:/\*.*?\*/\s*)?['"`]([^'"`]+)['"`]"#)
            .expect("valid dynamic import regex")
    })
}

/// Identifier to imported literal, built once per conceptual source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BindingTable {
    bindings: BTreeMap<String, String>,
}

impl BindingTable {
    /// Collects bindings from every source text; the first binding of a name
    /// wins.
    ///
    /// Recognized forms, at column zero only:
    /// - `import Name from 'literal'`
    /// - `const Name = () => import('literal')` (any wrapper around a dynamic
    ///   import or `require`)
    #[must_use]
    pub fn build<'a, I>(texts: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut bindings = BTreeMap::new();
        for text in texts {
            let mut found: Vec<(usize, String, String)> = Vec::new();
            for caps in static_import_re().captures_iter(text) {
                let at = caps.get(0).map_or(0, |m| m.start());
                found.push((at, caps[1].to_string(), caps[2].to_string()));
            }
            for caps in declaration_re().captures_iter(text) {
                if let Some(import) = dynamic_import_re().captures(&caps[2]) {
                    let at = caps.get(0).map_or(0, |m| m.start());
                    found.push((at, caps[1].to_string(), import[1].to_string()));
                }
            }
            found.sort_by_key(|(pos, _, _)| *pos);
            for (_, name, literal) in found {
                bindings.entry(name).or_insert(literal);
            }
        }
        Self { bindings }
    }

    /// Imported literal bound to `identifier`.
    #[must_use]
    pub fn lookup(&self, identifier: &str) -> Option<&str> {
        self.bindings.get(identifier).map(String::as_str)
    }

    /// Number of bindings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Returns `true` if no bindings were found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
