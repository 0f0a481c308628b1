//! Boilerplate page templates for scaffolded files.

use std::path::Path;

use crate::tokens::pascal_case;

/// Page flavour, picked from the target's extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageTemplate {
    /// Vue single-file component.
    Vue,
    /// React function component (`jsx`, `tsx`, `js`, `ts`).
    React,
    /// Svelte component.
    Svelte,
}

impl PageTemplate {
    /// Template for `target`; unknown extensions fall back to Vue.
    #[must_use]
    pub fn for_path(target: &Path) -> Self {
        match target.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase).as_deref() {
            Some("jsx" | "tsx" | "js" | "ts") => Self::React,
            Some("svelte") => Self::Svelte,
            _ => Self::Vue,
        }
    }

    /// Renders a page for the route at `route_path` titled `title`.
    #[must_use]
    pub fn render(self, target: &Path, route_path: &str, title: &str) -> String {
        let title = escape_html(title);
        let route_path = escape_html(route_path);
        match self {
            Self::Vue => format!(
                "\
<template>
  <main class=\"page\" data-route=\"{route_path}\">
    <h1>{title}</h1>
  </main>
</template>

<script setup>
document.title = '{}'
</script>
",
                escape_js(&title)
            ),
            Self::React => {
                let stem = target.file_stem().and_then(|s| s.to_str()).unwrap_or("Page");
                let component = pascal_case(stem);
                let component = if component.is_empty() { "Page".to_string() } else { component };
                format!(
                    "\
export default function {component}() {{
  return (
    <main className=\"page\" data-route=\"{route_path}\">
      <h1>{title}</h1>
    </main>
  );
}}
"
                )
            }
            Self::Svelte => format!(
                "\
<svelte:head>
  <title>{title}</title>
</svelte:head>

<main class=\"page\" data-route=\"{route_path}\">
  <h1>{title}</h1>
</main>
"
            ),
        }
    }
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;").replace('"', "&quot;")
}

/// Escapes `text` for a single-quoted JavaScript string.
pub(crate) fn escape_js(text: &str) -> String {
    text.replace('\\', "\\\\").replace('\'', "\\'")
}
