//! Word tokenization for paths, names and file names.

use std::collections::BTreeSet;
use std::path::Path;

/// Tokens of this length or shorter are discarded.
const MIN_TOKEN_LEN: usize = 3;

/// Splits `input` on non-alphanumeric and camel-case boundaries.
///
/// Case is preserved; empty pieces are dropped. `HTMLPage` splits into
/// `HTML` and `Page`.
#[must_use]
pub fn split_words(input: &str) -> Vec<String> {
    let mut words = Vec::new();
    for chunk in input.split(|c: char| !c.is_alphanumeric()) {
        let chars: Vec<char> = chunk.chars().collect();
        let mut current = String::new();
        for (i, &c) in chars.iter().enumerate() {
            if i > 0 && c.is_uppercase() {
                let prev = chars[i - 1];
                let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
                let boundary = prev.is_lowercase()
                    || prev.is_ascii_digit()
                    || (prev.is_uppercase() && next_is_lower);
                if boundary && !current.is_empty() {
                    words.push(std::mem::take(&mut current));
                }
            }
            current.push(c);
        }
        if !current.is_empty() {
            words.push(current);
        }
    }
    words
}

/// Lowercases words, drops short ones and deduplicates.
pub fn token_set<'a, I>(parts: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = &'a str>,
{
    parts
        .into_iter()
        .flat_map(split_words)
        .map(|w| w.to_lowercase())
        .filter(|w| w.chars().count() >= MIN_TOKEN_LEN)
        .collect()
}

/// Tokens for a page file: every directory segment plus the file stem.
#[must_use]
pub fn file_tokens(relative_path: &str) -> BTreeSet<String> {
    let mut segments: Vec<&str> = relative_path.split('/').collect();
    let file_name = segments.pop().unwrap_or_default();
    let stem = Path::new(file_name).file_stem().and_then(|s| s.to_str()).unwrap_or(file_name);
    segments.push(stem);
    token_set(segments)
}

/// Returns `true` for a `:param`, `*` or `(...)` segment.
#[must_use]
pub fn is_param_segment(segment: &str) -> bool {
    segment.starts_with(':') || segment.contains('*') || segment.contains('(')
}

/// Tokens for a URL path, skipping parameter segments.
#[must_use]
pub fn path_tokens(path: &str) -> BTreeSet<String> {
    token_set(path.split('/').filter(|s| !is_param_segment(s)))
}

/// `QuarterlySummary` becomes `quarterly-summary`.
#[must_use]
pub fn kebab_case(input: &str) -> String {
    split_words(input).iter().map(|w| w.to_lowercase()).collect::<Vec<_>>().join("-")
}

/// `quarterly-summary` becomes `QuarterlySummary`.
#[must_use]
pub fn pascal_case(input: &str) -> String {
    split_words(input).iter().map(|w| capitalize(w)).collect()
}

/// Uppercases the first character.
#[must_use]
pub fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Counts tokens of `left` that share a substring relation with any token of
/// `right`.
#[must_use]
pub fn overlap_count(left: &BTreeSet<String>, right: &BTreeSet<String>) -> usize {
    left.iter()
        .filter(|l| right.iter().any(|r| r.contains(l.as_str()) || l.contains(r.as_str())))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn split_words_handles_camel_and_separators() {
        assert_eq!(split_words("QuarterlySummary"), vec!["Quarterly", "Summary"]);
        assert_eq!(split_words("user-profile_edit"), vec!["user", "profile", "edit"]);
        assert_eq!(split_words("HTMLPage"), vec!["HTML", "Page"]);
        assert_eq!(split_words("page404Error"), vec!["page404", "Error"]);
    }

    #[test]
    fn file_tokens_use_directories_and_stem() {
        assert_eq!(
            file_tokens("reports/QuarterlySummary.vue"),
            set(&["quarterly", "reports", "summary"])
        );
        assert_eq!(file_tokens("finance/Invoices.vue"), set(&["finance", "invoices"]));
    }

    #[test]
    fn short_tokens_are_discarded() {
        assert_eq!(file_tokens("ui/MyApp.vue"), set(&["app"]));
    }

    #[test]
    fn path_tokens_skip_params() {
        assert_eq!(path_tokens("/users/:id/edit"), set(&["edit", "users"]));
        assert_eq!(path_tokens("/:pathMatch(.*)*"), BTreeSet::new());
    }

    #[test]
    fn case_conversions() {
        assert_eq!(kebab_case("QuarterlySummary"), "quarterly-summary");
        assert_eq!(pascal_case("quarterly-summary"), "QuarterlySummary");
        assert_eq!(capitalize("home"), "Home");
    }

    #[test]
    fn overlap_uses_substring_containment() {
        let route = set(&["invoice", "billing"]);
        let file = set(&["invoices", "finance"]);
        assert_eq!(overlap_count(&route, &file), 1);
    }
}
