//! Page titles for scaffolded pages and synthesized routes.

use crate::tokens::{capitalize, split_words};

const TITLES: &[(&str, &str)] = &[
    ("home", "Home"),
    ("index", "Home"),
    ("dashboard", "Dashboard"),
    ("about", "About"),
    ("contact", "Contact Us"),
    ("faq", "FAQ"),
    ("login", "Sign In"),
    ("signin", "Sign In"),
    ("logout", "Sign Out"),
    ("register", "Create Account"),
    ("signup", "Create Account"),
    ("profile", "Profile"),
    ("settings", "Settings"),
    ("404", "Page Not Found"),
    ("notfound", "Page Not Found"),
    ("pagenotfound", "Page Not Found"),
    ("403", "Access Denied"),
    ("forbidden", "Access Denied"),
    ("500", "Server Error"),
    ("servererror", "Server Error"),
];

/// Title for a page named by `segment`, e.g. a route's last path segment or
/// a file stem.
///
/// Known page names come from a lookup table; anything else is split on
/// camel and kebab boundaries with each word capitalized.
#[must_use]
pub fn title_for(segment: &str) -> String {
    let key: String =
        segment.chars().filter(char::is_ascii_alphanumeric).collect::<String>().to_lowercase();
    if key.is_empty() {
        return "Home".to_string();
    }
    if let Some((_, title)) = TITLES.iter().find(|(name, _)| *name == key) {
        return (*title).to_string();
    }
    split_words(segment).iter().map(|w| capitalize(w)).collect::<Vec<_>>().join(" ")
}
