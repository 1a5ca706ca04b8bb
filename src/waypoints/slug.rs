use once_cell::sync::Lazy;
use regex::Regex;

use crate::constants::Slug;

static NON_ALNUM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9]+").expect("valid slug separator regex"));

/// Derive a URL-safe slug from a display name.
///
/// The name is lowercased, every run of characters outside `[a-z0-9]` becomes a single `-`,
/// and leading/trailing separators are dropped. A name with no alphanumeric character yields
/// an empty slug.
pub fn slugify(name: &str) -> Slug {
    let lowered = name.to_lowercase();
    NON_ALNUM
        .replace_all(&lowered, "-")
        .trim_matches('-')
        .to_string()
}
