//! URL-safe slug derivation

/// Path words the family routers claim ahead of `/:slug`
pub const RESERVED_SLUGS: [&str; 6] = ["browse", "create", "export", "submissions", "submit", "tags"];

/// Derive the slug for an entry name
///
/// Lowercases the name, collapses every run of characters outside `[a-z0-9]`
/// into a single `-`, and trims leading and trailing hyphens.
///
/// # Examples
///
/// ```
/// use xicon_common::slug::slugify;
///
/// assert_eq!(slugify("Merkin Press"), "merkin-press");
/// assert_eq!(slugify("  Side-Straddle Hop!! "), "side-straddle-hop");
/// assert_eq!(slugify(&slugify("Al Gore")), "al-gore");
/// ```
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_hyphen = false;

    for c in name.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c);
        } else {
            pending_hyphen = true;
        }
    }

    slug
}

/// True when `slug` would be shadowed by a static route
pub fn is_reserved(slug: &str) -> bool {
    RESERVED_SLUGS.contains(&slug)
}
