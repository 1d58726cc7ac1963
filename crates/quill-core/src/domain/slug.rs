//! URL slug derivation for post titles.

/// Derive a URL slug from a title.
///
/// Lower-cases the title, drops everything outside `[a-z0-9 -]`, turns
/// whitespace runs into a single hyphen, squeezes repeated hyphens and trims
/// hyphens from both ends. The result may be empty when the title has no
/// ASCII letters or digits.
pub fn derive_slug(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_hyphen = false;

    for c in title.to_lowercase().chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c);
        } else if c == '-' || c.is_whitespace() {
            pending_hyphen = true;
        }
    }

    slug
}

/// A slug is non-empty lowercase kebab-case: `[a-z0-9-]+`.
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}
