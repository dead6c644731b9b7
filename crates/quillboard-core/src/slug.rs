//! URL-safe slugs.
//!
//! Slugs are lowercase ASCII words joined by single hyphens
//! (`^[a-z0-9]+(?:-[a-z0-9]+)*$`).

/// Derives a slug from free text: lowercases, maps every run of
/// non-alphanumeric characters to one hyphen and trims hyphens at both ends.
/// Non-ASCII letters are dropped.
///
/// ```
/// use quillboard_core::slug::generate_slug;
///
/// assert_eq!(generate_slug("Hello, World!"), "hello-world");
/// ```
pub fn generate_slug(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_hyphen = false;

    for c in input.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c.to_ascii_lowercase());
        } else if c.is_whitespace() || c.is_ascii_punctuation() {
            pending_hyphen = true;
        }
    }

    slug
}

/// Appends `-2`, `-3`, ... to `base` until `taken` reports the candidate free.
pub fn unique_slug<F>(base: &str, mut taken: F) -> String
where
    F: FnMut(&str) -> bool,
{
    if !taken(base) {
        return base.to_string();
    }

    let mut n = 2;
    loop {
        let candidate = format!("{base}-{n}");
        if !taken(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

pub fn is_valid_slug(value: &str) -> bool {
    !value.is_empty()
        && !value.starts_with('-')
        && !value.ends_with('-')
        && !value.contains("--")
        && value
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}
