//! Slug generation for templates.
//!
//! Slugs are human-readable with a short random suffix so that renaming a
//! template never collides with an existing slug.

/// Lowercase `name`, replace non-alphanumeric runs with `-`, and trim
/// leading/trailing dashes. An empty result falls back to `"template"`.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    if slug.is_empty() {
        slug.push_str("template");
    }
    slug
}

/// Produce a unique slug: `slugify(name)` plus a 6-hex-char random suffix.
pub fn unique_slug(name: &str) -> String {
    let suffix: String = uuid::Uuid::new_v4().simple().to_string();
    format!("{}-{}", slugify(name), &suffix[..6])
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_basic() {
        assert_eq!(slugify("Peak Shaving v2"), "peak-shaving-v2");
        assert_eq!(slugify("  Solar!!Export  "), "solar-export");
        assert_eq!(slugify("***"), "template");
    }

    #[test]
    fn unique_slug_has_suffix() {
        let slug = unique_slug("My Rules");
        assert!(slug.starts_with("my-rules-"));
        assert_eq!(slug.len(), "my-rules-".len() + 6);
        assert_ne!(unique_slug("My Rules"), unique_slug("My Rules"));
    }
}
