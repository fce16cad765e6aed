//! Slug derivation for feed entry titles.
//!
//! A slug is the on-disk identity of a post: `images/<slug>.png` is the only
//! state the tool persists, so slugification must stay stable across runs.
//! The rule is deliberately simple: lowercase, collapse every run of
//! characters outside `[a-z0-9]` to a single hyphen, trim the ends.

/// Used when a title contains no alphanumeric characters at all.
pub const FALLBACK_SLUG: &str = "post";

/// Derive a filesystem-safe slug from an entry title.
///
/// - `"Hello, World!"` → `"hello-world"`
/// - `"  2024 -- a retrospective  "` → `"2024-a-retrospective"`
/// - `"???"` → `"post"`
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_hyphen = false;

    // Unicode lowercasing first, then keep only ASCII alphanumerics; anything
    // else (including accented letters) becomes a separator.
    for c in title.to_lowercase().chars() {
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

    if slug.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        slug
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_hyphenates() {
        assert_eq!(slugify("Hello, World!"), "hello-world");
    }

    #[test]
    fn collapses_runs_of_separators() {
        assert_eq!(slugify("one -- two?? three"), "one-two-three");
    }

    #[test]
    fn strips_leading_and_trailing_separators() {
        assert_eq!(slugify("  (Draft) notes  "), "draft-notes");
    }

    #[test]
    fn keeps_digits() {
        assert_eq!(slugify("2024: A Retrospective"), "2024-a-retrospective");
    }

    #[test]
    fn non_ascii_letters_become_separators() {
        assert_eq!(slugify("Café société"), "caf-soci-t");
    }

    #[test]
    fn no_alphanumerics_falls_back() {
        assert_eq!(slugify("???"), FALLBACK_SLUG);
        assert_eq!(slugify(""), FALLBACK_SLUG);
    }

    #[test]
    fn slug_form_input_is_a_fixed_point() {
        for s in ["hello-world", "post", "a", "2024-a-retrospective"] {
            assert_eq!(slugify(s), s);
        }
    }

    #[test]
    fn output_matches_slug_alphabet() {
        for title in ["Hello, World!", "  ?! ", "Ünïcødé — title", "a   b"] {
            let slug = slugify(title);
            assert!(!slug.is_empty());
            assert!(!slug.starts_with('-') && !slug.ends_with('-'));
            assert!(!slug.contains("--"));
            assert!(slug
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));
        }
    }
}
