//! Text helpers: slug generation

use unicode_normalization::UnicodeNormalization;

/// Convert a string into a URL slug.
///
/// Accents are folded to ASCII (NFKD, combining marks dropped), anything that
/// is not alphanumeric, `_`, `-` or whitespace is removed, the result is
/// lowercased and runs of whitespace or hyphens become a single `-`.
/// Leading and trailing `-`/`_` are stripped.
pub fn slugify(value: &str) -> String {
    let ascii: String = value
        .nfkd()
        .filter(|c| c.is_ascii())
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-' || c.is_ascii_whitespace())
        .map(|c| c.to_ascii_lowercase())
        .collect();

    let mut slug = String::with_capacity(ascii.len());
    let mut pending_dash = false;
    for c in ascii.trim().chars() {
        if c == '-' || c.is_ascii_whitespace() {
            pending_dash = true;
            continue;
        }
        if pending_dash && !slug.is_empty() {
            slug.push('-');
        }
        pending_dash = false;
        slug.push(c);
    }

    slug.trim_matches(|c| c == '-' || c == '_').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_basic() {
        assert_eq!(slugify("The Hobbit"), "the-hobbit");
        assert_eq!(slugify("  Hello,   World!  "), "hello-world");
    }

    #[test]
    fn test_slugify_accents() {
        assert_eq!(slugify("Les Misérables-VictorHugo"), "les-miserables-victorhugo");
        assert_eq!(slugify("Ñandú Café"), "nandu-cafe");
    }

    #[test]
    fn test_slugify_collapses_separators() {
        assert_eq!(slugify("a -- b"), "a-b");
        assert_eq!(slugify("--edge--"), "edge");
        assert_eq!(slugify("_under_score_"), "under_score");
    }

    #[test]
    fn test_slugify_drops_non_ascii() {
        assert_eq!(slugify("日本語"), "");
        assert_eq!(slugify("Dune 2"), "dune-2");
    }

    #[test]
    fn test_slugify_is_stable() {
        let once = slugify("Don Quixote-MiguelCervantes");
        assert_eq!(slugify(&once), once);
    }
}
