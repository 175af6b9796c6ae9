//! Filename-safe slugs derived from post titles

/// Longest slug kept, in characters
pub const MAX_SLUG_LEN: usize = 50;

/// Slug used when nothing survives sanitizing
pub const FALLBACK_SLUG: &str = "post";

/// Turn free text into a filesystem-friendly identifier.
///
/// Letters and digits of any script are kept, `-` and `_` pass through and
/// everything else becomes a hyphen. Hyphen runs are collapsed with two
/// `"--" -> "-"` passes, so very long runs (8 or more) keep a few hyphens.
///
/// # Examples
/// ```
/// use hugo_publisher::content::slug::slugify;
///
/// assert_eq!(slugify("Hello, World!"), "hello-world");
/// assert_eq!(slugify("???"), "post");
/// ```
pub fn slugify(text: &str) -> String {
    let mapped: String = text
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_alphabetic() || c.is_numeric() || c == '-' || c == '_' {
                c
            } else {
                '-'
            }
        })
        .collect();

    let collapsed = mapped.replace("--", "-").replace("--", "-");
    let truncated: String = collapsed.chars().take(MAX_SLUG_LEN).collect();
    let trimmed = truncated.trim_matches(|c| c == '-' || c == '_');

    if trimmed.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Markdown filename for a title or slug override
pub fn filename(text: &str) -> String {
    format!("{}.md", slugify(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_slug() {
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("Rust_Tips and-Tricks"), "rust_tips-and-tricks");
        assert_eq!(filename("Hello World"), "hello-world.md");
    }

    #[test]
    fn test_unicode_letters_are_kept() {
        assert_eq!(slugify("Go 语言 编程"), "go-语言-编程");
        assert_eq!(slugify("Ça va?"), "ça-va");
    }

    #[test]
    fn test_punctuation_collapses() {
        assert_eq!(slugify("a -- b"), "a-b");
        assert_eq!(slugify("what?! really..."), "what-really");
    }

    #[test]
    fn test_long_hyphen_runs_are_not_fully_collapsed() {
        // two literal passes turn 8 hyphens into 2
        assert_eq!(slugify("a--------b"), "a--b");
    }

    #[test]
    fn test_fallback() {
        assert_eq!(slugify(""), "post");
        assert_eq!(slugify("!!!"), "post");
        assert_eq!(slugify("__--__"), "post");
    }

    #[test]
    fn test_slug_properties() {
        let titles = [
            "",
            "  leading and trailing  ",
            "-_-edge-_-",
            "A very long title that keeps going and going well past fifty characters",
            "标题：中文也可以，对吧？",
            "emoji 🎉 party 🎉",
            "tab\tand\nnewline",
            "----------------",
        ];

        for title in titles {
            let slug = slugify(title);
            assert!(!slug.is_empty(), "{:?}", title);
            assert!(slug.chars().count() <= MAX_SLUG_LEN, "{:?}", title);
            assert!(
                slug.chars()
                    .all(|c| c.is_alphabetic() || c.is_numeric() || c == '-' || c == '_'),
                "{:?} -> {:?}",
                title,
                slug
            );
            assert!(!slug.starts_with(['-', '_']), "{:?}", title);
            assert!(!slug.ends_with(['-', '_']), "{:?}", title);
            assert_eq!(slug, slugify(title));
        }
    }

    #[test]
    fn test_truncates_to_fifty_chars() {
        let slug = slugify(&"字".repeat(80));
        assert_eq!(slug.chars().count(), 50);
    }
}
