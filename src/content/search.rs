//! Case-insensitive post search over title, slug and keywords

use super::PostRecord;

/// A normalized search query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    term: String,
}

impl Query {
    pub fn new(text: &str) -> Self {
        Self {
            term: text.trim().to_lowercase(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.term.is_empty()
    }

    /// Check a record against the query.
    ///
    /// The whole term is tried as a substring of the title, slug and each
    /// keyword first. A multi-word term that fails this falls back to
    /// requiring every word to appear in at least one of those fields.
    pub fn matches(&self, record: &PostRecord) -> bool {
        if self.is_empty() {
            return true;
        }

        let fields = SearchFields::of(record);
        if fields.contains(&self.term) {
            return true;
        }

        self.term.contains(char::is_whitespace)
            && self
                .term
                .split_whitespace()
                .all(|token| fields.contains(token))
    }

    /// Keep the matching records, preserving their order
    pub fn filter(&self, records: Vec<PostRecord>) -> Vec<PostRecord> {
        records.into_iter().filter(|r| self.matches(r)).collect()
    }
}

/// Lowercased searchable text of one record
struct SearchFields {
    title: String,
    slug: String,
    keywords: Vec<String>,
}

impl SearchFields {
    fn of(record: &PostRecord) -> Self {
        Self {
            title: record.title.to_lowercase(),
            slug: record.slug.to_lowercase(),
            keywords: record.keywords.iter().map(|k| k.to_lowercase()).collect(),
        }
    }

    fn contains(&self, needle: &str) -> bool {
        self.title.contains(needle)
            || self.slug.contains(needle)
            || self.keywords.iter().any(|k| k.contains(needle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(title: &str, slug: &str, keywords: &[&str]) -> PostRecord {
        let mut record = PostRecord::new(title);
        record.slug = slug.to_string();
        record.keywords = keywords.iter().map(|k| k.to_string()).collect();
        record
    }

    #[test]
    fn test_empty_query_matches_everything() {
        let query = Query::new("   ");
        assert!(query.is_empty());
        assert!(query.matches(&record("anything", "", &[])));
    }

    #[test]
    fn test_substring_fields() {
        let post = record("Learning Rust", "rust-intro", &["Ownership"]);
        assert!(Query::new("learn").matches(&post));
        assert!(Query::new("intro").matches(&post));
        assert!(Query::new("owner").matches(&post));
        assert!(!Query::new("python").matches(&post));
    }

    #[test]
    fn test_case_insensitive() {
        let post = record("Go 语言编程", "", &["Concurrency"]);
        for (lower, upper) in [("go", "GO"), ("concurrency", "CONCURRENCY")] {
            assert_eq!(
                Query::new(lower).matches(&post),
                Query::new(upper).matches(&post)
            );
        }
        assert!(Query::new("  GO  ").matches(&post));
    }

    #[test]
    fn test_token_and_fallback() {
        let post = record("go basics", "", &["语言"]);
        assert!(Query::new("go 语言").matches(&post));
        assert!(Query::new("语言   GO").matches(&post));
        assert!(!Query::new("go rust").matches(&post));
    }

    #[test]
    fn test_tokens_need_no_single_field() {
        let post = record("alpha", "beta", &["gamma"]);
        assert!(Query::new("alpha beta gamma").matches(&post));
        assert!(!Query::new("alpha delta").matches(&post));
    }

    #[test]
    fn test_filter_preserves_order() {
        let records = vec![
            record("go one", "", &[]),
            record("python", "", &[]),
            record("go two", "", &[]),
        ];
        let titles: Vec<_> = Query::new("go")
            .filter(records)
            .into_iter()
            .map(|r| r.title)
            .collect();
        assert_eq!(titles, vec!["go one", "go two"]);
    }
}
