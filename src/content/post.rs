//! Post models

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize, Serializer};

/// Title reserved for section index files, never listed
pub const INDEX_TITLE: &str = "_index";

/// A stored post as parsed from its markdown file
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostRecord {
    /// Post title (falls back to the filename stem)
    pub title: String,

    /// Custom slug, empty when the filename derives from the title
    pub slug: String,

    /// Site-root-relative cover image path
    pub cover_image: String,

    /// Cover image bytes, resolved against a site root for previews
    #[serde(rename = "coverImageBase64", serialize_with = "serialize_inline")]
    pub cover_image_inline: Option<Vec<u8>>,

    /// SEO keywords, in display order
    pub keywords: IndexSet<String>,

    /// Whether the cover is hidden in list views
    pub hidden_in_list: bool,

    /// Publication date (`YYYY-MM-DD`)
    pub date: String,

    /// Last modification timestamp (`YYYY-MM-DDThh:mm:ss±hh:mm`)
    pub lastmod: String,

    pub tags: Vec<String>,
    pub author: String,
    pub description: String,
    pub weight: i64,

    /// Markdown content after the front matter
    pub body: String,
}

impl PostRecord {
    /// Create a record carrying only a title, every other field defaulted
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            slug: String::new(),
            cover_image: String::new(),
            cover_image_inline: None,
            keywords: IndexSet::new(),
            hidden_in_list: true,
            date: String::new(),
            lastmod: String::new(),
            tags: Vec::new(),
            author: String::new(),
            description: String::new(),
            weight: 0,
            body: String::new(),
        }
    }

    /// Whether this is a section index rather than a post
    pub fn is_index(&self) -> bool {
        self.title == INDEX_TITLE
    }
}

fn serialize_inline<S>(bytes: &Option<Vec<u8>>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match bytes {
        Some(bytes) => serializer.serialize_str(&BASE64.encode(bytes)),
        None => serializer.serialize_str(""),
    }
}

/// Input for creating or replacing a post
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NewPost {
    pub title: String,
    /// Markdown body
    pub content: String,
    pub description: String,
    /// Empty means the configured default author
    pub author: String,
    pub cover_image: String,
    pub tags: Vec<String>,
    /// Values ≤ 0 are stored as 1
    pub weight: i64,
    /// Overrides the title-derived filename when non-empty
    pub slug: String,
    pub keywords: Vec<String>,
    pub hidden_in_list: bool,
}

impl NewPost {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            ..Default::default()
        }
    }

    /// Split a comma separated keyword string into trimmed, non-empty keywords
    pub fn parse_keywords(raw: &str) -> Vec<String> {
        raw.split(',')
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Text the filename is derived from
    pub fn slug_source(&self) -> &str {
        if self.slug.is_empty() {
            &self.title
        } else {
            &self.slug
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_keywords() {
        assert_eq!(
            NewPost::parse_keywords(" rust, cli ,, web "),
            vec!["rust", "cli", "web"]
        );
        assert!(NewPost::parse_keywords(" , ").is_empty());
    }

    #[test]
    fn test_slug_source_prefers_override() {
        let mut post = NewPost::new("Hello World", "");
        assert_eq!(post.slug_source(), "Hello World");
        post.slug = "custom".to_string();
        assert_eq!(post.slug_source(), "custom");
    }

    #[test]
    fn test_inline_cover_serializes_as_base64() {
        let mut record = PostRecord::new("Cover");
        record.cover_image_inline = Some(b"png".to_vec());
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["coverImageBase64"], "cG5n");
        assert_eq!(json["hiddenInList"], true);
    }
}
