//! Create or replace a post

use anyhow::Result;
use std::fs;
use std::path::PathBuf;

use crate::content::NewPost;
use crate::Publisher;

/// Post fields accepted on the command line
#[derive(Debug, Clone, Default)]
pub struct PostOptions {
    pub body: Option<String>,
    pub body_file: Option<PathBuf>,
    pub description: Option<String>,
    pub author: Option<String>,
    pub cover: Option<String>,
    pub tags: Vec<String>,
    pub weight: Option<i64>,
    pub slug: Option<String>,
    /// Comma separated
    pub keywords: Option<String>,
    pub show_in_list: bool,
}

impl PostOptions {
    /// Build the post input; a body file wins over an inline body
    pub fn into_post(self, title: &str) -> Result<NewPost> {
        let content = match (&self.body_file, self.body) {
            (Some(path), _) => fs::read_to_string(path)?,
            (None, Some(body)) => body,
            (None, None) => String::new(),
        };

        let mut post = NewPost::new(title, content);
        post.description = self.description.unwrap_or_default();
        post.author = self.author.unwrap_or_default();
        post.cover_image = self.cover.unwrap_or_default();
        post.tags = self.tags;
        post.weight = self.weight.unwrap_or(1);
        post.slug = self.slug.unwrap_or_default();
        post.keywords = self
            .keywords
            .as_deref()
            .map(NewPost::parse_keywords)
            .unwrap_or_default();
        post.hidden_in_list = !self.show_in_list;
        Ok(post)
    }
}

/// Create a new post under today's date
pub fn create_post(publisher: &Publisher, title: &str, options: PostOptions) -> Result<()> {
    let post = options.into_post(title)?;

    let duplicate = publisher.repository.check_duplicate(title)?;
    if let Some(path) = duplicate.path.filter(|_| post.slug.is_empty()) {
        tracing::warn!("Overwriting existing post {:?}", path);
    }

    let path = publisher.repository.save(&post)?;
    println!("Created: {:?}", path);
    Ok(())
}

/// Replace the post titled `old_title`
pub fn update_post(
    publisher: &Publisher,
    old_title: &str,
    title: &str,
    options: PostOptions,
) -> Result<()> {
    let post = options.into_post(title)?;
    let path = publisher.repository.update(old_title, &post)?;
    println!("Updated: {:?}", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_post() {
        let options = PostOptions {
            body: Some("inline".to_string()),
            tags: vec!["rust".to_string()],
            keywords: Some("a, b,,".to_string()),
            ..Default::default()
        };
        let post = options.into_post("Title").unwrap();
        assert_eq!(post.title, "Title");
        assert_eq!(post.content, "inline");
        assert_eq!(post.tags, vec!["rust"]);
        assert_eq!(post.keywords, vec!["a", "b"]);
        assert_eq!(post.weight, 1);
        assert!(post.hidden_in_list);
    }

    #[test]
    fn test_body_file_wins() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("body.md");
        fs::write(&file, "from file").unwrap();

        let options = PostOptions {
            body: Some("inline".to_string()),
            body_file: Some(file),
            show_in_list: true,
            ..Default::default()
        };
        let post = options.into_post("Title").unwrap();
        assert_eq!(post.content, "from file");
        assert!(!post.hidden_in_list);
    }

    #[test]
    fn test_create_and_update() {
        let dir = tempfile::tempdir().unwrap();
        let publisher = Publisher::new(dir.path()).unwrap();

        create_post(&publisher, "First", PostOptions::default()).unwrap();
        update_post(&publisher, "First", "Second", PostOptions::default()).unwrap();

        assert_eq!(publisher.repository.list_titles().unwrap(), vec!["second"]);
    }
}
