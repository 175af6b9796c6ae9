//! Publisher configuration (publisher.yml)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main publisher configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PublisherConfig {
    // Directories (relative to the base directory)
    pub content_dir: PathBuf,
    pub image_dir: Option<PathBuf>,
    pub site_root: Option<PathBuf>,

    // Site
    pub site_url: String,
    pub upload_prefix: String,

    // Writing
    pub author: String,

    // Listing
    pub page_size: i64,

    #[serde(default)]
    pub indexnow: IndexNowConfig,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            content_dir: PathBuf::from("content/posts"),
            image_dir: Some(PathBuf::from("static/images/uploads")),
            site_root: Some(PathBuf::from(".")),

            site_url: "https://example.com".to_string(),
            upload_prefix: "/images/uploads/".to_string(),

            author: "Aries".to_string(),

            page_size: 5,

            indexnow: IndexNowConfig::default(),
        }
    }
}

impl PublisherConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: PublisherConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Resolve the configured directories against `base_dir`
    pub fn resolve_paths(&mut self, base_dir: &Path) {
        self.content_dir = base_dir.join(&self.content_dir);
        self.image_dir = self.image_dir.as_ref().map(|p| base_dir.join(p));
        self.site_root = self.site_root.as_ref().map(|p| base_dir.join(p));
    }

    /// Public URL of a post saved under `date` with `slug`
    pub fn post_url(&self, date: &str, slug: &str) -> String {
        let slug = percent_encoding::utf8_percent_encode(slug, PATH_SEGMENT);
        format!("{}/{}/{}/", self.site_url.trim_end_matches('/'), date, slug)
    }
}

/// Characters escaped in a URL path segment
const PATH_SEGMENT: &percent_encoding::AsciiSet = &percent_encoding::CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// IndexNow search engine notification settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexNowConfig {
    pub enabled: bool,
    pub endpoint: String,
    pub host: String,
    pub key: String,
    /// Defaults to `https://<host>/<key>.txt`
    pub key_location: String,
    /// Wait before submitting, so the new page is reachable
    pub delay_secs: u64,
    pub timeout_secs: u64,
}

impl Default for IndexNowConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: "https://api.indexnow.org/IndexNow".to_string(),
            host: "example.com".to_string(),
            key: String::new(),
            key_location: String::new(),
            delay_secs: 2,
            timeout_secs: 30,
        }
    }
}

impl IndexNowConfig {
    pub fn key_location(&self) -> String {
        if self.key_location.is_empty() {
            format!("https://{}/{}.txt", self.host, self.key)
        } else {
            self.key_location.clone()
        }
    }
}
