//! hugo-publisher: a local content manager for Hugo-style blogs
//!
//! Posts are markdown files with YAML front matter, stored under
//! `<content_dir>/<YYYY-MM-DD>/<slug>.md`. This crate lists, searches,
//! creates, replaces and deletes them, recompresses uploaded images and
//! announces new posts to IndexNow.

pub mod commands;
pub mod config;
pub mod content;
pub mod error;
pub mod media;
pub mod notify;
pub mod repository;
pub mod server;

pub use error::{Error, Result};

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::notify::{IndexNow, NotificationQueue};
use crate::repository::Repository;

/// Name of the configuration file looked up in the base directory
pub const CONFIG_FILE: &str = "publisher.yml";

/// The main publisher application
pub struct Publisher {
    /// Base directory
    pub base_dir: PathBuf,
    /// Post store, configured with resolved directories
    pub repository: Repository,
}

impl Publisher {
    /// Create a publisher for the blog in `base_dir`
    pub fn new<P: AsRef<Path>>(base_dir: P) -> anyhow::Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join(CONFIG_FILE);

        let mut config = if config_path.exists() {
            config::PublisherConfig::load(&config_path)?
        } else {
            tracing::debug!("No {} in {:?}, using defaults", CONFIG_FILE, base_dir);
            config::PublisherConfig::default()
        };
        config.resolve_paths(&base_dir);

        Ok(Self {
            base_dir,
            repository: Repository::new(config),
        })
    }

    /// Start announcing saved posts if IndexNow is enabled.
    ///
    /// Must be called inside a tokio runtime.
    pub fn enable_notifications(mut self) -> anyhow::Result<Self> {
        let settings = self.repository.config().indexnow.clone();
        if !settings.enabled {
            return Ok(self);
        }
        if settings.key.is_empty() {
            let message = "indexnow.key is required when indexnow is enabled";
            return Err(Error::Config(message.to_string()).into());
        }

        let delay = Duration::from_secs(settings.delay_secs);
        let queue = NotificationQueue::spawn(IndexNow::new(settings)?, delay);
        self.repository = self.repository.with_notifications(queue);
        tracing::debug!("IndexNow notifications enabled");
        Ok(self)
    }

    /// Wait for queued notifications to be delivered
    pub async fn shutdown(mut self) {
        if let Some(queue) = self.repository.take_notifications() {
            queue.close().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_new_without_config() {
        let dir = tempfile::tempdir().unwrap();
        let publisher = Publisher::new(dir.path()).unwrap();
        assert_eq!(
            publisher.repository.content_dir(),
            dir.path().join("content/posts")
        );
    }

    #[test]
    fn test_new_with_config() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE),
            "content_dir: posts\nauthor: Someone\n",
        )
        .unwrap();

        let publisher = Publisher::new(dir.path()).unwrap();
        assert_eq!(publisher.repository.content_dir(), dir.path().join("posts"));
        assert_eq!(publisher.repository.config().author, "Someone");
    }

    #[tokio::test]
    async fn test_enable_notifications_requires_key() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "indexnow:\n  enabled: true\n").unwrap();

        let publisher = Publisher::new(dir.path()).unwrap();
        assert!(publisher.enable_notifications().is_err());
    }

    #[tokio::test]
    async fn test_notifications_disabled_by_default() {
        let dir = tempfile::tempdir().unwrap();
        let publisher = Publisher::new(dir.path())
            .unwrap()
            .enable_notifications()
            .unwrap();
        publisher.shutdown().await;
    }
}
