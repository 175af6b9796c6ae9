//! The post repository: listing, lookup and mutation over dated folders
//!
//! Posts live at `<content_dir>/<YYYY-MM-DD>/<slug>.md`. The repository
//! assumes it is the only writer of that tree.

mod images;

pub use images::{extract_image_refs, ImageLocations};

use chrono::{DateTime, Local};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::PublisherConfig;
use crate::content::listing::{self, LASTMOD_FORMAT};
use crate::content::loader::{self, DATE_DIR_FORMAT};
use crate::content::{frontmatter, slug, ContentLoader, NewPost, PostPage, PostRecord, Query};
use crate::error::{Error, Result};
use crate::media;
use crate::notify::NotificationQueue;

/// Result of a duplicate title check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Duplicate {
    pub found: bool,
    /// First existing file with the candidate name
    pub path: Option<PathBuf>,
}

/// A post file found on disk
#[derive(Debug, Clone)]
struct Located {
    path: PathBuf,
    /// Containing date directory; `None` for flat-layout files
    date_dir: Option<PathBuf>,
}

/// Markdown post store rooted at the configured content directory
pub struct Repository {
    config: PublisherConfig,
    notifications: Option<NotificationQueue>,
}

impl Repository {
    /// Create a repository; directories in `config` must already be resolved
    pub fn new(config: PublisherConfig) -> Self {
        Self {
            config,
            notifications: None,
        }
    }

    /// Announce saved posts through `queue`
    pub fn with_notifications(mut self, queue: NotificationQueue) -> Self {
        self.notifications = Some(queue);
        self
    }

    /// Detach the notification queue, e.g. to drain it before exit
    pub fn take_notifications(&mut self) -> Option<NotificationQueue> {
        self.notifications.take()
    }

    pub fn config(&self) -> &PublisherConfig {
        &self.config
    }

    pub fn content_dir(&self) -> &Path {
        &self.config.content_dir
    }

    /// List posts newest first, filtered by `search`, one page at a time
    pub fn list(&self, page: i64, page_size: i64, search: &str) -> Result<PostPage> {
        let query = Query::new(search);

        let posts: Vec<PostRecord> = ContentLoader::new(self.content_dir())
            .load_records()?
            .into_iter()
            .filter(|record| !record.is_index())
            .collect();
        let mut records = query.filter(posts);
        listing::sort_by_recency(&mut records);

        let mut page = listing::paginate(records, page, page_size);
        if let Some(root) = self.config.site_root.as_deref() {
            for record in &mut page.posts {
                frontmatter::load_cover(record, root);
            }
        }

        tracing::debug!(
            "Listed {} of {} posts for query {:?}",
            page.posts.len(),
            page.total,
            search
        );
        Ok(page)
    }

    /// Filename stems of every post
    pub fn list_titles(&self) -> Result<Vec<String>> {
        let titles = loader::post_paths(self.content_dir())?
            .iter()
            .filter_map(|path| path.file_stem()?.to_str().map(str::to_string))
            .collect();
        Ok(titles)
    }

    /// Raw markdown of the post titled `title`
    pub fn load(&self, title: &str) -> Result<String> {
        let located = self.require(title)?;
        Ok(fs::read_to_string(&located.path)?)
    }

    /// Bytes of an image referenced from a post
    pub fn load_image(&self, path: &str) -> Result<Vec<u8>> {
        media::load_image(path, self.config.site_root.as_deref())
    }

    /// Look for an existing post file named after `title` in any date directory
    pub fn check_duplicate(&self, title: &str) -> Result<Duplicate> {
        let filename = slug::filename(title);

        for dir in loader::date_dirs(self.content_dir())? {
            let candidate = dir.path.join(&filename);
            if candidate.exists() {
                return Ok(Duplicate {
                    found: true,
                    path: Some(candidate),
                });
            }
        }

        Ok(Duplicate {
            found: false,
            path: None,
        })
    }

    /// Write a new post under today's date directory.
    ///
    /// An existing file at the same path is replaced.
    pub fn save(&self, post: &NewPost) -> Result<PathBuf> {
        self.save_at(post, Local::now())
    }

    /// Replace the post titled `old_title` with `post`.
    ///
    /// The new file is written before the old one is removed, so a failed
    /// write leaves the old post in place. Once the new file exists, failing
    /// to remove the old one is only logged. Referenced images are kept.
    pub fn update(&self, old_title: &str, post: &NewPost) -> Result<PathBuf> {
        self.update_at(old_title, post, Local::now())
    }

    /// Delete a post, the images its body references and its emptied date directory
    pub fn delete(&self, title: &str) -> Result<PathBuf> {
        let located = self.require(title)?;

        let content = fs::read_to_string(&located.path)?;
        let record = frontmatter::decode(&content, title);
        self.image_locations().remove_referenced(&record.body);

        fs::remove_file(&located.path)?;
        tracing::info!("Deleted post {:?}", located.path);

        if let Some(dir) = &located.date_dir {
            remove_if_empty(dir);
        }

        Ok(located.path)
    }

    fn save_at(&self, post: &NewPost, now: DateTime<Local>) -> Result<PathBuf> {
        let (path, url) = self.write_post(post, now)?;
        self.announce(url);
        Ok(path)
    }

    fn update_at(&self, old_title: &str, post: &NewPost, now: DateTime<Local>) -> Result<PathBuf> {
        let old = self.require(old_title)?;
        let (path, url) = self.write_post(post, now)?;

        if old.path != path {
            match fs::remove_file(&old.path) {
                Ok(()) => {
                    tracing::info!("Replaced {:?} with {:?}", old.path, path);
                    if let Some(dir) = &old.date_dir {
                        remove_if_empty(dir);
                    }
                }
                Err(e) => tracing::warn!(
                    "Saved {:?} but failed to remove old post {:?}: {}",
                    path,
                    old.path,
                    e
                ),
            }
        }

        self.announce(url);
        Ok(path)
    }

    /// Encode and write `post`, returning its path and public URL
    fn write_post(&self, post: &NewPost, now: DateTime<Local>) -> Result<(PathBuf, String)> {
        let date = now.format(DATE_DIR_FORMAT).to_string();
        let file_slug = slug::slugify(post.slug_source());
        let record = self.to_record(post, &date, &now.format(LASTMOD_FORMAT).to_string());

        let dir = self.content_dir().join(&date);
        fs::create_dir_all(&dir)?;

        let path = dir.join(format!("{}.md", file_slug));
        write_staged(&path, &frontmatter::encode(&record))?;
        tracing::info!("Saved post {:?} to {:?}", record.title, path);

        Ok((path, self.config.post_url(&date, &file_slug)))
    }

    fn to_record(&self, post: &NewPost, date: &str, lastmod: &str) -> PostRecord {
        let mut record = PostRecord::new(post.title.clone());
        record.slug = post.slug.clone();
        record.cover_image = post.cover_image.clone();
        record.hidden_in_list = post.hidden_in_list;
        record.keywords = post
            .keywords
            .iter()
            .map(|k| k.trim())
            .filter(|k| !k.is_empty())
            .map(str::to_string)
            .collect();
        record.date = date.to_string();
        record.lastmod = lastmod.to_string();
        record.tags = post.tags.clone();
        record.author = if post.author.is_empty() {
            self.config.author.clone()
        } else {
            post.author.clone()
        };
        record.description = post.description.clone();
        record.weight = if post.weight <= 0 { 1 } else { post.weight };
        record.body = post.content.clone();
        record
    }

    fn announce(&self, url: String) {
        if let Some(queue) = &self.notifications {
            tracing::debug!("Queued {} for indexing", url);
            queue.enqueue(url);
        }
    }

    fn require(&self, title: &str) -> Result<Located> {
        self.locate(title)?
            .ok_or_else(|| Error::NotFound(title.to_string()))
    }

    /// Find a post by its title-derived filename, then by front-matter title
    fn locate(&self, title: &str) -> Result<Option<Located>> {
        let filename = slug::filename(title);
        for dir in loader::date_dirs(self.content_dir())? {
            let path = dir.path.join(&filename);
            if path.is_file() {
                return Ok(Some(Located {
                    path,
                    date_dir: Some(dir.path),
                }));
            }
        }

        for path in loader::post_paths(self.content_dir())? {
            if frontmatter::decode_file(&path, None).title == title {
                let date_dir = path
                    .parent()
                    .filter(|parent| *parent != self.content_dir())
                    .map(Path::to_path_buf);
                return Ok(Some(Located { path, date_dir }));
            }
        }

        Ok(None)
    }

    fn image_locations(&self) -> ImageLocations<'_> {
        ImageLocations {
            image_dir: self.config.image_dir.as_deref(),
            site_root: self.config.site_root.as_deref(),
            upload_prefix: &self.config.upload_prefix,
        }
    }
}

/// Write through a hidden sibling file and rename it into place
fn write_staged(path: &Path, content: &str) -> Result<()> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("post.md");
    let staging = path.with_file_name(format!(".{}.tmp", file_name));

    fs::write(&staging, content)?;
    if let Err(e) = fs::rename(&staging, path) {
        let _ = fs::remove_file(&staging);
        return Err(e.into());
    }
    Ok(())
}

/// Best-effort removal of a directory that no longer holds anything
fn remove_if_empty(dir: &Path) {
    match fs::read_dir(dir) {
        Ok(mut entries) => {
            if entries.next().is_some() {
                return;
            }
            match fs::remove_dir(dir) {
                Ok(()) => tracing::info!("Removed empty directory {:?}", dir),
                Err(e) => tracing::warn!("Failed to remove empty directory {:?}: {}", dir, e),
            }
        }
        Err(e) => tracing::warn!("Failed to inspect directory {:?}: {}", dir, e),
    }
}
