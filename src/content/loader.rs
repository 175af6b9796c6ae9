//! Content loader - walks date directories and decodes the posts inside

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

use super::{frontmatter, PostRecord};
use crate::error::Result;

lazy_static! {
    static ref DATE_DIR_RE: Regex = Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap();
}

/// Format of date directory names
pub const DATE_DIR_FORMAT: &str = "%Y-%m-%d";

/// A directory sharding posts by creation date
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateDir {
    /// Directory name (`YYYY-MM-DD`)
    pub name: String,
    pub path: PathBuf,
}

/// Check whether a directory name is a real calendar date (`2024-02-29`, not `2023-02-29`)
pub fn is_date_dir_name(name: &str) -> bool {
    DATE_DIR_RE.is_match(name) && NaiveDate::parse_from_str(name, DATE_DIR_FORMAT).is_ok()
}

/// Valid date directories directly under `root`, in file-name order.
///
/// A missing root yields nothing; a root that cannot be listed is an error.
pub fn date_dirs(root: &Path) -> Result<Vec<DateDir>> {
    let dirs = root_entries(root)?
        .into_iter()
        .filter_map(|entry| as_date_dir(&entry))
        .collect();
    Ok(dirs)
}

/// Paths of every post under `root`.
///
/// Date directories are descended one level; markdown files sitting directly
/// in `root` are included too. An unreadable date directory is skipped.
pub fn post_paths(root: &Path) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();

    for entry in root_entries(root)? {
        if let Some(dir) = as_date_dir(&entry) {
            match markdown_files(&dir.path) {
                Ok(files) => paths.extend(files),
                Err(e) => tracing::warn!("Skipping unreadable directory {:?}: {}", dir.path, e),
            }
        } else if entry.file_type().is_file() && is_markdown_file(entry.path()) {
            paths.push(entry.into_path());
        }
    }

    Ok(paths)
}

/// Markdown files directly inside `dir`
pub fn markdown_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in shallow_walk(dir) {
        let entry = entry?;
        if entry.file_type().is_file() && is_markdown_file(entry.path()) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Check if a file is a markdown post
pub fn is_markdown_file(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some("md")
}

fn root_entries(root: &Path) -> Result<Vec<DirEntry>> {
    if !root.exists() {
        tracing::debug!("Content directory {:?} does not exist", root);
        return Ok(Vec::new());
    }
    // walkdir hides a root it cannot list once min_depth is 1
    fs::read_dir(root)?;

    let mut entries = Vec::new();
    for entry in shallow_walk(root) {
        entries.push(entry?);
    }
    Ok(entries)
}

fn shallow_walk(dir: &Path) -> walkdir::IntoIter {
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
}

fn as_date_dir(entry: &DirEntry) -> Option<DateDir> {
    if !entry.file_type().is_dir() {
        return None;
    }
    let name = entry.file_name().to_str()?;
    is_date_dir_name(name).then(|| DateDir {
        name: name.to_string(),
        path: entry.path().to_path_buf(),
    })
}

/// Loads post records from a content directory
pub struct ContentLoader<'a> {
    content_dir: &'a Path,
}

impl<'a> ContentLoader<'a> {
    pub fn new(content_dir: &'a Path) -> Self {
        Self { content_dir }
    }

    /// Decode every post, in directory enumeration order.
    ///
    /// Cover images are not read; see [`frontmatter::load_cover`].
    pub fn load_records(&self) -> Result<Vec<PostRecord>> {
        let records = post_paths(self.content_dir)?
            .iter()
            .map(|path| frontmatter::decode_file(path, None))
            .collect();
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    #[test]
    fn test_date_dir_names() {
        assert!(is_date_dir_name("2024-01-15"));
        assert!(is_date_dir_name("2024-02-29"));
        assert!(!is_date_dir_name("2023-02-29"));
        assert!(!is_date_dir_name("2024-1-5"));
        assert!(!is_date_dir_name("2024-01-15-draft"));
        assert!(!is_date_dir_name("images"));
    }

    #[test]
    fn test_missing_root_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(date_dirs(&missing).unwrap().is_empty());
        assert!(post_paths(&missing).unwrap().is_empty());
    }

    #[test]
    fn test_unlistable_root_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("posts");
        fs::write(&root, "not a directory").unwrap();

        assert!(matches!(date_dirs(&root), Err(Error::Io(_))));
        assert!(matches!(post_paths(&root), Err(Error::Io(_))));
        assert!(ContentLoader::new(&root).load_records().is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_date_dir_is_skipped() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(&root.join("2024-01-01/locked.md"));
        touch(&root.join("2024-01-02/open.md"));

        let locked = root.join("2024-01-01");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
        // permission bits do not stop a privileged user
        let enforced = fs::read_dir(&locked).is_err();

        let paths = post_paths(root);
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        if enforced {
            assert_eq!(paths.unwrap(), vec![root.join("2024-01-02/open.md")]);
        }
    }

    #[test]
    fn test_post_paths_layout() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(&root.join("2024-01-02/b.md"));
        touch(&root.join("2024-01-02/a.md"));
        touch(&root.join("2024-01-02/notes.txt"));
        touch(&root.join("2024-01-02/nested/deep.md"));
        touch(&root.join("2023-12-31/old.md"));
        touch(&root.join("drafts/hidden.md"));
        touch(&root.join("2024-13-01/invalid.md"));
        touch(&root.join("flat.md"));

        let paths: Vec<_> = post_paths(root)
            .unwrap()
            .into_iter()
            .map(|p| p.strip_prefix(root).unwrap().to_path_buf())
            .collect();

        assert_eq!(
            paths,
            vec![
                PathBuf::from("2023-12-31/old.md"),
                PathBuf::from("2024-01-02/a.md"),
                PathBuf::from("2024-01-02/b.md"),
                PathBuf::from("flat.md"),
            ]
        );

        let names: Vec<_> = date_dirs(root).unwrap().into_iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["2023-12-31", "2024-01-02"]);
    }

    #[test]
    fn test_load_records() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("2024-05-01")).unwrap();
        fs::write(
            root.join("2024-05-01/first.md"),
            "---\ntitle: \"First post\"\ndate: 2024-05-01\n---\n\nHello",
        )
        .unwrap();
        fs::write(root.join("2024-05-01/bare.md"), "no front matter").unwrap();

        let records = ContentLoader::new(root).load_records().unwrap();
        let titles: Vec<_> = records.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["bare", "First post"]);
        assert_eq!(records[1].body, "Hello");
    }
}
