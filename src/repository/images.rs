//! Image references inside post bodies and their cleanup

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Where referenced images live on disk
#[derive(Debug, Clone, Copy)]
pub struct ImageLocations<'a> {
    /// Directory that backs the upload prefix
    pub image_dir: Option<&'a Path>,
    /// Site root; root-relative paths resolve into its `static` directory
    pub site_root: Option<&'a Path>,
    /// URL prefix of uploaded images, e.g. `/images/uploads/`
    pub upload_prefix: &'a str,
}

/// Collect the targets of `![alt](target)` references, line by line
pub fn extract_image_refs(body: &str) -> Vec<String> {
    let mut refs = Vec::new();

    for line in body.lines() {
        let mut rest = line;
        while let Some(pos) = rest.find("![") {
            rest = &rest[pos + 2..];
            let Some(open) = rest.find('(') else {
                break;
            };
            let Some(close) = rest[open..].find(')') else {
                break;
            };

            let target = rest[open + 1..open + close]
                .trim()
                .trim_matches(|c| c == '"' || c == '\'');
            if !target.is_empty() {
                refs.push(target.to_string());
            }
            rest = &rest[open + close + 1..];
        }
    }

    refs
}

impl ImageLocations<'_> {
    /// Map a reference to a file on disk, if it points at one we manage
    pub fn resolve(&self, target: &str) -> Option<PathBuf> {
        if let Some(rest) = target.strip_prefix(self.upload_prefix) {
            let file_name = Path::new(rest).file_name()?;
            return self.image_dir.map(|dir| dir.join(file_name));
        }

        if target.contains("://") || target.starts_with("data:") {
            return None;
        }

        if target.starts_with('/') {
            return self
                .site_root
                .map(|root| crate::media::static_path(root, target));
        }

        self.site_root
            .or(self.image_dir)
            .map(|base| base.join(target))
    }

    /// Best-effort removal of every image `body` references
    pub fn remove_referenced(&self, body: &str) -> Vec<PathBuf> {
        let mut removed = Vec::new();

        for target in extract_image_refs(body) {
            let Some(path) = self.resolve(&target) else {
                tracing::debug!("Leaving unmanaged image reference {}", target);
                continue;
            };

            match fs::remove_file(&path) {
                Ok(()) => {
                    tracing::info!("Deleted image {:?}", path);
                    removed.push(path);
                }
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    tracing::debug!("Image {:?} already gone", path);
                }
                Err(e) => tracing::warn!("Failed to delete image {:?}: {}", path, e),
            }
        }

        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_image_refs() {
        let body = r#"Intro (not an image)
![](/images/uploads/cat.png)
![a dog]( "/images/uploads/dog.jpg" ) and ![second](img/two.png)
[a link](https://example.com)
![broken](
"#;
        assert_eq!(
            extract_image_refs(body),
            vec![
                "/images/uploads/cat.png",
                "/images/uploads/dog.jpg",
                "img/two.png"
            ]
        );
    }

    #[test]
    fn test_resolve() {
        let locations = ImageLocations {
            image_dir: Some(Path::new("/blog/static/images/uploads")),
            site_root: Some(Path::new("/blog")),
            upload_prefix: "/images/uploads/",
        };

        assert_eq!(
            locations.resolve("/images/uploads/cat.png"),
            Some(PathBuf::from("/blog/static/images/uploads/cat.png"))
        );
        assert_eq!(
            locations.resolve("/img/other.png"),
            Some(PathBuf::from("/blog/static/img/other.png"))
        );
        assert_eq!(
            locations.resolve("relative/pic.png"),
            Some(PathBuf::from("/blog/relative/pic.png"))
        );
        assert_eq!(locations.resolve("https://cdn.example.com/a.png"), None);
        assert_eq!(locations.resolve("data:image/png;base64,AAAA"), None);
    }

    #[test]
    fn test_resolve_without_locations() {
        let locations = ImageLocations {
            image_dir: None,
            site_root: None,
            upload_prefix: "/images/uploads/",
        };
        assert_eq!(locations.resolve("/images/uploads/cat.png"), None);
        assert_eq!(locations.resolve("/img/a.png"), None);
        assert_eq!(locations.resolve("a.png"), None);
    }

    #[test]
    fn test_remove_referenced() {
        let dir = tempfile::tempdir().unwrap();
        let uploads = dir.path().join("uploads");
        fs::create_dir_all(&uploads).unwrap();
        fs::write(uploads.join("cat.png"), b"cat").unwrap();
        fs::write(uploads.join("keep.png"), b"keep").unwrap();

        let locations = ImageLocations {
            image_dir: Some(&uploads),
            site_root: None,
            upload_prefix: "/images/uploads/",
        };
        let removed = locations
            .remove_referenced("![](/images/uploads/cat.png)\n![](/images/uploads/missing.png)");

        assert_eq!(removed, vec![uploads.join("cat.png")]);
        assert!(!uploads.join("cat.png").exists());
        assert!(uploads.join("keep.png").exists());
    }
}
