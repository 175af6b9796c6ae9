//! Image helpers: static path resolution, loading and recompression

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::DynamicImage;
use std::fs;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Longest side of a compressed image, in pixels
pub const MAX_DIMENSION: u32 = 1920;

/// JPEG quality used when recompressing
pub const JPEG_QUALITY: u8 = 85;

/// Map a site-root-relative path (`/images/a.png`) into `site_root/static`
pub fn static_path(site_root: &Path, path: &str) -> PathBuf {
    site_root.join("static").join(path.trim_start_matches('/'))
}

/// Read an image referenced from a post.
///
/// Root-relative paths need a site root; absolute filesystem paths are read
/// directly.
pub fn load_image(path: &str, site_root: Option<&Path>) -> Result<Vec<u8>> {
    if let Some(root) = site_root.filter(|_| path.starts_with('/')) {
        return Ok(fs::read(static_path(root, path))?);
    }

    if Path::new(path).is_absolute() {
        return Ok(fs::read(path)?);
    }

    Err(Error::InvalidImagePath(format!(
        "{} (relative path or site root not set)",
        path
    )))
}

/// Shrink an image to fit within 1920px and store it as a quality-85 JPEG
pub fn compress_image(src: &Path, dst: &Path) -> Result<()> {
    let img = image::open(src)?;
    write_compressed(img, dst)
}

/// Decode a base64 upload and store it compressed at `dst`
pub fn save_uploaded_image(base64_data: &str, dst: &Path) -> Result<()> {
    let bytes = BASE64.decode(base64_data.trim())?;
    let img = image::load_from_memory(&bytes)?;
    write_compressed(img, dst)
}

fn write_compressed(img: DynamicImage, dst: &Path) -> Result<()> {
    let img = fit(img);

    if let Some(parent) = dst.parent() {
        fs::create_dir_all(parent)?;
    }

    let file = fs::File::create(dst)?;
    let encoder = JpegEncoder::new_with_quality(BufWriter::new(file), JPEG_QUALITY);
    img.to_rgb8().write_with_encoder(encoder)?;

    tracing::debug!("Wrote compressed image {:?}", dst);
    Ok(())
}

/// Scale down to fit the bounding box, never up
fn fit(img: DynamicImage) -> DynamicImage {
    if img.width() <= MAX_DIMENSION && img.height() <= MAX_DIMENSION {
        return img;
    }
    img.resize(MAX_DIMENSION, MAX_DIMENSION, FilterType::Lanczos3)
}
