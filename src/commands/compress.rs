//! Recompress an image for upload

use anyhow::Result;
use std::fs;
use std::path::Path;

use crate::media;

/// Shrink `src` into a JPEG at `dst` and report the size change
pub fn run(src: &Path, dst: &Path) -> Result<()> {
    let before = fs::metadata(src)?.len();
    media::compress_image(src, dst)?;
    let after = fs::metadata(dst)?.len();

    println!(
        "Compressed {:?} -> {:?} ({} KB -> {} KB)",
        src,
        dst,
        before / 1024,
        after / 1024
    );
    Ok(())
}
