use anyhow::{Context, Result};
use image::DynamicImage;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use time::format_description::well_known::Rfc3339;
use walkdir::WalkDir;

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "tif", "tiff", "webp"];

pub fn ensure_dir(p: &Path) -> Result<()> {
    std::fs::create_dir_all(p).with_context(|| format!("create_dir_all {}", p.display()))
}

pub fn now_rfc3339() -> String {
    time::OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_string())
}

/// Digest of an image's geometry, pixel format and pixel bytes.
pub fn image_signature(image: &DynamicImage) -> String {
    let mut h = Sha256::new();
    h.update(image.width().to_le_bytes());
    h.update(image.height().to_le_bytes());
    h.update(format!("{:?}", image.color()).as_bytes());
    h.update(image.as_bytes());
    format!("{:x}", h.finalize())
}

pub fn is_image_path(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Expand files and directories into a sorted, de-duplicated image list.
pub fn collect_images(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    for input in inputs {
        if input.is_dir() {
            for entry in WalkDir::new(input).follow_links(true) {
                let entry = entry.with_context(|| format!("walking {}", input.display()))?;
                if entry.file_type().is_file() && is_image_path(entry.path()) {
                    out.push(entry.into_path());
                }
            }
        } else if input.exists() {
            out.push(input.clone());
        } else {
            anyhow::bail!("input does not exist: {}", input.display());
        }
    }
    out.sort();
    out.dedup();
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_tracks_pixels_and_size() {
        let a = DynamicImage::new_luma8(4, 2);
        let b = DynamicImage::new_luma8(2, 4);
        let mut c = a.to_luma8();
        c.put_pixel(0, 0, image::Luma([9]));
        let c = DynamicImage::ImageLuma8(c);

        assert_eq!(image_signature(&a), image_signature(&a.clone()));
        assert_ne!(image_signature(&a), image_signature(&b));
        assert_ne!(image_signature(&a), image_signature(&c));
    }

    #[test]
    fn image_extension_filter() {
        assert!(is_image_path(Path::new("scan.TIF")));
        assert!(!is_image_path(Path::new("notes.txt")));
        assert!(!is_image_path(Path::new("noext")));
    }
}
