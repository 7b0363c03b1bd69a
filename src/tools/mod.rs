use crate::models::FrameBuffer;
use image::{DynamicImage, GenericImageView};
use std::fs;
use std::path::{Path, PathBuf};

const IMAGE_EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "gif", "bmp", "webp"];

/// Draw a decoded image into a new RGBA frame at its natural size
///
/// With `max_dim`, images whose longest side exceeds it are downscaled first.
pub fn frame_from_image(img: DynamicImage, max_dim: Option<u32>) -> FrameBuffer {
    let img = match max_dim {
        Some(max_dim) if max_dim > 0 => {
            let (orig_w, orig_h) = img.dimensions();
            if orig_w.max(orig_h) > max_dim {
                img.resize(max_dim, max_dim, image::imageops::FilterType::Triangle)
            } else {
                img
            }
        }
        _ => img,
    };
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    FrameBuffer::from_rgba(width, height, rgba.into_raw())
        .unwrap_or_else(|| FrameBuffer::new(width, height))
}

/// Decode in-memory image bytes (any format `image` recognizes) into a frame
pub fn frame_from_image_bytes(
    bytes: &[u8],
    max_dim: Option<u32>,
) -> Result<FrameBuffer, image::ImageError> {
    let img = image::load_from_memory(bytes)?;
    Ok(frame_from_image(img, max_dim))
}

/// Load an image file as an RGBA frame
pub fn load_rgba<P: AsRef<Path>>(
    path: P,
    max_dim: Option<u32>,
) -> Result<FrameBuffer, image::ImageError> {
    let img = image::open(path)?;
    Ok(frame_from_image(img, max_dim))
}

/// Save a frame as an image; the format follows the file extension
pub fn save_rgba<P: AsRef<Path>>(frame: &FrameBuffer, path: P) -> Result<(), image::ImageError> {
    image::save_buffer(
        path,
        frame.data(),
        frame.width(),
        frame.height(),
        image::ColorType::Rgba8,
    )
}

/// True when the path has an image extension we scan
pub fn is_image_path(path: &Path) -> bool {
    path.extension()
        .map(|ext| {
            let ext = ext.to_string_lossy().to_lowercase();
            IMAGE_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

/// Recursively collect image files under `root` (unordered)
pub fn collect_images(root: &Path) -> Vec<PathBuf> {
    let mut stack = vec![root.to_path_buf()];
    let mut images = Vec::new();

    while let Some(dir) = stack.pop() {
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(_) => continue,
        };

        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                stack.push(path);
            } else if is_image_path(&path) {
                images.push(path);
            }
        }
    }

    images
}

/// Sorted image paths under `root`, optionally truncated to `limit`
pub fn dataset_iter<P: AsRef<Path>>(root: P, limit: Option<usize>) -> impl Iterator<Item = PathBuf> {
    let mut images = collect_images(root.as_ref());
    images.sort();
    if let Some(limit) = limit {
        images.truncate(limit);
    }
    images.into_iter()
}
