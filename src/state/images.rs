//! Loaded image registry entries, as supplied by the image list.

use serde::{Deserialize, Serialize};

/// Supported image extensions
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "tiff", "tif", "webp"];

/// Check if a filename (string) has a supported image extension.
/// Works with both full paths and just filenames.
pub fn is_image_filename(name: &str) -> bool {
    let lower = name.to_lowercase();
    IMAGE_EXTENSIONS
        .iter()
        .any(|ext| lower.ends_with(&format!(".{}", ext)))
}

/// Load progress of an image in the image list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadStatus {
    /// Still decoding
    Loading,
    /// Ready for display
    #[default]
    Loaded,
    /// Decoding failed
    Failed,
}

/// One entry of the loaded image list.
///
/// Control points refer to images by `name`, never by `id`: reloading an
/// image mints a new id but keeps its name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadedImage {
    /// Registry id of this load
    pub id: u64,
    /// Filename of the image
    pub name: String,
    /// Load progress
    #[serde(default)]
    pub status: LoadStatus,
}

impl LoadedImage {
    /// Create an entry for a successfully loaded image.
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            status: LoadStatus::Loaded,
        }
    }

    /// Set the load status.
    pub fn with_status(mut self, status: LoadStatus) -> Self {
        self.status = status;
        self
    }
}

/// Check if `name` is in `images` and has not failed to load.
pub fn has_image(images: &[LoadedImage], name: &str) -> bool {
    images
        .iter()
        .any(|img| img.name == name && img.status != LoadStatus::Failed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_image_filename() {
        assert!(is_image_filename("DJI_0001.JPG"));
        assert!(is_image_filename("dir/ortho.tif"));
        assert!(!is_image_filename("gcp_list.txt"));
    }

    #[test]
    fn test_has_image_matches_by_name() {
        let images = vec![
            LoadedImage::new(1, "a.jpg"),
            LoadedImage::new(2, "b.jpg").with_status(LoadStatus::Loading),
            LoadedImage::new(3, "c.jpg").with_status(LoadStatus::Failed),
        ];
        assert!(has_image(&images, "a.jpg"));
        assert!(has_image(&images, "b.jpg"));
        assert!(!has_image(&images, "c.jpg"));
        assert!(!has_image(&images, "d.jpg"));
    }
}
