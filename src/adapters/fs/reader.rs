use crate::domain::ports::{Photo, PhotoSource};
use anyhow::{Context, Result};
use std::path::Path;

/// File system photo reader implementation
pub struct FilePhotoReader;

impl FilePhotoReader {
    pub fn new() -> Self {
        Self
    }
}

impl Default for FilePhotoReader {
    fn default() -> Self {
        Self::new()
    }
}

impl PhotoSource for FilePhotoReader {
    fn load(&self, path: &Path) -> Result<Photo> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read photo file: {}", path.display()))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "photo".to_string());
        Ok(Photo {
            file_name,
            mime: mime_for(path),
            bytes,
        })
    }
}

/// MIME type from the file extension; the service only takes JPEG and PNG.
pub fn mime_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        _ => "application/octet-stream",
    }
}
