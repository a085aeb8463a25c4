//! Firmware image payload.

use bytes::Bytes;

/// Firmware image handed to each update candidate.
///
/// The payload is reference counted, so every fallback candidate reads the
/// full image from the start regardless of what earlier candidates consumed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirmwareImage {
    data: Bytes,
}

impl FirmwareImage {
    /// Wraps an in-memory image.
    #[must_use]
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self { data: data.into() }
    }

    /// Reads an image from disk.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error when the file cannot be read.
    pub async fn from_path(path: impl AsRef<std::path::Path>) -> std::io::Result<Self> {
        let data = tokio::fs::read(path).await?;
        Ok(Self::new(data))
    }

    /// Returns the image size in bytes.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    /// Returns a cheap handle to the image bytes.
    #[must_use]
    pub fn bytes(&self) -> Bytes {
        self.data.clone()
    }
}
