//! Media store adapter contract.
//!
//! Images live outside the relational store: an upload returns a durable URL
//! plus an opaque handle, and the handle is all that is needed to delete it.
//! Nothing here is transactional, callers compensate by deleting.

use std::fmt::{Display, Formatter};

use chrono::{DateTime, Utc};
use image::ImageFormat;
use thiserror::Error;

use crate::domain::image::ImageRef;
use crate::domain::types::{ImageHandle, ProductCode, VariantColor};

pub mod local;
pub mod memory;

pub use local::LocalMediaStore;
pub use memory::MemoryMediaStore;

/// Upload size cap (5 MiB).
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MediaStoreError {
    /// The bytes are not one of the accepted image types.
    #[error("invalid image content: {0}")]
    InvalidContent(String),
    #[error("image is {size} bytes, the limit is {max}")]
    SizeExceeded { size: usize, max: usize },
    /// Transport or storage failure.
    #[error("media store unavailable: {0}")]
    Unavailable(String),
}

/// Image types accepted for upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Jpeg,
    Png,
    WebP,
}

impl ImageKind {
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::WebP => "webp",
        }
    }
}

/// Checks size and sniffs the content type from the bytes themselves.
pub fn validate_image(bytes: &[u8], max_bytes: usize) -> Result<ImageKind, MediaStoreError> {
    if bytes.is_empty() {
        return Err(MediaStoreError::InvalidContent("empty upload".to_string()));
    }
    if bytes.len() > max_bytes {
        return Err(MediaStoreError::SizeExceeded {
            size: bytes.len(),
            max: max_bytes,
        });
    }

    match image::guess_format(bytes) {
        Ok(ImageFormat::Jpeg) => Ok(ImageKind::Jpeg),
        Ok(ImageFormat::Png) => Ok(ImageKind::Png),
        Ok(ImageFormat::WebP) => Ok(ImageKind::WebP),
        Ok(other) => Err(MediaStoreError::InvalidContent(format!(
            "unsupported image type {other:?}, expected jpeg, png or webp"
        ))),
        Err(e) => Err(MediaStoreError::InvalidContent(e.to_string())),
    }
}

/// Top-level grouping of stored images.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaFolder {
    Products,
    Variants,
}

impl MediaFolder {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Products => "products",
            Self::Variants => "variants",
        }
    }
}

impl Display for MediaFolder {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where an upload should land. Adapters sanitize `name` and make it unique.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaTarget {
    pub folder: MediaFolder,
    pub name: String,
}

impl MediaTarget {
    /// `products/{code}-{unix_seconds}`
    pub fn main_image(code: &ProductCode, at: DateTime<Utc>) -> Self {
        Self {
            folder: MediaFolder::Products,
            name: format!("{}-{}", code, at.timestamp()),
        }
    }

    /// `variants/{code}-{color}-{unix_seconds}`
    pub fn variant_image(code: &ProductCode, color: &VariantColor, at: DateTime<Utc>) -> Self {
        Self {
            folder: MediaFolder::Variants,
            name: format!("{}-{}-{}", code, color, at.timestamp()),
        }
    }

    /// `name` reduced to `[A-Za-z0-9_-]`, other characters replaced by `-`.
    pub fn sanitized_name(&self) -> String {
        let name: String = self
            .name
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '-'
                }
            })
            .collect();
        if name.is_empty() {
            "image".to_string()
        } else {
            name
        }
    }
}

/// External image storage.
pub trait MediaStore {
    /// Validates and stores `bytes`, returning where it can be fetched and how
    /// to delete it.
    fn upload(&self, bytes: &[u8], target: &MediaTarget) -> Result<ImageRef, MediaStoreError>;
    /// Removes an image. Unknown handles are not an error.
    fn delete(&self, handle: &ImageHandle) -> Result<(), MediaStoreError>;
}

impl<T: MediaStore + ?Sized> MediaStore for &T {
    fn upload(&self, bytes: &[u8], target: &MediaTarget) -> Result<ImageRef, MediaStoreError> {
        (**self).upload(bytes, target)
    }

    fn delete(&self, handle: &ImageHandle) -> Result<(), MediaStoreError> {
        (**self).delete(handle)
    }
}

#[cfg(test)]
pub(crate) mod samples {
    /// Smallest byte strings `image::guess_format` recognises.
    pub const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";
    pub const JPEG: &[u8] = b"\xFF\xD8\xFF\xE0\0\x10JFIF\0";
    pub const WEBP: &[u8] = b"RIFF\x24\0\0\0WEBPVP8 ";
    pub const GIF: &[u8] = b"GIF89a\x01\0\x01\0";
}
