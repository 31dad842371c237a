//! Filesystem-backed media store.

use std::fs;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use rand::Rng;

use crate::domain::image::ImageRef;
use crate::domain::types::{ImageHandle, ImageUrl};
use crate::media::{MediaStore, MediaStoreError, MediaTarget, validate_image};
use crate::models::config::MediaConfig;

/// Stores images under `root_dir/{folder}/` and serves them from
/// `public_base_url/{folder}/`. The handle is the path relative to the root.
#[derive(Debug, Clone)]
pub struct LocalMediaStore {
    root_dir: PathBuf,
    public_base_url: String,
    max_upload_bytes: usize,
}

impl LocalMediaStore {
    pub fn new(root_dir: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            root_dir: root_dir.into(),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
            max_upload_bytes: super::MAX_UPLOAD_BYTES,
        }
    }

    pub fn from_config(config: &MediaConfig) -> Self {
        Self {
            max_upload_bytes: config.max_upload_bytes,
            ..Self::new(config.root_dir.clone(), config.public_base_url.clone())
        }
    }

    /// Resolves a handle inside the root, refusing anything that could escape it.
    fn resolve(&self, handle: &ImageHandle) -> Result<PathBuf, MediaStoreError> {
        let relative = Path::new(handle.as_str());
        let contained = relative
            .components()
            .all(|component| matches!(component, Component::Normal(_)));
        if !contained {
            return Err(MediaStoreError::Unavailable(format!(
                "refusing handle outside the media root: {handle}"
            )));
        }
        Ok(self.root_dir.join(relative))
    }
}

impl MediaStore for LocalMediaStore {
    fn upload(&self, bytes: &[u8], target: &MediaTarget) -> Result<ImageRef, MediaStoreError> {
        let kind = validate_image(bytes, self.max_upload_bytes)?;

        let suffix: u32 = rand::thread_rng().r#gen();
        let file_name = format!(
            "{}-{suffix:08x}.{}",
            target.sanitized_name(),
            kind.extension()
        );
        let relative = format!("{}/{}", target.folder, file_name);

        // Nothing touches the disk until the reference is known to be valid.
        let url = ImageUrl::new(format!("{}/{}", self.public_base_url, relative))
            .map_err(|e| MediaStoreError::Unavailable(e.to_string()))?;
        let handle =
            ImageHandle::new(relative).map_err(|e| MediaStoreError::Unavailable(e.to_string()))?;

        let dir = self.root_dir.join(target.folder.as_str());
        fs::create_dir_all(&dir).map_err(|e| MediaStoreError::Unavailable(e.to_string()))?;
        fs::write(dir.join(&file_name), bytes)
            .map_err(|e| MediaStoreError::Unavailable(e.to_string()))?;

        log::info!("Stored image {} ({} bytes)", handle, bytes.len());
        Ok(ImageRef::new(url, handle))
    }

    fn delete(&self, handle: &ImageHandle) -> Result<(), MediaStoreError> {
        let path = self.resolve(handle)?;
        match fs::remove_file(&path) {
            Ok(()) => {
                log::debug!("Deleted image {handle}");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(MediaStoreError::Unavailable(e.to_string())),
        }
    }
}
