//! In-memory media store for tests and local development.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::domain::image::ImageRef;
use crate::domain::types::{ImageHandle, ImageUrl};
use crate::media::{MAX_UPLOAD_BYTES, MediaStore, MediaStoreError, MediaTarget, validate_image};

const BASE_URL: &str = "https://media.test";

#[derive(Debug, Default)]
struct State {
    images: BTreeMap<String, Vec<u8>>,
    uploads: usize,
    deleted: Vec<String>,
    /// Uploads still allowed before failing; `None` means unlimited.
    upload_budget: Option<usize>,
    fail_deletes: bool,
}

/// Keeps uploads in a map. Uploads and deletes can be switched to fail.
#[derive(Debug, Default)]
pub struct MemoryMediaStore {
    state: Mutex<State>,
}

impl MemoryMediaStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Every further upload fails with [`MediaStoreError::Unavailable`].
    pub fn fail_uploads(&self) {
        self.state().upload_budget = Some(0);
    }

    /// The next `count` uploads succeed, later ones fail.
    pub fn fail_uploads_after(&self, count: usize) {
        self.state().upload_budget = Some(count);
    }

    pub fn fail_deletes(&self, fail: bool) {
        self.state().fail_deletes = fail;
    }

    pub fn contains(&self, handle: &ImageHandle) -> bool {
        self.state().images.contains_key(handle.as_str())
    }

    /// Number of images currently stored.
    pub fn len(&self) -> usize {
        self.state().images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of successful uploads so far.
    pub fn upload_count(&self) -> usize {
        self.state().uploads
    }

    /// Handles passed to successful deletes, in call order.
    pub fn deleted(&self) -> Vec<String> {
        self.state().deleted.clone()
    }
}

impl MediaStore for MemoryMediaStore {
    fn upload(&self, bytes: &[u8], target: &MediaTarget) -> Result<ImageRef, MediaStoreError> {
        let kind = validate_image(bytes, MAX_UPLOAD_BYTES)?;

        let mut state = self.state();
        match state.upload_budget {
            Some(0) => {
                return Err(MediaStoreError::Unavailable(
                    "uploads are switched off".to_string(),
                ));
            }
            Some(ref mut remaining) => *remaining -= 1,
            None => {}
        }

        state.uploads += 1;
        let handle = format!(
            "{}/{}-{}.{}",
            target.folder,
            target.sanitized_name(),
            state.uploads,
            kind.extension()
        );
        let url = ImageUrl::new(format!("{BASE_URL}/{handle}"))
            .map_err(|e| MediaStoreError::Unavailable(e.to_string()))?;
        state.images.insert(handle.clone(), bytes.to_vec());

        let handle =
            ImageHandle::new(handle).map_err(|e| MediaStoreError::Unavailable(e.to_string()))?;
        Ok(ImageRef::new(url, handle))
    }

    fn delete(&self, handle: &ImageHandle) -> Result<(), MediaStoreError> {
        let mut state = self.state();
        if state.fail_deletes {
            return Err(MediaStoreError::Unavailable(
                "deletes are switched off".to_string(),
            ));
        }
        state.images.remove(handle.as_str());
        state.deleted.push(handle.as_str().to_string());
        Ok(())
    }
}
