use serde::{Deserialize, Serialize};

use crate::domain::types::{ImageHandle, ImageUrl, TypeConstraintError};

/// A stored image: the URL readers render and the handle used to delete it.
///
/// Entities hold `Option<ImageRef>`, so a URL without a handle (or the
/// reverse) cannot be represented.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ImageRef {
    pub url: ImageUrl,
    pub handle: ImageHandle,
}

impl ImageRef {
    pub fn new(url: ImageUrl, handle: ImageHandle) -> Self {
        Self { url, handle }
    }

    /// Rebuilds an optional reference from two nullable columns.
    pub fn from_parts(
        url: Option<String>,
        handle: Option<String>,
        field: &'static str,
    ) -> Result<Option<Self>, TypeConstraintError> {
        match (url, handle) {
            (None, None) => Ok(None),
            (Some(url), Some(handle)) => Ok(Some(Self {
                url: ImageUrl::new(url)?,
                handle: ImageHandle::new(handle)?,
            })),
            _ => Err(TypeConstraintError::IncompleteImage(field)),
        }
    }

    /// Splits an optional reference back into two nullable columns.
    pub fn into_parts(image: Option<Self>) -> (Option<String>, Option<String>) {
        match image {
            Some(image) => (Some(image.url.into_inner()), Some(image.handle.into_inner())),
            None => (None, None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn half_populated_image_is_rejected() {
        let err = ImageRef::from_parts(Some("https://cdn.test/a.png".into()), None, "main image")
            .unwrap_err();
        assert_eq!(err, TypeConstraintError::IncompleteImage("main image"));

        let err = ImageRef::from_parts(None, Some("products/a".into()), "main image").unwrap_err();
        assert_eq!(err, TypeConstraintError::IncompleteImage("main image"));
    }

    #[test]
    fn empty_and_full_images_are_accepted() {
        assert_eq!(ImageRef::from_parts(None, None, "photo").unwrap(), None);
        let image = ImageRef::from_parts(
            Some("https://cdn.test/a.png".into()),
            Some("variants/a".into()),
            "photo",
        )
        .unwrap()
        .unwrap();
        assert_eq!(image.handle.as_str(), "variants/a");
    }
}
