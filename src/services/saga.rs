//! Compensation log for writes spanning the database and the media store.
//!
//! Each forward step that leaves something behind registers the action that
//! undoes it. If a later step fails the actions run newest first; once the
//! write commits they are discarded and only post-commit image cleanup runs.
//! Failures of either kind are reported to the observer and never surfaced.

use std::fmt::{Display, Formatter};

use crate::domain::image::ImageRef;
use crate::domain::product::NewProduct;
use crate::domain::types::{ImageHandle, ProductId};
use crate::media::{MediaStore, MediaTarget};
use crate::repository::ProductWriter;
use crate::services::ServiceError;
use crate::services::observer::{WriteEvent, WriteObserver, WriteOperation, WriteStep};

#[derive(Debug, Clone, PartialEq)]
pub enum Compensation {
    /// Remove an image uploaded by this write.
    DeleteImage(ImageHandle),
    /// Remove a product row inserted by this write; variants cascade.
    DeleteProduct(ProductId),
    /// Put back the row contents a product had before this write.
    RestoreProduct {
        id: ProductId,
        previous: Box<NewProduct>,
    },
}

impl Display for Compensation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DeleteImage(handle) => write!(f, "delete image {handle}"),
            Self::DeleteProduct(id) => write!(f, "delete product {id}"),
            Self::RestoreProduct { id, .. } => write!(f, "restore product {id}"),
        }
    }
}

pub struct Saga<'a, R: ?Sized, M: ?Sized, O: ?Sized> {
    operation: WriteOperation,
    repo: &'a R,
    media: &'a M,
    observer: &'a O,
    compensations: Vec<Compensation>,
}

impl<'a, R, M, O> Saga<'a, R, M, O>
where
    R: ProductWriter + ?Sized,
    M: MediaStore + ?Sized,
    O: WriteObserver + ?Sized,
{
    pub fn new(operation: WriteOperation, repo: &'a R, media: &'a M, observer: &'a O) -> Self {
        Self {
            operation,
            repo,
            media,
            observer,
            compensations: Vec::new(),
        }
    }

    pub fn record(&mut self, compensation: Compensation) {
        self.compensations.push(compensation);
    }

    /// Uploads an image and registers its deletion.
    pub fn upload(&mut self, bytes: &[u8], target: &MediaTarget) -> Result<ImageRef, ServiceError> {
        let image = self.media.upload(bytes, target)?;
        self.record(Compensation::DeleteImage(image.handle.clone()));
        Ok(image)
    }

    /// Reports the failed step, runs every compensation newest first and
    /// hands back `error` for the caller to return.
    pub fn abort(mut self, step: WriteStep, error: ServiceError) -> ServiceError {
        self.observer.record(WriteEvent::StepFailed {
            operation: self.operation,
            step,
            error: error.to_string(),
        });

        while let Some(compensation) = self.compensations.pop() {
            if let Err(e) = self.compensate(&compensation) {
                self.observer.record(WriteEvent::CompensationFailed {
                    operation: self.operation,
                    compensation,
                    error: e,
                });
            }
        }

        error
    }

    fn compensate(&self, compensation: &Compensation) -> Result<(), String> {
        match compensation {
            Compensation::DeleteImage(handle) => {
                self.media.delete(handle).map_err(|e| e.to_string())
            }
            Compensation::DeleteProduct(id) => self
                .repo
                .delete_product(*id)
                .map(|_| ())
                .map_err(|e| e.to_string()),
            Compensation::RestoreProduct { id, previous } => match self.repo.update_product(*id, previous) {
                Ok(0) => Err(format!("product {id} no longer exists")),
                Ok(_) => Ok(()),
                Err(e) => Err(e.to_string()),
            },
        }
    }

    /// Marks the write as committed, then best-effort deletes images the
    /// committed state no longer references.
    pub fn complete(self, product_id: ProductId, cleanup: Vec<ImageHandle>) {
        self.observer.record(WriteEvent::Committed {
            operation: self.operation,
            product_id,
        });

        for handle in cleanup {
            if let Err(e) = self.media.delete(&handle) {
                self.observer.record(WriteEvent::ImageLeaked {
                    operation: self.operation,
                    handle,
                    error: e.to_string(),
                });
            }
        }
    }
}
