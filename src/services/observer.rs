//! Reporting hook for product writes.
//!
//! The write orchestrator never logs on its own; everything an operator may
//! need to see (failed steps, failed compensations, leaked images) goes
//! through a [`WriteObserver`] handed in by the caller.

use std::fmt::{Display, Formatter};
use std::sync::{Mutex, PoisonError};

use crate::domain::types::{ImageHandle, ProductId};
use crate::services::saga::Compensation;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOperation {
    Create,
    Update,
    Delete,
}

impl Display for WriteOperation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        })
    }
}

/// Forward step of a write that can fail after side effects began.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteStep {
    UploadMainImage,
    UploadVariantImage,
    InsertProduct,
    UpdateProduct,
    ReplaceVariants,
    DeleteProduct,
}

impl Display for WriteStep {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::UploadMainImage => "upload main image",
            Self::UploadVariantImage => "upload variant image",
            Self::InsertProduct => "insert product",
            Self::UpdateProduct => "update product",
            Self::ReplaceVariants => "replace variants",
            Self::DeleteProduct => "delete product",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum WriteEvent {
    /// A forward step failed; compensation follows.
    StepFailed {
        operation: WriteOperation,
        step: WriteStep,
        error: String,
    },
    /// A compensating action itself failed. For images this is a leak.
    CompensationFailed {
        operation: WriteOperation,
        compensation: Compensation,
        error: String,
    },
    /// Post-commit cleanup could not delete an image that is no longer referenced.
    ImageLeaked {
        operation: WriteOperation,
        handle: ImageHandle,
        error: String,
    },
    Committed {
        operation: WriteOperation,
        product_id: ProductId,
    },
}

pub trait WriteObserver {
    fn record(&self, event: WriteEvent);
}

impl<T: WriteObserver + ?Sized> WriteObserver for &T {
    fn record(&self, event: WriteEvent) {
        (**self).record(event)
    }
}

/// Forwards write events to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl WriteObserver for LogObserver {
    fn record(&self, event: WriteEvent) {
        match event {
            WriteEvent::StepFailed {
                operation,
                step,
                error,
            } => log::error!("Product {operation} failed at {step}: {error}"),
            WriteEvent::CompensationFailed {
                operation,
                compensation,
                error,
            } => log::error!("Product {operation}: compensation {compensation} failed: {error}"),
            WriteEvent::ImageLeaked {
                operation,
                handle,
                error,
            } => log::warn!("Product {operation}: orphaned image {handle} not deleted: {error}"),
            WriteEvent::Committed {
                operation,
                product_id,
            } => log::info!("Product {product_id} {operation} committed"),
        }
    }
}

/// Keeps every event in memory, for tests and diagnostics.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<WriteEvent>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<WriteEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Handles reported as leaked, whether by a failed compensation or cleanup.
    pub fn leaked_images(&self) -> Vec<ImageHandle> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                WriteEvent::ImageLeaked { handle, .. } => Some(handle),
                WriteEvent::CompensationFailed {
                    compensation: Compensation::DeleteImage(handle),
                    ..
                } => Some(handle),
                _ => None,
            })
            .collect()
    }
}

impl WriteObserver for RecordingObserver {
    fn record(&self, event: WriteEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}
