//! Product write orchestration.
//!
//! Creates, updates and deletes a product together with its variants while
//! keeping the media store in step. The database and the media store cannot
//! share a transaction, so every write runs as a [`Saga`]: checks first, then
//! uploads and row writes each paired with a compensation, and image deletions
//! that only tidy up deferred until the rows are committed.

use chrono::Utc;

use crate::domain::product::{ImageUpload, NewProduct, Product, ProductDraft, Variant};
use crate::domain::types::{CategoryId, ProductId};
use crate::media::{MediaStore, MediaTarget};
use crate::repository::{CategoryReader, ProductReader, ProductWriter, RepositoryError};
use crate::services::observer::{WriteObserver, WriteOperation, WriteStep};
use crate::services::saga::{Compensation, Saga};
use crate::services::variants::plan_variants;
use crate::services::{ServiceError, ServiceResult};

/// Maps a repository failure on the write path to the caller-facing error.
fn store_error(err: RepositoryError) -> ServiceError {
    match err {
        RepositoryError::NotFound => ServiceError::NotFound,
        RepositoryError::Conflict(msg) => ServiceError::Conflict(msg),
        // The only foreign key a product write can trip is its category.
        RepositoryError::ForeignKey(_) => ServiceError::NotFound,
        other => ServiceError::Transaction(other.to_string()),
    }
}

fn ensure_category<R>(repo: &R, category_id: Option<CategoryId>) -> ServiceResult<()>
where
    R: CategoryReader + ?Sized,
{
    let Some(category_id) = category_id else {
        return Ok(());
    };
    match repo.get_category_by_id(category_id).map_err(store_error)? {
        Some(_) => Ok(()),
        None => Err(ServiceError::NotFound),
    }
}

fn assemble(id: ProductId, row: NewProduct, previous: &Product, variants: Vec<Variant>) -> Product {
    Product {
        id,
        code: row.code,
        title: row.title,
        description: row.description,
        base_price: row.base_price,
        is_sold: row.is_sold,
        category_id: row.category_id,
        main_image: row.main_image,
        created_at: previous.created_at,
        updated_at: Utc::now().naive_utc(),
        variants,
    }
}

/// Creates a product and its variants.
///
/// Empty variant colors, an unknown category and a taken code are rejected
/// before anything is uploaded or written. Any later failure removes what
/// this call already stored: uploaded images and the product row.
pub fn create_product<R, M, O>(
    mut draft: ProductDraft,
    main_image: Option<ImageUpload>,
    repo: &R,
    media: &M,
    observer: &O,
) -> ServiceResult<Product>
where
    R: ProductReader + ProductWriter + CategoryReader + ?Sized,
    M: MediaStore + ?Sized,
    O: WriteObserver + ?Sized,
{
    if draft.variants.iter().any(|v| v.color.trim().is_empty()) {
        return Err(ServiceError::Validation(
            "variant color cannot be empty".to_string(),
        ));
    }
    ensure_category(repo, draft.category_id)?;
    if repo.get_product_by_code(&draft.code).map_err(store_error)?.is_some() {
        return Err(ServiceError::Conflict(format!(
            "product code {} already exists",
            draft.code
        )));
    }

    let now = Utc::now();
    let plan = plan_variants(&[], std::mem::take(&mut draft.variants));
    let mut saga = Saga::new(WriteOperation::Create, repo, media, observer);

    let main = match &main_image {
        Some(upload) => {
            match saga.upload(&upload.bytes, &MediaTarget::main_image(&draft.code, now)) {
                Ok(image) => Some(image),
                Err(e) => return Err(saga.abort(WriteStep::UploadMainImage, e)),
            }
        }
        None => None,
    };

    let product = match repo.create_product(&draft.to_new_product(main)) {
        Ok(product) => product,
        Err(e) => return Err(saga.abort(WriteStep::InsertProduct, store_error(e))),
    };
    saga.record(Compensation::DeleteProduct(product.id));

    let orphaned = plan.orphaned.clone();
    let rows = plan.into_rows(|color, upload| {
        saga.upload(
            &upload.bytes,
            &MediaTarget::variant_image(&draft.code, color, now),
        )
    });
    let rows = match rows {
        Ok(rows) => rows,
        Err(e) => return Err(saga.abort(WriteStep::UploadVariantImage, e)),
    };

    let variants = match repo.replace_variants(product.id, &rows) {
        Ok(variants) => variants,
        Err(e) => return Err(saga.abort(WriteStep::ReplaceVariants, store_error(e))),
    };

    saga.complete(product.id, orphaned);
    Ok(Product {
        variants,
        ..product
    })
}

/// Replaces a product's fields and its whole variant set.
///
/// Entries with an empty color are dropped. A resubmitted color without a new
/// upload keeps its stored image. Images that end up unreferenced (the old
/// main image when replaced, images of removed or re-uploaded colors) are
/// deleted only after the variants are committed; a failure before that
/// restores the previous product row and removes this call's uploads.
pub fn update_product<R, M, O>(
    id: ProductId,
    mut draft: ProductDraft,
    main_image: Option<ImageUpload>,
    repo: &R,
    media: &M,
    observer: &O,
) -> ServiceResult<Product>
where
    R: ProductReader + ProductWriter + CategoryReader + ?Sized,
    M: MediaStore + ?Sized,
    O: WriteObserver + ?Sized,
{
    let existing = repo
        .get_product_by_id(id)
        .map_err(store_error)?
        .ok_or(ServiceError::NotFound)?;

    ensure_category(repo, draft.category_id)?;
    if draft.code != existing.code {
        if let Some(other) = repo.get_product_by_code(&draft.code).map_err(store_error)? {
            if other.id != id {
                return Err(ServiceError::Conflict(format!(
                    "product code {} already exists",
                    draft.code
                )));
            }
        }
    }

    let now = Utc::now();
    let plan = plan_variants(&existing.variants, std::mem::take(&mut draft.variants));
    let mut saga = Saga::new(WriteOperation::Update, repo, media, observer);
    let mut cleanup = Vec::new();

    let main = match &main_image {
        Some(upload) => {
            match saga.upload(&upload.bytes, &MediaTarget::main_image(&draft.code, now)) {
                Ok(image) => {
                    cleanup.extend(existing.main_image.iter().map(|old| old.handle.clone()));
                    Some(image)
                }
                Err(e) => return Err(saga.abort(WriteStep::UploadMainImage, e)),
            }
        }
        None => existing.main_image.clone(),
    };

    let row = draft.to_new_product(main);
    match repo.update_product(id, &row) {
        Ok(0) => return Err(saga.abort(WriteStep::UpdateProduct, ServiceError::NotFound)),
        Ok(_) => {}
        Err(e) => return Err(saga.abort(WriteStep::UpdateProduct, store_error(e))),
    }
    saga.record(Compensation::RestoreProduct {
        id,
        previous: Box::new(NewProduct::from(&existing)),
    });

    cleanup.extend(plan.orphaned.iter().cloned());
    let rows = plan.into_rows(|color, upload| {
        saga.upload(
            &upload.bytes,
            &MediaTarget::variant_image(&draft.code, color, now),
        )
    });
    let rows = match rows {
        Ok(rows) => rows,
        Err(e) => return Err(saga.abort(WriteStep::UploadVariantImage, e)),
    };

    let variants = match repo.replace_variants(id, &rows) {
        Ok(variants) => variants,
        Err(e) => return Err(saga.abort(WriteStep::ReplaceVariants, store_error(e))),
    };

    saga.complete(id, cleanup);
    Ok(assemble(id, row, &existing, variants))
}

/// Deletes a product; its variants cascade. Image deletion afterwards is
/// best effort and never fails the call.
pub fn delete_product<R, M, O>(
    id: ProductId,
    repo: &R,
    media: &M,
    observer: &O,
) -> ServiceResult<()>
where
    R: ProductReader + ProductWriter + ?Sized,
    M: MediaStore + ?Sized,
    O: WriteObserver + ?Sized,
{
    let existing = repo
        .get_product_by_id(id)
        .map_err(store_error)?
        .ok_or(ServiceError::NotFound)?;

    let saga = Saga::new(WriteOperation::Delete, repo, media, observer);
    match repo.delete_product(id) {
        Ok(0) => return Err(saga.abort(WriteStep::DeleteProduct, ServiceError::NotFound)),
        Ok(_) => {}
        Err(e) => return Err(saga.abort(WriteStep::DeleteProduct, store_error(e))),
    }

    let images = existing.images().map(|image| image.handle.clone()).collect();
    saga.complete(id, images);
    Ok(())
}
