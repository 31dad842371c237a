use crate::domain::types::{CategoryId, CategorySlug};
use crate::dto::categories::CategoryDto;
use crate::forms::categories::{CategoryFormPayload, DeleteCategoryFormPayload};
use crate::repository::{CategoryReader, CategoryWriter, RepositoryError};

use super::{ServiceError, ServiceResult};

fn write_error(action: &str, err: RepositoryError) -> ServiceError {
    match err {
        RepositoryError::Conflict(msg) => ServiceError::Conflict(msg),
        RepositoryError::NotFound => ServiceError::NotFound,
        RepositoryError::ForeignKey(msg) => ServiceError::Conflict(msg),
        other => {
            log::error!("Failed to {action} category: {other}");
            ServiceError::Internal
        }
    }
}

pub fn list_categories<R>(repo: &R) -> ServiceResult<Vec<CategoryDto>>
where
    R: CategoryReader + ?Sized,
{
    match repo.list_categories() {
        Ok(categories) => Ok(categories.into_iter().map(CategoryDto::from).collect()),
        Err(e) => {
            log::error!("Failed to list categories: {e}");
            Err(ServiceError::Internal)
        }
    }
}

pub fn get_category<R>(category_id: i32, repo: &R) -> ServiceResult<CategoryDto>
where
    R: CategoryReader + ?Sized,
{
    let category_id = CategoryId::new(category_id).map_err(|_| ServiceError::NotFound)?;

    match repo.get_category_by_id(category_id) {
        Ok(Some(category)) => Ok(CategoryDto::from(category)),
        Ok(None) => Err(ServiceError::NotFound),
        Err(e) => {
            log::error!("Failed to get category {category_id}: {e}");
            Err(ServiceError::Internal)
        }
    }
}

pub fn get_category_by_slug<R>(slug: &str, repo: &R) -> ServiceResult<CategoryDto>
where
    R: CategoryReader + ?Sized,
{
    let slug = CategorySlug::new(slug).map_err(|_| ServiceError::NotFound)?;

    match repo.get_category_by_slug(&slug) {
        Ok(Some(category)) => Ok(CategoryDto::from(category)),
        Ok(None) => Err(ServiceError::NotFound),
        Err(e) => {
            log::error!("Failed to get category {slug}: {e}");
            Err(ServiceError::Internal)
        }
    }
}

pub fn create_category<R>(payload: CategoryFormPayload, repo: &R) -> ServiceResult<CategoryDto>
where
    R: CategoryWriter + ?Sized,
{
    let category = payload.into_new_category()?;

    match repo.create_category(&category) {
        Ok(category) => {
            log::info!("Created category {} ({})", category.name, category.slug);
            Ok(CategoryDto::from(category))
        }
        Err(e) => Err(write_error("create", e)),
    }
}

/// Renames a category. The slug only changes when the name does.
pub fn update_category<R>(
    category_id: CategoryId,
    payload: CategoryFormPayload,
    repo: &R,
) -> ServiceResult<CategoryDto>
where
    R: CategoryReader + CategoryWriter + ?Sized,
{
    let existing = match repo.get_category_by_id(category_id) {
        Ok(Some(category)) => category,
        Ok(None) => return Err(ServiceError::NotFound),
        Err(e) => {
            log::error!("Failed to get category {category_id}: {e}");
            return Err(ServiceError::Internal);
        }
    };

    if existing.name == payload.name {
        return Ok(CategoryDto::from(existing));
    }

    let category = payload.into_new_category()?;
    match repo.update_category(category_id, &category) {
        Ok(0) => Err(ServiceError::NotFound),
        Ok(_) => Ok(CategoryDto {
            id: category_id.get(),
            name: category.name.into_inner(),
            slug: category.slug.into_inner(),
        }),
        Err(e) => Err(write_error("update", e)),
    }
}

/// Deletes a category no product references.
pub fn delete_category<R>(payload: DeleteCategoryFormPayload, repo: &R) -> ServiceResult<()>
where
    R: CategoryReader + CategoryWriter + ?Sized,
{
    let category_id = payload.category_id;

    match repo.get_category_by_id(category_id) {
        Ok(Some(_)) => {}
        Ok(None) => return Err(ServiceError::NotFound),
        Err(e) => {
            log::error!("Failed to get category {category_id}: {e}");
            return Err(ServiceError::Internal);
        }
    }

    match repo.count_products_in_category(category_id) {
        Ok(0) => {}
        Ok(count) => {
            return Err(ServiceError::Conflict(format!(
                "category is used by {count} product(s)"
            )));
        }
        Err(e) => {
            log::error!("Failed to count products in category {category_id}: {e}");
            return Err(ServiceError::Internal);
        }
    }

    match repo.delete_category(category_id) {
        Ok(0) => Err(ServiceError::NotFound),
        Ok(_) => Ok(()),
        Err(e) => Err(write_error("delete", e)),
    }
}
