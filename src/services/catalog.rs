//! Public and admin read paths over the product catalog.

use crate::domain::types::ProductId;
use crate::dto::products::ProductDto;
use crate::forms::catalog::CatalogQueryForm;
use crate::models::config::PaginationConfig;
use crate::pagination::{Paginated, Pagination};
use crate::repository::{ProductListQuery, ProductReader, SEARCH_LIMIT};

use super::{ServiceError, ServiceResult};

fn list<R>(query: ProductListQuery, repo: &R) -> ServiceResult<Paginated<ProductDto>>
where
    R: ProductReader + ?Sized,
{
    let pagination = query.pagination.unwrap_or(Pagination::new(1, 1));
    match repo.list_products(query) {
        Ok((total, products)) => {
            Ok(Paginated::new(products, pagination, total).map(ProductDto::from))
        }
        Err(e) => {
            log::error!("Failed to list products: {e}");
            Err(ServiceError::Internal)
        }
    }
}

/// Public catalog page.
pub fn list_catalog<R>(
    form: CatalogQueryForm,
    config: &PaginationConfig,
    repo: &R,
) -> ServiceResult<Paginated<ProductDto>>
where
    R: ProductReader + ?Sized,
{
    list(
        form.into_query(config.public_page_size, config.max_page_size),
        repo,
    )
}

/// Admin product table; same filters, larger default page.
pub fn list_admin_products<R>(
    form: CatalogQueryForm,
    config: &PaginationConfig,
    repo: &R,
) -> ServiceResult<Paginated<ProductDto>>
where
    R: ProductReader + ?Sized,
{
    list(
        form.into_query(config.admin_page_size, config.max_page_size),
        repo,
    )
}

/// Title-or-code search without pagination. A blank query returns nothing
/// without touching the store.
pub fn search_products<R>(query: &str, repo: &R) -> ServiceResult<Vec<ProductDto>>
where
    R: ProductReader + ?Sized,
{
    let query = query.trim();
    if query.is_empty() {
        return Ok(Vec::new());
    }

    match repo.search_products(query, SEARCH_LIMIT) {
        Ok(products) => Ok(products.into_iter().map(ProductDto::from).collect()),
        Err(e) => {
            log::error!("Failed to search products: {e}");
            Err(ServiceError::Internal)
        }
    }
}

pub fn get_product<R>(product_id: i32, repo: &R) -> ServiceResult<ProductDto>
where
    R: ProductReader + ?Sized,
{
    let product_id = ProductId::new(product_id).map_err(|_| ServiceError::NotFound)?;

    match repo.get_product_by_id(product_id) {
        Ok(Some(product)) => Ok(ProductDto::from(product)),
        Ok(None) => Err(ServiceError::NotFound),
        Err(e) => {
            log::error!("Failed to get product {product_id}: {e}");
            Err(ServiceError::Internal)
        }
    }
}
