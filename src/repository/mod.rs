use rust_decimal::Decimal;

use crate::db::{DbConnection, DbPool};
use crate::domain::admin::Admin;
use crate::domain::category::{Category, NewCategory};
use crate::domain::product::{NewProduct, NewVariant, Product, Variant};
use crate::domain::types::{AdminUsername, CategoryId, CategorySlug, ProductCode, ProductId};
use crate::pagination::Pagination;

pub mod admin;
pub mod category;
pub mod errors;
pub mod product;
#[cfg(test)]
pub mod test;

pub use errors::{RepositoryError, RepositoryResult};

/// Maximum number of rows returned by the standalone product search.
pub const SEARCH_LIMIT: usize = 50;

/// Repository implementation backed by Diesel and SQLite.
///
/// The underlying `r2d2::Pool` is cheap to clone, allowing the repository to
/// be passed around freely between handlers.
#[derive(Clone)]
pub struct DieselRepository {
    pool: DbPool, // r2d2::Pool is cheap to clone
}

impl DieselRepository {
    /// Create a new repository from an established database pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Get a pooled database connection.
    fn conn(&self) -> RepositoryResult<DbConnection> {
        Ok(self.pool.get()?)
    }
}

/// Result ordering for catalog listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProductSort {
    /// Creation time, most recent first.
    #[default]
    Newest,
    PriceAsc,
    PriceDesc,
    TitleAsc,
}

impl ProductSort {
    /// Parses the public sort key; unknown keys fall back to [`Self::Newest`].
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "price_asc" => Self::PriceAsc,
            "price_desc" => Self::PriceDesc,
            "name_asc" => Self::TitleAsc,
            _ => Self::Newest,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Newest => "newest",
            Self::PriceAsc => "price_asc",
            Self::PriceDesc => "price_desc",
            Self::TitleAsc => "name_asc",
        }
    }
}

/// Query parameters used when listing products.
///
/// All filters are optional and combine with AND. The same filter set drives
/// both the total count and the page fetch.
#[derive(Debug, Clone, Default)]
pub struct ProductListQuery {
    /// Exact category match.
    pub category_id: Option<CategoryId>,
    /// Inclusive lower bound on base price.
    pub min_price: Option<Decimal>,
    /// Inclusive upper bound on base price.
    pub max_price: Option<Decimal>,
    /// Matches products with at least one variant carrying this sale flag.
    pub sale: Option<bool>,
    /// Exact match on the product availability flag.
    pub sold: Option<bool>,
    /// Case-insensitive substring of title or code.
    pub search: Option<String>,
    pub sort: ProductSort,
    /// Pagination parameters.
    pub pagination: Option<Pagination>,
}

impl ProductListQuery {
    pub fn category(mut self, category_id: CategoryId) -> Self {
        self.category_id = Some(category_id);
        self
    }
    pub fn min_price(mut self, min_price: Decimal) -> Self {
        self.min_price = Some(min_price);
        self
    }
    pub fn max_price(mut self, max_price: Decimal) -> Self {
        self.max_price = Some(max_price);
        self
    }
    pub fn sale(mut self, sale: bool) -> Self {
        self.sale = Some(sale);
        self
    }
    pub fn sold(mut self, sold: bool) -> Self {
        self.sold = Some(sold);
        self
    }
    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }
    pub fn sort(mut self, sort: ProductSort) -> Self {
        self.sort = sort;
        self
    }
    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination::new(page, per_page));
        self
    }
}

/// Read-only operations for product aggregates.
pub trait ProductReader {
    /// Count and fetch one page of products matching the query, variants attached.
    fn list_products(&self, query: ProductListQuery) -> RepositoryResult<(usize, Vec<Product>)>;
    /// Title-or-code search ordered by title, at most `limit` rows.
    fn search_products(&self, search: &str, limit: usize) -> RepositoryResult<Vec<Product>>;
    /// Retrieve a product and its variants by identifier.
    fn get_product_by_id(&self, id: ProductId) -> RepositoryResult<Option<Product>>;
    /// Retrieve a product and its variants by business code.
    fn get_product_by_code(&self, code: &ProductCode) -> RepositoryResult<Option<Product>>;
}

/// Write operations for product aggregates.
///
/// Only [`ProductWriter::replace_variants`] is transactional; the product row
/// writes commit on their own.
pub trait ProductWriter {
    /// Insert a product row (no variants) and return it.
    fn create_product(&self, product: &NewProduct) -> RepositoryResult<Product>;
    /// Overwrite every column of an existing product row. Returns affected rows.
    fn update_product(&self, id: ProductId, product: &NewProduct) -> RepositoryResult<usize>;
    /// Delete a product row; its variants cascade. Returns affected rows.
    fn delete_product(&self, id: ProductId) -> RepositoryResult<usize>;
    /// In one transaction, delete every variant of `product_id` and insert
    /// `variants`. Returns the stored variants ordered by color.
    fn replace_variants(
        &self,
        product_id: ProductId,
        variants: &[NewVariant],
    ) -> RepositoryResult<Vec<Variant>>;
}

/// Read-only operations for category entities.
pub trait CategoryReader {
    /// All categories ordered by name.
    fn list_categories(&self) -> RepositoryResult<Vec<Category>>;
    fn get_category_by_id(&self, id: CategoryId) -> RepositoryResult<Option<Category>>;
    fn get_category_by_slug(&self, slug: &CategorySlug) -> RepositoryResult<Option<Category>>;
    /// Number of products referencing the category.
    fn count_products_in_category(&self, id: CategoryId) -> RepositoryResult<usize>;
}

/// Write operations for category entities.
pub trait CategoryWriter {
    /// Persist a new category and return it.
    fn create_category(&self, category: &NewCategory) -> RepositoryResult<Category>;
    /// Rename a category. Returns affected rows.
    fn update_category(&self, id: CategoryId, category: &NewCategory) -> RepositoryResult<usize>;
    /// Delete a category by id. Returns affected rows.
    fn delete_category(&self, id: CategoryId) -> RepositoryResult<usize>;
}

/// Read-only access to admin accounts for the auth layer.
pub trait AdminReader {
    fn get_admin_by_username(&self, username: &AdminUsername) -> RepositoryResult<Option<Admin>>;
}
