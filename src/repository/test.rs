use std::cell::{Cell, RefCell};

use chrono::Utc;

use crate::domain::category::{Category, NewCategory};
use crate::domain::product::{NewProduct, NewVariant, Product, Variant};
use crate::domain::types::{
    CategoryId, CategorySlug, ProductCode, ProductId, VariantId,
};
use crate::repository::{
    CategoryReader, CategoryWriter, ProductListQuery, ProductReader, ProductSort,
    ProductWriter, RepositoryError, RepositoryResult,
};

/// Simple in-memory repository used for unit tests.
///
/// Each `fail_*` switch makes the matching write return a database error
/// without touching state, to drive the compensation paths.
#[derive(Default)]
pub struct TestRepository {
    products: RefCell<Vec<Product>>,
    categories: RefCell<Vec<Category>>,
    next_id: Cell<i32>,
    pub fail_product_insert: Cell<bool>,
    pub fail_product_update: Cell<bool>,
    pub fail_product_delete: Cell<bool>,
    pub fail_variant_replace: Cell<bool>,
}

fn injected() -> RepositoryError {
    RepositoryError::Database("injected failure".to_string())
}

impl TestRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every stored product.
    pub fn products(&self) -> Vec<Product> {
        self.products.borrow().clone()
    }

    pub fn product_count(&self) -> usize {
        self.products.borrow().len()
    }

    fn next_id(&self) -> i32 {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        id
    }

    fn check_category(&self, category_id: Option<CategoryId>) -> RepositoryResult<()> {
        match category_id {
            Some(id) if !self.categories.borrow().iter().any(|c| c.id == id) => Err(
                RepositoryError::ForeignKey(format!("category {id} does not exist")),
            ),
            _ => Ok(()),
        }
    }

    fn check_unique_code(&self, code: &ProductCode, except: Option<ProductId>) -> RepositoryResult<()> {
        let taken = self
            .products
            .borrow()
            .iter()
            .any(|p| &p.code == code && Some(p.id) != except);
        if taken {
            return Err(RepositoryError::Conflict(format!(
                "UNIQUE constraint failed: products.code ({code})"
            )));
        }
        Ok(())
    }
}

fn by_title(a: &Product, b: &Product) -> std::cmp::Ordering {
    a.title
        .to_lowercase()
        .cmp(&b.title.to_lowercase())
        .then(a.id.cmp(&b.id))
}

fn matches_search(product: &Product, search: &str) -> bool {
    let search = search.to_lowercase();
    product.title.to_lowercase().contains(&search) || product.code.to_lowercase().contains(&search)
}

impl ProductReader for TestRepository {
    fn list_products(&self, query: ProductListQuery) -> RepositoryResult<(usize, Vec<Product>)> {
        let mut items = self.products();

        if let Some(category_id) = query.category_id {
            items.retain(|p| p.category_id == Some(category_id));
        }
        if let Some(min_price) = query.min_price {
            items.retain(|p| p.base_price.get() >= min_price);
        }
        if let Some(max_price) = query.max_price {
            items.retain(|p| p.base_price.get() <= max_price);
        }
        if let Some(sale) = query.sale {
            items.retain(|p| p.variants.iter().any(|v| v.is_sale == sale));
        }
        if let Some(sold) = query.sold {
            items.retain(|p| p.is_sold == sold);
        }
        if let Some(search) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            items.retain(|p| matches_search(p, search));
        }

        match query.sort {
            ProductSort::Newest => {
                items.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)))
            }
            ProductSort::PriceAsc => {
                items.sort_by(|a, b| a.base_price.cmp(&b.base_price).then(a.id.cmp(&b.id)))
            }
            ProductSort::PriceDesc => {
                items.sort_by(|a, b| b.base_price.cmp(&a.base_price).then(a.id.cmp(&b.id)))
            }
            ProductSort::TitleAsc => items.sort_by(by_title),
        }

        let total = items.len();
        if let Some(pagination) = query.pagination {
            items = items
                .into_iter()
                .skip(pagination.offset())
                .take(pagination.limit())
                .collect();
        }
        Ok((total, items))
    }

    fn search_products(&self, search: &str, limit: usize) -> RepositoryResult<Vec<Product>> {
        let mut items = self.products();
        items.retain(|p| matches_search(p, search.trim()));
        items.sort_by(by_title);
        items.truncate(limit);
        Ok(items)
    }

    fn get_product_by_id(&self, id: ProductId) -> RepositoryResult<Option<Product>> {
        Ok(self.products.borrow().iter().find(|p| p.id == id).cloned())
    }

    fn get_product_by_code(&self, code: &ProductCode) -> RepositoryResult<Option<Product>> {
        Ok(self
            .products
            .borrow()
            .iter()
            .find(|p| &p.code == code)
            .cloned())
    }
}

impl ProductWriter for TestRepository {
    fn create_product(&self, product: &NewProduct) -> RepositoryResult<Product> {
        if self.fail_product_insert.get() {
            return Err(injected());
        }
        self.check_unique_code(&product.code, None)?;
        self.check_category(product.category_id)?;

        let now = Utc::now().naive_utc();
        let created = Product {
            id: ProductId::new(self.next_id())?,
            code: product.code.clone(),
            title: product.title.clone(),
            description: product.description.clone(),
            base_price: product.base_price,
            is_sold: product.is_sold,
            category_id: product.category_id,
            main_image: product.main_image.clone(),
            created_at: now,
            updated_at: now,
            variants: Vec::new(),
        };
        self.products.borrow_mut().push(created.clone());
        Ok(created)
    }

    fn update_product(&self, id: ProductId, product: &NewProduct) -> RepositoryResult<usize> {
        if self.fail_product_update.get() {
            return Err(injected());
        }
        self.check_unique_code(&product.code, Some(id))?;
        self.check_category(product.category_id)?;

        let mut products = self.products.borrow_mut();
        let Some(stored) = products.iter_mut().find(|p| p.id == id) else {
            return Ok(0);
        };
        stored.code = product.code.clone();
        stored.title = product.title.clone();
        stored.description = product.description.clone();
        stored.base_price = product.base_price;
        stored.is_sold = product.is_sold;
        stored.category_id = product.category_id;
        stored.main_image = product.main_image.clone();
        stored.updated_at = Utc::now().naive_utc();
        Ok(1)
    }

    fn delete_product(&self, id: ProductId) -> RepositoryResult<usize> {
        if self.fail_product_delete.get() {
            return Err(injected());
        }
        let mut products = self.products.borrow_mut();
        let before = products.len();
        products.retain(|p| p.id != id);
        Ok(before - products.len())
    }

    fn replace_variants(
        &self,
        product_id: ProductId,
        variants: &[NewVariant],
    ) -> RepositoryResult<Vec<Variant>> {
        if self.fail_variant_replace.get() {
            return Err(injected());
        }
        for (i, variant) in variants.iter().enumerate() {
            if variants[..i].iter().any(|v| v.color == variant.color) {
                return Err(RepositoryError::Conflict(format!(
                    "UNIQUE constraint failed: product_variants.color ({})",
                    variant.color
                )));
            }
        }

        let now = Utc::now().naive_utc();
        let mut stored = variants
            .iter()
            .map(|variant| {
                Ok(Variant {
                    id: VariantId::new(self.next_id())?,
                    product_id,
                    color: variant.color.clone(),
                    price_adjustment: variant.price_adjustment,
                    is_sale: variant.is_sale,
                    image: variant.image.clone(),
                    created_at: now,
                    updated_at: now,
                })
            })
            .collect::<RepositoryResult<Vec<Variant>>>()?;
        stored.sort_by(|a, b| a.color.cmp(&b.color));

        let mut products = self.products.borrow_mut();
        let product = products
            .iter_mut()
            .find(|p| p.id == product_id)
            .ok_or_else(|| RepositoryError::ForeignKey(format!("product {product_id} does not exist")))?;
        product.variants = stored.clone();
        Ok(stored)
    }
}

impl CategoryReader for TestRepository {
    fn list_categories(&self) -> RepositoryResult<Vec<Category>> {
        let mut items = self.categories.borrow().clone();
        items.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(items)
    }

    fn get_category_by_id(&self, id: CategoryId) -> RepositoryResult<Option<Category>> {
        Ok(self.categories.borrow().iter().find(|c| c.id == id).cloned())
    }

    fn get_category_by_slug(&self, slug: &CategorySlug) -> RepositoryResult<Option<Category>> {
        Ok(self
            .categories
            .borrow()
            .iter()
            .find(|c| &c.slug == slug)
            .cloned())
    }

    fn count_products_in_category(&self, id: CategoryId) -> RepositoryResult<usize> {
        Ok(self
            .products
            .borrow()
            .iter()
            .filter(|p| p.category_id == Some(id))
            .count())
    }
}

impl CategoryWriter for TestRepository {
    fn create_category(&self, category: &NewCategory) -> RepositoryResult<Category> {
        let taken = self
            .categories
            .borrow()
            .iter()
            .any(|c| c.name == category.name || c.slug == category.slug);
        if taken {
            return Err(RepositoryError::Conflict(format!(
                "UNIQUE constraint failed: categories ({})",
                category.name
            )));
        }

        let now = Utc::now().naive_utc();
        let created = Category {
            id: CategoryId::new(self.next_id())?,
            name: category.name.clone(),
            slug: category.slug.clone(),
            created_at: now,
            updated_at: now,
        };
        self.categories.borrow_mut().push(created.clone());
        Ok(created)
    }

    fn update_category(&self, id: CategoryId, category: &NewCategory) -> RepositoryResult<usize> {
        let taken = self
            .categories
            .borrow()
            .iter()
            .any(|c| c.id != id && (c.name == category.name || c.slug == category.slug));
        if taken {
            return Err(RepositoryError::Conflict(format!(
                "UNIQUE constraint failed: categories ({})",
                category.name
            )));
        }

        let mut categories = self.categories.borrow_mut();
        let Some(stored) = categories.iter_mut().find(|c| c.id == id) else {
            return Ok(0);
        };
        stored.name = category.name.clone();
        stored.slug = category.slug.clone();
        stored.updated_at = Utc::now().naive_utc();
        Ok(1)
    }

    fn delete_category(&self, id: CategoryId) -> RepositoryResult<usize> {
        if self.count_products_in_category(id)? > 0 {
            return Err(RepositoryError::ForeignKey(format!(
                "category {id} is referenced by products"
            )));
        }
        let mut categories = self.categories.borrow_mut();
        let before = categories.len();
        categories.retain(|c| c.id != id);
        Ok(before - categories.len())
    }
}
