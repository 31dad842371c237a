use diesel::prelude::*;
use diesel::sqlite::{Sqlite, SqliteConnection};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::db::fold_case;
use crate::domain::product::{NewProduct, NewVariant, Product, Variant};
use crate::domain::types::{ProductCode, ProductId};
use crate::models::product::{
    NewProduct as DbNewProduct, NewVariant as DbNewVariant, Product as DbProduct,
    Variant as DbVariant,
};
use crate::repository::{
    DieselRepository, ProductListQuery, ProductReader, ProductSort, ProductWriter,
    RepositoryError, RepositoryResult,
};

/// Lowercases `search` and wraps it in `%...%`, escaping LIKE wildcards so
/// they match literally. Compare against `fold_case(column)`.
fn like_pattern(search: &str) -> String {
    let mut pattern = String::with_capacity(search.len() + 2);
    pattern.push('%');
    for ch in search.to_lowercase().chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

fn cents_ceil(value: Decimal) -> i64 {
    (value * Decimal::ONE_HUNDRED)
        .ceil()
        .to_i64()
        .unwrap_or(if value.is_sign_negative() { i64::MIN } else { i64::MAX })
}

fn cents_floor(value: Decimal) -> i64 {
    (value * Decimal::ONE_HUNDRED)
        .floor()
        .to_i64()
        .unwrap_or(if value.is_sign_negative() { i64::MIN } else { i64::MAX })
}

/// Loads the variants of `rows` in one query and assembles the aggregates,
/// keeping the order of `rows`. Variants are ordered by color.
fn attach_variants(
    conn: &mut SqliteConnection,
    rows: Vec<DbProduct>,
) -> RepositoryResult<Vec<Product>> {
    use crate::schema::product_variants;

    let variants = DbVariant::belonging_to(&rows)
        .order((product_variants::color.asc(), product_variants::id.asc()))
        .load::<DbVariant>(conn)?;
    let grouped = variants.grouped_by(&rows);

    rows.into_iter()
        .zip(grouped)
        .map(|(row, variants)| {
            let variants = variants
                .into_iter()
                .map(TryInto::try_into)
                .collect::<Result<Vec<Variant>, _>>()?;
            Ok(row.into_domain(variants)?)
        })
        .collect()
}

impl ProductReader for DieselRepository {
    fn list_products(&self, query: ProductListQuery) -> RepositoryResult<(usize, Vec<Product>)> {
        use crate::schema::{product_variants, products};

        let mut conn = self.conn()?;

        let search = query
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(like_pattern);

        // Shared by the count and the page fetch so both see the same rows.
        let query_builder = || {
            let mut items = products::table.into_boxed::<Sqlite>();

            if let Some(category_id) = query.category_id {
                items = items.filter(products::category_id.eq(category_id.get()));
            }

            if let Some(min_price) = query.min_price {
                items = items.filter(products::base_price_cents.ge(cents_ceil(min_price)));
            }

            if let Some(max_price) = query.max_price {
                items = items.filter(products::base_price_cents.le(cents_floor(max_price)));
            }

            if let Some(sale) = query.sale {
                items = items.filter(
                    products::id.eq_any(
                        product_variants::table
                            .filter(product_variants::is_sale.eq(sale))
                            .select(product_variants::product_id),
                    ),
                );
            }

            if let Some(sold) = query.sold {
                items = items.filter(products::is_sold.eq(sold));
            }

            if let Some(pattern) = &search {
                items = items.filter(
                    fold_case(products::title)
                        .like(pattern.as_str())
                        .escape('\\')
                        .or(fold_case(products::code).like(pattern.as_str()).escape('\\')),
                );
            }

            items
        };

        let total = query_builder().count().get_result::<i64>(&mut conn)?;
        let total = usize::try_from(total).unwrap_or_default();

        // Ties are broken by id so page boundaries never shift between requests.
        let mut items = match query.sort {
            ProductSort::Newest => {
                query_builder().order((products::created_at.desc(), products::id.desc()))
            }
            ProductSort::PriceAsc => {
                query_builder().order((products::base_price_cents.asc(), products::id.asc()))
            }
            ProductSort::PriceDesc => {
                query_builder().order((products::base_price_cents.desc(), products::id.asc()))
            }
            ProductSort::TitleAsc => {
                query_builder().order((fold_case(products::title).asc(), products::id.asc()))
            }
        };

        // Apply pagination if requested
        if let Some(pagination) = &query.pagination {
            items = items
                .offset(i64::try_from(pagination.offset()).unwrap_or(i64::MAX))
                .limit(i64::try_from(pagination.limit()).unwrap_or(i64::MAX));
        }

        let rows = items.load::<DbProduct>(&mut conn)?;
        let items = attach_variants(&mut conn, rows)?;

        Ok((total, items))
    }

    fn search_products(&self, search: &str, limit: usize) -> RepositoryResult<Vec<Product>> {
        use crate::schema::products;

        let mut conn = self.conn()?;
        let pattern = like_pattern(search.trim());

        let rows = products::table
            .filter(
                fold_case(products::title)
                    .like(pattern.as_str())
                    .escape('\\')
                    .or(fold_case(products::code).like(pattern.as_str()).escape('\\')),
            )
            .order((fold_case(products::title).asc(), products::id.asc()))
            .limit(i64::try_from(limit).unwrap_or(i64::MAX))
            .load::<DbProduct>(&mut conn)?;

        attach_variants(&mut conn, rows)
    }

    fn get_product_by_id(&self, id: ProductId) -> RepositoryResult<Option<Product>> {
        use crate::schema::products;

        let mut conn = self.conn()?;

        let row = products::table
            .find(id.get())
            .first::<DbProduct>(&mut conn)
            .optional()?;

        match row {
            Some(row) => Ok(attach_variants(&mut conn, vec![row])?.pop()),
            None => Ok(None),
        }
    }

    fn get_product_by_code(&self, code: &ProductCode) -> RepositoryResult<Option<Product>> {
        use crate::schema::products;

        let mut conn = self.conn()?;

        let row = products::table
            .filter(products::code.eq(code.as_str()))
            .first::<DbProduct>(&mut conn)
            .optional()?;

        match row {
            Some(row) => Ok(attach_variants(&mut conn, vec![row])?.pop()),
            None => Ok(None),
        }
    }
}

impl ProductWriter for DieselRepository {
    fn create_product(&self, product: &NewProduct) -> RepositoryResult<Product> {
        use crate::schema::products;

        let mut conn = self.conn()?;
        let db_product = DbNewProduct::from(product);

        let row = diesel::insert_into(products::table)
            .values(&db_product)
            .get_result::<DbProduct>(&mut conn)?;

        Ok(row.into_domain(Vec::new())?)
    }

    fn update_product(&self, id: ProductId, product: &NewProduct) -> RepositoryResult<usize> {
        use crate::schema::products;

        let mut conn = self.conn()?;
        let db_product = DbNewProduct::from(product);

        let affected = diesel::update(products::table.find(id.get()))
            .set(&db_product)
            .execute(&mut conn)?;

        Ok(affected)
    }

    fn delete_product(&self, id: ProductId) -> RepositoryResult<usize> {
        use crate::schema::products;

        let mut conn = self.conn()?;

        let affected = diesel::delete(products::table.find(id.get())).execute(&mut conn)?;

        Ok(affected)
    }

    fn replace_variants(
        &self,
        product_id: ProductId,
        variants: &[NewVariant],
    ) -> RepositoryResult<Vec<Variant>> {
        use crate::schema::product_variants;

        let mut conn = self.conn()?;
        let rows = variants
            .iter()
            .map(|variant| DbNewVariant::from_domain(product_id.get(), variant))
            .collect::<Vec<_>>();

        let stored = conn.transaction::<_, RepositoryError, _>(|conn| {
            diesel::delete(
                product_variants::table.filter(product_variants::product_id.eq(product_id.get())),
            )
            .execute(conn)?;

            if !rows.is_empty() {
                diesel::insert_into(product_variants::table)
                    .values(&rows)
                    .execute(conn)?;
            }

            let stored = product_variants::table
                .filter(product_variants::product_id.eq(product_id.get()))
                .order((product_variants::color.asc(), product_variants::id.asc()))
                .load::<DbVariant>(conn)?;
            Ok(stored)
        })?;

        let variants = stored
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<Variant>, _>>()?;
        Ok(variants)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn like_pattern_lowercases_and_escapes_wildcards() {
        assert_eq!(like_pattern("BRK"), "%brk%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(like_pattern("ÉDELWEISS"), "%édelweiss%");
    }

    #[test]
    fn price_bounds_round_inwards() {
        let value = Decimal::from_str("10.005").unwrap();
        assert_eq!(cents_ceil(value), 1001);
        assert_eq!(cents_floor(value), 1000);
        assert_eq!(cents_ceil(Decimal::from(50000)), 5_000_000);
    }
}
