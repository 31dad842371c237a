use std::str::FromStr;

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::domain::types::CategoryId;
use crate::pagination::{resolve_page, resolve_page_size};
use crate::repository::{ProductListQuery, ProductSort};

/// Catalog listing query string. Every field is optional and lenient:
/// anything that does not parse is ignored rather than rejected.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogQueryForm {
    pub page: Option<String>,
    pub page_size: Option<String>,
    pub category: Option<String>,
    pub price_min: Option<String>,
    pub price_max: Option<String>,
    /// `available` or `soldout`.
    pub availability: Option<String>,
    /// `true`/`1` or `false`/`0`.
    pub sale: Option<String>,
    pub sort: Option<String>,
    pub search: Option<String>,
}

fn parse_price(raw: Option<&str>) -> Option<Decimal> {
    raw.map(str::trim)
        .and_then(|s| Decimal::from_str(s).ok())
        .filter(|price| !price.is_sign_negative())
}

impl CatalogQueryForm {
    /// Builds the repository query, resolving the page size against the
    /// listing's default and the global maximum.
    pub fn into_query(self, default_page_size: usize, max_page_size: usize) -> ProductListQuery {
        let page = resolve_page(self.page.as_deref());
        let page_size =
            resolve_page_size(self.page_size.as_deref(), default_page_size, max_page_size);

        let mut query = ProductListQuery::default()
            .sort(self.sort.as_deref().map(ProductSort::parse).unwrap_or_default())
            .paginate(page, page_size);

        if let Some(category_id) = self
            .category
            .as_deref()
            .and_then(|s| s.trim().parse::<i32>().ok())
            .and_then(|id| CategoryId::new(id).ok())
        {
            query = query.category(category_id);
        }
        if let Some(min_price) = parse_price(self.price_min.as_deref()) {
            query = query.min_price(min_price);
        }
        if let Some(max_price) = parse_price(self.price_max.as_deref()) {
            query = query.max_price(max_price);
        }
        match self.availability.as_deref().map(str::trim) {
            Some("available") => query = query.sold(false),
            Some("soldout") => query = query.sold(true),
            _ => {}
        }
        match self.sale.as_deref().map(str::trim) {
            Some("true" | "1") => query = query.sale(true),
            Some("false" | "0") => query = query.sale(false),
            _ => {}
        }
        if let Some(search) = self.search.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()) {
            query = query.search(search);
        }

        query
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pagination::Pagination;

    #[test]
    fn empty_form_uses_defaults() {
        let query = CatalogQueryForm::default().into_query(20, 100);

        assert_eq!(query.pagination, Some(Pagination::new(1, 20)));
        assert_eq!(query.sort, ProductSort::Newest);
        assert!(query.category_id.is_none());
        assert!(query.sale.is_none());
        assert!(query.sold.is_none());
        assert!(query.search.is_none());
    }

    #[test]
    fn parses_every_filter() {
        let form = CatalogQueryForm {
            page: Some("3".into()),
            page_size: Some("500".into()),
            category: Some("4".into()),
            price_min: Some("10000".into()),
            price_max: Some("75000.50".into()),
            availability: Some("soldout".into()),
            sale: Some("1".into()),
            sort: Some("price_desc".into()),
            search: Some("  bouquet ".into()),
        };

        let query = form.into_query(50, 100);

        assert_eq!(query.pagination, Some(Pagination::new(3, 100)));
        assert_eq!(query.category_id, Some(CategoryId::new(4).unwrap()));
        assert_eq!(query.min_price, Some(Decimal::from(10000)));
        assert_eq!(query.max_price, Some(Decimal::from_str("75000.50").unwrap()));
        assert_eq!(query.sold, Some(true));
        assert_eq!(query.sale, Some(true));
        assert_eq!(query.sort, ProductSort::PriceDesc);
        assert_eq!(query.search.as_deref(), Some("bouquet"));
    }

    #[test]
    fn ignores_unparseable_values() {
        let form = CatalogQueryForm {
            page: Some("-2".into()),
            page_size: Some("abc".into()),
            category: Some("0".into()),
            price_min: Some("-5".into()),
            price_max: Some("cheap".into()),
            availability: Some("maybe".into()),
            sale: Some("yes".into()),
            sort: Some("random".into()),
            search: Some("   ".into()),
        };

        let query = form.into_query(20, 100);

        assert_eq!(query.pagination, Some(Pagination::new(1, 20)));
        assert!(query.category_id.is_none());
        assert!(query.min_price.is_none());
        assert!(query.max_price.is_none());
        assert!(query.sold.is_none());
        assert!(query.sale.is_none());
        assert_eq!(query.sort, ProductSort::Newest);
        assert!(query.search.is_none());
    }

    #[test]
    fn sort_keys_round_trip() {
        for sort in [
            ProductSort::Newest,
            ProductSort::PriceAsc,
            ProductSort::PriceDesc,
            ProductSort::TitleAsc,
        ] {
            assert_eq!(ProductSort::parse(sort.as_str()), sort);
        }
    }

    #[test]
    fn availability_available_means_not_sold() {
        let form = CatalogQueryForm {
            availability: Some("available".into()),
            sale: Some("false".into()),
            ..CatalogQueryForm::default()
        };

        let query = form.into_query(20, 100);

        assert_eq!(query.sold, Some(false));
        assert_eq!(query.sale, Some(false));
    }
}
