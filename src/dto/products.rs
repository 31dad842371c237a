use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::product::{Product, Variant};
use crate::domain::types::Price;

/// Product card as rendered in listings and on the detail page.
///
/// Image deletion handles stay server-side; only URLs are exposed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductDto {
    pub id: i32,
    pub code: String,
    pub title: String,
    pub description: Option<String>,
    pub base_price: Decimal,
    pub is_sold: bool,
    pub category_id: Option<i32>,
    pub main_photo_url: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub variants: Vec<VariantDto>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariantDto {
    pub id: i32,
    pub color: String,
    pub price_adjustment: Decimal,
    /// Base price plus adjustment.
    pub effective_price: Decimal,
    pub is_sale: bool,
    pub photo_url: Option<String>,
}

impl VariantDto {
    fn from_variant(variant: Variant, base_price: Price) -> Self {
        Self {
            id: variant.id.get(),
            effective_price: variant.effective_price(base_price),
            price_adjustment: variant.price_adjustment.get(),
            color: variant.color.into_inner(),
            is_sale: variant.is_sale,
            photo_url: variant.image.map(|image| image.url.into_inner()),
        }
    }
}

impl From<Product> for ProductDto {
    fn from(value: Product) -> Self {
        let base_price = value.base_price;
        Self {
            id: value.id.get(),
            code: value.code.into_inner(),
            title: value.title.into_inner(),
            description: value.description.map(|d| d.into_inner()),
            base_price: base_price.get(),
            is_sold: value.is_sold,
            category_id: value.category_id.map(i32::from),
            main_photo_url: value.main_image.map(|image| image.url.into_inner()),
            created_at: value.created_at,
            updated_at: value.updated_at,
            variants: value
                .variants
                .into_iter()
                .map(|variant| VariantDto::from_variant(variant, base_price))
                .collect(),
        }
    }
}
