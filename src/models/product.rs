use chrono::{NaiveDateTime, Utc};
use diesel::prelude::*;

use crate::domain::image::ImageRef;
use crate::domain::product::{
    NewProduct as DomainNewProduct, NewVariant as DomainNewVariant, Product as DomainProduct,
    Variant as DomainVariant,
};
use crate::domain::types::{
    Price, PriceAdjustment, ProductCode, ProductDescription, ProductTitle, TypeConstraintError,
    VariantColor,
};

/// Diesel model representing the `products` table.
#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::products)]
pub struct Product {
    pub id: i32,
    pub code: String,
    pub title: String,
    pub description: Option<String>,
    pub main_photo_url: Option<String>,
    pub main_photo_id: Option<String>,
    pub category_id: Option<i32>,
    pub base_price_cents: i64,
    pub is_sold: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Insertable/patchable form of [`Product`].
///
/// `treat_none_as_null` so that clearing a description or category on update
/// writes NULL instead of skipping the column.
#[derive(Debug, Insertable, AsChangeset)]
#[diesel(table_name = crate::schema::products)]
#[diesel(treat_none_as_null = true)]
pub struct NewProduct {
    pub code: String,
    pub title: String,
    pub description: Option<String>,
    pub main_photo_url: Option<String>,
    pub main_photo_id: Option<String>,
    pub category_id: Option<i32>,
    pub base_price_cents: i64,
    pub is_sold: bool,
    pub updated_at: NaiveDateTime,
}

/// Diesel model representing the `product_variants` table.
#[derive(Debug, Clone, Identifiable, Queryable, Selectable, Associations)]
#[diesel(belongs_to(Product))]
#[diesel(table_name = crate::schema::product_variants)]
pub struct Variant {
    pub id: i32,
    pub product_id: i32,
    pub color: String,
    pub photo_url: Option<String>,
    pub photo_id: Option<String>,
    pub price_adjustment_cents: i64,
    pub is_sale: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Insertable form of [`Variant`].
#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::product_variants)]
pub struct NewVariant {
    pub product_id: i32,
    pub color: String,
    pub photo_url: Option<String>,
    pub photo_id: Option<String>,
    pub price_adjustment_cents: i64,
    pub is_sale: bool,
}

impl TryFrom<Variant> for DomainVariant {
    type Error = TypeConstraintError;

    fn try_from(variant: Variant) -> Result<Self, Self::Error> {
        Ok(Self {
            id: variant.id.try_into()?,
            product_id: variant.product_id.try_into()?,
            color: VariantColor::new(variant.color)?,
            price_adjustment: PriceAdjustment::from_cents(variant.price_adjustment_cents)?,
            is_sale: variant.is_sale,
            image: ImageRef::from_parts(variant.photo_url, variant.photo_id, "variant photo")?,
            created_at: variant.created_at,
            updated_at: variant.updated_at,
        })
    }
}

impl Product {
    /// Converts the row into the domain aggregate with the given variants.
    pub fn into_domain(
        self,
        variants: Vec<DomainVariant>,
    ) -> Result<DomainProduct, TypeConstraintError> {
        Ok(DomainProduct {
            id: self.id.try_into()?,
            code: ProductCode::new(self.code)?,
            title: ProductTitle::new(self.title)?,
            description: self.description.map(ProductDescription::new).transpose()?,
            base_price: Price::from_cents(self.base_price_cents)?,
            is_sold: self.is_sold,
            category_id: self.category_id.map(TryInto::try_into).transpose()?,
            main_image: ImageRef::from_parts(self.main_photo_url, self.main_photo_id, "main photo")?,
            created_at: self.created_at,
            updated_at: self.updated_at,
            variants,
        })
    }
}

impl From<&DomainNewProduct> for NewProduct {
    fn from(product: &DomainNewProduct) -> Self {
        let (main_photo_url, main_photo_id) = ImageRef::into_parts(product.main_image.clone());
        Self {
            code: product.code.as_str().to_string(),
            title: product.title.as_str().to_string(),
            description: product
                .description
                .as_ref()
                .map(|d| d.as_str().to_string()),
            main_photo_url,
            main_photo_id,
            category_id: product.category_id.map(i32::from),
            base_price_cents: product.base_price.cents(),
            is_sold: product.is_sold,
            updated_at: Utc::now().naive_utc(),
        }
    }
}

impl NewVariant {
    pub fn from_domain(product_id: i32, variant: &DomainNewVariant) -> Self {
        let (photo_url, photo_id) = ImageRef::into_parts(variant.image.clone());
        Self {
            product_id,
            color: variant.color.as_str().to_string(),
            photo_url,
            photo_id,
            price_adjustment_cents: variant.price_adjustment.cents(),
            is_sale: variant.is_sale,
        }
    }
}
