use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::image::ImageRef;
use crate::domain::types::{
    CategoryId, Price, PriceAdjustment, ProductCode, ProductDescription, ProductId, ProductTitle,
    VariantColor, VariantId,
};

/// A catalog product together with its color variants (the aggregate).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub id: ProductId,
    pub code: ProductCode,
    pub title: ProductTitle,
    pub description: Option<ProductDescription>,
    pub base_price: Price,
    /// Availability flag; independent from the per-variant sale flag.
    pub is_sold: bool,
    pub category_id: Option<CategoryId>,
    pub main_image: Option<ImageRef>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    /// Ordered by color ascending when read from storage.
    pub variants: Vec<Variant>,
}

impl Product {
    /// Every image the aggregate references: main image first, then variants.
    pub fn images(&self) -> impl Iterator<Item = &ImageRef> {
        self.main_image
            .iter()
            .chain(self.variants.iter().filter_map(|v| v.image.as_ref()))
    }

    pub fn variant(&self, color: &str) -> Option<&Variant> {
        self.variants.iter().find(|v| v.color.as_str() == color)
    }
}

/// A color variant of a [`Product`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Variant {
    pub id: VariantId,
    pub product_id: ProductId,
    pub color: VariantColor,
    pub price_adjustment: PriceAdjustment,
    pub is_sale: bool,
    pub image: Option<ImageRef>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Variant {
    /// Base price plus this variant's adjustment.
    pub fn effective_price(&self, base_price: Price) -> Decimal {
        base_price.get() + self.price_adjustment.get()
    }
}

/// Product row contents for insert and update.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewProduct {
    pub code: ProductCode,
    pub title: ProductTitle,
    pub description: Option<ProductDescription>,
    pub base_price: Price,
    pub is_sold: bool,
    pub category_id: Option<CategoryId>,
    pub main_image: Option<ImageRef>,
}

impl From<&Product> for NewProduct {
    fn from(product: &Product) -> Self {
        Self {
            code: product.code.clone(),
            title: product.title.clone(),
            description: product.description.clone(),
            base_price: product.base_price,
            is_sold: product.is_sold,
            category_id: product.category_id,
            main_image: product.main_image.clone(),
        }
    }
}

/// Variant row contents; the owning product id is supplied by the writer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewVariant {
    pub color: VariantColor,
    pub price_adjustment: PriceAdjustment,
    pub is_sale: bool,
    pub image: Option<ImageRef>,
}

/// Raw image bytes submitted alongside a write.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }
}

impl std::fmt::Debug for ImageUpload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageUpload")
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// One submitted variant entry, before reconciliation.
///
/// `color` stays raw: an empty color is a validation error on create and a
/// silently dropped entry on update.
#[derive(Debug, Clone, PartialEq)]
pub struct VariantDraft {
    pub color: String,
    pub price_adjustment: PriceAdjustment,
    pub is_sale: bool,
    pub image: Option<ImageUpload>,
}

impl VariantDraft {
    pub fn new(color: impl Into<String>) -> Self {
        Self {
            color: color.into(),
            price_adjustment: PriceAdjustment::ZERO,
            is_sale: false,
            image: None,
        }
    }

    pub fn adjustment(mut self, price_adjustment: PriceAdjustment) -> Self {
        self.price_adjustment = price_adjustment;
        self
    }

    pub fn on_sale(mut self, is_sale: bool) -> Self {
        self.is_sale = is_sale;
        self
    }

    pub fn with_image(mut self, image: ImageUpload) -> Self {
        self.image = Some(image);
        self
    }
}

/// Candidate product submitted by an admin for create or update.
///
/// The submitted variant list fully replaces the stored one on update.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductDraft {
    pub code: ProductCode,
    pub title: ProductTitle,
    pub description: Option<ProductDescription>,
    pub base_price: Price,
    pub is_sold: bool,
    pub category_id: Option<CategoryId>,
    pub variants: Vec<VariantDraft>,
}

impl ProductDraft {
    /// Row contents for this draft carrying the given main image.
    pub fn to_new_product(&self, main_image: Option<ImageRef>) -> NewProduct {
        NewProduct {
            code: self.code.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            base_price: self.base_price,
            is_sold: self.is_sold,
            category_id: self.category_id,
            main_image,
        }
    }
}
