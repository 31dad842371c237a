use std::str::FromStr;

use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::domain::product::{ImageUpload, ProductDraft, VariantDraft};
use crate::domain::types::{
    CategoryId, Price, PriceAdjustment, ProductCode, ProductDescription, ProductTitle,
    TypeConstraintError,
};

/// Admin product form. Uploaded files are attached by the HTTP layer after
/// deserialization.
#[derive(Debug, Deserialize, Validate)]
pub struct ProductForm {
    #[validate(length(min = 1))]
    pub code: String,
    #[validate(length(min = 5, max = 200))]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub base_price: String,
    #[serde(default)]
    pub is_sold: bool,
    #[serde(default)]
    pub category_id: Option<i32>,
    #[serde(default)]
    pub variants: Vec<VariantForm>,
    #[serde(skip)]
    pub main_image: Option<ImageUpload>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VariantForm {
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub price_adjustment: Option<String>,
    #[serde(default)]
    pub is_sale: bool,
    #[serde(skip)]
    pub image: Option<ImageUpload>,
}

/// Validated product form, ready for the write services.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductFormPayload {
    pub draft: ProductDraft,
    pub main_image: Option<ImageUpload>,
}

#[derive(Debug, Error)]
pub enum ProductFormError {
    #[error("Product form validation failed: {0}")]
    Validation(String),
    #[error("Product form contains invalid data: {0}")]
    TypeConstraint(String),
    #[error("Product form contains an invalid amount: {0}")]
    InvalidAmount(String),
}

impl From<ValidationErrors> for ProductFormError {
    fn from(value: ValidationErrors) -> Self {
        Self::Validation(value.to_string())
    }
}

impl From<TypeConstraintError> for ProductFormError {
    fn from(value: TypeConstraintError) -> Self {
        Self::TypeConstraint(value.to_string())
    }
}

fn parse_amount(raw: &str) -> Result<Decimal, ProductFormError> {
    let raw = raw.trim();
    Decimal::from_str(raw).map_err(|_| ProductFormError::InvalidAmount(raw.to_string()))
}

impl TryFrom<VariantForm> for VariantDraft {
    type Error = ProductFormError;

    fn try_from(value: VariantForm) -> Result<Self, Self::Error> {
        let price_adjustment = match value.price_adjustment.as_deref().map(str::trim) {
            None | Some("") => PriceAdjustment::ZERO,
            Some(raw) => PriceAdjustment::new(parse_amount(raw)?)?,
        };
        Ok(Self {
            color: value.color,
            price_adjustment,
            is_sale: value.is_sale,
            image: value.image,
        })
    }
}

impl TryFrom<ProductForm> for ProductFormPayload {
    type Error = ProductFormError;

    fn try_from(value: ProductForm) -> Result<Self, Self::Error> {
        value.validate()?;

        let description = value
            .description
            .filter(|d| !d.trim().is_empty())
            .map(ProductDescription::new)
            .transpose()?;
        let variants = value
            .variants
            .into_iter()
            .map(VariantDraft::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            draft: ProductDraft {
                code: ProductCode::new(value.code)?,
                title: ProductTitle::new(value.title)?,
                description,
                base_price: Price::new(parse_amount(&value.base_price)?)?,
                is_sold: value.is_sold,
                category_id: value.category_id.map(CategoryId::new).transpose()?,
                variants,
            },
            main_image: value.main_image,
        })
    }
}

/// Flattens the two ways a form can submit variants into one ordered list:
/// plain entries first, in submission order, then indexed entries by
/// ascending index. Equal indexes keep submission order.
pub fn order_variant_forms(
    non_indexed: Vec<VariantForm>,
    mut indexed: Vec<(usize, VariantForm)>,
) -> Vec<VariantForm> {
    indexed.sort_by_key(|(index, _)| *index);
    non_indexed
        .into_iter()
        .chain(indexed.into_iter().map(|(_, form)| form))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(title: &str, base_price: &str) -> ProductForm {
        ProductForm {
            code: "BRK-001".to_string(),
            title: title.to_string(),
            description: Some("  ".to_string()),
            base_price: base_price.to_string(),
            is_sold: false,
            category_id: None,
            variants: vec![
                VariantForm {
                    color: "Gold".to_string(),
                    ..VariantForm::default()
                },
                VariantForm {
                    color: "Silver".to_string(),
                    price_adjustment: Some("-5000".to_string()),
                    ..VariantForm::default()
                },
            ],
            main_image: None,
        }
    }

    fn colors(forms: &[VariantForm]) -> Vec<&str> {
        forms.iter().map(|f| f.color.as_str()).collect()
    }

    #[test]
    fn converts_valid_form() {
        let payload = ProductFormPayload::try_from(form("Kertas Bouquet Premium", "50000")).unwrap();

        assert_eq!(payload.draft.base_price.get(), Decimal::from(50000));
        assert!(payload.draft.description.is_none());
        assert_eq!(payload.draft.variants.len(), 2);
        assert_eq!(
            payload.draft.variants[1].price_adjustment.get(),
            Decimal::from(-5000)
        );
    }

    #[test]
    fn rejects_four_character_title() {
        let err = ProductFormPayload::try_from(form("ABCD", "50000")).unwrap_err();
        assert!(matches!(err, ProductFormError::Validation(_)));
    }

    #[test]
    fn rejects_bad_prices() {
        assert!(matches!(
            ProductFormPayload::try_from(form("Kertas Bouquet", "abc")).unwrap_err(),
            ProductFormError::InvalidAmount(_)
        ));
        assert!(matches!(
            ProductFormPayload::try_from(form("Kertas Bouquet", "0")).unwrap_err(),
            ProductFormError::TypeConstraint(_)
        ));
        assert!(matches!(
            ProductFormPayload::try_from(form("Kertas Bouquet", "100000000")).unwrap_err(),
            ProductFormError::TypeConstraint(_)
        ));
    }

    #[test]
    fn deserializes_with_defaults() {
        let form: ProductForm = serde_json::from_str(
            r#"{"code":"BRK-002","title":"Mini Bouquet","base_price":"12.50"}"#,
        )
        .unwrap();

        let payload = ProductFormPayload::try_from(form).unwrap();

        assert!(payload.draft.variants.is_empty());
        assert!(!payload.draft.is_sold);
    }

    #[test]
    fn orders_plain_entries_before_indexed_ones() {
        let variant = |color: &str| VariantForm {
            color: color.to_string(),
            ..VariantForm::default()
        };

        let ordered = order_variant_forms(
            vec![variant("Red"), variant("Blue")],
            vec![(2, variant("Gold")), (0, variant("Silver")), (1, variant("Pink"))],
        );

        assert_eq!(colors(&ordered), vec!["Red", "Blue", "Silver", "Pink", "Gold"]);
    }
}
