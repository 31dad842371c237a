//! Variant reconciliation.
//!
//! A submitted variant list fully replaces the stored one. Reconciliation
//! decides, per color, whether the stored image carries over, a new one must
//! be uploaded, or the variant has no image, and which stored images end up
//! unreferenced.

use std::collections::HashMap;

use crate::domain::image::ImageRef;
use crate::domain::product::{ImageUpload, NewVariant, Variant, VariantDraft};
use crate::domain::types::{ImageHandle, PriceAdjustment, VariantColor};
use crate::services::ServiceResult;

/// Image decision for one planned variant.
#[derive(Debug, Clone, PartialEq)]
pub enum PlannedImage {
    /// Reuse the stored image of the same color.
    Keep(ImageRef),
    Upload(ImageUpload),
    None,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlannedVariant {
    pub color: VariantColor,
    pub price_adjustment: PriceAdjustment,
    pub is_sale: bool,
    pub image: PlannedImage,
}

/// Outcome of reconciling a submission against the stored variants.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VariantPlan {
    /// One entry per distinct color, in submission order.
    pub variants: Vec<PlannedVariant>,
    /// Stored images no planned variant keeps; delete after commit.
    pub orphaned: Vec<ImageHandle>,
}

/// Builds the plan for replacing `existing` with `submitted`.
///
/// Entries whose color is empty after trimming are dropped. When a color
/// repeats, the later entry replaces the earlier one in the earlier one's
/// position, so an upload attached to the replaced entry never happens.
pub fn plan_variants(existing: &[Variant], submitted: Vec<VariantDraft>) -> VariantPlan {
    let stored: HashMap<&str, &ImageRef> = existing
        .iter()
        .filter_map(|v| v.image.as_ref().map(|image| (v.color.as_str(), image)))
        .collect();

    let mut variants: Vec<PlannedVariant> = Vec::with_capacity(submitted.len());
    let mut positions: HashMap<VariantColor, usize> = HashMap::new();

    for draft in submitted {
        let Ok(color) = VariantColor::new(draft.color) else {
            continue;
        };

        let image = match (draft.image, stored.get(color.as_str())) {
            (Some(upload), _) => PlannedImage::Upload(upload),
            (None, Some(image)) => PlannedImage::Keep((*image).clone()),
            (None, None) => PlannedImage::None,
        };

        let planned = PlannedVariant {
            color: color.clone(),
            price_adjustment: draft.price_adjustment,
            is_sale: draft.is_sale,
            image,
        };

        match positions.get(&color) {
            Some(&index) => variants[index] = planned,
            None => {
                positions.insert(color, variants.len());
                variants.push(planned);
            }
        }
    }

    let orphaned = existing
        .iter()
        .filter_map(|v| v.image.as_ref())
        .filter(|image| {
            !variants
                .iter()
                .any(|planned| matches!(&planned.image, PlannedImage::Keep(kept) if kept.handle == image.handle))
        })
        .map(|image| image.handle.clone())
        .collect();

    VariantPlan { variants, orphaned }
}

impl VariantPlan {
    /// Performs the planned uploads through `upload` and returns the rows to
    /// store. Stops at the first failed upload.
    pub fn into_rows<F>(self, mut upload: F) -> ServiceResult<Vec<NewVariant>>
    where
        F: FnMut(&VariantColor, &ImageUpload) -> ServiceResult<ImageRef>,
    {
        self.variants
            .into_iter()
            .map(|planned| {
                let image = match planned.image {
                    PlannedImage::Keep(image) => Some(image),
                    PlannedImage::Upload(bytes) => Some(upload(&planned.color, &bytes)?),
                    PlannedImage::None => None,
                };
                Ok(NewVariant {
                    color: planned.color,
                    price_adjustment: planned.price_adjustment,
                    is_sale: planned.is_sale,
                    image,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{ImageUrl, ProductId, VariantId};
    use crate::services::ServiceError;
    use chrono::NaiveDateTime;
    use rust_decimal::Decimal;

    fn image(name: &str) -> ImageRef {
        ImageRef::new(
            ImageUrl::new(format!("https://media.test/variants/{name}.png")).unwrap(),
            ImageHandle::new(format!("variants/{name}.png")).unwrap(),
        )
    }

    fn stored(id: i32, color: &str, photo: Option<ImageRef>) -> Variant {
        Variant {
            id: VariantId::new(id).unwrap(),
            product_id: ProductId::new(1).unwrap(),
            color: VariantColor::new(color).unwrap(),
            price_adjustment: PriceAdjustment::ZERO,
            is_sale: false,
            image: photo,
            created_at: NaiveDateTime::default(),
            updated_at: NaiveDateTime::default(),
        }
    }

    #[test]
    fn resubmitted_color_keeps_its_image() {
        let existing = vec![stored(1, "Gold", Some(image("gold")))];

        let plan = plan_variants(&existing, vec![VariantDraft::new("Gold").on_sale(true)]);

        assert_eq!(plan.variants.len(), 1);
        assert_eq!(plan.variants[0].image, PlannedImage::Keep(image("gold")));
        assert!(plan.variants[0].is_sale);
        assert!(plan.orphaned.is_empty());
    }

    #[test]
    fn removed_color_image_is_orphaned() {
        let existing = vec![
            stored(1, "Gold", Some(image("gold"))),
            stored(2, "Silver", Some(image("silver"))),
        ];

        let plan = plan_variants(&existing, vec![VariantDraft::new("Gold")]);

        assert_eq!(plan.orphaned, vec![image("silver").handle]);
    }

    #[test]
    fn new_upload_orphans_the_replaced_image() {
        let existing = vec![stored(1, "Gold", Some(image("gold")))];

        let plan = plan_variants(
            &existing,
            vec![VariantDraft::new("Gold").with_image(ImageUpload::new(vec![1, 2, 3]))],
        );

        assert!(matches!(plan.variants[0].image, PlannedImage::Upload(_)));
        assert_eq!(plan.orphaned, vec![image("gold").handle]);
    }

    #[test]
    fn empty_colors_are_dropped() {
        let plan = plan_variants(
            &[],
            vec![VariantDraft::new("  "), VariantDraft::new(""), VariantDraft::new("Red")],
        );

        assert_eq!(plan.variants.len(), 1);
        assert_eq!(plan.variants[0].color.as_str(), "Red");
    }

    #[test]
    fn duplicate_color_last_write_wins_in_first_position() {
        let plan = plan_variants(
            &[],
            vec![
                VariantDraft::new("Gold").with_image(ImageUpload::new(vec![9])),
                VariantDraft::new("Silver"),
                VariantDraft::new("Gold")
                    .adjustment(PriceAdjustment::new(Decimal::from(10)).unwrap()),
            ],
        );

        let colors: Vec<&str> = plan.variants.iter().map(|v| v.color.as_str()).collect();
        assert_eq!(colors, vec!["Gold", "Silver"]);
        assert_eq!(plan.variants[0].price_adjustment.get(), Decimal::from(10));
        assert_eq!(plan.variants[0].image, PlannedImage::None);
    }

    #[test]
    fn new_color_without_upload_has_no_image() {
        let existing = vec![stored(1, "Gold", Some(image("gold")))];

        let plan = plan_variants(&existing, vec![VariantDraft::new("Blue")]);

        assert_eq!(plan.variants[0].image, PlannedImage::None);
        assert_eq!(plan.orphaned, vec![image("gold").handle]);
    }

    #[test]
    fn into_rows_uploads_in_order_and_stops_on_failure() {
        let plan = plan_variants(
            &[],
            vec![
                VariantDraft::new("Gold").with_image(ImageUpload::new(vec![1])),
                VariantDraft::new("Silver").with_image(ImageUpload::new(vec![2])),
            ],
        );

        let mut calls = Vec::new();
        let result = plan.into_rows(|color, _| {
            calls.push(color.as_str().to_string());
            if color.as_str() == "Silver" {
                Err(ServiceError::Internal)
            } else {
                Ok(image("uploaded"))
            }
        });

        assert_eq!(result, Err(ServiceError::Internal));
        assert_eq!(calls, vec!["Gold", "Silver"]);
    }

    #[test]
    fn into_rows_carries_kept_images() {
        let existing = vec![stored(1, "Gold", Some(image("gold")))];
        let plan = plan_variants(&existing, vec![VariantDraft::new("Gold")]);

        let rows = plan
            .into_rows(|_, _| panic!("nothing to upload"))
            .unwrap();

        assert_eq!(rows[0].image, Some(image("gold")));
    }
}
