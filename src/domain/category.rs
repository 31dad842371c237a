use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{CategoryId, CategoryName, CategorySlug, TypeConstraintError};

/// Product grouping shown in the catalog sidebar.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    pub id: CategoryId,
    pub name: CategoryName,
    pub slug: CategorySlug,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Data required to insert or rename a [`Category`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewCategory {
    pub name: CategoryName,
    pub slug: CategorySlug,
}

impl NewCategory {
    /// Builds the insert payload, deriving the slug from the name.
    pub fn from_name(name: CategoryName) -> Result<Self, TypeConstraintError> {
        let slug = CategorySlug::from_name(name.as_str())?;
        Ok(Self { name, slug })
    }
}
