//! Strongly-typed value objects used by catalog entities.
//!
//! Entities carry these wrappers instead of raw primitives so that titles,
//! prices and identifiers are checked once, at the boundary, and never again
//! deeper in the write path.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use thiserror::Error;
use validator::ValidateUrl;

/// Errors produced when attempting to construct constrained domain types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypeConstraintError {
    /// An identifier was zero or negative.
    #[error("{0} must be greater than zero")]
    NonPositiveId(&'static str),
    /// A string was empty or whitespace-only after trimming.
    #[error("{0} cannot be empty")]
    EmptyString(&'static str),
    /// A string was shorter or longer than allowed.
    #[error("{field} must be between {min} and {max} characters")]
    InvalidLength {
        field: &'static str,
        min: usize,
        max: usize,
    },
    /// URL validation failed.
    #[error("{0} must be a valid URL")]
    InvalidUrl(&'static str),
    /// A monetary amount fell outside its allowed range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange {
        field: &'static str,
        min: Decimal,
        max: Decimal,
    },
    /// A monetary amount carried more than two fractional digits.
    #[error("{0} cannot have more than two decimal places")]
    TooPrecise(&'static str),
    /// Only one half of an image reference (URL, handle) was present.
    #[error("{0} must have both a URL and a deletion handle, or neither")]
    IncompleteImage(&'static str),
    /// Catch-all for custom validation failures.
    #[error("invalid value: {0}")]
    InvalidValue(String),
}

fn trim_and_require_non_empty<S: Into<String>>(
    value: S,
    field: &'static str,
) -> Result<String, TypeConstraintError> {
    let trimmed = value.into().trim().to_string();
    if trimmed.is_empty() {
        Err(TypeConstraintError::EmptyString(field))
    } else {
        Ok(trimmed)
    }
}

/// Macro to generate lightweight newtypes for positive identifiers.
macro_rules! id_newtype {
    ($name:ident, $doc:expr, $field:expr) => {
        #[doc = $doc]
        #[derive(
            Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord,
        )]
        #[serde(transparent)]
        pub struct $name(i32);

        impl $name {
            /// Creates a new identifier ensuring it is greater than zero.
            pub fn new(value: i32) -> Result<Self, TypeConstraintError> {
                if value > 0 {
                    Ok(Self(value))
                } else {
                    Err(TypeConstraintError::NonPositiveId($field))
                }
            }

            /// Returns the raw `i32` backing this identifier.
            pub const fn get(self) -> i32 {
                self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl TryFrom<i32> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: i32) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for i32 {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl PartialEq<i32> for $name {
            fn eq(&self, other: &i32) -> bool {
                self.0 == *other
            }
        }
    };
}

/// Shared accessors for string-backed newtypes.
macro_rules! string_newtype_common {
    ($name:ident) => {
        impl $name {
            /// Borrow the value as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the wrapper and return the owned string.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::ops::Deref for $name {
            type Target = str;

            fn deref(&self) -> &Self::Target {
                self.as_str()
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.as_str()
            }
        }

        impl TryFrom<String> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl TryFrom<&str> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: &str) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                self.as_str() == *other
            }
        }
    };
}

macro_rules! non_empty_string_newtype {
    ($name:ident, $doc:expr, $field:expr) => {
        #[doc = $doc]
        #[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Constructs a trimmed, non-empty value.
            pub fn new<S: Into<String>>(value: S) -> Result<Self, TypeConstraintError> {
                trim_and_require_non_empty(value, $field).map(Self)
            }
        }

        string_newtype_common!($name);
    };
}

macro_rules! bounded_string_newtype {
    ($name:ident, $doc:expr, $field:expr, $min:expr, $max:expr) => {
        #[doc = $doc]
        #[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub const MIN_CHARS: usize = $min;
            pub const MAX_CHARS: usize = $max;

            /// Constructs a trimmed value whose character count is within bounds.
            pub fn new<S: Into<String>>(value: S) -> Result<Self, TypeConstraintError> {
                let trimmed = trim_and_require_non_empty(value, $field)?;
                let chars = trimmed.chars().count();
                if chars < Self::MIN_CHARS || chars > Self::MAX_CHARS {
                    return Err(TypeConstraintError::InvalidLength {
                        field: $field,
                        min: Self::MIN_CHARS,
                        max: Self::MAX_CHARS,
                    });
                }
                Ok(Self(trimmed))
            }
        }

        string_newtype_common!($name);
    };
}

id_newtype!(ProductId, "Unique identifier for a product.", "product_id");
id_newtype!(VariantId, "Unique identifier for a product variant.", "variant_id");
id_newtype!(
    CategoryId,
    "Unique identifier for a category.",
    "category_id"
);
id_newtype!(AdminId, "Unique identifier for an admin account.", "admin_id");

non_empty_string_newtype!(
    ProductCode,
    "Caller-supplied business code; free text, unique across products.",
    "product code"
);
non_empty_string_newtype!(
    ProductDescription,
    "Product description enforcing non-empty values.",
    "description"
);
non_empty_string_newtype!(
    VariantColor,
    "Variant color name; unique within its product.",
    "variant color"
);
non_empty_string_newtype!(
    ImageHandle,
    "Opaque media-store handle used to delete an uploaded image.",
    "image handle"
);
non_empty_string_newtype!(AdminUsername, "Admin login name.", "username");

bounded_string_newtype!(ProductTitle, "Product title, 5 to 200 characters.", "title", 5, 200);
bounded_string_newtype!(
    CategoryName,
    "Category display name, 3 to 100 characters.",
    "category name",
    3,
    100
);

/// Durable URL of an uploaded image.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct ImageUrl(String);

impl ImageUrl {
    /// Constructs a trimmed URL and validates its format.
    pub fn new<S: Into<String>>(value: S) -> Result<Self, TypeConstraintError> {
        let trimmed = trim_and_require_non_empty(value, "image url")?;
        if !trimmed.as_str().validate_url() {
            return Err(TypeConstraintError::InvalidUrl("image url"));
        }
        Ok(Self(trimmed))
    }
}

string_newtype_common!(ImageUrl);

/// URL slug derived from a category name.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct CategorySlug(String);

impl CategorySlug {
    /// Wraps an already-normalized slug, e.g. one read back from storage.
    pub fn new<S: Into<String>>(value: S) -> Result<Self, TypeConstraintError> {
        trim_and_require_non_empty(value, "category slug").map(Self)
    }

    /// Derives a slug: lowercase, runs of anything other than `[a-z0-9]`
    /// collapsed into one hyphen, no leading or trailing hyphens.
    ///
    /// Fails when nothing alphanumeric survives, e.g. `"&&&"`.
    pub fn from_name(name: &str) -> Result<Self, TypeConstraintError> {
        let mut slug = String::with_capacity(name.len());
        let mut pending_hyphen = false;
        for ch in name.to_lowercase().chars() {
            if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
                if pending_hyphen && !slug.is_empty() {
                    slug.push('-');
                }
                pending_hyphen = false;
                slug.push(ch);
            } else {
                pending_hyphen = true;
            }
        }

        if slug.is_empty() {
            return Err(TypeConstraintError::InvalidValue(format!(
                "cannot derive a slug from category name {name:?}"
            )));
        }
        Ok(Self(slug))
    }
}

string_newtype_common!(CategorySlug);

// 99,999,999.99 as 9_999_999_999 cents: lo/mid words of the 96-bit mantissa.
const MAX_MONEY: Decimal = Decimal::from_parts(1_410_065_407, 2, 0, false, 2);

fn require_cents_precision(
    value: Decimal,
    field: &'static str,
) -> Result<Decimal, TypeConstraintError> {
    let normalized = value.normalize();
    if normalized.scale() > 2 {
        return Err(TypeConstraintError::TooPrecise(field));
    }
    Ok(normalized)
}

fn decimal_to_cents(value: Decimal) -> i64 {
    let mut scaled = value;
    scaled.rescale(2);
    // Both money types are bounded well inside i64 cents.
    scaled.mantissa() as i64
}

/// Base price of a product: 0.01 to 99,999,999.99, at most two decimals.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    pub const MIN: Decimal = Decimal::from_parts(1, 0, 0, false, 2);
    pub const MAX: Decimal = MAX_MONEY;

    /// Validates range and precision.
    pub fn new(value: Decimal) -> Result<Self, TypeConstraintError> {
        let value = require_cents_precision(value, "base price")?;
        if value < Self::MIN || value > Self::MAX {
            return Err(TypeConstraintError::OutOfRange {
                field: "base price",
                min: Self::MIN,
                max: Self::MAX,
            });
        }
        Ok(Self(value))
    }

    /// Rebuilds a price from its stored integer cents.
    pub fn from_cents(cents: i64) -> Result<Self, TypeConstraintError> {
        Self::new(Decimal::new(cents, 2))
    }

    pub fn cents(self) -> i64 {
        decimal_to_cents(self.0)
    }

    pub const fn get(self) -> Decimal {
        self.0
    }
}

impl Display for Price {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<Decimal> for Price {
    type Error = TypeConstraintError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Signed amount added to the product base price for a variant.
#[derive(
    Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
#[serde(transparent)]
pub struct PriceAdjustment(Decimal);

impl PriceAdjustment {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn new(value: Decimal) -> Result<Self, TypeConstraintError> {
        let value = require_cents_precision(value, "price adjustment")?;
        if value.abs() > MAX_MONEY {
            return Err(TypeConstraintError::OutOfRange {
                field: "price adjustment",
                min: -MAX_MONEY,
                max: MAX_MONEY,
            });
        }
        Ok(Self(value))
    }

    pub fn from_cents(cents: i64) -> Result<Self, TypeConstraintError> {
        Self::new(Decimal::new(cents, 2))
    }

    pub fn cents(self) -> i64 {
        decimal_to_cents(self.0)
    }

    pub const fn get(self) -> Decimal {
        self.0
    }
}

impl Display for PriceAdjustment {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<Decimal> for PriceAdjustment {
    type Error = TypeConstraintError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}
