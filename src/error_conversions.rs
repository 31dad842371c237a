//! Error conversion glue between layers.
//!
//! The domain layer must not depend on service/repository error types, so
//! the `From` impls bridging them live here.

use crate::domain::types::TypeConstraintError;
use crate::forms::categories::CategoryFormError;
use crate::forms::products::ProductFormError;
use crate::repository::RepositoryError;
use crate::services::ServiceError;

impl From<TypeConstraintError> for ServiceError {
    fn from(val: TypeConstraintError) -> Self {
        ServiceError::Validation(val.to_string())
    }
}

impl From<TypeConstraintError> for RepositoryError {
    fn from(val: TypeConstraintError) -> Self {
        RepositoryError::ValidationError(val.to_string())
    }
}

impl From<ProductFormError> for ServiceError {
    fn from(val: ProductFormError) -> Self {
        ServiceError::Validation(val.to_string())
    }
}

impl From<CategoryFormError> for ServiceError {
    fn from(val: CategoryFormError) -> Self {
        ServiceError::Validation(val.to_string())
    }
}
