pub mod catalog;
pub mod categories;
pub mod errors;
pub mod observer;
pub mod products;
pub mod saga;
pub mod variants;

pub use errors::{ServiceError, ServiceResult};
