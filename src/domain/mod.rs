//! Persistence-agnostic catalog entities.

pub mod admin;
pub mod category;
pub mod image;
pub mod product;
pub mod types;
