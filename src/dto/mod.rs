//! Serializable read models handed to the rendering layer.

pub mod categories;
pub mod products;
