//! Caller-facing inputs and their validated conversions.
//!
//! This is where HTTP encodings end: indexed variant fields, string prices
//! and lenient query strings are turned into typed payloads here.

pub mod catalog;
pub mod categories;
pub mod products;
