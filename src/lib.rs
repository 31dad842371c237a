//! Core library for the product catalog backend.
//!
//! This crate exposes the domain, persistence, media and service layers used
//! by the catalog web application: the product write orchestrator with its
//! variant reconciler, the catalog query engine and category management.

pub mod db;
pub mod domain;
pub mod dto;
pub mod error_conversions;
pub mod forms;
pub mod media;
pub mod models;
pub mod pagination;
pub mod repository;
pub mod schema;
pub mod services;
