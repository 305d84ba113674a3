//! Shopping catalog admin library.
//!
//! CRUD over the Country → State → City hierarchy and product image
//! metadata, rendered as server-side fragments for the admin panel's modal
//! forms. Exposed as a library so the binary, the CLI and the integration
//! tests share one implementation.
//!
//! # Layers
//!
//! - [`db`] - `HierarchyStore` (Postgres and in-memory), product images
//! - [`services`] - modal-form controller and constraint message translation
//! - [`views`] - view renderers (askama HTML, JSON)
//! - [`routes`] - axum handlers
//! - [`middleware`] - session layer, admin and navigation guards

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod filters;
pub mod i18n;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod views;
