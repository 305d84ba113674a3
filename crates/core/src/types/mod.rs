//! Core types for the Shopping catalog.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod image;
pub mod level;
pub mod name;
pub mod price;
pub mod role;

pub use id::*;
pub use image::{ImageId, ImageUrls};
pub use level::HierarchyLevel;
pub use name::{EntityName, NameError};
pub use price::{CurrencyCode, Price};
pub use role::AdminRole;
