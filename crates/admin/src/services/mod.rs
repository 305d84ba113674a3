//! Business logic for the catalog admin.

pub mod countries;
pub mod translator;

pub use countries::{ControllerError, ControllerResult, CountriesController};
pub use translator::translate;
