//! Domain models for the catalog admin.

pub mod forms;
pub mod hierarchy;
pub mod notice;
pub mod product;
pub mod session;

pub use forms::{
    CityForm, CountryForm, DeleteOutcome, FieldError, FormModel, FormResponse, StateForm,
};
pub use hierarchy::{
    City, CityDetails, Country, CountrySummary, State, StateDetails, StateSummary,
};
pub use notice::{Notice, NoticeLevel, NoticeSigner};
pub use product::{Product, ProductImage, ProductImageView};
pub use session::{CurrentAdmin, keys as session_keys};
