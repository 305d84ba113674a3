//! View rendering.
//!
//! The controller never touches templates directly: it builds a [`View`]
//! (a view name plus its model) and hands it to a [`ViewRenderer`].
//!
//! | name | model |
//! |------|-------|
//! | `countries/index` | all countries, optional notice |
//! | `countries/details` | one country, optional notice |
//! | `countries/details_state` | one state with its country, optional notice |
//! | `countries/_all_countries` | all countries (list fragment) |
//! | `countries/_all_states` | one country (states fragment) |
//! | `countries/_all_cities` | one state (cities fragment) |
//! | `countries/add_or_edit` | country form |
//! | `countries/add_state`, `countries/edit_state` | state form + country |
//! | `countries/add_city`, `countries/edit_city` | city form + state |

mod html;
mod json;

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use crate::models::{
    CityForm, Country, CountryForm, CountrySummary, FormModel, Notice, StateDetails, StateForm,
    StateSummary,
};

pub use html::HtmlRenderer;
pub use json::JsonRenderer;

/// A named view and the model it renders.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(tag = "view", content = "model")]
pub enum View<'a> {
    #[serde(rename = "countries/index")]
    Index {
        countries: &'a [Country],
        notice: Option<&'a Notice>,
    },
    #[serde(rename = "countries/details")]
    Details {
        country: &'a Country,
        notice: Option<&'a Notice>,
    },
    #[serde(rename = "countries/details_state")]
    DetailsState {
        details: &'a StateDetails,
        notice: Option<&'a Notice>,
    },
    #[serde(rename = "countries/_all_countries")]
    AllCountries { countries: &'a [Country] },
    #[serde(rename = "countries/_all_states")]
    AllStates { country: &'a Country },
    #[serde(rename = "countries/_all_cities")]
    AllCities { details: &'a StateDetails },
    #[serde(rename = "countries/add_or_edit")]
    AddOrEdit { form: &'a FormModel<CountryForm> },
    #[serde(rename = "countries/add_state")]
    AddState {
        form: &'a FormModel<StateForm>,
        country: &'a CountrySummary,
    },
    #[serde(rename = "countries/edit_state")]
    EditState {
        form: &'a FormModel<StateForm>,
        country: &'a CountrySummary,
    },
    #[serde(rename = "countries/add_city")]
    AddCity {
        form: &'a FormModel<CityForm>,
        state: &'a StateSummary,
    },
    #[serde(rename = "countries/edit_city")]
    EditCity {
        form: &'a FormModel<CityForm>,
        state: &'a StateSummary,
    },
}

impl View<'_> {
    /// Stable view name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Index { .. } => "countries/index",
            Self::Details { .. } => "countries/details",
            Self::DetailsState { .. } => "countries/details_state",
            Self::AllCountries { .. } => "countries/_all_countries",
            Self::AllStates { .. } => "countries/_all_states",
            Self::AllCities { .. } => "countries/_all_cities",
            Self::AddOrEdit { .. } => "countries/add_or_edit",
            Self::AddState { .. } => "countries/add_state",
            Self::EditState { .. } => "countries/edit_state",
            Self::AddCity { .. } => "countries/add_city",
            Self::EditCity { .. } => "countries/edit_city",
        }
    }
}

/// Errors produced while rendering a view.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("template error: {0}")]
    Template(#[from] askama::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Renders views to strings.
pub trait ViewRenderer: Send + Sync {
    /// Render `view` to its textual representation.
    ///
    /// # Errors
    ///
    /// Returns `RenderError` if the template or serializer fails.
    fn render(&self, view: &View<'_>) -> Result<String, RenderError>;
}

/// Output format of rendered views, chosen by `ADMIN_VIEW_FORMAT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewFormat {
    #[default]
    Html,
    Json,
}

impl ViewFormat {
    /// Build the renderer for this format.
    #[must_use]
    pub fn renderer(self) -> Arc<dyn ViewRenderer> {
        match self {
            Self::Html => Arc::new(HtmlRenderer),
            Self::Json => Arc::new(JsonRenderer),
        }
    }
}

impl std::str::FromStr for ViewFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "html" => Ok(Self::Html),
            "json" => Ok(Self::Json),
            other => Err(format!("unsupported view format: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_format_parse() {
        assert_eq!("HTML".parse::<ViewFormat>(), Ok(ViewFormat::Html));
        assert_eq!("json".parse::<ViewFormat>(), Ok(ViewFormat::Json));
        assert!("xml".parse::<ViewFormat>().is_err());
    }

    #[test]
    fn test_view_names_match_serialized_tag() {
        let countries: Vec<Country> = Vec::new();
        let view = View::AllCountries {
            countries: &countries,
        };
        let json = serde_json::to_value(view).unwrap_or_default();
        assert_eq!(json["view"], view.name());
    }
}
