//! Askama-backed HTML renderer.

use askama::Template;

use super::{RenderError, View, ViewRenderer};
use crate::filters;
use crate::models::{
    CityForm, Country, CountryForm, CountrySummary, FormModel, Notice, StateDetails, StateForm,
    StateSummary,
};

// =============================================================================
// Templates
// =============================================================================

/// Full hierarchy page.
#[derive(Template)]
#[template(path = "countries/index.html")]
struct IndexTemplate<'a> {
    countries: &'a [Country],
    notice: Option<&'a Notice>,
}

/// Country page with its states.
#[derive(Template)]
#[template(path = "countries/details.html")]
struct DetailsTemplate<'a> {
    country: &'a Country,
    notice: Option<&'a Notice>,
}

/// State page with its cities.
#[derive(Template)]
#[template(path = "countries/details_state.html")]
struct DetailsStateTemplate<'a> {
    details: &'a StateDetails,
    notice: Option<&'a Notice>,
}

#[derive(Template)]
#[template(path = "countries/_all_countries.html")]
struct AllCountriesTemplate<'a> {
    countries: &'a [Country],
}

#[derive(Template)]
#[template(path = "countries/_all_states.html")]
struct AllStatesTemplate<'a> {
    country: &'a Country,
}

#[derive(Template)]
#[template(path = "countries/_all_cities.html")]
struct AllCitiesTemplate<'a> {
    details: &'a StateDetails,
}

#[derive(Template)]
#[template(path = "countries/add_or_edit.html")]
struct AddOrEditTemplate<'a> {
    model: &'a FormModel<CountryForm>,
}

#[derive(Template)]
#[template(path = "countries/add_state.html")]
struct AddStateTemplate<'a> {
    model: &'a FormModel<StateForm>,
    country: &'a CountrySummary,
}

#[derive(Template)]
#[template(path = "countries/edit_state.html")]
struct EditStateTemplate<'a> {
    model: &'a FormModel<StateForm>,
    country: &'a CountrySummary,
}

#[derive(Template)]
#[template(path = "countries/add_city.html")]
struct AddCityTemplate<'a> {
    model: &'a FormModel<CityForm>,
    state: &'a StateSummary,
}

#[derive(Template)]
#[template(path = "countries/edit_city.html")]
struct EditCityTemplate<'a> {
    model: &'a FormModel<CityForm>,
    state: &'a StateSummary,
}

// =============================================================================
// Renderer
// =============================================================================

/// Renders views with the askama templates in `crates/admin/templates`.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlRenderer;

impl ViewRenderer for HtmlRenderer {
    fn render(&self, view: &View<'_>) -> Result<String, RenderError> {
        let html = match *view {
            View::Index { countries, notice } => IndexTemplate { countries, notice }.render(),
            View::Details { country, notice } => DetailsTemplate { country, notice }.render(),
            View::DetailsState { details, notice } => {
                DetailsStateTemplate { details, notice }.render()
            }
            View::AllCountries { countries } => AllCountriesTemplate { countries }.render(),
            View::AllStates { country } => AllStatesTemplate { country }.render(),
            View::AllCities { details } => AllCitiesTemplate { details }.render(),
            View::AddOrEdit { form } => AddOrEditTemplate { model: form }.render(),
            View::AddState { form, country } => AddStateTemplate {
                model: form,
                country,
            }
            .render(),
            View::EditState { form, country } => EditStateTemplate {
                model: form,
                country,
            }
            .render(),
            View::AddCity { form, state } => AddCityTemplate { model: form, state }.render(),
            View::EditCity { form, state } => EditCityTemplate { model: form, state }.render(),
        }?;

        Ok(html)
    }
}
