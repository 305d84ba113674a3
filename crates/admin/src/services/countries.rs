//! Modal-form controller for the Country → State → City hierarchy.
//!
//! Every action is either *render-form* (load the target, render a form
//! fragment) or *process-submission* (validate, perform exactly one write,
//! re-query the affected subtree and render its list fragment). Deletes
//! return a [`DeleteOutcome`] pointing at the parent page.

use thiserror::Error;
use tracing::instrument;

use shopping_core::{CityId, CountryId, EntityName, HierarchyLevel, NameError, StateId};

use super::translator::translate;
use crate::db::{HierarchyStore, RepositoryError};
use crate::i18n::{FormField, Messages};
use crate::models::{
    CityForm, CountryForm, CountrySummary, DeleteOutcome, FormModel, FormResponse, Notice,
    StateForm, StateSummary,
};
use crate::views::{RenderError, View, ViewRenderer};

/// Errors that abort a controller action.
///
/// Constraint failures on writes never show up here: they are reported
/// inside the returned form or notice.
#[derive(Debug, Error)]
pub enum ControllerError {
    /// Target entity, its parent, or a valid route ID is missing.
    #[error("not found")]
    NotFound,

    /// A read failed.
    #[error(transparent)]
    Repository(RepositoryError),

    /// The view could not be rendered.
    #[error(transparent)]
    Render(#[from] RenderError),
}

impl From<RepositoryError> for ControllerError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => Self::NotFound,
            other => Self::Repository(other),
        }
    }
}

/// Result type for controller actions.
pub type ControllerResult<T> = Result<T, ControllerError>;

/// Handles the country, state and city screens.
pub struct CountriesController<'a> {
    store: &'a dyn HierarchyStore,
    renderer: &'a dyn ViewRenderer,
    messages: Messages,
}

impl<'a> CountriesController<'a> {
    #[must_use]
    pub const fn new(
        store: &'a dyn HierarchyStore,
        renderer: &'a dyn ViewRenderer,
        messages: Messages,
    ) -> Self {
        Self {
            store,
            renderer,
            messages,
        }
    }

    // =========================================================================
    // Pages
    // =========================================================================

    /// Full hierarchy page.
    ///
    /// # Errors
    ///
    /// Returns `ControllerError` if the listing or rendering fails.
    #[instrument(skip(self))]
    pub async fn index(&self, notice: Option<Notice>) -> ControllerResult<String> {
        let countries = self.store.list_countries().await?;
        Ok(self.renderer.render(&View::Index {
            countries: &countries,
            notice: notice.as_ref(),
        })?)
    }

    /// Country page with its states and cities.
    ///
    /// # Errors
    ///
    /// Returns `ControllerError::NotFound` for a missing ID or country.
    #[instrument(skip(self))]
    pub async fn details(
        &self,
        id: Option<CountryId>,
        notice: Option<Notice>,
    ) -> ControllerResult<String> {
        let id = id.ok_or(ControllerError::NotFound)?;
        let country = self
            .store
            .get_country(id)
            .await?
            .ok_or(ControllerError::NotFound)?;

        Ok(self.renderer.render(&View::Details {
            country: &country,
            notice: notice.as_ref(),
        })?)
    }

    /// State page with its cities.
    ///
    /// # Errors
    ///
    /// Returns `ControllerError::NotFound` for a missing ID or state.
    #[instrument(skip(self))]
    pub async fn details_state(
        &self,
        id: Option<StateId>,
        notice: Option<Notice>,
    ) -> ControllerResult<String> {
        let id = id.ok_or(ControllerError::NotFound)?;
        let details = self
            .store
            .get_state(id)
            .await?
            .ok_or(ControllerError::NotFound)?;

        Ok(self.renderer.render(&View::DetailsState {
            details: &details,
            notice: notice.as_ref(),
        })?)
    }

    // =========================================================================
    // Countries
    // =========================================================================

    /// Country form: blank for `None`, pre-filled (with its concurrency
    /// token) for an existing country.
    ///
    /// # Errors
    ///
    /// Returns `ControllerError::NotFound` if the country does not exist.
    #[instrument(skip(self))]
    pub async fn country_form(&self, id: Option<CountryId>) -> ControllerResult<String> {
        let form = match id {
            None => CountryForm::default(),
            Some(id) => {
                let country = self
                    .store
                    .get_country(id)
                    .await?
                    .ok_or(ControllerError::NotFound)?;
                CountryForm {
                    id: country.id.as_i32(),
                    name: country.name,
                    version: country.version,
                }
            }
        };

        let model = FormModel::new(form);
        Ok(self.renderer.render(&View::AddOrEdit { form: &model })?)
    }

    /// Create (`route_id == None`) or rename a country.
    ///
    /// # Errors
    ///
    /// Returns `ControllerError::NotFound` if the route and form IDs differ
    /// or the country vanished.
    #[instrument(skip(self, form), fields(form_id = form.id))]
    pub async fn submit_country(
        &self,
        route_id: Option<CountryId>,
        form: CountryForm,
    ) -> ControllerResult<FormResponse> {
        if route_id.map_or(0, |id| id.as_i32()) != form.id {
            return Err(ControllerError::NotFound);
        }

        let mut model = FormModel::new(form);
        let Some(name) = self.check_name(&mut model) else {
            return self.invalid_country_form(&model);
        };

        let (result, notice) = match route_id {
            None => (
                self.store.create_country(&name).await.map(|_| ()),
                self.messages.record_created(),
            ),
            Some(id) => (
                self.store
                    .update_country(id, &name, model.form.version)
                    .await
                    .map(|_| ()),
                self.messages.record_updated(),
            ),
        };

        match result {
            Ok(()) => {
                tracing::info!(name = %name, "Country saved");
                let countries = self.store.list_countries().await?;
                let html = self.renderer.render(&View::AllCountries {
                    countries: &countries,
                })?;
                Ok(FormResponse::valid(html, Notice::confirmation(notice)))
            }
            Err(RepositoryError::ConcurrencyConflict) => {
                let id = route_id.ok_or(ControllerError::NotFound)?;
                if self.store.get_country(id).await?.is_none() {
                    return Err(ControllerError::NotFound);
                }
                tracing::warn!(country_id = %id, "Stale country edit rejected");
                model.form_error(self.messages.concurrency_conflict());
                self.invalid_country_form(&model)
            }
            Err(err) => {
                self.report_write_error(&mut model, err, HierarchyLevel::Country)?;
                self.invalid_country_form(&model)
            }
        }
    }

    fn invalid_country_form(&self, model: &FormModel<CountryForm>) -> ControllerResult<FormResponse> {
        let html = self.renderer.render(&View::AddOrEdit { form: model })?;
        Ok(FormResponse::invalid(html))
    }

    /// Delete a country without states.
    ///
    /// # Errors
    ///
    /// Returns `ControllerError::NotFound` if the country does not exist.
    #[instrument(skip(self))]
    pub async fn delete_country(&self, id: Option<CountryId>) -> ControllerResult<DeleteOutcome> {
        let id = id.ok_or(ControllerError::NotFound)?;
        if self.store.get_country(id).await?.is_none() {
            return Err(ControllerError::NotFound);
        }

        let result = self.store.delete_country(id).await;
        Ok(DeleteOutcome {
            path: "/Countries".to_string(),
            notice: self.delete_notice(result, HierarchyLevel::Country)?,
        })
    }

    // =========================================================================
    // States
    // =========================================================================

    /// Blank state form for a country.
    ///
    /// # Errors
    ///
    /// Returns `ControllerError::NotFound` if the country does not exist.
    #[instrument(skip(self))]
    pub async fn new_state_form(&self, country_id: Option<CountryId>) -> ControllerResult<String> {
        let country_id = country_id.ok_or(ControllerError::NotFound)?;
        let country = self
            .store
            .get_country(country_id)
            .await?
            .ok_or(ControllerError::NotFound)?;

        let model = FormModel::new(StateForm {
            country_id: country.id.as_i32(),
            ..StateForm::default()
        });
        Ok(self.renderer.render(&View::AddState {
            form: &model,
            country: &country.summary(),
        })?)
    }

    /// Create a state under `form.country_id`.
    ///
    /// # Errors
    ///
    /// Returns `ControllerError::NotFound` if the country does not exist.
    #[instrument(skip(self, form), fields(country_id = form.country_id))]
    pub async fn submit_new_state(&self, form: StateForm) -> ControllerResult<FormResponse> {
        let mut model = FormModel::new(form);

        let country = match model.form.country_id {
            id if id > 0 => self
                .store
                .get_country(CountryId::new(id))
                .await?
                .ok_or(ControllerError::NotFound)?
                .summary(),
            id => {
                self.reject_parent_id(&mut model, FormField::Country, id);
                unknown_country(id)
            }
        };

        let name = self.check_name(&mut model);
        let Some(name) = name.filter(|_| model.is_valid()) else {
            return self.invalid_state_form(&model, &country, false);
        };

        match self.store.create_state(country.id, &name).await {
            Ok(state) => {
                tracing::info!(state_id = %state.id, name = %name, "State created");
                self.states_fragment(country.id, self.messages.record_created())
                    .await
            }
            Err(err) => {
                self.report_write_error(&mut model, err, HierarchyLevel::State)?;
                self.invalid_state_form(&model, &country, false)
            }
        }
    }

    /// Edit form for an existing state.
    ///
    /// # Errors
    ///
    /// Returns `ControllerError::NotFound` if the state does not exist.
    #[instrument(skip(self))]
    pub async fn edit_state_form(&self, id: Option<StateId>) -> ControllerResult<String> {
        let id = id.ok_or(ControllerError::NotFound)?;
        let details = self
            .store
            .get_state(id)
            .await?
            .ok_or(ControllerError::NotFound)?;

        let model = FormModel::new(StateForm {
            id: details.state.id.as_i32(),
            country_id: details.state.country_id.as_i32(),
            name: details.state.name,
        });
        Ok(self.renderer.render(&View::EditState {
            form: &model,
            country: &details.country,
        })?)
    }

    /// Rename a state.
    ///
    /// # Errors
    ///
    /// Returns `ControllerError::NotFound` if the route and form IDs differ
    /// or the state does not exist.
    #[instrument(skip(self, form), fields(form_id = form.id))]
    pub async fn submit_state_edit(
        &self,
        route_id: Option<StateId>,
        form: StateForm,
    ) -> ControllerResult<FormResponse> {
        let id = route_id.ok_or(ControllerError::NotFound)?;
        if id.as_i32() != form.id {
            return Err(ControllerError::NotFound);
        }
        let details = self
            .store
            .get_state(id)
            .await?
            .ok_or(ControllerError::NotFound)?;

        let mut model = FormModel::new(StateForm {
            country_id: details.country.id.as_i32(),
            ..form
        });
        let Some(name) = self.check_name(&mut model) else {
            return self.invalid_state_form(&model, &details.country, true);
        };

        match self.store.update_state(id, &name).await {
            Ok(_) => {
                tracing::info!(state_id = %id, name = %name, "State updated");
                self.states_fragment(details.country.id, self.messages.record_updated())
                    .await
            }
            Err(err) => {
                self.report_write_error(&mut model, err, HierarchyLevel::State)?;
                self.invalid_state_form(&model, &details.country, true)
            }
        }
    }

    fn invalid_state_form(
        &self,
        model: &FormModel<StateForm>,
        country: &CountrySummary,
        editing: bool,
    ) -> ControllerResult<FormResponse> {
        let view = if editing {
            View::EditState {
                form: model,
                country,
            }
        } else {
            View::AddState {
                form: model,
                country,
            }
        };
        Ok(FormResponse::invalid(self.renderer.render(&view)?))
    }

    async fn states_fragment(
        &self,
        country_id: CountryId,
        message: &str,
    ) -> ControllerResult<FormResponse> {
        let country = self
            .store
            .get_country(country_id)
            .await?
            .ok_or(ControllerError::NotFound)?;
        let html = self.renderer.render(&View::AllStates { country: &country })?;
        Ok(FormResponse::valid(html, Notice::confirmation(message)))
    }

    /// Delete a state without cities.
    ///
    /// # Errors
    ///
    /// Returns `ControllerError::NotFound` if the state does not exist.
    #[instrument(skip(self))]
    pub async fn delete_state(&self, id: Option<StateId>) -> ControllerResult<DeleteOutcome> {
        let id = id.ok_or(ControllerError::NotFound)?;
        let details = self
            .store
            .get_state(id)
            .await?
            .ok_or(ControllerError::NotFound)?;

        let result = self.store.delete_state(id).await;
        Ok(DeleteOutcome {
            path: format!("/Countries/Details/{}", details.country.id),
            notice: self.delete_notice(result, HierarchyLevel::State)?,
        })
    }

    // =========================================================================
    // Cities
    // =========================================================================

    /// Blank city form for a state.
    ///
    /// # Errors
    ///
    /// Returns `ControllerError::NotFound` if the state does not exist.
    #[instrument(skip(self))]
    pub async fn new_city_form(&self, state_id: Option<StateId>) -> ControllerResult<String> {
        let state_id = state_id.ok_or(ControllerError::NotFound)?;
        let details = self
            .store
            .get_state(state_id)
            .await?
            .ok_or(ControllerError::NotFound)?;

        let model = FormModel::new(CityForm {
            state_id: details.state.id.as_i32(),
            ..CityForm::default()
        });
        Ok(self.renderer.render(&View::AddCity {
            form: &model,
            state: &details.summary(),
        })?)
    }

    /// Create a city under `form.state_id`.
    ///
    /// # Errors
    ///
    /// Returns `ControllerError::NotFound` if the state does not exist.
    #[instrument(skip(self, form), fields(state_id = form.state_id))]
    pub async fn submit_new_city(&self, form: CityForm) -> ControllerResult<FormResponse> {
        let mut model = FormModel::new(form);

        let state = match model.form.state_id {
            id if id > 0 => self
                .store
                .get_state(StateId::new(id))
                .await?
                .ok_or(ControllerError::NotFound)?
                .summary(),
            id => {
                self.reject_parent_id(&mut model, FormField::State, id);
                unknown_state(id)
            }
        };

        let name = self.check_name(&mut model);
        let Some(name) = name.filter(|_| model.is_valid()) else {
            return self.invalid_city_form(&model, &state, false);
        };

        match self.store.create_city(state.id, &name).await {
            Ok(city) => {
                tracing::info!(city_id = %city.id, name = %name, "City created");
                self.cities_fragment(state.id, self.messages.record_created())
                    .await
            }
            Err(err) => {
                self.report_write_error(&mut model, err, HierarchyLevel::City)?;
                self.invalid_city_form(&model, &state, false)
            }
        }
    }

    /// Edit form for an existing city.
    ///
    /// # Errors
    ///
    /// Returns `ControllerError::NotFound` if the city does not exist.
    #[instrument(skip(self))]
    pub async fn edit_city_form(&self, id: Option<CityId>) -> ControllerResult<String> {
        let id = id.ok_or(ControllerError::NotFound)?;
        let details = self
            .store
            .get_city(id)
            .await?
            .ok_or(ControllerError::NotFound)?;

        let model = FormModel::new(CityForm {
            id: details.city.id.as_i32(),
            state_id: details.city.state_id.as_i32(),
            name: details.city.name,
        });
        Ok(self.renderer.render(&View::EditCity {
            form: &model,
            state: &details.state,
        })?)
    }

    /// Rename a city.
    ///
    /// # Errors
    ///
    /// Returns `ControllerError::NotFound` if the route and form IDs differ
    /// or the city does not exist.
    #[instrument(skip(self, form), fields(form_id = form.id))]
    pub async fn submit_city_edit(
        &self,
        route_id: Option<CityId>,
        form: CityForm,
    ) -> ControllerResult<FormResponse> {
        let id = route_id.ok_or(ControllerError::NotFound)?;
        if id.as_i32() != form.id {
            return Err(ControllerError::NotFound);
        }
        let details = self
            .store
            .get_city(id)
            .await?
            .ok_or(ControllerError::NotFound)?;

        let mut model = FormModel::new(CityForm {
            state_id: details.state.id.as_i32(),
            ..form
        });
        let Some(name) = self.check_name(&mut model) else {
            return self.invalid_city_form(&model, &details.state, true);
        };

        match self.store.update_city(id, &name).await {
            Ok(_) => {
                tracing::info!(city_id = %id, name = %name, "City updated");
                self.cities_fragment(details.state.id, self.messages.record_updated())
                    .await
            }
            Err(err) => {
                self.report_write_error(&mut model, err, HierarchyLevel::City)?;
                self.invalid_city_form(&model, &details.state, true)
            }
        }
    }

    fn invalid_city_form(
        &self,
        model: &FormModel<CityForm>,
        state: &StateSummary,
        editing: bool,
    ) -> ControllerResult<FormResponse> {
        let view = if editing {
            View::EditCity { form: model, state }
        } else {
            View::AddCity { form: model, state }
        };
        Ok(FormResponse::invalid(self.renderer.render(&view)?))
    }

    async fn cities_fragment(
        &self,
        state_id: StateId,
        message: &str,
    ) -> ControllerResult<FormResponse> {
        let details = self
            .store
            .get_state(state_id)
            .await?
            .ok_or(ControllerError::NotFound)?;
        let html = self.renderer.render(&View::AllCities { details: &details })?;
        Ok(FormResponse::valid(html, Notice::confirmation(message)))
    }

    /// Delete a city.
    ///
    /// # Errors
    ///
    /// Returns `ControllerError::NotFound` if the city does not exist.
    #[instrument(skip(self))]
    pub async fn delete_city(&self, id: Option<CityId>) -> ControllerResult<DeleteOutcome> {
        let id = id.ok_or(ControllerError::NotFound)?;
        let details = self
            .store
            .get_city(id)
            .await?
            .ok_or(ControllerError::NotFound)?;

        let result = self.store.delete_city(id).await;
        Ok(DeleteOutcome {
            path: format!("/Countries/DetailsState/{}", details.state.id),
            notice: self.delete_notice(result, HierarchyLevel::City)?,
        })
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    /// Validate `model.form`'s name, recording a field error on failure.
    fn check_name<F: NamedForm>(&self, model: &mut FormModel<F>) -> Option<EntityName> {
        match EntityName::parse(model.form.name()) {
            Ok(name) => Some(name),
            Err(NameError::Empty) => {
                model.field_error(
                    FormField::Name.key(),
                    self.messages.field_required(FormField::Name),
                );
                None
            }
            Err(NameError::TooLong { max }) => {
                model.field_error(
                    FormField::Name.key(),
                    self.messages.field_too_long(FormField::Name, max),
                );
                None
            }
        }
    }

    /// Record an absent (`0`) or unreadable parent ID as a field error.
    fn reject_parent_id<F>(&self, model: &mut FormModel<F>, field: FormField, id: i32) {
        let message = if id == 0 {
            self.messages.field_required(field)
        } else {
            self.messages.field_invalid(field)
        };
        model.field_error(field.key(), message);
    }

    /// Attach a failed write to the form. A vanished target aborts with
    /// `NotFound`.
    fn report_write_error<F>(
        &self,
        model: &mut FormModel<F>,
        err: RepositoryError,
        level: HierarchyLevel,
    ) -> ControllerResult<()> {
        let message = translate(&err, level, &self.messages);
        match err {
            RepositoryError::NotFound => return Err(ControllerError::NotFound),
            RepositoryError::DuplicateName => {
                tracing::warn!(%level, "Duplicate name rejected");
                model.field_error(FormField::Name.key(), message);
            }
            other => {
                tracing::error!(%level, error = %other, "Catalog write failed");
                model.form_error(message);
            }
        }
        Ok(())
    }

    /// Notice for a finished delete.
    fn delete_notice(
        &self,
        result: Result<(), RepositoryError>,
        level: HierarchyLevel,
    ) -> ControllerResult<Notice> {
        match result {
            Ok(()) => {
                tracing::info!(%level, "Record deleted");
                Ok(Notice::info(self.messages.record_deleted()))
            }
            Err(RepositoryError::NotFound) => Err(ControllerError::NotFound),
            Err(err) => {
                tracing::warn!(%level, error = %err, "Delete rejected");
                Ok(Notice::danger(translate(&err, level, &self.messages)))
            }
        }
    }
}

/// Forms with a `name` field.
trait NamedForm {
    fn name(&self) -> &str;
}

impl NamedForm for CountryForm {
    fn name(&self) -> &str {
        &self.name
    }
}

impl NamedForm for StateForm {
    fn name(&self) -> &str {
        &self.name
    }
}

impl NamedForm for CityForm {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Parent reference used to redraw a form whose parent ID was missing.
fn unknown_country(id: i32) -> CountrySummary {
    CountrySummary {
        id: CountryId::new(id),
        name: String::new(),
    }
}

fn unknown_state(id: i32) -> StateSummary {
    StateSummary {
        id: StateId::new(id),
        country_id: CountryId::new(0),
        name: String::new(),
    }
}
