//! Country, state and city route handlers.
//!
//! Pages return HTML, form submissions return a JSON [`FormResponse`],
//! deletes redirect (303) to the parent page with the notice in the query
//! string.

use axum::{
    Form, Json, Router,
    extract::{Path, Query, State},
    response::{Html, Redirect},
    routing::{get, post},
};
use tracing::instrument;

use shopping_core::{CityId, CountryId, StateId};

use super::extract::{NoticeQuery, route_id};
use crate::error::AppError;
use crate::middleware::{NoDirectAccess, RequireAdmin};
use crate::models::{CityForm, CountryForm, FormResponse, StateForm};
use crate::state::AppState;

/// Build the countries router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/Countries", get(index))
        .route("/Countries/Details", get(details))
        .route("/Countries/Details/{id}", get(details))
        .route("/Countries/DetailsState", get(details_state))
        .route("/Countries/DetailsState/{id}", get(details_state))
        .route(
            "/Countries/AddOrEdit",
            get(country_form).post(submit_country),
        )
        .route(
            "/Countries/AddOrEdit/{id}",
            get(country_form).post(submit_country),
        )
        .route("/Countries/AddState", get(new_state_form).post(submit_new_state))
        .route("/Countries/AddState/{country_id}", get(new_state_form))
        .route("/Countries/EditState", get(edit_state_form))
        .route(
            "/Countries/EditState/{id}",
            get(edit_state_form).post(submit_state_edit),
        )
        .route("/Countries/AddCity", get(new_city_form).post(submit_new_city))
        .route("/Countries/AddCity/{state_id}", get(new_city_form))
        .route("/Countries/EditCity", get(edit_city_form))
        .route(
            "/Countries/EditCity/{id}",
            get(edit_city_form).post(submit_city_edit),
        )
        .route("/Countries/Delete", post(delete_country))
        .route("/Countries/Delete/{id}", post(delete_country))
        .route("/Countries/DeleteState", post(delete_state))
        .route("/Countries/DeleteState/{id}", post(delete_state))
        .route("/Countries/DeleteCity", post(delete_city))
        .route("/Countries/DeleteCity/{id}", post(delete_city))
}

// =============================================================================
// Pages
// =============================================================================

/// Full hierarchy page.
#[instrument(skip(state, admin), fields(admin = %admin.0.email))]
async fn index(
    State(state): State<AppState>,
    admin: RequireAdmin,
    Query(query): Query<NoticeQuery>,
) -> Result<Html<String>, AppError> {
    let html = state.countries().index(query.into_notice(state.notices())).await?;
    Ok(Html(html))
}

/// Country page with its states.
#[instrument(skip(state, admin), fields(admin = %admin.0.email))]
async fn details(
    State(state): State<AppState>,
    admin: RequireAdmin,
    id: Option<Path<String>>,
    Query(query): Query<NoticeQuery>,
) -> Result<Html<String>, AppError> {
    let id = route_id(id, CountryId::parse);
    let html = state.countries().details(id, query.into_notice(state.notices())).await?;
    Ok(Html(html))
}

/// State page with its cities.
#[instrument(skip(state, admin), fields(admin = %admin.0.email))]
async fn details_state(
    State(state): State<AppState>,
    admin: RequireAdmin,
    id: Option<Path<String>>,
    Query(query): Query<NoticeQuery>,
) -> Result<Html<String>, AppError> {
    let id = route_id(id, StateId::parse);
    let html = state
        .countries()
        .details_state(id, query.into_notice(state.notices()))
        .await?;
    Ok(Html(html))
}

// =============================================================================
// Countries
// =============================================================================

/// Country form. `/Countries/AddOrEdit` and `/Countries/AddOrEdit/0` open a
/// blank form.
#[instrument(skip(state, admin, _direct), fields(admin = %admin.0.email))]
async fn country_form(
    State(state): State<AppState>,
    admin: RequireAdmin,
    _direct: NoDirectAccess,
    id: Option<Path<String>>,
) -> Result<Html<String>, AppError> {
    let id = match country_route(id) {
        CountryRoute::New => None,
        CountryRoute::Existing(id) => Some(id),
        CountryRoute::Invalid => return Err(AppError::NotFound("country".to_string())),
    };
    let html = state.countries().country_form(id).await?;
    Ok(Html(html))
}

/// Create or rename a country.
#[instrument(skip(state, admin, form), fields(admin = %admin.0.email))]
async fn submit_country(
    State(state): State<AppState>,
    admin: RequireAdmin,
    id: Option<Path<String>>,
    Form(form): Form<CountryForm>,
) -> Result<Json<FormResponse>, AppError> {
    let id = match country_route(id) {
        CountryRoute::New => None,
        CountryRoute::Existing(id) => Some(id),
        CountryRoute::Invalid => return Err(AppError::NotFound("country".to_string())),
    };
    let response = state.countries().submit_country(id, form).await?;
    Ok(Json(response))
}

/// Delete a country.
#[instrument(skip(state, admin, _direct), fields(admin = %admin.0.email))]
async fn delete_country(
    State(state): State<AppState>,
    admin: RequireAdmin,
    _direct: NoDirectAccess,
    id: Option<Path<String>>,
) -> Result<Redirect, AppError> {
    let outcome = state
        .countries()
        .delete_country(route_id(id, CountryId::parse))
        .await?;
    Ok(Redirect::to(&outcome.location(state.notices())))
}

enum CountryRoute {
    New,
    Existing(CountryId),
    Invalid,
}

/// `AddOrEdit` treats an absent ID and `0` as "new".
fn country_route(raw: Option<Path<String>>) -> CountryRoute {
    match raw {
        None => CountryRoute::New,
        Some(Path(raw)) if raw.trim() == "0" => CountryRoute::New,
        Some(Path(raw)) => {
            CountryId::parse(&raw).map_or(CountryRoute::Invalid, CountryRoute::Existing)
        }
    }
}

// =============================================================================
// States
// =============================================================================

#[instrument(skip(state, admin, _direct), fields(admin = %admin.0.email))]
async fn new_state_form(
    State(state): State<AppState>,
    admin: RequireAdmin,
    _direct: NoDirectAccess,
    country_id: Option<Path<String>>,
) -> Result<Html<String>, AppError> {
    let html = state
        .countries()
        .new_state_form(route_id(country_id, CountryId::parse))
        .await?;
    Ok(Html(html))
}

#[instrument(skip(state, admin, form), fields(admin = %admin.0.email))]
async fn submit_new_state(
    State(state): State<AppState>,
    admin: RequireAdmin,
    Form(form): Form<StateForm>,
) -> Result<Json<FormResponse>, AppError> {
    Ok(Json(state.countries().submit_new_state(form).await?))
}

#[instrument(skip(state, admin, _direct), fields(admin = %admin.0.email))]
async fn edit_state_form(
    State(state): State<AppState>,
    admin: RequireAdmin,
    _direct: NoDirectAccess,
    id: Option<Path<String>>,
) -> Result<Html<String>, AppError> {
    let html = state
        .countries()
        .edit_state_form(route_id(id, StateId::parse))
        .await?;
    Ok(Html(html))
}

#[instrument(skip(state, admin, form), fields(admin = %admin.0.email))]
async fn submit_state_edit(
    State(state): State<AppState>,
    admin: RequireAdmin,
    id: Option<Path<String>>,
    Form(form): Form<StateForm>,
) -> Result<Json<FormResponse>, AppError> {
    let response = state
        .countries()
        .submit_state_edit(route_id(id, StateId::parse), form)
        .await?;
    Ok(Json(response))
}

#[instrument(skip(state, admin, _direct), fields(admin = %admin.0.email))]
async fn delete_state(
    State(state): State<AppState>,
    admin: RequireAdmin,
    _direct: NoDirectAccess,
    id: Option<Path<String>>,
) -> Result<Redirect, AppError> {
    let outcome = state
        .countries()
        .delete_state(route_id(id, StateId::parse))
        .await?;
    Ok(Redirect::to(&outcome.location(state.notices())))
}

// =============================================================================
// Cities
// =============================================================================

#[instrument(skip(state, admin, _direct), fields(admin = %admin.0.email))]
async fn new_city_form(
    State(state): State<AppState>,
    admin: RequireAdmin,
    _direct: NoDirectAccess,
    state_id: Option<Path<String>>,
) -> Result<Html<String>, AppError> {
    let html = state
        .countries()
        .new_city_form(route_id(state_id, StateId::parse))
        .await?;
    Ok(Html(html))
}

#[instrument(skip(state, admin, form), fields(admin = %admin.0.email))]
async fn submit_new_city(
    State(state): State<AppState>,
    admin: RequireAdmin,
    Form(form): Form<CityForm>,
) -> Result<Json<FormResponse>, AppError> {
    Ok(Json(state.countries().submit_new_city(form).await?))
}

#[instrument(skip(state, admin, _direct), fields(admin = %admin.0.email))]
async fn edit_city_form(
    State(state): State<AppState>,
    admin: RequireAdmin,
    _direct: NoDirectAccess,
    id: Option<Path<String>>,
) -> Result<Html<String>, AppError> {
    let html = state
        .countries()
        .edit_city_form(route_id(id, CityId::parse))
        .await?;
    Ok(Html(html))
}

#[instrument(skip(state, admin, form), fields(admin = %admin.0.email))]
async fn submit_city_edit(
    State(state): State<AppState>,
    admin: RequireAdmin,
    id: Option<Path<String>>,
    Form(form): Form<CityForm>,
) -> Result<Json<FormResponse>, AppError> {
    let response = state
        .countries()
        .submit_city_edit(route_id(id, CityId::parse), form)
        .await?;
    Ok(Json(response))
}

#[instrument(skip(state, admin, _direct), fields(admin = %admin.0.email))]
async fn delete_city(
    State(state): State<AppState>,
    admin: RequireAdmin,
    _direct: NoDirectAccess,
    id: Option<Path<String>>,
) -> Result<Redirect, AppError> {
    let outcome = state
        .countries()
        .delete_city(route_id(id, CityId::parse))
        .await?;
    Ok(Redirect::to(&outcome.location(state.notices())))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use axum::http::{StatusCode, header};
    use tower::ServiceExt;

    use shopping_core::{AdminRole, EntityName};

    use secrecy::SecretString;

    use super::super::test_support::{TEST_NOTICE_KEY, body_string, get, post_form, test_app};
    use crate::db::{HierarchyStore, MemoryHierarchyStore};
    use crate::models::{Notice, NoticeSigner};
    use crate::views::ViewFormat;

    const REFERER: Option<&str> = Some("http://localhost:3001/Countries");

    async fn seeded_store() -> Arc<MemoryHierarchyStore> {
        let store = Arc::new(MemoryHierarchyStore::new());
        let colombia = store
            .create_country(&EntityName::parse("Colombia").unwrap())
            .await
            .unwrap();
        store
            .create_state(colombia.id, &EntityName::parse("Antioquia").unwrap())
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn test_index_renders_hierarchy() {
        let app = test_app(seeded_store().await, Some(AdminRole::Admin), ViewFormat::Json);

        let response = app.oneshot(get("/Countries", None)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body["view"], "countries/index");
        assert_eq!(body["model"]["countries"][0]["name"], "Colombia");
    }

    fn signer() -> NoticeSigner {
        NoticeSigner::new(SecretString::from(TEST_NOTICE_KEY))
    }

    #[tokio::test]
    async fn test_index_shows_signed_notice_from_query() {
        let app = test_app(seeded_store().await, Some(AdminRole::Admin), ViewFormat::Html);
        let location = signer().redirect_location(&Notice::info("Registro borrado."), "/Countries");

        let response = app.oneshot(get(&location, None)).await.unwrap();

        let html = body_string(response).await;
        assert!(html.contains("alert-info"));
        assert!(html.contains("Registro borrado."));
    }

    #[tokio::test]
    async fn test_crafted_notice_is_not_shown() {
        let store = seeded_store().await;
        let forged = signer().redirect_location(&Notice::info("Registro borrado."), "/Countries");
        let forged = forged.replace("level=info", "level=danger");

        for uri in [
            "/Countries?level=danger&notice=Llame%20al%20555-0100.",
            forged.as_str(),
        ] {
            let app = test_app(store.clone(), Some(AdminRole::Admin), ViewFormat::Html);
            let response = app.oneshot(get(uri, None)).await.unwrap();

            assert_eq!(response.status(), StatusCode::OK, "{uri}");
            let html = body_string(response).await;
            assert!(!html.contains("alert-danger"), "{uri}");
            assert!(!html.contains("555-0100"), "{uri}");
        }
    }

    #[tokio::test]
    async fn test_missing_session_redirects_to_login() {
        let app = test_app(seeded_store().await, None, ViewFormat::Html);

        let response = app.oneshot(get("/Countries", None)).await.unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/auth/login");
    }

    #[tokio::test]
    async fn test_viewer_is_forbidden() {
        let app = test_app(seeded_store().await, Some(AdminRole::Viewer), ViewFormat::Html);

        let response = app.oneshot(get("/Countries", None)).await.unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_form_without_referer_is_redirected() {
        let app = test_app(seeded_store().await, Some(AdminRole::Admin), ViewFormat::Html);

        let response = app
            .oneshot(get("/Countries/AddOrEdit", None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/Countries");
    }

    #[tokio::test]
    async fn test_invalid_ids_are_not_found() {
        let store = seeded_store().await;

        for uri in [
            "/Countries/Details/abc",
            "/Countries/Details/0",
            "/Countries/Details",
            "/Countries/Details/999",
            "/Countries/DetailsState/-1",
            "/Countries/EditCity/5",
            "/Countries/AddOrEdit/x",
        ] {
            let app = test_app(store.clone(), Some(AdminRole::Admin), ViewFormat::Html);
            let response = app.oneshot(get(uri, REFERER)).await.unwrap();
            assert_eq!(response.status(), StatusCode::NOT_FOUND, "{uri}");
        }
    }

    #[tokio::test]
    async fn test_create_country_returns_list_fragment() {
        let store = seeded_store().await;
        let app = test_app(store.clone(), Some(AdminRole::Admin), ViewFormat::Html);

        let response = app
            .oneshot(post_form("/Countries/AddOrEdit", "id=0&version=0&name=Per%C3%BA"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body["isValid"], true);
        assert_eq!(body["notice"]["level"], "confirmation");
        assert_eq!(body["notice"]["message"], "Registro creado.");
        assert!(body["html"].as_str().unwrap().contains("Perú"));
        assert_eq!(store.list_countries().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_duplicate_country_redraws_form() {
        let app = test_app(seeded_store().await, Some(AdminRole::Admin), ViewFormat::Html);

        let response = app
            .oneshot(post_form("/Countries/AddOrEdit", "id=0&name=Colombia"))
            .await
            .unwrap();

        let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body["isValid"], false);
        assert!(
            body["html"]
                .as_str()
                .unwrap()
                .contains("Ya existe un país con el mismo nombre.")
        );
        assert!(body.get("notice").is_none());
    }

    #[tokio::test]
    async fn test_unreadable_country_id_redraws_state_form() {
        let store = seeded_store().await;
        let app = test_app(store.clone(), Some(AdminRole::Admin), ViewFormat::Json);

        let response = app
            .oneshot(post_form(
                "/Countries/AddState",
                "id=0&country_id=abc&name=Antioquia",
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body["isValid"], false);
        let form: serde_json::Value = serde_json::from_str(body["html"].as_str().unwrap()).unwrap();
        assert_eq!(form["view"], "countries/add_state");
        let error = &form["model"]["form"]["errors"][0];
        assert_eq!(error["field"], "country_id");
        assert_eq!(error["message"], "El valor del campo País no es válido.");
        let country = store.list_countries().await.unwrap().remove(0);
        assert_eq!(country.states.len(), 1);
    }

    #[tokio::test]
    async fn test_unreadable_version_redraws_country_form() {
        let store = seeded_store().await;
        let country_id = store.list_countries().await.unwrap()[0].id;
        let app = test_app(store.clone(), Some(AdminRole::Admin), ViewFormat::Html);

        let response = app
            .oneshot(post_form(
                &format!("/Countries/AddOrEdit/{country_id}"),
                &format!("id={country_id}&version=x&name=Colombia%20Norte"),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body["isValid"], false);
        let country = store.get_country(country_id).await.unwrap().unwrap();
        assert_eq!(country.name, "Colombia");
    }

    #[tokio::test]
    async fn test_edit_with_mismatched_id_is_not_found() {
        let app = test_app(seeded_store().await, Some(AdminRole::Admin), ViewFormat::Html);

        let response = app
            .oneshot(post_form("/Countries/AddOrEdit/1", "id=2&name=Colombia"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_country_with_states_redirects_with_danger_notice() {
        let store = seeded_store().await;
        let country_id = store.list_countries().await.unwrap()[0].id;
        let app = test_app(store.clone(), Some(AdminRole::Admin), ViewFormat::Html);

        let response = app
            .oneshot(post_form(&format!("/Countries/Delete/{country_id}"), ""))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let location = response.headers()[header::LOCATION].to_str().unwrap();
        assert!(location.starts_with("/Countries?level=danger&notice="));
        assert!(store.get_country(country_id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_delete_state_redirects_to_country_page() {
        let store = seeded_store().await;
        let country = store.list_countries().await.unwrap().remove(0);
        let state_id = country.states[0].id;
        let app = test_app(store.clone(), Some(AdminRole::Admin), ViewFormat::Html);

        let response = app
            .oneshot(post_form(&format!("/Countries/DeleteState/{state_id}"), ""))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let location = response.headers()[header::LOCATION]
            .to_str()
            .unwrap()
            .to_string();
        assert!(location.starts_with(&format!(
            "/Countries/Details/{}?level=info&notice=Registro%20borrado.&sig=",
            country.id
        )));
        assert!(store.get_state(state_id).await.unwrap().is_none());

        let app = test_app(store.clone(), Some(AdminRole::Admin), ViewFormat::Html);
        let page = app.oneshot(get(&location, None)).await.unwrap();
        let html = body_string(page).await;
        assert!(html.contains("alert-info"));
        assert!(html.contains("Registro borrado."));
    }
}
