use std::sync::Arc;

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{Html, Redirect},
};
use axum_extra::extract::{Form, cookie::CookieJar};
use serde::Serialize;

use crate::forms::VenueForm;
use crate::http_server::error::HttpError;
use crate::http_server::flash;
use crate::http_server::http_routes::{EntityId, SearchForm};
use crate::http_server::state::AppState;
use crate::http_server::templates::{
    SearchTemplate, VenueFormTemplate, VenueTemplate, VenuesTemplate, render,
};
use crate::services::ServiceError;

pub async fn venues(
    State(app_state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<(CookieJar, Html<String>), HttpError> {
    let (jar, flash) = flash::take(jar);
    let areas = app_state.venue_service().list_areas().await?;
    Ok((jar, render(&VenuesTemplate { flash, areas })?))
}

pub async fn search_venues(
    State(app_state): State<Arc<AppState>>,
    jar: CookieJar,
    Form(search): Form<SearchForm>,
) -> Result<(CookieJar, Html<String>), HttpError> {
    let (jar, flash) = flash::take(jar);
    let results = app_state
        .venue_service()
        .search(&search.search_term)
        .await?;

    let page = render(&SearchTemplate {
        flash,
        kind: "venues",
        search_term: search.search_term,
        results,
    })?;
    Ok((jar, page))
}

pub async fn show_venue(
    State(app_state): State<Arc<AppState>>,
    jar: CookieJar,
    EntityId(venue_id): EntityId,
) -> Result<(CookieJar, Html<String>), HttpError> {
    let service = app_state.venue_service();
    let venue = service.get(venue_id).await?.ok_or(HttpError::NotFound)?;
    let venue = service.detail(venue).await?;

    let (jar, flash) = flash::take(jar);
    Ok((jar, render(&VenueTemplate { flash, venue })?))
}

pub async fn create_venue_form(jar: CookieJar) -> Result<(CookieJar, Html<String>), HttpError> {
    let (jar, flash) = flash::take(jar);
    let page = render(&VenueFormTemplate::new(
        flash,
        "List a new venue".to_string(),
        "/venues/create".to_string(),
        VenueForm::default(),
    ))?;
    Ok((jar, page))
}

pub async fn create_venue_submission(
    State(app_state): State<Arc<AppState>>,
    jar: CookieJar,
    Form(form): Form<VenueForm>,
) -> (CookieJar, Redirect) {
    let name = form.name.clone();
    match app_state.venue_service().create(form).await {
        Ok(venue) => (
            flash::push(jar, format!("Venue {} was successfully listed!", venue.name)),
            Redirect::to("/"),
        ),
        Err(err) => {
            log::warn!("Failed to create venue '{}': {}", name, err);
            (
                flash::push(
                    jar,
                    format!("An error occurred. Venue {name} could not be listed. {err}"),
                ),
                Redirect::to("/venues/create"),
            )
        }
    }
}

pub async fn edit_venue_form(
    State(app_state): State<Arc<AppState>>,
    jar: CookieJar,
    EntityId(venue_id): EntityId,
) -> Result<(CookieJar, Html<String>), HttpError> {
    let venue = app_state
        .venue_service()
        .get(venue_id)
        .await?
        .ok_or(HttpError::NotFound)?;

    let (jar, flash) = flash::take(jar);
    let page = render(&VenueFormTemplate::new(
        flash,
        format!("Edit venue {}", venue.name),
        format!("/venues/{venue_id}/edit"),
        VenueForm::from(&venue),
    ))?;
    Ok((jar, page))
}

pub async fn edit_venue_submission(
    State(app_state): State<Arc<AppState>>,
    jar: CookieJar,
    EntityId(venue_id): EntityId,
    Form(form): Form<VenueForm>,
) -> Result<(CookieJar, Redirect), HttpError> {
    let name = form.name.clone();
    match app_state.venue_service().update(venue_id, form).await {
        Ok(venue) => Ok((
            flash::push(jar, format!("Venue {} was successfully updated!", venue.name)),
            Redirect::to(&format!("/venues/{venue_id}")),
        )),
        Err(ServiceError::NotFound { .. }) => Err(HttpError::NotFound),
        Err(err) => {
            log::warn!("Failed to update venue {}: {}", venue_id, err);
            Ok((
                flash::push(
                    jar,
                    format!("An error occurred. Venue {name} could not be updated. {err}"),
                ),
                Redirect::to(&format!("/venues/{venue_id}/edit")),
            ))
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub message: String,
}

/// Called from the venue page script; answers with JSON instead of a redirect
pub async fn delete_venue(
    State(app_state): State<Arc<AppState>>,
    jar: CookieJar,
    EntityId(venue_id): EntityId,
) -> (StatusCode, CookieJar, Json<DeleteResponse>) {
    match app_state.venue_service().delete(venue_id).await {
        Ok(()) => {
            let message = format!("Venue {venue_id} was successfully deleted.");
            (
                StatusCode::OK,
                flash::push(jar, &message),
                Json(DeleteResponse {
                    success: true,
                    message,
                }),
            )
        }
        Err(err) => {
            log::warn!("Failed to delete venue {}: {}", venue_id, err);
            let status = match err {
                ServiceError::NotFound { .. } => StatusCode::NOT_FOUND,
                ServiceError::ConstraintViolation(_) => StatusCode::CONFLICT,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };
            (
                status,
                jar,
                Json(DeleteResponse {
                    success: false,
                    message: format!("An error occurred. Venue {venue_id} could not be deleted. {err}"),
                }),
            )
        }
    }
}
