use std::sync::Arc;

use axum::{
    extract::State,
    response::{Html, Redirect},
};
use axum_extra::extract::{Form, cookie::CookieJar};

use crate::forms::ArtistForm;
use crate::http_server::error::HttpError;
use crate::http_server::flash;
use crate::http_server::http_routes::{EntityId, SearchForm};
use crate::http_server::state::AppState;
use crate::http_server::templates::{
    ArtistFormTemplate, ArtistTemplate, ArtistsTemplate, SearchTemplate, render,
};
use crate::services::ServiceError;

pub async fn artists(
    State(app_state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<(CookieJar, Html<String>), HttpError> {
    let (jar, flash) = flash::take(jar);
    let artists = app_state.artist_service().list().await?;
    Ok((jar, render(&ArtistsTemplate { flash, artists })?))
}

pub async fn search_artists(
    State(app_state): State<Arc<AppState>>,
    jar: CookieJar,
    Form(search): Form<SearchForm>,
) -> Result<(CookieJar, Html<String>), HttpError> {
    let (jar, flash) = flash::take(jar);
    let results = app_state
        .artist_service()
        .search(&search.search_term)
        .await?;

    let page = render(&SearchTemplate {
        flash,
        kind: "artists",
        search_term: search.search_term,
        results,
    })?;
    Ok((jar, page))
}

pub async fn show_artist(
    State(app_state): State<Arc<AppState>>,
    jar: CookieJar,
    EntityId(artist_id): EntityId,
) -> Result<(CookieJar, Html<String>), HttpError> {
    let service = app_state.artist_service();
    let artist = service.get(artist_id).await?.ok_or(HttpError::NotFound)?;
    let artist = service.detail(artist).await?;

    let (jar, flash) = flash::take(jar);
    Ok((jar, render(&ArtistTemplate { flash, artist })?))
}

pub async fn create_artist_form(jar: CookieJar) -> Result<(CookieJar, Html<String>), HttpError> {
    let (jar, flash) = flash::take(jar);
    let page = render(&ArtistFormTemplate::new(
        flash,
        "List a new artist".to_string(),
        "/artists/create".to_string(),
        ArtistForm::default(),
    ))?;
    Ok((jar, page))
}

pub async fn create_artist_submission(
    State(app_state): State<Arc<AppState>>,
    jar: CookieJar,
    Form(form): Form<ArtistForm>,
) -> (CookieJar, Redirect) {
    let name = form.name.clone();
    match app_state.artist_service().create(form).await {
        Ok(artist) => (
            flash::push(jar, format!("Artist {} was successfully listed!", artist.name)),
            Redirect::to("/"),
        ),
        Err(err) => {
            log::warn!("Failed to create artist '{}': {}", name, err);
            (
                flash::push(
                    jar,
                    format!("An error occurred. Artist {name} could not be listed. {err}"),
                ),
                Redirect::to("/artists/create"),
            )
        }
    }
}

pub async fn edit_artist_form(
    State(app_state): State<Arc<AppState>>,
    jar: CookieJar,
    EntityId(artist_id): EntityId,
) -> Result<(CookieJar, Html<String>), HttpError> {
    let artist = app_state
        .artist_service()
        .get(artist_id)
        .await?
        .ok_or(HttpError::NotFound)?;

    let (jar, flash) = flash::take(jar);
    let page = render(&ArtistFormTemplate::new(
        flash,
        format!("Edit artist {}", artist.name),
        format!("/artists/{artist_id}/edit"),
        ArtistForm::from(&artist),
    ))?;
    Ok((jar, page))
}

pub async fn edit_artist_submission(
    State(app_state): State<Arc<AppState>>,
    jar: CookieJar,
    EntityId(artist_id): EntityId,
    Form(form): Form<ArtistForm>,
) -> Result<(CookieJar, Redirect), HttpError> {
    let name = form.name.clone();
    match app_state.artist_service().update(artist_id, form).await {
        Ok(artist) => Ok((
            flash::push(jar, format!("Artist {} was successfully updated!", artist.name)),
            Redirect::to(&format!("/artists/{artist_id}")),
        )),
        Err(ServiceError::NotFound { .. }) => Err(HttpError::NotFound),
        Err(err) => {
            log::warn!("Failed to update artist {}: {}", artist_id, err);
            Ok((
                flash::push(
                    jar,
                    format!("An error occurred. Artist {name} could not be updated. {err}"),
                ),
                Redirect::to(&format!("/artists/{artist_id}/edit")),
            ))
        }
    }
}
