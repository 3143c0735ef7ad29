use std::sync::Arc;

use axum::{
    extract::State,
    response::{Html, Redirect},
};
use axum_extra::extract::{Form, cookie::CookieJar};

use crate::forms::ShowForm;
use crate::http_server::error::HttpError;
use crate::http_server::flash;
use crate::http_server::state::AppState;
use crate::http_server::templates::{ShowFormTemplate, ShowsTemplate, render};

pub async fn shows(
    State(app_state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<(CookieJar, Html<String>), HttpError> {
    let (jar, flash) = flash::take(jar);
    let shows = app_state.show_service().list().await?;
    Ok((jar, render(&ShowsTemplate { flash, shows })?))
}

pub async fn create_show_form(jar: CookieJar) -> Result<(CookieJar, Html<String>), HttpError> {
    let (jar, flash) = flash::take(jar);
    let page = render(&ShowFormTemplate {
        flash,
        form: ShowForm::default(),
    })?;
    Ok((jar, page))
}

pub async fn create_show_submission(
    State(app_state): State<Arc<AppState>>,
    jar: CookieJar,
    Form(form): Form<ShowForm>,
) -> (CookieJar, Redirect) {
    match app_state.show_service().create(form).await {
        Ok(_) => (
            flash::push(jar, "Show was successfully listed!"),
            Redirect::to("/"),
        ),
        Err(err) => {
            log::warn!("Failed to create show: {}", err);
            (
                flash::push(jar, format!("An error occurred. Show could not be listed. {err}")),
                Redirect::to("/shows/create"),
            )
        }
    }
}
