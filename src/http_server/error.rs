use askama::Template;
use axum::{
    body::Body,
    http::{Response, StatusCode},
    response::{Html, IntoResponse},
};

use crate::http_server::templates::{NotFoundTemplate, ServerErrorTemplate};
use crate::services::ServiceError;

/// Failure of a page handler, rendered as the 404 or 500 page.
#[derive(Debug)]
pub enum HttpError {
    NotFound,
    Internal(color_eyre::Report),
}

impl From<ServiceError> for HttpError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::NotFound { .. } => Self::NotFound,
            other => Self::Internal(color_eyre::Report::new(other)),
        }
    }
}

impl From<askama::Error> for HttpError {
    fn from(err: askama::Error) -> Self {
        Self::Internal(color_eyre::Report::new(err))
    }
}

// Tell axum how to convert `HttpError` into a response.
impl IntoResponse for HttpError {
    fn into_response(self) -> Response<Body> {
        match self {
            HttpError::NotFound => {
                let page = NotFoundTemplate { flash: None }
                    .render()
                    .unwrap_or_else(|_| "Not Found".to_string());
                (StatusCode::NOT_FOUND, Html(page)).into_response()
            }
            HttpError::Internal(err) => {
                log::error!("{err:?}");

                let page = ServerErrorTemplate { flash: None }
                    .render()
                    .unwrap_or_else(|_| "Something went wrong".to_string());
                (StatusCode::INTERNAL_SERVER_ERROR, Html(page)).into_response()
            }
        }
    }
}

pub async fn not_found() -> HttpError {
    HttpError::NotFound
}
