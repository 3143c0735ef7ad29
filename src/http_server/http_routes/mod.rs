pub mod artists;
pub mod home;
pub mod shows;
pub mod venues;

use axum::{
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use serde::Deserialize;

use crate::http_server::error::HttpError;

/// Body of the venue and artist search forms
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SearchForm {
    pub search_term: String,
}

/// Numeric id from the path. Anything that is not an integer is a 404.
#[derive(Debug, Clone, Copy)]
pub struct EntityId(pub i64);

impl<S> FromRequestParts<S> for EntityId
where
    S: Send + Sync,
{
    type Rejection = HttpError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<i64>::from_request_parts(parts, state).await {
            Ok(Path(id)) => Ok(Self(id)),
            Err(rejection) => {
                log::debug!("Rejecting path {}: {}", parts.uri.path(), rejection);
                Err(HttpError::NotFound)
            }
        }
    }
}
