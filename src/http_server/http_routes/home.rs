use axum::response::Html;
use axum_extra::extract::cookie::CookieJar;

use crate::http_server::error::HttpError;
use crate::http_server::flash;
use crate::http_server::templates::{HomeTemplate, render};

pub async fn index(jar: CookieJar) -> Result<(CookieJar, Html<String>), HttpError> {
    let (jar, flash) = flash::take(jar);
    Ok((jar, render(&HomeTemplate { flash })?))
}
