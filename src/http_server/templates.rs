use askama::Template;
use axum::response::Html;

use crate::forms::{ArtistForm, GENRE_CHOICES, STATE_CHOICES, ShowForm, VenueForm};
use crate::http_server::error::HttpError;
use crate::views::{ArtistDetail, ArtistSummary, SearchResults, ShowListing, VenueArea, VenueDetail};

pub fn render<T: Template>(template: &T) -> Result<Html<String>, HttpError> {
    Ok(Html(template.render()?))
}

#[derive(Template)]
#[template(path = "pages/home.html")]
pub struct HomeTemplate {
    pub flash: Option<String>,
}

#[derive(Template)]
#[template(path = "pages/venues.html")]
pub struct VenuesTemplate {
    pub flash: Option<String>,
    pub areas: Vec<VenueArea>,
}

#[derive(Template)]
#[template(path = "pages/show_venue.html")]
pub struct VenueTemplate {
    pub flash: Option<String>,
    pub venue: VenueDetail,
}

#[derive(Template)]
#[template(path = "pages/artists.html")]
pub struct ArtistsTemplate {
    pub flash: Option<String>,
    pub artists: Vec<ArtistSummary>,
}

#[derive(Template)]
#[template(path = "pages/show_artist.html")]
pub struct ArtistTemplate {
    pub flash: Option<String>,
    pub artist: ArtistDetail,
}

#[derive(Template)]
#[template(path = "pages/shows.html")]
pub struct ShowsTemplate {
    pub flash: Option<String>,
    pub shows: Vec<ShowListing>,
}

/// Search results for either venues or artists; `kind` is the URL prefix
#[derive(Template)]
#[template(path = "pages/search.html")]
pub struct SearchTemplate {
    pub flash: Option<String>,
    pub kind: &'static str,
    pub search_term: String,
    pub results: SearchResults,
}

#[derive(Template)]
#[template(path = "forms/venue.html")]
pub struct VenueFormTemplate {
    pub flash: Option<String>,
    pub title: String,
    pub action: String,
    pub form: VenueForm,
    pub genre_choices: &'static [&'static str],
    pub state_choices: &'static [&'static str],
}

impl VenueFormTemplate {
    pub fn new(flash: Option<String>, title: String, action: String, form: VenueForm) -> Self {
        Self {
            flash,
            title,
            action,
            form,
            genre_choices: GENRE_CHOICES,
            state_choices: STATE_CHOICES,
        }
    }

    fn genre_selected(&self, genre: &str) -> bool {
        self.form.genres.iter().any(|selected| selected == genre)
    }

    fn state_selected(&self, state: &str) -> bool {
        self.form.state == state
    }
}

#[derive(Template)]
#[template(path = "forms/artist.html")]
pub struct ArtistFormTemplate {
    pub flash: Option<String>,
    pub title: String,
    pub action: String,
    pub form: ArtistForm,
    pub genre_choices: &'static [&'static str],
    pub state_choices: &'static [&'static str],
}

impl ArtistFormTemplate {
    pub fn new(flash: Option<String>, title: String, action: String, form: ArtistForm) -> Self {
        Self {
            flash,
            title,
            action,
            form,
            genre_choices: GENRE_CHOICES,
            state_choices: STATE_CHOICES,
        }
    }

    fn genre_selected(&self, genre: &str) -> bool {
        self.form.genres.iter().any(|selected| selected == genre)
    }

    fn state_selected(&self, state: &str) -> bool {
        self.form.state == state
    }
}

#[derive(Template)]
#[template(path = "forms/show.html")]
pub struct ShowFormTemplate {
    pub flash: Option<String>,
    pub form: ShowForm,
}

#[derive(Template)]
#[template(path = "errors/404.html")]
pub struct NotFoundTemplate {
    pub flash: Option<String>,
}

#[derive(Template)]
#[template(path = "errors/500.html")]
pub struct ServerErrorTemplate {
    pub flash: Option<String>,
}
