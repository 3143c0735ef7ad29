use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer};
use url::Url;

use crate::entities;

pub const GENRE_CHOICES: &[&str] = &[
    "Alternative",
    "Blues",
    "Classical",
    "Country",
    "Electronic",
    "Folk",
    "Funk",
    "Hip-Hop",
    "Heavy Metal",
    "Instrumental",
    "Jazz",
    "Musical Theatre",
    "Pop",
    "Punk",
    "R&B",
    "Reggae",
    "Rock n Roll",
    "Soul",
    "Other",
];

pub const STATE_CHOICES: &[&str] = &[
    "AL", "AK", "AZ", "AR", "CA", "CO", "CT", "DE", "DC", "FL", "GA", "HI", "ID", "IL", "IN", "IA",
    "KS", "KY", "LA", "ME", "MT", "NE", "NV", "NH", "NJ", "NM", "NY", "NC", "ND", "OH", "OK", "OR",
    "MD", "MA", "MI", "MN", "MS", "MO", "PA", "RI", "SC", "SD", "TN", "TX", "UT", "VT", "VA", "WA",
    "WV", "WI", "WY",
];

const START_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error("{0} is required")]
    Missing(&'static str),
    #[error("{0:?} is not a valid state")]
    InvalidState(String),
    #[error("{0:?} is not a known genre")]
    UnknownGenre(String),
    #[error("{field} must be an http(s) link, got {value:?}")]
    InvalidLink { field: &'static str, value: String },
    #[error("{field} must be a numeric id, got {value:?}")]
    InvalidId { field: &'static str, value: String },
    #[error("start_time must look like YYYY-MM-DD HH:MM:SS, got {0:?}")]
    InvalidStartTime(String),
}

/// Split the stored genre text back into a list.
///
/// Tokens are not trimmed, so joining the result with `,` gives back the
/// stored text unchanged.
pub fn split_genres(genres: Option<&str>) -> Vec<String> {
    match genres {
        Some(text) if !text.is_empty() => text.split(',').map(str::to_string).collect(),
        _ => Vec::new(),
    }
}

/// Join a genre selection into its stored form, `None` for an empty selection
pub fn join_genres(genres: &[String]) -> Option<String> {
    if genres.is_empty() {
        None
    } else {
        Some(genres.join(","))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct VenueForm {
    pub name: String,
    pub city: String,
    pub state: String,
    pub address: String,
    pub phone: String,
    pub image_link: String,
    pub genres: Vec<String>,
    pub facebook_link: String,
    pub website: String,
    #[serde(deserialize_with = "checkbox")]
    pub seeking_talent: bool,
    pub seeking_description: String,
}

impl VenueForm {
    pub fn validate(&self) -> Result<(), FormError> {
        required("name", &self.name)?;
        required("city", &self.city)?;
        required("state", &self.state)?;
        required("image_link", &self.image_link)?;
        validate_state(&self.state)?;
        validate_genres(&self.genres)?;
        validate_link("image_link", &self.image_link)?;
        validate_link("facebook_link", &self.facebook_link)?;
        validate_link("website", &self.website)?;
        Ok(())
    }
}

impl From<&entities::venue::Model> for VenueForm {
    fn from(venue: &entities::venue::Model) -> Self {
        Self {
            name: venue.name.clone(),
            city: venue.city.clone(),
            state: venue.state.clone(),
            address: venue.address.clone().unwrap_or_default(),
            phone: venue.phone.clone().unwrap_or_default(),
            image_link: venue.image_link.clone(),
            genres: split_genres(venue.genres.as_deref()),
            facebook_link: venue.facebook_link.clone().unwrap_or_default(),
            website: venue.website.clone().unwrap_or_default(),
            seeking_talent: venue.seeking_talent,
            seeking_description: venue.seeking_description.clone().unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ArtistForm {
    pub name: String,
    pub city: String,
    pub state: String,
    pub phone: String,
    pub image_link: String,
    pub genres: Vec<String>,
    pub facebook_link: String,
    pub website: String,
    #[serde(deserialize_with = "checkbox")]
    pub seeking_venue: bool,
}

impl ArtistForm {
    pub fn validate(&self) -> Result<(), FormError> {
        required("name", &self.name)?;
        if !self.state.trim().is_empty() {
            validate_state(&self.state)?;
        }
        validate_genres(&self.genres)?;
        validate_link("image_link", &self.image_link)?;
        validate_link("facebook_link", &self.facebook_link)?;
        validate_link("website", &self.website)?;
        Ok(())
    }
}

impl From<&entities::artist::Model> for ArtistForm {
    fn from(artist: &entities::artist::Model) -> Self {
        Self {
            name: artist.name.clone(),
            city: artist.city.clone().unwrap_or_default(),
            state: artist.state.clone().unwrap_or_default(),
            phone: artist.phone.clone().unwrap_or_default(),
            image_link: artist.image_link.clone().unwrap_or_default(),
            genres: split_genres(artist.genres.as_deref()),
            facebook_link: artist.facebook_link.clone().unwrap_or_default(),
            website: artist.website.clone().unwrap_or_default(),
            seeking_venue: artist.seeking_venue,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ShowForm {
    pub artist_id: String,
    pub venue_id: String,
    pub start_time: String,
}

/// A show submission after parsing, ready to insert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewShow {
    pub venue_id: i64,
    pub artist_id: i64,
    pub start_time: NaiveDateTime,
}

impl ShowForm {
    pub fn parse(&self) -> Result<NewShow, FormError> {
        Ok(NewShow {
            venue_id: parse_id("venue_id", &self.venue_id)?,
            artist_id: parse_id("artist_id", &self.artist_id)?,
            start_time: parse_start_time(&self.start_time)?,
        })
    }
}

/// Trimmed value, `None` when blank
pub fn optional(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn required(field: &'static str, value: &str) -> Result<(), FormError> {
    if value.trim().is_empty() {
        Err(FormError::Missing(field))
    } else {
        Ok(())
    }
}

fn validate_state(state: &str) -> Result<(), FormError> {
    if STATE_CHOICES.contains(&state.trim()) {
        Ok(())
    } else {
        Err(FormError::InvalidState(state.to_string()))
    }
}

// Genres are stored comma-joined, so only the fixed choices are accepted.
fn validate_genres(genres: &[String]) -> Result<(), FormError> {
    match genres
        .iter()
        .find(|genre| !GENRE_CHOICES.contains(&genre.as_str()))
    {
        Some(genre) => Err(FormError::UnknownGenre(genre.clone())),
        None => Ok(()),
    }
}

fn validate_link(field: &'static str, value: &str) -> Result<(), FormError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(());
    }
    match Url::parse(value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(()),
        _ => Err(FormError::InvalidLink {
            field,
            value: value.to_string(),
        }),
    }
}

fn parse_id(field: &'static str, value: &str) -> Result<i64, FormError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(FormError::Missing(field));
    }
    value.parse().map_err(|_| FormError::InvalidId {
        field,
        value: value.to_string(),
    })
}

fn parse_start_time(value: &str) -> Result<NaiveDateTime, FormError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(FormError::Missing("start_time"));
    }
    START_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .ok_or_else(|| FormError::InvalidStartTime(value.to_string()))
}

/// HTML checkboxes are only sent when ticked
fn checkbox<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(matches!(
        value.as_deref(),
        Some("y" | "on" | "true" | "1" | "yes")
    ))
}
