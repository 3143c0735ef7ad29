use std::sync::Arc;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};

use crate::database::Database;
use crate::entities;
use crate::forms::{ArtistForm, join_genres, optional, split_genres};
use crate::ports::clock::Clock;
use crate::services::show::upcoming_counts;
use crate::services::{ServiceError, ServiceResult, name_matches, partition_shows};
use crate::views::{ArtistDetail, ArtistShow, ArtistSummary, EntitySummary, SearchResults, format_start_time};

pub struct ArtistService {
    db: Arc<Database>,
    clock: Arc<dyn Clock>,
}

impl ArtistService {
    pub fn new(db: Arc<Database>, clock: Arc<dyn Clock>) -> Self {
        Self { db, clock }
    }

    pub async fn list(&self) -> ServiceResult<Vec<ArtistSummary>> {
        let artists = entities::artist::Entity::find()
            .order_by_asc(entities::artist::Column::Id)
            .all(&self.db.conn)
            .await?;

        Ok(artists
            .into_iter()
            .map(|artist| ArtistSummary {
                id: artist.id,
                name: artist.name,
            })
            .collect())
    }

    /// Case-insensitive substring search on the artist name
    #[tracing::instrument(skip(self))]
    pub async fn search(&self, term: &str) -> ServiceResult<SearchResults> {
        let artists = entities::artist::Entity::find()
            .order_by_asc(entities::artist::Column::Id)
            .all(&self.db.conn)
            .await?;
        let counts =
            upcoming_counts(&self.db.conn, self.clock.now(), |show| show.artist_id).await?;

        let data: Vec<_> = artists
            .into_iter()
            .filter(|artist| name_matches(&artist.name, term))
            .map(|artist| EntitySummary {
                num_upcoming_shows: counts.get(&artist.id).copied().unwrap_or(0),
                id: artist.id,
                name: artist.name,
            })
            .collect();

        Ok(SearchResults {
            count: data.len(),
            data,
        })
    }

    pub async fn get(&self, id: i64) -> ServiceResult<Option<entities::artist::Model>> {
        Ok(entities::artist::Entity::find_by_id(id)
            .one(&self.db.conn)
            .await?)
    }

    /// Artist fields plus its shows split into upcoming and past.
    ///
    /// Each show's venue is resolved through the show's own `venue_id`.
    #[tracing::instrument(skip(self, artist), fields(artist_id = artist.id))]
    pub async fn detail(&self, artist: entities::artist::Model) -> ServiceResult<ArtistDetail> {
        let now = self.clock.now();

        let shows = entities::show::Entity::find()
            .filter(entities::show::Column::ArtistId.eq(artist.id))
            .order_by_asc(entities::show::Column::StartTime)
            .find_also_related(entities::venue::Entity)
            .all(&self.db.conn)
            .await?;

        let shows = shows.into_iter().filter_map(|(show, venue)| {
            let Some(venue) = venue else {
                log::warn!("Show {} points at missing venue {}", show.id, show.venue_id);
                return None;
            };
            Some((
                show.start_time,
                ArtistShow {
                    venue_id: venue.id,
                    venue_name: venue.name,
                    venue_image_link: venue.image_link,
                    start_time: format_start_time(show.start_time),
                },
            ))
        });
        let (upcoming_shows, past_shows) = partition_shows(shows, now);

        Ok(ArtistDetail {
            id: artist.id,
            name: artist.name,
            genres: split_genres(artist.genres.as_deref()),
            city: artist.city,
            state: artist.state,
            phone: artist.phone,
            website: artist.website,
            facebook_link: artist.facebook_link,
            seeking_venue: artist.seeking_venue,
            image_link: artist.image_link,
            upcoming_shows_count: upcoming_shows.len(),
            upcoming_shows,
            past_shows_count: past_shows.len(),
            past_shows,
        })
    }

    #[tracing::instrument(skip(self))]
    pub async fn create(&self, form: ArtistForm) -> ServiceResult<entities::artist::Model> {
        form.validate()?;

        let artist = self
            .db
            .conn
            .transaction::<_, entities::artist::Model, ServiceError>(|txn| {
                Box::pin(async move {
                    let mut artist = entities::artist::ActiveModel {
                        ..Default::default()
                    };
                    apply_form(&mut artist, form);
                    Ok(artist.insert(txn).await?)
                })
            })
            .await?;

        log::info!("Artist created: '{}' (ID: {})", artist.name, artist.id);
        Ok(artist)
    }

    #[tracing::instrument(skip(self))]
    pub async fn update(
        &self,
        id: i64,
        form: ArtistForm,
    ) -> ServiceResult<entities::artist::Model> {
        form.validate()?;

        let artist = self
            .db
            .conn
            .transaction::<_, entities::artist::Model, ServiceError>(|txn| {
                Box::pin(async move {
                    let artist = entities::artist::Entity::find_by_id(id)
                        .one(txn)
                        .await?
                        .ok_or(ServiceError::NotFound {
                            entity: "Artist",
                            id,
                        })?;

                    let mut artist: entities::artist::ActiveModel = artist.into();
                    apply_form(&mut artist, form);
                    Ok(artist.update(txn).await?)
                })
            })
            .await?;

        log::info!("Artist updated: '{}' (ID: {})", artist.name, artist.id);
        Ok(artist)
    }
}

fn apply_form(artist: &mut entities::artist::ActiveModel, form: ArtistForm) {
    artist.name = Set(form.name.trim().to_string());
    artist.city = Set(optional(&form.city));
    artist.state = Set(optional(&form.state));
    artist.phone = Set(optional(&form.phone));
    artist.genres = Set(join_genres(&form.genres));
    artist.image_link = Set(optional(&form.image_link));
    artist.facebook_link = Set(optional(&form.facebook_link));
    artist.website = Set(optional(&form.website));
    artist.seeking_venue = Set(form.seeking_venue);
}
