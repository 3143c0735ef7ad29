use std::collections::HashMap;
use std::sync::Arc;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};

use crate::database::Database;
use crate::entities;
use crate::forms::{VenueForm, join_genres, optional, split_genres};
use crate::ports::clock::Clock;
use crate::services::show::upcoming_counts;
use crate::services::{ServiceError, ServiceResult, name_matches, partition_shows};
use crate::views::{EntitySummary, SearchResults, VenueArea, VenueDetail, VenueShow, format_start_time};

pub struct VenueService {
    db: Arc<Database>,
    clock: Arc<dyn Clock>,
}

impl VenueService {
    pub fn new(db: Arc<Database>, clock: Arc<dyn Clock>) -> Self {
        Self { db, clock }
    }

    /// All venues grouped by city and state
    #[tracing::instrument(skip(self))]
    pub async fn list_areas(&self) -> ServiceResult<Vec<VenueArea>> {
        let venues = entities::venue::Entity::find()
            .order_by_asc(entities::venue::Column::Id)
            .all(&self.db.conn)
            .await?;
        let counts = upcoming_counts(&self.db.conn, self.clock.now(), |show| show.venue_id).await?;

        Ok(group_by_area(venues, &counts))
    }

    /// Case-insensitive substring search on the venue name.
    ///
    /// Names are compared after loading; SQLite `LIKE` folds ASCII only.
    #[tracing::instrument(skip(self))]
    pub async fn search(&self, term: &str) -> ServiceResult<SearchResults> {
        let venues = entities::venue::Entity::find()
            .order_by_asc(entities::venue::Column::Id)
            .all(&self.db.conn)
            .await?;
        let counts = upcoming_counts(&self.db.conn, self.clock.now(), |show| show.venue_id).await?;

        let data: Vec<_> = venues
            .into_iter()
            .filter(|venue| name_matches(&venue.name, term))
            .map(|venue| summarize(venue, &counts))
            .collect();

        Ok(SearchResults {
            count: data.len(),
            data,
        })
    }

    pub async fn get(&self, id: i64) -> ServiceResult<Option<entities::venue::Model>> {
        Ok(entities::venue::Entity::find_by_id(id)
            .one(&self.db.conn)
            .await?)
    }

    /// Venue fields plus its shows split into upcoming and past
    #[tracing::instrument(skip(self, venue), fields(venue_id = venue.id))]
    pub async fn detail(&self, venue: entities::venue::Model) -> ServiceResult<VenueDetail> {
        let now = self.clock.now();

        let shows = entities::show::Entity::find()
            .filter(entities::show::Column::VenueId.eq(venue.id))
            .order_by_asc(entities::show::Column::StartTime)
            .find_also_related(entities::artist::Entity)
            .all(&self.db.conn)
            .await?;

        let shows = shows.into_iter().filter_map(|(show, artist)| {
            let Some(artist) = artist else {
                log::warn!("Show {} points at missing artist {}", show.id, show.artist_id);
                return None;
            };
            Some((
                show.start_time,
                VenueShow {
                    artist_id: artist.id,
                    artist_name: artist.name,
                    artist_image_link: artist.image_link,
                    start_time: format_start_time(show.start_time),
                },
            ))
        });
        let (upcoming_shows, past_shows) = partition_shows(shows, now);

        Ok(VenueDetail {
            id: venue.id,
            name: venue.name,
            genres: split_genres(venue.genres.as_deref()),
            address: venue.address,
            city: venue.city,
            state: venue.state,
            phone: venue.phone,
            website: venue.website,
            facebook_link: venue.facebook_link,
            seeking_talent: venue.seeking_talent,
            seeking_description: venue.seeking_description,
            image_link: venue.image_link,
            upcoming_shows_count: upcoming_shows.len(),
            upcoming_shows,
            past_shows_count: past_shows.len(),
            past_shows,
        })
    }

    #[tracing::instrument(skip(self))]
    pub async fn create(&self, form: VenueForm) -> ServiceResult<entities::venue::Model> {
        form.validate()?;

        let venue = self
            .db
            .conn
            .transaction::<_, entities::venue::Model, ServiceError>(|txn| {
                Box::pin(async move {
                    let mut venue = entities::venue::ActiveModel {
                        ..Default::default()
                    };
                    apply_form(&mut venue, form);
                    Ok(venue.insert(txn).await?)
                })
            })
            .await?;

        log::info!("Venue created: '{}' (ID: {})", venue.name, venue.id);
        Ok(venue)
    }

    #[tracing::instrument(skip(self))]
    pub async fn update(&self, id: i64, form: VenueForm) -> ServiceResult<entities::venue::Model> {
        form.validate()?;

        let venue = self
            .db
            .conn
            .transaction::<_, entities::venue::Model, ServiceError>(|txn| {
                Box::pin(async move {
                    let venue = entities::venue::Entity::find_by_id(id)
                        .one(txn)
                        .await?
                        .ok_or(ServiceError::NotFound {
                            entity: "Venue",
                            id,
                        })?;

                    let mut venue: entities::venue::ActiveModel = venue.into();
                    apply_form(&mut venue, form);
                    Ok(venue.update(txn).await?)
                })
            })
            .await?;

        log::info!("Venue updated: '{}' (ID: {})", venue.name, venue.id);
        Ok(venue)
    }

    /// Delete a venue. Venues that still have shows are kept and reported as
    /// a constraint violation.
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> ServiceResult<()> {
        self.db
            .conn
            .transaction::<_, (), ServiceError>(|txn| {
                Box::pin(async move {
                    let result = entities::venue::Entity::delete_by_id(id).exec(txn).await?;
                    if result.rows_affected == 0 {
                        return Err(ServiceError::NotFound {
                            entity: "Venue",
                            id,
                        });
                    }
                    Ok(())
                })
            })
            .await?;

        log::info!("Venue deleted (ID: {})", id);
        Ok(())
    }
}

/// Group venues by (city, state) in order of first appearance.
pub fn group_by_area(
    venues: Vec<entities::venue::Model>,
    upcoming: &HashMap<i64, u64>,
) -> Vec<VenueArea> {
    let mut areas: Vec<VenueArea> = Vec::new();

    for venue in venues {
        let position = areas
            .iter()
            .position(|area| area.city == venue.city && area.state == venue.state);
        let index = match position {
            Some(index) => index,
            None => {
                areas.push(VenueArea {
                    city: venue.city.clone(),
                    state: venue.state.clone(),
                    venues: Vec::new(),
                });
                areas.len() - 1
            }
        };
        areas[index].venues.push(summarize(venue, upcoming));
    }

    areas
}

fn summarize(venue: entities::venue::Model, upcoming: &HashMap<i64, u64>) -> EntitySummary {
    EntitySummary {
        num_upcoming_shows: upcoming.get(&venue.id).copied().unwrap_or(0),
        id: venue.id,
        name: venue.name,
    }
}

fn apply_form(venue: &mut entities::venue::ActiveModel, form: VenueForm) {
    venue.name = Set(form.name.trim().to_string());
    venue.genres = Set(join_genres(&form.genres));
    venue.address = Set(optional(&form.address));
    venue.city = Set(form.city.trim().to_string());
    venue.state = Set(form.state.trim().to_string());
    venue.phone = Set(optional(&form.phone));
    venue.website = Set(optional(&form.website));
    venue.image_link = Set(form.image_link.trim().to_string());
    venue.facebook_link = Set(optional(&form.facebook_link));
    venue.seeking_talent = Set(form.seeking_talent);
    venue.seeking_description = Set(optional(&form.seeking_description));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{at, fixed_clock, insert_artist, insert_show, insert_venue, test_db};
    use chrono::Duration;
    use sea_orm::PaginatorTrait;
    use std::collections::HashSet;

    fn venue_form(name: &str, city: &str, state: &str) -> VenueForm {
        VenueForm {
            name: name.into(),
            city: city.into(),
            state: state.into(),
            image_link: "https://example.com/venue.jpg".into(),
            genres: vec!["Jazz".into(), "Folk".into()],
            seeking_talent: true,
            ..Default::default()
        }
    }

    fn venue_model(id: i64, city: &str, state: &str) -> entities::venue::Model {
        entities::venue::Model {
            id,
            name: format!("Venue {id}"),
            genres: None,
            address: None,
            city: city.into(),
            state: state.into(),
            phone: None,
            website: None,
            image_link: "https://example.com/venue.jpg".into(),
            facebook_link: None,
            seeking_talent: true,
            seeking_description: None,
        }
    }

    #[test]
    fn test_group_by_area_keeps_first_seen_order() {
        let venues = vec![
            venue_model(1, "San Francisco", "CA"),
            venue_model(2, "New York", "NY"),
            venue_model(3, "San Francisco", "CA"),
            venue_model(4, "Springfield", "IL"),
            venue_model(5, "Springfield", "MO"),
        ];
        let upcoming = HashMap::from([(3, 2)]);

        let areas = group_by_area(venues, &upcoming);

        let keys: Vec<_> = areas
            .iter()
            .map(|area| (area.city.as_str(), area.state.as_str()))
            .collect();
        assert_eq!(
            keys,
            [
                ("San Francisco", "CA"),
                ("New York", "NY"),
                ("Springfield", "IL"),
                ("Springfield", "MO"),
            ]
        );
        let ids: Vec<_> = areas[0].venues.iter().map(|venue| venue.id).collect();
        assert_eq!(ids, [1, 3]);
        assert_eq!(areas[0].venues[0].num_upcoming_shows, 0);
        assert_eq!(areas[0].venues[1].num_upcoming_shows, 2);
    }

    #[test]
    fn test_group_by_area_partitions_every_venue() {
        let cities = [("A", "CA"), ("B", "NY"), ("A", "NY"), ("A", "CA")];
        let venues: Vec<_> = (1..=20)
            .map(|id| {
                let (city, state) = cities[id as usize % cities.len()];
                venue_model(id, city, state)
            })
            .collect();

        let areas = group_by_area(venues, &HashMap::new());

        let mut seen = HashSet::new();
        for area in &areas {
            for venue in &area.venues {
                assert!(seen.insert(venue.id), "venue {} listed twice", venue.id);
            }
        }
        assert_eq!(seen, (1..=20).collect::<HashSet<_>>());
        assert_eq!(areas.len(), 3);
    }

    #[test]
    fn test_group_by_area_empty() {
        assert!(group_by_area(Vec::new(), &HashMap::new()).is_empty());
    }

    #[tokio::test]
    async fn test_create_then_list_areas() {
        let db = test_db().await;
        let service = VenueService::new(db, fixed_clock(at(2030, 1, 1, 0)));

        service
            .create(venue_form("Hall A", "Springfield", "IL"))
            .await
            .unwrap();

        let areas = service.list_areas().await.unwrap();
        assert_eq!(
            areas,
            vec![VenueArea {
                city: "Springfield".into(),
                state: "IL".into(),
                venues: vec![EntitySummary {
                    id: 1,
                    name: "Hall A".into(),
                    num_upcoming_shows: 0,
                }],
            }]
        );
    }

    #[tokio::test]
    async fn test_list_areas_counts_upcoming_shows() {
        let db = test_db().await;
        let now = at(2030, 1, 1, 12);
        let hall = insert_venue(&db, "Hall A", "Springfield", "IL").await;
        let artist = insert_artist(&db, "Trio X").await;
        insert_show(&db, hall.id, artist.id, now + Duration::hours(1)).await;
        insert_show(&db, hall.id, artist.id, now).await;

        let areas = VenueService::new(db, fixed_clock(now))
            .list_areas()
            .await
            .unwrap();
        assert_eq!(areas[0].venues[0].num_upcoming_shows, 1);
    }

    #[tokio::test]
    async fn test_create_invalid_form_is_rejected() {
        let db = test_db().await;
        let service = VenueService::new(db.clone(), fixed_clock(at(2030, 1, 1, 0)));

        let result = service
            .create(VenueForm {
                image_link: String::new(),
                ..venue_form("Hall A", "Springfield", "IL")
            })
            .await;

        assert!(matches!(result, Err(ServiceError::InvalidForm(_))));
        let count = entities::venue::Entity::find()
            .count(&db.conn)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_detail_splits_upcoming_and_past() {
        let db = test_db().await;
        let now = at(2030, 1, 1, 12);
        let trio = insert_artist(&db, "Trio X").await;
        let quartet = insert_artist(&db, "Quartet Y").await;
        let hall = insert_venue(&db, "Hall A", "Springfield", "IL").await;
        insert_show(&db, hall.id, trio.id, now + Duration::hours(1)).await;
        insert_show(&db, hall.id, quartet.id, now - Duration::days(2)).await;
        insert_show(&db, hall.id, trio.id, now - Duration::days(1)).await;
        insert_show(&db, hall.id, quartet.id, now).await;

        let service = VenueService::new(db, fixed_clock(now));
        let venue = service.get(hall.id).await.unwrap().unwrap();
        let detail = service.detail(venue).await.unwrap();

        assert_eq!(detail.genres, ["Jazz", "Folk"]);
        assert_eq!(detail.upcoming_shows_count, 1);
        assert_eq!(detail.upcoming_shows[0].artist_name, "Trio X");
        assert_eq!(detail.upcoming_shows[0].artist_id, trio.id);
        assert_eq!(detail.upcoming_shows[0].start_time, "01/01/2030, 13:00:00");
        assert_eq!(detail.past_shows_count, 3);
        let past: Vec<_> = detail
            .past_shows
            .iter()
            .map(|show| show.artist_name.as_str())
            .collect();
        assert_eq!(past, ["Quartet Y", "Trio X", "Quartet Y"]);
    }

    #[tokio::test]
    async fn test_update_assigns_every_field() {
        let db = test_db().await;
        let service = VenueService::new(db, fixed_clock(at(2030, 1, 1, 0)));
        let venue = service
            .create(venue_form("Hall A", "Springfield", "IL"))
            .await
            .unwrap();

        let updated = service
            .update(
                venue.id,
                VenueForm {
                    address: "1 Main St".into(),
                    phone: "555-0100".into(),
                    website: "https://hall-a.example.com".into(),
                    facebook_link: "https://facebook.com/halla".into(),
                    seeking_talent: false,
                    seeking_description: "Booked solid".into(),
                    genres: vec!["Blues".into()],
                    ..venue_form("Hall B", "Chicago", "IL")
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.id, venue.id);
        assert_eq!(updated.name, "Hall B");
        assert_eq!(updated.city, "Chicago");
        assert_eq!(updated.genres.as_deref(), Some("Blues"));
        assert_eq!(updated.address.as_deref(), Some("1 Main St"));
        assert_eq!(updated.phone.as_deref(), Some("555-0100"));
        assert_eq!(updated.website.as_deref(), Some("https://hall-a.example.com"));
        assert!(!updated.seeking_talent);
        assert_eq!(updated.seeking_description.as_deref(), Some("Booked solid"));
        assert_eq!(service.get(venue.id).await.unwrap(), Some(updated));
    }

    #[tokio::test]
    async fn test_update_missing_venue() {
        let db = test_db().await;
        let service = VenueService::new(db, fixed_clock(at(2030, 1, 1, 0)));

        let result = service
            .update(42, venue_form("Hall A", "Springfield", "IL"))
            .await;
        assert!(matches!(
            result,
            Err(ServiceError::NotFound {
                entity: "Venue",
                id: 42
            })
        ));
    }

    #[tokio::test]
    async fn test_delete_without_shows_keeps_artists() {
        let db = test_db().await;
        let hall = insert_venue(&db, "Hall A", "Springfield", "IL").await;
        insert_artist(&db, "Trio X").await;
        let service = VenueService::new(db.clone(), fixed_clock(at(2030, 1, 1, 0)));

        service.delete(hall.id).await.unwrap();

        assert_eq!(service.get(hall.id).await.unwrap(), None);
        let artists = entities::artist::Entity::find()
            .count(&db.conn)
            .await
            .unwrap();
        assert_eq!(artists, 1);
    }

    #[tokio::test]
    async fn test_delete_with_shows_is_rolled_back() {
        let db = test_db().await;
        let hall = insert_venue(&db, "Hall A", "Springfield", "IL").await;
        let artist = insert_artist(&db, "Trio X").await;
        insert_show(&db, hall.id, artist.id, at(2030, 2, 1, 20)).await;
        let service = VenueService::new(db.clone(), fixed_clock(at(2030, 1, 1, 0)));

        let result = service.delete(hall.id).await;

        assert!(matches!(result, Err(ServiceError::ConstraintViolation(_))));
        assert!(service.get(hall.id).await.unwrap().is_some());
        let shows = entities::show::Entity::find()
            .count(&db.conn)
            .await
            .unwrap();
        assert_eq!(shows, 1);
    }

    #[tokio::test]
    async fn test_delete_missing_venue() {
        let db = test_db().await;
        let service = VenueService::new(db, fixed_clock(at(2030, 1, 1, 0)));
        assert!(matches!(
            service.delete(3).await,
            Err(ServiceError::NotFound { id: 3, .. })
        ));
    }

    #[tokio::test]
    async fn test_search_is_case_insensitive() {
        let db = test_db().await;
        insert_venue(&db, "The Musical Hop", "San Francisco", "CA").await;
        insert_venue(&db, "Park Square Live Music & Coffee", "San Francisco", "CA").await;
        insert_venue(&db, "The Dueling Pianos Bar", "New York", "NY").await;
        let service = VenueService::new(db, fixed_clock(at(2030, 1, 1, 0)));

        let results = service.search("hop").await.unwrap();
        assert_eq!(results.count, 1);
        assert_eq!(results.data[0].name, "The Musical Hop");

        let results = service.search("Music").await.unwrap();
        assert_eq!(results.count, 2);

        let results = service.search("").await.unwrap();
        assert_eq!(results.count, 3);
    }

    #[tokio::test]
    async fn test_search_folds_non_ascii_case() {
        let db = test_db().await;
        let elan = insert_venue(&db, "Café Élan", "Montréal", "NY").await;
        insert_venue(&db, "The Musical Hop", "San Francisco", "CA").await;
        let service = VenueService::new(db, fixed_clock(at(2030, 1, 1, 0)));

        let results = service.search("élan").await.unwrap();
        assert_eq!(results.count, 1);
        assert_eq!(results.data[0].id, elan.id);

        let results = service.search("CAFÉ").await.unwrap();
        assert_eq!(results.count, 1);
    }
}
