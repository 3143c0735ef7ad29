use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDateTime;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};

use crate::database::Database;
use crate::entities;
use crate::forms::ShowForm;
use crate::services::{ServiceError, ServiceResult};
use crate::views::{ShowListing, format_start_time};

pub struct ShowService {
    db: Arc<Database>,
}

impl ShowService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Every show with both sides resolved, earliest first
    #[tracing::instrument(skip(self))]
    pub async fn list(&self) -> ServiceResult<Vec<ShowListing>> {
        let shows = entities::show::Entity::find()
            .order_by_asc(entities::show::Column::StartTime)
            .order_by_asc(entities::show::Column::Id)
            .all(&self.db.conn)
            .await?;

        let venues: HashMap<i64, entities::venue::Model> = entities::venue::Entity::find()
            .all(&self.db.conn)
            .await?
            .into_iter()
            .map(|venue| (venue.id, venue))
            .collect();
        let artists: HashMap<i64, entities::artist::Model> = entities::artist::Entity::find()
            .all(&self.db.conn)
            .await?
            .into_iter()
            .map(|artist| (artist.id, artist))
            .collect();

        let mut listings = Vec::with_capacity(shows.len());
        for show in shows {
            let (Some(venue), Some(artist)) =
                (venues.get(&show.venue_id), artists.get(&show.artist_id))
            else {
                log::warn!("Skipping show {} with a dangling reference", show.id);
                continue;
            };

            listings.push(ShowListing {
                venue_id: venue.id,
                venue_name: venue.name.clone(),
                artist_id: artist.id,
                artist_name: artist.name.clone(),
                artist_image_link: artist.image_link.clone(),
                start_time: format_start_time(show.start_time),
            });
        }

        Ok(listings)
    }

    /// Insert a show. Missing venues or artists are caught by the foreign keys
    /// and the insert is rolled back.
    #[tracing::instrument(skip(self))]
    pub async fn create(&self, form: ShowForm) -> ServiceResult<entities::show::Model> {
        let new_show = form.parse()?;

        let show = self
            .db
            .conn
            .transaction::<_, entities::show::Model, ServiceError>(|txn| {
                Box::pin(async move {
                    let show = entities::show::ActiveModel {
                        venue_id: Set(new_show.venue_id),
                        artist_id: Set(new_show.artist_id),
                        start_time: Set(new_show.start_time),
                        ..Default::default()
                    };
                    Ok(show.insert(txn).await?)
                })
            })
            .await?;

        log::info!(
            "Show created: artist {} at venue {} on {} (ID: {})",
            show.artist_id,
            show.venue_id,
            show.start_time,
            show.id
        );
        Ok(show)
    }
}

/// Number of upcoming shows per venue or artist id, picked by `key`
pub(crate) async fn upcoming_counts<C>(
    conn: &C,
    now: NaiveDateTime,
    key: fn(&entities::show::Model) -> i64,
) -> ServiceResult<HashMap<i64, u64>>
where
    C: ConnectionTrait,
{
    let shows = entities::show::Entity::find()
        .filter(entities::show::Column::StartTime.gt(now))
        .all(conn)
        .await?;

    let mut counts = HashMap::new();
    for show in &shows {
        *counts.entry(key(show)).or_insert(0) += 1;
    }
    Ok(counts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{at, insert_artist, insert_show, insert_venue, test_db};
    use sea_orm::PaginatorTrait;

    #[tokio::test]
    async fn test_list_empty() {
        let db = test_db().await;
        let service = ShowService::new(db);
        assert!(service.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_and_list() {
        let db = test_db().await;
        let venue = insert_venue(&db, "Hall A", "Springfield", "IL").await;
        let artist = insert_artist(&db, "Trio X").await;
        let service = ShowService::new(db.clone());

        let show = service
            .create(ShowForm {
                venue_id: venue.id.to_string(),
                artist_id: artist.id.to_string(),
                start_time: "2035-04-01 20:00:00".into(),
            })
            .await
            .unwrap();
        assert_eq!(show.start_time, at(2035, 4, 1, 20));

        let listings = service.list().await.unwrap();
        assert_eq!(
            listings,
            vec![ShowListing {
                venue_id: venue.id,
                venue_name: "Hall A".into(),
                artist_id: artist.id,
                artist_name: "Trio X".into(),
                artist_image_link: artist.image_link.clone(),
                start_time: "04/01/2035, 20:00:00".into(),
            }]
        );
    }

    #[tokio::test]
    async fn test_list_orders_by_start_time() {
        let db = test_db().await;
        let venue = insert_venue(&db, "Hall A", "Springfield", "IL").await;
        let early = insert_artist(&db, "Early").await;
        let late = insert_artist(&db, "Late").await;
        insert_show(&db, venue.id, late.id, at(2035, 5, 1, 20)).await;
        insert_show(&db, venue.id, early.id, at(2035, 4, 1, 20)).await;

        let names: Vec<_> = ShowService::new(db)
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|show| show.artist_name)
            .collect();
        assert_eq!(names, ["Early", "Late"]);
    }

    #[tokio::test]
    async fn test_create_with_missing_venue_persists_nothing() {
        let db = test_db().await;
        let artist = insert_artist(&db, "Trio X").await;
        let service = ShowService::new(db.clone());

        let result = service
            .create(ShowForm {
                venue_id: "999".into(),
                artist_id: artist.id.to_string(),
                start_time: "2035-04-01 20:00".into(),
            })
            .await;

        assert!(matches!(
            result,
            Err(ServiceError::ConstraintViolation(_))
        ));
        let count = entities::show::Entity::find()
            .count(&db.conn)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_create_with_missing_artist_persists_nothing() {
        let db = test_db().await;
        let venue = insert_venue(&db, "Hall A", "Springfield", "IL").await;
        let service = ShowService::new(db.clone());

        let result = service
            .create(ShowForm {
                venue_id: venue.id.to_string(),
                artist_id: "42".into(),
                start_time: "2035-04-01 20:00".into(),
            })
            .await;

        assert!(matches!(result, Err(ServiceError::ConstraintViolation(_))));
        let count = entities::show::Entity::find()
            .count(&db.conn)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_create_rejects_bad_form_before_touching_database() {
        let db = test_db().await;
        let service = ShowService::new(db);

        let result = service
            .create(ShowForm {
                venue_id: "1".into(),
                artist_id: "1".into(),
                start_time: "tomorrow".into(),
            })
            .await;

        assert!(matches!(result, Err(ServiceError::InvalidForm(_))));
    }

    #[tokio::test]
    async fn test_upcoming_counts() {
        let db = test_db().await;
        let hall = insert_venue(&db, "Hall A", "Springfield", "IL").await;
        let club = insert_venue(&db, "Club B", "Springfield", "IL").await;
        let artist = insert_artist(&db, "Trio X").await;
        insert_show(&db, hall.id, artist.id, at(2030, 1, 2, 20)).await;
        insert_show(&db, hall.id, artist.id, at(2030, 1, 3, 20)).await;
        insert_show(&db, club.id, artist.id, at(2029, 12, 31, 20)).await;

        let now = at(2030, 1, 1, 0);
        let by_venue = upcoming_counts(&db.conn, now, |show| show.venue_id)
            .await
            .unwrap();
        assert_eq!(by_venue.get(&hall.id), Some(&2));
        assert_eq!(by_venue.get(&club.id), None);

        let by_artist = upcoming_counts(&db.conn, now, |show| show.artist_id)
            .await
            .unwrap();
        assert_eq!(by_artist.get(&artist.id), Some(&2));
    }
}
