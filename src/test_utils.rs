use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use sea_orm::{ActiveModelTrait, Set};

use crate::database::Database;
use crate::entities;
use crate::ports::clock::{Clock, MockClock};

pub async fn test_db() -> Arc<Database> {
    Arc::new(Database::in_memory().await.unwrap())
}

/// A clock frozen at `now`
pub fn fixed_clock(now: NaiveDateTime) -> Arc<dyn Clock> {
    let mut clock = MockClock::new();
    clock.expect_now().return_const(now);
    Arc::new(clock)
}

pub fn at(year: i32, month: u32, day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .unwrap()
        .and_hms_opt(hour, 0, 0)
        .unwrap()
}

pub async fn insert_venue(
    db: &Database,
    name: &str,
    city: &str,
    state: &str,
) -> entities::venue::Model {
    let venue = entities::venue::ActiveModel {
        name: Set(name.into()),
        genres: Set(Some("Jazz,Folk".into())),
        city: Set(city.into()),
        state: Set(state.into()),
        image_link: Set(format!("https://example.com/{}.jpg", name.replace(' ', "-"))),
        seeking_talent: Set(true),
        ..Default::default()
    };
    venue.insert(&db.conn).await.unwrap()
}

pub async fn insert_artist(db: &Database, name: &str) -> entities::artist::Model {
    let artist = entities::artist::ActiveModel {
        name: Set(name.into()),
        genres: Set(Some("Jazz".into())),
        image_link: Set(Some(format!(
            "https://example.com/{}.jpg",
            name.replace(' ', "-")
        ))),
        seeking_venue: Set(true),
        ..Default::default()
    };
    artist.insert(&db.conn).await.unwrap()
}

pub async fn insert_show(
    db: &Database,
    venue_id: i64,
    artist_id: i64,
    start_time: NaiveDateTime,
) -> entities::show::Model {
    let show = entities::show::ActiveModel {
        venue_id: Set(venue_id),
        artist_id: Set(artist_id),
        start_time: Set(start_time),
        ..Default::default()
    };
    show.insert(&db.conn).await.unwrap()
}
