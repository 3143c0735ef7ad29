use std::sync::Arc;

use crate::database::Database;
use crate::ports::clock::Clock;
use crate::services::artist::ArtistService;
use crate::services::show::ShowService;
use crate::services::venue::VenueService;

pub struct AppState {
    pub db: Arc<Database>,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    pub fn venue_service(&self) -> VenueService {
        VenueService::new(self.db.clone(), self.clock.clone())
    }

    pub fn artist_service(&self) -> ArtistService {
        ArtistService::new(self.db.clone(), self.clock.clone())
    }

    pub fn show_service(&self) -> ShowService {
        ShowService::new(self.db.clone())
    }
}
