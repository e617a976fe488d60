/// External data provider module
///
/// Thin typed adapters over the three external providers, each wrapped by
/// the matching rate limiter and circuit breaker. Adapters translate
/// provider failure classes into the shared error taxonomy and never retry
/// internally; retries are the job store's responsibility.
pub mod domain;
pub mod infrastructure;

pub use domain::models::{
    AlbumSummary, ArtistProfile, Attraction, EventInfo, Setlist, SetlistPage, TrackInfo, VenueInfo,
};
pub use domain::ports::{CatalogProvider, EventsProvider, SetlistProvider};
pub use infrastructure::http_client::GuardedClient;

use serde::{Deserialize, Serialize};

/// The three external data providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// Profile/catalog provider (client-credentials auth, high throughput)
    Catalog,
    /// Events/venues provider (static API key)
    Events,
    /// Historical-setlist provider (static API key, strict limits)
    Setlists,
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Provider::Catalog => write!(f, "catalog"),
            Provider::Events => write!(f, "events"),
            Provider::Setlists => write!(f, "setlists"),
        }
    }
}
