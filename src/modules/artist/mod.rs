/// Target entities and the upsert/dedup entity store contract
///
/// Every entity carries the provider natural ids that act as upsert keys;
/// the local surrogate id is assigned on first insert and never changes.
/// Upserts use coalesce semantics: omitted fields never clobber stored data.
pub mod domain;
pub mod infrastructure;

pub use domain::entities::{
    Album, AlbumPatch, Artist, ArtistPatch, Show, ShowPatch, ShowStatus, Song, SongPatch, Venue,
    VenuePatch,
};
pub use domain::repository::{ArtistStore, CatalogStore, ShowStore};
pub use infrastructure::persistence::MemoryEntityStore;
