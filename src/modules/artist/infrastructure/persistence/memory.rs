/// In-process implementation of the entity store traits
///
/// One struct implements ArtistStore, CatalogStore and ShowStore behind a
/// single lock, with per-provider-id unique indexes standing in for the
/// database unique constraints. Upsert-on-conflict is index-lookup-then-
/// apply; junction inserts are conflict-do-nothing set inserts.
use crate::modules::artist::domain::entities::{
    Album, AlbumPatch, Artist, ArtistPatch, Show, ShowPatch, ShowStatus, Song, SongPatch, Venue,
    VenuePatch,
};
use crate::modules::artist::domain::repository::{ArtistStore, CatalogStore, ShowStore};
use crate::shared::errors::{AppError, AppResult};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use uuid::Uuid;

#[derive(Default)]
struct EntityInner {
    artists: HashMap<Uuid, Artist>,
    artist_by_attraction: HashMap<String, Uuid>,

    albums: HashMap<Uuid, Album>,
    album_by_catalog: HashMap<String, Uuid>,

    songs: HashMap<Uuid, Song>,
    song_by_catalog: HashMap<String, Uuid>,
    song_artists: HashSet<(Uuid, Uuid)>,

    venues: HashMap<Uuid, Venue>,
    venue_by_events_id: HashMap<String, Uuid>,
    venue_by_setlist_id: HashMap<String, Uuid>,

    shows: HashMap<Uuid, Show>,
    show_by_event_id: HashMap<String, Uuid>,
    show_by_setlist_id: HashMap<String, Uuid>,
    show_artists: HashMap<(Uuid, Uuid), (bool, i32)>,
}

#[derive(Default)]
pub struct MemoryEntityStore {
    inner: Mutex<EntityInner>,
}

impl MemoryEntityStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn apply_artist_patch(artist: &mut Artist, patch: ArtistPatch) {
    if let Some(name) = patch.name {
        artist.name = name;
    }
    if let Some(slug) = patch.slug {
        artist.slug = slug;
    }
    if let Some(catalog_id) = patch.catalog_id {
        artist.catalog_id = Some(catalog_id);
    }
    if let Some(genres) = patch.genres {
        artist.genres = genres;
    }
    if let Some(image_url) = patch.image_url {
        artist.image_url = Some(image_url);
    }
    if let Some(popularity) = patch.popularity {
        artist.popularity = Some(popularity);
    }
    if let Some(followers) = patch.followers {
        artist.followers = Some(followers);
    }
    if let Some(synced_at) = patch.synced_at {
        artist.synced_at = Some(synced_at);
    }
    artist.updated_at = Utc::now();
}

fn apply_album_patch(album: &mut Album, patch: AlbumPatch) {
    if let Some(title) = patch.title {
        album.title = title;
    }
    if let Some(album_group) = patch.album_group {
        album.album_group = Some(album_group);
    }
    if let Some(release_date) = patch.release_date {
        album.release_date = Some(release_date);
    }
    if let Some(total_tracks) = patch.total_tracks {
        album.total_tracks = Some(total_tracks);
    }
    if let Some(image_url) = patch.image_url {
        album.image_url = Some(image_url);
    }
    album.updated_at = Utc::now();
}

fn apply_song_patch(song: &mut Song, patch: SongPatch) {
    if let Some(title) = patch.title {
        song.title = title;
    }
    if let Some(album_id) = patch.album_id {
        song.album_id = Some(album_id);
    }
    if let Some(duration_ms) = patch.duration_ms {
        song.duration_ms = Some(duration_ms);
    }
    if let Some(track_number) = patch.track_number {
        song.track_number = Some(track_number);
    }
    if let Some(explicit) = patch.explicit {
        song.explicit = Some(explicit);
    }
    song.updated_at = Utc::now();
}

fn apply_venue_patch(venue: &mut Venue, patch: VenuePatch) {
    if let Some(name) = patch.name {
        venue.name = name;
    }
    if let Some(city) = patch.city {
        venue.city = Some(city);
    }
    if let Some(country) = patch.country {
        venue.country = Some(country);
    }
    if let Some(events_venue_id) = patch.events_venue_id {
        venue.events_venue_id = Some(events_venue_id);
    }
    if let Some(setlist_venue_id) = patch.setlist_venue_id {
        venue.setlist_venue_id = Some(setlist_venue_id);
    }
    venue.updated_at = Utc::now();
}

fn apply_show_patch(show: &mut Show, patch: ShowPatch) {
    if let Some(name) = patch.name {
        show.name = Some(name);
    }
    if let Some(venue_id) = patch.venue_id {
        show.venue_id = Some(venue_id);
    }
    if let Some(date) = patch.date {
        show.date = Some(date);
    }
    if let Some(starts_at) = patch.starts_at {
        show.starts_at = Some(starts_at);
    }
    if let Some(status) = patch.status {
        show.status = status;
    }
    if let Some(url) = patch.url {
        show.url = Some(url);
    }
    show.updated_at = Utc::now();
}

#[async_trait]
impl ArtistStore for MemoryEntityStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Artist>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.artists.get(&id).cloned())
    }

    async fn find_by_attraction_id(&self, attraction_id: &str) -> AppResult<Option<Artist>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .artist_by_attraction
            .get(attraction_id)
            .and_then(|id| inner.artists.get(id))
            .cloned())
    }

    async fn upsert_by_attraction_id(
        &self,
        attraction_id: &str,
        name: &str,
        patch: ArtistPatch,
    ) -> AppResult<Artist> {
        let mut inner = self.inner.lock().unwrap();

        if let Some(&id) = inner.artist_by_attraction.get(attraction_id) {
            let artist = inner
                .artists
                .get_mut(&id)
                .ok_or_else(|| AppError::StoreError(format!("artist {} index dangling", id)))?;
            artist.name = name.to_string();
            apply_artist_patch(artist, patch);
            return Ok(artist.clone());
        }

        let now = Utc::now();
        let mut artist = Artist {
            id: Uuid::new_v4(),
            name: name.to_string(),
            slug: crate::shared::utils::slug::slugify(name),
            attraction_id: Some(attraction_id.to_string()),
            catalog_id: None,
            genres: Vec::new(),
            image_url: None,
            popularity: None,
            followers: None,
            synced_at: None,
            created_at: now,
            updated_at: now,
        };
        apply_artist_patch(&mut artist, patch);

        inner
            .artist_by_attraction
            .insert(attraction_id.to_string(), artist.id);
        inner.artists.insert(artist.id, artist.clone());
        Ok(artist)
    }
}

#[async_trait]
impl CatalogStore for MemoryEntityStore {
    async fn upsert_album(
        &self,
        artist_id: Uuid,
        catalog_id: &str,
        title: &str,
        patch: AlbumPatch,
    ) -> AppResult<Album> {
        let mut inner = self.inner.lock().unwrap();

        if let Some(&id) = inner.album_by_catalog.get(catalog_id) {
            let album = inner
                .albums
                .get_mut(&id)
                .ok_or_else(|| AppError::StoreError(format!("album {} index dangling", id)))?;
            album.title = title.to_string();
            apply_album_patch(album, patch);
            return Ok(album.clone());
        }

        let now = Utc::now();
        let mut album = Album {
            id: Uuid::new_v4(),
            artist_id,
            catalog_id: catalog_id.to_string(),
            title: title.to_string(),
            album_group: None,
            release_date: None,
            total_tracks: None,
            image_url: None,
            created_at: now,
            updated_at: now,
        };
        apply_album_patch(&mut album, patch);

        inner
            .album_by_catalog
            .insert(catalog_id.to_string(), album.id);
        inner.albums.insert(album.id, album.clone());
        Ok(album)
    }

    async fn upsert_song(
        &self,
        catalog_id: &str,
        title: &str,
        patch: SongPatch,
    ) -> AppResult<Song> {
        let mut inner = self.inner.lock().unwrap();

        if let Some(&id) = inner.song_by_catalog.get(catalog_id) {
            let song = inner
                .songs
                .get_mut(&id)
                .ok_or_else(|| AppError::StoreError(format!("song {} index dangling", id)))?;
            song.title = title.to_string();
            apply_song_patch(song, patch);
            return Ok(song.clone());
        }

        let now = Utc::now();
        let mut song = Song {
            id: Uuid::new_v4(),
            catalog_id: catalog_id.to_string(),
            title: title.to_string(),
            album_id: None,
            duration_ms: None,
            track_number: None,
            explicit: None,
            created_at: now,
            updated_at: now,
        };
        apply_song_patch(&mut song, patch);

        inner.song_by_catalog.insert(catalog_id.to_string(), song.id);
        inner.songs.insert(song.id, song.clone());
        Ok(song)
    }

    async fn link_song_artist(&self, song_id: Uuid, artist_id: Uuid) -> AppResult<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.song_artists.insert((song_id, artist_id));
        Ok(())
    }

    async fn songs_for_artist(&self, artist_id: Uuid) -> AppResult<Vec<Song>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .song_artists
            .iter()
            .filter(|(_, a)| *a == artist_id)
            .filter_map(|(s, _)| inner.songs.get(s))
            .cloned()
            .collect())
    }

    async fn albums_for_artist(&self, artist_id: Uuid) -> AppResult<Vec<Album>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .albums
            .values()
            .filter(|a| a.artist_id == artist_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ShowStore for MemoryEntityStore {
    async fn upsert_venue_by_events_id(
        &self,
        events_venue_id: &str,
        name: &str,
        patch: VenuePatch,
    ) -> AppResult<Venue> {
        let mut inner = self.inner.lock().unwrap();

        if let Some(&id) = inner.venue_by_events_id.get(events_venue_id) {
            let venue = inner
                .venues
                .get_mut(&id)
                .ok_or_else(|| AppError::StoreError(format!("venue {} index dangling", id)))?;
            venue.name = name.to_string();
            apply_venue_patch(venue, patch);
            return Ok(venue.clone());
        }

        let now = Utc::now();
        let mut venue = Venue {
            id: Uuid::new_v4(),
            events_venue_id: Some(events_venue_id.to_string()),
            setlist_venue_id: None,
            name: name.to_string(),
            city: None,
            country: None,
            created_at: now,
            updated_at: now,
        };
        apply_venue_patch(&mut venue, patch);

        if let Some(setlist_id) = &venue.setlist_venue_id {
            inner
                .venue_by_setlist_id
                .insert(setlist_id.clone(), venue.id);
        }
        inner
            .venue_by_events_id
            .insert(events_venue_id.to_string(), venue.id);
        inner.venues.insert(venue.id, venue.clone());
        Ok(venue)
    }

    async fn upsert_venue_by_setlist_id(
        &self,
        setlist_venue_id: &str,
        name: &str,
        patch: VenuePatch,
    ) -> AppResult<Venue> {
        let mut inner = self.inner.lock().unwrap();

        if let Some(&id) = inner.venue_by_setlist_id.get(setlist_venue_id) {
            let venue = inner
                .venues
                .get_mut(&id)
                .ok_or_else(|| AppError::StoreError(format!("venue {} index dangling", id)))?;
            venue.name = name.to_string();
            apply_venue_patch(venue, patch);
            return Ok(venue.clone());
        }

        let now = Utc::now();
        let mut venue = Venue {
            id: Uuid::new_v4(),
            events_venue_id: None,
            setlist_venue_id: Some(setlist_venue_id.to_string()),
            name: name.to_string(),
            city: None,
            country: None,
            created_at: now,
            updated_at: now,
        };
        apply_venue_patch(&mut venue, patch);

        if let Some(events_id) = &venue.events_venue_id {
            inner.venue_by_events_id.insert(events_id.clone(), venue.id);
        }
        inner
            .venue_by_setlist_id
            .insert(setlist_venue_id.to_string(), venue.id);
        inner.venues.insert(venue.id, venue.clone());
        Ok(venue)
    }

    async fn upsert_show_by_event_id(&self, event_id: &str, patch: ShowPatch) -> AppResult<Show> {
        let mut inner = self.inner.lock().unwrap();

        if let Some(&id) = inner.show_by_event_id.get(event_id) {
            let show = inner
                .shows
                .get_mut(&id)
                .ok_or_else(|| AppError::StoreError(format!("show {} index dangling", id)))?;
            apply_show_patch(show, patch);
            return Ok(show.clone());
        }

        let now = Utc::now();
        let mut show = Show {
            id: Uuid::new_v4(),
            event_id: Some(event_id.to_string()),
            setlist_id: None,
            name: None,
            venue_id: None,
            date: None,
            starts_at: None,
            status: ShowStatus::Upcoming,
            url: None,
            created_at: now,
            updated_at: now,
        };
        apply_show_patch(&mut show, patch);

        inner.show_by_event_id.insert(event_id.to_string(), show.id);
        inner.shows.insert(show.id, show.clone());
        Ok(show)
    }

    async fn upsert_show_by_setlist_id(
        &self,
        setlist_id: &str,
        patch: ShowPatch,
    ) -> AppResult<Show> {
        let mut inner = self.inner.lock().unwrap();

        if let Some(&id) = inner.show_by_setlist_id.get(setlist_id) {
            let show = inner
                .shows
                .get_mut(&id)
                .ok_or_else(|| AppError::StoreError(format!("show {} index dangling", id)))?;
            apply_show_patch(show, patch);
            return Ok(show.clone());
        }

        let now = Utc::now();
        let mut show = Show {
            id: Uuid::new_v4(),
            event_id: None,
            setlist_id: Some(setlist_id.to_string()),
            name: None,
            venue_id: None,
            date: None,
            starts_at: None,
            // Historical setlists are shows that already happened
            status: ShowStatus::Completed,
            url: None,
            created_at: now,
            updated_at: now,
        };
        apply_show_patch(&mut show, patch);

        inner
            .show_by_setlist_id
            .insert(setlist_id.to_string(), show.id);
        inner.shows.insert(show.id, show.clone());
        Ok(show)
    }

    async fn link_show_artist(
        &self,
        show_id: Uuid,
        artist_id: Uuid,
        headliner: bool,
        position: i32,
    ) -> AppResult<()> {
        let mut inner = self.inner.lock().unwrap();
        // Conflict-do-nothing: the first link for a (show, artist) pair wins
        inner
            .show_artists
            .entry((show_id, artist_id))
            .or_insert((headliner, position));
        Ok(())
    }

    async fn shows_for_artist(&self, artist_id: Uuid) -> AppResult<Vec<Show>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .show_artists
            .keys()
            .filter(|(_, a)| *a == artist_id)
            .filter_map(|(s, _)| inner.shows.get(s))
            .cloned()
            .collect())
    }

    async fn venue_count(&self) -> AppResult<usize> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.venues.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn upsert_artist_is_idempotent() {
        let store = MemoryEntityStore::new();

        let first = store
            .upsert_by_attraction_id("evt_1", "Arctic Monkeys", ArtistPatch::default())
            .await
            .unwrap();
        let second = store
            .upsert_by_attraction_id("evt_1", "Arctic Monkeys", ArtistPatch::default())
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(first.slug, "arctic-monkeys");
    }

    #[tokio::test]
    async fn coalesce_keeps_omitted_fields() {
        let store = MemoryEntityStore::new();

        store
            .upsert_by_attraction_id(
                "evt_1",
                "Arctic Monkeys",
                ArtistPatch {
                    popularity: Some(88),
                    image_url: Some("https://img.example/am.jpg".to_string()),
                    ..ArtistPatch::default()
                },
            )
            .await
            .unwrap();

        let updated = store
            .upsert_by_attraction_id(
                "evt_1",
                "Arctic Monkeys",
                ArtistPatch {
                    followers: Some(1_000_000),
                    ..ArtistPatch::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.popularity, Some(88));
        assert_eq!(updated.image_url.as_deref(), Some("https://img.example/am.jpg"));
        assert_eq!(updated.followers, Some(1_000_000));
    }

    #[tokio::test]
    async fn song_link_is_conflict_do_nothing() {
        let store = MemoryEntityStore::new();
        let artist_id = Uuid::new_v4();

        let song = store
            .upsert_song("trk_1", "505", SongPatch::default())
            .await
            .unwrap();

        store.link_song_artist(song.id, artist_id).await.unwrap();
        store.link_song_artist(song.id, artist_id).await.unwrap();

        let songs = store.songs_for_artist(artist_id).await.unwrap();
        assert_eq!(songs.len(), 1);
    }

    #[tokio::test]
    async fn show_link_keeps_first_billing() {
        let store = MemoryEntityStore::new();
        let artist_id = Uuid::new_v4();

        let show = store
            .upsert_show_by_event_id("ev_1", ShowPatch::default())
            .await
            .unwrap();

        store
            .link_show_artist(show.id, artist_id, true, 0)
            .await
            .unwrap();
        // A later conflicting link must not demote the headliner
        store
            .link_show_artist(show.id, artist_id, false, 3)
            .await
            .unwrap();

        let inner = store.inner.lock().unwrap();
        assert_eq!(inner.show_artists[&(show.id, artist_id)], (true, 0));
    }
}
