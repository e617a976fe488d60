//! Upsert/dedup layer tests
//!
//! Coalesce semantics, provider-id uniqueness and first-seen track dedup.

use backline::modules::artist::domain::entities::{
    AlbumPatch, ArtistPatch, ShowPatch, SongPatch, VenuePatch,
};
use backline::modules::artist::domain::repository::{ArtistStore, CatalogStore, ShowStore};
use backline::modules::artist::infrastructure::persistence::MemoryEntityStore;
use backline::modules::import::stages::catalog::dedup_tracks;
use backline::modules::provider::domain::models::TrackInfo;
use uuid::Uuid;

fn track(id: &str) -> TrackInfo {
    TrackInfo {
        catalog_id: id.to_string(),
        title: format!("track {}", id),
        duration_ms: None,
        track_number: None,
        explicit: None,
        album_catalog_id: None,
    }
}

#[tokio::test]
async fn one_row_per_provider_id() {
    let store = MemoryEntityStore::new();

    let first = store
        .upsert_by_attraction_id("evt_1", "Arctic Monkeys", ArtistPatch::default())
        .await
        .unwrap();
    let second = store
        .upsert_by_attraction_id("evt_1", "Arctic Monkeys", ArtistPatch::default())
        .await
        .unwrap();
    let other = store
        .upsert_by_attraction_id("evt_2", "The National", ArtistPatch::default())
        .await
        .unwrap();

    assert_eq!(first.id, second.id);
    assert_ne!(first.id, other.id);

    let found = store.find_by_attraction_id("evt_1").await.unwrap().unwrap();
    assert_eq!(found.id, first.id);
}

#[tokio::test]
async fn surrogate_id_never_changes_across_upserts() {
    let store = MemoryEntityStore::new();

    let created = store
        .upsert_by_attraction_id("evt_1", "Arctic Monkeys", ArtistPatch::default())
        .await
        .unwrap();
    let updated = store
        .upsert_by_attraction_id(
            "evt_1",
            "Arctic Monkeys",
            ArtistPatch {
                catalog_id: Some("cat_1".to_string()),
                ..ArtistPatch::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(created.id, updated.id);
    assert_eq!(updated.catalog_id.as_deref(), Some("cat_1"));
}

#[tokio::test]
async fn partial_upsert_does_not_null_stored_fields() {
    let store = MemoryEntityStore::new();

    store
        .upsert_by_attraction_id(
            "evt_1",
            "Arctic Monkeys",
            ArtistPatch {
                genres: Some(vec!["indie rock".to_string()]),
                popularity: Some(85),
                followers: Some(25_000_000),
                ..ArtistPatch::default()
            },
        )
        .await
        .unwrap();

    // Second pass knows only the image
    let updated = store
        .upsert_by_attraction_id(
            "evt_1",
            "Arctic Monkeys",
            ArtistPatch {
                image_url: Some("https://img.example/am.jpg".to_string()),
                ..ArtistPatch::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.genres, vec!["indie rock".to_string()]);
    assert_eq!(updated.popularity, Some(85));
    assert_eq!(updated.followers, Some(25_000_000));
    assert_eq!(updated.image_url.as_deref(), Some("https://img.example/am.jpg"));
}

#[tokio::test]
async fn album_and_song_coalesce() {
    let store = MemoryEntityStore::new();
    let artist_id = Uuid::new_v4();

    store
        .upsert_album(
            artist_id,
            "alb_1",
            "AM",
            AlbumPatch {
                release_date: Some("2013-09-09".to_string()),
                total_tracks: Some(12),
                ..AlbumPatch::default()
            },
        )
        .await
        .unwrap();
    let album = store
        .upsert_album(
            artist_id,
            "alb_1",
            "AM",
            AlbumPatch {
                image_url: Some("https://img.example/am-cover.jpg".to_string()),
                ..AlbumPatch::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(album.release_date.as_deref(), Some("2013-09-09"));
    assert_eq!(album.total_tracks, Some(12));

    store
        .upsert_song(
            "trk_1",
            "Do I Wanna Know?",
            SongPatch {
                duration_ms: Some(272_000),
                ..SongPatch::default()
            },
        )
        .await
        .unwrap();
    let song = store
        .upsert_song(
            "trk_1",
            "Do I Wanna Know?",
            SongPatch {
                album_id: Some(album.id),
                ..SongPatch::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(song.duration_ms, Some(272_000));
    assert_eq!(song.album_id, Some(album.id));
}

#[tokio::test]
async fn duplicate_track_listing_yields_one_song_row() {
    let store = MemoryEntityStore::new();
    let artist_id = Uuid::new_v4();

    // Track X reachable via top tracks and via an album listing
    let listings = vec![track("trk_x"), track("trk_y"), track("trk_x")];
    let (unique, dropped) = dedup_tracks(listings);
    assert_eq!(dropped, 1);

    for t in unique {
        let song = store
            .upsert_song(&t.catalog_id, &t.title, SongPatch::default())
            .await
            .unwrap();
        store.link_song_artist(song.id, artist_id).await.unwrap();
    }

    let songs = store.songs_for_artist(artist_id).await.unwrap();
    assert_eq!(songs.len(), 2);
    assert_eq!(
        songs
            .iter()
            .filter(|s| s.catalog_id == "trk_x")
            .count(),
        1
    );
}

#[tokio::test]
async fn venue_unique_per_provider_id() {
    let store = MemoryEntityStore::new();

    let first = store
        .upsert_venue_by_events_id(
            "ven_1",
            "O2 Arena",
            VenuePatch {
                city: Some("London".to_string()),
                ..VenuePatch::default()
            },
        )
        .await
        .unwrap();
    let second = store
        .upsert_venue_by_events_id("ven_1", "O2 Arena", VenuePatch::default())
        .await
        .unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(second.city.as_deref(), Some("London"));
    assert_eq!(store.venue_count().await.unwrap(), 1);
}

#[tokio::test]
async fn show_status_transitions_without_new_rows() {
    let store = MemoryEntityStore::new();

    let created = store
        .upsert_show_by_event_id(
            "ev_1",
            ShowPatch {
                name: Some("Arctic Monkeys at the Garden".to_string()),
                ..ShowPatch::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(created.status.to_string(), "upcoming");

    let completed = store
        .upsert_show_by_event_id(
            "ev_1",
            ShowPatch {
                status: Some("completed".parse().unwrap()),
                ..ShowPatch::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(created.id, completed.id);
    assert_eq!(completed.status.to_string(), "completed");
    // Name survives the status-only patch
    assert_eq!(
        completed.name.as_deref(),
        Some("Arctic Monkeys at the Garden")
    );
}
