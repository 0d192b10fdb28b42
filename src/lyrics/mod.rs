//! Lyrics Retrieval
//!
//! Looks a song up on Genius and returns its cleaned lyrics text.
//!
//! The first search hit for `"<title> <artist>"` is taken as the song;
//! hits are not checked against the requested artist or title.

pub mod cleanup;
pub mod client;
pub mod html;
pub mod mock;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TrackscanError};

pub use cleanup::clean_lyrics;
pub use client::GeniusClient;
pub use mock::MockLyricsSource;

/// Artist reference attached to a search hit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistRef {
    pub name: String,
}

/// A song returned by a search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongHit {
    /// Public page holding the lyrics
    pub url: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub full_title: Option<String>,
    #[serde(default)]
    pub primary_artist: Option<ArtistRef>,
}

impl SongHit {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: None,
            full_title: None,
            primary_artist: None,
        }
    }

    pub fn artist_name(&self) -> Option<&str> {
        self.primary_artist.as_ref().map(|artist| artist.name.as_str())
    }
}

/// A backend that can search songs and fetch their lyrics
pub trait LyricsSource {
    /// Search for songs matching a free-text query, best match first
    fn search_songs(&self, query: &str) -> Result<Vec<SongHit>>;

    /// Fetch the raw lyrics text of a song page.
    ///
    /// Returns `Ok(None)` when the page exists but carries no lyrics.
    fn fetch_lyrics(&self, song_url: &str) -> Result<Option<String>>;
}

/// Search query sent for a song
pub fn search_query(artist: &str, title: &str) -> String {
    format!("{} {}", title, artist)
}

/// Looks up songs and returns cleaned lyrics
#[derive(Debug)]
pub struct LyricsFetcher<S: LyricsSource> {
    source: S,
}

impl<S: LyricsSource> LyricsFetcher<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Fetch the cleaned lyrics of `title` by `artist`.
    ///
    /// Fails with [`TrackscanError::LyricsNotFound`] when the search has no
    /// hits, the page has no lyrics, or nothing is left after cleanup.
    pub fn fetch(&self, artist: &str, title: &str) -> Result<String> {
        let not_found = || TrackscanError::LyricsNotFound {
            artist: artist.to_string(),
            title: title.to_string(),
        };

        let query = search_query(artist, title);
        let hits = self.source.search_songs(&query)?;

        let Some(hit) = hits.into_iter().next() else {
            info!("No search results for '{}'", query);
            return Err(not_found());
        };

        debug!(
            "Using first hit: {} ({})",
            hit.full_title.as_deref().unwrap_or("untitled"),
            hit.url
        );

        let raw = self.source.fetch_lyrics(&hit.url)?.ok_or_else(not_found)?;
        let lyrics = clean_lyrics(&raw);

        if lyrics.is_empty() {
            info!("Lyrics page {} is empty after cleanup", hit.url);
            return Err(not_found());
        }

        Ok(lyrics)
    }
}
