//! In-memory lyrics source for testing
//!
//! Serves a fixed list of songs without touching the network and records
//! every search and page fetch so tests can check what was requested.

use std::cell::RefCell;
use std::collections::HashMap;

use super::{LyricsSource, SongHit};
use crate::error::{Result, TrackscanError};

/// Mock lyrics source
#[derive(Debug, Default)]
pub struct MockLyricsSource {
    hits: Vec<SongHit>,
    pages: HashMap<String, Option<String>>,
    failure: Option<String>,
    searches: RefCell<Vec<String>>,
    fetched: RefCell<Vec<String>>,
}

impl MockLyricsSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a song; every search returns all songs in insertion order.
    /// `None` lyrics stand for a page without a lyrics container.
    pub fn with_song(mut self, hit: SongHit, lyrics: Option<&str>) -> Self {
        self.pages.insert(hit.url.clone(), lyrics.map(str::to_string));
        self.hits.push(hit);
        self
    }

    /// Make every request fail with an HTTP error
    pub fn failing(mut self, message: &str) -> Self {
        self.failure = Some(message.to_string());
        self
    }

    pub fn searches(&self) -> Vec<String> {
        self.searches.borrow().clone()
    }

    pub fn fetched_urls(&self) -> Vec<String> {
        self.fetched.borrow().clone()
    }

    fn check_failure(&self) -> Result<()> {
        match &self.failure {
            Some(message) => Err(TrackscanError::Http {
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }
}

impl LyricsSource for MockLyricsSource {
    fn search_songs(&self, query: &str) -> Result<Vec<SongHit>> {
        self.searches.borrow_mut().push(query.to_string());
        self.check_failure()?;
        Ok(self.hits.clone())
    }

    fn fetch_lyrics(&self, song_url: &str) -> Result<Option<String>> {
        self.fetched.borrow_mut().push(song_url.to_string());
        self.check_failure()?;
        Ok(self.pages.get(song_url).cloned().flatten())
    }
}
