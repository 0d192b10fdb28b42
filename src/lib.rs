//! Trackscan - Audio Features and Lyrics Tools
//!
//! Two small command-line tools built on one library:
//! - `audio-features` decodes an audio file and writes its tempo, beat
//!   loudness, average loudness and danceability as JSON
//! - `genius-lyrics` looks a song up on Genius and prints its cleaned
//!   lyrics
//!
//! # Layout
//!
//! - [`audio`]: decoding to a mono buffer at the analysis rate
//! - [`analysis`]: rhythm, loudness and danceability extraction
//! - [`lyrics`]: Genius search, page extraction and text cleanup
//! - [`cli`]: argument handling shared by both binaries

pub mod analysis;
pub mod audio;
pub mod cli;
pub mod config;
pub mod error;
pub mod lyrics;

pub use error::{Result, TrackscanError};
