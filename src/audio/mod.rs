//! Audio Module
//!
//! Decoding to the analysis format and basic level measurements.

pub mod buffer;
pub mod io;

pub use buffer::{click_track, linear_to_db, mean_square, rms, sine, MonoBuffer};
pub use io::{decode_file, downmix, load_mono, resample_linear};
