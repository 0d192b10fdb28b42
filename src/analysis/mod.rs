//! Audio Feature Extraction
//!
//! Pipeline run by the `audio-features` tool:
//! - decode to mono at the analysis rate
//! - rhythm extraction (tempo and beat positions)
//! - mean RMS over beat-to-beat segments
//! - overall loudness, normalised to [0, 1]
//! - DFA danceability

pub mod danceability;
pub mod energy;
pub mod features;
pub mod loudness;
pub mod rhythm;

use std::path::Path;

use log::{debug, info};

use crate::audio::{self, resample_linear, MonoBuffer};
use crate::config::AnalysisConfig;
use crate::error::{Result, TrackscanError};

pub use energy::{classify_energy, EnergyAssessment, EnergyLevel, ScoreBreakdown};
pub use features::{AudioFeatures, AudioMetrics};
pub use rhythm::{extract_rhythm, RhythmResult, TempoEstimate};

/// Decode `path` and extract its features
pub fn analyze_file(path: &Path, config: &AnalysisConfig) -> Result<AudioFeatures> {
    info!("Analyzing {}", path.display());
    let buffer = audio::load_mono(path, config.sample_rate)?;
    analyze_buffer(&buffer, config)
}

/// Extract features from an already decoded buffer.
///
/// Buffers at another rate are resampled to `config.sample_rate` first.
pub fn analyze_buffer(buffer: &MonoBuffer, config: &AnalysisConfig) -> Result<AudioFeatures> {
    if buffer.is_empty() {
        return Err(TrackscanError::EmptyAudio);
    }
    if buffer.sample_rate == 0 {
        return Err(TrackscanError::InvalidAudio {
            reason: "sample rate is zero".to_string(),
            source: None,
        });
    }

    let resampled;
    let buffer = if buffer.sample_rate != config.sample_rate {
        let ratio = config.sample_rate as f64 / buffer.sample_rate as f64;
        resampled = MonoBuffer::new(resample_linear(&buffer.samples, ratio), config.sample_rate);
        &resampled
    } else {
        buffer
    };

    debug!(
        "Analyzing {:.2}s of audio at {} Hz",
        buffer.duration_secs(),
        buffer.sample_rate
    );

    let rhythm = extract_rhythm(buffer, config);
    let beats_loudness = loudness::beats_loudness_mean(buffer, &rhythm.beats);

    let loudness_db = loudness::loudness_db(&buffer.samples);
    let average_loudness = loudness::normalize_loudness(loudness_db);

    let danceable = danceability::danceability(&buffer.samples, buffer.sample_rate);

    debug!(
        "Features: bpm={:.2} beats={} beats_loudness={:.4} loudness={:.1}dB ({:.3}) danceability={:.3}",
        rhythm.bpm,
        rhythm.beats.len(),
        beats_loudness,
        loudness_db,
        average_loudness,
        danceable
    );

    Ok(AudioFeatures::new(
        rhythm.bpm,
        beats_loudness,
        average_loudness,
        danceable,
    ))
}
