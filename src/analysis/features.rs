//! Feature record written by the analyzer
//!
//! The JSON layout is fixed:
//!
//! ```text
//! {
//!   "rhythm": { "bpm": f, "beats_loudness": { "mean": f } },
//!   "lowlevel": { "average_loudness": f },
//!   "highlevel": { "danceability": { "all": { "danceable": f } } }
//! }
//! ```

use std::fs;
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::error::{Result, TrackscanError};

/// Complete analyzer output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AudioFeatures {
    pub rhythm: RhythmFeatures,
    pub lowlevel: LowLevelFeatures,
    pub highlevel: HighLevelFeatures,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RhythmFeatures {
    pub bpm: f64,
    pub beats_loudness: MeanStat,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MeanStat {
    pub mean: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LowLevelFeatures {
    /// Normalised loudness in [0, 1]
    pub average_loudness: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HighLevelFeatures {
    pub danceability: DanceabilityFeatures,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DanceabilityFeatures {
    pub all: DanceabilityScores,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DanceabilityScores {
    pub danceable: f64,
}

/// Flat view of [`AudioFeatures`], as consumed by energy classification
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioMetrics {
    pub bpm: f64,
    pub beats_loudness: f64,
    pub average_loudness: f64,
    pub danceability: f64,
}

impl AudioFeatures {
    pub fn new(bpm: f64, beats_loudness: f64, average_loudness: f64, danceability: f64) -> Self {
        AudioFeatures {
            rhythm: RhythmFeatures {
                bpm,
                beats_loudness: MeanStat {
                    mean: beats_loudness,
                },
            },
            lowlevel: LowLevelFeatures { average_loudness },
            highlevel: HighLevelFeatures {
                danceability: DanceabilityFeatures {
                    all: DanceabilityScores { danceable: danceability },
                },
            },
        }
    }

    pub fn metrics(&self) -> AudioMetrics {
        AudioMetrics {
            bpm: self.rhythm.bpm,
            beats_loudness: self.rhythm.beats_loudness.mean,
            average_loudness: self.lowlevel.average_loudness,
            danceability: self.highlevel.danceability.all.danceable,
        }
    }

    /// Pretty JSON with 2-space indentation
    pub fn to_json_string(&self) -> Result<String> {
        self.validate()?;
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the record to `path`, replacing any existing file.
    ///
    /// The JSON goes to a temporary file next to `path` that is renamed into
    /// place once fully written, so `path` is never left half-written.
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let json = self.to_json_string()?;

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(json.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| TrackscanError::Io(e.error))?;

        Ok(())
    }

    /// Parse a record previously written by [`write_json`](Self::write_json)
    pub fn read_json(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                TrackscanError::FileNotFound {
                    path: path.display().to_string(),
                    source: Some(e),
                }
            } else {
                TrackscanError::Io(e)
            }
        })?;
        Ok(serde_json::from_str(&data)?)
    }

    /// JSON has no representation for NaN or infinity
    fn validate(&self) -> Result<()> {
        let metrics = self.metrics();
        let fields = [
            ("rhythm.bpm", metrics.bpm),
            ("rhythm.beats_loudness.mean", metrics.beats_loudness),
            ("lowlevel.average_loudness", metrics.average_loudness),
            ("highlevel.danceability.all.danceable", metrics.danceability),
        ];

        for (name, value) in fields {
            if !value.is_finite() {
                return Err(TrackscanError::AnalysisFailed {
                    reason: format!("{} is not a finite number ({})", name, value),
                });
            }
        }
        Ok(())
    }
}

impl From<&AudioFeatures> for AudioMetrics {
    fn from(features: &AudioFeatures) -> Self {
        features.metrics()
    }
}
