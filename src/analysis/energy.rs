//! Energy classification
//!
//! Maps a set of metrics onto a coarse low/medium/high energy level by
//! summing per-metric points.

use serde::{Deserialize, Serialize};

use crate::analysis::features::AudioMetrics;

/// Coarse energy level of a track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnergyLevel {
    Low,
    Medium,
    High,
}

impl EnergyLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl std::fmt::Display for EnergyLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Points awarded per metric
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    pub bpm_score: u8,
    pub beats_score: u8,
    pub loudness_score: u8,
    pub danceability_score: u8,
    pub total_score: u8,
}

/// Classification result
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnergyAssessment {
    pub suggested_energy: EnergyLevel,
    pub metrics: AudioMetrics,
    pub score: ScoreBreakdown,
}

/// Score the metrics and pick an energy level
pub fn classify_energy(metrics: &AudioMetrics) -> EnergyAssessment {
    let bpm_score = match metrics.bpm {
        bpm if bpm >= 130.0 => 3,
        bpm if bpm >= 110.0 => 2,
        bpm if bpm >= 85.0 => 1,
        _ => 0,
    };

    // Beat strength, higher = punchier
    let beats_score = match metrics.beats_loudness {
        b if b >= 0.7 => 2,
        b if b >= 0.4 => 1,
        _ => 0,
    };

    let loudness_score = u8::from(metrics.average_loudness >= 0.8);
    let danceability_score = u8::from(metrics.danceability >= 0.7);

    let total_score = bpm_score + beats_score + loudness_score + danceability_score;

    let suggested_energy = match total_score {
        t if t >= 5 => EnergyLevel::High,
        t if t >= 2 => EnergyLevel::Medium,
        _ => EnergyLevel::Low,
    };

    EnergyAssessment {
        suggested_energy,
        metrics: *metrics,
        score: ScoreBreakdown {
            bpm_score,
            beats_score,
            loudness_score,
            danceability_score,
            total_score,
        },
    }
}
