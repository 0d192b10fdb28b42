//! Loudness measurements
//!
//! Beat loudness is the mean RMS over beat-to-beat segments. Overall
//! loudness is the mean-square level of the whole signal in dB, mapped
//! linearly from [-60, 0] dB onto [0, 1].

use crate::audio::{mean_square, rms, MonoBuffer};

/// Level mapped to 0.0 by [`normalize_loudness`]
pub const LOUDNESS_FLOOR_DB: f64 = -60.0;

/// Level mapped to 1.0 by [`normalize_loudness`]
pub const LOUDNESS_CEILING_DB: f64 = 0.0;

/// Mean RMS over consecutive beat-to-beat segments.
///
/// Segment `i` spans `[int(beats[i] * sr), int(beats[i + 1] * sr))`.
/// Segments ending past the buffer or with zero length are skipped.
/// Returns 0.0 with fewer than two beats or no usable segment.
pub fn beats_loudness_mean(buffer: &MonoBuffer, beats: &[f64]) -> f64 {
    let segment_rms: Vec<f64> = beats
        .windows(2)
        .filter_map(|pair| {
            let start = buffer.index_at(pair[0]);
            let end = buffer.index_at(pair[1]);
            if end > buffer.len() || end <= start {
                return None;
            }
            Some(rms(&buffer.samples[start..end]))
        })
        .collect();

    if segment_rms.is_empty() {
        return 0.0;
    }

    segment_rms.iter().sum::<f64>() / segment_rms.len() as f64
}

/// Overall level in dB (`10 * log10(mean square)`), -inf for silence
pub fn loudness_db(samples: &[f32]) -> f64 {
    let power = mean_square(samples);
    if power <= 0.0 {
        f64::NEG_INFINITY
    } else {
        10.0 * power.log10()
    }
}

/// `clamp((db + 60) / 60, 0, 1)`
pub fn normalize_loudness(db: f64) -> f64 {
    if db.is_nan() {
        return 0.0;
    }
    let range = LOUDNESS_CEILING_DB - LOUDNESS_FLOOR_DB;
    ((db - LOUDNESS_FLOOR_DB) / range).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use test_case::test_case;

    #[test_case(-60.0, 0.0 ; "floor")]
    #[test_case(0.0, 1.0 ; "ceiling")]
    #[test_case(-30.0, 0.5 ; "midpoint")]
    #[test_case(-15.0, 0.75 ; "upper quarter")]
    #[test_case(-90.0, 0.0 ; "below floor clamps")]
    #[test_case(6.0, 1.0 ; "above ceiling clamps")]
    #[test_case(f64::NEG_INFINITY, 0.0 ; "silence")]
    fn test_normalize_loudness(db: f64, expected: f64) {
        assert_relative_eq!(normalize_loudness(db), expected, epsilon = 1e-12);
    }

    #[test]
    fn test_loudness_db() {
        assert_relative_eq!(loudness_db(&[1.0, -1.0]), 0.0, epsilon = 1e-9);
        assert_relative_eq!(loudness_db(&[0.1, -0.1]), -20.0, epsilon = 1e-6);
        assert_eq!(loudness_db(&[0.0; 16]), f64::NEG_INFINITY);
        assert_eq!(loudness_db(&[]), f64::NEG_INFINITY);
    }

    #[test]
    fn test_fewer_than_two_beats() {
        let buffer = MonoBuffer::new(vec![0.5; 100], 10);
        assert_eq!(beats_loudness_mean(&buffer, &[]), 0.0);
        assert_eq!(beats_loudness_mean(&buffer, &[1.0]), 0.0);
    }

    #[test]
    fn test_mean_over_segments() {
        // 10 Hz "audio": segment [0,10) at 0.2, [10,20) at 0.6
        let mut samples = vec![0.2f32; 10];
        samples.extend(vec![0.6f32; 10]);
        let buffer = MonoBuffer::new(samples, 10);

        let mean = beats_loudness_mean(&buffer, &[0.0, 1.0, 2.0]);
        assert_relative_eq!(mean, 0.4, epsilon = 1e-6);
    }

    #[test]
    fn test_segment_past_end_is_skipped() {
        let buffer = MonoBuffer::new(vec![0.5f32; 20], 10);

        // Second segment ends at sample 30 > 20
        let mean = beats_loudness_mean(&buffer, &[0.0, 1.0, 3.0]);
        assert_relative_eq!(mean, 0.5, epsilon = 1e-6);

        // Segment ending exactly at the buffer end is kept
        let mean = beats_loudness_mean(&buffer, &[1.0, 2.0]);
        assert_relative_eq!(mean, 0.5, epsilon = 1e-6);
    }

    #[test]
    fn test_zero_length_segment_is_skipped() {
        let mut samples = vec![0.0f32; 10];
        samples.extend(vec![1.0f32; 10]);
        let buffer = MonoBuffer::new(samples, 10);

        // 1.0 and 1.05 both truncate to sample 10
        let mean = beats_loudness_mean(&buffer, &[1.0, 1.05, 2.0]);
        assert_relative_eq!(mean, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_all_segments_unusable() {
        let buffer = MonoBuffer::new(vec![0.5f32; 10], 10);
        assert_eq!(beats_loudness_mean(&buffer, &[2.0, 3.0]), 0.0);
    }
}
