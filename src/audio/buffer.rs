//! Mono Audio Buffer
//!
//! The analysis pipeline works on a single channel of 32-bit float samples
//! at a known rate. Level helpers operate on plain slices so beat segments
//! can be measured without copying.

/// Convert linear amplitude to decibels
///
/// Returns -f64::INFINITY for zero input.
#[inline]
pub fn linear_to_db(linear: f64) -> f64 {
    if linear <= 0.0 {
        f64::NEG_INFINITY
    } else {
        20.0 * linear.log10()
    }
}

/// Mean of the squared samples. Returns 0.0 for an empty slice.
pub fn mean_square(samples: &[f32]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }

    let sum_squares: f64 = samples.iter().map(|&s| (s as f64) * (s as f64)).sum();
    sum_squares / samples.len() as f64
}

/// Root-mean-square level of a slice (linear). Returns 0.0 for an empty slice.
pub fn rms(samples: &[f32]) -> f64 {
    mean_square(samples).sqrt()
}

/// Mono sample buffer
#[derive(Debug, Clone, PartialEq)]
pub struct MonoBuffer {
    /// Samples, nominally in [-1.0, 1.0]
    pub samples: Vec<f32>,
    /// Sample rate in Hz
    pub sample_rate: u32,
}

impl MonoBuffer {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        MonoBuffer {
            samples,
            sample_rate,
        }
    }

    /// Buffer of `num_samples` zeros
    pub fn silent(num_samples: usize, sample_rate: u32) -> Self {
        MonoBuffer::new(vec![0.0; num_samples], sample_rate)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in seconds
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// RMS level of the whole buffer in dBFS
    pub fn rms_db(&self) -> f64 {
        linear_to_db(rms(&self.samples))
    }

    /// Sample index for a time in seconds, truncated toward zero
    #[inline]
    pub fn index_at(&self, secs: f64) -> usize {
        (secs * self.sample_rate as f64) as usize
    }
}

/// Generate a sine tone
///
/// Used by tests and fixtures to get predictable levels.
pub fn sine(frequency: f32, amplitude: f32, duration_secs: f32, sample_rate: u32) -> MonoBuffer {
    let num_samples = (duration_secs * sample_rate as f32) as usize;
    let angular_freq = 2.0 * std::f32::consts::PI * frequency / sample_rate as f32;

    let samples = (0..num_samples)
        .map(|i| amplitude * (angular_freq * i as f32).sin())
        .collect();

    MonoBuffer::new(samples, sample_rate)
}

/// Generate a click track: short decaying noise-free bursts every
/// `period_samples`, starting at `offset_samples`.
pub fn click_track(
    period_samples: usize,
    offset_samples: usize,
    duration_secs: f32,
    sample_rate: u32,
) -> MonoBuffer {
    let num_samples = (duration_secs * sample_rate as f32) as usize;
    let mut samples = vec![0.0f32; num_samples];
    let click_len = (sample_rate as usize / 200).max(1);
    let angular_freq = 2.0 * std::f32::consts::PI * 1000.0 / sample_rate as f32;

    let mut start = offset_samples;
    while period_samples > 0 && start < num_samples {
        for (k, sample) in samples[start..].iter_mut().take(click_len).enumerate() {
            let decay = 1.0 - k as f32 / click_len as f32;
            *sample = 0.9 * decay * (angular_freq * k as f32).sin();
        }
        start += period_samples;
    }

    MonoBuffer::new(samples, sample_rate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_rms_of_constant() {
        assert_relative_eq!(rms(&[0.5, -0.5, 0.5, -0.5]), 0.5, epsilon = 1e-9);
        assert_eq!(rms(&[]), 0.0);
    }

    #[test]
    fn test_sine_rms() {
        let buffer = sine(440.0, 1.0, 1.0, 44100);
        assert_eq!(buffer.len(), 44100);
        // Full-scale sine has RMS of 1/sqrt(2) = -3.01 dBFS
        assert_relative_eq!(buffer.rms_db(), -3.0103, epsilon = 0.01);
    }

    #[test]
    fn test_silence_is_neg_infinity() {
        let buffer = MonoBuffer::silent(100, 44100);
        assert_eq!(buffer.rms_db(), f64::NEG_INFINITY);
    }

    #[test]
    fn test_index_at_truncates() {
        let buffer = MonoBuffer::silent(44100, 44100);
        assert_eq!(buffer.index_at(0.5), 22050);
        assert_eq!(buffer.index_at(0.000_01), 0);
        assert_relative_eq!(buffer.duration_secs(), 1.0);
    }

    #[test]
    fn test_click_track_places_clicks() {
        let buffer = click_track(1000, 100, 0.1, 44100);
        assert_eq!(buffer.samples[99], 0.0);
        assert!(buffer.samples[101].abs() > 0.0);
        assert!(buffer.samples[1101].abs() > 0.0);
        assert_eq!(buffer.samples[900], 0.0);
    }
}
