//! Rhythm extraction
//!
//! Tempo and beat positions from a mono signal:
//! 1. Onset envelope: log-compressed spectral flux over a centred,
//!    Hann-windowed STFT.
//! 2. Tempo: autocorrelation of the envelope inside the configured BPM
//!    range, weighted by a log-normal prior around 120 BPM, refined with a
//!    parabolic fit around the best lag.
//! 3. Beats: dynamic programming over the envelope that rewards onset
//!    strength and penalises deviation from the estimated period.

use log::debug;
use rustfft::{num_complex::Complex, FftPlanner};

use crate::audio::MonoBuffer;
use crate::config::AnalysisConfig;

/// Centre of the tempo prior in BPM
const PRIOR_CENTER_BPM: f64 = 120.0;

/// Width of the tempo prior in octaves
const PRIOR_WIDTH_OCTAVES: f64 = 1.0;

/// Penalty weight for beat intervals that deviate from the period
const TIGHTNESS: f64 = 100.0;

/// Tempo estimate derived from the onset envelope
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TempoEstimate {
    /// Tempo in beats per minute
    pub bpm: f64,
    /// Beat period in envelope frames (fractional)
    pub period_frames: f64,
    /// Normalised autocorrelation at the chosen lag (0.0-1.0)
    pub confidence: f64,
}

/// Output of rhythm extraction
#[derive(Debug, Clone, PartialEq)]
pub struct RhythmResult {
    /// Estimated tempo; 0.0 when no tempo was found
    pub bpm: f64,
    /// Beat positions in seconds, ascending
    pub beats: Vec<f64>,
    /// Confidence of the tempo estimate (0.0-1.0)
    pub confidence: f64,
}

impl RhythmResult {
    fn empty() -> Self {
        RhythmResult {
            bpm: 0.0,
            beats: Vec::new(),
            confidence: 0.0,
        }
    }
}

/// Run the whole rhythm pipeline on a buffer
pub fn extract_rhythm(buffer: &MonoBuffer, config: &AnalysisConfig) -> RhythmResult {
    let envelope = onset_envelope(&buffer.samples, config);

    let tempo = match estimate_tempo(&envelope, config) {
        Some(tempo) => tempo,
        None => {
            debug!("No periodicity in onset envelope ({} frames)", envelope.len());
            return RhythmResult::empty();
        }
    };

    let frame_secs = config.hop_size as f64 / buffer.sample_rate as f64;
    let beats: Vec<f64> = track_beats(&envelope, tempo.period_frames)
        .into_iter()
        .map(|frame| frame as f64 * frame_secs)
        .collect();

    debug!(
        "Rhythm: {:.2} BPM (confidence {:.2}), {} beats",
        tempo.bpm,
        tempo.confidence,
        beats.len()
    );

    RhythmResult {
        bpm: tempo.bpm,
        beats,
        confidence: tempo.confidence,
    }
}

/// Spectral flux onset envelope, one value per hop.
///
/// Frames are centred: frame `t` covers samples
/// `[t * hop - frame / 2, t * hop + frame / 2)`, zero-padded at both ends.
pub fn onset_envelope(samples: &[f32], config: &AnalysisConfig) -> Vec<f64> {
    let frame_size = config.frame_size;
    let hop_size = config.hop_size;
    if samples.is_empty() || frame_size == 0 || hop_size == 0 {
        return Vec::new();
    }

    let half = frame_size / 2;
    let num_frames = 1 + samples.len() / hop_size;
    let num_bins = frame_size / 2 + 1;

    let window: Vec<f32> = (0..frame_size)
        .map(|i| {
            0.5 * (1.0 - (2.0 * std::f32::consts::PI * i as f32 / frame_size as f32).cos())
        })
        .collect();

    let mut planner = FftPlanner::<f32>::new();
    let fft = planner.plan_fft_forward(frame_size);

    let mut frame = vec![Complex::new(0.0f32, 0.0); frame_size];
    let mut previous = vec![0.0f32; num_bins];
    let mut current = vec![0.0f32; num_bins];
    let mut envelope = Vec::with_capacity(num_frames);

    for t in 0..num_frames {
        let centre = t * hop_size;
        for (i, bin) in frame.iter_mut().enumerate() {
            // Index into the zero-padded signal
            let sample = (centre + i)
                .checked_sub(half)
                .and_then(|idx| samples.get(idx))
                .copied()
                .unwrap_or(0.0);
            *bin = Complex::new(sample * window[i], 0.0);
        }

        fft.process(&mut frame);

        for (mag, bin) in current.iter_mut().zip(frame.iter()) {
            *mag = (1.0 + 100.0 * bin.norm()).ln();
        }

        let flux: f64 = if t == 0 {
            0.0
        } else {
            current
                .iter()
                .zip(previous.iter())
                .map(|(&c, &p)| ((c - p).max(0.0)) as f64)
                .sum()
        };
        envelope.push(flux);

        std::mem::swap(&mut previous, &mut current);
    }

    envelope
}

/// Estimate the tempo from an onset envelope.
///
/// Returns `None` for a flat envelope (silence) or one too short to hold
/// two periods of the slowest allowed tempo's fastest counterpart.
pub fn estimate_tempo(envelope: &[f64], config: &AnalysisConfig) -> Option<TempoEstimate> {
    let frame_rate = config.frame_rate();
    let min_lag = ((60.0 * frame_rate / config.max_bpm).floor() as usize).max(1);
    let max_lag = ((60.0 * frame_rate / config.min_bpm).ceil() as usize).min(envelope.len() / 2);

    if max_lag <= min_lag {
        return None;
    }

    let n = envelope.len();
    let mean = envelope.iter().sum::<f64>() / n as f64;
    let centered: Vec<f64> = envelope.iter().map(|&v| v - mean).collect();

    let energy: f64 = centered.iter().map(|v| v * v).sum();
    if energy <= f64::EPSILON {
        return None;
    }

    // Biased autocorrelation; one extra lag on each side for the parabolic fit
    let lo = min_lag.saturating_sub(1).max(1);
    let hi = (max_lag + 1).min(n - 1);
    let mut scores = vec![0.0f64; hi + 1];
    let mut acf = vec![0.0f64; hi + 1];
    for lag in lo..=hi {
        let sum: f64 = centered[..n - lag]
            .iter()
            .zip(centered[lag..].iter())
            .map(|(a, b)| a * b)
            .sum();
        acf[lag] = sum / energy;
        scores[lag] = acf[lag] * tempo_prior(60.0 * frame_rate / lag as f64);
    }

    let (best_lag, best_score) = (min_lag..=max_lag)
        .map(|lag| (lag, scores[lag]))
        .fold((0, f64::NEG_INFINITY), |best, candidate| {
            if candidate.1 > best.1 {
                candidate
            } else {
                best
            }
        });

    if best_lag == 0 || best_score <= 0.0 {
        return None;
    }

    let mut period = best_lag as f64;
    if best_lag > lo && best_lag < hi {
        let (a, b, c) = (scores[best_lag - 1], scores[best_lag], scores[best_lag + 1]);
        let denom = a - 2.0 * b + c;
        if denom < 0.0 {
            let delta = 0.5 * (a - c) / denom;
            if delta.abs() < 1.0 {
                period += delta;
            }
        }
    }

    Some(TempoEstimate {
        bpm: 60.0 * frame_rate / period,
        period_frames: period,
        confidence: acf[best_lag].clamp(0.0, 1.0),
    })
}

/// Log-normal weight over tempo, peaking at `PRIOR_CENTER_BPM`
fn tempo_prior(bpm: f64) -> f64 {
    let octaves = (bpm / PRIOR_CENTER_BPM).log2() / PRIOR_WIDTH_OCTAVES;
    (-0.5 * octaves * octaves).exp()
}

/// Dynamic-programming beat tracker.
///
/// Returns beat positions as envelope frame indices, ascending.
pub fn track_beats(envelope: &[f64], period: f64) -> Vec<usize> {
    let n = envelope.len();
    if n == 0 || period < 1.0 {
        return Vec::new();
    }

    let local = local_score(envelope, period);

    let mut cumulative = vec![0.0f64; n];
    let mut backlink: Vec<Option<usize>> = vec![None; n];

    let min_step = (period / 2.0).round().max(1.0) as usize;
    let max_step = (period * 2.0).round() as usize;

    for t in 0..n {
        let mut best: Option<(usize, f64)> = None;

        if t >= min_step {
            let earliest = t.saturating_sub(max_step);
            for prev in earliest..=(t - min_step) {
                let interval = (t - prev) as f64;
                let penalty = TIGHTNESS * (interval / period).ln().powi(2);
                let score = cumulative[prev] - penalty;
                if best.map_or(true, |(_, s)| score > s) {
                    best = Some((prev, score));
                }
            }
        }

        match best {
            Some((prev, score)) if score > 0.0 => {
                cumulative[t] = local[t] + score;
                backlink[t] = Some(prev);
            }
            _ => cumulative[t] = local[t],
        }
    }

    let Some(last) = last_beat(&cumulative) else {
        return Vec::new();
    };

    let mut beats = vec![last];
    let mut cursor = last;
    while let Some(prev) = backlink[cursor] {
        beats.push(prev);
        cursor = prev;
    }
    beats.reverse();

    trim_beats(&local, beats)
}

/// Normalised envelope smoothed with a Gaussian about period/32 wide
fn local_score(envelope: &[f64], period: f64) -> Vec<f64> {
    let n = envelope.len() as f64;
    let mean = envelope.iter().sum::<f64>() / n;
    let std = (envelope.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n).sqrt();
    let scale = if std > 0.0 { std } else { 1.0 };

    let radius = period.round() as isize;
    let kernel: Vec<f64> = (-radius..=radius)
        .map(|k| {
            let x = k as f64 * 32.0 / period;
            (-0.5 * x * x).exp()
        })
        .collect();

    (0..envelope.len() as isize)
        .map(|t| {
            kernel
                .iter()
                .zip(-radius..=radius)
                .filter_map(|(w, k)| {
                    let idx = t + k;
                    (idx >= 0 && (idx as usize) < envelope.len())
                        .then(|| w * envelope[idx as usize] / scale)
                })
                .sum()
        })
        .collect()
}

/// Pick the final beat: the last local maximum of the cumulative score
/// that reaches half the median local-maximum value.
fn last_beat(cumulative: &[f64]) -> Option<usize> {
    let n = cumulative.len();
    let peaks: Vec<usize> = (0..n)
        .filter(|&t| {
            let left = t == 0 || cumulative[t] > cumulative[t - 1];
            let right = t + 1 == n || cumulative[t] >= cumulative[t + 1];
            left && right && cumulative[t] > 0.0
        })
        .collect();

    if peaks.is_empty() {
        return None;
    }

    let mut values: Vec<f64> = peaks.iter().map(|&t| cumulative[t]).collect();
    values.sort_by(|a, b| a.total_cmp(b));
    let median = values[values.len() / 2];

    peaks
        .iter()
        .rev()
        .copied()
        .find(|&t| cumulative[t] >= 0.5 * median)
}

/// Drop leading and trailing beats whose onset strength is below half
/// the RMS strength over all beats.
fn trim_beats(local: &[f64], beats: Vec<usize>) -> Vec<usize> {
    if beats.is_empty() {
        return beats;
    }

    let rms = (beats.iter().map(|&b| local[b].powi(2)).sum::<f64>() / beats.len() as f64).sqrt();
    let threshold = 0.5 * rms;

    let start = beats.iter().position(|&b| local[b] >= threshold);
    let end = beats.iter().rposition(|&b| local[b] >= threshold);

    match (start, end) {
        (Some(start), Some(end)) => beats[start..=end].to_vec(),
        _ => Vec::new(),
    }
}
