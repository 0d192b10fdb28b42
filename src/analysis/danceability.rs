//! Danceability via detrended fluctuation analysis
//!
//! The signal is reduced to the standard deviation of consecutive 10 ms
//! frames, integrated after mean removal, and the fluctuation F(tau) of the
//! integrated series around local linear trends is measured for window
//! lengths tau between 310 ms and 8.8 s. The slope alpha of log F against
//! log tau is taken between consecutive scales; strongly self-similar
//! signals (low alpha) dance well. The score is the mean of 1/alpha over
//! positive slopes, so it usually lands between 0 and 3.

use log::debug;

/// Analysis frame length in seconds
const FRAME_SECS: f64 = 0.01;

/// Shortest DFA window in milliseconds
const MIN_TAU_MS: usize = 310;

/// Longest DFA window in milliseconds
const MAX_TAU_MS: usize = 8800;

/// Growth factor between consecutive window lengths
const TAU_MULTIPLIER: f64 = 1.1;

/// Danceability score of a mono signal; 0.0 for silence or very short input
pub fn danceability(samples: &[f32], sample_rate: u32) -> f64 {
    let alphas = dfa_exponents(samples, sample_rate);
    if alphas.is_empty() {
        return 0.0;
    }

    let score = alphas
        .iter()
        .filter(|&&alpha| alpha > 0.0)
        .map(|alpha| 1.0 / alpha)
        .sum::<f64>()
        / alphas.len() as f64;

    debug!("Danceability {:.3} from {} DFA scales", score, alphas.len());
    score
}

/// Window lengths in 10 ms frames
pub fn tau_frames() -> Vec<usize> {
    let mut taus = Vec::new();
    let mut tau_ms = MIN_TAU_MS;
    while tau_ms <= MAX_TAU_MS {
        taus.push(tau_ms / 10);
        tau_ms = (tau_ms as f64 * TAU_MULTIPLIER) as usize;
    }
    taus
}

/// DFA slope between each pair of consecutive scales.
///
/// Pairs where either fluctuation is zero yield 0.0.
pub fn dfa_exponents(samples: &[f32], sample_rate: u32) -> Vec<f64> {
    let frame_size = (FRAME_SECS * sample_rate as f64).round() as usize;
    if frame_size == 0 {
        return Vec::new();
    }

    let profile = integrated_profile(samples, frame_size);
    let taus = tau_frames();
    let fluctuations: Vec<f64> = taus.iter().map(|&tau| fluctuation(&profile, tau)).collect();

    taus.windows(2)
        .zip(fluctuations.windows(2))
        .map(|(tau, f)| {
            if f[0] <= 0.0 || f[1] <= 0.0 {
                return 0.0;
            }
            (f[1] / f[0]).log10() / ((tau[1] as f64 + 3.0) / (tau[0] as f64 + 3.0)).log10()
        })
        .collect()
}

/// Per-frame standard deviation, mean-removed and cumulatively summed
fn integrated_profile(samples: &[f32], frame_size: usize) -> Vec<f64> {
    let deviations: Vec<f64> = samples
        .chunks_exact(frame_size)
        .map(|frame| {
            let n = frame.len() as f64;
            let mean = frame.iter().map(|&s| s as f64).sum::<f64>() / n;
            (frame.iter().map(|&s| (s as f64 - mean).powi(2)).sum::<f64>() / n).sqrt()
        })
        .collect();

    if deviations.is_empty() {
        return deviations;
    }

    let mean = deviations.iter().sum::<f64>() / deviations.len() as f64;
    let mut running = 0.0;
    deviations
        .into_iter()
        .map(|d| {
            running += d - mean;
            running
        })
        .collect()
}

/// Root-mean residual of linear fits over windows of `tau` frames,
/// advancing by `max(tau / 50, 1)` frames. Zero when the profile is not
/// longer than the window.
fn fluctuation(profile: &[f64], tau: usize) -> f64 {
    if tau < 2 || profile.len() <= tau {
        return 0.0;
    }

    let jump = (tau / 50).max(1);
    let mut total = 0.0;
    let mut windows = 0usize;

    for start in (0..profile.len() - tau).step_by(jump) {
        total += residual_error(&profile[start..start + tau]);
        windows += 1;
    }

    if windows == 0 {
        return 0.0;
    }
    (total / windows as f64).sqrt()
}

/// Mean squared residual of the least-squares line through `values`
fn residual_error(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    let x_mean = (n - 1.0) / 2.0;
    let y_mean = values.iter().sum::<f64>() / n;

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    for (i, &y) in values.iter().enumerate() {
        let dx = i as f64 - x_mean;
        sxy += dx * (y - y_mean);
        sxx += dx * dx;
    }
    let slope = if sxx > 0.0 { sxy / sxx } else { 0.0 };

    values
        .iter()
        .enumerate()
        .map(|(i, &y)| {
            let fitted = y_mean + slope * (i as f64 - x_mean);
            (y - fitted).powi(2)
        })
        .sum::<f64>()
        / n
}
