//! Deterministic test-signal generators shared by the lessons.

use std::f64::consts::PI;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Longest signal a lesson will generate.
pub const MAX_SAMPLES: usize = 1 << 22;

/// Longest filter, and highest model order, a lesson will design.
pub const MAX_FILTER_LEN: usize = 1024;

/// Convert an already-rounded sample count, rejecting non-finite, negative and
/// oversized values.
pub fn checked_len(count: f64) -> Option<usize> {
    (count.is_finite() && (0.0..=MAX_SAMPLES as f64).contains(&count)).then(|| count as usize)
}

/// Seeded generator so every lesson run is reproducible.
pub fn seeded(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// One standard normal draw (Box–Muller).
pub fn standard_normal(rng: &mut impl Rng) -> f64 {
    // 1 − U keeps the log argument in (0, 1].
    let u1 = 1.0 - rng.random::<f64>();
    let u2 = rng.random::<f64>();
    (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
}

/// `len` samples of zero-mean Gaussian noise with standard deviation `std`.
pub fn gaussian_noise(len: usize, std: f64, rng: &mut impl Rng) -> Vec<f64> {
    (0..len).map(|_| std * standard_normal(rng)).collect()
}

/// Uniform draw from `[low, high)`.
pub fn uniform(rng: &mut impl Rng, low: f64, high: f64) -> f64 {
    low + (high - low) * rng.random::<f64>()
}

/// Square wave at `f0` Hz sampled at `fs`, high for `duty_percent` of each period.
pub fn square_wave(len: usize, fs: f64, f0: f64, duty_percent: f64, amplitude: f64) -> Vec<f64> {
    let period = fs / f0;
    let high = period * duty_percent / 100.0;
    (0..len)
        .map(|i| {
            if (i as f64) % period < high {
                amplitude
            } else {
                -amplitude
            }
        })
        .collect()
}

/// Speech-like burst: harmonics at `f0`, `2·f0` and `3·f0` (weights 1, 0.5,
/// 0.2) under a raised-cosine envelope at `syllable_rate` Hz, decaying as
/// `exp(−decay·t)`.
pub fn speech_burst(len: usize, fs: f64, f0: f64, syllable_rate: f64, decay: f64) -> Vec<f64> {
    (0..len)
        .map(|i| {
            let t = i as f64 / fs;
            let envelope = 0.5 * (1.0 + (2.0 * PI * syllable_rate * t).cos());
            let voice = (2.0 * PI * f0 * t).sin()
                + 0.5 * (4.0 * PI * f0 * t).sin()
                + 0.2 * (6.0 * PI * f0 * t).sin();
            envelope * voice * (-decay * t).exp()
        })
        .collect()
}

/// Mean square of `x`, 0 for an empty slice.
pub fn mean_power(x: &[f64]) -> f64 {
    if x.is_empty() {
        0.0
    } else {
        x.iter().map(|v| v * v).sum::<f64>() / x.len() as f64
    }
}

/// Scale so the largest absolute sample is 1. All-zero input is returned unchanged.
pub fn normalize_peak(x: &mut [f64]) {
    let peak = x.iter().fold(0.0f64, |m, v| m.max(v.abs()));
    if peak > 0.0 {
        for v in x.iter_mut() {
            *v /= peak;
        }
    }
}
