//! Spectral utilities built on the transform engine.
//!
//! - [`magnitude`] / [`phase`] views of a [`Spectrum`]
//! - [`to_db`] with an explicit additive floor
//! - [`unwrap_phase`] and the forward-difference [`group_delay`] estimator
//! - [`analytic_signal`] / [`envelope`] via the FFT Hilbert transform
//! - [`windowed_spectrum_db`] for quick "spectrum analyzer" views

use std::f64::consts::PI;

use crate::error::{KernelError, Result};
use crate::transform::{Spectrum, fft_in_place, ifft_in_place};
use crate::window::Window;

/// Additive floor for magnitude-to-dB conversion of analysis spectra.
pub const DB_FLOOR: f64 = 1e-9;

/// Finer floor for filter responses plotted down to −80 dB and beyond.
pub const DB_FLOOR_FINE: f64 = 1e-12;

/// Magnitude per bin: `sqrt(re² + im²)`.
pub fn magnitude(spectrum: &Spectrum) -> Vec<f64> {
    spectrum
        .re
        .iter()
        .zip(spectrum.im.iter())
        .map(|(re, im)| re.hypot(*im))
        .collect()
}

/// Phase per bin in (−π, π]: `atan2(im, re)`.
pub fn phase(spectrum: &Spectrum) -> Vec<f64> {
    spectrum
        .re
        .iter()
        .zip(spectrum.im.iter())
        .map(|(re, im)| im.atan2(*re))
        .collect()
}

/// Convert linear magnitudes to dB: `20·log10(m + floor)`.
///
/// The floor keeps true zeros finite. Use [`DB_FLOOR`] or [`DB_FLOOR_FINE`]
/// unless a plot range calls for something else.
pub fn to_db(magnitudes: &[f64], floor: f64) -> Vec<f64> {
    magnitudes
        .iter()
        .map(|&m| 20.0 * (m + floor).log10())
        .collect()
}

/// Wrap an angle into (−π, π].
pub fn wrap_to_pi(angle: f64) -> f64 {
    let wrapped = (angle + PI).rem_euclid(2.0 * PI) - PI;
    if wrapped <= -PI { wrapped + 2.0 * PI } else { wrapped }
}

/// Unwrap a wrapped phase sequence.
///
/// Index 0 passes through unchanged; every consecutive difference is wrapped
/// into (−π, π] before being accumulated, producing a continuous curve.
pub fn unwrap_phase(phase: &[f64]) -> Vec<f64> {
    let Some(&first) = phase.first() else {
        return Vec::new();
    };

    let mut unwrapped = Vec::with_capacity(phase.len());
    unwrapped.push(first);
    let mut acc = first;
    for pair in phase.windows(2) {
        acc += wrap_to_pi(pair[1] - pair[0]);
        unwrapped.push(acc);
    }
    unwrapped
}

/// Group delay in samples from an unwrapped phase curve over a full FFT grid.
///
/// This is a first-order forward difference, not an analytic group delay:
///
/// ```text
/// gd[i] = −(φ[i+1] − φ[i]) / (2π / N)     for i < N−1
/// gd[N−1] = gd[N−2]
/// ```
///
/// where N is the number of bins. The one-bin offset biases the estimate by
/// half a bin; that bias is kept so plots stay comparable across lessons.
pub fn group_delay(unwrapped: &[f64]) -> Vec<f64> {
    let n = unwrapped.len();
    match n {
        0 => return Vec::new(),
        1 => return vec![0.0],
        _ => {}
    }

    let bin_step = 2.0 * PI / n as f64;
    let mut gd: Vec<f64> = unwrapped
        .windows(2)
        .map(|pair| -(pair[1] - pair[0]) / bin_step)
        .collect();
    gd.push(gd[n - 2]);
    gd
}

/// [`group_delay`] of a wrapped phase sequence (unwraps first).
pub fn group_delay_from_phase(phase: &[f64]) -> Vec<f64> {
    group_delay(&unwrap_phase(phase))
}

/// Smallest power of two that is ≥ `n` (1 for `n == 0`).
pub fn next_power_of_two(n: usize) -> usize {
    n.max(1).next_power_of_two()
}

/// Append zeros up to `len` samples. Never truncates.
pub fn zero_pad(signal: &[f64], len: usize) -> Vec<f64> {
    let mut padded = signal.to_vec();
    if padded.len() < len {
        padded.resize(len, 0.0);
    }
    padded
}

/// Rotate a full spectrum so DC sits in the middle (bins `N/2..` first).
pub fn fft_shift(values: &[f64]) -> Vec<f64> {
    let half = values.len() / 2;
    values[half..].iter().chain(values[..half].iter()).copied().collect()
}

/// Analytic signal `x + j·H{x}` via the FFT Hilbert transform.
///
/// The signal is zero-padded to the next power of two, its negative
/// frequencies are zeroed and positive frequencies doubled (DC and Nyquist
/// kept), and the inverse transform is truncated back to the input length.
/// `re` reproduces the input; `im` is its Hilbert transform.
pub fn analytic_signal(signal: &[f64]) -> Result<Spectrum> {
    if signal.is_empty() {
        return Ok(Spectrum::default());
    }
    let n = next_power_of_two(signal.len());
    let mut spectrum = Spectrum::zeros(n);
    spectrum.re[..signal.len()].copy_from_slice(signal);
    fft_in_place(&mut spectrum)?;

    if n > 1 {
        let half = n / 2;
        for k in 1..half {
            spectrum.re[k] *= 2.0;
            spectrum.im[k] *= 2.0;
        }
        for k in half + 1..n {
            spectrum.re[k] = 0.0;
            spectrum.im[k] = 0.0;
        }
    }

    ifft_in_place(&mut spectrum)?;
    spectrum.re.truncate(signal.len());
    spectrum.im.truncate(signal.len());
    Ok(spectrum)
}

/// Instantaneous amplitude: magnitude of the [`analytic_signal`].
pub fn envelope(signal: &[f64]) -> Result<Vec<f64>> {
    Ok(magnitude(&analytic_signal(signal)?))
}

/// Hann-windowed magnitude spectrum in dB over the lower half of the bins.
///
/// The signal is truncated to the largest power of two that fits, so no
/// zero-padding smears the analysis.
pub fn windowed_spectrum_db(signal: &[f64]) -> Result<Vec<f64>> {
    if signal.len() < 2 {
        return Err(KernelError::invalid(
            "signal",
            "need at least two samples for a spectrum",
        ));
    }
    let n = 1usize << signal.len().ilog2();
    let mut frame = signal[..n].to_vec();
    Window::Hann.apply(&mut frame);

    let mut spectrum = Spectrum::from_real(&frame);
    fft_in_place(&mut spectrum)?;
    let mags = magnitude(&spectrum);
    Ok(to_db(&mags[..n / 2], DB_FLOOR))
}
