//! Homomorphic (cepstral) minimum-phase factorization.
//!
//! A minimum-phase filter is recovered from any FIR's magnitude response by
//! folding its real cepstrum onto positive quefrencies:
//!
//! ```text
//! c      = IFFT( log(|FFT(h)| + ε) )         real cepstrum
//! ĉ[n]   = c[n]·w[n],   w = [1, 2, …, 2, 1, 0, …, 0]   (w[N/2] = 1)
//! H_min  = exp( FFT(ĉ) )
//! h_min  = IFFT(H_min)[..len(h)]
//! ```
//!
//! The result shares `|H|` with the input up to cepstral aliasing, which
//! shrinks as the analysis length grows. Deep stopband nulls are limited by
//! `ε`: lowering it sharpens nulls but amplifies aliasing.
//!
//! Reference: Oppenheim & Schafer, "Discrete-Time Signal Processing"
//! (3rd ed.), ch. 13.

use crate::error::{KernelError, Result};
use crate::spectral::magnitude;
use crate::transform::{Spectrum, fft_in_place, fft_padded, ifft_in_place};

/// Additive floor inside the cepstral logarithm.
pub const CEPSTRAL_FLOOR: f64 = 1e-10;

/// Default analysis length for minimum-phase reconstruction.
pub const DEFAULT_ANALYSIS_LEN: usize = 1024;

fn check_analysis(h: &[f64], analysis_len: usize) -> Result<()> {
    if h.is_empty() {
        return Err(KernelError::invalid("h", "impulse response is empty"));
    }
    if !analysis_len.is_power_of_two() {
        return Err(KernelError::NotPowerOfTwo { len: analysis_len });
    }
    if h.len() > analysis_len {
        return Err(KernelError::LengthMismatch {
            expected: analysis_len,
            actual: h.len(),
        });
    }
    Ok(())
}

/// Real cepstrum of `h` over `analysis_len` bins, using `floor` inside the log.
pub fn real_cepstrum(h: &[f64], analysis_len: usize, floor: f64) -> Result<Vec<f64>> {
    check_analysis(h, analysis_len)?;
    let spectrum = fft_padded(h, analysis_len)?;
    let log_mag: Vec<f64> = magnitude(&spectrum)
        .into_iter()
        .map(|m| (m + floor).ln())
        .collect();

    let mut cepstrum = Spectrum::from_real(&log_mag);
    ifft_in_place(&mut cepstrum)?;
    Ok(cepstrum.re)
}

/// Minimum-phase counterpart of `h` with [`CEPSTRAL_FLOOR`].
pub fn minimum_phase(h: &[f64], analysis_len: usize) -> Result<Vec<f64>> {
    minimum_phase_with_floor(h, analysis_len, CEPSTRAL_FLOOR)
}

/// Minimum-phase counterpart of `h` with an explicit log floor.
///
/// Very small floors on filters with exact spectral zeros produce huge
/// negative log magnitudes; the reconstruction stays finite but its
/// stopband can deviate noticeably from the input.
pub fn minimum_phase_with_floor(h: &[f64], analysis_len: usize, floor: f64) -> Result<Vec<f64>> {
    if !(floor > 0.0 && floor.is_finite()) {
        return Err(KernelError::invalid("floor", "must be positive and finite"));
    }
    let cepstrum = real_cepstrum(h, analysis_len, floor)?;

    #[cfg(feature = "tracing")]
    tracing::debug!(taps = h.len(), analysis_len, floor, "minimum_phase");

    let n = analysis_len;
    let half = n / 2;
    let mut folded = Spectrum::zeros(n);
    for (i, c) in cepstrum.iter().enumerate() {
        let w = if i == 0 || i == half {
            1.0
        } else if i < half {
            2.0
        } else {
            0.0
        };
        folded.re[i] = c * w;
    }
    fft_in_place(&mut folded)?;

    for (re, im) in folded.re.iter_mut().zip(folded.im.iter_mut()) {
        let mag = re.exp();
        let (s, c) = im.sin_cos();
        *re = mag * c;
        *im = mag * s;
    }
    ifft_in_place(&mut folded)?;

    folded.re.truncate(h.len());
    Ok(folded.re)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_already_minimum_phase_is_preserved() {
        // 1 + 0.5z⁻¹ has its zero inside the unit circle.
        let h = vec![1.0, 0.5];
        let m = minimum_phase(&h, 256).unwrap();
        assert!((m[0] - 1.0).abs() < 1e-6, "{m:?}");
        assert!((m[1] - 0.5).abs() < 1e-6, "{m:?}");
    }

    #[test]
    fn test_maximum_phase_is_reflected() {
        // 0.5 + z⁻¹ has the same magnitude as 1 + 0.5z⁻¹.
        let m = minimum_phase(&[0.5, 1.0], 256).unwrap();
        assert!((m[0] - 1.0).abs() < 1e-6, "{m:?}");
        assert!((m[1] - 0.5).abs() < 1e-6, "{m:?}");
    }

    #[test]
    fn test_cepstrum_of_impulse_is_zero() {
        let c = real_cepstrum(&[1.0], 64, CEPSTRAL_FLOOR).unwrap();
        assert!(c.iter().all(|v| v.abs() < 1e-9));
    }

    #[test]
    fn test_rejects_bad_lengths() {
        assert!(matches!(
            minimum_phase(&[1.0; 4], 100),
            Err(KernelError::NotPowerOfTwo { len: 100 })
        ));
        assert!(matches!(
            minimum_phase(&[1.0; 40], 32),
            Err(KernelError::LengthMismatch { .. })
        ));
        assert!(minimum_phase(&[], 32).is_err());
        assert!(minimum_phase_with_floor(&[1.0], 32, 0.0).is_err());
    }
}
