//! Additive white Gaussian noise at a chosen signal-to-noise ratio.
//!
//! A speech-like burst is measured for power, then mixed with Gaussian noise
//! whose variance is `P_signal / 10^(SNR/10)`. The report compares the SNR
//! actually realized by the noise draw with the requested one.

use std::fmt;

use dsplab_kernel::snr_db;
use serde::{Deserialize, Serialize};

use crate::error::{LessonError, Result};
use crate::signal::{self, MAX_SAMPLES};

const LESSON: &str = "noise";

/// Accepted SNR range in dB.
pub const SNR_RANGE_DB: (f64, f64) = (-40.0, 100.0);

/// Noise lesson parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseParams {
    /// Requested signal-to-noise ratio in dB.
    pub snr_db: f64,
    /// Sample rate in Hz.
    pub fs: f64,
    /// Duration in seconds.
    pub duration: f64,
    /// Voice fundamental in Hz.
    pub f0: f64,
    /// Syllable (envelope) rate in Hz.
    pub syllable_rate: f64,
    /// Exponential decay rate in 1/s.
    pub decay: f64,
    /// Noise seed.
    pub seed: u64,
}

impl Default for NoiseParams {
    fn default() -> Self {
        Self {
            snr_db: 40.0,
            fs: 44_100.0,
            duration: 2.0,
            f0: 200.0,
            syllable_rate: 5.0,
            decay: 0.5,
            seed: 5,
        }
    }
}

impl NoiseParams {
    /// Number of samples, 0 when `fs · duration` is not a usable length.
    pub fn sample_count(&self) -> usize {
        signal::checked_len((self.fs * self.duration).floor()).unwrap_or(0)
    }

    /// Check ranges.
    pub fn validate(&self) -> Result<()> {
        let (lo, hi) = SNR_RANGE_DB;
        if !(lo..=hi).contains(&self.snr_db) {
            return Err(LessonError::invalid(
                LESSON,
                format!("snr_db must lie in [{lo}, {hi}], got {}", self.snr_db),
            ));
        }
        if !(self.fs.is_finite() && self.fs > 0.0) || self.sample_count() < 2 {
            return Err(LessonError::invalid(
                LESSON,
                format!("fs and duration must give 2..={MAX_SAMPLES} samples"),
            ));
        }
        if !(self.f0 > 0.0 && 3.0 * self.f0 < self.fs / 2.0) {
            return Err(LessonError::invalid(
                LESSON,
                format!("third harmonic of f0 = {} must stay below fs/2", self.f0),
            ));
        }
        if !(self.syllable_rate.is_finite() && self.syllable_rate >= 0.0) {
            return Err(LessonError::invalid(
                LESSON,
                format!("syllable_rate must be finite and >= 0, got {}", self.syllable_rate),
            ));
        }
        if !(self.decay.is_finite() && self.decay >= 0.0) {
            return Err(LessonError::invalid(
                LESSON,
                format!("decay must be finite and >= 0, got {}", self.decay),
            ));
        }
        Ok(())
    }
}

/// Noise lesson output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NoiseReport {
    /// Sample rate in Hz.
    pub fs: f64,
    /// Clean burst.
    pub clean: Vec<f64>,
    /// Burst plus noise.
    pub noisy: Vec<f64>,
    /// Mean square of `clean`.
    pub signal_power: f64,
    /// Standard deviation of the added noise.
    pub noise_std: f64,
    /// Requested SNR in dB.
    pub target_snr_db: f64,
    /// SNR of the realized noise in dB.
    pub measured_snr_db: f64,
}

/// Noise standard deviation that puts `signal_power` at `snr_db`.
pub fn noise_std_for_snr(signal_power: f64, snr_db: f64) -> f64 {
    (signal_power / 10f64.powf(snr_db / 10.0)).sqrt()
}

/// Build the burst, add noise at the requested SNR and measure the result.
pub fn run(params: &NoiseParams) -> Result<NoiseReport> {
    params.validate()?;

    let clean = signal::speech_burst(
        params.sample_count(),
        params.fs,
        params.f0,
        params.syllable_rate,
        params.decay,
    );
    let signal_power = signal::mean_power(&clean);
    let noise_std = noise_std_for_snr(signal_power, params.snr_db);

    let mut rng = signal::seeded(params.seed);
    let noise = signal::gaussian_noise(clean.len(), noise_std, &mut rng);
    let noisy: Vec<f64> = clean.iter().zip(&noise).map(|(s, n)| s + n).collect();
    let measured_snr_db = snr_db(&clean, &noisy)?;
    tracing::debug!(
        target = params.snr_db,
        measured = measured_snr_db,
        signal_power,
        noise_std,
        "noise"
    );

    Ok(NoiseReport {
        fs: params.fs,
        clean,
        noisy,
        signal_power,
        noise_std,
        target_snr_db: params.snr_db,
        measured_snr_db,
    })
}

impl fmt::Display for NoiseReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Noise at {} dB SNR ({} samples at {} Hz)",
            self.target_snr_db,
            self.clean.len(),
            self.fs
        )?;
        writeln!(f, "  signal power: {:.5}", self.signal_power)?;
        writeln!(f, "  noise std:    {:.5}", self.noise_std)?;
        write!(f, "  measured SNR: {:.2} dB", self.measured_snr_db)
    }
}
