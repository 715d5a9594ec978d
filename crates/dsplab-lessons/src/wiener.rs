//! Wiener restoration: the MSE-optimal FIR that maps a noisy observation back
//! to the clean signal, from second-order statistics.
//!
//! With `y` the received signal and `x` the clean one, the taps solve the
//! normal equations `R_yy·h = r_xy`, where `R_yy` is the Toeplitz matrix of
//! the autocorrelation of `y` and `r_xy[k] = Σ x[n]·y[n−k]`. A small ridge
//! term on the diagonal keeps the system well conditioned.

use std::f64::consts::PI;
use std::fmt;

use dsplab_kernel::{
    KernelError, autocorrelation, convolve, correlate, linspace, mean_square_error, solve,
    toeplitz,
};
use serde::{Deserialize, Serialize};

use crate::error::{LessonError, Result, check_len};
use crate::signal::{self, MAX_FILTER_LEN, MAX_SAMPLES};

const LESSON: &str = "wiener";

/// Diagonal loading added to `R_yy` before solving.
pub const REGULARIZATION: f64 = 1e-6;

/// Result of [`wiener_design`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WienerDesign {
    /// Filter taps.
    pub coeffs: Vec<f64>,
    /// MSE between clean and received.
    pub mse_before: f64,
    /// MSE between clean and restored.
    pub mse_after: f64,
    /// Received signal filtered by `coeffs`, truncated to the input length.
    pub restored: Vec<f64>,
}

impl WienerDesign {
    /// `10·log10(mse_before / mse_after)`.
    pub fn improvement_db(&self) -> f64 {
        10.0 * (self.mse_before / self.mse_after).log10()
    }
}

/// Design a `taps`-long Wiener filter from a clean reference and its noisy observation.
pub fn wiener_design(clean: &[f64], received: &[f64], taps: usize) -> Result<WienerDesign> {
    if clean.len() != received.len() {
        return Err(KernelError::LengthMismatch {
            expected: clean.len(),
            actual: received.len(),
        }
        .into());
    }
    let n = received.len();
    if taps == 0 || taps > n {
        return Err(LessonError::invalid(
            LESSON,
            format!("taps must lie in 1..={n}, got {taps}"),
        ));
    }

    // Zero lag of correlate(x, y) sits at index |y| − 1.
    let cross = correlate(clean, received);
    let r_xy = &cross[n - 1..n - 1 + taps];
    let r_yy = autocorrelation(received, taps - 1);

    let mut r = toeplitz(&r_yy);
    r.add_to_diagonal(REGULARIZATION);
    let coeffs = solve(&r, r_xy)?;

    let mut restored = convolve(received, &coeffs);
    restored.truncate(n);

    Ok(WienerDesign {
        mse_before: mean_square_error(clean, received)?,
        mse_after: mean_square_error(clean, &restored)?,
        coeffs,
        restored,
    })
}

/// Noise presets, as standard deviations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoiseLevel {
    /// σ = 0.1
    Low,
    /// σ = 0.4
    #[default]
    Medium,
    /// σ = 0.8
    High,
    /// σ = 1.5
    Critical,
}

impl NoiseLevel {
    /// Noise standard deviation.
    pub fn std(self) -> f64 {
        match self {
            NoiseLevel::Low => 0.1,
            NoiseLevel::Medium => 0.4,
            NoiseLevel::High => 0.8,
            NoiseLevel::Critical => 1.5,
        }
    }
}

/// Wiener lesson parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WienerParams {
    /// Filter length.
    pub taps: usize,
    /// Noise preset.
    pub noise: NoiseLevel,
    /// Signal length.
    pub signal_len: usize,
    /// Noise seed.
    pub seed: u64,
}

impl Default for WienerParams {
    fn default() -> Self {
        Self {
            taps: 15,
            noise: NoiseLevel::Medium,
            signal_len: 500,
            seed: 42,
        }
    }
}

impl WienerParams {
    /// Check ranges.
    pub fn validate(&self) -> Result<()> {
        check_len(LESSON, "signal_len", self.signal_len, 2, MAX_SAMPLES)?;
        check_len(
            LESSON,
            "taps",
            self.taps,
            1,
            self.signal_len.min(MAX_FILTER_LEN),
        )
    }
}

/// Wiener lesson output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WienerReport {
    /// Noise preset used.
    pub noise: NoiseLevel,
    /// Filter taps.
    pub coeffs: Vec<f64>,
    /// MSE before filtering.
    pub mse_before: f64,
    /// MSE after filtering.
    pub mse_after: f64,
    /// MSE reduction in dB.
    pub improvement_db: f64,
    /// Clean reference.
    pub clean: Vec<f64>,
    /// Noisy observation.
    pub received: Vec<f64>,
    /// Filter output.
    pub restored: Vec<f64>,
}

/// Damped 5 Hz tone plus a 20 Hz component over one second.
pub fn reference_signal(len: usize) -> Vec<f64> {
    linspace(0.0, 1.0, len)
        .iter()
        .map(|&t| (2.0 * PI * 5.0 * t).sin() * (-2.0 * t).exp() + 0.5 * (2.0 * PI * 20.0 * t).sin())
        .collect()
}

/// Corrupt the reference with seeded noise and restore it.
pub fn run(params: &WienerParams) -> Result<WienerReport> {
    params.validate()?;

    let clean = reference_signal(params.signal_len);
    let mut rng = signal::seeded(params.seed);
    let noise = signal::gaussian_noise(params.signal_len, params.noise.std(), &mut rng);
    let received: Vec<f64> = clean.iter().zip(&noise).map(|(c, w)| c + w).collect();

    let design = wiener_design(&clean, &received, params.taps)?;
    let improvement_db = design.improvement_db();
    tracing::debug!(
        noise = ?params.noise,
        taps = params.taps,
        mse_before = design.mse_before,
        mse_after = design.mse_after,
        improvement_db,
        "wiener"
    );

    Ok(WienerReport {
        noise: params.noise,
        coeffs: design.coeffs,
        mse_before: design.mse_before,
        mse_after: design.mse_after,
        improvement_db,
        clean,
        received,
        restored: design.restored,
    })
}

impl fmt::Display for WienerReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Wiener restoration ({} taps, {:?} noise)",
            self.coeffs.len(),
            self.noise
        )?;
        writeln!(f, "  MSE before:  {:.5}", self.mse_before)?;
        writeln!(f, "  MSE after:   {:.5}", self.mse_after)?;
        write!(f, "  improvement: {:.2} dB", self.improvement_db)
    }
}
