//! Scalar quantization: uniform quantizer SNR against the 6 dB/bit rule, and
//! Lloyd-Max design for a Gaussian source.

use std::f64::consts::PI;
use std::fmt;

use dsplab_kernel::quantize::MAX_BITS;
use dsplab_kernel::{LloydMax, UniformQuantizer, linspace, snr_db, theoretical_snr_db};
use serde::{Deserialize, Serialize};

use crate::error::{LessonError, Result, check_len};
use crate::signal::MAX_SAMPLES;

const LESSON: &str = "quantization";

/// Most Lloyd-Max levels; the Gaussian grid has 801 points.
pub const MAX_LLOYD_LEVELS: usize = 256;

/// Test waveforms, one period over the block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Waveform {
    /// `sin t`.
    #[default]
    Sine,
    /// Symmetric triangle in `[−1, 1]`.
    Triangular,
    /// Rising sawtooth in `[−1, 1)`.
    Sawtooth,
}

impl Waveform {
    /// Unit-amplitude value at phase `t` (period 2π).
    pub fn value(self, t: f64) -> f64 {
        let u = t / (2.0 * PI);
        let saw = 2.0 * (u - (u + 0.5).floor());
        match self {
            Waveform::Sine => t.sin(),
            Waveform::Triangular => 2.0 * saw.abs() - 1.0,
            Waveform::Sawtooth => saw,
        }
    }
}

/// Quantization lesson parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuantizationParams {
    /// Test waveform.
    pub waveform: Waveform,
    /// Quantizer resolution.
    pub bits: u32,
    /// Waveform amplitude relative to full scale.
    pub amplitude: f64,
    /// Samples in the block.
    pub samples: usize,
    /// Lloyd-Max reconstruction levels.
    pub lloyd_levels: usize,
}

impl Default for QuantizationParams {
    fn default() -> Self {
        Self {
            waveform: Waveform::Sine,
            bits: 4,
            amplitude: 1.0,
            samples: 1000,
            lloyd_levels: 4,
        }
    }
}

impl QuantizationParams {
    /// Check ranges.
    pub fn validate(&self) -> Result<()> {
        if self.bits == 0 || self.bits > MAX_BITS {
            return Err(LessonError::invalid(
                LESSON,
                format!("bits must lie in 1..={MAX_BITS}, got {}", self.bits),
            ));
        }
        if !(self.amplitude > 0.0 && self.amplitude <= 1.0) {
            return Err(LessonError::invalid(
                LESSON,
                format!("amplitude must lie in (0, 1], got {}", self.amplitude),
            ));
        }
        check_len(LESSON, "samples", self.samples, 2, MAX_SAMPLES)?;
        check_len(LESSON, "lloyd_levels", self.lloyd_levels, 1, MAX_LLOYD_LEVELS)
    }
}

/// Lloyd-Max section of the report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LloydMaxReport {
    /// Reconstruction levels.
    pub centroids: Vec<f64>,
    /// Decision boundaries.
    pub boundaries: Vec<f64>,
    /// MSE before the first iteration and after each one.
    pub mse_history: Vec<f64>,
    /// Iterations until convergence or the cap.
    pub iterations: usize,
}

/// Quantization lesson output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuantizationReport {
    /// Waveform used.
    pub waveform: Waveform,
    /// Resolution.
    pub bits: u32,
    /// Step size Δ.
    pub step: f64,
    /// Input block.
    pub signal: Vec<f64>,
    /// Quantized block.
    pub quantized: Vec<f64>,
    /// Per-sample error.
    pub error: Vec<f64>,
    /// Measured SNR in dB.
    pub snr_measured: f64,
    /// Textbook SNR in dB.
    pub snr_theoretical: f64,
    /// Lloyd-Max design for a unit Gaussian.
    pub lloyd_max: LloydMaxReport,
}

/// Quantize one period of the waveform and design a Lloyd-Max quantizer.
pub fn run(params: &QuantizationParams) -> Result<QuantizationReport> {
    params.validate()?;

    let signal: Vec<f64> = linspace(0.0, 2.0 * PI, params.samples)
        .into_iter()
        .map(|t| params.amplitude * params.waveform.value(t))
        .collect();
    let quantizer = UniformQuantizer::new(params.bits)?;
    let q = quantizer.quantize(&signal);
    let snr_measured = snr_db(&signal, &q.values)?;
    let snr_theoretical = theoretical_snr_db(
        params.bits,
        params.amplitude,
        params.waveform == Waveform::Sine,
    );

    let mut lloyd = LloydMax::gaussian(params.lloyd_levels)?;
    let iterations = lloyd.converge_default();
    tracing::debug!(
        waveform = ?params.waveform,
        bits = params.bits,
        snr_measured,
        snr_theoretical,
        lloyd_mse = lloyd.mse(),
        iterations,
        "quantization"
    );

    Ok(QuantizationReport {
        waveform: params.waveform,
        bits: params.bits,
        step: quantizer.step(),
        signal,
        quantized: q.values,
        error: q.error,
        snr_measured,
        snr_theoretical,
        lloyd_max: LloydMaxReport {
            centroids: lloyd.centroids().to_vec(),
            boundaries: lloyd.boundaries().to_vec(),
            mse_history: lloyd.mse_history().to_vec(),
            iterations,
        },
    })
}

impl fmt::Display for QuantizationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Uniform quantization ({:?}, {} bits)", self.waveform, self.bits)?;
        writeln!(f, "  step:        {:.5}", self.step)?;
        writeln!(f, "  SNR measured:    {:.2} dB", self.snr_measured)?;
        writeln!(f, "  SNR theoretical: {:.2} dB", self.snr_theoretical)?;
        let levels: Vec<String> = self
            .lloyd_max
            .centroids
            .iter()
            .map(|c| format!("{c:.3}"))
            .collect();
        write!(
            f,
            "  Lloyd-Max ({} iterations): [{}]",
            self.lloyd_max.iterations,
            levels.join(", ")
        )
    }
}
