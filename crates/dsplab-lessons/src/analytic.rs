//! Analytic signals: envelope detection, the FIR Hilbert transformer and
//! single-sideband modulation.

use std::f64::consts::PI;
use std::fmt;

use dsplab_kernel::{
    DB_FLOOR, IirCoefficients, Window, analytic_signal, envelope, fft, fft_shift, fir_hilbert,
    linspace, magnitude, to_db,
};
use serde::{Deserialize, Serialize};

use crate::error::{LessonError, Result, check_len};
use crate::signal::{self, MAX_FILTER_LEN, MAX_SAMPLES};

const LESSON: &str = "analytic";

/// Signal whose envelope is extracted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnvelopeSignal {
    /// `(1 + m·cos 2πf_m t)·cos 2πf_c t`.
    #[default]
    Am,
    /// Unit-amplitude linear chirp.
    Chirp,
}

/// Sideband kept by the SSB modulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sideband {
    /// Upper sideband: `m·cos − m̂·sin`.
    #[default]
    Upper,
    /// Lower sideband: `m·cos + m̂·sin`.
    Lower,
}

/// Message tones for the SSB demo, `(frequency Hz, amplitude)`.
pub const SSB_TONES: [(f64, f64); 3] = [(300.0, 1.0), (600.0, 0.5), (900.0, 0.3)];

/// Analytic-signal lesson parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticParams {
    /// Envelope demo input.
    pub signal: EnvelopeSignal,
    /// Envelope demo sample rate in Hz.
    pub fs: f64,
    /// Envelope demo duration in seconds.
    pub duration: f64,
    /// AM carrier in Hz.
    pub carrier: f64,
    /// AM modulating frequency in Hz.
    pub modulation_freq: f64,
    /// AM modulation index.
    pub modulation_index: f64,
    /// Chirp start frequency in Hz.
    pub chirp_start: f64,
    /// Chirp end frequency in Hz.
    pub chirp_end: f64,
    /// Hilbert FIR length.
    pub hilbert_taps: usize,
    /// SSB sample rate in Hz.
    pub ssb_fs: f64,
    /// SSB block length (power of two).
    pub ssb_len: usize,
    /// SSB carrier in Hz.
    pub ssb_carrier: f64,
    /// Sideband to generate.
    pub sideband: Sideband,
}

impl Default for AnalyticParams {
    fn default() -> Self {
        Self {
            signal: EnvelopeSignal::Am,
            fs: 1000.0,
            duration: 0.5,
            carrier: 100.0,
            modulation_freq: 5.0,
            modulation_index: 0.8,
            chirp_start: 20.0,
            chirp_end: 200.0,
            hilbert_taps: 31,
            ssb_fs: 8000.0,
            ssb_len: 2048,
            ssb_carrier: 2000.0,
            sideband: Sideband::Upper,
        }
    }
}

impl AnalyticParams {
    /// Number of envelope-demo samples, 0 when `fs · duration` is not a
    /// usable length.
    pub fn envelope_len(&self) -> usize {
        signal::checked_len((self.fs * self.duration).round()).unwrap_or(0)
    }

    /// Check ranges.
    pub fn validate(&self) -> Result<()> {
        if !(self.fs > 0.0 && self.duration > 0.0) || self.envelope_len() < 2 {
            return Err(LessonError::invalid(
                LESSON,
                format!("fs and duration must give 2..={MAX_SAMPLES} samples"),
            ));
        }
        if !(self.carrier > 0.0 && self.carrier < self.fs / 2.0) {
            return Err(LessonError::invalid(
                LESSON,
                format!("carrier must lie in (0, fs/2), got {}", self.carrier),
            ));
        }
        if !(0.0..=1.0).contains(&self.modulation_index) {
            return Err(LessonError::invalid(
                LESSON,
                format!(
                    "modulation_index must lie in [0, 1], got {}",
                    self.modulation_index
                ),
            ));
        }
        check_len(LESSON, "hilbert_taps", self.hilbert_taps, 1, MAX_FILTER_LEN)?;
        check_len(LESSON, "ssb_len", self.ssb_len, 2, MAX_SAMPLES)?;
        if !self.ssb_len.is_power_of_two() {
            return Err(LessonError::invalid(
                LESSON,
                format!("ssb_len {} is not a power of two >= 2", self.ssb_len),
            ));
        }
        if !(self.ssb_carrier > 0.0 && self.ssb_carrier < self.ssb_fs / 2.0) {
            return Err(LessonError::invalid(
                LESSON,
                format!("ssb_carrier must lie in (0, ssb_fs/2), got {}", self.ssb_carrier),
            ));
        }
        Ok(())
    }
}

/// Analytic-signal lesson output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyticReport {
    /// Envelope demo input.
    pub signal: Vec<f64>,
    /// Envelope extracted through the analytic signal.
    pub envelope: Vec<f64>,
    /// Envelope used to synthesize the input.
    pub true_envelope: Vec<f64>,
    /// Mean absolute envelope error over the middle half of the block.
    pub envelope_error: f64,
    /// FIR Hilbert transformer taps.
    pub hilbert_fir: Vec<f64>,
    /// Its magnitude response over `[0, π]`.
    pub hilbert_magnitude: Vec<f64>,
    /// Sideband generated.
    pub sideband: Sideband,
    /// SSB signal.
    pub ssb: Vec<f64>,
    /// Frequencies in Hz for `ssb_spectrum_db`, from `−fs/2`.
    pub ssb_freqs: Vec<f64>,
    /// Centered SSB spectrum in dB.
    pub ssb_spectrum_db: Vec<f64>,
    /// Energy in the kept sideband over the rejected one, in dB.
    pub sideband_rejection_db: f64,
}

/// Sample the envelope demo input and its true envelope.
fn envelope_input(params: &AnalyticParams) -> (Vec<f64>, Vec<f64>) {
    let t = linspace(0.0, params.duration, params.envelope_len());
    match params.signal {
        EnvelopeSignal::Am => {
            let env: Vec<f64> = t
                .iter()
                .map(|&t| {
                    1.0 + params.modulation_index * (2.0 * PI * params.modulation_freq * t).cos()
                })
                .collect();
            let x = t
                .iter()
                .zip(&env)
                .map(|(&t, e)| e * (2.0 * PI * params.carrier * t).cos())
                .collect();
            (x, env)
        }
        EnvelopeSignal::Chirp => {
            let sweep = (params.chirp_end - params.chirp_start) / (2.0 * params.duration);
            let x = t
                .iter()
                .map(|&t| (2.0 * PI * (params.chirp_start * t + sweep * t * t)).sin())
                .collect();
            (x, vec![1.0; t.len()])
        }
    }
}

/// Multi-tone message for the SSB demo.
pub fn ssb_message(len: usize, fs: f64) -> Vec<f64> {
    (0..len)
        .map(|i| {
            let t = i as f64 / fs;
            SSB_TONES
                .iter()
                .map(|&(f, a)| a * (2.0 * PI * f * t).cos())
                .sum()
        })
        .collect()
}

/// Single-sideband modulation of `message` through its analytic signal.
pub fn ssb_modulate(message: &[f64], fs: f64, carrier: f64, sideband: Sideband) -> Result<Vec<f64>> {
    let z = analytic_signal(message)?;
    let sign = match sideband {
        Sideband::Upper => -1.0,
        Sideband::Lower => 1.0,
    };
    Ok(z.re
        .iter()
        .zip(&z.im)
        .enumerate()
        .map(|(i, (m, mh))| {
            let w = 2.0 * PI * carrier * i as f64 / fs;
            m * w.cos() + sign * mh * w.sin()
        })
        .collect())
}

/// Run the envelope, Hilbert FIR and SSB demos.
pub fn run(params: &AnalyticParams) -> Result<AnalyticReport> {
    params.validate()?;

    let (signal, true_envelope) = envelope_input(params);
    let env = envelope(&signal)?;
    let quarter = signal.len() / 4;
    let middle = quarter..signal.len() - quarter;
    let envelope_error = env[middle.clone()]
        .iter()
        .zip(&true_envelope[middle.clone()])
        .map(|(a, b)| (a - b).abs())
        .sum::<f64>()
        / middle.len().max(1) as f64;

    let hilbert_fir = fir_hilbert(params.hilbert_taps, Window::Hamming)?;
    let (_, hilbert_magnitude) = IirCoefficients::fir(hilbert_fir.clone())?.magnitude_response(128);

    let n = params.ssb_len;
    let message = ssb_message(n, params.ssb_fs);
    let ssb = ssb_modulate(&message, params.ssb_fs, params.ssb_carrier, params.sideband)?;
    let mags = magnitude(&fft(&ssb)?);

    // Bin k sits at k·fs/N for k < N/2 and (k − N)·fs/N above.
    let bin_hz = params.ssb_fs / n as f64;
    let (mut upper, mut lower) = (0.0, 0.0);
    for (k, m) in mags.iter().enumerate() {
        let f = if k < n / 2 { k as f64 } else { k as f64 - n as f64 } * bin_hz;
        if f.abs() > params.ssb_carrier {
            upper += m * m;
        } else if f.abs() < params.ssb_carrier {
            lower += m * m;
        }
    }
    let (kept, rejected) = match params.sideband {
        Sideband::Upper => (upper, lower),
        Sideband::Lower => (lower, upper),
    };
    let sideband_rejection_db = 10.0 * (kept / (rejected + f64::MIN_POSITIVE)).log10();

    let ssb_freqs = (0..n)
        .map(|k| (k as f64 - (n / 2) as f64) * bin_hz)
        .collect();
    let ssb_spectrum_db = to_db(&fft_shift(&mags), DB_FLOOR);

    tracing::debug!(
        signal = ?params.signal,
        envelope_error,
        sideband = ?params.sideband,
        sideband_rejection_db,
        "analytic"
    );

    Ok(AnalyticReport {
        signal,
        envelope: env,
        true_envelope,
        envelope_error,
        hilbert_fir,
        hilbert_magnitude,
        sideband: params.sideband,
        ssb,
        ssb_freqs,
        ssb_spectrum_db,
        sideband_rejection_db,
    })
}

impl fmt::Display for AnalyticReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Analytic signal")?;
        writeln!(
            f,
            "  envelope error:     {:.4} (mean abs, middle half)",
            self.envelope_error
        )?;
        writeln!(f, "  hilbert FIR taps:   {}", self.hilbert_fir.len())?;
        write!(
            f,
            "  SSB {:?} rejection: {:.1} dB",
            self.sideband, self.sideband_rejection_db
        )
    }
}
