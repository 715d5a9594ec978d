//! Sample-rate conversion: decimation, interpolation, the noble identity and
//! polyphase decomposition, plus the linear-phase FIR design they all rely on.

use std::fmt;

use dsplab_kernel::{
    DB_FLOOR_FINE, Window, convolve, fft_padded, fir_lowpass, magnitude, to_db,
    windowed_spectrum_db,
};
use serde::{Deserialize, Serialize};

use crate::error::{LessonError, Result, check_len};
use crate::signal::{self, MAX_FILTER_LEN, MAX_SAMPLES};

const LESSON: &str = "multirate";

/// Length of the anti-aliasing / reconstruction filter.
pub const ANTI_ALIAS_TAPS: usize = 63;

/// Keep the cutoff this fraction of the new Nyquist frequency.
pub const CUTOFF_MARGIN: f64 = 0.9;

/// Lowpass for a rate change by `factor`: cutoff `0.9·0.5/factor` cycles/sample.
pub fn anti_alias_filter(factor: usize) -> Result<Vec<f64>> {
    let cutoff = CUTOFF_MARGIN * 0.5 / factor as f64;
    Ok(fir_lowpass(ANTI_ALIAS_TAPS, cutoff, Window::Hamming)?)
}

/// Largest decimation or interpolation factor.
pub const MAX_RATE_FACTOR: usize = 64;

/// FFT length for the design response.
pub const DESIGN_FFT_LEN: usize = 1024;

/// Largest mirrored-tap difference still counted as symmetric.
pub const SYMMETRY_TOLERANCE: f64 = 1e-5;

/// True when `h[n]` and `h[N−1−n]` agree within `tol` for every `n`.
pub fn is_linear_phase(h: &[f64], tol: f64) -> bool {
    h.iter()
        .zip(h.iter().rev())
        .take(h.len() / 2)
        .all(|(a, b)| (a - b).abs() <= tol)
}

/// Windowed-sinc lowpass with its magnitude response and symmetry check.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FirDesignReport {
    /// Filter taps.
    pub taps: Vec<f64>,
    /// Magnitude in dB over bins `0..DESIGN_FFT_LEN/2`.
    pub magnitude_db: Vec<f64>,
    /// Taps are symmetric within [`SYMMETRY_TOLERANCE`].
    pub is_linear_phase: bool,
}

/// Design a lowpass and evaluate its response on a [`DESIGN_FFT_LEN`]-point grid.
pub fn design_lowpass(taps: usize, cutoff: f64, window: Window) -> Result<FirDesignReport> {
    check_len(LESSON, "design_taps", taps, 1, DESIGN_FFT_LEN)?;
    let h = fir_lowpass(taps, cutoff, window)?;
    let spectrum = fft_padded(&h, DESIGN_FFT_LEN)?;
    let magnitude_db = to_db(&magnitude(&spectrum)[..DESIGN_FFT_LEN / 2], DB_FLOOR_FINE);
    Ok(FirDesignReport {
        is_linear_phase: is_linear_phase(&h, SYMMETRY_TOLERANCE),
        taps: h,
        magnitude_db,
    })
}

/// Filter with `h` and remove its `⌊|h|/2⌋` group delay; output length equals input length.
pub fn filter_centered(signal: &[f64], h: &[f64]) -> Vec<f64> {
    let delay = h.len() / 2;
    convolve(signal, h)
        .into_iter()
        .skip(delay)
        .take(signal.len())
        .collect()
}

/// Keep every `factor`-th sample, starting with the first.
pub fn downsample(x: &[f64], factor: usize) -> Vec<f64> {
    x.iter().step_by(factor.max(1)).copied().collect()
}

/// Insert `factor − 1` zeros after every sample.
pub fn upsample(x: &[f64], factor: usize) -> Vec<f64> {
    let factor = factor.max(1);
    let mut out = vec![0.0; x.len() * factor];
    for (i, &v) in x.iter().enumerate() {
        out[i * factor] = v;
    }
    out
}

/// Optional anti-alias filtering followed by downsampling.
pub fn decimate(signal: &[f64], factor: usize, anti_alias: bool) -> Result<Vec<f64>> {
    check_factor(factor)?;
    if anti_alias && factor > 1 {
        let h = anti_alias_filter(factor)?;
        Ok(downsample(&filter_centered(signal, &h), factor))
    } else {
        Ok(downsample(signal, factor))
    }
}

/// Zero-stuffing followed by an optional reconstruction filter with gain `factor`.
pub fn interpolate(signal: &[f64], factor: usize, reconstruct: bool) -> Result<Vec<f64>> {
    check_factor(factor)?;
    let stuffed = upsample(signal, factor);
    if !reconstruct || factor == 1 {
        return Ok(stuffed);
    }
    let h: Vec<f64> = anti_alias_filter(factor)?
        .into_iter()
        .map(|c| c * factor as f64)
        .collect();
    Ok(filter_centered(&stuffed, &h))
}

fn check_factor(factor: usize) -> Result<()> {
    if factor == 0 {
        return Err(LessonError::invalid(LESSON, "factor must be positive"));
    }
    Ok(())
}

/// Both sides of the noble identity `(↓M)·H(z) = H(z^M)·(↓M)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NobleCheck {
    /// Downsample, then filter with `h`.
    pub left: Vec<f64>,
    /// Filter with `h` upsampled by `M`, then downsample.
    pub right: Vec<f64>,
    /// Largest difference over the common length.
    pub max_error: f64,
}

impl NobleCheck {
    /// Identity holds within `tol`.
    pub fn holds(&self, tol: f64) -> bool {
        self.max_error <= tol
    }
}

/// Evaluate both sides of the noble identity for `x`, `h` and factor `m`.
pub fn noble_identity(x: &[f64], h: &[f64], m: usize) -> Result<NobleCheck> {
    check_factor(m)?;
    let left = convolve(&downsample(x, m), h);
    let right = downsample(&convolve(x, &upsample(h, m)), m);
    let max_error = left
        .iter()
        .zip(&right)
        .map(|(a, b)| (a - b).abs())
        .fold(0.0, f64::max);
    Ok(NobleCheck {
        left,
        right,
        max_error,
    })
}

/// Split `h` into `m` branches, branch `p` holding `h[p], h[p+m], …`.
pub fn polyphase_branches(h: &[f64], m: usize) -> Vec<Vec<f64>> {
    let m = m.max(1);
    (0..m)
        .map(|p| h.iter().skip(p).step_by(m).copied().collect())
        .collect()
}

/// Decimating FIR evaluated branch by branch at the low rate.
///
/// Equals `downsample(convolve(x, h), m)` truncated to `⌈|x|/m⌉` samples,
/// with every multiply performed at the output rate.
pub fn polyphase_decimate(x: &[f64], h: &[f64], m: usize) -> Result<Vec<f64>> {
    check_factor(m)?;
    let out_len = x.len().div_ceil(m);
    let mut y = vec![0.0; out_len];
    for (p, branch) in polyphase_branches(h, m).iter().enumerate() {
        // x_p[n] = x[n·m − p], zero outside the signal.
        let phase: Vec<f64> = (0..out_len)
            .map(|n| {
                (n * m)
                    .checked_sub(p)
                    .and_then(|i| x.get(i))
                    .copied()
                    .unwrap_or(0.0)
            })
            .collect();
        for (acc, v) in y.iter_mut().zip(convolve(&phase, branch)) {
            *acc += v;
        }
    }
    Ok(y)
}

/// Multiplies needed to decimate `signal_len` samples with a `taps`-long FIR.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OpCounts {
    /// Filter at the high rate, then discard.
    pub direct: usize,
    /// Polyphase: only the kept outputs are computed.
    pub polyphase: usize,
    /// `direct / polyphase`.
    pub speedup: f64,
}

impl OpCounts {
    /// Counts for a `taps`-tap filter over `signal_len` samples at factor `m`.
    pub fn new(signal_len: usize, taps: usize, m: usize) -> Self {
        let direct = signal_len * taps;
        let polyphase = direct / m.max(1);
        Self {
            direct,
            polyphase,
            speedup: direct as f64 / polyphase.max(1) as f64,
        }
    }
}

/// Test signal for the noble identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NobleSignal {
    /// Unit step.
    #[default]
    Step,
    /// `x[n] = n`.
    Ramp,
}

impl NobleSignal {
    /// Sample the signal.
    pub fn samples(self, len: usize) -> Vec<f64> {
        match self {
            NobleSignal::Step => vec![1.0; len],
            NobleSignal::Ramp => (0..len).map(|n| n as f64).collect(),
        }
    }
}

/// Short FIR used by the noble identity demo.
pub const NOBLE_FILTER: [f64; 5] = [1.0, 2.0, 3.0, 2.0, 1.0];

/// Multirate lesson parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MultirateParams {
    /// Source sample rate in Hz.
    pub fs: f64,
    /// Square-wave fundamental in Hz.
    pub f0: f64,
    /// Square-wave duty cycle in percent.
    pub duty: f64,
    /// Square-wave amplitude.
    pub amplitude: f64,
    /// Source duration in seconds.
    pub duration: f64,
    /// Rate-change factor.
    pub factor: usize,
    /// Apply anti-alias and reconstruction filters.
    pub filter: bool,
    /// Noble identity factor.
    pub noble_factor: usize,
    /// Noble identity input.
    pub noble_signal: NobleSignal,
    /// Noble identity input length.
    pub noble_len: usize,
    /// Polyphase demo factor.
    pub poly_factor: usize,
    /// Polyphase demo filter length.
    pub poly_taps: usize,
    /// Signal length used for the op counts.
    pub poly_signal_len: usize,
    /// Length of the design demo lowpass.
    pub design_taps: usize,
    /// Design demo cutoff in cycles/sample.
    pub design_cutoff: f64,
    /// Design demo window.
    pub design_window: Window,
}

impl Default for MultirateParams {
    fn default() -> Self {
        Self {
            fs: 8000.0,
            f0: 200.0,
            duty: 50.0,
            amplitude: 0.8,
            duration: 0.5,
            factor: 4,
            filter: true,
            noble_factor: 2,
            noble_signal: NobleSignal::Step,
            noble_len: 20,
            poly_factor: 4,
            poly_taps: 32,
            poly_signal_len: 10_000,
            design_taps: 32,
            design_cutoff: 0.1,
            design_window: Window::Hamming,
        }
    }
}

impl MultirateParams {
    /// Number of source samples, 0 when `duration · fs` is not a usable length.
    pub fn source_len(&self) -> usize {
        signal::checked_len((self.duration * self.fs).floor()).unwrap_or(0)
    }

    /// Check ranges.
    pub fn validate(&self) -> Result<()> {
        if !(self.fs.is_finite() && self.fs > 0.0) {
            return Err(LessonError::invalid(LESSON, "fs must be positive"));
        }
        if !(self.f0 > 0.0 && self.f0 < self.fs / 2.0) {
            return Err(LessonError::invalid(
                LESSON,
                format!("f0 must lie in (0, fs/2), got {}", self.f0),
            ));
        }
        if !(self.duty > 0.0 && self.duty < 100.0) {
            return Err(LessonError::invalid(
                LESSON,
                format!("duty must lie in (0, 100), got {}", self.duty),
            ));
        }
        if !self.amplitude.is_finite() {
            return Err(LessonError::invalid(LESSON, "amplitude must be finite"));
        }
        check_len(LESSON, "factor", self.factor, 1, MAX_RATE_FACTOR)?;
        check_len(LESSON, "noble_factor", self.noble_factor, 1, MAX_RATE_FACTOR)?;
        check_len(LESSON, "poly_factor", self.poly_factor, 1, MAX_RATE_FACTOR)?;
        if self.source_len() < 4 * self.factor {
            return Err(LessonError::invalid(
                LESSON,
                format!(
                    "duration must give {}..={MAX_SAMPLES} source samples",
                    4 * self.factor
                ),
            ));
        }
        check_len(LESSON, "noble_len", self.noble_len, 1, MAX_SAMPLES)?;
        check_len(LESSON, "poly_taps", self.poly_taps, 1, MAX_FILTER_LEN)?;
        check_len(LESSON, "poly_signal_len", self.poly_signal_len, 1, MAX_SAMPLES)?;
        check_len(LESSON, "design_taps", self.design_taps, 1, DESIGN_FFT_LEN)?;
        if !(self.design_cutoff > 0.0 && self.design_cutoff <= 0.5) {
            return Err(LessonError::invalid(
                LESSON,
                format!("design_cutoff must lie in (0, 0.5], got {}", self.design_cutoff),
            ));
        }
        Ok(())
    }
}

/// Polyphase section of the report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PolyphaseReport {
    /// Branch filters.
    pub branches: Vec<Vec<f64>>,
    /// Multiply counts.
    pub ops: OpCounts,
    /// Largest difference between polyphase and direct decimation of the source.
    pub max_error: f64,
}

/// Multirate lesson output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MultirateReport {
    /// Source rate in Hz.
    pub fs: f64,
    /// Rate after decimation.
    pub decimated_fs: f64,
    /// Square-wave source.
    pub source: Vec<f64>,
    /// Source decimated by `factor`.
    pub decimated: Vec<f64>,
    /// Decimated signal interpolated back to `fs`.
    pub interpolated: Vec<f64>,
    /// Hann-windowed spectrum of the source in dB.
    pub source_spectrum_db: Vec<f64>,
    /// Spectrum of the decimated signal in dB.
    pub decimated_spectrum_db: Vec<f64>,
    /// Spectrum of the interpolated signal in dB.
    pub interpolated_spectrum_db: Vec<f64>,
    /// Noble identity check.
    pub noble: NobleCheck,
    /// Polyphase decomposition.
    pub polyphase: PolyphaseReport,
    /// Lowpass design demo.
    pub design: FirDesignReport,
}

/// Tolerance for the noble identity.
pub const NOBLE_TOLERANCE: f64 = 1e-5;

/// Decimate and re-interpolate a square wave, then check the identities.
pub fn run(params: &MultirateParams) -> Result<MultirateReport> {
    params.validate()?;

    let source = signal::square_wave(
        params.source_len(),
        params.fs,
        params.f0,
        params.duty,
        params.amplitude,
    );
    let decimated = decimate(&source, params.factor, params.filter)?;
    let interpolated = interpolate(&decimated, params.factor, params.filter)?;

    let noble = noble_identity(
        &params.noble_signal.samples(params.noble_len),
        &NOBLE_FILTER,
        params.noble_factor,
    )?;
    if !noble.holds(NOBLE_TOLERANCE) {
        tracing::warn!(max_error = noble.max_error, "noble identity mismatch");
    }

    let h: Vec<f64> = (1..=params.poly_taps).map(|k| k as f64).collect();
    let direct = downsample(&convolve(&source, &h), params.poly_factor);
    let poly = polyphase_decimate(&source, &h, params.poly_factor)?;
    let poly_error = poly
        .iter()
        .zip(&direct)
        .map(|(a, b)| (a - b).abs())
        .fold(0.0, f64::max);
    let polyphase = PolyphaseReport {
        branches: polyphase_branches(&h, params.poly_factor),
        ops: OpCounts::new(params.poly_signal_len, params.poly_taps, params.poly_factor),
        max_error: poly_error,
    };

    let design = design_lowpass(params.design_taps, params.design_cutoff, params.design_window)?;

    tracing::debug!(
        factor = params.factor,
        filter = params.filter,
        noble_error = noble.max_error,
        poly_error,
        linear_phase = design.is_linear_phase,
        "multirate"
    );

    Ok(MultirateReport {
        fs: params.fs,
        decimated_fs: params.fs / params.factor as f64,
        source_spectrum_db: windowed_spectrum_db(&source)?,
        decimated_spectrum_db: windowed_spectrum_db(&decimated)?,
        interpolated_spectrum_db: windowed_spectrum_db(&interpolated)?,
        source,
        decimated,
        interpolated,
        noble,
        polyphase,
        design,
    })
}

impl fmt::Display for MultirateReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Sample-rate conversion")?;
        writeln!(
            f,
            "  {} Hz -> {} Hz -> {} Hz",
            self.fs, self.decimated_fs, self.fs
        )?;
        writeln!(
            f,
            "  samples: {} -> {} -> {}",
            self.source.len(),
            self.decimated.len(),
            self.interpolated.len()
        )?;
        writeln!(
            f,
            "  noble identity: {} (max error {:.2e})",
            if self.noble.holds(NOBLE_TOLERANCE) {
                "verified"
            } else {
                "FAILED"
            },
            self.noble.max_error
        )?;
        writeln!(
            f,
            "  polyphase: {} branches, {} vs {} multiplies ({:.1}x)",
            self.polyphase.branches.len(),
            self.polyphase.ops.direct,
            self.polyphase.ops.polyphase,
            self.polyphase.ops.speedup
        )?;
        write!(
            f,
            "  design: {} taps, {}",
            self.design.taps.len(),
            if self.design.is_linear_phase {
                "linear phase"
            } else {
                "not linear phase"
            }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_up_and_down() {
        assert_eq!(downsample(&[1.0, 2.0, 3.0, 4.0, 5.0], 2), vec![1.0, 3.0, 5.0]);
        assert_eq!(upsample(&[1.0, 2.0], 3), vec![1.0, 0.0, 0.0, 2.0, 0.0, 0.0]);
        assert_eq!(downsample(&upsample(&[4.0, 5.0, 6.0], 4), 4), vec![4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_filter_centered_keeps_length_and_alignment() {
        let mut x = vec![0.0; 20];
        x[8] = 1.0;
        let h = [0.25, 0.5, 0.25];
        let y = filter_centered(&x, &h);
        assert_eq!(y.len(), 20);
        assert_eq!(&y[7..10], &[0.25, 0.5, 0.25]);
    }

    #[test]
    fn test_anti_alias_filter_unity_dc() {
        let h = anti_alias_filter(4).unwrap();
        assert_eq!(h.len(), ANTI_ALIAS_TAPS);
        let dc: f64 = h.iter().sum();
        assert!((dc - 1.0).abs() < 0.01, "DC gain {dc}");
    }

    #[test]
    fn test_noble_identity_holds() {
        for sig in [NobleSignal::Step, NobleSignal::Ramp] {
            for m in 1..=4 {
                let check = noble_identity(&sig.samples(20), &NOBLE_FILTER, m).unwrap();
                assert!(check.holds(NOBLE_TOLERANCE), "{sig:?} M={m}: {}", check.max_error);
                assert!(!check.left.is_empty());
            }
        }
    }

    #[test]
    fn test_polyphase_branches() {
        let h: Vec<f64> = (1..=8).map(f64::from).collect();
        let b = polyphase_branches(&h, 3);
        assert_eq!(b, vec![vec![1.0, 4.0, 7.0], vec![2.0, 5.0, 8.0], vec![3.0, 6.0]]);
    }

    #[test]
    fn test_polyphase_matches_direct() {
        let x: Vec<f64> = (0..37).map(|n| ((n * 7) % 11) as f64 - 5.0).collect();
        let h: Vec<f64> = (1..=10).map(f64::from).collect();
        for m in 1..=5 {
            let direct = downsample(&convolve(&x, &h), m);
            let poly = polyphase_decimate(&x, &h, m).unwrap();
            assert_eq!(poly.len(), x.len().div_ceil(m));
            for (a, b) in poly.iter().zip(&direct) {
                assert!((a - b).abs() < 1e-9, "M={m}: {a} vs {b}");
            }
        }
    }

    #[test]
    fn test_op_counts() {
        let ops = OpCounts::new(10_000, 32, 4);
        assert_eq!(ops.direct, 320_000);
        assert_eq!(ops.polyphase, 80_000);
        assert_eq!(ops.speedup, 4.0);
    }

    #[test]
    fn test_run_default() {
        let report = run(&MultirateParams::default()).unwrap();
        assert_eq!(report.source.len(), 4000);
        assert_eq!(report.decimated.len(), 1000);
        assert_eq!(report.interpolated.len(), 4000);
        assert_eq!(report.decimated_fs, 2000.0);
        assert_eq!(report.source_spectrum_db.len(), 1024);
        assert_eq!(report.decimated_spectrum_db.len(), 256);
        assert!(report.noble.holds(NOBLE_TOLERANCE));
        assert!(report.polyphase.max_error < 1e-6);
        assert_eq!(report.polyphase.branches.len(), 4);
    }

    #[test]
    fn test_filtering_removes_aliases() {
        // Without the filter, harmonics fold back; with it, the decimated
        // signal keeps less high-frequency energy.
        let filtered = run(&MultirateParams::default()).unwrap();
        let raw = run(&MultirateParams {
            filter: false,
            ..MultirateParams::default()
        })
        .unwrap();
        let energy = |x: &[f64]| x.iter().map(|v| v * v).sum::<f64>();
        assert!(energy(&filtered.decimated) < energy(&raw.decimated));
    }

    #[test]
    fn test_zero_factor_rejected() {
        assert!(decimate(&[1.0, 2.0], 0, true).is_err());
        assert!(
            run(&MultirateParams {
                factor: 0,
                ..MultirateParams::default()
            })
            .is_err()
        );
    }

    #[test]
    fn test_design_lowpass_is_linear_phase() {
        let design = design_lowpass(32, 0.1, Window::Hamming).unwrap();
        assert_eq!(design.taps.len(), 32);
        assert_eq!(design.magnitude_db.len(), DESIGN_FFT_LEN / 2);
        assert!(design.is_linear_phase);
        assert!(design.magnitude_db[0].abs() < 0.5, "DC {}", design.magnitude_db[0]);
        // Hamming sidelobes sit well below -40 dB.
        assert!(design.magnitude_db[400] < -40.0, "{}", design.magnitude_db[400]);
        assert!(design.magnitude_db.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_symmetry_check() {
        assert!(is_linear_phase(&[1.0, 2.0, 3.0, 2.0, 1.0], SYMMETRY_TOLERANCE));
        assert!(is_linear_phase(&[0.5, 0.5], SYMMETRY_TOLERANCE));
        assert!(is_linear_phase(&[], SYMMETRY_TOLERANCE));
        assert!(!is_linear_phase(&[1.0, 2.0, 3.0], SYMMETRY_TOLERANCE));
        assert!(!is_linear_phase(&[1.0, 0.0, 1.0 + 1e-3], SYMMETRY_TOLERANCE));
    }

    #[test]
    fn test_run_reports_design() {
        let report = run(&MultirateParams::default()).unwrap();
        assert_eq!(report.design.taps.len(), 32);
        assert!(report.design.is_linear_phase);
    }

    #[test]
    fn test_oversized_parameters_rejected() {
        let cases = [
            MultirateParams {
                factor: usize::MAX / 2,
                ..MultirateParams::default()
            },
            MultirateParams {
                factor: MAX_RATE_FACTOR + 1,
                ..MultirateParams::default()
            },
            MultirateParams {
                fs: 1e300,
                f0: 200.0,
                ..MultirateParams::default()
            },
            MultirateParams {
                poly_signal_len: usize::MAX,
                ..MultirateParams::default()
            },
            MultirateParams {
                noble_factor: usize::MAX,
                ..MultirateParams::default()
            },
            MultirateParams {
                design_taps: DESIGN_FFT_LEN + 1,
                ..MultirateParams::default()
            },
        ];
        for params in cases {
            assert!(params.validate().is_err(), "{params:?}");
        }
    }
}
