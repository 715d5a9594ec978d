//! Linear-phase FIR versus its minimum-phase counterpart.

use std::fmt;

use dsplab_kernel::{
    DB_FLOOR, Window, fft_padded, fir_lowpass, group_delay_from_phase, magnitude, minimum_phase,
    phase, to_db,
};
use serde::{Deserialize, Serialize};

use crate::error::{LessonError, Result, check_len};
use crate::signal::MAX_SAMPLES;

const LESSON: &str = "phase";

/// Phase lesson parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhaseParams {
    /// FIR length.
    pub taps: usize,
    /// Lowpass cutoff in cycles/sample.
    pub cutoff: f64,
    /// Design window.
    pub window: Window,
    /// FFT length for the cepstrum and the analysis.
    pub analysis_len: usize,
}

impl Default for PhaseParams {
    fn default() -> Self {
        Self {
            taps: 17,
            cutoff: 0.4,
            window: Window::Hamming,
            analysis_len: 1024,
        }
    }
}

impl PhaseParams {
    /// Check ranges.
    pub fn validate(&self) -> Result<()> {
        check_len(LESSON, "analysis_len", self.analysis_len, 2, MAX_SAMPLES)?;
        check_len(LESSON, "taps", self.taps, 2, self.analysis_len)?;
        if !self.analysis_len.is_power_of_two() {
            return Err(LessonError::invalid(
                LESSON,
                format!("analysis_len {} is not a power of two", self.analysis_len),
            ));
        }
        Ok(())
    }
}

/// Phase lesson output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhaseReport {
    /// Linear-phase design.
    pub linear: Vec<f64>,
    /// Minimum-phase version.
    pub minimum: Vec<f64>,
    /// Magnitude of `linear` in dB, bins `0..N/2`.
    pub linear_db: Vec<f64>,
    /// Magnitude of `minimum` in dB.
    pub minimum_db: Vec<f64>,
    /// Group delay of `linear` in samples, bins `0..N/2`.
    pub linear_delay: Vec<f64>,
    /// Group delay of `minimum`.
    pub minimum_delay: Vec<f64>,
    /// Mean group delay of `linear` over all bins.
    pub linear_avg_delay: f64,
    /// Mean group delay of `minimum` over all bins.
    pub minimum_avg_delay: f64,
    /// `(linear − minimum) / linear` in percent, 0 when `linear` has no delay.
    pub savings_percent: f64,
}

fn savings_percent(linear: f64, minimum: f64) -> f64 {
    if linear.abs() < f64::EPSILON {
        0.0
    } else {
        (linear - minimum) / linear * 100.0
    }
}

fn mean(x: &[f64]) -> f64 {
    if x.is_empty() {
        0.0
    } else {
        x.iter().sum::<f64>() / x.len() as f64
    }
}

/// Design the lowpass, factor it and compare delays.
pub fn run(params: &PhaseParams) -> Result<PhaseReport> {
    params.validate()?;
    let n = params.analysis_len;

    let linear = fir_lowpass(params.taps, params.cutoff, params.window)?;
    let minimum = minimum_phase(&linear, n)?;

    let lin_spec = fft_padded(&linear, n)?;
    let min_spec = fft_padded(&minimum, n)?;
    let lin_gd = group_delay_from_phase(&phase(&lin_spec));
    let min_gd = group_delay_from_phase(&phase(&min_spec));

    let linear_avg_delay = mean(&lin_gd);
    let minimum_avg_delay = mean(&min_gd);
    let savings_percent = savings_percent(linear_avg_delay, minimum_avg_delay);
    tracing::debug!(
        taps = params.taps,
        linear_avg_delay,
        minimum_avg_delay,
        savings_percent,
        "phase"
    );

    let half = n / 2;
    Ok(PhaseReport {
        linear_db: to_db(&magnitude(&lin_spec)[..half], DB_FLOOR),
        minimum_db: to_db(&magnitude(&min_spec)[..half], DB_FLOOR),
        linear_delay: lin_gd[..half].to_vec(),
        minimum_delay: min_gd[..half].to_vec(),
        linear,
        minimum,
        linear_avg_delay,
        minimum_avg_delay,
        savings_percent,
    })
}

impl fmt::Display for PhaseReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Linear vs minimum phase ({} taps)", self.linear.len())?;
        writeln!(f, "  linear delay:  {:.2} samples", self.linear_avg_delay)?;
        writeln!(f, "  minimum delay: {:.2} samples", self.minimum_avg_delay)?;
        write!(f, "  savings:       {:.1}%", self.savings_percent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_run_shapes() {
        let report = run(&PhaseParams::default()).unwrap();
        assert_eq!(report.linear.len(), 17);
        assert_eq!(report.minimum.len(), 17);
        assert_eq!(report.linear_db.len(), 512);
        assert_eq!(report.minimum_delay.len(), 512);
        assert!(report.savings_percent.is_finite());
    }

    #[test]
    fn test_passband_delay_drops() {
        let report = run(&PhaseParams::default()).unwrap();
        let passband = 200;
        let lin = mean(&report.linear_delay[..passband]);
        let min = mean(&report.minimum_delay[..passband]);
        assert!((lin - 8.0).abs() < 1e-6, "{lin}");
        assert!(min < lin, "{min} >= {lin}");
    }

    #[test]
    fn test_passband_magnitude_preserved() {
        let report = run(&PhaseParams::default()).unwrap();
        for k in 0..200 {
            assert!(
                (report.linear_db[k] - report.minimum_db[k]).abs() < 0.5,
                "bin {k}: {} vs {}",
                report.linear_db[k],
                report.minimum_db[k]
            );
        }
    }

    #[test]
    fn test_invalid_params() {
        assert!(
            PhaseParams {
                analysis_len: 1000,
                ..PhaseParams::default()
            }
            .validate()
            .is_err()
        );
        assert!(
            PhaseParams {
                taps: 0,
                ..PhaseParams::default()
            }
            .validate()
            .is_err()
        );
    }

    #[test]
    fn test_single_tap_rejected() {
        let params = PhaseParams {
            taps: 1,
            ..PhaseParams::default()
        };
        assert!(params.validate().is_err());
        assert!(run(&params).is_err());
    }

    #[test]
    fn test_shortest_filter_has_finite_savings() {
        let report = run(&PhaseParams {
            taps: 2,
            ..PhaseParams::default()
        })
        .unwrap();
        assert!(report.savings_percent.is_finite());
        assert!(report.linear_avg_delay.is_finite());
    }

    #[test]
    fn test_savings_without_delay_is_zero() {
        assert_eq!(savings_percent(0.0, 0.0), 0.0);
        assert_eq!(savings_percent(0.0, -1.0), 0.0);
        assert_eq!(savings_percent(8.0, 2.0), 75.0);
    }

    #[test]
    fn test_oversized_analysis_rejected() {
        let params = PhaseParams {
            analysis_len: 1 << 40,
            ..PhaseParams::default()
        };
        assert!(params.validate().is_err());
    }
}
