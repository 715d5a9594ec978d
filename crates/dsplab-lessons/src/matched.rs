//! Matched-filter detection of a known pulse buried in Gaussian noise.

use std::f64::consts::PI;
use std::fmt;

use dsplab_kernel::matched_filter;
use serde::{Deserialize, Serialize};

use crate::error::{LessonError, Result, check_len};
use crate::signal::{self, MAX_SAMPLES};

const LESSON: &str = "matched";

/// Pulse template shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PulseShape {
    /// Constant one.
    #[default]
    Rect,
    /// Gaussian bump centred in the pulse, σ = len/6.
    Gaussian,
    /// Linear chirp `sin(2π(t + 4.5t²))` over `t ∈ [0, 1)`.
    Chirp,
}

impl PulseShape {
    /// Sample the template.
    pub fn samples(self, len: usize) -> Vec<f64> {
        let n = len as f64;
        match self {
            PulseShape::Rect => vec![1.0; len],
            PulseShape::Gaussian => {
                let centre = (n - 1.0) / 2.0;
                let sigma = n / 6.0;
                (0..len)
                    .map(|i| (-0.5 * ((i as f64 - centre) / sigma).powi(2)).exp())
                    .collect()
            }
            PulseShape::Chirp => (0..len)
                .map(|i| {
                    let t = i as f64 / n;
                    (2.0 * PI * (t + 4.5 * t * t)).sin()
                })
                .collect(),
        }
    }
}

/// Matched-filter lesson parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchedParams {
    /// Template shape.
    pub shape: PulseShape,
    /// Noise power; the noise standard deviation is its square root.
    pub noise_power: f64,
    /// Sample index where the pulse starts.
    pub target: usize,
    /// Length of the received buffer.
    pub signal_len: usize,
    /// Length of the pulse template.
    pub pulse_len: usize,
    /// Detection counts as a hit when strictly closer than this.
    pub tolerance: usize,
    /// Noise seed.
    pub seed: u64,
}

impl Default for MatchedParams {
    fn default() -> Self {
        Self {
            shape: PulseShape::Rect,
            noise_power: 1.0,
            target: 150,
            signal_len: 500,
            pulse_len: 60,
            tolerance: 10,
            seed: 7,
        }
    }
}

impl MatchedParams {
    /// Check ranges and that the pulse fits inside the buffer.
    pub fn validate(&self) -> Result<()> {
        if !(self.noise_power.is_finite() && self.noise_power >= 0.0) {
            return Err(LessonError::invalid(
                LESSON,
                format!("noise_power must be finite and >= 0, got {}", self.noise_power),
            ));
        }
        check_len(LESSON, "signal_len", self.signal_len, 1, MAX_SAMPLES)?;
        check_len(LESSON, "pulse_len", self.pulse_len, 1, self.signal_len)?;
        if self.target > self.signal_len - self.pulse_len {
            return Err(LessonError::invalid(
                LESSON,
                format!(
                    "pulse at {} with length {} does not fit in {} samples",
                    self.target, self.pulse_len, self.signal_len
                ),
            ));
        }
        if self.tolerance == 0 {
            return Err(LessonError::invalid(LESSON, "tolerance must be positive"));
        }
        Ok(())
    }
}

/// Matched-filter lesson output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchedReport {
    /// Template shape used.
    pub shape: PulseShape,
    /// True pulse start.
    pub target: usize,
    /// Estimated pulse start (peak − L/2).
    pub detected: isize,
    /// Peak score value.
    pub peak_value: f64,
    /// Whether the estimate fell within tolerance.
    pub success: bool,
    /// Template samples.
    pub template: Vec<f64>,
    /// Noisy received signal.
    pub received: Vec<f64>,
    /// Filter output aligned with `received`.
    pub score: Vec<f64>,
}

/// Plant the pulse in seeded noise and locate it.
pub fn run(params: &MatchedParams) -> Result<MatchedReport> {
    params.validate()?;

    let template = params.shape.samples(params.pulse_len);
    let mut rng = signal::seeded(params.seed);
    let mut received =
        signal::gaussian_noise(params.signal_len, params.noise_power.sqrt(), &mut rng);
    for (r, p) in received[params.target..params.target + params.pulse_len]
        .iter_mut()
        .zip(&template)
    {
        *r += p;
    }

    let detection = matched_filter(&received, &template)?;
    let success = detection.is_within(params.target, params.tolerance);
    tracing::debug!(
        shape = ?params.shape,
        target = params.target,
        detected = detection.estimated_start,
        success,
        "matched filter"
    );

    Ok(MatchedReport {
        shape: params.shape,
        target: params.target,
        detected: detection.estimated_start,
        peak_value: detection.peak_value(),
        success,
        template,
        received,
        score: detection.score,
    })
}

impl fmt::Display for MatchedReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Matched filter ({:?} pulse)", self.shape)?;
        writeln!(f, "  target:   {}", self.target)?;
        writeln!(f, "  detected: {}", self.detected)?;
        writeln!(f, "  peak:     {:.3}", self.peak_value)?;
        write!(
            f,
            "  result:   {}",
            if self.success { "FOUND" } else { "MISSED" }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pulse_shapes() {
        assert_eq!(PulseShape::Rect.samples(4), vec![1.0; 4]);

        let g = PulseShape::Gaussian.samples(60);
        assert!((g[0] - g[59]).abs() < 1e-12);
        assert!(g[29] > 0.99 && g[30] > 0.99);
        assert!(g[0] < 0.02);

        let c = PulseShape::Chirp.samples(60);
        assert_eq!(c[0], 0.0);
        assert!(c.iter().all(|v| v.abs() <= 1.0));
    }

    #[test]
    fn test_noiseless_detection_is_exact_enough() {
        for shape in [PulseShape::Rect, PulseShape::Gaussian, PulseShape::Chirp] {
            let params = MatchedParams {
                shape,
                noise_power: 0.0,
                ..MatchedParams::default()
            };
            let report = run(&params).unwrap();
            assert!(report.success, "{shape:?} detected {}", report.detected);
        }
    }

    #[test]
    fn test_default_run_finds_rect_pulse() {
        let report = run(&MatchedParams::default()).unwrap();
        assert_eq!(report.received.len(), 500);
        assert_eq!(report.score.len(), 500);
        assert!(
            (report.detected - 150).abs() < 30,
            "detected {}",
            report.detected
        );
    }

    #[test]
    fn test_run_is_deterministic() {
        let params = MatchedParams::default();
        assert_eq!(run(&params).unwrap(), run(&params).unwrap());
    }

    #[test]
    fn test_pulse_must_fit() {
        let params = MatchedParams {
            target: 460,
            ..MatchedParams::default()
        };
        assert!(matches!(
            run(&params),
            Err(LessonError::InvalidParams { lesson: "matched", .. })
        ));
        assert!(
            MatchedParams {
                target: 440,
                ..MatchedParams::default()
            }
            .validate()
            .is_ok()
        );
    }

    #[test]
    fn test_negative_noise_rejected() {
        let params = MatchedParams {
            noise_power: -1.0,
            ..MatchedParams::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_oversized_buffers_rejected() {
        let params = MatchedParams {
            signal_len: usize::MAX,
            ..MatchedParams::default()
        };
        assert!(params.validate().is_err());
        let params = MatchedParams {
            target: usize::MAX,
            ..MatchedParams::default()
        };
        assert!(params.validate().is_err());
    }
}
