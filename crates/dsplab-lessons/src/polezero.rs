//! Pole-zero placement of a second-order section, and the first-order allpass
//! used for frequency warping.

use std::f64::consts::PI;
use std::fmt;

use dsplab_kernel::{
    IirCoefficients, Polar, allpass_group_delay, linspace, pole_radius_stable, warp_frequency,
};
use serde::{Deserialize, Serialize};

use crate::error::{LessonError, Result};

const LESSON: &str = "polezero";

/// Frequency points in the response curves.
pub const RESPONSE_POINTS: usize = 200;

/// Impulse-response length.
pub const IMPULSE_LEN: usize = 50;

/// Pole-zero lesson parameters. Angles are in degrees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoleZeroParams {
    /// Pole radius.
    pub pole_radius: f64,
    /// Pole angle in degrees.
    pub pole_angle: f64,
    /// Zero radius.
    pub zero_radius: f64,
    /// Zero angle in degrees.
    pub zero_angle: f64,
    /// First-order allpass coefficient.
    pub allpass: f64,
}

impl Default for PoleZeroParams {
    fn default() -> Self {
        Self {
            pole_radius: 0.8,
            pole_angle: 45.0,
            zero_radius: 1.0,
            zero_angle: 90.0,
            allpass: 0.5,
        }
    }
}

impl PoleZeroParams {
    /// Check ranges.
    pub fn validate(&self) -> Result<()> {
        let radii_ok = [self.pole_radius, self.zero_radius]
            .iter()
            .all(|r| r.is_finite() && *r >= 0.0);
        if !radii_ok {
            return Err(LessonError::invalid(
                LESSON,
                "radii must be finite and non-negative",
            ));
        }
        if !(self.pole_angle.is_finite() && self.zero_angle.is_finite()) {
            return Err(LessonError::invalid(LESSON, "angles must be finite"));
        }
        if !(self.allpass.abs() < 1.0) {
            return Err(LessonError::invalid(
                LESSON,
                format!("allpass coefficient must lie in (-1, 1), got {}", self.allpass),
            ));
        }
        Ok(())
    }
}

/// Pole-zero lesson output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PoleZeroReport {
    /// Numerator `[1, −2r_z cos θ_z, r_z²]`.
    pub numerator: Vec<f64>,
    /// Denominator `[1, −2r_p cos θ_p, r_p²]`.
    pub denominator: Vec<f64>,
    /// Poles strictly inside the unit circle.
    pub stable: bool,
    /// Frequencies over `[0, π]`.
    pub omegas: Vec<f64>,
    /// `|H(e^{jω})|`.
    pub magnitude: Vec<f64>,
    /// First samples of the impulse response.
    pub impulse: Vec<f64>,
    /// Allpass group delay in samples at each of `omegas`.
    pub allpass_delay: Vec<f64>,
    /// Warped frequency at each of `omegas`.
    pub warped: Vec<f64>,
}

/// Build the section and evaluate its responses.
pub fn run(params: &PoleZeroParams) -> Result<PoleZeroReport> {
    params.validate()?;

    let pole = Polar::new(params.pole_radius, params.pole_angle.to_radians());
    let zero = Polar::new(params.zero_radius, params.zero_angle.to_radians());
    let section = IirCoefficients::from_conjugate_pairs(pole, zero)?;
    let stable = pole_radius_stable(params.pole_radius);
    if !stable {
        tracing::warn!(radius = params.pole_radius, "poles on or outside the unit circle");
    }

    let (omegas, magnitude) = section.magnitude_response(RESPONSE_POINTS);
    let impulse = section.impulse_response(IMPULSE_LEN);
    let a = params.allpass;
    let allpass_delay = omegas.iter().map(|&w| allpass_group_delay(a, w)).collect();
    let warped = omegas.iter().map(|&w| warp_frequency(a, w)).collect();
    tracing::debug!(stable, order = section.order(), "pole-zero");

    Ok(PoleZeroReport {
        numerator: section.numerator,
        denominator: section.denominator,
        stable,
        omegas,
        magnitude,
        impulse,
        allpass_delay,
        warped,
    })
}

/// Warping curve over `[0, π]` alone, for callers that only need the mapping.
pub fn warping_curve(a: f64, points: usize) -> Vec<(f64, f64)> {
    linspace(0.0, PI, points)
        .into_iter()
        .map(|w| (w, warp_frequency(a, w)))
        .collect()
}

impl fmt::Display for PoleZeroReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let peak = self.magnitude.iter().fold(0.0f64, |m, v| m.max(*v));
        writeln!(f, "Pole-zero section")?;
        writeln!(f, "  B(z): {:?}", self.numerator)?;
        writeln!(f, "  A(z): {:?}", self.denominator)?;
        writeln!(f, "  stable: {}", self.stable)?;
        write!(f, "  peak |H|: {peak:.3}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_section() {
        let report = run(&PoleZeroParams::default()).unwrap();
        assert!(report.stable);
        assert_eq!(report.omegas.len(), RESPONSE_POINTS);
        assert_eq!(report.impulse.len(), IMPULSE_LEN);
        assert_eq!(report.impulse[0], 1.0);
        // Zero on the unit circle at π/2 nulls the response there.
        let w = PI / 2.0;
        let h = IirCoefficients::new(report.numerator.clone(), report.denominator.clone()).unwrap();
        assert!(h.magnitude_at(w) < 1e-12);
        // Stable impulse response decays.
        assert!(report.impulse[IMPULSE_LEN - 1].abs() < 1e-3);
    }

    #[test]
    fn test_unstable_pole_flagged() {
        let report = run(&PoleZeroParams {
            pole_radius: 1.05,
            ..PoleZeroParams::default()
        })
        .unwrap();
        assert!(!report.stable);
        assert!(report.impulse.iter().any(|v| v.abs() > 5.0));
    }

    #[test]
    fn test_allpass_curves() {
        let report = run(&PoleZeroParams::default()).unwrap();
        // a = 0.5: delay (1+a)/(1−a) = 3 at DC, (1−a)/(1+a) = 1/3 at π.
        assert!((report.allpass_delay[0] - 3.0).abs() < 1e-12);
        assert!((report.allpass_delay[RESPONSE_POINTS - 1] - 1.0 / 3.0).abs() < 1e-9);
        assert_eq!(report.warped[0], 0.0);
        assert!((report.warped[RESPONSE_POINTS - 1] - PI).abs() < 1e-9);
        assert!(report.warped.windows(2).all(|p| p[1] >= p[0]));
    }

    #[test]
    fn test_warping_curve_matches_report() {
        let curve = warping_curve(0.5, RESPONSE_POINTS);
        let report = run(&PoleZeroParams::default()).unwrap();
        for ((w, v), (rw, rv)) in curve.iter().zip(report.omegas.iter().zip(&report.warped)) {
            assert_eq!(w, rw);
            assert_eq!(v, rv);
        }
    }

    #[test]
    fn test_allpass_out_of_range() {
        let params = PoleZeroParams {
            allpass: 1.0,
            ..PoleZeroParams::default()
        };
        assert!(params.validate().is_err());
    }
}
