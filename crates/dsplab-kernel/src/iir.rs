//! Rational (IIR) filters in direct form.
//!
//! `H(z) = B(z) / A(z)` with `B = numerator`, `A = denominator` and index 0
//! holding the current-sample coefficient:
//!
//! ```text
//! a0·y[n] = Σ b[k]·x[n−k] − Σ_{k≥1} a[k]·y[n−k]
//! ```

use std::f64::consts::PI;

use crate::error::{KernelError, Result, ensure_finite};

/// Point in the z-plane in polar form.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Polar {
    /// Distance from the origin.
    pub radius: f64,
    /// Angle in radians.
    pub angle: f64,
}

impl Polar {
    /// Create a polar point.
    pub fn new(radius: f64, angle: f64) -> Self {
        Self { radius, angle }
    }

    /// Cartesian `(re, im)` coordinates.
    pub fn to_cartesian(self) -> (f64, f64) {
        let (s, c) = self.angle.sin_cos();
        (self.radius * c, self.radius * s)
    }
}

/// Numerator/denominator coefficient pair of a rational transfer function.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IirCoefficients {
    /// Feed-forward coefficients `b[k]`.
    pub numerator: Vec<f64>,
    /// Feedback coefficients `a[k]`; `a[0]` is non-zero.
    pub denominator: Vec<f64>,
}

/// Output of [`IirCoefficients::filter_clamped`].
#[derive(Debug, Clone, PartialEq)]
pub struct ClampedOutput {
    /// Filtered samples, each within `±limit`.
    pub samples: Vec<f64>,
    /// True when at least one sample had to be clamped.
    pub clipped: bool,
}

impl IirCoefficients {
    /// Build a transfer function, rejecting an empty or zero-led denominator.
    pub fn new(numerator: Vec<f64>, denominator: Vec<f64>) -> Result<Self> {
        match denominator.first() {
            None => Err(KernelError::invalid("denominator", "must not be empty")),
            Some(&a0) if a0 == 0.0 => Err(KernelError::invalid(
                "denominator",
                "leading coefficient a[0] must be non-zero",
            )),
            Some(_) => {
                ensure_finite(&numerator)?;
                ensure_finite(&denominator)?;
                Ok(Self {
                    numerator,
                    denominator,
                })
            }
        }
    }

    /// Pure FIR: `B(z) / 1`.
    pub fn fir(taps: Vec<f64>) -> Result<Self> {
        Self::new(taps, vec![1.0])
    }

    /// Second-order section with a conjugate pole pair and a conjugate zero
    /// pair: `A = [1, −2r_p cos θ_p, r_p²]`, `B = [1, −2r_z cos θ_z, r_z²]`.
    pub fn from_conjugate_pairs(pole: Polar, zero: Polar) -> Result<Self> {
        Self::new(conjugate_pair_poly(zero), conjugate_pair_poly(pole))
    }

    /// Swap numerator and denominator (`1/H`).
    ///
    /// Fails when the current numerator has a zero leading coefficient.
    pub fn inverse(&self) -> Result<Self> {
        Self::new(self.denominator.clone(), self.numerator.clone())
    }

    /// Run the filter over `signal` from rest.
    pub fn filter(&self, signal: &[f64]) -> Vec<f64> {
        let mut out = Vec::with_capacity(signal.len());
        for n in 0..signal.len() {
            let y = self.step(signal, &out, n);
            out.push(y);
        }
        out
    }

    /// Run the filter, clamping each output sample to `±limit` before it is
    /// fed back.
    ///
    /// Unstable inverses blow up geometrically; clamping keeps the result
    /// plottable and `clipped` reports that it happened.
    pub fn filter_clamped(&self, signal: &[f64], limit: f64) -> ClampedOutput {
        let mut samples = Vec::with_capacity(signal.len());
        let mut clipped = false;
        for n in 0..signal.len() {
            let mut y = self.step(signal, &samples, n);
            if y.abs() > limit {
                clipped = true;
                y = limit.copysign(y);
            }
            samples.push(y);
        }
        ClampedOutput { samples, clipped }
    }

    fn step(&self, input: &[f64], output: &[f64], n: usize) -> f64 {
        let mut acc = 0.0;
        for (k, b) in self.numerator.iter().enumerate().take(n + 1) {
            acc += b * input[n - k];
        }
        for (k, a) in self.denominator.iter().enumerate().skip(1).take(n) {
            acc -= a * output[n - k];
        }
        acc / self.denominator[0]
    }

    /// First `len` samples of the impulse response.
    pub fn impulse_response(&self, len: usize) -> Vec<f64> {
        let mut impulse = vec![0.0; len];
        if let Some(first) = impulse.first_mut() {
            *first = 1.0;
        }
        self.filter(&impulse)
    }

    /// `|H(e^{jω})|`.
    pub fn magnitude_at(&self, omega: f64) -> f64 {
        poly_magnitude(&self.numerator, omega) / poly_magnitude(&self.denominator, omega)
    }

    /// Magnitude at `points` frequencies evenly spaced over `[0, π]`
    /// (both ends included). Returns `(omegas, magnitudes)`.
    pub fn magnitude_response(&self, points: usize) -> (Vec<f64>, Vec<f64>) {
        let omegas = linspace(0.0, PI, points);
        let mags = omegas.iter().map(|&w| self.magnitude_at(w)).collect();
        (omegas, mags)
    }

    /// Filter order: the larger of the two polynomial degrees.
    pub fn order(&self) -> usize {
        self.numerator.len().max(self.denominator.len()).saturating_sub(1)
    }
}

fn conjugate_pair_poly(p: Polar) -> Vec<f64> {
    vec![1.0, -2.0 * p.radius * p.angle.cos(), p.radius * p.radius]
}

/// `|Σ c[k]·e^{−jωk}|`.
fn poly_magnitude(coeffs: &[f64], omega: f64) -> f64 {
    let (re, im) = coeffs
        .iter()
        .enumerate()
        .fold((0.0, 0.0), |(re, im), (k, c)| {
            let (s, co) = (-omega * k as f64).sin_cos();
            (re + c * co, im + c * s)
        });
    re.hypot(im)
}

/// `n` evenly spaced values from `start` to `end` inclusive.
///
/// `n == 1` yields `[start]`.
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            (0..n).map(|i| start + i as f64 * step).collect()
        }
    }
}

/// A conjugate pole pair at `radius` is stable iff it lies inside the unit circle.
pub fn pole_radius_stable(radius: f64) -> bool {
    radius.abs() < 1.0
}

/// Group delay in samples of the first-order allpass `(a + z⁻¹)/(1 + a·z⁻¹)`:
/// `(1 − a²) / (1 + a² − 2a·cos ω)`.
pub fn allpass_group_delay(a: f64, omega: f64) -> f64 {
    (1.0 - a * a) / (1.0 + a * a - 2.0 * a * omega.cos())
}

/// Frequency mapping of the first-order allpass substitution `z⁻¹ → A(z)`:
/// `ω + 2·atan(a·sin ω / (1 − a·cos ω))`.
///
/// Positive `a` stretches low frequencies, negative `a` compresses them.
pub fn warp_frequency(a: f64, omega: f64) -> f64 {
    omega + 2.0 * (a * omega.sin()).atan2(1.0 - a * omega.cos())
}
