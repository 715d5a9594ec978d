//! Filter designers: windowed-sinc FIR and Thiran allpass.
//!
//! # FIR designs
//!
//! Every FIR designer centers its impulse response on `k = n − (N−1)/2` and
//! multiplies by a symmetric [`Window`]. Only the first half of the taps is
//! evaluated; the second half is mirrored, so the symmetry of a linear-phase
//! design is exact rather than "up to rounding".
//!
//! ```text
//! lowpass:  h[k] = sin(2π·fc·k) / (πk),   h[0] = 2·fc
//! hilbert:  h[k] = 2 / (πk) for odd k,    0 for k = 0 or even k
//! ```
//!
//! `fc` is normalized to the sample rate, so `0.5` is Nyquist.
//!
//! # Thiran allpass
//!
//! The order-N Thiran denominator has a maximally flat group delay of `D`
//! samples at DC:
//!
//! ```text
//! a[0] = 1
//! a[k+1] = a[k] · (N−k)(N−k−D) / ((k+1)(k+1+D))
//! b = reverse(a)
//! ```
//!
//! Reference: J.-P. Thiran, "Recursive digital filters with maximally flat
//! group delay", IEEE Trans. Circuit Theory 18(6), 1971.

use std::f64::consts::PI;

use crate::error::{KernelError, Result};
use crate::iir::IirCoefficients;
use crate::window::Window;

/// Normalized sinc: `sin(πx)/(πx)`, 1 at the origin.
pub fn sinc(x: f64) -> f64 {
    if x.abs() < 1e-12 {
        1.0
    } else {
        let px = PI * x;
        px.sin() / px
    }
}

fn check_taps(taps: usize) -> Result<()> {
    if taps == 0 {
        return Err(KernelError::invalid("taps", "must be at least 1"));
    }
    Ok(())
}

/// Fill `taps` coefficients from the first half and mirror them.
///
/// `sign` is `1.0` for symmetric and `-1.0` for antisymmetric designs. The
/// middle tap of an odd-length design is evaluated directly.
fn mirrored(taps: usize, sign: f64, mut tap: impl FnMut(usize, f64) -> f64) -> Vec<f64> {
    let center = (taps as f64 - 1.0) / 2.0;
    let mut h = vec![0.0; taps];
    for n in 0..taps.div_ceil(2) {
        let value = tap(n, n as f64 - center);
        h[n] = value;
        let mirror = taps - 1 - n;
        if mirror != n {
            h[mirror] = sign * value;
        }
    }
    h
}

/// Windowed-sinc lowpass FIR.
///
/// `cutoff` is normalized to the sample rate and must lie in `(0, 0.5]`.
/// The result satisfies `h[n] == h[taps−1−n]` exactly.
pub fn fir_lowpass(taps: usize, cutoff: f64, window: Window) -> Result<Vec<f64>> {
    check_taps(taps)?;
    if !(cutoff > 0.0 && cutoff <= 0.5) {
        return Err(KernelError::invalid(
            "cutoff",
            format!("{cutoff} is outside (0, 0.5]"),
        ));
    }

    #[cfg(feature = "tracing")]
    tracing::debug!(taps, cutoff, %window, "fir_lowpass");

    Ok(mirrored(taps, 1.0, |n, k| {
        let ideal = if k == 0.0 {
            2.0 * cutoff
        } else {
            (2.0 * PI * cutoff * k).sin() / (PI * k)
        };
        ideal * window.value(n, taps)
    }))
}

/// Windowed FIR Hilbert transformer (90° phase shifter).
///
/// Taps at `k == 0` and at even `k` are zero; the rest get `2/(πk)`. With an
/// even tap count `k` is never an integer, so every tap is non-zero. The
/// result is exactly antisymmetric.
pub fn fir_hilbert(taps: usize, window: Window) -> Result<Vec<f64>> {
    check_taps(taps)?;

    Ok(mirrored(taps, -1.0, |n, k| {
        if k.fract() == 0.0 && (k as i64) % 2 == 0 {
            0.0
        } else {
            2.0 / (PI * k) * window.value(n, taps)
        }
    }))
}

/// Windowed-sinc fractional-delay FIR.
///
/// `h[n] = sinc(n − delay) · sin(π(n+½)/taps)`. The sine taper is not
/// symmetric around `delay`, so this design is not linear phase.
pub fn fractional_delay_sinc(taps: usize, delay: f64) -> Result<Vec<f64>> {
    check_taps(taps)?;
    check_delay(delay)?;
    Ok((0..taps)
        .map(|n| sinc(n as f64 - delay) * Window::Sine.value(n, taps))
        .collect())
}

/// Highest Thiran order accepted by [`thiran_order`] and
/// [`thiran_fractional_delay`].
pub const MAX_THIRAN_ORDER: usize = 128;

fn check_delay(delay: f64) -> Result<()> {
    if !delay.is_finite() || delay < 0.0 {
        return Err(KernelError::invalid(
            "delay",
            format!("{delay} must be a finite, non-negative sample count"),
        ));
    }
    Ok(())
}

/// Default Thiran order for a delay: `floor(delay) + 1`.
///
/// Fails for negative or non-finite delays and for delays whose order would
/// exceed [`MAX_THIRAN_ORDER`].
pub fn thiran_order(delay: f64) -> Result<usize> {
    check_delay(delay)?;
    if delay >= MAX_THIRAN_ORDER as f64 {
        return Err(KernelError::invalid(
            "delay",
            format!("{delay} needs an order above {MAX_THIRAN_ORDER}"),
        ));
    }
    Ok(delay.floor() as usize + 1)
}

/// Thiran allpass approximating a `delay`-sample fractional delay.
///
/// Requires `1 ≤ order ≤ MAX_THIRAN_ORDER` and `delay ≥ order − 1`. Below
/// that bound the design is not guaranteed stable, so it is rejected rather
/// than returned. Large orders with delays far from `order` can still produce
/// coefficients with very large dynamic range.
pub fn thiran_fractional_delay(order: usize, delay: f64) -> Result<IirCoefficients> {
    if order == 0 || order > MAX_THIRAN_ORDER {
        return Err(KernelError::invalid(
            "order",
            format!("{order} must lie in 1..={MAX_THIRAN_ORDER}"),
        ));
    }
    check_delay(delay)?;
    let n = order as f64;
    if delay < n - 1.0 {
        return Err(KernelError::invalid(
            "delay",
            format!("{delay} is below order − 1 = {} for order {order}", n - 1.0),
        ));
    }

    let mut denominator = Vec::with_capacity(order + 1);
    denominator.push(1.0);
    for k in 0..order {
        let kf = k as f64;
        let prev = denominator[k];
        denominator.push(prev * (n - kf) * (n - kf - delay) / ((kf + 1.0) * (kf + 1.0 + delay)));
    }
    let numerator: Vec<f64> = denominator.iter().rev().copied().collect();

    #[cfg(feature = "tracing")]
    tracing::debug!(order, delay, "thiran_fractional_delay");

    IirCoefficients::new(numerator, denominator)
}
