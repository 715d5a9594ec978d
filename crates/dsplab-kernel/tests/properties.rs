//! Property-based tests for dsplab-kernel.
//!
//! Randomized checks of the transform round trip, Parseval's identity,
//! convolution structure, FIR symmetry and solver residuals.

use dsplab_kernel::{
    Window, convolve, correlate, fft, fir_lowpass, ifft, magnitude, solve, toeplitz, unwrap_phase,
};
use proptest::prelude::*;

/// Power-of-two length signal, 2..=512 samples.
fn pow2_signal() -> impl Strategy<Value = Vec<f64>> {
    (1u32..=9).prop_flat_map(|bits| prop::collection::vec(-10.0f64..10.0, 1usize << bits))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// ifft(fft(x)) reproduces x for any power-of-two length.
    #[test]
    fn transform_round_trip(x in pow2_signal()) {
        let back = ifft(&fft(&x).unwrap()).unwrap();
        for (a, b) in x.iter().zip(back.re.iter()) {
            prop_assert!((a - b).abs() < 1e-9, "{} vs {}", a, b);
        }
        prop_assert!(back.im.iter().all(|v| v.abs() < 1e-9));
    }

    /// Σ|X[k]|² = N·Σx[n]².
    #[test]
    fn parseval(x in pow2_signal()) {
        let n = x.len() as f64;
        let time: f64 = x.iter().map(|v| v * v).sum();
        let freq: f64 = magnitude(&fft(&x).unwrap()).iter().map(|m| m * m).sum();
        prop_assert!((freq - n * time).abs() <= 1e-9 * (1.0 + n * time));
    }

    /// Convolution length and commutativity.
    #[test]
    fn convolution_structure(
        u in prop::collection::vec(-1.0f64..1.0, 1..40),
        v in prop::collection::vec(-1.0f64..1.0, 1..40),
    ) {
        let uv = convolve(&u, &v);
        let vu = convolve(&v, &u);
        prop_assert_eq!(uv.len(), u.len() + v.len() - 1);
        for (a, b) in uv.iter().zip(vu.iter()) {
            prop_assert!((a - b).abs() < 1e-12);
        }
        prop_assert_eq!(convolve(&u, &[1.0]), u.clone());
        prop_assert_eq!(correlate(&u, &v).len(), uv.len());
    }

    /// Windowed-sinc lowpass designs are exactly symmetric.
    #[test]
    fn lowpass_symmetry(
        taps in 1usize..128,
        cutoff in 0.01f64..=0.5,
        window_idx in 0usize..5,
    ) {
        let window = Window::ALL[window_idx];
        let h = fir_lowpass(taps, cutoff, window).unwrap();
        prop_assert_eq!(h.len(), taps);
        for n in 0..taps {
            prop_assert_eq!(h[n], h[taps - 1 - n]);
        }
    }

    /// Diagonally dominant Toeplitz systems solve with a small residual.
    #[test]
    fn toeplitz_residual(
        tail in prop::collection::vec(-1.0f64..1.0, 1..8),
        b_seed in prop::collection::vec(-5.0f64..5.0, 8),
    ) {
        let mut r = vec![1.0 + tail.iter().map(|v| 2.0 * v.abs()).sum::<f64>()];
        r.extend(tail.iter().copied());
        let a = toeplitz(&r);
        let b = &b_seed[..r.len()];
        let x = solve(&a, b).unwrap();
        let ax = a.mul_vec(&x).unwrap();
        for (got, want) in ax.iter().zip(b) {
            prop_assert!((got - want).abs() < 1e-9);
        }
    }

    /// Unwrapped phase never jumps by more than π between neighbours.
    #[test]
    fn unwrapped_phase_is_continuous(p in prop::collection::vec(-3.0f64..3.0, 2..200)) {
        let u = unwrap_phase(&p);
        for pair in u.windows(2) {
            prop_assert!((pair[1] - pair[0]).abs() <= std::f64::consts::PI + 1e-12);
        }
    }
}
