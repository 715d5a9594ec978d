//! dsplab Kernel - Numerical core for the DSP lessons
//!
//! Plain sequences in, plain sequences out. Nothing here renders, plays audio
//! or keeps state between calls.
//!
//! - [`transform`] - In-place radix-2 FFT/IFFT over split real/imaginary buffers
//! - [`spectral`] - Magnitude, phase, unwrapping, group delay, dB, analytic signal
//! - [`window`] - Symmetric window functions
//! - [`design`] - Windowed-sinc FIR (lowpass, Hilbert, fractional delay) and Thiran allpass
//! - [`iir`] - Rational transfer functions, pole-zero pairs, first-order allpass helpers
//! - [`homomorphic`] - Real cepstrum and minimum-phase reconstruction
//! - [`linalg`] - Dense matrices and Gaussian elimination with partial pivoting
//! - [`correlate`] - Convolution, correlation, Toeplitz systems, matched filtering
//! - [`quantize`] - Uniform mid-rise quantizer and Lloyd-Max design
//! - [`vq`] - LBG vector quantizer design
//!
//! ## Example
//!
//! ```rust
//! use dsplab_kernel::{Window, fir_lowpass, minimum_phase};
//!
//! let h = fir_lowpass(31, 0.2, Window::Hamming).unwrap();
//! let h_min = minimum_phase(&h, 1024).unwrap();
//! assert_eq!(h_min.len(), h.len());
//! ```
//!
//! ## Features
//!
//! - `serde` - Serialize/Deserialize for [`Window`], [`Polar`] and [`IirCoefficients`]
//! - `tracing` - `tracing::debug!`/`trace!` events on transform, design and solver entry

pub mod correlate;
pub mod design;
pub mod error;
pub mod homomorphic;
pub mod iir;
pub mod linalg;
pub mod quantize;
pub mod spectral;
pub mod transform;
pub mod vq;
pub mod window;

pub use correlate::{
    MatchedFilterOutput, autocorrelation, convolve, correlate, matched_filter, mean_square_error,
    toeplitz,
};
pub use design::{
    MAX_THIRAN_ORDER, fir_hilbert, fir_lowpass, fractional_delay_sinc, sinc, thiran_fractional_delay,
    thiran_order,
};
pub use error::{KernelError, Result};
pub use homomorphic::{
    CEPSTRAL_FLOOR, DEFAULT_ANALYSIS_LEN, minimum_phase, minimum_phase_with_floor, real_cepstrum,
};
pub use iir::{
    ClampedOutput, IirCoefficients, Polar, allpass_group_delay, linspace, pole_radius_stable,
    warp_frequency,
};
pub use linalg::{Matrix, PIVOT_TOLERANCE, solve};
pub use quantize::{LloydMax, Quantized, UniformQuantizer, snr_db, theoretical_snr_db};
pub use spectral::{
    DB_FLOOR, DB_FLOOR_FINE, analytic_signal, envelope, fft_shift, group_delay,
    group_delay_from_phase, magnitude, next_power_of_two, phase, to_db, unwrap_phase,
    windowed_spectrum_db, zero_pad,
};
pub use transform::{Spectrum, fft, fft_in_place, fft_padded, ifft, ifft_in_place, transform};
pub use vq::{Lbg, LbgConfig, Point2};
pub use window::Window;
