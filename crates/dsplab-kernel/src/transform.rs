//! Radix-2 transform engine — in-place iterative Cooley-Tukey FFT/IFFT.
//!
//! Every spectral operation in the kernel goes through [`transform`]. It works
//! on split real/imaginary buffers of power-of-two length and never pads or
//! truncates; callers zero-pad with [`fft_padded`] or
//! [`crate::spectral::zero_pad`].
//!
//! # Algorithm
//!
//! 1. Bit-reversal permutation of both buffers, driven by a reversed-index
//!    counter that is advanced with carry propagation from the top bit.
//! 2. `log2(N)` butterfly passes for `len = 2, 4, …, N`. Each pass advances the
//!    twiddle `w` by multiplying with `exp(∓2πi/len)` instead of calling
//!    `sin`/`cos` per butterfly:
//!
//! ```text
//! u = x[i+k]
//! v = x[i+k+len/2] · w
//! x[i+k]         = u + v
//! x[i+k+len/2]   = u − v
//! ```
//!
//! The forward transform uses `exp(−2πi/len)` and is unnormalized, so a
//! signal's energy is scaled by N. [`ifft`] flips the twiddle sign and divides
//! by N.
//!
//! Reference: Cooley & Tukey, "An Algorithm for the Machine Calculation of
//! Complex Fourier Series", Math. Comp. 19 (1965).

use std::f64::consts::PI;

use crate::error::{KernelError, Result, ensure_finite};

/// Complex spectrum stored as split real and imaginary parts.
///
/// Both vectors always have the same length when produced by the kernel.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Spectrum {
    /// Real part per bin.
    pub re: Vec<f64>,
    /// Imaginary part per bin.
    pub im: Vec<f64>,
}

impl Spectrum {
    /// Build a spectrum from matching real and imaginary parts.
    pub fn from_parts(re: Vec<f64>, im: Vec<f64>) -> Result<Self> {
        if re.len() != im.len() {
            return Err(KernelError::LengthMismatch {
                expected: re.len(),
                actual: im.len(),
            });
        }
        Ok(Self { re, im })
    }

    /// Real-valued signal with a zero imaginary part.
    pub fn from_real(signal: &[f64]) -> Self {
        Self {
            re: signal.to_vec(),
            im: vec![0.0; signal.len()],
        }
    }

    /// All-zero spectrum of length `len`.
    pub fn zeros(len: usize) -> Self {
        Self {
            re: vec![0.0; len],
            im: vec![0.0; len],
        }
    }

    /// Number of bins.
    pub fn len(&self) -> usize {
        self.re.len()
    }

    /// True when the spectrum has no bins.
    pub fn is_empty(&self) -> bool {
        self.re.is_empty()
    }

    /// Real part, the time-domain signal after an inverse transform of a
    /// conjugate-symmetric spectrum.
    pub fn real_part(&self) -> &[f64] {
        &self.re
    }

    /// Consume the spectrum and return `(re, im)`.
    pub fn into_parts(self) -> (Vec<f64>, Vec<f64>) {
        (self.re, self.im)
    }
}

/// In-place radix-2 decimation-in-time FFT (`inverse = false`) or unscaled
/// inverse FFT (`inverse = true`).
///
/// Lengths 0 and 1 are a no-op. Any other length must be a power of two.
/// Inputs are validated before the buffers are touched.
pub fn transform(re: &mut [f64], im: &mut [f64], inverse: bool) -> Result<()> {
    let n = re.len();
    if im.len() != n {
        return Err(KernelError::LengthMismatch {
            expected: n,
            actual: im.len(),
        });
    }
    if n <= 1 {
        return Ok(());
    }
    if !n.is_power_of_two() {
        return Err(KernelError::NotPowerOfTwo { len: n });
    }
    ensure_finite(re)?;
    ensure_finite(im)?;

    #[cfg(feature = "tracing")]
    tracing::trace!(n, inverse, "transform");

    bit_reverse(re, im);

    let sign = if inverse { 1.0 } else { -1.0 };
    let mut len = 2;
    while len <= n {
        let half = len / 2;
        let (step_im, step_re) = (sign * 2.0 * PI / len as f64).sin_cos();

        for start in (0..n).step_by(len) {
            let mut w_re = 1.0;
            let mut w_im = 0.0;
            for k in 0..half {
                let a = start + k;
                let b = a + half;

                let v_re = re[b] * w_re - im[b] * w_im;
                let v_im = re[b] * w_im + im[b] * w_re;
                let u_re = re[a];
                let u_im = im[a];

                re[a] = u_re + v_re;
                im[a] = u_im + v_im;
                re[b] = u_re - v_re;
                im[b] = u_im - v_im;

                let next_re = w_re * step_re - w_im * step_im;
                w_im = w_re * step_im + w_im * step_re;
                w_re = next_re;
            }
        }
        len <<= 1;
    }

    Ok(())
}

/// Swap both buffers into bit-reversed index order.
fn bit_reverse(re: &mut [f64], im: &mut [f64]) {
    let n = re.len();
    let mut j = 0usize;
    for i in 0..n {
        if i < j {
            re.swap(i, j);
            im.swap(i, j);
        }
        // Add one to the reversed counter: clear set bits from the top down,
        // then set the first clear one.
        let mut m = n >> 1;
        while m > 0 && j >= m {
            j -= m;
            m >>= 1;
        }
        j += m;
    }
}

/// Forward FFT of a spectrum in place.
pub fn fft_in_place(spectrum: &mut Spectrum) -> Result<()> {
    transform(&mut spectrum.re, &mut spectrum.im, false)
}

/// Normalized inverse FFT of a spectrum in place (divides by N).
pub fn ifft_in_place(spectrum: &mut Spectrum) -> Result<()> {
    transform(&mut spectrum.re, &mut spectrum.im, true)?;
    let n = spectrum.len();
    if n > 1 {
        let scale = 1.0 / n as f64;
        for v in spectrum.re.iter_mut().chain(spectrum.im.iter_mut()) {
            *v *= scale;
        }
    }
    Ok(())
}

/// Forward FFT of a real signal whose length is a power of two.
pub fn fft(signal: &[f64]) -> Result<Spectrum> {
    let mut spectrum = Spectrum::from_real(signal);
    fft_in_place(&mut spectrum)?;
    Ok(spectrum)
}

/// Normalized inverse FFT, returning a new spectrum.
pub fn ifft(spectrum: &Spectrum) -> Result<Spectrum> {
    let mut out = spectrum.clone();
    ifft_in_place(&mut out)?;
    Ok(out)
}

/// Zero-pad `signal` to `len` samples and take its forward FFT.
///
/// `len` must be a power of two and at least `signal.len()`.
pub fn fft_padded(signal: &[f64], len: usize) -> Result<Spectrum> {
    if signal.len() > len {
        return Err(KernelError::LengthMismatch {
            expected: len,
            actual: signal.len(),
        });
    }
    let mut spectrum = Spectrum::zeros(len);
    spectrum.re[..signal.len()].copy_from_slice(signal);
    fft_in_place(&mut spectrum)?;
    Ok(spectrum)
}
