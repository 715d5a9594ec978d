//! Fractional delay: windowed-sinc FIR versus Thiran allpass.

use std::fmt;

use dsplab_kernel::{
    MAX_THIRAN_ORDER, fft, fractional_delay_sinc, group_delay_from_phase, phase,
    thiran_fractional_delay, thiran_order, zero_pad,
};
use serde::{Deserialize, Serialize};

use crate::error::{LessonError, Result, check_len};
use crate::signal::{MAX_FILTER_LEN, MAX_SAMPLES};

const LESSON: &str = "fractional";

/// Impulse-response length used to measure the Thiran DC group delay.
const DELAY_PROBE_LEN: usize = 1024;

/// Fractional-delay lesson parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FractionalParams {
    /// Delay in samples.
    pub delay: f64,
    /// FIR length.
    pub fir_len: usize,
    /// Impulse-response samples to report.
    pub response_len: usize,
}

impl Default for FractionalParams {
    fn default() -> Self {
        Self {
            delay: 4.5,
            fir_len: 10,
            response_len: 40,
        }
    }
}

impl FractionalParams {
    /// Check ranges.
    pub fn validate(&self) -> Result<()> {
        let max_delay = MAX_THIRAN_ORDER as f64;
        if !(self.delay >= 0.0 && self.delay < max_delay) {
            return Err(LessonError::invalid(
                LESSON,
                format!("delay must lie in [0, {max_delay}), got {}", self.delay),
            ));
        }
        check_len(LESSON, "fir_len", self.fir_len, 1, MAX_FILTER_LEN)?;
        check_len(LESSON, "response_len", self.response_len, self.fir_len, MAX_SAMPLES)
    }
}

/// Fractional-delay lesson output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FractionalReport {
    /// Requested delay.
    pub delay: f64,
    /// FIR taps.
    pub fir: Vec<f64>,
    /// FIR impulse response, zero-padded to `response_len`.
    pub fir_impulse: Vec<f64>,
    /// Thiran order.
    pub thiran_order: usize,
    /// Thiran numerator.
    pub thiran_numerator: Vec<f64>,
    /// Thiran denominator.
    pub thiran_denominator: Vec<f64>,
    /// Thiran impulse response.
    pub thiran_impulse: Vec<f64>,
    /// Measured Thiran group delay at DC.
    pub thiran_dc_delay: f64,
}

/// Design both delays and compare their impulse responses.
pub fn run(params: &FractionalParams) -> Result<FractionalReport> {
    params.validate()?;

    let fir = fractional_delay_sinc(params.fir_len, params.delay)?;
    let order = thiran_order(params.delay)?;
    let thiran = thiran_fractional_delay(order, params.delay)?;

    let probe = thiran.impulse_response(DELAY_PROBE_LEN);
    let thiran_dc_delay = group_delay_from_phase(&phase(&fft(&probe)?))
        .first()
        .copied()
        .unwrap_or(0.0);
    tracing::debug!(delay = params.delay, order, thiran_dc_delay, "fractional delay");

    Ok(FractionalReport {
        delay: params.delay,
        fir_impulse: zero_pad(&fir, params.response_len),
        fir,
        thiran_order: order,
        thiran_impulse: thiran.impulse_response(params.response_len),
        thiran_numerator: thiran.numerator,
        thiran_denominator: thiran.denominator,
        thiran_dc_delay,
    })
}

impl fmt::Display for FractionalReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Fractional delay of {} samples", self.delay)?;
        writeln!(f, "  sinc FIR:       {} taps", self.fir.len())?;
        writeln!(f, "  Thiran allpass: order {}", self.thiran_order)?;
        write!(f, "  Thiran DC delay: {:.4} samples", self.thiran_dc_delay)
    }
}
