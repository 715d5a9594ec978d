//! Channel equalization by direct inversion.
//!
//! The channel is a three-tap FIR; its inverse is the all-pole filter
//! `1 / C(z)`, which is only stable when every zero of `C` lies inside the
//! unit circle.

use std::fmt;

use dsplab_kernel::{IirCoefficients, convolve, mean_square_error};
use serde::{Deserialize, Serialize};

use crate::error::{LessonError, Result};

const LESSON: &str = "equalizer";

/// Length of the probe signal.
pub const SIGNAL_LEN: usize = 50;

/// Channel impulse responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    /// `[1, 0.5, 0.25]`, zeros at radius 0.5.
    #[default]
    MinPhase,
    /// `[0.25, 0.5, 1]`, zeros at radius 2.
    MaxPhase,
}

impl Channel {
    /// Channel taps.
    pub fn taps(self) -> [f64; 3] {
        match self {
            Channel::MinPhase => [1.0, 0.5, 0.25],
            Channel::MaxPhase => [0.25, 0.5, 1.0],
        }
    }
}

/// Equalizer lesson parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EqualizerParams {
    /// Channel to invert.
    pub channel: Channel,
    /// Output magnitude past which the inverse is declared unstable.
    pub clamp_limit: f64,
}

impl Default for EqualizerParams {
    fn default() -> Self {
        Self {
            channel: Channel::MinPhase,
            clamp_limit: 10.0,
        }
    }
}

impl EqualizerParams {
    /// Check ranges.
    pub fn validate(&self) -> Result<()> {
        if !(self.clamp_limit.is_finite() && self.clamp_limit > 0.0) {
            return Err(LessonError::invalid(
                LESSON,
                format!("clamp_limit must be positive, got {}", self.clamp_limit),
            ));
        }
        Ok(())
    }
}

/// Equalizer lesson output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EqualizerReport {
    /// Channel used.
    pub channel: Channel,
    /// Sparse probe signal.
    pub original: Vec<f64>,
    /// Probe after the channel.
    pub distorted: Vec<f64>,
    /// Output of the inverse filter, clamped to `±clamp_limit`.
    pub restored: Vec<f64>,
    /// Whether the inverse output hit the clamp.
    pub unstable: bool,
    /// MSE between `original` and `restored`.
    pub residual_mse: f64,
}

/// Three impulses at 10, 15 and 25.
pub fn probe_signal() -> Vec<f64> {
    let mut x = vec![0.0; SIGNAL_LEN];
    x[10] = 1.0;
    x[15] = 0.5;
    x[25] = -0.8;
    x
}

/// Pass the probe through the channel and invert it.
pub fn run(params: &EqualizerParams) -> Result<EqualizerReport> {
    params.validate()?;

    let original = probe_signal();
    let channel = params.channel.taps();
    let mut distorted = convolve(&original, &channel);
    distorted.truncate(SIGNAL_LEN);

    let inverse = IirCoefficients::fir(channel.to_vec())?.inverse()?;
    let output = inverse.filter_clamped(&distorted, params.clamp_limit);
    let residual_mse = mean_square_error(&original, &output.samples)?;
    if output.clipped {
        tracing::warn!(channel = ?params.channel, "inverse filter diverged");
    }
    tracing::debug!(channel = ?params.channel, residual_mse, "equalizer");

    Ok(EqualizerReport {
        channel: params.channel,
        original,
        distorted,
        restored: output.samples,
        unstable: output.clipped,
        residual_mse,
    })
}

impl fmt::Display for EqualizerReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Channel inversion ({:?})", self.channel)?;
        writeln!(f, "  taps:     {:?}", self.channel.taps())?;
        writeln!(
            f,
            "  inverse:  {}",
            if self.unstable { "UNSTABLE" } else { "stable" }
        )?;
        write!(f, "  residual: {:.3e}", self.residual_mse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_min_phase_channel_inverts_exactly() {
        let report = run(&EqualizerParams::default()).unwrap();
        assert!(!report.unstable);
        assert!(report.residual_mse < 1e-20, "{}", report.residual_mse);
        assert_eq!(report.distorted[11], 0.5);
    }

    #[test]
    fn test_max_phase_channel_diverges() {
        let report = run(&EqualizerParams {
            channel: Channel::MaxPhase,
            ..EqualizerParams::default()
        })
        .unwrap();
        assert!(report.unstable);
        assert!(report.restored.iter().all(|v| v.abs() <= 10.0));
        assert!(report.residual_mse > 1.0);
    }

    #[test]
    fn test_bad_limit_rejected() {
        let params = EqualizerParams {
            clamp_limit: 0.0,
            ..EqualizerParams::default()
        };
        assert!(run(&params).is_err());
    }
}
