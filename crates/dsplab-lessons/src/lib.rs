//! Lesson drivers for the dsplab kernel.
//!
//! Each module wires one lesson's parameters to a small computation on top of
//! [`dsplab_kernel`] and returns a serializable report. Random inputs come from
//! a seeded generator, so a lesson run with the same parameters always
//! produces the same report.
//!
//! - [`noise`] - Gaussian noise at a target SNR
//! - [`matched`] - Pulse detection by matched filtering in noise
//! - [`wiener`] - Wiener restoration from second-order statistics
//! - [`lpc`] - Linear prediction of an AR(2) process
//! - [`equalizer`] - Channel inversion, stable and unstable
//! - [`multirate`] - Decimation, interpolation, noble identity, polyphase
//! - [`phase`] - Linear versus minimum phase
//! - [`analytic`] - Envelope detection and single-sideband modulation
//! - [`fractional`] - Sinc FIR versus Thiran allpass fractional delay
//! - [`polezero`] - Pole-zero placement and allpass warping
//! - [`quantization`] - Uniform quantizer SNR and Lloyd-Max design
//! - [`clustering`] - LBG vector quantization
//!
//! ## Example
//!
//! ```rust
//! use dsplab_lessons::{Lesson, LessonReport};
//!
//! let lesson = Lesson::default_for("equalizer").unwrap();
//! match lesson.run().unwrap() {
//!     LessonReport::Equalizer(report) => assert!(!report.unstable),
//!     _ => unreachable!(),
//! }
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

pub mod analytic;
pub mod clustering;
pub mod equalizer;
pub mod error;
pub mod fractional;
pub mod lpc;
pub mod matched;
pub mod multirate;
pub mod noise;
pub mod phase;
pub mod polezero;
pub mod quantization;
pub mod signal;
pub mod wiener;

pub use error::{LessonError, Result};
pub use signal::{MAX_FILTER_LEN, MAX_SAMPLES};
pub use lpc::{ForwardPredictor, LpcModel, lpc_design};
pub use wiener::{WienerDesign, wiener_design};

use analytic::{AnalyticParams, AnalyticReport};
use clustering::{ClusteringParams, ClusteringReport};
use equalizer::{EqualizerParams, EqualizerReport};
use fractional::{FractionalParams, FractionalReport};
use lpc::{LpcParams, LpcReport};
use matched::{MatchedParams, MatchedReport};
use multirate::{MultirateParams, MultirateReport};
use noise::{NoiseParams, NoiseReport};
use phase::{PhaseParams, PhaseReport};
use polezero::{PoleZeroParams, PoleZeroReport};
use quantization::{QuantizationParams, QuantizationReport};
use wiener::{WienerParams, WienerReport};

/// Names accepted by [`Lesson::default_for`], in presentation order.
pub const LESSON_NAMES: &[&str] = &[
    "noise",
    "matched",
    "wiener",
    "lpc",
    "equalizer",
    "multirate",
    "phase",
    "analytic",
    "fractional",
    "polezero",
    "quantization",
    "clustering",
];

/// A lesson with its parameters.
///
/// Serialized with a `lesson` tag next to the parameter fields, so a preset
/// entry reads `lesson = "wiener"` followed by any overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "lesson", rename_all = "snake_case")]
pub enum Lesson {
    /// Noise at a target SNR.
    Noise(NoiseParams),
    /// Matched-filter detection.
    Matched(MatchedParams),
    /// Wiener restoration.
    Wiener(WienerParams),
    /// Linear prediction.
    Lpc(LpcParams),
    /// Channel equalization.
    Equalizer(EqualizerParams),
    /// Sample-rate conversion.
    Multirate(MultirateParams),
    /// Phase analysis.
    Phase(PhaseParams),
    /// Analytic signal and SSB.
    Analytic(AnalyticParams),
    /// Fractional delay.
    Fractional(FractionalParams),
    /// Pole-zero exploration.
    #[serde(rename = "polezero")]
    PoleZero(PoleZeroParams),
    /// Scalar quantization.
    Quantization(QuantizationParams),
    /// Vector quantization.
    Clustering(ClusteringParams),
}

/// Output of [`Lesson::run`], tagged like [`Lesson`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "lesson", rename_all = "snake_case")]
#[allow(missing_docs)]
pub enum LessonReport {
    Noise(NoiseReport),
    Matched(MatchedReport),
    Wiener(WienerReport),
    Lpc(LpcReport),
    Equalizer(EqualizerReport),
    Multirate(MultirateReport),
    Phase(PhaseReport),
    Analytic(AnalyticReport),
    Fractional(FractionalReport),
    #[serde(rename = "polezero")]
    PoleZero(PoleZeroReport),
    Quantization(QuantizationReport),
    Clustering(ClusteringReport),
}

impl Lesson {
    /// Lesson with default parameters, looked up case-insensitively.
    pub fn default_for(name: &str) -> Option<Self> {
        let lesson = match name.to_lowercase().as_str() {
            "noise" => Lesson::Noise(NoiseParams::default()),
            "matched" => Lesson::Matched(MatchedParams::default()),
            "wiener" => Lesson::Wiener(WienerParams::default()),
            "lpc" => Lesson::Lpc(LpcParams::default()),
            "equalizer" => Lesson::Equalizer(EqualizerParams::default()),
            "multirate" => Lesson::Multirate(MultirateParams::default()),
            "phase" => Lesson::Phase(PhaseParams::default()),
            "analytic" => Lesson::Analytic(AnalyticParams::default()),
            "fractional" => Lesson::Fractional(FractionalParams::default()),
            "polezero" => Lesson::PoleZero(PoleZeroParams::default()),
            "quantization" => Lesson::Quantization(QuantizationParams::default()),
            "clustering" => Lesson::Clustering(ClusteringParams::default()),
            _ => return None,
        };
        Some(lesson)
    }

    /// Every lesson with default parameters.
    pub fn all_defaults() -> Vec<Self> {
        LESSON_NAMES
            .iter()
            .filter_map(|name| Self::default_for(name))
            .collect()
    }

    /// Tag name, one of [`LESSON_NAMES`].
    pub fn name(&self) -> &'static str {
        match self {
            Lesson::Noise(_) => "noise",
            Lesson::Matched(_) => "matched",
            Lesson::Wiener(_) => "wiener",
            Lesson::Lpc(_) => "lpc",
            Lesson::Equalizer(_) => "equalizer",
            Lesson::Multirate(_) => "multirate",
            Lesson::Phase(_) => "phase",
            Lesson::Analytic(_) => "analytic",
            Lesson::Fractional(_) => "fractional",
            Lesson::PoleZero(_) => "polezero",
            Lesson::Quantization(_) => "quantization",
            Lesson::Clustering(_) => "clustering",
        }
    }

    /// Check parameter ranges without running anything.
    pub fn validate(&self) -> Result<()> {
        match self {
            Lesson::Noise(p) => p.validate(),
            Lesson::Matched(p) => p.validate(),
            Lesson::Wiener(p) => p.validate(),
            Lesson::Lpc(p) => p.validate(),
            Lesson::Equalizer(p) => p.validate(),
            Lesson::Multirate(p) => p.validate(),
            Lesson::Phase(p) => p.validate(),
            Lesson::Analytic(p) => p.validate(),
            Lesson::Fractional(p) => p.validate(),
            Lesson::PoleZero(p) => p.validate(),
            Lesson::Quantization(p) => p.validate(),
            Lesson::Clustering(p) => p.validate(),
        }
    }

    /// Run the lesson.
    pub fn run(&self) -> Result<LessonReport> {
        tracing::debug!(lesson = self.name(), "running lesson");
        let report = match self {
            Lesson::Noise(p) => LessonReport::Noise(noise::run(p)?),
            Lesson::Matched(p) => LessonReport::Matched(matched::run(p)?),
            Lesson::Wiener(p) => LessonReport::Wiener(wiener::run(p)?),
            Lesson::Lpc(p) => LessonReport::Lpc(lpc::run(p)?),
            Lesson::Equalizer(p) => LessonReport::Equalizer(equalizer::run(p)?),
            Lesson::Multirate(p) => LessonReport::Multirate(multirate::run(p)?),
            Lesson::Phase(p) => LessonReport::Phase(phase::run(p)?),
            Lesson::Analytic(p) => LessonReport::Analytic(analytic::run(p)?),
            Lesson::Fractional(p) => LessonReport::Fractional(fractional::run(p)?),
            Lesson::PoleZero(p) => LessonReport::PoleZero(polezero::run(p)?),
            Lesson::Quantization(p) => LessonReport::Quantization(quantization::run(p)?),
            Lesson::Clustering(p) => LessonReport::Clustering(clustering::run(p)?),
        };
        Ok(report)
    }
}

impl LessonReport {
    /// Tag name of the lesson that produced this report.
    pub fn name(&self) -> &'static str {
        match self {
            LessonReport::Noise(_) => "noise",
            LessonReport::Matched(_) => "matched",
            LessonReport::Wiener(_) => "wiener",
            LessonReport::Lpc(_) => "lpc",
            LessonReport::Equalizer(_) => "equalizer",
            LessonReport::Multirate(_) => "multirate",
            LessonReport::Phase(_) => "phase",
            LessonReport::Analytic(_) => "analytic",
            LessonReport::Fractional(_) => "fractional",
            LessonReport::PoleZero(_) => "polezero",
            LessonReport::Quantization(_) => "quantization",
            LessonReport::Clustering(_) => "clustering",
        }
    }
}

impl fmt::Display for LessonReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LessonReport::Noise(r) => fmt::Display::fmt(r, f),
            LessonReport::Matched(r) => fmt::Display::fmt(r, f),
            LessonReport::Wiener(r) => fmt::Display::fmt(r, f),
            LessonReport::Lpc(r) => fmt::Display::fmt(r, f),
            LessonReport::Equalizer(r) => fmt::Display::fmt(r, f),
            LessonReport::Multirate(r) => fmt::Display::fmt(r, f),
            LessonReport::Phase(r) => fmt::Display::fmt(r, f),
            LessonReport::Analytic(r) => fmt::Display::fmt(r, f),
            LessonReport::Fractional(r) => fmt::Display::fmt(r, f),
            LessonReport::PoleZero(r) => fmt::Display::fmt(r, f),
            LessonReport::Quantization(r) => fmt::Display::fmt(r, f),
            LessonReport::Clustering(r) => fmt::Display::fmt(r, f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for name in LESSON_NAMES {
            let lesson = Lesson::default_for(name).unwrap();
            assert_eq!(lesson.name(), *name);
        }
        assert_eq!(Lesson::all_defaults().len(), LESSON_NAMES.len());
    }

    #[test]
    fn test_default_for_is_case_insensitive() {
        assert_eq!(
            Lesson::default_for("WIENER"),
            Some(Lesson::Wiener(WienerParams::default()))
        );
        assert!(Lesson::default_for("reverb").is_none());
    }

    #[test]
    fn test_defaults_validate() {
        for lesson in Lesson::all_defaults() {
            assert!(lesson.validate().is_ok(), "{}", lesson.name());
        }
    }
}
