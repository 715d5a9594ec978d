//! Linear prediction: fit an order-`p` predictor to a training segment with
//! the autocorrelation method, then run it forward on its own output.

use std::collections::VecDeque;
use std::fmt;

use dsplab_kernel::{autocorrelation, mean_square_error, solve, toeplitz};
use serde::{Deserialize, Serialize};

use crate::error::{LessonError, Result, check_len};
use crate::signal::{self, MAX_FILTER_LEN, MAX_SAMPLES};

const LESSON: &str = "lpc";

/// Coefficients of the AR(2) process the lesson samples from.
pub const AR_COEFFS: [f64; 2] = [0.75, -0.5];

/// Predictor coefficients: `x̂[n] = Σ a[k]·x[n−1−k]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LpcModel {
    /// `a[0]` weights the most recent sample.
    pub coeffs: Vec<f64>,
}

impl LpcModel {
    /// Prediction order.
    pub fn order(&self) -> usize {
        self.coeffs.len()
    }

    /// One-step prediction from `history` (oldest first). Requires at least
    /// `order` samples; only the last `order` are used.
    pub fn predict(&self, history: &[f64]) -> Option<f64> {
        let p = self.order();
        if history.len() < p {
            return None;
        }
        Some(
            self.coeffs
                .iter()
                .zip(history.iter().rev())
                .map(|(a, x)| a * x)
                .sum(),
        )
    }

    /// Free-running predictor seeded with the tail of `history`.
    pub fn predictor(&self, history: &[f64]) -> Result<ForwardPredictor> {
        ForwardPredictor::new(self.clone(), history)
    }
}

/// Fit an order-`order` predictor to `training`.
///
/// Solves `R·a = r[1..=p]`, where `R` is the Toeplitz matrix of the first `p`
/// autocorrelation lags.
pub fn lpc_design(training: &[f64], order: usize) -> Result<LpcModel> {
    if order == 0 {
        return Err(LessonError::invalid(LESSON, "order must be positive"));
    }
    if training.len() <= order {
        return Err(LessonError::invalid(
            LESSON,
            format!(
                "need more than {order} training samples, got {}",
                training.len()
            ),
        ));
    }
    let r = autocorrelation(training, order);
    let coeffs = solve(&toeplitz(&r[..order]), &r[1..=order])?;
    Ok(LpcModel { coeffs })
}

/// Closed-loop predictor: every prediction is fed back as the newest sample.
#[derive(Debug, Clone)]
pub struct ForwardPredictor {
    model: LpcModel,
    buffer: VecDeque<f64>,
}

impl ForwardPredictor {
    /// Seed with the last `model.order()` samples of `history`.
    pub fn new(model: LpcModel, history: &[f64]) -> Result<Self> {
        let p = model.order();
        if history.len() < p {
            return Err(LessonError::invalid(
                LESSON,
                format!("predictor needs {p} seed samples, got {}", history.len()),
            ));
        }
        Ok(Self {
            buffer: history[history.len() - p..].iter().copied().collect(),
            model,
        })
    }

    /// Predict the next sample and push it into the history.
    pub fn step(&mut self) -> f64 {
        let value: f64 = self
            .model
            .coeffs
            .iter()
            .zip(self.buffer.iter().rev())
            .map(|(a, x)| a * x)
            .sum();
        self.buffer.pop_front();
        self.buffer.push_back(value);
        value
    }
}

impl Iterator for ForwardPredictor {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        Some(self.step())
    }
}

/// LPC lesson parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LpcParams {
    /// Prediction order.
    pub order: usize,
    /// Samples used to fit the model.
    pub training_len: usize,
    /// Samples predicted past the training segment.
    pub horizon: usize,
    /// Seed for the driving noise.
    pub seed: u64,
}

impl Default for LpcParams {
    fn default() -> Self {
        Self {
            order: 5,
            training_len: 300,
            horizon: 50,
            seed: 1,
        }
    }
}

impl LpcParams {
    /// Check ranges.
    pub fn validate(&self) -> Result<()> {
        check_len(LESSON, "order", self.order, 1, MAX_FILTER_LEN)?;
        check_len(LESSON, "training_len", self.training_len, 2, MAX_SAMPLES)?;
        check_len(LESSON, "horizon", self.horizon, 1, MAX_SAMPLES)?;
        if self.training_len <= self.order {
            return Err(LessonError::invalid(
                LESSON,
                format!(
                    "training_len {} must exceed order {}",
                    self.training_len, self.order
                ),
            ));
        }
        if self.horizon == 0 {
            return Err(LessonError::invalid(LESSON, "horizon must be positive"));
        }
        Ok(())
    }
}

/// LPC lesson output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LpcReport {
    /// Fitted predictor coefficients.
    pub coeffs: Vec<f64>,
    /// Full generated process (training + horizon), peak-normalized.
    pub signal: Vec<f64>,
    /// Closed-loop predictions over the horizon.
    pub predicted: Vec<f64>,
    /// True continuation over the horizon.
    pub actual: Vec<f64>,
    /// MSE between `predicted` and `actual`.
    pub prediction_mse: f64,
}

/// `x[n] = 0.75·x[n−1] − 0.5·x[n−2] + w[n]`, `w ~ N(0, 1)`, peak-normalized.
pub fn ar2_process(len: usize, seed: u64) -> Vec<f64> {
    let mut rng = signal::seeded(seed);
    let mut x = vec![0.0; len];
    for n in 2..len {
        x[n] = AR_COEFFS[0] * x[n - 1] + AR_COEFFS[1] * x[n - 2] + signal::standard_normal(&mut rng);
    }
    signal::normalize_peak(&mut x);
    x
}

/// Fit on the training segment and forecast the horizon.
pub fn run(params: &LpcParams) -> Result<LpcReport> {
    params.validate()?;

    let signal = ar2_process(params.training_len + params.horizon, params.seed);
    let (training, future) = signal.split_at(params.training_len);

    let model = lpc_design(training, params.order)?;
    let predicted: Vec<f64> = model.predictor(training)?.take(params.horizon).collect();
    let prediction_mse = mean_square_error(&predicted, future)?;
    tracing::debug!(
        order = params.order,
        coeffs = ?model.coeffs,
        prediction_mse,
        "lpc"
    );

    Ok(LpcReport {
        coeffs: model.coeffs,
        actual: future.to_vec(),
        predicted,
        prediction_mse,
        signal,
    })
}

impl fmt::Display for LpcReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Linear prediction (order {})", self.coeffs.len())?;
        let coeffs: Vec<String> = self.coeffs.iter().map(|a| format!("{a:.4}")).collect();
        writeln!(f, "  coefficients: [{}]", coeffs.join(", "))?;
        writeln!(f, "  horizon:      {}", self.predicted.len())?;
        write!(f, "  MSE:          {:.5}", self.prediction_mse)
    }
}
