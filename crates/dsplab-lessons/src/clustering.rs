//! LBG vector quantization of 2-D Gaussian blobs.

use std::fmt;

use dsplab_kernel::{Lbg, LbgConfig, Point2};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{LessonError, Result, check_len};
use crate::signal::{self, MAX_SAMPLES};

const LESSON: &str = "clustering";

/// Largest codebook the lesson grows.
pub const MAX_CODEBOOK_SIZE: usize = 1024;

/// Clustering lesson parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusteringParams {
    /// Training points.
    pub samples: usize,
    /// Number of blobs.
    pub blobs: usize,
    /// Per-axis standard deviation of each blob.
    pub blob_std: f64,
    /// Final codebook size (power of two).
    pub target_size: usize,
    /// Split perturbation.
    pub eps: f64,
    /// k-means steps per split.
    pub max_iters: usize,
    /// Codevector movement treated as converged.
    pub tol: f64,
    /// Seed for centres and points.
    pub seed: u64,
}

impl Default for ClusteringParams {
    fn default() -> Self {
        let lbg = LbgConfig::default();
        Self {
            samples: 1000,
            blobs: 4,
            blob_std: 0.8,
            target_size: 32,
            eps: lbg.eps,
            max_iters: lbg.max_iters,
            tol: lbg.tol,
            seed: 3,
        }
    }
}

impl ClusteringParams {
    /// Check ranges.
    pub fn validate(&self) -> Result<()> {
        check_len(LESSON, "samples", self.samples, 1, MAX_SAMPLES)?;
        check_len(LESSON, "blobs", self.blobs, 1, MAX_SAMPLES)?;
        if !(self.blob_std.is_finite() && self.blob_std >= 0.0) {
            return Err(LessonError::invalid(
                LESSON,
                format!("blob_std must be finite and >= 0, got {}", self.blob_std),
            ));
        }
        check_len(LESSON, "target_size", self.target_size, 1, MAX_CODEBOOK_SIZE)?;
        if !self.target_size.is_power_of_two() {
            return Err(LessonError::invalid(
                LESSON,
                format!("target_size {} is not a power of two", self.target_size),
            ));
        }
        if !(self.eps > 0.0 && self.eps < 1.0) {
            return Err(LessonError::invalid(
                LESSON,
                format!("eps must lie in (0, 1), got {}", self.eps),
            ));
        }
        if self.max_iters == 0 {
            return Err(LessonError::invalid(LESSON, "max_iters must be positive"));
        }
        Ok(())
    }

    fn lbg_config(&self) -> LbgConfig {
        LbgConfig {
            eps: self.eps,
            max_iters: self.max_iters,
            tol: self.tol,
        }
    }
}

/// Clustering lesson output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusteringReport {
    /// Blob centres.
    pub centers: Vec<Point2>,
    /// Training points.
    pub points: Vec<Point2>,
    /// Final codebook.
    pub codebook: Vec<Point2>,
    /// Distortion after each split.
    pub mse_history: Vec<f64>,
}

/// Blob centres uniform over `[−5, 5] × [−4, 4]`; each point joins a random blob.
pub fn gaussian_blobs(params: &ClusteringParams) -> (Vec<Point2>, Vec<Point2>) {
    let mut rng = signal::seeded(params.seed);
    let centers: Vec<Point2> = (0..params.blobs)
        .map(|_| {
            [
                signal::uniform(&mut rng, -5.0, 5.0),
                signal::uniform(&mut rng, -4.0, 4.0),
            ]
        })
        .collect();
    let points = (0..params.samples)
        .map(|_| {
            let c = centers[rng.random_range(0..centers.len())];
            [
                c[0] + params.blob_std * signal::standard_normal(&mut rng),
                c[1] + params.blob_std * signal::standard_normal(&mut rng),
            ]
        })
        .collect();
    (centers, points)
}

/// Generate blobs and grow an LBG codebook to `target_size`.
pub fn run(params: &ClusteringParams) -> Result<ClusteringReport> {
    params.validate()?;

    let (centers, points) = gaussian_blobs(params);
    let mut lbg = Lbg::new(points, params.lbg_config())?;
    let mse_history = lbg.run_to(params.target_size)?.to_vec();
    tracing::debug!(
        size = lbg.codebook().len(),
        distortion = mse_history.last().copied().unwrap_or_default(),
        "clustering"
    );

    Ok(ClusteringReport {
        centers,
        codebook: lbg.codebook().to_vec(),
        points: lbg.points().to_vec(),
        mse_history,
    })
}

impl fmt::Display for ClusteringReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "LBG vector quantizer ({} points, {} blobs)",
            self.points.len(),
            self.centers.len()
        )?;
        for (i, mse) in self.mse_history.iter().enumerate() {
            writeln!(f, "  size {:>3}: distortion {:.4}", 2usize << i, mse)?;
        }
        write!(f, "  final codebook: {} vectors", self.codebook.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blobs_are_seeded() {
        let params = ClusteringParams::default();
        let (c1, p1) = gaussian_blobs(&params);
        let (c2, p2) = gaussian_blobs(&params);
        assert_eq!(c1, c2);
        assert_eq!(p1, p2);
        assert_eq!(p1.len(), 1000);
        assert!(
            c1.iter()
                .all(|c| (-5.0..5.0).contains(&c[0]) && (-4.0..4.0).contains(&c[1]))
        );
    }

    #[test]
    fn test_codebook_grows_to_target() {
        let report = run(&ClusteringParams::default()).unwrap();
        assert_eq!(report.codebook.len(), 32);
        assert_eq!(report.mse_history.len(), 5);
        assert!(
            report.mse_history.windows(2).all(|p| p[1] <= p[0]),
            "{:?}",
            report.mse_history
        );
    }

    #[test]
    fn test_split_beats_single_centroid() {
        let params = ClusteringParams {
            target_size: 2,
            ..ClusteringParams::default()
        };
        let (_, points) = gaussian_blobs(&params);
        let single = Lbg::new(points, LbgConfig::default()).unwrap().distortion();
        let report = run(&params).unwrap();
        assert!(report.mse_history[0] < single, "{:?} vs {single}", report.mse_history);
    }

    #[test]
    fn test_invalid_target() {
        let params = ClusteringParams {
            target_size: 24,
            ..ClusteringParams::default()
        };
        assert!(run(&params).is_err());
    }

    #[test]
    fn test_oversized_parameters_rejected() {
        for params in [
            ClusteringParams {
                samples: usize::MAX,
                ..ClusteringParams::default()
            },
            ClusteringParams {
                blobs: usize::MAX,
                ..ClusteringParams::default()
            },
            ClusteringParams {
                target_size: 1 << 40,
                ..ClusteringParams::default()
            },
        ] {
            assert!(params.validate().is_err(), "{params:?}");
        }
    }
}
