//! LBG (Linde-Buzo-Gray) vector quantizer design on 2-D points.
//!
//! Starting from the centroid of all training points, the codebook is grown
//! by splitting every codevector into `c·(1+ε)` and `c·(1−ε)`, then refined
//! with k-means steps until no codevector moves by more than `tol` or
//! `max_iters` steps have run. Distortion after each split is recorded.

use crate::error::{KernelError, Result, ensure_finite};

/// A 2-D point or codevector.
pub type Point2 = [f64; 2];

/// LBG tuning.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LbgConfig {
    /// Relative perturbation used when splitting.
    pub eps: f64,
    /// Maximum k-means steps per split.
    pub max_iters: usize,
    /// Convergence threshold on codevector movement (Euclidean).
    pub tol: f64,
}

impl Default for LbgConfig {
    fn default() -> Self {
        Self {
            eps: 0.02,
            max_iters: 20,
            tol: 1e-4,
        }
    }
}

/// LBG codebook under construction.
#[derive(Debug, Clone)]
pub struct Lbg {
    points: Vec<Point2>,
    codebook: Vec<Point2>,
    config: LbgConfig,
    mse_history: Vec<f64>,
}

fn dist2(a: Point2, b: Point2) -> f64 {
    (a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2)
}

/// Index and squared distance of the codevector nearest to `p`.
///
/// Ties go to the lowest index.
pub fn nearest(codebook: &[Point2], p: Point2) -> Option<(usize, f64)> {
    codebook
        .iter()
        .enumerate()
        .map(|(i, &c)| (i, dist2(p, c)))
        .fold(None, |best, cand| match best {
            Some((_, d)) if d <= cand.1 => best,
            _ => Some(cand),
        })
}

/// Mean squared distance from each point to its nearest codevector.
pub fn distortion(points: &[Point2], codebook: &[Point2]) -> f64 {
    if points.is_empty() {
        return 0.0;
    }
    let sum: f64 = points
        .iter()
        .filter_map(|&p| nearest(codebook, p).map(|(_, d)| d))
        .sum();
    sum / points.len() as f64
}

/// True when both codebooks have the same size and every pair of
/// codevectors is within `tol` of each other.
pub fn all_close(a: &[Point2], b: &[Point2], tol: f64) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(&p, &q)| dist2(p, q) <= tol * tol)
}

impl Lbg {
    /// Start from a one-vector codebook at the mean of `points`.
    pub fn new(points: Vec<Point2>, config: LbgConfig) -> Result<Self> {
        if points.is_empty() {
            return Err(KernelError::invalid("points", "training set is empty"));
        }
        if !(config.eps > 0.0 && config.eps < 1.0) {
            return Err(KernelError::invalid("eps", "must lie in (0, 1)"));
        }
        let flat: Vec<f64> = points.iter().flatten().copied().collect();
        ensure_finite(&flat)?;

        let n = points.len() as f64;
        let (sx, sy) = points
            .iter()
            .fold((0.0, 0.0), |(sx, sy), p| (sx + p[0], sy + p[1]));
        Ok(Self {
            codebook: vec![[sx / n, sy / n]],
            points,
            config,
            mse_history: Vec::new(),
        })
    }

    /// Training points.
    pub fn points(&self) -> &[Point2] {
        &self.points
    }

    /// Current codebook.
    pub fn codebook(&self) -> &[Point2] {
        &self.codebook
    }

    /// Distortion recorded after each completed split.
    pub fn mse_history(&self) -> &[f64] {
        &self.mse_history
    }

    /// Distortion of the current codebook.
    pub fn distortion(&self) -> f64 {
        distortion(&self.points, &self.codebook)
    }

    /// Double the codebook: each `c` becomes `c·(1+ε)` and `c·(1−ε)`.
    pub fn split(&mut self) {
        let eps = self.config.eps;
        self.codebook = self
            .codebook
            .iter()
            .flat_map(|c| {
                [
                    [c[0] * (1.0 + eps), c[1] * (1.0 + eps)],
                    [c[0] * (1.0 - eps), c[1] * (1.0 - eps)],
                ]
            })
            .collect();
    }

    /// One k-means step.
    ///
    /// Codevectors that attract no point are re-seeded with the training
    /// points farthest from their nearest codevector, worst first.
    fn kmeans_step(&self) -> Vec<Point2> {
        let k = self.codebook.len();
        let mut sums = vec![[0.0, 0.0]; k];
        let mut counts = vec![0usize; k];
        let mut worst: Vec<(usize, f64)> = Vec::with_capacity(self.points.len());

        for (i, &p) in self.points.iter().enumerate() {
            if let Some((best, d)) = nearest(&self.codebook, p) {
                sums[best][0] += p[0];
                sums[best][1] += p[1];
                counts[best] += 1;
                worst.push((i, d));
            }
        }

        if counts.contains(&0) {
            worst.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        }
        let mut reseeds = worst.iter().map(|&(i, _)| self.points[i]);

        (0..k)
            .map(|j| {
                if counts[j] > 0 {
                    let n = counts[j] as f64;
                    [sums[j][0] / n, sums[j][1] / n]
                } else {
                    reseeds.next().unwrap_or(self.codebook[j])
                }
            })
            .collect()
    }

    /// Run k-means steps until convergence or `max_iters`. Returns the number
    /// of steps taken.
    pub fn refine(&mut self) -> usize {
        for iter in 0..self.config.max_iters {
            let next = self.kmeans_step();
            let settled = all_close(&self.codebook, &next, self.config.tol);
            self.codebook = next;
            if settled {
                #[cfg(feature = "tracing")]
                tracing::debug!(size = self.codebook.len(), steps = iter + 1, "lbg refine settled");
                return iter + 1;
            }
        }
        self.config.max_iters
    }

    /// Split, refine and record the distortion. Returns the new distortion.
    pub fn double(&mut self) -> f64 {
        self.split();
        self.refine();
        let mse = self.distortion();
        self.mse_history.push(mse);
        mse
    }

    /// Double until the codebook holds at least `target_size` vectors.
    ///
    /// Returns the recorded distortion history.
    pub fn run_to(&mut self, target_size: usize) -> Result<&[f64]> {
        if target_size == 0 || !target_size.is_power_of_two() {
            return Err(KernelError::invalid(
                "target_size",
                format!("{target_size} is not a positive power of two"),
            ));
        }
        while self.codebook.len() < target_size {
            self.double();
        }
        Ok(&self.mse_history)
    }
}
