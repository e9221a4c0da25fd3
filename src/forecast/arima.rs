//! ARIMA(1,1,1) without constant.
//!
//! On the first difference `w_t = y_t - y_{t-1}` the model is
//!
//! ```text
//! w_t = φ w_{t-1} + e_t + θ e_{t-1}
//! ```
//!
//! Estimation is conditional sum of squares (CSS) with `e_0 = 0`:
//!
//! 1. Hannan–Rissanen seed: AR fit by least squares to approximate the
//!    innovations, then regress `w_t` on `(w_{t-1}, ê_{t-1})`.
//! 2. Deterministic grid over `|φ|, |θ| < 1` plus the seed, evaluated in
//!    parallel.
//! 3. Finer grid around the best candidate.
//!
//! Ties are broken by the smaller `φ² + θ²`, then by grid position, so the same
//! input always yields the same parameters.

use nalgebra::{DMatrix, DVector};
use rayon::prelude::*;

use crate::error::ForecastError;
use crate::math::solve_least_squares;

/// Parameters stay strictly inside the stationary/invertible region.
const PARAM_BOUND: f64 = 0.99;
const COARSE_STEP: f64 = 0.05;
const FINE_STEP: f64 = 0.005;

/// A fitted ARIMA(1,1,1) model.
#[derive(Debug, Clone, PartialEq)]
pub struct Arima111 {
    pub phi: f64,
    pub theta: f64,
    /// Conditional sum of squared innovations at the optimum.
    pub css: f64,
    last_level: f64,
    last_diff: f64,
    last_innovation: f64,
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    idx: usize,
    phi: f64,
    theta: f64,
    css: f64,
}

impl Candidate {
    fn better_than(&self, other: &Candidate) -> bool {
        if self.css != other.css {
            return self.css < other.css;
        }
        let a = self.phi * self.phi + self.theta * self.theta;
        let b = other.phi * other.phi + other.theta * other.theta;
        if a != b {
            return a < b;
        }
        self.idx < other.idx
    }
}

impl Arima111 {
    /// Minimum input length: one difference leaves `n - 1` values and CSS
    /// needs at least as many residuals as parameters.
    pub const MIN_LEN: usize = 4;

    /// Fit to an evenly spaced series (no gaps).
    pub fn fit(y: &[f64]) -> Result<Self, ForecastError> {
        if y.len() < Self::MIN_LEN {
            return Err(ForecastError::ModelFit(format!(
                "series too short for ARIMA(1,1,1): {} points",
                y.len()
            )));
        }
        if y.iter().any(|v| !v.is_finite()) {
            return Err(ForecastError::ModelFit("series contains non-finite values".to_string()));
        }

        let w: Vec<f64> = y.windows(2).map(|p| p[1] - p[0]).collect();
        if w.iter().any(|v| !v.is_finite()) {
            return Err(ForecastError::ModelFit("differenced series overflowed".to_string()));
        }

        let coarse = linear_space(-0.95, 0.95, COARSE_STEP);
        let mut grid: Vec<(f64, f64)> = Vec::with_capacity(coarse.len() * coarse.len() + 1);
        if let Some(seed) = hannan_rissanen(&w) {
            grid.push(seed);
        }
        for &phi in &coarse {
            for &theta in &coarse {
                grid.push((phi, theta));
            }
        }

        let best = best_candidate(&w, &grid)?;

        let lo = |v: f64| (v - COARSE_STEP).max(-PARAM_BOUND);
        let hi = |v: f64| (v + COARSE_STEP).min(PARAM_BOUND);
        let phis = linear_space(lo(best.phi), hi(best.phi), FINE_STEP);
        let thetas = linear_space(lo(best.theta), hi(best.theta), FINE_STEP);
        let mut fine: Vec<(f64, f64)> = vec![(best.phi, best.theta)];
        for &phi in &phis {
            for &theta in &thetas {
                fine.push((phi, theta));
            }
        }
        let best = best_candidate(&w, &fine)?;

        let innovations = residuals(&w, best.phi, best.theta);
        let last_innovation = innovations.last().copied().unwrap_or(0.0);

        Ok(Self {
            phi: best.phi,
            theta: best.theta,
            css: best.css,
            last_level: y[y.len() - 1],
            last_diff: w[w.len() - 1],
            last_innovation,
        })
    }

    /// Point forecasts for the next `steps` periods on the original scale.
    pub fn forecast(&self, steps: usize) -> Result<Vec<f64>, ForecastError> {
        let mut out = Vec::with_capacity(steps);
        let mut level = self.last_level;
        let mut diff = self.last_diff;

        for step in 0..steps {
            // Future innovations are zero; only the first step sees the MA term.
            diff = if step == 0 {
                self.phi * diff + self.theta * self.last_innovation
            } else {
                self.phi * diff
            };
            level += diff;
            if !level.is_finite() {
                return Err(ForecastError::ModelFit("non-finite forecast".to_string()));
            }
            out.push(level);
        }

        Ok(out)
    }
}

/// Innovations `e_1..e_{m-1}` under `(φ, θ)`, conditioning on `e_0 = 0`.
fn residuals(w: &[f64], phi: f64, theta: f64) -> Vec<f64> {
    let mut out = Vec::with_capacity(w.len());
    let mut prev_e = 0.0;
    out.push(0.0);
    for t in 1..w.len() {
        let e = w[t] - phi * w[t - 1] - theta * prev_e;
        out.push(e);
        prev_e = e;
    }
    out
}

fn css(w: &[f64], phi: f64, theta: f64) -> f64 {
    residuals(w, phi, theta).iter().skip(1).map(|e| e * e).sum()
}

fn best_candidate(w: &[f64], grid: &[(f64, f64)]) -> Result<Candidate, ForecastError> {
    let candidates: Vec<Candidate> = grid
        .par_iter()
        .enumerate()
        .filter_map(|(idx, &(phi, theta))| {
            let css = css(w, phi, theta);
            css.is_finite().then_some(Candidate { idx, phi, theta, css })
        })
        .collect();

    let mut iter = candidates.into_iter();
    let first = iter
        .next()
        .ok_or_else(|| ForecastError::ModelFit("no finite fit candidates".to_string()))?;
    Ok(iter.fold(first, |best, c| if c.better_than(&best) { c } else { best }))
}

/// Two-stage least squares estimate of `(φ, θ)`, clamped into the bound.
fn hannan_rissanen(w: &[f64]) -> Option<(f64, f64)> {
    let m = w.len();
    // Long AR order, limited by the data we have.
    let k = ((m - 1) / 2).clamp(1, 4);
    if m <= k + 2 {
        return None;
    }

    let rows = m - k;
    let mut x = DMatrix::<f64>::zeros(rows, k);
    let mut y = DVector::<f64>::zeros(rows);
    for (r, t) in (k..m).enumerate() {
        for j in 0..k {
            x[(r, j)] = w[t - j - 1];
        }
        y[r] = w[t];
    }
    let ar = solve_least_squares(&x, &y)?;
    let fitted = &x * &ar;

    let mut e_hat = vec![0.0; m];
    for (r, t) in (k..m).enumerate() {
        e_hat[t] = w[t] - fitted[r];
    }

    let rows = m - k - 1;
    let mut x2 = DMatrix::<f64>::zeros(rows, 2);
    let mut y2 = DVector::<f64>::zeros(rows);
    for (r, t) in ((k + 1)..m).enumerate() {
        x2[(r, 0)] = w[t - 1];
        x2[(r, 1)] = e_hat[t - 1];
        y2[r] = w[t];
    }
    let beta = solve_least_squares(&x2, &y2)?;

    Some((
        beta[0].clamp(-PARAM_BOUND, PARAM_BOUND),
        beta[1].clamp(-PARAM_BOUND, PARAM_BOUND),
    ))
}

/// Evenly spaced points from `min` to `max` (inclusive) at `step` spacing.
fn linear_space(min: f64, max: f64, step: f64) -> Vec<f64> {
    if !(min.is_finite() && max.is_finite() && step > 0.0) || max < min {
        return Vec::new();
    }
    let steps = ((max - min) / step).round() as usize;
    (0..=steps).map(|i| min + step * i as f64).filter(|v| *v <= max + 1e-12).collect()
}
