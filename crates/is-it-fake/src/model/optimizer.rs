//! Limited-memory BFGS for smooth unconstrained objectives.

use std::collections::VecDeque;

use ndarray::Array1;
use tracing::debug;

/// Sufficient decrease constant for the Armijo condition.
const ARMIJO_C1: f64 = 1e-4;
const MAX_BACKTRACKS: usize = 40;
/// Curvature pairs with `s·y` below this are skipped.
const MIN_CURVATURE: f64 = 1e-10;

#[derive(Debug, Clone, Copy)]
pub struct LbfgsParams {
    pub max_iter: usize,
    /// Converged once the largest absolute gradient component is at most `tol`.
    pub tol: f64,
    pub history: usize,
}

impl Default for LbfgsParams {
    fn default() -> Self {
        Self {
            max_iter: 1000,
            tol: 1e-4,
            history: 10,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Converged,
    MaxIterations,
    LineSearchFailed,
}

#[derive(Debug, Clone)]
pub struct LbfgsOutcome {
    pub x: Array1<f64>,
    pub value: f64,
    pub iterations: usize,
    pub stop: StopReason,
}

fn max_abs(v: &Array1<f64>) -> f64 {
    v.iter().fold(0.0_f64, |acc, x| acc.max(x.abs()))
}

/// Minimize `objective`, which returns the value and gradient at a point.
///
/// Never fails: when the iteration cap is hit or the line search stalls the
/// best point reached so far is returned with the matching [`StopReason`].
pub fn minimize<F>(x0: Array1<f64>, params: LbfgsParams, mut objective: F) -> LbfgsOutcome
where
    F: FnMut(&Array1<f64>) -> (f64, Array1<f64>),
{
    let mut x = x0;
    let (mut fx, mut g) = objective(&x);
    let mut s_hist: VecDeque<Array1<f64>> = VecDeque::with_capacity(params.history);
    let mut y_hist: VecDeque<Array1<f64>> = VecDeque::with_capacity(params.history);
    let mut rho_hist: VecDeque<f64> = VecDeque::with_capacity(params.history);

    let mut iterations = 0;
    let mut stop = StopReason::MaxIterations;

    while iterations < params.max_iter {
        if max_abs(&g) <= params.tol {
            stop = StopReason::Converged;
            break;
        }

        // Two-loop recursion for the quasi-Newton direction.
        let mut q = g.clone();
        let mut alphas = Vec::with_capacity(s_hist.len());
        for i in (0..s_hist.len()).rev() {
            let a = rho_hist[i] * s_hist[i].dot(&q);
            q.scaled_add(-a, &y_hist[i]);
            alphas.push(a);
        }
        if let (Some(s), Some(y)) = (s_hist.back(), y_hist.back()) {
            q *= s.dot(y) / y.dot(y);
        }
        for (i, a) in (0..s_hist.len()).zip(alphas.iter().rev()) {
            let b = rho_hist[i] * y_hist[i].dot(&q);
            q.scaled_add(a - b, &s_hist[i]);
        }
        let mut direction = -q;
        let mut slope = g.dot(&direction);
        if slope >= 0.0 {
            debug!(iteration = iterations, "Resetting to steepest descent");
            s_hist.clear();
            y_hist.clear();
            rho_hist.clear();
            direction = -&g;
            slope = g.dot(&direction);
        }

        let mut step = if s_hist.is_empty() {
            1.0 / g.dot(&g).sqrt().max(1.0)
        } else {
            1.0
        };
        let mut accepted = None;
        for _ in 0..MAX_BACKTRACKS {
            let candidate = &x + &(&direction * step);
            let (f_new, g_new) = objective(&candidate);
            if f_new.is_finite() && f_new <= fx + ARMIJO_C1 * step * slope {
                accepted = Some((candidate, f_new, g_new));
                break;
            }
            step *= 0.5;
        }
        let Some((x_new, f_new, g_new)) = accepted else {
            stop = StopReason::LineSearchFailed;
            break;
        };

        let s = &x_new - &x;
        let y = &g_new - &g;
        let sy = s.dot(&y);
        if sy > MIN_CURVATURE {
            if s_hist.len() == params.history {
                s_hist.pop_front();
                y_hist.pop_front();
                rho_hist.pop_front();
            }
            s_hist.push_back(s);
            y_hist.push_back(y);
            rho_hist.push_back(1.0 / sy);
        }

        x = x_new;
        fx = f_new;
        g = g_new;
        iterations += 1;
    }

    if stop == StopReason::MaxIterations && max_abs(&g) <= params.tol {
        stop = StopReason::Converged;
    }

    debug!(iterations, value = fx, ?stop, "L-BFGS finished");
    LbfgsOutcome {
        x,
        value: fx,
        iterations,
        stop,
    }
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;

    /// f(x, y) = (x - 3)^2 + 10 (y + 1)^2
    fn quadratic(p: &Array1<f64>) -> (f64, Array1<f64>) {
        let (x, y) = (p[0], p[1]);
        let value = (x - 3.0).powi(2) + 10.0 * (y + 1.0).powi(2);
        (value, array![2.0 * (x - 3.0), 20.0 * (y + 1.0)])
    }

    fn rosenbrock(p: &Array1<f64>) -> (f64, Array1<f64>) {
        let (x, y) = (p[0], p[1]);
        let value = (1.0 - x).powi(2) + 100.0 * (y - x * x).powi(2);
        let dx = -2.0 * (1.0 - x) - 400.0 * x * (y - x * x);
        let dy = 200.0 * (y - x * x);
        (value, array![dx, dy])
    }

    #[test]
    fn finds_quadratic_minimum() {
        let outcome = minimize(array![0.0, 0.0], LbfgsParams::default(), quadratic);
        assert_eq!(outcome.stop, StopReason::Converged);
        assert!((outcome.x[0] - 3.0).abs() < 1e-4);
        assert!((outcome.x[1] + 1.0).abs() < 1e-4);
    }

    #[test]
    fn solves_rosenbrock() {
        let outcome = minimize(array![-1.2, 1.0], LbfgsParams::default(), rosenbrock);
        assert_eq!(outcome.stop, StopReason::Converged);
        assert!((outcome.x[0] - 1.0).abs() < 1e-3);
        assert!((outcome.x[1] - 1.0).abs() < 1e-3);
    }

    #[test]
    fn iteration_cap_returns_current_point() {
        let params = LbfgsParams {
            max_iter: 2,
            ..LbfgsParams::default()
        };
        let outcome = minimize(array![-1.2, 1.0], params, rosenbrock);
        assert_eq!(outcome.stop, StopReason::MaxIterations);
        assert_eq!(outcome.iterations, 2);
        assert!(outcome.value < rosenbrock(&array![-1.2, 1.0]).0);
    }
}
