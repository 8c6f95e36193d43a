use ndarray::{Array1, ArrayView1, s};
use serde::{Deserialize, Serialize};
use sprs::{CsMat, CsVecView};
use tracing::{debug, info, warn};

use super::optimizer::{self, LbfgsParams, StopReason};
use crate::error::{DetectorError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ClassWeight {
    /// Each class weighted by `n_samples / (2 * class_count)`.
    #[default]
    Balanced,
    Uniform,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassifierParams {
    /// Inverse L2 regularization strength.
    pub c: f64,
    pub max_iter: usize,
    pub tol: f64,
    pub class_weight: ClassWeight,
}

impl Default for ClassifierParams {
    fn default() -> Self {
        Self {
            c: 1.0,
            max_iter: 1000,
            tol: 1e-4,
            class_weight: ClassWeight::Balanced,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitSummary {
    pub iterations: usize,
    pub converged: bool,
    pub final_loss: f64,
}

/// Binary L2-regularized logistic regression. The positive class is "fake".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    coef: Vec<f64>,
    intercept: f64,
}

#[inline]
fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

/// `ln(1 + e^z)` without overflow.
#[inline]
fn log1p_exp(z: f64) -> f64 {
    if z > 0.0 {
        z + (-z).exp().ln_1p()
    } else {
        z.exp().ln_1p()
    }
}

fn sparse_dot(row: CsVecView<'_, f64>, weights: ArrayView1<'_, f64>) -> f64 {
    row.iter().map(|(j, &v)| v * weights[j]).sum()
}

fn sample_weights(labels: &[bool], class_weight: ClassWeight) -> Vec<f64> {
    match class_weight {
        ClassWeight::Uniform => vec![1.0; labels.len()],
        ClassWeight::Balanced => {
            let n = labels.len() as f64;
            let n_fake = labels.iter().filter(|&&fake| fake).count() as f64;
            let n_real = n - n_fake;
            let (w_fake, w_real) = (n / (2.0 * n_fake), n / (2.0 * n_real));
            labels
                .iter()
                .map(|&fake| if fake { w_fake } else { w_real })
                .collect()
        }
    }
}

/// Weighted mean log-loss plus `alpha / 2 * ||w||^2`; the last entry of `theta` is the intercept.
fn loss_and_gradient(
    x: &CsMat<f64>,
    labels: &[bool],
    weights: &[f64],
    alpha: f64,
    theta: &Array1<f64>,
) -> (f64, Array1<f64>) {
    let d = x.cols();
    let w = theta.slice(s![..d]);
    let b = theta[d];
    let total_weight: f64 = weights.iter().sum();

    let mut loss = 0.0;
    let mut grad = Array1::<f64>::zeros(d + 1);
    for ((row, &fake), &sw) in x.outer_iterator().zip(labels).zip(weights) {
        let z = sparse_dot(row.view(), w) + b;
        let y = if fake { 1.0 } else { 0.0 };
        loss += sw * (log1p_exp(z) - y * z);
        let residual = sw * (sigmoid(z) - y);
        for (j, &v) in row.iter() {
            grad[j] += residual * v;
        }
        grad[d] += residual;
    }
    loss /= total_weight;
    grad /= total_weight;

    loss += 0.5 * alpha * w.dot(&w);
    grad.slice_mut(s![..d]).scaled_add(alpha, &w);
    (loss, grad)
}

impl LogisticRegression {
    /// Fit on CSR rows `x` with `labels[i] == true` meaning fraudulent.
    ///
    /// Hitting the iteration cap is not an error: the current weights are kept
    /// and the summary reports `converged == false`.
    pub fn fit(
        x: &CsMat<f64>,
        labels: &[bool],
        params: &ClassifierParams,
    ) -> Result<(Self, FitSummary)> {
        if !x.is_csr() {
            return Err(DetectorError::TrainingDataInvalid(
                "feature matrix must be in CSR layout".into(),
            ));
        }
        if x.rows() != labels.len() {
            return Err(DetectorError::TrainingDataInvalid(format!(
                "{} feature rows but {} labels",
                x.rows(),
                labels.len()
            )));
        }
        let n_fake = labels.iter().filter(|&&fake| fake).count();
        if n_fake == 0 || n_fake == labels.len() {
            return Err(DetectorError::TrainingDataInvalid(
                "training split must contain both real and fake postings".into(),
            ));
        }

        let weights = sample_weights(labels, params.class_weight);
        let total_weight: f64 = weights.iter().sum();
        let alpha = 1.0 / (params.c * total_weight);
        debug!(
            rows = x.rows(),
            features = x.cols(),
            n_fake,
            alpha,
            "Fitting logistic regression"
        );

        let lbfgs = LbfgsParams {
            max_iter: params.max_iter,
            tol: params.tol,
            ..LbfgsParams::default()
        };
        let outcome = optimizer::minimize(Array1::zeros(x.cols() + 1), lbfgs, |theta| {
            loss_and_gradient(x, labels, &weights, alpha, theta)
        });

        let converged = outcome.stop == StopReason::Converged;
        if converged {
            info!(
                iterations = outcome.iterations,
                loss = outcome.value,
                "Classifier converged"
            );
        } else {
            warn!(
                iterations = outcome.iterations,
                max_iter = params.max_iter,
                reason = ?outcome.stop,
                loss = outcome.value,
                "Classifier did not converge; using current weights"
            );
        }

        let d = x.cols();
        let model = Self {
            coef: outcome.x.slice(s![..d]).to_vec(),
            intercept: outcome.x[d],
        };
        let summary = FitSummary {
            iterations: outcome.iterations,
            converged,
            final_loss: outcome.value,
        };
        Ok((model, summary))
    }

    pub fn num_features(&self) -> usize {
        self.coef.len()
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coef
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    /// P(fake) for each row.
    pub fn predict_fake_proba(&self, x: &CsMat<f64>) -> Vec<f64> {
        debug_assert_eq!(x.cols(), self.coef.len(), "feature dimension mismatch");
        let coef = ArrayView1::from(self.coef.as_slice());
        x.outer_iterator()
            .map(|row| sigmoid(sparse_dot(row, coef) + self.intercept))
            .collect()
    }

    /// `[P(real), P(fake)]` for each row.
    pub fn predict_proba(&self, x: &CsMat<f64>) -> Vec<[f64; 2]> {
        self.predict_fake_proba(x)
            .into_iter()
            .map(|fake| [1.0 - fake, fake])
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Two features: column 0 marks "scammy" rows, column 1 "legit" rows.
    fn toy_data(n_fake: usize, n_real: usize) -> (CsMat<f64>, Vec<bool>) {
        let mut tri = sprs::TriMat::new((n_fake + n_real, 2));
        let mut labels = Vec::new();
        for i in 0..n_fake {
            tri.add_triplet(i, 0, 1.0);
            labels.push(true);
        }
        for i in n_fake..n_fake + n_real {
            tri.add_triplet(i, 1, 1.0);
            labels.push(false);
        }
        (tri.to_csr(), labels)
    }

    #[test]
    fn sigmoid_is_stable_at_extremes() {
        assert!((sigmoid(0.0) - 0.5).abs() < 1e-12);
        assert!(sigmoid(800.0) <= 1.0);
        assert!(sigmoid(-800.0) >= 0.0);
        assert!(log1p_exp(800.0).is_finite());
        assert!((log1p_exp(0.0) - 2.0_f64.ln()).abs() < 1e-12);
    }

    #[test]
    fn balanced_weights_equalize_class_mass() {
        let labels = [true, false, false, false];
        let weights = sample_weights(&labels, ClassWeight::Balanced);
        assert!((weights[0] - 2.0).abs() < 1e-12);
        assert!((weights[1] - 2.0 / 3.0).abs() < 1e-12);
        let fake_mass: f64 = weights[..1].iter().sum();
        let real_mass: f64 = weights[1..].iter().sum();
        assert!((fake_mass - real_mass).abs() < 1e-12);
    }

    #[test]
    fn gradient_matches_finite_differences() {
        let (x, labels) = toy_data(2, 3);
        let weights = sample_weights(&labels, ClassWeight::Balanced);
        let theta = Array1::from(vec![0.3, -0.7, 0.1]);
        let (_, grad) = loss_and_gradient(&x, &labels, &weights, 0.2, &theta);
        let eps = 1e-6;
        for k in 0..theta.len() {
            let mut plus = theta.clone();
            plus[k] += eps;
            let mut minus = theta.clone();
            minus[k] -= eps;
            let numeric = (loss_and_gradient(&x, &labels, &weights, 0.2, &plus).0
                - loss_and_gradient(&x, &labels, &weights, 0.2, &minus).0)
                / (2.0 * eps);
            assert!((numeric - grad[k]).abs() < 1e-6, "component {k}");
        }
    }

    #[test]
    fn learns_separable_signal() {
        let (x, labels) = toy_data(5, 5);
        let (model, summary) = LogisticRegression::fit(&x, &labels, &ClassifierParams::default())
            .expect("fit succeeds");
        assert!(summary.converged);
        let probs = model.predict_fake_proba(&x);
        assert!(probs[0] > 0.5);
        assert!(probs[9] < 0.5);
        for pair in model.predict_proba(&x) {
            assert!((pair[0] + pair[1] - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn balancing_raises_minority_probability() {
        let (x, labels) = toy_data(1, 9);
        let balanced = LogisticRegression::fit(&x, &labels, &ClassifierParams::default())
            .unwrap()
            .0;
        let uniform_params = ClassifierParams {
            class_weight: ClassWeight::Uniform,
            ..ClassifierParams::default()
        };
        let uniform = LogisticRegression::fit(&x, &labels, &uniform_params).unwrap().0;
        let fake_row = balanced.predict_fake_proba(&x)[0];
        assert!(fake_row > uniform.predict_fake_proba(&x)[0]);
    }

    #[test]
    fn iteration_cap_is_not_fatal() {
        let (x, labels) = toy_data(4, 6);
        let params = ClassifierParams {
            max_iter: 1,
            tol: 1e-12,
            ..ClassifierParams::default()
        };
        let (model, summary) = LogisticRegression::fit(&x, &labels, &params).unwrap();
        assert!(!summary.converged);
        assert_eq!(summary.iterations, 1);
        assert_eq!(model.num_features(), 2);
    }

    #[test]
    fn single_class_is_rejected() {
        let (x, _) = toy_data(3, 0);
        let err = LogisticRegression::fit(&x, &[true, true, true], &ClassifierParams::default())
            .unwrap_err();
        assert!(matches!(err, DetectorError::TrainingDataInvalid(_)));
    }
}
