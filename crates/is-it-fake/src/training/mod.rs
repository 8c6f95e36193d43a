//! Offline training: load labelled postings, fit the pipeline, persist it.

mod dataset;
mod evaluation;

use std::path::Path;

use is_it_fake_preprocessing::{DEFAULT_MAX_FEATURES, VectorizerParams};
use rand::{SeedableRng, rngs::StdRng, seq::SliceRandom};
use serde::Serialize;
use tracing::info;

pub use dataset::{Dataset, LABEL_COLUMN, LabeledPosting};
pub use evaluation::Evaluation;

use crate::{
    error::{DetectorError, Result},
    model::{ClassifierParams, FAKE_THRESHOLD, FitSummary},
    pipeline::TrainedPipeline,
};

#[derive(Debug, Clone, PartialEq)]
pub struct TrainingConfig {
    /// Fraction of rows held out for evaluation, in `[0, 1)`.
    pub test_size: f64,
    pub seed: u64,
    pub vectorizer: VectorizerParams,
    pub classifier: ClassifierParams,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            test_size: 0.2,
            seed: 42,
            vectorizer: VectorizerParams::default().with_max_features(DEFAULT_MAX_FEATURES),
            classifier: ClassifierParams::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainingReport {
    pub rows_used: usize,
    pub rows_dropped: usize,
    pub train_rows: usize,
    pub test_rows: usize,
    pub num_features: usize,
    pub fit: FitSummary,
    /// Hold-out metrics at [`FAKE_THRESHOLD`]; `None` when the test split is empty.
    pub evaluation: Option<Evaluation>,
}

/// Shuffled row indices split into `(train, test)`; the first `ceil(test_size * n)`
/// shuffled indices form the test partition.
pub fn train_test_split(n: usize, test_size: f64, seed: u64) -> Result<(Vec<usize>, Vec<usize>)> {
    if !(0.0..1.0).contains(&test_size) {
        return Err(DetectorError::TrainingDataInvalid(format!(
            "test_size must be in [0, 1), got {test_size}"
        )));
    }
    let n_test = (test_size * n as f64).ceil() as usize;
    if n_test >= n {
        return Err(DetectorError::TrainingDataInvalid(format!(
            "{n} rows leave nothing to train on with test_size {test_size}"
        )));
    }

    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);
    let train = indices.split_off(n_test);
    Ok((train, indices))
}

/// Fit on the train partition of `dataset` and report hold-out metrics.
pub fn fit_dataset(
    dataset: &Dataset,
    config: &TrainingConfig,
) -> Result<(TrainedPipeline, TrainingReport)> {
    let (train_idx, test_idx) = train_test_split(dataset.len(), config.test_size, config.seed)?;
    info!(
        train = train_idx.len(),
        test = test_idx.len(),
        seed = config.seed,
        "Split dataset"
    );

    let select = |idx: &[usize]| -> (Vec<&str>, Vec<bool>) {
        idx.iter()
            .map(|&i| {
                let record = &dataset.records[i];
                (record.text.as_str(), record.fraudulent)
            })
            .unzip()
    };
    let (train_texts, train_labels) = select(&train_idx);
    if !(train_labels.contains(&true) && train_labels.contains(&false)) {
        return Err(DetectorError::TrainingDataInvalid(
            "training split must contain both real and fake postings".to_string(),
        ));
    }
    let (pipeline, fit) = TrainedPipeline::fit(
        &train_texts,
        &train_labels,
        config.vectorizer.clone(),
        &config.classifier,
    )?;

    let evaluation = (!test_idx.is_empty()).then(|| {
        let (test_texts, test_labels) = select(&test_idx);
        let predicted: Vec<_> = pipeline
            .predict_texts(&test_texts)
            .iter()
            .map(|p| p.classification(FAKE_THRESHOLD))
            .collect();
        Evaluation::from_predictions(&predicted, &test_labels)
    });

    let report = TrainingReport {
        rows_used: dataset.len(),
        rows_dropped: dataset.dropped,
        train_rows: train_idx.len(),
        test_rows: test_idx.len(),
        num_features: pipeline.num_features(),
        fit,
        evaluation,
    };
    Ok((pipeline, report))
}

/// Load `dataset_path`, fit, and atomically write the artifact to `artifact_path`.
pub fn train(
    dataset_path: impl AsRef<Path>,
    artifact_path: impl AsRef<Path>,
    config: &TrainingConfig,
) -> Result<TrainingReport> {
    let dataset = Dataset::from_path(dataset_path)?;
    let (pipeline, report) = fit_dataset(&dataset, config)?;
    pipeline.save(artifact_path)?;

    if let Some(eval) = &report.evaluation {
        info!(
            accuracy = eval.accuracy(),
            precision = eval.precision(),
            recall = eval.recall(),
            f1 = eval.f1(),
            threshold = FAKE_THRESHOLD,
            "Hold-out evaluation"
        );
    }
    info!(
        features = report.num_features,
        converged = report.fit.converged,
        "Training complete"
    );
    Ok(report)
}
