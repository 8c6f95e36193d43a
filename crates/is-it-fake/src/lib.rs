//! # is-it-fake
//!
//! Flags fraudulent job postings from their free text.
//!
//! A posting's five text fields are joined into one document, turned into a
//! TF-IDF vector and scored by a class-balanced logistic regression. Postings
//! whose fraud probability reaches [`FAKE_THRESHOLD`] are labelled fake.
//!
//! ## Training
//!
//! ```rust,no_run
//! use is_it_fake::training::{self, TrainingConfig};
//!
//! let report = training::train("postings.csv", "model_artifacts/job_pipeline.bin", &TrainingConfig::default())?;
//! println!("vocabulary size: {}", report.num_features);
//! # Ok::<(), is_it_fake::DetectorError>(())
//! ```
//!
//! ## Scoring
//!
//! ```rust,no_run
//! use is_it_fake::{Detector, RawPosting};
//!
//! let detector = Detector::load("model_artifacts/job_pipeline.bin")?;
//! let posting = RawPosting {
//!     title: Some("Data Entry Clerk".into()),
//!     company_profile: Some("Established firm".into()),
//!     description: Some("Work from home, no experience needed".into()),
//!     requirements: Some("None".into()),
//!     benefits: Some("High pay guaranteed".into()),
//! };
//! let result = detector.score(posting)?;
//! println!("{} ({:.2}% fake)", result.prediction, result.fake_probability);
//! # Ok::<(), is_it_fake::DetectorError>(())
//! ```

#[cfg(feature = "cli")]
pub mod cli;
#[cfg(feature = "cli")]
pub mod config;
#[cfg(feature = "server")]
pub mod server;

mod artifact;
mod error;
mod model;
mod pipeline;
mod posting;
pub mod training;

use std::{path::Path, sync::Arc};

pub use artifact::ARTIFACT_FORMAT_VERSION;
pub use error::{DetectorError, Result};
pub use model::{ClassWeight, ClassifierParams, FAKE_THRESHOLD, FitSummary, LogisticRegression};
pub use pipeline::{Label, Prediction, ScoreResult, TrainedPipeline, decide};
pub use posting::{FIELD_ORDER, JobPosting, RawPosting};

/// Scores postings against a loaded pipeline.
///
/// Cheap to clone; clones share the same immutable pipeline.
#[derive(Debug, Clone)]
pub struct Detector {
    pipeline: Arc<TrainedPipeline>,
    threshold: f64,
}

impl Detector {
    /// Wrap a pipeline with the default [`FAKE_THRESHOLD`].
    #[must_use]
    pub fn new(pipeline: TrainedPipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            threshold: FAKE_THRESHOLD,
        }
    }

    /// Load the artifact at `path`. Fails rather than returning a detector without a model.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        TrainedPipeline::load(path).map(Self::new)
    }

    /// Override the decision threshold.
    ///
    /// If P(fake) >= threshold the posting is labelled fake.
    #[must_use]
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    #[must_use]
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn pipeline(&self) -> &TrainedPipeline {
        &self.pipeline
    }

    /// Raw probabilities for a complete posting.
    pub fn predict(&self, posting: &JobPosting) -> Prediction {
        self.pipeline.predict(posting)
    }

    pub fn classify(&self, posting: &JobPosting) -> Label {
        self.predict(posting).classification(self.threshold)
    }

    /// Validate and score a caller-supplied posting.
    ///
    /// A missing field is rejected before any feature extraction happens.
    pub fn score(&self, posting: RawPosting) -> Result<ScoreResult> {
        let posting = posting.validate()?;
        Ok(self.predict(&posting).score(self.threshold))
    }

    /// Scores every posting or none: the first missing field aborts the batch.
    pub fn score_batch(&self, postings: Vec<RawPosting>) -> Result<Vec<ScoreResult>> {
        let texts = postings
            .into_iter()
            .map(RawPosting::combined_text)
            .collect::<Result<Vec<_>>>()?;
        Ok(self
            .pipeline
            .predict_texts(&texts)
            .iter()
            .map(|p| p.score(self.threshold))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::tests::toy_pipeline;

    fn raw(description: &str) -> RawPosting {
        RawPosting {
            title: Some("Clerk".into()),
            company_profile: Some("Firm".into()),
            description: Some(description.into()),
            requirements: Some("None".into()),
            benefits: Some("Pay".into()),
        }
    }

    #[test]
    fn default_threshold_is_policy_constant() {
        let detector = Detector::new(toy_pipeline());
        assert!((detector.threshold() - FAKE_THRESHOLD).abs() < f64::EPSILON);
        let detector = detector.with_threshold(0.75);
        assert!((detector.threshold() - 0.75).abs() < f64::EPSILON);
    }

    #[test]
    fn score_percentages_sum_to_100() {
        let detector = Detector::new(toy_pipeline());
        let result = detector.score(raw("send ssn guaranteed income")).unwrap();
        assert!((result.fake_probability + result.real_probability - 100.0).abs() <= 0.01);
        assert_eq!(
            result.confidence,
            result.fake_probability.max(result.real_probability)
        );
    }

    #[test]
    fn score_rejects_missing_field() {
        let detector = Detector::new(toy_pipeline());
        let mut posting = raw("anything");
        posting.benefits = None;
        assert!(matches!(
            detector.score(posting),
            Err(DetectorError::MissingField("benefits"))
        ));
    }

    #[test]
    fn batch_matches_single_scores() {
        let detector = Detector::new(toy_pipeline());
        let postings = vec![raw("send ssn from home"), raw("software engineer team")];
        let batch = detector.score_batch(postings.clone()).unwrap();
        let single: Vec<_> = postings
            .into_iter()
            .map(|p| detector.score(p).unwrap())
            .collect();
        assert_eq!(batch, single);
    }

    #[test]
    fn threshold_extremes_force_labels() {
        let detector = Detector::new(toy_pipeline());
        let posting = raw("office role").validate().unwrap();
        assert_eq!(detector.clone().with_threshold(0.0).classify(&posting), Label::Fake);
        assert_eq!(detector.with_threshold(1.01).classify(&posting), Label::Real);
    }
}
