use core::fmt;

use is_it_fake_preprocessing::{TfidfVectorizer, VectorizerParams};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    error::Result,
    model::{ClassifierParams, FitSummary, LogisticRegression},
    posting::JobPosting,
};

/// Verdict for one posting. Serialized as `"Real"` / `"Fake"` in scoring responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Label {
    Real,
    Fake,
}

impl Label {
    #[must_use]
    pub fn is_fake(&self) -> bool {
        matches!(self, Self::Fake)
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Real => "Real",
            Self::Fake => "Fake",
        })
    }
}

/// Decision rule: fake when `P(fake) >= threshold`.
#[inline]
#[must_use]
pub fn decide(fake_probability: f64, threshold: f64) -> Label {
    if fake_probability >= threshold {
        Label::Fake
    } else {
        Label::Real
    }
}

/// Classifier output for one posting, kept as the fraud probability.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    fake: f64,
}

impl Prediction {
    /// Clamps into `[0, 1]` so the complementary real probability stays valid.
    #[must_use]
    pub fn from_fake_probability(fake: f64) -> Self {
        Self {
            fake: fake.clamp(0.0, 1.0),
        }
    }

    #[must_use]
    pub fn fake_probability(&self) -> f64 {
        self.fake
    }

    #[must_use]
    pub fn real_probability(&self) -> f64 {
        1.0 - self.fake
    }

    /// Flags the posting as fraudulent once its fraud probability reaches
    /// `threshold`; see [`decide`].
    #[inline]
    #[must_use]
    pub fn classification(&self, threshold: f64) -> Label {
        decide(self.fake, threshold)
    }

    /// Build the scoring response: both probabilities as percentages with two
    /// decimals, the verdict at `threshold`, and the larger percentage as
    /// confidence.
    #[must_use]
    pub fn score(&self, threshold: f64) -> ScoreResult {
        let fake_probability = round_percent(self.fake_probability());
        let real_probability = round_percent(self.real_probability());
        ScoreResult {
            prediction: self.classification(threshold),
            fake_probability,
            real_probability,
            confidence: fake_probability.max(real_probability),
        }
    }
}

impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fraud probability {:.3}", self.fake)
    }
}

fn round_percent(probability: f64) -> f64 {
    (probability * 100.0 * 100.0).round() / 100.0
}

/// Scoring response. Percentages are in `[0, 100]` with two decimals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub prediction: Label,
    pub fake_probability: f64,
    pub real_probability: f64,
    pub confidence: f64,
}

impl fmt::Display for ScoreResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (fake {:.2}%, real {:.2}%)",
            self.prediction, self.fake_probability, self.real_probability
        )
    }
}

/// Fitted TF-IDF vectorizer plus fitted classifier. Immutable once built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainedPipeline {
    vectorizer: TfidfVectorizer,
    classifier: LogisticRegression,
}

impl TrainedPipeline {
    /// Fit both stages on combined posting texts with `labels[i] == true` for fraud.
    pub fn fit<T: AsRef<str> + Sync>(
        texts: &[T],
        labels: &[bool],
        vectorizer_params: VectorizerParams,
        classifier_params: &ClassifierParams,
    ) -> Result<(Self, FitSummary)> {
        debug!(num_texts = texts.len(), "Fitting pipeline");
        let (vectorizer, features) = TfidfVectorizer::fit_transform(texts, vectorizer_params)?;
        let (classifier, summary) =
            LogisticRegression::fit(&features, labels, classifier_params)?;
        Ok((
            Self {
                vectorizer,
                classifier,
            },
            summary,
        ))
    }

    pub fn predict_text(&self, text: &str) -> Prediction {
        self.predict_texts(&[text])
            .pop()
            .unwrap_or(Prediction::from_fake_probability(0.0))
    }

    pub fn predict_texts<T: AsRef<str> + Sync>(&self, texts: &[T]) -> Vec<Prediction> {
        let features = self.vectorizer.transform(texts);
        self.classifier
            .predict_fake_proba(&features)
            .into_iter()
            .map(Prediction::from_fake_probability)
            .collect()
    }

    pub fn predict(&self, posting: &JobPosting) -> Prediction {
        self.predict_text(&posting.combined_text())
    }

    pub fn vectorizer(&self) -> &TfidfVectorizer {
        &self.vectorizer
    }

    pub fn classifier(&self) -> &LogisticRegression {
        &self.classifier
    }

    pub fn num_features(&self) -> usize {
        self.vectorizer.num_features()
    }
}
