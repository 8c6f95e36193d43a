use serde::Serialize;

use crate::pipeline::Label;

/// Hold-out metrics with "fake" as the positive class.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Evaluation {
    pub true_positives: usize,
    pub false_positives: usize,
    pub true_negatives: usize,
    pub false_negatives: usize,
}

impl Evaluation {
    pub fn from_predictions(predicted: &[Label], actual_fake: &[bool]) -> Self {
        let mut eval = Self::default();
        for (label, &fake) in predicted.iter().zip(actual_fake) {
            match (label.is_fake(), fake) {
                (true, true) => eval.true_positives += 1,
                (true, false) => eval.false_positives += 1,
                (false, false) => eval.true_negatives += 1,
                (false, true) => eval.false_negatives += 1,
            }
        }
        eval
    }

    pub fn total(&self) -> usize {
        self.true_positives + self.false_positives + self.true_negatives + self.false_negatives
    }

    pub fn accuracy(&self) -> f64 {
        ratio(self.true_positives + self.true_negatives, self.total())
    }

    pub fn precision(&self) -> f64 {
        ratio(self.true_positives, self.true_positives + self.false_positives)
    }

    pub fn recall(&self) -> f64 {
        ratio(self.true_positives, self.true_positives + self.false_negatives)
    }

    pub fn f1(&self) -> f64 {
        let (p, r) = (self.precision(), self.recall());
        if p + r == 0.0 { 0.0 } else { 2.0 * p * r / (p + r) }
    }
}

/// Zero when the denominator is zero.
fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 { 0.0 } else { num as f64 / den as f64 }
}
