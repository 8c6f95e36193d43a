mod classifier;
mod optimizer;
mod threshold;

pub use classifier::{ClassWeight, ClassifierParams, FitSummary, LogisticRegression};
pub use threshold::FAKE_THRESHOLD;
