/// Fraud probability at or above which a posting is labelled fake.
///
/// Sits below the classifier's natural 0.5 boundary so borderline postings are flagged.
pub const FAKE_THRESHOLD: f64 = 0.30;
