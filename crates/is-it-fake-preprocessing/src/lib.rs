//! Text vectorization for the is-it-fake job posting classifier.
//!
//! Word-level TF-IDF with English stop-word removal and a bounded vocabulary.

pub mod pre_processor;

pub use pre_processor::{DEFAULT_MAX_FEATURES, TfidfVectorizer, VectorizerError, VectorizerParams};
