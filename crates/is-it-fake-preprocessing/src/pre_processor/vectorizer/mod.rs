mod count_vectorizer;
mod ngrams;
mod params;
mod stop_words;
mod tfidf_vectorizer;
mod tokenizer;

use thiserror::Error;

pub use params::{DEFAULT_MAX_FEATURES, VectorizerParams};
pub use tfidf_vectorizer::TfidfVectorizer;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum VectorizerError {
    #[error("cannot fit a vectorizer on an empty corpus")]
    EmptyCorpus,

    #[error("empty vocabulary: every term was a stop word or filtered by document frequency")]
    EmptyVocabulary,
}
