mod vectorizer;

pub use vectorizer::{DEFAULT_MAX_FEATURES, TfidfVectorizer, VectorizerError, VectorizerParams};
