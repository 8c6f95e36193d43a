use ahash::HashMap;
use sprs::CsMat;
use tracing::debug;

use super::{VectorizerError, count_vectorizer::CountVectorizer, params::VectorizerParams};

/// Count vectorizer plus frozen inverse document frequencies.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct TfidfVectorizer {
    count_vectorizer: CountVectorizer,
    idf: Vec<f64>,
}

impl TfidfVectorizer {
    pub fn fit<T: AsRef<str> + Sync>(
        texts: &[T],
        params: VectorizerParams,
    ) -> Result<Self, VectorizerError> {
        debug!(num_texts = texts.len(), "Fitting TfidfVectorizer");
        let (count_vectorizer, tf_matrix) = CountVectorizer::fit_transform(texts, params)?;
        debug!("Calculating IDF values");

        // Calculate IDF: log((n_docs + 1) / (df + 1)) + 1
        let n_docs = texts.len() as f64;
        let num_features = count_vectorizer.num_features();

        let mut df = vec![0usize; num_features];
        for row_vec in tf_matrix.outer_iterator() {
            for (col_idx, _val) in row_vec.iter() {
                df[col_idx] += 1;
            }
        }
        let idf = df
            .iter()
            .map(|&doc_freq| ((n_docs + 1.0) / (doc_freq as f64 + 1.0)).ln() + 1.0)
            .collect();
        debug!("IDF calculation complete");

        Ok(Self {
            count_vectorizer,
            idf,
        })
    }

    /// One L2-normalized row per input text. Rows with no known term stay empty.
    pub fn transform<T: AsRef<str> + Sync>(&self, texts: &[T]) -> CsMat<f64> {
        debug!(
            num_texts = texts.len(),
            "Transforming texts using TfidfVectorizer"
        );
        let mut tf_matrix = self.count_vectorizer.transform(texts);
        let sublinear = self.count_vectorizer.params().sublinear_tf();

        for mut row_vec in tf_matrix.outer_iterator_mut() {
            for (col_idx, val) in row_vec.iter_mut() {
                if sublinear {
                    *val = 1.0 + val.ln();
                }
                *val *= self.idf[col_idx];
            }
            let norm = row_vec.iter().map(|(_, &v)| v * v).sum::<f64>().sqrt();
            if norm > 0.0 {
                for (_, val) in row_vec.iter_mut() {
                    *val /= norm;
                }
            }
        }
        tf_matrix
    }

    pub fn fit_transform<T: AsRef<str> + Sync>(
        texts: &[T],
        params: VectorizerParams,
    ) -> Result<(Self, CsMat<f64>), VectorizerError> {
        let vectorizer = Self::fit(texts, params)?;
        let transformed = vectorizer.transform(texts);
        Ok((vectorizer, transformed))
    }

    pub fn num_features(&self) -> usize {
        self.count_vectorizer.num_features()
    }

    pub fn vocabulary(&self) -> &HashMap<String, usize> {
        self.count_vectorizer.vocabulary()
    }

    pub fn idf(&self) -> &[f64] {
        &self.idf
    }

    pub fn params(&self) -> &VectorizerParams {
        self.count_vectorizer.params()
    }
}
