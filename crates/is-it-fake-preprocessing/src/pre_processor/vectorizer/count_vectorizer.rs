use std::cmp::Reverse;

use ahash::{AHashMap, HashMap};
use sprs::CsMat;
use tracing::debug;

use super::{VectorizerError, ngrams, params::VectorizerParams, tokenizer};

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct CountVectorizer {
    params: VectorizerParams,
    /// Vocabulary mapping term (n-grams joined by a space) to feature index.
    /// Indices follow the lexicographic order of the terms.
    vocab: HashMap<String, usize>,
}

impl CountVectorizer {
    pub fn fit<T: AsRef<str> + Sync>(
        texts: &[T],
        params: VectorizerParams,
    ) -> Result<Self, VectorizerError> {
        Self::fit_transform(texts, params).map(|(vectorizer, _)| vectorizer)
    }

    /// Build the vocabulary from per-document n-gram counts.
    fn fit_from_ngrams(
        ngram_maps: &[AHashMap<String, usize>],
        params: VectorizerParams,
    ) -> Result<Self, VectorizerError> {
        if ngram_maps.is_empty() {
            return Err(VectorizerError::EmptyCorpus);
        }
        debug!("Building vocabulary from n-gram counts");
        let vocab_stats = ngrams::build_vocabulary(ngram_maps);
        let vocab_size = vocab_stats.len();

        let (min_df, max_df) = params.df_bounds(ngram_maps.len());
        debug!(min_df, max_df, "Applying document frequency filtering");
        let mut candidates = vocab_stats
            .into_iter()
            .filter(|(_, stats)| stats.doc_freq >= min_df && stats.doc_freq <= max_df)
            .map(|(term, stats)| (term, stats.term_freq))
            .collect::<Vec<_>>();

        if let Some(max_features) = params.max_features() {
            // Most frequent first; ties resolved by term so the fit is deterministic.
            candidates.sort_by(|a, b| (Reverse(a.1), &a.0).cmp(&(Reverse(b.1), &b.0)));
            candidates.truncate(max_features);
        }
        debug!(
            original_size = vocab_size,
            filtered_size = candidates.len(),
            "Vocabulary filtered"
        );

        if candidates.is_empty() {
            return Err(VectorizerError::EmptyVocabulary);
        }

        let mut sorted_terms = candidates
            .into_iter()
            .map(|(term, _)| term)
            .collect::<Vec<_>>();
        sorted_terms.sort();
        let vocab = sorted_terms
            .into_iter()
            .enumerate()
            .map(|(idx, term)| (term, idx))
            .collect::<HashMap<String, usize>>();

        debug!(vocab_size = vocab.len(), "CountVectorizer fitting complete");

        Ok(Self { params, vocab })
    }

    pub fn transform<T: AsRef<str> + Sync>(&self, texts: &[T]) -> CsMat<f64> {
        debug!(
            num_texts = texts.len(),
            "Transforming texts using CountVectorizer"
        );
        let ngram_maps = self.count_documents(texts);
        self.transform_from_ngrams(&ngram_maps)
    }

    fn count_documents<T: AsRef<str> + Sync>(&self, texts: &[T]) -> Vec<AHashMap<String, usize>> {
        Self::count_with(texts, &self.params)
    }

    fn count_with<T: AsRef<str> + Sync>(
        texts: &[T],
        params: &VectorizerParams,
    ) -> Vec<AHashMap<String, usize>> {
        tokenizer::tokenize(texts)
            .iter()
            .map(|tokens| ngrams::count_ngrams(tokens, params.ngram_range()))
            .collect()
    }

    /// Out-of-vocabulary terms are dropped.
    fn transform_from_ngrams(&self, ngram_maps: &[AHashMap<String, usize>]) -> CsMat<f64> {
        let mut indptr = Vec::with_capacity(ngram_maps.len() + 1);
        let mut indices = Vec::new();
        let mut data = Vec::new();

        indptr.push(0);

        for ngrams in ngram_maps {
            let mut row_entries = ngrams
                .iter()
                .filter_map(|(term, &count)| {
                    self.vocab
                        .get(term)
                        .map(|&col_idx| (col_idx, count as f64))
                })
                .collect::<Vec<_>>();

            row_entries.sort_by_key(|(col_idx, _)| *col_idx);
            for (col_idx, count) in row_entries {
                indices.push(col_idx);
                data.push(count);
            }
            indptr.push(indices.len());
        }

        debug!(
            non_zero_entries = data.len(),
            "Text transformation complete"
        );
        CsMat::new(
            (ngram_maps.len(), self.num_features()),
            indptr,
            indices,
            data,
        )
    }

    /// Tokenizes and counts n-grams once, reusing the counts for both
    /// vocabulary building and transformation.
    pub fn fit_transform<T: AsRef<str> + Sync>(
        texts: &[T],
        params: VectorizerParams,
    ) -> Result<(Self, CsMat<f64>), VectorizerError> {
        debug!(num_texts = texts.len(), "Counting n-grams for fit_transform");
        let ngram_maps = Self::count_with(texts, &params);
        let vectorizer = Self::fit_from_ngrams(&ngram_maps, params)?;
        let transformed = vectorizer.transform_from_ngrams(&ngram_maps);
        Ok((vectorizer, transformed))
    }

    pub fn num_features(&self) -> usize {
        self.vocab.len()
    }

    pub fn vocabulary(&self) -> &HashMap<String, usize> {
        &self.vocab
    }

    pub fn params(&self) -> &VectorizerParams {
        &self.params
    }
}
