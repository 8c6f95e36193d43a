use std::ops::RangeInclusive;

/// Default vocabulary cap.
pub const DEFAULT_MAX_FEATURES: usize = 10_000;

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct VectorizerParams {
    ngram_range: (usize, usize),
    /// Minimum document frequency for filtering vocabulary.
    /// - If `min_df` is in (0.0, 1.0), it's a proportion of documents
    /// - If `min_df` >= 1.0, it's an absolute document count
    min_df: f64,
    /// Maximum document frequency for filtering vocabulary.
    /// - If `max_df` is in (0.0, 1.0], it's a proportion of documents
    /// - If `max_df` > 1.0, it's an absolute document count
    max_df: f64,
    /// Keep only the `max_features` terms with the highest corpus frequency.
    max_features: Option<usize>,
    /// Apply sublinear tf scaling: replace term frequency `tf` with `1 + log(tf)`.
    sublinear_tf: bool,
}

impl VectorizerParams {
    pub fn new(
        ngram_range: impl Into<RangeInclusive<usize>>,
        min_df: f64,
        max_df: f64,
        max_features: Option<usize>,
        sublinear_tf: bool,
    ) -> Self {
        let range = ngram_range.into();
        let (lo, hi) = (*range.start(), *range.end());
        assert!(lo >= 1 && lo <= hi, "ngram_range must be non-empty and start at 1 or above");
        assert!(
            min_df > 0.0,
            "min_df must be positive (proportion in (0.0, 1.0) or absolute count >= 1.0)"
        );
        assert!(
            max_df > 0.0,
            "max_df must be positive (proportion in (0.0, 1.0] or absolute count > 1.0)"
        );
        assert!(max_features != Some(0), "max_features must be at least 1");
        Self {
            ngram_range: (lo, hi),
            min_df,
            max_df,
            max_features,
            sublinear_tf,
        }
    }

    #[must_use]
    pub fn with_max_features(mut self, max_features: usize) -> Self {
        assert!(max_features > 0, "max_features must be at least 1");
        self.max_features = Some(max_features);
        self
    }

    #[must_use]
    pub fn ngram_range(&self) -> (usize, usize) {
        self.ngram_range
    }

    #[must_use]
    pub fn min_df(&self) -> f64 {
        self.min_df
    }

    #[must_use]
    pub fn max_df(&self) -> f64 {
        self.max_df
    }

    #[must_use]
    pub fn max_features(&self) -> Option<usize> {
        self.max_features
    }

    #[must_use]
    pub fn sublinear_tf(&self) -> bool {
        self.sublinear_tf
    }

    /// Resolve `min_df`/`max_df` into absolute document counts for a corpus of `n_docs`.
    #[must_use]
    pub fn df_bounds(&self, n_docs: usize) -> (usize, usize) {
        let n = n_docs as f64;
        let min = if self.min_df >= 1.0 {
            self.min_df as usize
        } else {
            (self.min_df * n).ceil() as usize
        };
        let max = if self.max_df > 1.0 {
            self.max_df as usize
        } else {
            (self.max_df * n).floor() as usize
        };
        (min.max(1), max)
    }
}

impl Default for VectorizerParams {
    fn default() -> Self {
        Self {
            ngram_range: (1, 1),
            min_df: 1.0,
            max_df: 1.0,
            max_features: Some(DEFAULT_MAX_FEATURES),
            sublinear_tf: false,
        }
    }
}

impl From<((usize, usize), f64, f64, Option<usize>, bool)> for VectorizerParams {
    fn from(value: ((usize, usize), f64, f64, Option<usize>, bool)) -> Self {
        Self::new(value.0.0..=value.0.1, value.1, value.2, value.3, value.4)
    }
}
