use ahash::AHashMap as HashMap;
use dashmap::DashMap;
use rayon::prelude::*;

/// Corpus statistics for one vocabulary term.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TermStats {
    /// Number of documents containing the term.
    pub doc_freq: usize,
    /// Total occurrences across the corpus.
    pub term_freq: usize,
}

/// Count every n-gram in `tokens` for `n` in the inclusive `ngram_range`.
pub fn count_ngrams(tokens: &[String], ngram_range: (usize, usize)) -> HashMap<String, usize> {
    let mut ngram_counter = HashMap::new();

    for n in ngram_range.0..=ngram_range.1 {
        for window in tokens.windows(n) {
            *ngram_counter.entry(window.join(" ")).or_insert(0) += 1;
        }
    }
    ngram_counter
}

pub fn build_vocabulary(
    ngram_maps: &[HashMap<String, usize>],
) -> DashMap<String, TermStats, ahash::RandomState> {
    let vocab = DashMap::with_hasher(ahash::RandomState::default());

    ngram_maps.par_iter().for_each(|ngrams| {
        for (term, &count) in ngrams {
            let mut stats = vocab.entry(term.clone()).or_insert_with(TermStats::default);
            stats.doc_freq += 1;
            stats.term_freq += count;
        }
    });
    vocab
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| (*w).to_owned()).collect()
    }

    #[test]
    fn counts_unigrams_and_bigrams() {
        let counts = count_ngrams(&tokens(&["remote", "job", "remote", "job"]), (1, 2));
        assert_eq!(counts["remote"], 2);
        assert_eq!(counts["remote job"], 2);
        assert_eq!(counts["job remote"], 1);
        assert_eq!(counts.len(), 4);
    }

    #[test]
    fn vocabulary_tracks_document_and_term_frequency() {
        let maps = vec![
            count_ngrams(&tokens(&["cash", "cash", "fast"]), (1, 1)),
            count_ngrams(&tokens(&["cash", "team"]), (1, 1)),
        ];
        let vocab = build_vocabulary(&maps);
        assert_eq!(
            *vocab.get("cash").unwrap(),
            TermStats {
                doc_freq: 2,
                term_freq: 3
            }
        );
        assert_eq!(vocab.get("team").unwrap().doc_freq, 1);
    }
}
