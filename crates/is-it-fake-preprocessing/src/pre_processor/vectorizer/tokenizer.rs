use std::{borrow::Cow, sync::LazyLock};

use indicatif::{ParallelProgressIterator, ProgressBar, ProgressStyle};
use rayon::prelude::*;
use regex::Regex;
use tracing::debug;

use super::stop_words::is_stop_word;

/// Minimum number of texts to consider parallelization
const MIN_TEXTS_FOR_PARALLEL: usize = 100;

/// Minimum total character count to consider parallelization
const MIN_CHARS_FOR_PARALLEL: usize = 10_000;

/// Two or more word characters.
static TOKEN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\w\w+\b").expect("token pattern is a valid regex"));

/// Hidden for batches below `MIN_TEXTS_FOR_PARALLEL`, which only go parallel on total size.
fn progress_bar_setup(len: usize, message: impl Into<Cow<'static, str>>) -> ProgressBar {
    if len < MIN_TEXTS_FOR_PARALLEL {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{msg} [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
            .expect("progress template is valid")
            .progress_chars("#>-"),
    );
    pb.set_message(message);
    pb
}

/// Lowercase, split on the token pattern and drop English stop words.
#[must_use]
pub fn tokenize_one(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    TOKEN_PATTERN
        .find_iter(&lowered)
        .map(|m| m.as_str())
        .filter(|token| !is_stop_word(token))
        .map(str::to_owned)
        .collect()
}

fn tokenize_texts_par<T: AsRef<str> + Sync>(texts: &[T]) -> Vec<Vec<String>> {
    debug!(num_texts = texts.len(), "Using parallel tokenization");
    let pb = progress_bar_setup(texts.len(), "Tokenizing texts in parallel");
    let result = texts
        .par_iter()
        .progress_with(pb.clone())
        .map(|text| tokenize_one(text.as_ref()))
        .collect();
    pb.finish_with_message("Parallel tokenization complete");
    result
}

fn tokenize_texts<T: AsRef<str>>(texts: &[T]) -> Vec<Vec<String>> {
    debug!(num_texts = texts.len(), "Using sequential tokenization");
    texts.iter().map(|text| tokenize_one(text.as_ref())).collect()
}

/// Parallelize when there are many texts or the total character count is large.
#[inline]
fn should_use_parallel<T: AsRef<str>>(texts: &[T]) -> bool {
    let num_texts = texts.len();

    if num_texts >= MIN_TEXTS_FOR_PARALLEL {
        return true;
    }

    let total_chars: usize = if num_texts > 20 {
        let sample_chars: usize = texts.iter().take(20).map(|s| s.as_ref().len()).sum();
        (sample_chars * num_texts) / 20
    } else {
        texts.iter().map(|s| s.as_ref().len()).sum()
    };

    total_chars >= MIN_CHARS_FOR_PARALLEL
}

pub fn tokenize<T: AsRef<str> + Sync>(texts: &[T]) -> Vec<Vec<String>> {
    if should_use_parallel(texts) {
        tokenize_texts_par(texts)
    } else {
        tokenize_texts(texts)
    }
}
