use itertools::Itertools;

/// Words shorter than this never appear in a crossword.
pub const MIN_WORD_LENGTH: usize = 3;

/// The word bank, bucketed by length.
///
/// Candidates are kept as one flattened list, sorted by length with
/// bank order preserved within each length. Index `k` in this list is
/// the canonical id for "word k is placed" variables: because
/// `words_under(l)` is a prefix count, the first `words_under(l)`
/// candidates are exactly the words that fit in `l` cells, so every
/// cell's word-flag block indexes the same words the same way.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WordBank {
  candidates: Vec<String>,
  /// `counts_under[l]` = number of candidates with length in
  /// `[MIN_WORD_LENGTH, l]`. Monotonically non-decreasing.
  counts_under: Vec<usize>,
  max_length: usize,
}

impl WordBank {
  /// Buckets `words`, discarding any shorter than [`MIN_WORD_LENGTH`]
  /// or longer than `max_length`. Deterministic and stable: the same
  /// bank and `max_length` always produce the same buckets.
  pub fn from_words(words: impl IntoIterator<Item = String>, max_length: usize) -> Self {
    Self::with_limit(words, max_length, None)
  }

  /// Like [`Self::from_words`], but first caps the bank at `limit`
  /// words. The cap applies before length filtering.
  pub fn with_limit(
    words: impl IntoIterator<Item = String>,
    max_length: usize,
    limit: Option<usize>,
  ) -> Self {
    let words = words.into_iter();
    let words: Vec<_> = match limit {
      Some(limit) => words.take(limit).collect(),
      None => words.collect(),
    };

    let candidates: Vec<_> = words
      .into_iter()
      .filter(|word| (MIN_WORD_LENGTH..=max_length).contains(&word.chars().count()))
      .sorted_by_key(|word| word.chars().count())
      .collect();
    let counts_under = (0..=max_length)
      .map(|length| candidates.partition_point(|word| word.chars().count() <= length))
      .collect();

    Self { candidates, counts_under, max_length }
  }

  /// Number of candidates with length at most `length`.
  pub fn words_under(&self, length: usize) -> usize {
    self
      .counts_under
      .get(length)
      .copied()
      .unwrap_or(self.candidates.len())
  }

  pub fn candidate(&self, index: usize) -> Option<&str> {
    self.candidates.get(index).map(|word| word.as_str())
  }

  pub fn candidates(&self) -> impl Iterator<Item = &str> {
    self.candidates.iter().map(|word| word.as_str())
  }

  pub fn words_with_length(&self, length: usize) -> &[String] {
    if !(MIN_WORD_LENGTH..=self.max_length).contains(&length) {
      return &[];
    }
    &self.candidates[self.counts_under[length - 1]..self.counts_under[length]]
  }

  pub fn max_length(&self) -> usize {
    self.max_length
  }

  pub fn len(&self) -> usize {
    self.candidates.len()
  }

  pub fn is_empty(&self) -> bool {
    self.candidates.is_empty()
  }
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

  use googletest::prelude::*;

  use super::WordBank;

  fn bank_of(words: &[&str], max_length: usize) -> WordBank {
    WordBank::from_words(words.iter().map(|word| word.to_string()), max_length)
  }

  #[gtest]
  fn test_short_and_long_words_excluded() {
    let bank = bank_of(&["at", "cat", "ox", "pencil", "dogs"], 5);
    expect_that!(bank.candidates().collect::<Vec<_>>(), container_eq(["cat", "dogs"]));
  }

  #[gtest]
  fn test_sorted_by_length_stable_within_length() {
    let bank = bank_of(&["dogs", "cat", "dog", "cats", "bat"], 5);
    expect_that!(
      bank.candidates().collect::<Vec<_>>(),
      container_eq(["cat", "dog", "bat", "dogs", "cats"])
    );
  }

  #[gtest]
  fn test_counts_under() {
    let bank = bank_of(&["cat", "dog", "cats"], 5);
    expect_that!(
      (0..=5).map(|length| bank.words_under(length)).collect::<Vec<_>>(),
      container_eq([0, 0, 0, 2, 3, 3])
    );
  }

  #[gtest]
  fn test_counts_under_monotonic() {
    let bank = bank_of(&["whale", "cat", "dogs", "egret", "fig"], 6);
    for length in 1..=6 {
      expect_ge!(bank.words_under(length), bank.words_under(length - 1));
    }
  }

  #[gtest]
  fn test_limit_applies_before_filtering() {
    let bank = WordBank::with_limit(
      ["at", "cat", "dog", "cats"].map(str::to_owned),
      5,
      Some(3),
    );
    expect_that!(bank.candidates().collect::<Vec<_>>(), container_eq(["cat", "dog"]));
  }

  #[gtest]
  fn test_words_with_length() {
    let bank = bank_of(&["cat", "dog", "cats"], 5);
    expect_that!(bank.words_with_length(3), container_eq(["cat".to_owned(), "dog".to_owned()]));
    expect_that!(bank.words_with_length(4), container_eq(["cats".to_owned()]));
    expect_that!(bank.words_with_length(5), empty());
    expect_that!(bank.words_with_length(2), empty());
    expect_that!(bank.words_with_length(100), empty());
  }

  #[gtest]
  fn test_deterministic() {
    let words = ["whale", "cat", "dogs", "egret", "fig", "no"];
    expect_eq!(bank_of(&words, 6), bank_of(&words, 6));
  }

  #[gtest]
  fn test_empty_bank() {
    let bank = bank_of(&[], 5);
    expect_true!(bank.is_empty());
    expect_that!(bank.words_under(5), eq(0));
  }
}
