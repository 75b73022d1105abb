use std::collections::HashMap;

use itertools::Itertools;
use util::{
  error::{XWordError, XWordResult},
  pos::{Diff, Pos},
};

use crate::{
  layout::{VariableLayout, LETTER_FLAGS},
  word_bank::WordBank,
};

/// The quadratic objective: a sparse symmetric coefficient map over
/// unordered variable pairs. Diagonal entries are linear biases,
/// off-diagonal entries pairwise interactions. Only `(i, j)` with
/// `i <= j` is ever stored; unset pairs are zero.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PenaltyMap {
  terms: HashMap<(usize, usize), f64>,
  num_variables: usize,
}

impl PenaltyMap {
  pub fn new(num_variables: usize) -> Self {
    Self { terms: HashMap::new(), num_variables }
  }

  /// Accumulates `coeff` onto the `(i, j)` entry. Never overwrites:
  /// constraints touching the same pair simply sum.
  pub fn add(&mut self, i: usize, j: usize, coeff: f64) {
    debug_assert!(i < self.num_variables && j < self.num_variables);
    let key = if i <= j { (i, j) } else { (j, i) };
    *self.terms.entry(key).or_default() += coeff;
  }

  pub fn coeff(&self, i: usize, j: usize) -> f64 {
    let key = if i <= j { (i, j) } else { (j, i) };
    self.terms.get(&key).copied().unwrap_or(0.)
  }

  pub fn terms(&self) -> impl Iterator<Item = ((usize, usize), f64)> + '_ {
    self.terms.iter().map(|(&pair, &coeff)| (pair, coeff))
  }

  pub fn num_variables(&self) -> usize {
    self.num_variables
  }

  pub fn num_terms(&self) -> usize {
    self.terms.len()
  }

  /// Objective value of `bits`, which must have exactly
  /// [`Self::num_variables`] entries.
  pub fn energy(&self, bits: &[bool]) -> f64 {
    debug_assert!(bits.len() == self.num_variables);
    self
      .terms
      .iter()
      .filter(|&(&(i, j), _)| bits[i] && bits[j])
      .map(|(_, &coeff)| coeff)
      .sum()
  }
}

/// Tunable weights for the soft parts of the objective. The one-hot
/// and span-consistency coefficients are fixed by construction.
#[derive(Clone, Copy, Debug)]
pub struct AssemblerConfig {
  /// Bias subtracted from every occupancy flag, rewarding filled cells.
  pub fill_reward: f64,
  /// Interaction added between a word flag and the occupancy flag of
  /// the cell just before the word's start / after its end.
  pub boundary_penalty: f64,
}

impl Default for AssemblerConfig {
  fn default() -> Self {
    Self { fill_reward: 0.5, boundary_penalty: 2. }
  }
}

/// Builds the [`PenaltyMap`] encoding every crossword constraint.
///
/// The assembler exclusively owns the map while it accumulates terms;
/// [`Self::assemble`] hands back a value the caller treats as frozen.
pub struct PenaltyAssembler<'a> {
  layout: &'a VariableLayout,
  bank: &'a WordBank,
  config: AssemblerConfig,
}

impl<'a> PenaltyAssembler<'a> {
  pub fn new(layout: &'a VariableLayout, bank: &'a WordBank) -> Self {
    Self::with_config(layout, bank, AssemblerConfig::default())
  }

  pub fn with_config(
    layout: &'a VariableLayout,
    bank: &'a WordBank,
    config: AssemblerConfig,
  ) -> Self {
    Self { layout, bank, config }
  }

  pub fn assemble(&self) -> XWordResult<PenaltyMap> {
    let mut qubo = PenaltyMap::new(self.layout.num_variables());
    for pos in self.layout.cells() {
      self.add_fill_reward(&mut qubo, pos);
      self.add_letter_one_hot(&mut qubo, pos);
      self.add_word_one_hot(&mut qubo, pos);
      self.add_word_constraints(&mut qubo, pos, Diff::RIGHT)?;
      self.add_word_constraints(&mut qubo, pos, Diff::DOWN)?;
    }
    Ok(qubo)
  }

  fn add_fill_reward(&self, qubo: &mut PenaltyMap, pos: Pos) {
    let occupancy = self.layout.occupancy_var(pos);
    qubo.add(occupancy, occupancy, -self.config.fill_reward);
  }

  /// The one-hot pattern: minimizing `-sum(x) + 2 * sum(pairs)` over a
  /// group attains its minimum exactly when one flag is active.
  fn add_one_hot_group(&self, qubo: &mut PenaltyMap, vars: impl Iterator<Item = usize>) {
    let vars: Vec<_> = vars.collect();
    for &var in &vars {
      qubo.add(var, var, -1.);
    }
    for (&a, &b) in vars.iter().tuple_combinations() {
      qubo.add(a, b, 2.);
    }
  }

  fn add_letter_one_hot(&self, qubo: &mut PenaltyMap, pos: Pos) {
    self.add_one_hot_group(
      qubo,
      (0..LETTER_FLAGS).map(|letter| self.layout.letter_var(pos, letter)),
    );
  }

  /// At-most/exactly-one word per cell and direction. Under the slack
  /// policy the slack flag joins its group, so "no word here" also
  /// satisfies the one-hot at zero penalty.
  fn add_word_one_hot(&self, qubo: &mut PenaltyMap, pos: Pos) {
    self.add_one_hot_group(
      qubo,
      (0..self.layout.across_count(pos))
        .map(|index| self.layout.across_word_var(pos, index))
        .chain(self.layout.across_slack_var(pos)),
    );
    self.add_one_hot_group(
      qubo,
      (0..self.layout.down_count(pos))
        .map(|index| self.layout.down_word_var(pos, index))
        .chain(self.layout.down_slack_var(pos)),
    );
  }

  /// Span consistency and boundary emptiness for every admissible
  /// candidate starting at `pos` in direction `step`.
  ///
  /// Span consistency adds +1 to the word flag's diagonal per letter
  /// position and -1 to each (word flag, matching letter flag) pair:
  /// an active word whose letters all match nets zero, while each
  /// mismatched position leaves +1 behind.
  fn add_word_constraints(&self, qubo: &mut PenaltyMap, pos: Pos, step: Diff) -> XWordResult {
    let across = step == Diff::RIGHT;
    let count = if across {
      self.layout.across_count(pos)
    } else {
      self.layout.down_count(pos)
    };

    for index in 0..count {
      let word_var = if across {
        self.layout.across_word_var(pos, index)
      } else {
        self.layout.down_word_var(pos, index)
      };
      let word = self
        .bank
        .candidate(index)
        .ok_or_else(|| XWordError::Internal(format!("Unknown candidate index {index}")))?;

      let mut length = 0;
      for (position, letter) in word.chars().enumerate() {
        let letter = letter_index(letter)?;
        let cell = pos + step * position as i32;
        qubo.add(word_var, word_var, 1.);
        qubo.add(word_var, self.layout.letter_var(cell, letter), -1.);
        length += 1;
      }

      let before = pos - step;
      if self.layout.in_bounds(before) {
        qubo.add(
          word_var,
          self.layout.occupancy_var(before),
          self.config.boundary_penalty,
        );
      }
      let after = pos + step * length;
      if self.layout.in_bounds(after) {
        qubo.add(
          word_var,
          self.layout.occupancy_var(after),
          self.config.boundary_penalty,
        );
      }
    }

    Ok(())
  }
}

pub fn letter_index(letter: char) -> XWordResult<usize> {
  (letter as usize)
    .checked_sub('a' as usize)
    .filter(|&index| index < LETTER_FLAGS)
    .ok_or_else(|| XWordError::Parse(format!("Letter '{letter}' is not in a-z")).into())
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

  use googletest::prelude::*;
  use util::pos::Pos;

  use super::{letter_index, AssemblerConfig, PenaltyAssembler, PenaltyMap};
  use crate::{
    layout::{OneHotPolicy, VariableLayout},
    word_bank::WordBank,
  };

  #[gtest]
  fn test_penalty_map_accumulates() {
    let mut qubo = PenaltyMap::new(4);
    qubo.add(3, 1, 2.);
    qubo.add(1, 3, 0.5);
    expect_that!(qubo.coeff(1, 3), eq(2.5));
    expect_that!(qubo.coeff(3, 1), eq(2.5));
    expect_that!(qubo.coeff(0, 1), eq(0.));
    expect_that!(qubo.num_terms(), eq(1));
  }

  #[gtest]
  fn test_penalty_map_energy() {
    let mut qubo = PenaltyMap::new(3);
    qubo.add(0, 0, -1.);
    qubo.add(1, 1, -1.);
    qubo.add(0, 1, 2.);
    qubo.add(1, 2, 5.);
    expect_that!(qubo.energy(&[false, false, false]), eq(0.));
    expect_that!(qubo.energy(&[true, false, false]), eq(-1.));
    expect_that!(qubo.energy(&[true, true, false]), eq(0.));
    expect_that!(qubo.energy(&[false, true, true]), eq(4.));
  }

  #[gtest]
  fn test_letter_index() {
    expect_that!(letter_index('a'), ok(eq(&0)));
    expect_that!(letter_index('z'), ok(eq(&25)));
    expect_that!(letter_index('A'), err(anything()));
    expect_that!(letter_index('é'), err(anything()));
  }

  fn assemble(
    size: usize,
    words: &[&str],
    policy: OneHotPolicy,
  ) -> (VariableLayout, WordBank, PenaltyMap) {
    let bank = WordBank::from_words(words.iter().map(|word| word.to_string()), size);
    let layout = VariableLayout::plan(size, &bank, policy);
    let qubo = PenaltyAssembler::new(&layout, &bank).assemble().unwrap();
    (layout, bank, qubo)
  }

  #[gtest]
  fn test_letter_one_hot_structure() {
    let (layout, _, qubo) = assemble(1, &[], OneHotPolicy::Strict);
    let pos = Pos::zero();

    for letter in 0..26 {
      let var = layout.letter_var(pos, letter);
      expect_that!(qubo.coeff(var, var), eq(-1.));
    }

    let pairs: Vec<_> = qubo
      .terms()
      .filter(|&((i, j), _)| i != j)
      .map(|(_, coeff)| coeff)
      .collect();
    // C(26, 2) letter pairs, nothing else off-diagonal.
    expect_that!(pairs.len(), eq(325));
    for coeff in pairs {
      expect_that!(coeff, eq(2.));
    }
  }

  #[gtest]
  fn test_empty_bank_yields_only_cellwise_terms() {
    let (layout, _, qubo) = assemble(1, &[], OneHotPolicy::Strict);
    let occupancy = layout.occupancy_var(Pos::zero());
    expect_that!(qubo.coeff(occupancy, occupancy), eq(-0.5));
    // 1 occupancy bias + 26 letter biases + 325 letter pairs.
    expect_that!(qubo.num_terms(), eq(1 + 26 + 325));
  }

  #[gtest]
  fn test_slack_flags_join_one_hot_groups() {
    let (layout, _, qubo) = assemble(1, &[], OneHotPolicy::Slack);
    let pos = Pos::zero();
    let across_slack = layout.across_slack_var(pos).unwrap();
    let down_slack = layout.down_slack_var(pos).unwrap();
    expect_that!(qubo.coeff(across_slack, across_slack), eq(-1.));
    expect_that!(qubo.coeff(down_slack, down_slack), eq(-1.));
  }

  #[gtest]
  fn test_span_consistency_coefficients() {
    let (layout, bank, qubo) = assemble(3, &["cat"], OneHotPolicy::Strict);
    let pos = Pos::zero();
    expect_that!(bank.candidate(0), some(eq("cat")));

    // +3 from span consistency, -1 from the word one-hot.
    let word_var = layout.across_word_var(pos, 0);
    expect_that!(qubo.coeff(word_var, word_var), eq(2.));

    for (offset, letter) in [(0, 'c'), (1, 'a'), (2, 't')] {
      let cell = Pos { x: offset, y: 0 };
      let letter_var = layout.letter_var(cell, letter_index(letter).unwrap());
      expect_that!(qubo.coeff(word_var, letter_var), eq(-1.));
    }

    // A letter the word never uses stays uncoupled.
    let stray = layout.letter_var(pos, letter_index('z').unwrap());
    expect_that!(qubo.coeff(word_var, stray), eq(0.));
  }

  #[gtest]
  fn test_down_span_consistency_walks_rows() {
    let (layout, _, qubo) = assemble(3, &["cat"], OneHotPolicy::Strict);
    let word_var = layout.down_word_var(Pos::zero(), 0);
    let letter_var = layout.letter_var(Pos { x: 0, y: 2 }, letter_index('t').unwrap());
    expect_that!(qubo.coeff(word_var, letter_var), eq(-1.));
  }

  #[gtest]
  fn test_boundary_emptiness() {
    let (layout, _, qubo) = assemble(5, &["cat"], OneHotPolicy::Slack);

    // Word starting mid-row couples with both flanking occupancies.
    let pos = Pos { x: 1, y: 0 };
    let word_var = layout.across_word_var(pos, 0);
    let before = layout.occupancy_var(Pos::zero());
    let after = layout.occupancy_var(Pos { x: 4, y: 0 });
    expect_that!(qubo.coeff(word_var, before), eq(2.));
    expect_that!(qubo.coeff(word_var, after), eq(2.));

    // At the left edge only the cell past the end is penalized.
    let edge_var = layout.across_word_var(Pos::zero(), 0);
    let past_end = layout.occupancy_var(Pos { x: 3, y: 0 });
    expect_that!(qubo.coeff(edge_var, past_end), eq(2.));
  }

  #[gtest]
  fn test_config_weights_applied() {
    let bank = WordBank::from_words(["cat"].map(str::to_owned), 4);
    let layout = VariableLayout::plan(4, &bank, OneHotPolicy::Slack);
    let config = AssemblerConfig { fill_reward: 0.25, boundary_penalty: 7. };
    let qubo = PenaltyAssembler::with_config(&layout, &bank, config)
      .assemble()
      .unwrap();

    let occupancy = layout.occupancy_var(Pos::zero());
    expect_that!(qubo.coeff(occupancy, occupancy), eq(-0.25));

    // Down word at (0, 1): the cell above is its boundary neighbor.
    let word_var = layout.down_word_var(Pos { x: 0, y: 1 }, 0);
    let above = layout.occupancy_var(Pos::zero());
    expect_that!(qubo.coeff(word_var, above), eq(7.));
  }
}
