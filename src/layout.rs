use util::pos::Pos;

use crate::word_bank::WordBank;

pub const LETTER_FLAGS: usize = 26;

/// How the per-direction word-flag groups are constrained.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OneHotPolicy {
  /// Exactly one word flag per direction must be active in every cell.
  Strict,
  /// An extra slack flag per direction joins each one-hot group,
  /// permitting cells that start no word. The default, since a strict
  /// one-hot over-constrains blank cells.
  #[default]
  Slack,
}

impl OneHotPolicy {
  fn slack_flags(self) -> usize {
    match self {
      OneHotPolicy::Strict => 0,
      OneHotPolicy::Slack => 2,
    }
  }
}

/// The variable layout for one grid size and word bank.
///
/// Every cell owns a contiguous block of binary-variable indices:
/// 1 occupancy flag, 26 letter flags, one flag per across-admissible
/// candidate, one flag per down-admissible candidate, then the slack
/// flags if [`OneHotPolicy::Slack`] is in effect. Blocks accumulate
/// row-major from index 0 and never overlap.
///
/// The assembler and the decoder must address variables through one
/// shared `VariableLayout` value; computing offsets twice is how the
/// two sides drift apart.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VariableLayout {
  size: usize,
  policy: OneHotPolicy,
  /// Row-major block start indices, `size * size` entries.
  offsets: Vec<usize>,
  /// `words_under[l]` for `l` in `0..=size`, copied from the bank.
  words_under: Vec<usize>,
  num_variables: usize,
}

impl VariableLayout {
  pub fn plan(size: usize, bank: &WordBank, policy: OneHotPolicy) -> Self {
    let words_under: Vec<_> = (0..=size).map(|length| bank.words_under(length)).collect();

    let mut offsets = Vec::with_capacity(size * size);
    let mut num_variables = 0;
    for row in 0..size {
      for col in 0..size {
        offsets.push(num_variables);
        num_variables += 1
          + LETTER_FLAGS
          + words_under[size - col]
          + words_under[size - row]
          + policy.slack_flags();
      }
    }

    Self { size, policy, offsets, words_under, num_variables }
  }

  pub fn size(&self) -> usize {
    self.size
  }

  pub fn policy(&self) -> OneHotPolicy {
    self.policy
  }

  pub fn num_variables(&self) -> usize {
    self.num_variables
  }

  pub fn in_bounds(&self, pos: Pos) -> bool {
    pos.x >= 0 && pos.x < self.size as i32 && pos.y >= 0 && pos.y < self.size as i32
  }

  /// All cells in block-layout (row-major) order.
  pub fn cells(&self) -> impl Iterator<Item = Pos> {
    let size = self.size as i32;
    (0..size).flat_map(move |y| (0..size).map(move |x| Pos { x, y }))
  }

  fn offset(&self, pos: Pos) -> usize {
    debug_assert!(self.in_bounds(pos));
    self.offsets[pos.x as usize + pos.y as usize * self.size]
  }

  pub fn block_size(&self, pos: Pos) -> usize {
    1
      + LETTER_FLAGS
      + self.across_count(pos)
      + self.down_count(pos)
      + self.policy.slack_flags()
  }

  /// Number of candidates short enough to start an across word at
  /// `pos` and still fit before the right edge.
  pub fn across_count(&self, pos: Pos) -> usize {
    debug_assert!(self.in_bounds(pos));
    self.words_under[self.size - pos.x as usize]
  }

  pub fn down_count(&self, pos: Pos) -> usize {
    debug_assert!(self.in_bounds(pos));
    self.words_under[self.size - pos.y as usize]
  }

  pub fn occupancy_var(&self, pos: Pos) -> usize {
    self.offset(pos)
  }

  pub fn letter_var(&self, pos: Pos, letter: usize) -> usize {
    debug_assert!(letter < LETTER_FLAGS);
    self.offset(pos) + 1 + letter
  }

  /// Variable for "candidate `index` starts across at `pos`", where
  /// `index` is the candidate's position in the bank's flattened list.
  pub fn across_word_var(&self, pos: Pos, index: usize) -> usize {
    debug_assert!(index < self.across_count(pos));
    self.offset(pos) + 1 + LETTER_FLAGS + index
  }

  pub fn down_word_var(&self, pos: Pos, index: usize) -> usize {
    debug_assert!(index < self.down_count(pos));
    self.offset(pos) + 1 + LETTER_FLAGS + self.across_count(pos) + index
  }

  pub fn across_slack_var(&self, pos: Pos) -> Option<usize> {
    matches!(self.policy, OneHotPolicy::Slack)
      .then(|| self.offset(pos) + 1 + LETTER_FLAGS + self.across_count(pos) + self.down_count(pos))
  }

  pub fn down_slack_var(&self, pos: Pos) -> Option<usize> {
    self.across_slack_var(pos).map(|var| var + 1)
  }
}
