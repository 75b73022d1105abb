use std::fmt::{self, Display, Formatter};

use bitcode::{Decode, Encode};
use util::{
  error::{XWordError, XWordResult},
  grid::Grid,
  pos::Pos,
};

use crate::{
  layout::{VariableLayout, LETTER_FLAGS},
  word_bank::WordBank,
};

/// The decoded crossword: per-cell letters plus the candidate word (if
/// any) starting across/down at each cell.
#[derive(Clone, Debug, PartialEq, Eq, Encode, Decode)]
pub struct Crossword {
  letters: Grid<Option<char>>,
  across_words: Grid<Option<String>>,
  down_words: Grid<Option<String>>,
}

impl Crossword {
  pub fn size(&self) -> u32 {
    self.letters.width()
  }

  pub fn letter(&self, pos: Pos) -> Option<char> {
    self.letters.get(pos).copied().flatten()
  }

  pub fn across_word(&self, pos: Pos) -> Option<&str> {
    self.across_words.get(pos).and_then(|word| word.as_deref())
  }

  pub fn down_word(&self, pos: Pos) -> Option<&str> {
    self.down_words.get(pos).and_then(|word| word.as_deref())
  }
}

impl Display for Crossword {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    (0..self.letters.height()).try_fold((), |_, y| {
      self
        .letters
        .iter_row(y)
        .try_fold((), |_, &letter| write!(f, "[{}] ", letter.unwrap_or('-')))?;
      writeln!(f)
    })
  }
}

/// Maps a solver assignment back to a [`Crossword`] through the same
/// layout the assembler used.
///
/// Deliberately lenient about the assignment's contents: the sampler
/// is heuristic, so a one-hot group may come back with zero or several
/// active flags. The first active flag wins and "none active" decodes
/// as blank; letters only show on cells whose occupancy flag is set.
/// Only a wrong-length assignment is an error, since that means the
/// encoder and decoder disagree on the layout.
pub fn decode_assignment(
  assignment: &[bool],
  layout: &VariableLayout,
  bank: &WordBank,
) -> XWordResult<Crossword> {
  if assignment.len() != layout.num_variables() {
    return Err(
      XWordError::LayoutMismatch(format!(
        "Assignment has {} variables, layout expects {}",
        assignment.len(),
        layout.num_variables()
      ))
      .into(),
    );
  }

  let size = layout.size() as u32;
  let mut letters = Grid::new(size, size);
  let mut across_words: Grid<Option<String>> = Grid::new(size, size);
  let mut down_words: Grid<Option<String>> = Grid::new(size, size);

  fn cell_mut<T>(grid: &mut Grid<Option<T>>, pos: Pos) -> XWordResult<&mut Option<T>> {
    grid
      .get_mut(pos)
      .ok_or_else(|| XWordError::Internal(format!("Position {pos} is out of bounds")).into())
  }

  for pos in layout.cells() {
    if assignment[layout.occupancy_var(pos)] {
      let letter = (0..LETTER_FLAGS)
        .find(|&letter| assignment[layout.letter_var(pos, letter)])
        .map(|letter| (b'a' + letter as u8) as char);
      *cell_mut(&mut letters, pos)? = letter;
    }

    let across = (0..layout.across_count(pos))
      .find(|&index| assignment[layout.across_word_var(pos, index)]);
    if let Some(index) = across {
      let word = bank
        .candidate(index)
        .ok_or_else(|| XWordError::Internal(format!("Unknown candidate index {index}")))?;
      *cell_mut(&mut across_words, pos)? = Some(word.to_owned());
    }

    let down = (0..layout.down_count(pos))
      .find(|&index| assignment[layout.down_word_var(pos, index)]);
    if let Some(index) = down {
      let word = bank
        .candidate(index)
        .ok_or_else(|| XWordError::Internal(format!("Unknown candidate index {index}")))?;
      *cell_mut(&mut down_words, pos)? = Some(word.to_owned());
    }
  }

  Ok(Crossword { letters, across_words, down_words })
}
