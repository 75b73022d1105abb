use core::fmt;
use std::{
  error::Error,
  fmt::{Display, Formatter},
};

#[derive(Debug)]
pub enum XWordError {
  Internal(String),
  Parse(String),
  /// The encoder and decoder disagree on the variable layout. Always a
  /// programming error, never recoverable.
  LayoutMismatch(String),
  Solver(String),
}

impl Display for XWordError {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    match self {
      XWordError::Internal(msg) => write!(f, "Internal error: {msg}"),
      XWordError::Parse(msg) => write!(f, "Parse error: {msg}"),
      XWordError::LayoutMismatch(msg) => write!(f, "Layout mismatch: {msg}"),
      XWordError::Solver(msg) => write!(f, "Solver error: {msg}"),
    }
  }
}

impl Error for XWordError {}

pub type XWordResult<T = ()> = Result<T, Box<dyn Error>>;
