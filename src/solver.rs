use util::error::XWordResult;

use crate::qubo::PenaltyMap;

/// One candidate solution: a binary assignment over the layout's
/// variables and its objective value (lower is better).
#[derive(Clone, Debug, PartialEq)]
pub struct Sample {
  pub assignment: Vec<bool>,
  pub energy: f64,
}

/// The solver boundary. The core never depends on a concrete
/// minimizer, only on this contract: hand over the frozen coefficient
/// map, get back the best assignment found across `num_reads`
/// attempts. No retry semantics live here; a degenerate result is
/// returned as-is and the decoder tolerates it.
pub trait QuboSampler {
  fn sample(&mut self, qubo: &PenaltyMap, num_reads: usize) -> XWordResult<Sample>;
}
