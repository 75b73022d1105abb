use rand::{rngs::StdRng, Rng, SeedableRng};
use util::error::{XWordError, XWordResult};

use crate::{
  qubo::PenaltyMap,
  solver::{QuboSampler, Sample},
};

/// Single-flip Metropolis simulated annealing over a [`PenaltyMap`].
///
/// Each read restarts from a uniformly random assignment and sweeps
/// every variable once per step while the inverse temperature rises
/// geometrically from `beta_range.0` to `beta_range.1`. Flip deltas
/// come from the local field, so a sweep is linear in the number of
/// nonzero terms touching the flipped variables.
pub struct SimulatedAnnealer {
  sweeps: usize,
  beta_range: (f64, f64),
  rng: StdRng,
}

impl SimulatedAnnealer {
  pub fn new(sweeps: usize, seed: u64) -> Self {
    Self::with_beta_range(sweeps, (0.1, 10.), seed)
  }

  pub fn with_beta_range(sweeps: usize, beta_range: (f64, f64), seed: u64) -> Self {
    Self {
      sweeps: sweeps.max(1),
      beta_range,
      rng: StdRng::seed_from_u64(seed),
    }
  }

  fn beta(&self, sweep: usize) -> f64 {
    let (start, end) = self.beta_range;
    if self.sweeps <= 1 {
      return end;
    }
    start * (end / start).powf(sweep as f64 / (self.sweeps - 1) as f64)
  }
}

/// Energy change from flipping variable `i`.
fn flip_delta(i: usize, bits: &[bool], linear: &[f64], neighbors: &[Vec<(usize, f64)>]) -> f64 {
  let field = linear[i]
    + neighbors[i]
      .iter()
      .filter(|&&(j, _)| bits[j])
      .map(|&(_, coeff)| coeff)
      .sum::<f64>();
  if bits[i] {
    -field
  } else {
    field
  }
}

impl QuboSampler for SimulatedAnnealer {
  fn sample(&mut self, qubo: &PenaltyMap, num_reads: usize) -> XWordResult<Sample> {
    if num_reads == 0 {
      return Err(XWordError::Solver("num_reads must be positive".to_owned()).into());
    }

    let n = qubo.num_variables();
    let mut linear = vec![0.; n];
    let mut neighbors: Vec<Vec<(usize, f64)>> = vec![Vec::new(); n];
    for ((i, j), coeff) in qubo.terms() {
      if i == j {
        linear[i] += coeff;
      } else {
        neighbors[i].push((j, coeff));
        neighbors[j].push((i, coeff));
      }
    }

    let mut best: Option<Sample> = None;
    for _ in 0..num_reads {
      let mut bits: Vec<bool> = (0..n).map(|_| self.rng.random()).collect();
      for sweep in 0..self.sweeps {
        let beta = self.beta(sweep);
        for i in 0..n {
          let delta = flip_delta(i, &bits, &linear, &neighbors);
          if delta <= 0. || self.rng.random::<f64>() < (-beta * delta).exp() {
            bits[i] = !bits[i];
          }
        }
      }

      let energy = qubo.energy(&bits);
      if best.as_ref().is_none_or(|sample| energy < sample.energy) {
        best = Some(Sample { assignment: bits, energy });
      }
    }

    best.ok_or_else(|| XWordError::Solver("No sample produced".to_owned()).into())
  }
}
