#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::{
  fs::{self, File},
  io::Write,
  path::PathBuf,
};

use clap::Parser;
use util::{bitcode, error::XWordResult, pos::Pos, time::time_fn};
use xword_qubo::{
  anneal::SimulatedAnnealer,
  decode::{decode_assignment, Crossword},
  layout::{OneHotPolicy, VariableLayout},
  qubo::PenaltyAssembler,
  solver::QuboSampler,
  word_bank::WordBank,
};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
  /// Word list, one word per line.
  words: PathBuf,

  /// Crossword width and height.
  #[arg(long, default_value_t = 6)]
  size: usize,

  /// Cap on the number of bank words considered.
  #[arg(long)]
  word_limit: Option<usize>,

  /// Annealing restarts; the best result is kept.
  #[arg(long, default_value_t = 1)]
  num_reads: usize,

  /// Annealing sweeps per read.
  #[arg(long, default_value_t = 2000)]
  sweeps: usize,

  /// RNG seed. Random when omitted.
  #[arg(long)]
  seed: Option<u64>,

  /// Force exactly one word per cell and direction instead of
  /// permitting empty cells via slack flags.
  #[arg(long)]
  strict: bool,

  /// Save the decoded crossword to this file.
  #[arg(long)]
  output: Option<PathBuf>,
}

fn read_word_bank(args: &Args) -> XWordResult<WordBank> {
  let words = fs::read_to_string(&args.words)?
    .lines()
    .map(|line| line.trim().to_ascii_lowercase())
    .filter(|word| !word.is_empty() && word.chars().all(|letter| letter.is_ascii_alphabetic()))
    .collect::<Vec<_>>();
  Ok(WordBank::with_limit(words, args.size, args.word_limit))
}

fn print_word_table<'a>(label: &str, size: i32, lookup: impl Fn(Pos) -> Option<&'a str>) {
  println!("{label}:");
  for y in 0..size {
    for x in 0..size {
      let word = lookup(Pos { x, y }).unwrap_or("");
      print!("[{word:8}] ");
    }
    println!();
  }
}

fn print_word_tables(crossword: &Crossword) {
  let size = crossword.size() as i32;
  print_word_table("Across", size, |pos| crossword.across_word(pos));
  print_word_table("Down", size, |pos| crossword.down_word(pos));
}

fn main() -> XWordResult {
  let args = Args::parse();

  let bank = read_word_bank(&args)?;
  let policy = if args.strict {
    OneHotPolicy::Strict
  } else {
    OneHotPolicy::Slack
  };
  let layout = VariableLayout::plan(args.size, &bank, policy);
  let qubo = PenaltyAssembler::new(&layout, &bank).assemble()?;
  println!(
    "{} candidate words, {} variables, {} nonzero terms",
    bank.len(),
    layout.num_variables(),
    qubo.num_terms()
  );

  let seed = args.seed.unwrap_or_else(rand::random);
  let mut sampler = SimulatedAnnealer::new(args.sweeps, seed);
  let (elapsed, sample) = time_fn(|| sampler.sample(&qubo, args.num_reads));
  let sample = sample?;
  println!(
    "Best energy {:.2} after {} reads in {:.2}s (seed {seed})",
    sample.energy,
    args.num_reads,
    elapsed.as_secs_f32()
  );

  let crossword = decode_assignment(&sample.assignment, &layout, &bank)?;
  print!("{crossword}");
  print_word_tables(&crossword);

  if let Some(path) = &args.output {
    let mut file = File::create(path)?;
    file.write_all(&bitcode::encode(&crossword))?;
  }

  Ok(())
}
