#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

pub mod anneal;
pub mod decode;
pub mod layout;
pub mod qubo;
pub mod solver;
pub mod word_bank;
