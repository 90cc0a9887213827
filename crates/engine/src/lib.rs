// In crates/engine/src/lib.rs

pub mod scanner;
pub mod scheduler;

#[cfg(test)]
mod testing;

pub use scanner::{CustomEntry, Scanner, SignalHit};
