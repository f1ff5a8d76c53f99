//! Dispatch runner: executes a resolved handler sequence as a
//! continuation chain.

pub mod runner;

pub use runner::{DispatchHandle, RunPhase, run};
