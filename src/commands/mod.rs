//! Command implementations
//!
//! The sweeper has a single operation: one pass over all private channels.

pub mod sweep;

pub use sweep::run as sweep_run;
