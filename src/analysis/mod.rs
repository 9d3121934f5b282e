//! Analysis of dispatch results.

pub mod aggregator;

pub use aggregator::*;
