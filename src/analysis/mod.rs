//! Analysis modules.
//!
//! Pure computations over fetched card lists.

pub mod aggregator;

pub use aggregator::*;
