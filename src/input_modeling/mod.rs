//! The input modeling module provides a foundation for configurable
//! stochastic simulation behaviors.  The module includes a set of
//! interchangeable pseudo-random variate sources and a distribution table
//! structure, which maps cumulative probabilities to contiguous
//! random-digit assignment ranges and inverts random draws back into
//! sampled values.

pub mod distribution;
pub mod variate_source;

pub use self::distribution::{DigitRange, DistributionRow, DistributionTable};
pub use self::variate_source::{PreviewDraw, VariateDraw, VariateSource};
