//! # Overview
//! Queue-step-sim provides a stepwise, resumable queueing simulation
//! engine, driven by pseudo-random digit streams and empirical
//! probability distributions.
//!
//! This crate contains:
//!
//! * A variate source framework, with interchangeable manual,
//! linear-congruential, and mid-square generation strategies.
//! * A distribution table abstraction, mapping cumulative probabilities
//! to contiguous random-digit assignment ranges with reverse lookup.
//! * A two-server pool, with a deterministic assignment policy.
//! * A customer-by-customer simulation stepper, which suspends when a
//! manual variate must be supplied externally and resumes without
//! re-consuming any variate.
//! * Output analysis helpers, for computing aggregate queueing metrics
//! from the per-customer record log.
pub mod input_modeling;
pub mod output_analysis;
pub mod simulator;
pub mod utils;
