//! Distribution tables invert random draws into sampled values.  A table
//! is built from ordered `{value, probability}` rows; each row receives a
//! contiguous, non-overlapping random-digit assignment range over the
//! digit scale, and lookup scans those ranges to map a drawn digit back to
//! its row's value.  Over a fully built table the ranges partition
//! `{1, ..., scale}` with no gaps and no overlaps.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::utils::errors::SimulationError;
use crate::utils::format_digit;

/// Probability sums may exceed one by at most this tolerance, absorbing
/// the rounding error of hand-entered empirical tables.
const PROBABILITY_TOLERANCE: f64 = 0.0001;

/// One row of a distribution specification: a sampled value and its
/// probability.  Row order is significant - it defines the range
/// assignment order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionRow {
    pub value: f64,
    pub probability: f64,
}

/// A contiguous block of random digits assigned to one distribution row.
/// Bounds are 1-indexed and inclusive.  A `high` equal to the digit scale
/// displays as `0` but compares as the scale value; a zero-probability row
/// holds an empty range (`low > high`) which contains no digit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DigitRange {
    low: u32,
    high: u32,
}

impl DigitRange {
    pub fn low(&self) -> u32 {
        self.low
    }

    pub fn high(&self) -> u32 {
        self.high
    }

    /// The predicate expects an already-normalized digit - a raw draw of
    /// `0` must be read as the scale value before comparison.
    pub fn contains(&self, digit: u32) -> bool {
        self.low <= digit && digit <= self.high
    }

    /// This method renders the range for tabular display, with both bounds
    /// zero-padded to the scale width and a `high` equal to the scale
    /// wrapping to `0`.
    pub fn label(&self, scale: u32) -> String {
        format!(
            "{}-{}",
            format_digit(self.low, scale),
            format_digit(self.high, scale)
        )
    }
}

impl fmt::Display for DigitRange {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}-{}", self.low, self.high)
    }
}

/// The `DistributionTable` owns an ordered sequence of rows, the digit
/// scale, and the assignment ranges built from the cumulative
/// probabilities.  The final row's range is forced to end at the scale,
/// absorbing floating-point rounding slack so the digit partition is
/// exact and total.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionTable {
    rows: Vec<DistributionRow>,
    ranges: Vec<DigitRange>,
    scale: u32,
}

impl DistributionTable {
    /// This constructor method validates the rows and builds the
    /// random-digit assignment ranges.  Each probability must be within
    /// [0, 1], and the probability sum must not exceed one beyond the
    /// rounding tolerance.
    pub fn post(rows: Vec<DistributionRow>, scale: u32) -> Result<Self, SimulationError> {
        if rows.is_empty() {
            return Err(SimulationError::EmptyDistribution);
        }
        if scale == 0 {
            return Err(SimulationError::InvalidDigitScale);
        }
        if rows
            .iter()
            .any(|row| !(0.0..=1.0).contains(&row.probability))
        {
            return Err(SimulationError::InvalidProbability);
        }
        let total: f64 = rows.iter().map(|row| row.probability).sum();
        if total > 1.0 + PROBABILITY_TOLERANCE {
            return Err(SimulationError::ProbabilitySumOverflow);
        }
        let mut ranges = Vec::with_capacity(rows.len());
        let mut previous_cumulative = 0.0;
        let mut cumulative = 0.0;
        for (index, row) in rows.iter().enumerate() {
            cumulative += row.probability;
            let low = if index == 0 {
                1
            } else {
                round_to_scale(previous_cumulative, scale) + 1
            };
            let high = if index == rows.len() - 1 {
                scale
            } else {
                round_to_scale(cumulative, scale)
            };
            ranges.push(DigitRange { low, high });
            previous_cumulative = cumulative;
        }
        Ok(Self {
            rows,
            ranges,
            scale,
        })
    }

    /// Reverse lookup from a drawn digit to its row's value.  A digit of
    /// `0` is read as the scale value, so it matches only the final row.
    /// The final-row fallback is a defensive safety net - table
    /// construction guarantees total coverage, so it should never fire.
    pub fn lookup(&self, digit: u32) -> f64 {
        let normalized = if digit == 0 { self.scale } else { digit };
        match self
            .rows
            .iter()
            .zip(self.ranges.iter())
            .find(|(_, range)| range.contains(normalized))
        {
            Some((row, _)) => row.value,
            None => {
                warn![digit, "random digit matched no assignment range"];
                self.rows[self.rows.len() - 1].value
            }
        }
    }

    pub fn rows(&self) -> &[DistributionRow] {
        &self.rows
    }

    pub fn ranges(&self) -> &[DigitRange] {
        &self.ranges
    }

    pub fn scale(&self) -> u32 {
        self.scale
    }
}

fn round_to_scale(cumulative: f64, scale: u32) -> u32 {
    (cumulative * f64::from(scale)).round() as u32
}
