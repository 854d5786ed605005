//! Variate sources drive all stochastic behaviors during simulation
//! execution.  The three interchangeable strategies are wrapped in the
//! `VariateSource` enum: externally-supplied manual values, a linear
//! congruential generator, and a mid-square generator.  The generator
//! variants are pure functions of their own state and never suspend; the
//! manual variant signals `NeedsInput` when its queue is exhausted, so
//! that a caller can supply one value and resume.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::utils::errors::SimulationError;

const MID_SQUARE_SPACE: u64 = 10_000;

/// The product of a single `next` call.  `NeedsInput` is a control signal,
/// not an error - it means the manual value queue is exhausted, and the
/// caller must supply one value before drawing again.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VariateDraw {
    Value(f64),
    NeedsInput,
}

/// One row of a table-preview replay: the draw index, the raw generator
/// state emitted at that index (the linear congruential `z` or the
/// mid-square seed), and the normalized value in [0, 1).  Raw values are
/// absent for the manual strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewDraw {
    pub index: usize,
    pub raw: Option<u64>,
    pub value: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VariateSource {
    Manual {
        values: VecDeque<f64>,
    },
    Lcg {
        multiplier: u64,
        increment: u64,
        modulus: u64,
        state: u64,
    },
    MidSquare {
        seed: u32,
        state: u32,
        draws: u64,
    },
}

impl VariateSource {
    /// This constructor method creates a manual variate source from a
    /// sequence of pre-supplied values, each within [0, 1].
    pub fn manual(values: Vec<f64>) -> Result<Self, SimulationError> {
        if values.iter().any(|value| !(0.0..=1.0).contains(value)) {
            return Err(SimulationError::InvalidManualValue);
        }
        Ok(Self::Manual {
            values: values.into(),
        })
    }

    /// This constructor method creates a linear congruential variate
    /// source, with the recurrence `z = (multiplier * z + increment) mod
    /// modulus`.  The modulus must be a positive integer.
    pub fn lcg(
        multiplier: u64,
        increment: u64,
        modulus: u64,
        seed: u64,
    ) -> Result<Self, SimulationError> {
        if modulus == 0 {
            return Err(SimulationError::InvalidModulus);
        }
        Ok(Self::Lcg {
            multiplier,
            increment,
            modulus,
            state: seed % modulus,
        })
    }

    /// This constructor method creates a mid-square variate source from a
    /// four-digit seed, between 1000 and 9999.
    pub fn mid_square(seed: u32) -> Result<Self, SimulationError> {
        if !(1000..=9999).contains(&seed) {
            return Err(SimulationError::InvalidSeed);
        }
        Ok(Self::MidSquare {
            seed,
            state: seed,
            draws: 0,
        })
    }

    /// The generation of variates drives stochastic behaviors during
    /// simulation execution.  Each call produces a normalized value in
    /// [0, 1], or the `NeedsInput` control signal when the manual queue is
    /// exhausted.
    pub fn next(&mut self) -> VariateDraw {
        match self.produce() {
            Some((_, value)) => VariateDraw::Value(value),
            None => VariateDraw::NeedsInput,
        }
    }

    /// The table-preview mode replays the production recurrence against a
    /// cloned state, so previewed raw and normalized values agree
    /// bit-for-bit with production draws at the same indices.  The manual
    /// strategy previews its queued values as-is.
    pub fn preview(&self, count: usize) -> Vec<PreviewDraw> {
        let mut replica = self.clone();
        (0..count)
            .filter_map(|index| {
                replica
                    .produce()
                    .map(|(raw, value)| PreviewDraw { index, raw, value })
            })
            .collect()
    }

    /// This method appends one externally-supplied value to a manual
    /// variate source, for use by the next draw.
    pub fn supply(&mut self, value: f64) -> Result<(), SimulationError> {
        if !(0.0..=1.0).contains(&value) {
            return Err(SimulationError::InvalidManualValue);
        }
        match self {
            Self::Manual { values } => {
                values.push_back(value);
                Ok(())
            }
            _ => Err(SimulationError::NotAwaitingInput),
        }
    }

    /// The conversion of a normalized value to a random digit, for
    /// distribution table lookup.  A digit of `0` is a valid draw - the
    /// distribution table reads it as the wrap value (the scale itself).
    pub fn to_digit(value: f64, scale: u32) -> u32 {
        let scaled = (value * f64::from(scale)).floor() as u32;
        scaled.min(scale)
    }

    fn produce(&mut self) -> Option<(Option<u64>, f64)> {
        match self {
            Self::Manual { values } => values.pop_front().map(|value| (None, value)),
            Self::Lcg {
                multiplier,
                increment,
                modulus,
                state,
            } => {
                let next = ((u128::from(*multiplier) * u128::from(*state)
                    + u128::from(*increment))
                    % u128::from(*modulus)) as u64;
                *state = next;
                Some((Some(next), next as f64 / *modulus as f64))
            }
            Self::MidSquare { seed, state, draws } => {
                let next = mid_square_step(*seed, *state, *draws);
                *state = next;
                *draws += 1;
                Some((Some(u64::from(next)), f64::from(next) / MID_SQUARE_SPACE as f64))
            }
        }
    }
}

/// One mid-square transition: square the current state, zero-pad the
/// square to eight digits, and extract the middle four digits as the next
/// state.  All-zero middle digits trigger the deterministic fallback
/// `(seed + draw index) mod 10000`, promoted to `1` if that is itself `0`,
/// so the generator never emits `0` and never locks into the zero cycle.
fn mid_square_step(seed: u32, state: u32, draw_index: u64) -> u32 {
    let square = u64::from(state) * u64::from(state);
    let middle = ((square / 100) % MID_SQUARE_SPACE) as u32;
    if middle != 0 {
        middle
    } else {
        let fallback = ((u64::from(seed) + draw_index) % MID_SQUARE_SPACE) as u32;
        if fallback == 0 {
            1
        } else {
            fallback
        }
    }
}
