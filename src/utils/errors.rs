use thiserror::Error;

/// `SimulationError` enumerates all possible errors returned by
/// queue-step-sim
#[derive(Error, Debug)]
pub enum SimulationError {
    /// Represents a linear congruential generator configured with a
    /// non-positive modulus
    #[error("The linear congruential modulus must be a positive integer")]
    InvalidModulus,

    /// Represents a mid-square generator seed outside the four-digit range
    #[error("The mid-square seed must be an integer between 1000 and 9999")]
    InvalidSeed,

    /// Represents a non-positive stopping limit in a simulation configuration
    #[error("The stopping limit must be a positive number")]
    InvalidStoppingLimit,

    /// Represents a distribution row probability outside [0, 1]
    #[error("A distribution probability must be within [0, 1]")]
    InvalidProbability,

    /// Represents distribution row probabilities summing to more than one
    #[error("The distribution probabilities must not sum to more than one")]
    ProbabilitySumOverflow,

    /// Represents a distribution specification with no rows
    #[error("A distribution must contain at least one row")]
    EmptyDistribution,

    /// Represents a digit scale of zero in a distribution table
    #[error("The digit scale must be a positive integer")]
    InvalidDigitScale,

    /// Represents a manual value supplied while no input is pending
    #[error("The simulation is not awaiting a manual value")]
    NotAwaitingInput,

    /// Represents a manual variate value outside [0, 1]
    #[error("A manual variate value must be within [0, 1]")]
    InvalidManualValue,

    /// Represents a batch execution starved of manual variate values
    #[error("The simulation is awaiting a manual value and cannot continue unattended")]
    AwaitingManualValue,

    /// Represents a failed conversion to num-traits Float
    #[error("Failed to convert to a Float value")]
    FloatConvError,

    /// Represents summary statistics requested over an empty customer log
    #[error("Output analysis requires at least one customer record")]
    EmptyRecordLog,

    /// Transparent serde_json errors
    #[error(transparent)]
    JsonError(#[from] serde_json::error::Error),
}
