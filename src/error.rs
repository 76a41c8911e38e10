//! Error type shared by instance construction, data loading and solver configuration.

use std::fmt;

/// Everything that can go wrong before a search starts.
///
/// Infeasible instances and exhausted search budgets are not errors: they are
/// ordinary outcomes reported through [`crate::exact::SolveResult`].
#[derive(Debug, Clone, PartialEq)]
pub enum SolverError {
    /// The instance has no depot row at all
    EmptyInstance,
    /// A vector does not have one entry per stop
    LengthMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },
    /// A travel-time row has the wrong number of columns
    NonSquareMatrix {
        row: usize,
        expected: usize,
        found: usize,
    },
    NegativeDuration {
        index: usize,
        value: f64,
    },
    NegativeTravelTime {
        from: usize,
        to: usize,
        value: f64,
    },
    /// NaN or infinity in an input vector
    NonFinite {
        what: &'static str,
        index: usize,
    },
    /// The depot must carry neither value nor visit duration
    DepotNotNeutral {
        value: f64,
        duration: f64,
    },
    InvalidTimeBudget(f64),
    InvalidNodeLimit,
    InvalidTimeLimit(f64),
    /// Travel speed must be strictly positive
    InvalidSpeed(f64),
    /// A required CSV column could not be found under any of its aliases
    MissingColumn(&'static str),
    Csv(String),
    Io(String),
}

impl fmt::Display for SolverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolverError::EmptyInstance => write!(f, "instance has no depot (zero stops)"),
            SolverError::LengthMismatch { what, expected, found } => write!(
                f,
                "{} has {} entries, expected {} (one per stop, depot included)",
                what, found, expected
            ),
            SolverError::NonSquareMatrix { row, expected, found } => write!(
                f,
                "travel-time matrix row {} has {} columns, expected {}",
                row, found, expected
            ),
            SolverError::NegativeDuration { index, value } => {
                write!(f, "visit duration of stop {} is negative ({})", index, value)
            }
            SolverError::NegativeTravelTime { from, to, value } => {
                write!(f, "travel time {} -> {} is negative ({})", from, to, value)
            }
            SolverError::NonFinite { what, index } => {
                write!(f, "{} at index {} is not a finite number", what, index)
            }
            SolverError::DepotNotNeutral { value, duration } => write!(
                f,
                "depot must have value 0 and visit duration 0 (got value {}, duration {})",
                value, duration
            ),
            SolverError::InvalidTimeBudget(b) => {
                write!(f, "time budget must be finite and >= 0 (got {})", b)
            }
            SolverError::InvalidNodeLimit => write!(f, "node limit must be at least 1"),
            SolverError::InvalidTimeLimit(t) => {
                write!(f, "time limit must be finite and >= 0 seconds (got {})", t)
            }
            SolverError::InvalidSpeed(s) => {
                write!(f, "travel speed must be finite and > 0 km/h (got {})", s)
            }
            SolverError::MissingColumn(c) => write!(
                f,
                "CSV must contain a '{}' column (or one of its accepted aliases)",
                c
            ),
            SolverError::Csv(e) => write!(f, "CSV error: {}", e),
            SolverError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for SolverError {}

impl From<csv::Error> for SolverError {
    fn from(e: csv::Error) -> Self {
        SolverError::Csv(e.to_string())
    }
}

impl From<std::io::Error> for SolverError {
    fn from(e: std::io::Error) -> Self {
        SolverError::Io(e.to_string())
    }
}
