//! Error types for the join engine.

use std::io;

use thiserror::Error;

use crate::heap::HeapError;

/// Result type alias for join operations.
pub type JoinResult<T> = Result<T, JoinError>;

/// Errors that can occur while loading data or running a join.
#[derive(Debug, Error)]
pub enum JoinError {
    /// A configuration value is out of range (e.g., a non-positive radius).
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Invalid dimension (e.g., zero).
    #[error("invalid dimension: expected at least {expected}, got {actual}")]
    InvalidDimension {
        /// The minimum expected dimension.
        expected: usize,
        /// The actual dimension.
        actual: usize,
    },

    /// Dimension mismatch between rows, or between a query and the dataset.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// The expected dimension.
        expected: usize,
        /// The actual dimension.
        actual: usize,
    },

    /// The dataset header could not be parsed.
    #[error("invalid dataset header: {0}")]
    InvalidHeader(String),

    /// The dataset body ended before `n * d` values were read.
    #[error("dataset truncated: expected {expected} values, read {read}")]
    Truncated {
        /// Number of `f32` values the header promised.
        expected: u64,
        /// Number of `f32` values actually read.
        read: u64,
    },

    /// Invalid value in the dataset (NaN, Infinity).
    #[error("invalid value at row {row}, column {column}: {value}")]
    InvalidValue {
        /// Row of the invalid value.
        row: usize,
        /// Column of the invalid value.
        column: usize,
        /// The invalid value.
        value: f32,
    },

    /// The probe index returned a point id outside `0..n`.
    ///
    /// The index collaborator is trusted but validated; this aborts the join.
    #[error("index contract violation: probe of point {query} returned id {id}, dataset has {len} points")]
    IndexContract {
        /// The point whose probe produced the bad id.
        query: usize,
        /// The out-of-range id.
        id: u32,
        /// Number of points in the dataset.
        len: usize,
    },

    /// Priority queue misuse. Indicates a broken selection invariant.
    #[error("internal heap error: {0}")]
    Heap(#[from] HeapError),

    /// The verification thread pool could not be created.
    #[error("thread pool error: {0}")]
    ThreadPool(String),

    /// I/O error while reading or writing a dataset.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl JoinError {
    /// Returns true if this error was caused by caller-supplied input.
    pub const fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidConfig(_)
                | Self::InvalidDimension { .. }
                | Self::DimensionMismatch { .. }
                | Self::InvalidHeader(_)
                | Self::Truncated { .. }
                | Self::InvalidValue { .. }
        )
    }

    /// Returns true if this error indicates a bug rather than bad input.
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::IndexContract { .. } | Self::Heap(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_errors_are_classified() {
        let err = JoinError::InvalidConfig("radius must be positive".into());
        assert!(err.is_config_error());
        assert!(!err.is_internal());

        let err = JoinError::Truncated { expected: 10, read: 3 };
        assert!(err.is_config_error());
    }

    #[test]
    fn test_internal_errors_are_classified() {
        let err = JoinError::Heap(HeapError::KeyNotFound);
        assert!(err.is_internal());
        assert!(!err.is_config_error());

        let err = JoinError::IndexContract { query: 1, id: 99, len: 4 };
        assert!(err.is_internal());
    }

    #[test]
    fn test_index_contract_display() {
        let err = JoinError::IndexContract { query: 2, id: 17, len: 5 };
        let msg = err.to_string();
        assert!(msg.contains("point 2"));
        assert!(msg.contains("id 17"));
    }

    #[test]
    fn test_io_error_converts() {
        let io = io::Error::new(io::ErrorKind::NotFound, "missing");
        let err: JoinError = io.into();
        assert!(matches!(err, JoinError::Io(_)));
        assert!(!err.is_config_error());
    }
}
