//! Error type shared by every engine operation

use crate::matrix::Shape;
use std::fmt;

/// Malformed numeric token or malformed matrix text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// 1-indexed row (or constant position) the failure was found in
    pub row: Option<usize>,
    /// The offending token, if a single token is to blame
    pub token: Option<String>,
    pub reason: String,
}

impl ParseError {
    pub fn new(reason: impl Into<String>) -> Self {
        ParseError {
            row: None,
            token: None,
            reason: reason.into(),
        }
    }

    pub fn token(token: &str, reason: impl Into<String>) -> Self {
        ParseError {
            row: None,
            token: Some(token.to_string()),
            reason: reason.into(),
        }
    }

    /// Attach the row the error occurred in
    pub fn at_row(mut self, row: usize) -> Self {
        self.row = Some(row);
        self
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.row, &self.token) {
            (Some(row), Some(token)) => write!(f, "row {} element '{}': {}", row, token, self.reason),
            (Some(row), None) => write!(f, "row {}: {}", row, self.reason),
            (None, Some(token)) => write!(f, "'{}': {}", token, self.reason),
            (None, None) => write!(f, "{}", self.reason),
        }
    }
}

impl std::error::Error for ParseError {}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MatrixError {
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("{operation} needs compatible dimensions, got {left} and {right}")]
    DimensionMismatch {
        operation: &'static str,
        left: Shape,
        right: Shape,
    },

    #[error("{operation} is defined only for square matrices, got {shape}")]
    NotSquare {
        operation: &'static str,
        shape: Shape,
    },

    #[error("matrix is singular: {reason}")]
    SingularMatrix { reason: String },

    #[error("row {index} is out of range, expected 1..={rows}")]
    InvalidRowIndex { index: usize, rows: usize },

    #[error("scalar cannot be zero for this operation (would zero out the row)")]
    ZeroScalarDisallowed,

    #[error("division by zero")]
    DivisionByZero,

    #[error("no interactive session is active")]
    NoActiveSession,

    #[error("rank analysis failed: rank(A) = {rank_a} exceeds rank(A|b) = {rank_augmented}")]
    RankAnalysis { rank_a: usize, rank_augmented: usize },
}

pub type Result<T> = std::result::Result<T, MatrixError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_messages() {
        let err = ParseError::token("x", "not a number").at_row(2);
        assert_eq!(err.to_string(), "row 2 element 'x': not a number");

        let err = ParseError::new("no data entered");
        assert_eq!(err.to_string(), "no data entered");
    }

    #[test]
    fn test_dimension_mismatch_names_both_shapes() {
        let err = MatrixError::DimensionMismatch {
            operation: "addition",
            left: Shape { rows: 2, cols: 3 },
            right: Shape { rows: 3, cols: 2 },
        };
        assert_eq!(
            err.to_string(),
            "addition needs compatible dimensions, got 2x3 and 3x2"
        );
    }
}
