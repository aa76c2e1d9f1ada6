//! Elementary row operations
//!
//! Single-step primitives over 1-indexed row references. Each takes a
//! matrix snapshot and returns a new matrix; the input is never modified.
//! The in-place helpers at the bottom are shared with the row-reduction
//! algorithms.

use crate::error::{MatrixError, Result};
use crate::matrix::Matrix;
use crate::rational::Rational;
use crate::trace::StepTrace;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One elementary row operation, with 1-indexed rows
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum RowOperation {
    /// `R1 <-> R2`
    Swap { first: usize, second: usize },
    /// `R <- k * R`, k non-zero
    Scale { row: usize, scalar: Rational },
    /// `Rt <- Rt + k * Rs`
    #[serde(rename_all = "camelCase")]
    AddScaled {
        target: usize,
        source: usize,
        scalar: Rational,
    },
    /// `Rt <- k1 * Ri + k2 * Rj`
    #[serde(rename_all = "camelCase")]
    Combine {
        target: usize,
        first: usize,
        first_scalar: Rational,
        second: usize,
        second_scalar: Rational,
    },
}

impl RowOperation {
    /// Run the primitive this operation names against `matrix`
    pub fn apply(&self, matrix: &Matrix, trace: &mut StepTrace) -> Result<Matrix> {
        match self {
            RowOperation::Swap { first, second } => swap_rows(matrix, *first, *second, trace),
            RowOperation::Scale { row, scalar } => scale_row(matrix, *row, scalar, trace),
            RowOperation::AddScaled {
                target,
                source,
                scalar,
            } => add_scaled_row(matrix, *target, *source, scalar, trace),
            RowOperation::Combine {
                target,
                first,
                first_scalar,
                second,
                second_scalar,
            } => replace_with_combination(
                matrix,
                *target,
                *first,
                first_scalar,
                *second,
                second_scalar,
                trace,
            ),
        }
    }
}

impl fmt::Display for RowOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowOperation::Swap { first, second } => write!(f, "R{} ↔ R{}", first, second),
            RowOperation::Scale { row, scalar } => write!(f, "R{} ← ({}) * R{}", row, scalar, row),
            RowOperation::AddScaled {
                target,
                source,
                scalar,
            } => write!(f, "R{} ← R{} + ({}) * R{}", target, target, scalar, source),
            RowOperation::Combine {
                target,
                first,
                first_scalar,
                second,
                second_scalar,
            } => write!(
                f,
                "R{} ← ({}) * R{} + ({}) * R{}",
                target, first_scalar, first, second_scalar, second
            ),
        }
    }
}

/// Validate a 1-indexed row reference, returning the 0-based index
fn check_row(index: usize, matrix: &Matrix) -> Result<usize> {
    if index == 0 || index > matrix.rows() {
        return Err(MatrixError::InvalidRowIndex {
            index,
            rows: matrix.rows(),
        });
    }
    Ok(index - 1)
}

fn begin(op: &RowOperation, matrix: &Matrix, trace: &mut StepTrace) {
    debug!("row operation {} on {}", op, matrix.shape());
    trace.push("");
    trace.push("--- Performing Elementary Row Operation ---");
    trace.matrix("Starting Matrix:", matrix);
}

fn finish(op: &RowOperation, rows: Vec<Vec<Rational>>, trace: &mut StepTrace) -> Matrix {
    let result = Matrix::from_rows_unchecked(rows);
    trace.matrix(&format!("Matrix after {}:", op), &result);
    result
}

pub fn swap_rows(matrix: &Matrix, first: usize, second: usize, trace: &mut StepTrace) -> Result<Matrix> {
    let op = RowOperation::Swap { first, second };
    begin(&op, matrix, trace);
    let a = check_row(first, matrix).map_err(|e| trace.fail(e))?;
    let b = check_row(second, matrix).map_err(|e| trace.fail(e))?;

    trace.push(format!("Performing: {}", op));
    let mut rows = matrix.to_rows();
    rows.swap(a, b);
    Ok(finish(&op, rows, trace))
}

/// Fails with `ZeroScalarDisallowed` for a zero scalar
pub fn scale_row(matrix: &Matrix, row: usize, scalar: &Rational, trace: &mut StepTrace) -> Result<Matrix> {
    let op = RowOperation::Scale {
        row,
        scalar: scalar.clone(),
    };
    begin(&op, matrix, trace);
    let r = check_row(row, matrix).map_err(|e| trace.fail(e))?;
    if scalar.is_zero() {
        return Err(trace.fail(MatrixError::ZeroScalarDisallowed));
    }

    trace.push(format!("Performing: {}", op));
    let mut rows = matrix.to_rows();
    scale_in_place(&mut rows[r], scalar);
    Ok(finish(&op, rows, trace))
}

/// `target <- target + scalar * source`. A row added to itself is allowed
/// but noted in the trace.
pub fn add_scaled_row(
    matrix: &Matrix,
    target: usize,
    source: usize,
    scalar: &Rational,
    trace: &mut StepTrace,
) -> Result<Matrix> {
    let op = RowOperation::AddScaled {
        target,
        source,
        scalar: scalar.clone(),
    };
    begin(&op, matrix, trace);
    let t = check_row(target, matrix).map_err(|e| trace.fail(e))?;
    let s = check_row(source, matrix).map_err(|e| trace.fail(e))?;

    if t == s && !scalar.is_zero() {
        warn!("adding a multiple of R{} to itself", target);
        trace.push(format!(
            "Note: adding a multiple of R{} to itself scales the row by {}; proceeding anyway.",
            target,
            &Rational::one() + scalar
        ));
    }

    trace.push(format!("Performing: {}", op));
    let mut rows = matrix.to_rows();
    add_scaled_in_place(&mut rows, t, s, scalar);
    Ok(finish(&op, rows, trace))
}

/// `target <- first_scalar * first + second_scalar * second`. Two zero
/// scalars are allowed and produce a zero row; this is noted in the trace.
pub fn replace_with_combination(
    matrix: &Matrix,
    target: usize,
    first: usize,
    first_scalar: &Rational,
    second: usize,
    second_scalar: &Rational,
    trace: &mut StepTrace,
) -> Result<Matrix> {
    let op = RowOperation::Combine {
        target,
        first,
        first_scalar: first_scalar.clone(),
        second,
        second_scalar: second_scalar.clone(),
    };
    begin(&op, matrix, trace);
    let t = check_row(target, matrix).map_err(|e| trace.fail(e))?;
    let i = check_row(first, matrix).map_err(|e| trace.fail(e))?;
    let j = check_row(second, matrix).map_err(|e| trace.fail(e))?;

    if first_scalar.is_zero() && second_scalar.is_zero() {
        warn!("both scalars are zero, R{} becomes a zero row", target);
        trace.push(format!(
            "Note: both scalars are zero, so R{} becomes a row of zeros.",
            target
        ));
    }

    trace.push(format!("Performing: {}", op));
    let mut rows = matrix.to_rows();
    let combined: Vec<Rational> = rows[i]
        .iter()
        .zip(&rows[j])
        .map(|(x, y)| &(first_scalar * x) + &(second_scalar * y))
        .collect();
    rows[t] = combined;
    Ok(finish(&op, rows, trace))
}

pub(crate) fn scale_in_place(row: &mut [Rational], scalar: &Rational) {
    for value in row.iter_mut() {
        *value = &*value * scalar;
    }
}

/// `rows[target] += scalar * rows[source]`; `target` may equal `source`
pub(crate) fn add_scaled_in_place(
    rows: &mut [Vec<Rational>],
    target: usize,
    source: usize,
    scalar: &Rational,
) {
    let source_row = rows[source].clone();
    for (value, s) in rows[target].iter_mut().zip(&source_row) {
        *value = &*value + &(scalar * s);
    }
}
