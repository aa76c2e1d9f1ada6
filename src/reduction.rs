//! Row reduction: echelon forms, rank, inverse by elementary operations
//! and the normal form.
//!
//! The echelon pass normalizes every pivot to 1 and clears the pivot
//! column in all other rows, so its output is already close to RREF.
//! The RREF pass then clears above each pivot from the bottom up.

use crate::ero::{add_scaled_in_place, scale_in_place};
use crate::error::{MatrixError, Result};
use crate::matrix::Matrix;
use crate::rational::Rational;
use crate::trace::StepTrace;
use log::{debug, trace as log_trace};
use serde::{Deserialize, Serialize};

/// Location of a pivot, 0-based
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Pivot {
    pub row: usize,
    pub col: usize,
}

/// RREF together with its rank
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reduced {
    pub matrix: Matrix,
    pub rank: usize,
}

/// RREF, rank and the canonical `[I_r 0; 0 0]` block of matching shape
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalForm {
    pub rref: Matrix,
    pub rank: usize,
    pub canonical: Matrix,
}

/// Bring `rows` to echelon form in place, returning the pivots found.
///
/// Scans for a pivot column by column. A column with no non-zero entry at
/// or below the current row is skipped without advancing the row.
pub(crate) fn echelon_in_place(rows: &mut [Vec<Rational>], trace: &mut StepTrace) -> Result<Vec<Pivot>> {
    let height = rows.len();
    let width = rows.first().map_or(0, Vec::len);
    let mut pivots = Vec::new();
    let (mut row, mut col) = (0, 0);

    while row < height && col < width {
        let found = (row..height).find(|&r| !rows[r][col].is_zero());
        let Some(pivot_row) = found else {
            trace.push(format!(
                "Column {} has no non-zero entry at or below row {}; moving to the next column.",
                col + 1,
                row + 1
            ));
            col += 1;
            continue;
        };
        log_trace!("pivot at ({}, {})", pivot_row, col);
        trace.push("");
        trace.push(format!("Pivot search for row {}, column {}:", row + 1, col + 1));

        if pivot_row != row {
            rows.swap(row, pivot_row);
            trace.push(format!(
                "  Swap R{} ↔ R{} to bring a non-zero pivot into position.",
                row + 1,
                pivot_row + 1
            ));
            trace_rows(trace, rows);
        }

        let pivot = rows[row][col].clone();
        if !pivot.is_one() {
            let factor = pivot.recip()?;
            scale_in_place(&mut rows[row], &factor);
            trace.push(format!(
                "  Normalize the pivot: R{} ← ({}) * R{}",
                row + 1,
                factor,
                row + 1
            ));
            trace_rows(trace, rows);
        }

        for other in 0..height {
            if other == row || rows[other][col].is_zero() {
                continue;
            }
            let factor = -rows[other][col].clone();
            add_scaled_in_place(rows, other, row, &factor);
            trace.push(format!(
                "  Eliminate: R{} ← R{} + ({}) * R{}",
                other + 1,
                other + 1,
                factor,
                row + 1
            ));
            trace_rows(trace, rows);
        }

        pivots.push(Pivot { row, col });
        row += 1;
        col += 1;
    }
    Ok(pivots)
}

/// Leading-one pivots of an echelon form: a row's first non-zero entry
/// that is 1 with only zeros beneath it.
pub(crate) fn leading_ones(rows: &[Vec<Rational>]) -> Vec<Pivot> {
    rows.iter()
        .enumerate()
        .filter_map(|(r, values)| {
            let col = values.iter().position(|v| !v.is_zero())?;
            let clear_below = rows[r + 1..].iter().all(|below| below[col].is_zero());
            (values[col].is_one() && clear_below).then_some(Pivot { row: r, col })
        })
        .collect()
}

/// Clear the entries above each pivot, last pivot first
pub(crate) fn eliminate_above(rows: &mut [Vec<Rational>], pivots: &[Pivot], trace: &mut StepTrace) {
    for pivot in pivots.iter().rev() {
        for above in (0..pivot.row).rev() {
            if rows[above][pivot.col].is_zero() {
                continue;
            }
            let factor = -rows[above][pivot.col].clone();
            add_scaled_in_place(rows, above, pivot.row, &factor);
            trace.push(format!(
                "  Eliminate above pivot: R{} ← R{} + ({}) * R{}",
                above + 1,
                above + 1,
                factor,
                pivot.row + 1
            ));
            trace_rows(trace, rows);
        }
    }
}

pub(crate) fn count_non_zero_rows(rows: &[Vec<Rational>]) -> usize {
    rows.iter()
        .filter(|row| row.iter().any(|v| !v.is_zero()))
        .count()
}

fn trace_rows(trace: &mut StepTrace, rows: &[Vec<Rational>]) {
    trace.matrix("", &Matrix::from_rows_unchecked(rows.to_vec()));
}

/// Row echelon form with unit pivots
pub fn row_echelon_form(matrix: &Matrix, trace: &mut StepTrace) -> Result<Matrix> {
    debug!("row echelon form of {}", matrix.shape());
    trace.push("--- Row Echelon Form (REF) Calculation ---");
    trace.matrix("Original Matrix:", matrix);

    let mut rows = matrix.to_rows();
    echelon_in_place(&mut rows, trace)?;
    let result = Matrix::from_rows_unchecked(rows);
    trace.matrix("Row Echelon Form (REF):", &result);
    Ok(result)
}

pub fn rref_and_rank(matrix: &Matrix, trace: &mut StepTrace) -> Result<Reduced> {
    debug!("rref of {}", matrix.shape());
    trace.push("--- Row-Reduced Echelon Form (RREF) Calculation ---");
    trace.matrix("Original Matrix:", matrix);
    trace.push("");
    trace.push("Phase 1: reduce to row echelon form.");

    let mut rows = matrix.to_rows();
    echelon_in_place(&mut rows, trace)?;
    trace.matrix("Row Echelon Form (REF):", &Matrix::from_rows_unchecked(rows.clone()));

    trace.push("");
    trace.push("Phase 2: clear the entries above each pivot, bottom to top.");
    let pivots = leading_ones(&rows);
    for pivot in &pivots {
        trace.push(format!(
            "  Pivot found at R{}, C{}",
            pivot.row + 1,
            pivot.col + 1
        ));
    }
    eliminate_above(&mut rows, &pivots, trace);

    let rank = count_non_zero_rows(&rows);
    let result = Matrix::from_rows_unchecked(rows);
    trace.matrix("Row-Reduced Echelon Form (RREF):", &result);
    trace.push("");
    trace.push(format!("Rank of the matrix: {}", rank));
    Ok(Reduced {
        matrix: result,
        rank,
    })
}

/// Number of non-zero rows of the echelon form
pub fn rank(matrix: &Matrix, trace: &mut StepTrace) -> Result<usize> {
    debug!("rank of {}", matrix.shape());
    trace.push("--- Rank Calculation ---");
    trace.push("The rank is the number of non-zero rows in the row echelon form.");
    let mut rows = matrix.to_rows();
    echelon_in_place(&mut rows, trace)?;
    let rank = count_non_zero_rows(&rows);
    trace.matrix("Row Echelon Form (REF):", &Matrix::from_rows_unchecked(rows));
    trace.push("");
    trace.push(format!("Rank of the matrix: {}", rank));
    Ok(rank)
}

/// Gauss-Jordan on `[A | I]`. Fails with `SingularMatrix` as soon as a
/// column has no pivot.
pub fn inverse_by_row_reduction(matrix: &Matrix, trace: &mut StepTrace) -> Result<Matrix> {
    debug!("inverse (row reduction) of {}", matrix.shape());
    trace.push("--- Inverse Matrix Operation (Elementary Row Operations) ---");
    matrix
        .require_square("inverse")
        .map_err(|e| trace.fail(e))?;

    let n = matrix.rows();
    let identity = Matrix::identity(n);
    let mut rows: Vec<Vec<Rational>> = matrix
        .row_iter()
        .zip(identity.row_iter())
        .map(|(left, right)| left.iter().chain(right).cloned().collect())
        .collect();
    trace.matrix("Augmented Matrix [A | I]:", &Matrix::from_rows_unchecked(rows.clone()));

    for col in 0..n {
        let Some(pivot_row) = (col..n).find(|&r| !rows[r][col].is_zero()) else {
            let err = MatrixError::SingularMatrix {
                reason: format!("no pivot found in column {}", col + 1),
            };
            return Err(trace.fail(err));
        };
        trace.push("");
        trace.push(format!("Column {}:", col + 1));

        if pivot_row != col {
            rows.swap(col, pivot_row);
            trace.push(format!("  Swap R{} ↔ R{}", col + 1, pivot_row + 1));
        }

        let pivot = rows[col][col].clone();
        if !pivot.is_one() {
            let factor = pivot.recip()?;
            scale_in_place(&mut rows[col], &factor);
            trace.push(format!(
                "  Normalize the pivot: R{} ← ({}) * R{}",
                col + 1,
                factor,
                col + 1
            ));
        }

        for other in 0..n {
            if other == col || rows[other][col].is_zero() {
                continue;
            }
            let factor = -rows[other][col].clone();
            add_scaled_in_place(&mut rows, other, col, &factor);
            trace.push(format!(
                "  Eliminate: R{} ← R{} + ({}) * R{}",
                other + 1,
                other + 1,
                factor,
                col + 1
            ));
        }
        trace_rows(trace, &rows);
    }

    let left_is_identity = rows.iter().enumerate().all(|(i, row)| {
        row[..n]
            .iter()
            .enumerate()
            .all(|(j, v)| if i == j { v.is_one() } else { v.is_zero() })
    });
    if !left_is_identity {
        let err = MatrixError::SingularMatrix {
            reason: "the left block did not reduce to the identity".to_string(),
        };
        return Err(trace.fail(err));
    }

    let inverse = Matrix::from_rows_unchecked(rows.into_iter().map(|row| row[n..].to_vec()).collect());
    trace.matrix("Inverse Matrix (A^-1):", &inverse);
    Ok(inverse)
}

/// RREF and rank, plus the canonical `[I_r 0; 0 0]` block.
///
/// The column permutation that would turn the RREF into the canonical block
/// is not performed; `canonical` is built directly from the rank.
pub fn normal_form(matrix: &Matrix, trace: &mut StepTrace) -> Result<NormalForm> {
    debug!("normal form of {}", matrix.shape());
    let Reduced { matrix: rref, rank } = rref_and_rank(matrix, trace)?;

    let mut canonical = Matrix::zeros(matrix.rows(), matrix.cols()).into_rows();
    for (i, row) in canonical.iter_mut().enumerate().take(rank) {
        row[i] = Rational::one();
    }
    let canonical = Matrix::from_rows_unchecked(canonical);

    trace.push("");
    trace.push("--- Normal Form ---");
    trace.push(format!(
        "With rank {}, the normal form is [I_{} 0; 0 0] of size {}.",
        rank,
        rank,
        matrix.shape()
    ));
    trace.push("Column swaps that move pivots into the leading block are not applied.");
    trace.matrix("Normal Form:", &canonical);
    Ok(NormalForm {
        rref,
        rank,
        canonical,
    })
}
