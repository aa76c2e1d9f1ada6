//! Linear systems `A x = b`

use crate::determinant::inverse_by_adjoint;
use crate::error::{MatrixError, Result};
use crate::matrix::{Matrix, Shape};
use crate::ops::multiply;
use crate::rational::Rational;
use crate::reduction::{count_non_zero_rows, echelon_in_place, eliminate_above, leading_ones};
use crate::trace::StepTrace;
use log::debug;
use serde::{Deserialize, Serialize};

/// Classification of a linear system, with the solution when it is unique
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Solution {
    /// rank(A) < rank(A|b)
    #[serde(rename_all = "camelCase")]
    NoSolution { rank_a: usize, rank_augmented: usize },
    /// rank(A) = rank(A|b) = n
    Unique { values: Vec<Rational> },
    /// rank(A) = rank(A|b) < n
    #[serde(rename_all = "camelCase")]
    Infinite { rank: usize, free_variables: usize },
}

impl Solution {
    pub fn is_unique(&self) -> bool {
        matches!(self, Solution::Unique { .. })
    }

    /// The solution vector, if the system has exactly one
    pub fn values(&self) -> Option<&[Rational]> {
        match self {
            Solution::Unique { values } => Some(values.as_slice()),
            _ => None,
        }
    }
}

fn check_constants(operation: &'static str, a: &Matrix, b: &[Rational], trace: &mut StepTrace) -> Result<()> {
    if a.rows() == b.len() {
        return Ok(());
    }
    let err = MatrixError::DimensionMismatch {
        operation,
        left: a.shape(),
        right: Shape {
            rows: b.len(),
            cols: 1,
        },
    };
    trace.error(&err);
    trace.push("The number of constants must equal the number of rows of A.");
    Err(err)
}

/// Gaussian elimination on `[A | b]` followed by rank analysis.
///
/// Only a uniquely solvable system gets a solution vector; for infinitely
/// many solutions the number of free variables is reported instead.
pub fn solve_by_row_reduction(a: &Matrix, b: &[Rational], trace: &mut StepTrace) -> Result<Solution> {
    debug!("solve (row reduction) {} with {} constants", a.shape(), b.len());
    trace.push("--- Solve System using Row Reduction (Gaussian Elimination) ---");
    check_constants("linear system", a, b, trace)?;

    let n = a.cols();
    let mut rows: Vec<Vec<Rational>> = a
        .row_iter()
        .zip(b)
        .map(|(row, constant)| {
            let mut augmented = row.to_vec();
            augmented.push(constant.clone());
            augmented
        })
        .collect();
    trace.matrix("Augmented Matrix [A | b]:", &Matrix::from_rows_unchecked(rows.clone()));

    trace.push("");
    trace.push("Step 1: reduce the augmented matrix to row echelon form.");
    echelon_in_place(&mut rows, trace)?;
    trace.matrix("Row Echelon Form of [A | b]:", &Matrix::from_rows_unchecked(rows.clone()));

    let coefficients: Vec<Vec<Rational>> = rows.iter().map(|row| row[..n].to_vec()).collect();
    let rank_a = count_non_zero_rows(&coefficients);
    let rank_augmented = count_non_zero_rows(&rows);

    trace.push("");
    trace.push("Step 2: rank analysis.");
    trace.push(format!("  Rank of coefficient matrix (A): {}", rank_a));
    trace.push(format!("  Rank of augmented matrix [A | b]: {}", rank_augmented));
    trace.push(format!("  Number of variables (n): {}", n));

    if rank_a > rank_augmented {
        return Err(trace.fail(MatrixError::RankAnalysis {
            rank_a,
            rank_augmented,
        }));
    }

    if rank_a < rank_augmented {
        trace.push("");
        trace.push("Conclusion: rank(A) < rank([A | b]), so the system is inconsistent and has no solution.");
        return Ok(Solution::NoSolution {
            rank_a,
            rank_augmented,
        });
    }

    if rank_a < n {
        let free_variables = n - rank_a;
        trace.push("");
        trace.push(format!(
            "Conclusion: rank(A) = rank([A | b]) = {} < {}, so the system has infinitely many solutions with {} free variable(s).",
            rank_a, n, free_variables
        ));
        return Ok(Solution::Infinite {
            rank: rank_a,
            free_variables,
        });
    }

    trace.push("");
    trace.push(format!(
        "rank(A) = rank([A | b]) = n = {}, so the system has a unique solution.",
        n
    ));
    trace.push("");
    trace.push("Step 3: clear above the pivots to reach reduced row echelon form.");
    let pivots = leading_ones(&rows);
    eliminate_above(&mut rows, &pivots, trace);
    trace.matrix("Reduced Row Echelon Form of [A | b]:", &Matrix::from_rows_unchecked(rows.clone()));

    trace.push("");
    trace.push("Step 4: back substitution.");
    let mut values = vec![Rational::zero(); n];
    for pivot in pivots.iter().rev() {
        let row = &rows[pivot.row];
        let known = ((pivot.col + 1)..n).fold(Rational::zero(), |sum, j| &sum + &(&row[j] * &values[j]));
        let value = (&row[n] - &known).checked_div(&row[pivot.col])?;
        trace.push(format!(
            "  x{} = ({} - {}) / {} = {}",
            pivot.col + 1,
            row[n],
            known,
            row[pivot.col],
            value
        ));
        values[pivot.col] = value;
    }

    trace.push("");
    trace.push("Solution:");
    for (i, value) in values.iter().enumerate() {
        trace.push(format!("  x{} = {}", i + 1, value));
    }
    Ok(Solution::Unique { values })
}

/// `x = A^-1 b`, with the inverse computed by the adjoint method
pub fn solve_by_inverse(a: &Matrix, b: &[Rational], trace: &mut StepTrace) -> Result<Vec<Rational>> {
    debug!("solve (inverse) {} with {} constants", a.shape(), b.len());
    trace.push("--- Solve System using the Inverse Matrix Method ---");
    a.require_square("solve by inverse")
        .map_err(|e| trace.fail(e))?;
    check_constants("linear system", a, b, trace)?;

    trace.push("");
    trace.push("Step 1: compute A^-1.");
    let mut inner = StepTrace::new();
    let inverse = inverse_by_adjoint(a, &mut inner);
    trace.extend_indented("  ", inner);
    let inverse = inverse?;

    trace.push("");
    trace.push("Step 2: compute x = A^-1 * b.");
    let column = Matrix::column(b)?;
    let mut inner = StepTrace::new();
    let product = multiply(&inverse, &column, &mut inner);
    trace.extend_indented("  ", inner);
    let values: Vec<Rational> = product?.into_rows().into_iter().flatten().collect();

    trace.push("");
    trace.push("Solution:");
    for (i, value) in values.iter().enumerate() {
        trace.push(format!("  x{} = {}", i + 1, value));
    }
    Ok(values)
}
