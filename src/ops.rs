//! Structural and elementwise matrix operations

use crate::error::{MatrixError, Result};
use crate::matrix::Matrix;
use crate::rational::Rational;
use crate::trace::StepTrace;
use log::debug;

/// Swap rows and columns. Always succeeds.
pub fn transpose(matrix: &Matrix, trace: &mut StepTrace) -> Matrix {
    debug!("transpose {}", matrix.shape());
    trace.push("--- Transpose Matrix Operation ---");
    trace.matrix("Original Matrix:", matrix);
    trace.push("");
    trace.push("Step-by-step Transposition Process:");
    trace.push("The element at row i, column j of A becomes the element at row j, column i of A_T.");

    let mut transposed = vec![Vec::with_capacity(matrix.rows()); matrix.cols()];
    for i in 0..matrix.rows() {
        for (j, column) in transposed.iter_mut().enumerate() {
            let value = &matrix[(i, j)];
            column.push(value.clone());
            trace.push(format!(
                "  - Moving element A[{}][{}] = {} to A_T[{}][{}]",
                i + 1,
                j + 1,
                value,
                j + 1,
                i + 1
            ));
        }
    }

    let result = Matrix::from_rows_unchecked(transposed);
    trace.push("");
    trace.push("All elements have been transposed.");
    result
}

/// `A + B`; both operands must have the same shape
pub fn add(a: &Matrix, b: &Matrix, trace: &mut StepTrace) -> Result<Matrix> {
    elementwise("Addition", "addition", "+", a, b, trace, |x, y| x + y)
}

/// `A - B`; both operands must have the same shape
pub fn subtract(a: &Matrix, b: &Matrix, trace: &mut StepTrace) -> Result<Matrix> {
    elementwise("Subtraction", "subtraction", "-", a, b, trace, |x, y| x - y)
}

fn elementwise(
    name: &str,
    operation: &'static str,
    symbol: &str,
    a: &Matrix,
    b: &Matrix,
    trace: &mut StepTrace,
    combine: impl Fn(&Rational, &Rational) -> Rational,
) -> Result<Matrix> {
    debug!("{} of {} and {}", operation, a.shape(), b.shape());
    trace.push(format!("--- Matrix {} Operation ---", name));

    if a.shape() != b.shape() {
        let err = MatrixError::DimensionMismatch {
            operation,
            left: a.shape(),
            right: b.shape(),
        };
        trace.error(&err);
        trace.push(format!("Matrix A dimensions: {}", a.shape()));
        trace.push(format!("Matrix B dimensions: {}", b.shape()));
        return Err(err);
    }

    trace.matrix(&format!("Matrix A for {}:", name), a);
    trace.matrix(&format!("Matrix B for {}:", name), b);
    trace.push("");
    trace.push(format!("Step-by-step {} Process:", name));
    trace.push(format!("C[i][j] = A[i][j] {} B[i][j]", symbol));

    let rows: Vec<Vec<Rational>> = (0..a.rows())
        .map(|i| {
            (0..a.cols())
                .map(|j| {
                    let (x, y) = (&a[(i, j)], &b[(i, j)]);
                    let value = combine(x, y);
                    trace.push(format!(
                        "  - Calculating C[{}][{}]: {} {} {} = {}",
                        i + 1,
                        j + 1,
                        x,
                        symbol,
                        y,
                        value
                    ));
                    value
                })
                .collect::<Vec<_>>()
        })
        .collect();

    trace.push("");
    trace.push("All elements have been calculated.");
    Ok(Matrix::from_rows_unchecked(rows))
}

/// `A * B`; requires `cols(A) == rows(B)`
pub fn multiply(a: &Matrix, b: &Matrix, trace: &mut StepTrace) -> Result<Matrix> {
    debug!("multiply {} by {}", a.shape(), b.shape());
    trace.push("--- Matrix Multiplication Operation ---");

    if a.cols() != b.rows() {
        let err = MatrixError::DimensionMismatch {
            operation: "multiplication",
            left: a.shape(),
            right: b.shape(),
        };
        trace.error(&err);
        trace.push("The number of columns of A must equal the number of rows of B.");
        return Err(err);
    }

    trace.matrix("Matrix A for Multiplication:", a);
    trace.matrix("Matrix B for Multiplication:", b);
    trace.push("");
    trace.push("Step-by-step Multiplication Process:");
    trace.push("C[i][j] = Sum(A[i][k] * B[k][j]) for k from 1 to the number of columns in A.");

    let mut rows = Vec::with_capacity(a.rows());
    for i in 0..a.rows() {
        let mut row = Vec::with_capacity(b.cols());
        for j in 0..b.cols() {
            let mut sum = Rational::zero();
            let mut terms = Vec::with_capacity(a.cols());
            for k in 0..a.cols() {
                sum = &sum + &(&a[(i, k)] * &b[(k, j)]);
                terms.push(format!("({} * {})", a[(i, k)], b[(k, j)]));
            }
            trace.push(format!(
                "  - Calculating C[{}][{}]: {} = {}",
                i + 1,
                j + 1,
                terms.join(" + "),
                sum
            ));
            row.push(sum);
        }
        rows.push(row);
    }

    trace.push("");
    trace.push("All elements have been calculated.");
    Ok(Matrix::from_rows_unchecked(rows))
}
