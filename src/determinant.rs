//! Determinant, adjoint and inverse by the adjoint method
//!
//! The determinant is computed by cofactor expansion along the first row.
//! Recursion depth equals the matrix size, and nested expansions indent
//! their trace lines by depth.

use crate::error::{MatrixError, Result};
use crate::matrix::Matrix;
use crate::rational::Rational;
use crate::trace::StepTrace;
use log::debug;

/// `(-1)^k`
fn alternating_sign(k: usize) -> Rational {
    if k % 2 == 0 {
        Rational::one()
    } else {
        -Rational::one()
    }
}

/// Determinant of a square matrix
pub fn determinant(matrix: &Matrix, trace: &mut StepTrace) -> Result<Rational> {
    debug!("determinant of {}", matrix.shape());
    trace.push("--- Determinant Operation ---");
    matrix
        .require_square("determinant")
        .map_err(|e| trace.fail(e))?;

    trace.matrix("Original Matrix:", matrix);
    trace.push("");
    let det = expand(matrix, trace, 0);
    trace.push("");
    trace.push(format!("Final Determinant (det(A)): {}", det));
    Ok(det)
}

/// Cofactor expansion; `matrix` must be square
fn expand(matrix: &Matrix, trace: &mut StepTrace, depth: usize) -> Rational {
    let indent = "  ".repeat(depth);
    let n = matrix.rows();

    if n == 1 {
        let value = matrix[(0, 0)].clone();
        trace.push(format!(
            "{}  Determinant of a 1x1 matrix is simply the element: {}",
            indent, value
        ));
        return value;
    }

    if n == 2 {
        let (a, b) = (&matrix[(0, 0)], &matrix[(0, 1)]);
        let (c, d) = (&matrix[(1, 0)], &matrix[(1, 1)]);
        let det = &(a * d) - &(b * c);
        trace.push(format!("{}  Calculating determinant for 2x2 matrix:", indent));
        trace.push(format!("{}  |{:>5} {:>5}|", indent, a.to_string(), b.to_string()));
        trace.push(format!("{}  |{:>5} {:>5}|", indent, c.to_string(), d.to_string()));
        trace.push(format!("{}  = ({} * {}) - ({} * {})", indent, a, d, b, c));
        trace.push(format!("{}  = {}", indent, det));
        return det;
    }

    let mut det = Rational::zero();
    trace.push(format!("{}Expanding determinant along the first row:", indent));
    for c in 0..n {
        let Some(minor) = matrix.minor(0, c) else {
            continue;
        };
        let element = &matrix[(0, c)];
        trace.push(format!("{}  For element A[1][{}] = {}:", indent, c + 1, element));
        trace.matrix_indented(
            &format!("{}    ", indent),
            &format!("Minor after removing row 1 and column {}:", c + 1),
            &minor,
        );

        let minor_det = expand(&minor, trace, depth + 1);
        let sign = alternating_sign(c);
        let cofactor = &sign * &minor_det;
        let term = element * &cofactor;
        det = &det + &term;

        trace.push(format!(
            "{}    Cofactor C[1][{}] = ((-1)^{}) * det(Minor) = {} * {} = {}",
            indent,
            c + 1,
            c,
            sign,
            minor_det,
            cofactor
        ));
        trace.push(format!(
            "{}    Term for A[1][{}] = {} * {} = {}",
            indent,
            c + 1,
            element,
            cofactor,
            term
        ));
        trace.push(format!("{}    Running sum: {}", indent, det));
    }
    trace.push(format!("{}Summing all terms: {}", indent, det));
    det
}

/// Transpose of the cofactor matrix
pub fn adjoint(matrix: &Matrix, trace: &mut StepTrace) -> Result<Matrix> {
    debug!("adjoint of {}", matrix.shape());
    trace.push("--- Adjoint Matrix Operation ---");
    matrix.require_square("adjoint").map_err(|e| trace.fail(e))?;
    let adj = cofactor_transpose(matrix, trace);
    trace.matrix("Adjoint Matrix (adj(A)):", &adj);
    Ok(adj)
}

fn cofactor_transpose(matrix: &Matrix, trace: &mut StepTrace) -> Matrix {
    let n = matrix.rows();
    trace.matrix("Original Matrix for Adjoint:", matrix);

    // The empty minor of a 1x1 matrix has determinant 1
    if n == 1 {
        trace.push("The adjoint of a 1x1 matrix is [1].");
        return Matrix::identity(1);
    }

    trace.push("");
    trace.push("Step-by-step Adjoint Calculation:");
    trace.push("The adjoint matrix is the transpose of the cofactor matrix.");
    trace.push("C[i][j] = (-1)^(i+j) * det(M_ij), where M_ij is the minor matrix.");

    let mut adj = vec![vec![Rational::zero(); n]; n];
    for i in 0..n {
        for j in 0..n {
            let Some(minor) = matrix.minor(i, j) else {
                continue;
            };
            trace.push("");
            trace.push(format!(
                "  -- Calculating Cofactor for element A[{}][{}] = {} --",
                i + 1,
                j + 1,
                matrix[(i, j)]
            ));
            trace.matrix_indented(
                "    ",
                &format!(
                    "Minor M[{}][{}] (removing row {} and column {}):",
                    i + 1,
                    j + 1,
                    i + 1,
                    j + 1
                ),
                &minor,
            );

            let mut nested = StepTrace::new();
            let minor_det = expand(&minor, &mut nested, 1);
            trace.extend_indented("    ", nested);

            let sign = alternating_sign(i + j);
            let cofactor = &sign * &minor_det;
            trace.push(format!(
                "    The sign factor for C[{}][{}] is (-1)^({}+{}) = {}",
                i + 1,
                j + 1,
                i,
                j,
                sign
            ));
            trace.push(format!(
                "    Cofactor C[{}][{}] = {} * {} = {}",
                i + 1,
                j + 1,
                sign,
                minor_det,
                cofactor
            ));
            trace.push(format!(
                "    This value becomes Adj[{}][{}] (transposed position).",
                j + 1,
                i + 1
            ));
            adj[j][i] = cofactor;
        }
    }

    trace.push("");
    trace.push("All cofactors calculated and transposed to form the adjoint matrix.");
    Matrix::from_rows_unchecked(adj)
}

/// `A^-1 = adj(A) / det(A)`. Fails with `SingularMatrix` when det(A) = 0,
/// in which case the adjoint is never computed.
pub fn inverse_by_adjoint(matrix: &Matrix, trace: &mut StepTrace) -> Result<Matrix> {
    debug!("inverse (adjoint method) of {}", matrix.shape());
    trace.push("--- Inverse Matrix Operation (Adjoint Method) ---");
    matrix
        .require_square("inverse")
        .map_err(|e| trace.fail(e))?;

    trace.matrix("Original Matrix for Inverse:", matrix);
    trace.push("");
    trace.push("Step 1: Calculate the Determinant of the matrix.");
    let det = expand(matrix, trace, 0);
    trace.push("");
    trace.push(format!("Final Determinant (det(A)): {}", det));

    if det.is_zero() {
        let err = MatrixError::SingularMatrix {
            reason: "determinant is zero, so the inverse does not exist".to_string(),
        };
        return Err(trace.fail(err));
    }

    trace.push("");
    trace.push("Step 2: Calculate the Adjoint of the matrix.");
    let adj = cofactor_transpose(matrix, trace);
    trace.matrix("Adjoint Matrix (adj(A)):", &adj);

    trace.push("");
    trace.push("Step 3: Calculate the Inverse using A^-1 = (1 / det(A)) * adj(A).");
    let factor = det.recip()?;
    trace.push(format!("  Scalar factor (1/det(A)) = 1 / {} = {}", det, factor));

    let n = matrix.rows();
    let mut inverse = Vec::with_capacity(n);
    for i in 0..n {
        let mut row = Vec::with_capacity(n);
        for j in 0..n {
            let value = &factor * &adj[(i, j)];
            trace.push(format!(
                "  - Inverse[{}][{}] = {} * {} = {}",
                i + 1,
                j + 1,
                factor,
                adj[(i, j)],
                value
            ));
            row.push(value);
        }
        inverse.push(row);
    }

    trace.push("");
    trace.push("Inverse matrix calculation complete.");
    Ok(Matrix::from_rows_unchecked(inverse))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::multiply;

    fn m(rows: &[&[i64]]) -> Matrix {
        Matrix::from_integers(rows).unwrap()
    }

    fn q(n: i64, d: i64) -> Rational {
        Rational::new(n, d).unwrap()
    }

    #[test]
    fn test_determinant_2x2() {
        let mut trace = StepTrace::new();
        let det = determinant(&m(&[&[1, 2], &[3, 4]]), &mut trace).unwrap();
        assert_eq!(det, q(-2, 1));
        assert!(trace.contains("= (1 * 4) - (2 * 3)"));
    }

    #[test]
    fn test_determinant_1x1() {
        let mut trace = StepTrace::new();
        assert_eq!(determinant(&m(&[&[7]]), &mut trace).unwrap(), q(7, 1));
    }

    #[test]
    fn test_determinant_3x3_expansion() {
        let a = m(&[&[2, 0, 1], &[1, 3, 2], &[1, 1, 1]]);
        let mut trace = StepTrace::new();
        // 2*(3-2) - 0*(1-2) + 1*(1-3) = 0
        assert_eq!(determinant(&a, &mut trace).unwrap(), Rational::zero());
        assert!(trace.contains("Expanding determinant along the first row:"));
        assert!(trace.contains("Cofactor C[1][2] = ((-1)^1)"));
    }

    #[test]
    fn test_determinant_4x4_nested_indent() {
        let a = m(&[&[1, 0, 2, -1], &[3, 0, 0, 5], &[2, 1, 4, -3], &[1, 0, 5, 0]]);
        let mut trace = StepTrace::new();
        assert_eq!(determinant(&a, &mut trace).unwrap(), q(30, 1));
        assert!(trace
            .lines()
            .iter()
            .any(|l| l.starts_with("  Expanding determinant along the first row:")));
    }

    #[test]
    fn test_determinant_with_fractions() {
        let a = Matrix::new(vec![vec![q(1, 2), q(1, 3)], vec![q(1, 4), q(1, 5)]]).unwrap();
        let mut trace = StepTrace::new();
        // 1/10 - 1/12 = 1/60
        assert_eq!(determinant(&a, &mut trace).unwrap(), q(1, 60));
    }

    #[test]
    fn test_determinant_not_square() {
        let mut trace = StepTrace::new();
        assert!(matches!(
            determinant(&m(&[&[1, 2]]), &mut trace),
            Err(MatrixError::NotSquare { .. })
        ));
    }

    #[test]
    fn test_adjoint_places_cofactors_transposed() {
        let a = m(&[&[1, 2], &[3, 4]]);
        let mut trace = StepTrace::new();
        let adj = adjoint(&a, &mut trace).unwrap();
        assert_eq!(adj, m(&[&[4, -2], &[-3, 1]]));
        assert!(trace.contains("This value becomes Adj[2][1]"));
    }

    #[test]
    fn test_adjoint_3x3() {
        let a = m(&[&[1, 2, 3], &[0, 1, 4], &[5, 6, 0]]);
        let mut trace = StepTrace::new();
        let adj = adjoint(&a, &mut trace).unwrap();
        assert_eq!(adj, m(&[&[-24, 18, 5], &[20, -15, -4], &[-5, 4, 1]]));
    }

    #[test]
    fn test_adjoint_1x1() {
        let mut trace = StepTrace::new();
        assert_eq!(adjoint(&m(&[&[9]]), &mut trace).unwrap(), m(&[&[1]]));
    }

    #[test]
    fn test_adjoint_not_square() {
        let mut trace = StepTrace::new();
        assert!(matches!(
            adjoint(&m(&[&[1, 2, 3], &[4, 5, 6]]), &mut trace),
            Err(MatrixError::NotSquare { .. })
        ));
    }

    #[test]
    fn test_inverse_of_scaled_identity() {
        let mut trace = StepTrace::new();
        let inv = inverse_by_adjoint(&m(&[&[2, 0], &[0, 2]]), &mut trace).unwrap();
        assert_eq!(
            inv,
            Matrix::new(vec![vec![q(1, 2), q(0, 1)], vec![q(0, 1), q(1, 2)]]).unwrap()
        );
    }

    #[test]
    fn test_inverse_times_matrix_is_identity() {
        let a = m(&[&[1, 2, 3], &[0, 1, 4], &[5, 6, 0]]);
        let mut trace = StepTrace::new();
        let inv = inverse_by_adjoint(&a, &mut trace).unwrap();
        assert_eq!(multiply(&a, &inv, &mut trace).unwrap(), Matrix::identity(3));
    }

    #[test]
    fn test_singular_inverse_skips_adjoint() {
        let mut trace = StepTrace::new();
        let result = inverse_by_adjoint(&m(&[&[1, 2], &[2, 4]]), &mut trace);
        assert!(matches!(result, Err(MatrixError::SingularMatrix { .. })));
        assert!(!trace.contains("Step 2"));
    }
}
