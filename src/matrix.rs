//! Rectangular grid of exact fractions
//!
//! A `Matrix` is always non-empty and rectangular; every constructor
//! (including deserialization) validates this, so engine operations can
//! index rows and columns freely.

use crate::config::ConversionConfig;
use crate::error::{MatrixError, ParseError, Result};
use crate::rational::Rational;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Index;

/// Matrix dimensions, displayed as `RxC`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Shape {
    pub rows: usize,
    pub cols: usize,
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.rows, self.cols)
    }
}

#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "Vec<Vec<Rational>>", try_from = "Vec<Vec<Rational>>")]
pub struct Matrix {
    rows: Vec<Vec<Rational>>,
}

impl Matrix {
    /// Build a matrix from rows, rejecting empty or ragged input
    pub fn new(rows: Vec<Vec<Rational>>) -> Result<Matrix> {
        let cols = match rows.first() {
            Some(first) => first.len(),
            None => return Err(ParseError::new("matrix has no rows").into()),
        };
        if cols == 0 {
            return Err(ParseError::new("matrix rows are empty").at_row(1).into());
        }
        for (i, row) in rows.iter().enumerate() {
            if row.len() != cols {
                return Err(ParseError::new(format!(
                    "has {} elements, but expected {}",
                    row.len(),
                    cols
                ))
                .at_row(i + 1)
                .into());
            }
        }
        Ok(Matrix { rows })
    }

    /// Convenience constructor from integer entries
    pub fn from_integers<R: AsRef<[i64]>>(rows: &[R]) -> Result<Matrix> {
        Matrix::new(
            rows.iter()
                .map(|row| row.as_ref().iter().map(|&v| Rational::from(v)).collect())
                .collect(),
        )
    }

    /// Rows are already known to be rectangular and non-empty
    pub(crate) fn from_rows_unchecked(rows: Vec<Vec<Rational>>) -> Matrix {
        debug_assert!(!rows.is_empty() && !rows[0].is_empty());
        debug_assert!(rows.iter().all(|r| r.len() == rows[0].len()));
        Matrix { rows }
    }

    /// All-zero matrix. A matrix is never empty, so a zero dimension is
    /// raised to 1.
    pub fn zeros(rows: usize, cols: usize) -> Matrix {
        Matrix::from_rows_unchecked(vec![vec![Rational::zero(); cols.max(1)]; rows.max(1)])
    }

    /// `n x n` identity; `identity(0)` is the 1x1 identity for the same
    /// reason as `zeros`.
    pub fn identity(n: usize) -> Matrix {
        let mut rows = vec![vec![Rational::zero(); n.max(1)]; n.max(1)];
        for (i, row) in rows.iter_mut().enumerate() {
            row[i] = Rational::one();
        }
        Matrix::from_rows_unchecked(rows)
    }

    /// Single-column matrix from a vector of values
    pub fn column(values: &[Rational]) -> Result<Matrix> {
        Matrix::new(values.iter().map(|v| vec![v.clone()]).collect())
    }

    /// Parse matrix text with the default conversion settings
    pub fn parse(text: &str) -> Result<Matrix> {
        Matrix::parse_with(text, &ConversionConfig::default())
    }

    /// Parse rows separated by line breaks, entries separated by spaces.
    ///
    /// Blank lines are skipped; errors report the 1-indexed row.
    pub fn parse_with(text: &str, config: &ConversionConfig) -> Result<Matrix> {
        let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
        if lines.is_empty() {
            return Err(ParseError::new("no data entered").into());
        }

        let mut rows = Vec::with_capacity(lines.len());
        for (i, line) in lines.iter().enumerate() {
            let mut row = Vec::new();
            for token in line.split_whitespace() {
                let value = Rational::parse_with(token, config).map_err(|e| match e {
                    MatrixError::Parse(mut err) => {
                        err.token.get_or_insert_with(|| token.to_string());
                        MatrixError::Parse(err.at_row(i + 1))
                    }
                    other => other,
                })?;
                row.push(value);
            }
            rows.push(row);
        }

        Matrix::new(rows)
    }

    pub fn rows(&self) -> usize {
        self.rows.len()
    }

    pub fn cols(&self) -> usize {
        self.rows[0].len()
    }

    pub fn shape(&self) -> Shape {
        Shape {
            rows: self.rows(),
            cols: self.cols(),
        }
    }

    pub fn is_square(&self) -> bool {
        self.rows() == self.cols()
    }

    /// Fail with `NotSquare` naming `operation` unless rows == cols
    pub fn require_square(&self, operation: &'static str) -> Result<()> {
        if self.is_square() {
            Ok(())
        } else {
            Err(MatrixError::NotSquare {
                operation,
                shape: self.shape(),
            })
        }
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&Rational> {
        self.rows.get(row).and_then(|r| r.get(col))
    }

    pub fn row(&self, row: usize) -> &[Rational] {
        &self.rows[row]
    }

    pub fn row_iter(&self) -> impl Iterator<Item = &[Rational]> {
        self.rows.iter().map(|r| r.as_slice())
    }

    pub fn to_rows(&self) -> Vec<Vec<Rational>> {
        self.rows.clone()
    }

    pub fn into_rows(self) -> Vec<Vec<Rational>> {
        self.rows
    }

    /// The sub-matrix left after deleting row `skip_row` and column `skip_col`.
    ///
    /// Returns `None` for a 1x1 matrix, whose minor would be empty.
    pub fn minor(&self, skip_row: usize, skip_col: usize) -> Option<Matrix> {
        if self.rows() < 2 || self.cols() < 2 {
            return None;
        }
        let rows = self
            .rows
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != skip_row)
            .map(|(_, row)| {
                row.iter()
                    .enumerate()
                    .filter(|(j, _)| *j != skip_col)
                    .map(|(_, v)| v.clone())
                    .collect()
            })
            .collect();
        Some(Matrix::from_rows_unchecked(rows))
    }

    /// Whether every entry of `row` is zero
    pub fn is_zero_row(&self, row: usize) -> bool {
        self.rows[row].iter().all(Rational::is_zero)
    }

    /// Render the display block: an optional title, one bracketed line per
    /// row with each column right-aligned to its widest entry, then a dash
    /// separator.
    pub fn render(&self, title: &str) -> Vec<String> {
        let cells: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|row| row.iter().map(|v| v.to_string()).collect())
            .collect();

        let mut widths = vec![0usize; self.cols()];
        for row in &cells {
            for (j, cell) in row.iter().enumerate() {
                widths[j] = widths[j].max(cell.len());
            }
        }

        let mut lines = Vec::with_capacity(self.rows() + 2);
        if !title.is_empty() {
            lines.push(title.to_string());
        }
        for row in &cells {
            let padded: Vec<String> = row
                .iter()
                .zip(&widths)
                .map(|(cell, &w)| format!("{:>w$}", cell, w = w))
                .collect();
            lines.push(format!("[{}]", padded.join(" ")));
        }
        lines.push("-".repeat(widths.iter().sum::<usize>() + self.cols() * 2));
        lines
    }
}

impl Index<(usize, usize)> for Matrix {
    type Output = Rational;

    fn index(&self, (row, col): (usize, usize)) -> &Rational {
        &self.rows[row][col]
    }
}

impl fmt::Debug for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.rows.iter()).finish()
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in self.render("") {
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

impl From<Matrix> for Vec<Vec<Rational>> {
    fn from(m: Matrix) -> Self {
        m.rows
    }
}

impl TryFrom<Vec<Vec<Rational>>> for Matrix {
    type Error = MatrixError;

    fn try_from(rows: Vec<Vec<Rational>>) -> Result<Matrix> {
        Matrix::new(rows)
    }
}

/// Parse a constant vector with the default conversion settings
pub fn parse_constants(text: &str) -> Result<Vec<Rational>> {
    parse_constants_with(text, &ConversionConfig::default())
}

/// Parse a whitespace-separated list of constants (the right-hand side of a
/// linear system). Errors name the 1-indexed constant position.
pub fn parse_constants_with(text: &str, config: &ConversionConfig) -> Result<Vec<Rational>> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    if tokens.is_empty() {
        return Err(ParseError::new("no constants entered").into());
    }

    tokens
        .iter()
        .enumerate()
        .map(|(i, token)| {
            Rational::parse_with(token, config).map_err(|e| match e {
                MatrixError::Parse(err) => MatrixError::Parse(ParseError {
                    row: Some(i + 1),
                    token: Some(token.to_string()),
                    reason: err.reason,
                }),
                other => other,
            })
        })
        .collect()
}
