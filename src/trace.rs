//! Human-readable narration of every step an operation performs
//!
//! Engine operations write into a `StepTrace` passed down the call chain.
//! A fresh trace is created for each top-level call via `StepTrace::run`.

use crate::error::MatrixError;
use crate::matrix::Matrix;
use serde::{Deserialize, Serialize};

/// Append-only sequence of text lines
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StepTrace {
    lines: Vec<String>,
}

/// An operation's output together with the trace it produced
#[derive(Clone, Debug)]
pub struct Traced<T> {
    pub output: T,
    pub trace: StepTrace,
}

impl StepTrace {
    pub fn new() -> Self {
        StepTrace::default()
    }

    /// Run `f` against a fresh trace and hand back both
    pub fn run<T>(f: impl FnOnce(&mut StepTrace) -> T) -> Traced<T> {
        let mut trace = StepTrace::new();
        let output = f(&mut trace);
        Traced { output, trace }
    }

    pub fn push(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    /// Append a blank line followed by the rendered matrix block
    pub fn matrix(&mut self, title: &str, matrix: &Matrix) {
        self.lines.push(String::new());
        self.lines.extend(matrix.render(title));
    }

    /// Same as `matrix`, with every line indented
    pub fn matrix_indented(&mut self, indent: &str, title: &str, matrix: &Matrix) {
        self.lines
            .extend(matrix.render(title).into_iter().map(|l| format!("{}{}", indent, l)));
    }

    /// Record a failure so the narration explains why the operation stopped
    pub fn error(&mut self, err: &MatrixError) {
        self.lines.push(format!("Error: {}", err));
    }

    /// Record `err` and hand it back, for use in `map_err`
    pub fn fail(&mut self, err: MatrixError) -> MatrixError {
        self.error(&err);
        err
    }

    /// Splice in a child trace, prefixing each of its lines
    pub fn extend_indented(&mut self, indent: &str, child: StepTrace) {
        self.lines
            .extend(child.lines.into_iter().map(|l| format!("{}{}", indent, l)));
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Whether any line contains `needle`
    pub fn contains(&self, needle: &str) -> bool {
        self.lines.iter().any(|l| l.contains(needle))
    }
}

impl From<StepTrace> for Vec<String> {
    fn from(trace: StepTrace) -> Self {
        trace.lines
    }
}
