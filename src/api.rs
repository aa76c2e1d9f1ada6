//! JavaScript-facing calculator and interactive session
//!
//! Requests arrive as text (the same format users type into the matrix
//! fields) and every response carries the step trace, whether the
//! operation succeeded or not.

use crate::config::ConversionConfig;
use crate::determinant::{adjoint, determinant, inverse_by_adjoint};
use crate::ero::RowOperation;
use crate::error::{MatrixError, ParseError, Result};
use crate::matrix::{parse_constants_with, Matrix};
use crate::ops::{add, multiply, subtract, transpose};
use crate::rational::Rational;
use crate::reduction::{inverse_by_row_reduction, normal_form, rank, row_echelon_form, NormalForm};
use crate::session::EroSession;
use crate::solve::{solve_by_inverse, solve_by_row_reduction, Solution};
use crate::trace::{StepTrace, Traced};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

/// Every action the calculator offers
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Operation {
    Transpose,
    Add,
    Subtract,
    Multiply,
    Determinant,
    Adjoint,
    InverseByAdjoint,
    InverseByRowReduction,
    RowEchelonForm,
    NormalForm,
    Rank,
    SolveByRowReduction,
    SolveByInverse,
    /// A single elementary row operation on matrix A
    RowOperation,
    /// Bind a working matrix for an interactive session
    StartSession,
}

impl Operation {
    fn needs_second_matrix(self) -> bool {
        matches!(self, Operation::Add | Operation::Subtract | Operation::Multiply)
    }

    fn needs_constants(self) -> bool {
        matches!(self, Operation::SolveByRowReduction | Operation::SolveByInverse)
    }
}

/// One calculator request, with matrices in text form
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    pub operation: Operation,
    pub a: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub b: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constants: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_operation: Option<RowOperation>,
}

impl Request {
    pub fn new(operation: Operation, a: impl Into<String>) -> Self {
        Request {
            operation,
            a: a.into(),
            b: None,
            constants: None,
            row_operation: None,
        }
    }

    pub fn with_b(mut self, b: impl Into<String>) -> Self {
        self.b = Some(b.into());
        self
    }

    pub fn with_constants(mut self, constants: impl Into<String>) -> Self {
        self.constants = Some(constants.into());
        self
    }

    pub fn with_row_operation(mut self, op: RowOperation) -> Self {
        self.row_operation = Some(op);
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum ReportValue {
    Matrix(Matrix),
    Scalar(Rational),
    Rank(usize),
    Solution(Solution),
    Vector(Vec<Rational>),
    NormalForm(NormalForm),
}

/// Outcome of a request: a result or an error message, plus the trace
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub operation: Operation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<ReportValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub steps: Vec<String>,
}

impl Report {
    fn from_traced(operation: Operation, traced: Traced<Result<ReportValue>>) -> Self {
        let Traced { output, trace } = traced;
        let (result, error) = match output {
            Ok(value) => (Some(value), None),
            Err(err) => (None, Some(err.to_string())),
        };
        Report {
            operation,
            result,
            error,
            steps: trace.into_lines(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// A finished calculation in the shape a history store would keep it.
/// The calculator itself stores nothing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationRecord {
    pub operation: Operation,
    pub matrix_a: Matrix,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matrix_b: Option<Matrix>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constants: Option<Vec<Rational>>,
    pub result: ReportValue,
    pub steps: Vec<String>,
}

#[derive(Default)]
struct Inputs {
    b: Option<Matrix>,
    constants: Option<Vec<Rational>>,
}

/// Stateless calculator: one `evaluate` call per user action
#[wasm_bindgen]
#[derive(Clone, Debug, Default)]
pub struct MatrixCalculator {
    config: ConversionConfig,
}

impl MatrixCalculator {
    pub fn with_config(config: ConversionConfig) -> Self {
        MatrixCalculator { config }
    }

    pub fn config(&self) -> &ConversionConfig {
        &self.config
    }

    pub fn evaluate(&self, request: &Request) -> Report {
        info!("evaluating {:?}", request.operation);
        let traced = StepTrace::run(|trace| self.run(request, trace).map(|(_, _, value)| value));
        Report::from_traced(request.operation, traced)
    }

    /// Evaluate and package the inputs, result and trace for storage.
    /// Failed calculations produce no record.
    pub fn record(&self, request: &Request) -> Option<CalculationRecord> {
        let Traced { output, trace } = StepTrace::run(|trace| self.run(request, trace));
        let (matrix_a, inputs, result) = output.ok()?;
        Some(CalculationRecord {
            operation: request.operation,
            matrix_a,
            matrix_b: inputs.b,
            constants: inputs.constants,
            result,
            steps: trace.into_lines(),
        })
    }

    fn run(&self, request: &Request, trace: &mut StepTrace) -> Result<(Matrix, Inputs, ReportValue)> {
        let a = Matrix::parse_with(&request.a, &self.config).map_err(|e| trace.fail(e))?;
        let mut inputs = Inputs::default();
        if request.operation.needs_second_matrix() {
            let text = required(request.b.as_deref(), "matrix B").map_err(|e| trace.fail(e))?;
            inputs.b = Some(Matrix::parse_with(text, &self.config).map_err(|e| trace.fail(e))?);
        }
        if request.operation.needs_constants() {
            let text = required(request.constants.as_deref(), "constants").map_err(|e| trace.fail(e))?;
            inputs.constants = Some(parse_constants_with(text, &self.config).map_err(|e| trace.fail(e))?);
        }

        let b = inputs.b.as_ref();
        let constants = inputs.constants.as_deref().unwrap_or_default();
        let value = match request.operation {
            Operation::Transpose => ReportValue::Matrix(transpose(&a, trace)),
            Operation::Add => ReportValue::Matrix(add(&a, second(b)?, trace)?),
            Operation::Subtract => ReportValue::Matrix(subtract(&a, second(b)?, trace)?),
            Operation::Multiply => ReportValue::Matrix(multiply(&a, second(b)?, trace)?),
            Operation::Determinant => ReportValue::Scalar(determinant(&a, trace)?),
            Operation::Adjoint => ReportValue::Matrix(adjoint(&a, trace)?),
            Operation::InverseByAdjoint => ReportValue::Matrix(inverse_by_adjoint(&a, trace)?),
            Operation::InverseByRowReduction => ReportValue::Matrix(inverse_by_row_reduction(&a, trace)?),
            Operation::RowEchelonForm => ReportValue::Matrix(row_echelon_form(&a, trace)?),
            Operation::NormalForm => ReportValue::NormalForm(normal_form(&a, trace)?),
            Operation::Rank => ReportValue::Rank(rank(&a, trace)?),
            Operation::SolveByRowReduction => ReportValue::Solution(solve_by_row_reduction(&a, constants, trace)?),
            Operation::SolveByInverse => ReportValue::Vector(solve_by_inverse(&a, constants, trace)?),
            Operation::RowOperation => {
                let op = request
                    .row_operation
                    .as_ref()
                    .ok_or_else(|| missing("row operation"))
                    .map_err(|e| trace.fail(e))?;
                ReportValue::Matrix(op.apply(&a, trace)?)
            }
            Operation::StartSession => {
                trace.matrix("Working Matrix:", &a);
                ReportValue::Matrix(a.clone())
            }
        };
        debug!("{:?} finished with {} trace lines", request.operation, trace.len());
        Ok((a, inputs, value))
    }
}

fn missing(what: &str) -> MatrixError {
    ParseError::new(format!("{} is required for this operation", what)).into()
}

fn required<'a>(text: Option<&'a str>, what: &str) -> Result<&'a str> {
    text.filter(|t| !t.trim().is_empty()).ok_or_else(|| missing(what))
}

fn second(b: Option<&Matrix>) -> Result<&Matrix> {
    b.ok_or_else(|| missing("matrix B"))
}

fn to_js<T: Serialize>(value: &T) -> std::result::Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

#[wasm_bindgen]
impl MatrixCalculator {
    #[wasm_bindgen(constructor)]
    pub fn new() -> MatrixCalculator {
        MatrixCalculator::default()
    }

    /// Build a calculator from a `{ tolerance, maxScale, maxIterations }` object
    #[wasm_bindgen(js_name = withConfig)]
    pub fn with_config_js(config: JsValue) -> std::result::Result<MatrixCalculator, JsValue> {
        let config: ConversionConfig = serde_wasm_bindgen::from_value(config)
            .map_err(|e| JsValue::from_str(&format!("Invalid config: {}", e)))?;
        Ok(MatrixCalculator::with_config(config))
    }

    #[wasm_bindgen(js_name = evaluate)]
    pub fn evaluate_js(&self, request: JsValue) -> std::result::Result<JsValue, JsValue> {
        let request: Request = serde_wasm_bindgen::from_value(request)
            .map_err(|e| JsValue::from_str(&format!("Invalid request: {}", e)))?;
        to_js(&self.evaluate(&request))
    }

    /// Same as `evaluate` but returns a `CalculationRecord`, or `null` on failure
    #[wasm_bindgen(js_name = recordCalculation)]
    pub fn record_js(&self, request: JsValue) -> std::result::Result<JsValue, JsValue> {
        let request: Request = serde_wasm_bindgen::from_value(request)
            .map_err(|e| JsValue::from_str(&format!("Invalid request: {}", e)))?;
        match self.record(&request) {
            Some(record) => to_js(&record),
            None => Ok(JsValue::NULL),
        }
    }
}

/// Interactive session exposed to JavaScript
#[wasm_bindgen]
#[derive(Debug, Default)]
pub struct EroSessionHandle {
    session: EroSession,
    config: ConversionConfig,
}

impl EroSessionHandle {
    /// Parse `text` and make it the working matrix
    pub fn start(&mut self, text: &str) -> Report {
        let traced = StepTrace::run(|trace| {
            let matrix = Matrix::parse_with(text, &self.config).map_err(|e| trace.fail(e))?;
            self.session.start(matrix.clone(), trace);
            Ok(ReportValue::Matrix(matrix))
        });
        Report::from_traced(Operation::StartSession, traced)
    }

    pub fn apply(&mut self, op: &RowOperation) -> Report {
        let traced = StepTrace::run(|trace| {
            self.session
                .apply(op, trace)
                .map(|working| ReportValue::Matrix(working.clone()))
        });
        Report::from_traced(Operation::RowOperation, traced)
    }

    pub fn session(&self) -> &EroSession {
        &self.session
    }
}

#[wasm_bindgen]
impl EroSessionHandle {
    #[wasm_bindgen(constructor)]
    pub fn new() -> EroSessionHandle {
        EroSessionHandle::default()
    }

    #[wasm_bindgen(js_name = start)]
    pub fn start_js(&mut self, text: &str) -> std::result::Result<JsValue, JsValue> {
        to_js(&self.start(text))
    }

    /// Apply a row operation such as `{ op: "swap", first: 1, second: 2 }`
    #[wasm_bindgen(js_name = apply)]
    pub fn apply_js(&mut self, op: JsValue) -> std::result::Result<JsValue, JsValue> {
        let op: RowOperation = serde_wasm_bindgen::from_value(op)
            .map_err(|e| JsValue::from_str(&format!("Invalid row operation: {}", e)))?;
        to_js(&self.apply(&op))
    }

    pub fn reset(&mut self) {
        self.session.reset();
    }

    #[wasm_bindgen(getter, js_name = stepCount)]
    pub fn step_count(&self) -> usize {
        self.session.step_count()
    }

    #[wasm_bindgen(getter, js_name = isActive)]
    pub fn is_active(&self) -> bool {
        self.session.is_active()
    }

    /// The working matrix as nested `{ n, d }` rows, or `null` when idle
    pub fn working(&self) -> std::result::Result<JsValue, JsValue> {
        match self.session.working() {
            Some(matrix) => to_js(matrix),
            None => Ok(JsValue::NULL),
        }
    }

    /// The working matrix rendered as display lines; empty when idle
    #[wasm_bindgen(js_name = workingLines)]
    pub fn working_lines(&self) -> js_sys::Array {
        self.session
            .working()
            .map(|matrix| matrix.render(""))
            .unwrap_or_default()
            .into_iter()
            .map(|line| JsValue::from_str(&line))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evaluate_determinant() {
        let calc = MatrixCalculator::new();
        let report = calc.evaluate(&Request::new(Operation::Determinant, "1 2\n3 4"));
        assert!(report.is_ok());
        assert_eq!(report.result, Some(ReportValue::Scalar(Rational::from(-2))));
        assert!(report.steps.iter().any(|l| l.contains("Final Determinant")));
    }

    #[test]
    fn test_evaluate_reports_errors_with_steps() {
        let calc = MatrixCalculator::new();
        let report = calc.evaluate(&Request::new(Operation::Add, "1 2").with_b("1\n2"));
        assert_eq!(report.result, None);
        assert!(report.error.as_deref().unwrap().contains("1x2 and 2x1"));
        assert!(!report.steps.is_empty());
    }

    #[test]
    fn test_evaluate_missing_operand() {
        let calc = MatrixCalculator::new();
        let report = calc.evaluate(&Request::new(Operation::Multiply, "1 2"));
        assert!(report.error.as_deref().unwrap().contains("matrix B is required"));

        let report = calc.evaluate(&Request::new(Operation::SolveByInverse, "1 2\n3 4").with_constants("  "));
        assert!(report.error.as_deref().unwrap().contains("constants is required"));
    }

    #[test]
    fn test_evaluate_parse_error() {
        let calc = MatrixCalculator::new();
        let report = calc.evaluate(&Request::new(Operation::Transpose, "1 2\n3 x"));
        assert!(report.error.as_deref().unwrap().contains("row 2 element 'x'"));
    }

    #[test]
    fn test_evaluate_solve() {
        let calc = MatrixCalculator::new();
        let report = calc.evaluate(&Request::new(Operation::SolveByRowReduction, "2 1\n1 1").with_constants("5 3"));
        assert_eq!(
            report.result,
            Some(ReportValue::Solution(Solution::Unique {
                values: vec![Rational::from(2), Rational::from(1)]
            }))
        );
    }

    #[test]
    fn test_evaluate_row_operation() {
        let calc = MatrixCalculator::new();
        let request = Request::new(Operation::RowOperation, "1 2\n3 4")
            .with_row_operation(RowOperation::Swap { first: 1, second: 2 });
        let report = calc.evaluate(&request);
        let expected = Matrix::from_integers(&[[3, 4], [1, 2]]).unwrap();
        assert_eq!(report.result, Some(ReportValue::Matrix(expected)));
    }

    #[test]
    fn test_record() {
        let calc = MatrixCalculator::new();
        let record = calc
            .record(&Request::new(Operation::Multiply, "1 2").with_b("3\n4"))
            .unwrap();
        assert_eq!(record.matrix_b, Some(Matrix::from_integers(&[[3], [4]]).unwrap()));
        assert_eq!(record.result, ReportValue::Matrix(Matrix::from_integers(&[[11]]).unwrap()));
        assert!(calc.record(&Request::new(Operation::Determinant, "1 2")).is_none());
    }

    #[test]
    fn test_session_handle() {
        let mut handle = EroSessionHandle::new();
        let report = handle.apply(&RowOperation::Swap { first: 1, second: 2 });
        assert!(report.error.as_deref().unwrap().contains("no interactive session"));

        assert!(handle.start("2 4\n1 3").is_ok());
        let report = handle.apply(&RowOperation::Scale {
            row: 1,
            scalar: Rational::new(1, 2).unwrap(),
        });
        assert!(report.is_ok());
        assert_eq!(handle.step_count(), 1);

        let report = handle.apply(&RowOperation::Swap { first: 1, second: 3 });
        assert!(!report.is_ok());
        assert_eq!(handle.step_count(), 1);
        assert_eq!(
            handle.session().working(),
            Some(&Matrix::from_integers(&[[1, 2], [1, 3]]).unwrap())
        );

        handle.reset();
        assert!(!handle.is_active());
    }
}
