//! Rational Matrix - exact-fraction linear algebra with step-by-step narration
//!
//! This crate provides:
//! - Exact rational arithmetic (arbitrary-precision fractions)
//! - Matrix arithmetic, determinant, adjoint and both inverse methods
//! - Row reduction (REF, RREF, rank, normal form) and linear system solving
//! - Elementary row operations and an interactive session over them
//!
//! Every operation narrates its work into a `StepTrace`.

use wasm_bindgen::prelude::*;

pub mod api;
pub mod config;
pub mod determinant;
pub mod ero;
pub mod error;
pub mod logging;
pub mod matrix;
pub mod ops;
pub mod rational;
pub mod reduction;
pub mod session;
pub mod solve;
pub mod trace;

// Re-export main types for convenience
pub use api::{CalculationRecord, EroSessionHandle, MatrixCalculator, Operation, Report, ReportValue, Request};
pub use config::ConversionConfig;
pub use ero::RowOperation;
pub use error::{MatrixError, ParseError, Result};
pub use matrix::{parse_constants, Matrix, Shape};
pub use rational::Rational;
pub use reduction::{NormalForm, Reduced};
pub use session::{EroSession, SessionState};
pub use solve::Solution;
pub use trace::{StepTrace, Traced};

/// Initialize the WASM module
/// Call this once when loading the module to set up panic hooks and logging
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    logging::ConsoleLogger::install();
}

/// Get the version of the rational-matrix library
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
