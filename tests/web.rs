//! Browser-side checks of the JavaScript facade

#![cfg(target_arch = "wasm32")]

use rational_matrix::{EroSessionHandle, MatrixCalculator, Report};
use serde::Serialize;
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn request(value: serde_json::Value) -> JsValue {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .unwrap()
}

#[wasm_bindgen_test]
fn evaluate_through_js_values() {
    let calc = MatrixCalculator::new();
    let out = calc
        .evaluate_js(request(serde_json::json!({ "operation": "determinant", "a": "1 2\n3 4" })))
        .unwrap();
    let report: Report = serde_wasm_bindgen::from_value(out).unwrap();
    assert!(report.is_ok());
    assert!(!report.steps.is_empty());
}

#[wasm_bindgen_test]
fn invalid_request_is_rejected() {
    let calc = MatrixCalculator::new();
    assert!(calc.evaluate_js(JsValue::from_str("not a request")).is_err());
}

#[wasm_bindgen_test]
fn config_object_is_accepted() {
    let config = request(serde_json::json!({ "maxIterations": 10 }));
    assert!(MatrixCalculator::with_config_js(config).is_ok());
}

#[wasm_bindgen_test]
fn session_round_trip() {
    let mut handle = EroSessionHandle::new();
    handle.start_js("1 2\n3 4").unwrap();
    let op = request(serde_json::json!({ "op": "swap", "first": 1, "second": 2 }));
    handle.apply_js(op).unwrap();
    assert_eq!(handle.step_count(), 1);
    assert_eq!(handle.working_lines().length(), 3);

    handle.reset();
    assert!(handle.working().unwrap().is_null());
}
