//! WASM bindings for the stand-off scanner and nesting checker.
//!
//! Exposes `tokenize()` and `check()` to JavaScript via wasm-bindgen.
//! Errors are thrown as JS errors.

use standoff_nesting::NestingTable;
use wasm_bindgen::prelude::*;

/// Scan one stand-off line.
///
/// Returns an array of `{ kind, text, span }` objects.
#[wasm_bindgen]
pub fn tokenize(line: &str) -> Result<JsValue, JsError> {
    let tokens =
        standoff_lexer::Scanner::scan_line(line, 1).map_err(|e| JsError::new(&e.to_string()))?;
    serde_wasm_bindgen::to_value(&tokens).map_err(|e| JsError::new(&e.to_string()))
}

/// Check the nesting of a whole `.ann` document.
///
/// `nesting` is a TOML nesting table. Returns an array of violation
/// messages, empty when the document is valid.
#[wasm_bindgen]
pub fn check(source: &str, nesting: &str) -> Result<js_sys::Array, JsError> {
    let messages = check_messages(source, nesting)?;
    Ok(messages.into_iter().map(JsValue::from).collect())
}

fn check_messages(source: &str, nesting: &str) -> Result<Vec<String>, JsError> {
    let table = NestingTable::from_toml(nesting).map_err(|e| JsError::new(&e.to_string()))?;
    let violations =
        standoff_parser::check(source, &table).map_err(|e| JsError::new(&e.to_string()))?;
    Ok(violations.iter().map(ToString::to_string).collect())
}

/// Get the crate version.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
