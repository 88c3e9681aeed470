//! The `Playground` object exposed to TypeScript.
//!
//! Every method mirrors a [`Bridge`] entry point and returns plain values:
//!
//! | Method                                   | Returns                                        |
//! |------------------------------------------|------------------------------------------------|
//! | `init(schema, templates)`                | `null` or `{code, errors}`                     |
//! | `matchAll(operation, name, variables)`   | `null` or `{matched, error?}`                  |
//! | `parseOperation(source)`                 | `{operations}` or `{code: "PARSE_OPR", errors}` |
//! | `isActive()`                             | `boolean`                                      |
//!
//! On `wasm32` a panic aborts, so a fault traps out of the call without
//! running destructors. Methods therefore take `&self` and never hold a
//! borrow of the bridge while it runs: each call works on a clone, and
//! `init` stores its clone back once it returns.

use std::cell::RefCell;

use gqtmatch::{Bridge, ErrorReport, MatchOutcome};
use wasm_bindgen::prelude::*;

use crate::convert::{self, option_to_js, string_arg, to_js};
use crate::fault::JsFaultSink;

/// A template matcher with its own engine state and fault channel.
#[wasm_bindgen]
pub struct Playground {
    bridge: RefCell<Bridge>,
}

#[wasm_bindgen]
#[allow(clippy::needless_pass_by_value)] // wasm-bindgen requires owned JsValue across FFI
impl Playground {
    /// Create an uninitialized playground.
    ///
    /// `onFault` receives `{error, stackTrace}` for every contained panic.
    #[wasm_bindgen(constructor)]
    #[must_use]
    pub fn new(on_fault: Option<js_sys::Function>) -> Playground {
        Self {
            bridge: RefCell::new(Bridge::new(JsFaultSink::new(on_fault))),
        }
    }

    /// Compile `schema` (empty for schema-less) and `templates`.
    ///
    /// Returns `null` once the new templates are active. On failure the
    /// previous templates stay active.
    pub fn init(&self, schema: JsValue, templates: JsValue) -> JsValue {
        let schema = match string_arg(&schema, "schema") {
            Ok(schema) => schema,
            Err(message) => return to_js(&ErrorReport::marshal(message)),
        };
        let templates = match convert::templates_from_js(&templates) {
            Ok(templates) => templates,
            Err(report) => return to_js(&report),
        };
        let mut next = self.bridge();
        let report = next.init(&schema, &templates);
        self.bridge.replace(next);
        option_to_js(report.as_ref())
    }

    /// Match an operation against every active template.
    ///
    /// `operationName` and `variablesJSON` may be empty.
    #[wasm_bindgen(js_name = matchAll)]
    pub fn match_all(
        &self,
        operation: JsValue,
        operation_name: JsValue,
        variables_json: JsValue,
    ) -> JsValue {
        let bridge = self.bridge();
        match match_args(&operation, &operation_name, &variables_json) {
            Ok((operation, name, variables)) => {
                option_to_js(bridge.match_all(&operation, &name, &variables).as_ref())
            }
            Err(message) if bridge.is_active() => to_js(&MatchOutcome {
                matched: Vec::new(),
                error: Some(message),
            }),
            Err(_) => JsValue::NULL,
        }
    }

    /// List the named operations in `source`.
    #[wasm_bindgen(js_name = parseOperation)]
    pub fn parse_operation(&self, source: JsValue) -> JsValue {
        match string_arg(&source, "source") {
            Ok(source) => option_to_js(self.bridge().parse_operation(&source).as_ref()),
            Err(message) => to_js(&ErrorReport::marshal(message)),
        }
    }

    /// Whether a successful `init` has activated templates.
    #[wasm_bindgen(js_name = isActive)]
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.bridge.borrow().is_active()
    }

    /// Panic inside the fault boundary, for exercising the fault channel.
    #[cfg(debug_assertions)]
    #[doc(hidden)]
    #[wasm_bindgen(js_name = raiseFault)]
    pub fn raise_fault(&self) {
        let bridge = self.bridge();
        let _: Option<()> = bridge
            .boundary()
            .guard("raiseFault", || panic!("fault raised on request"));
    }
}

impl Playground {
    fn bridge(&self) -> Bridge {
        self.bridge.borrow().clone()
    }
}

fn match_args(
    operation: &JsValue,
    operation_name: &JsValue,
    variables_json: &JsValue,
) -> Result<(String, String, String), String> {
    Ok((
        string_arg(operation, "operation")?,
        string_arg(operation_name, "operationName")?,
        string_arg(variables_json, "variablesJSON")?,
    ))
}
