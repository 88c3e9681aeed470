//! JS-surface tests, run with `wasm-pack test --node crusts/wasm`.

#![cfg(target_arch = "wasm32")]

use gqtmatch::{Fault, FaultSink};
use gqtmatch_crust::{JsFaultSink, Playground};
use serde_json::{json, Value};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_test::wasm_bindgen_test;

fn js(value: &Value) -> JsValue {
    serde::Serialize::serialize(value, &serde_wasm_bindgen::Serializer::json_compatible()).unwrap()
}

fn rust(value: JsValue) -> Value {
    serde_wasm_bindgen::from_value(value).unwrap()
}

fn s(text: &str) -> JsValue {
    JsValue::from_str(text)
}

#[wasm_bindgen_test]
fn init_then_match_all() {
    let playground = Playground::new(None);
    assert!(playground.match_all(s("{ a }"), s(""), s("")).is_null());

    let result = playground.init(s(""), js(&json!([{"id": "t1", "source": "query { a { b } }"}])));
    assert!(result.is_null());
    assert!(playground.is_active());

    let outcome = playground.match_all(s("{ a { b } }"), s(""), s(""));
    assert_eq!(rust(outcome), json!({"matched": ["t1"]}));
}

#[wasm_bindgen_test]
fn template_errors_are_plain_objects() {
    let playground = Playground::new(None);
    let result = playground.init(
        s(""),
        js(&json!([{"id": "t1", "source": "<invalid syntax>"}])),
    );
    assert_eq!(
        rust(result),
        json!({"code": "TEMPLATE_ERR", "errors": {"t1": ["1:1: unexpected character '<'"]}})
    );
    assert!(!playground.is_active());
}

#[wasm_bindgen_test]
fn malformed_templates_are_marshal_errors() {
    let playground = Playground::new(None);

    let result = playground.init(s(""), s("not an array"));
    assert_eq!(rust(result)["code"], "MARSHAL_ERR");

    let result = playground.init(s(""), js(&json!([{"id": "t1"}])));
    assert_eq!(rust(result)["code"], "MARSHAL_ERR");

    let result = playground.init(JsValue::from_f64(1.0), js(&json!([])));
    assert_eq!(rust(result)["code"], "MARSHAL_ERR");

    assert!(!playground.is_active());
}

#[wasm_bindgen_test]
fn parse_operation_lists_operations() {
    let playground = Playground::new(None);
    let result = playground.parse_operation(s("query A { a } mutation B { b }"));
    assert_eq!(
        rust(result),
        json!({"operations": [
            {"name": "A", "type": "Query", "index": 0},
            {"name": "B", "type": "Mutation", "index": 14},
        ]})
    );

    let result = playground.parse_operation(s("query A {"));
    assert_eq!(rust(result)["code"], "PARSE_OPR");
}

#[wasm_bindgen_test]
fn faults_reach_the_callback() {
    let callback = js_sys::Function::new_with_args("detail", "globalThis.__lastFault = detail;");
    JsFaultSink::new(Some(callback)).report(Fault {
        error: "boom".into(),
        stack_trace: "at lib.rs:1:1".into(),
    });

    let detail = js_sys::Reflect::get(&js_sys::global(), &s("__lastFault")).unwrap();
    assert_eq!(
        rust(detail),
        json!({"error": "boom", "stackTrace": "at lib.rs:1:1"})
    );
}

#[wasm_bindgen_test]
fn calls_succeed_after_a_fault() {
    let callback = js_sys::Function::new_with_args(
        "detail",
        "globalThis.__faultCount = (globalThis.__faultCount || 0) + 1;",
    );
    let playground = JsValue::from(Playground::new(Some(callback)));
    let call = |method: &str, args: &[JsValue]| -> Result<JsValue, JsValue> {
        let function: js_sys::Function =
            js_sys::Reflect::get(&playground, &s(method))?.dyn_into()?;
        function.apply(&playground, &args.iter().collect::<js_sys::Array>())
    };

    // Returns undefined when panics unwind, throws when they abort.
    let _ = call("raiseFault", &[]);
    let count = js_sys::Reflect::get(&js_sys::global(), &s("__faultCount")).unwrap();
    assert_eq!(count.as_f64(), Some(1.0));

    let templates = js(&json!([{"id": "t1", "source": "query { a }"}]));
    assert!(call("init", &[s(""), templates]).unwrap().is_null());
    let outcome = call("matchAll", &[s("{ a }"), s(""), s("")]).unwrap();
    assert_eq!(rust(outcome), json!({"matched": ["t1"]}));
    assert_eq!(call("isActive", &[]).unwrap(), JsValue::TRUE);
}
