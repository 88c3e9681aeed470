//! The JS fault channel.

use gqtmatch::{Fault, FaultSink};
use js_sys::{Array, Function, Object, Reflect};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use crate::convert;

/// Delivers faults to a JS callback, or as a `panic` event.
///
/// With a callback, the fault's `{error, stackTrace}` object is passed to
/// it. Without one, a `CustomEvent("panic", {detail})` is dispatched on the
/// global object.
pub struct JsFaultSink {
    callback: Option<Function>,
}

impl JsFaultSink {
    #[must_use]
    pub fn new(callback: Option<Function>) -> Self {
        Self { callback }
    }
}

impl FaultSink for JsFaultSink {
    fn report(&self, fault: Fault) {
        let detail = convert::to_js(&fault);
        let delivered = match &self.callback {
            Some(callback) => callback.call1(&JsValue::NULL, &detail).map(drop),
            None => dispatch_panic_event(&detail),
        };
        // A throwing listener leaves nowhere else to report to.
        drop(delivered);
    }
}

fn dispatch_panic_event(detail: &JsValue) -> Result<(), JsValue> {
    let global = js_sys::global();

    let constructor: Function =
        Reflect::get(&global, &JsValue::from_str("CustomEvent"))?.dyn_into()?;
    let init = Object::new();
    Reflect::set(&init, &JsValue::from_str("detail"), detail)?;
    let event = Reflect::construct(&constructor, &Array::of2(&JsValue::from_str("panic"), &init))?;

    let dispatch: Function = Reflect::get(&global, &JsValue::from_str("dispatchEvent"))?.dyn_into()?;
    dispatch.call1(&global, &event)?;
    Ok(())
}
