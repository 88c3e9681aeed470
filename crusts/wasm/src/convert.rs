//! Conversion between JS values and gqtmatch types.
//!
//! All validation happens at the FFI boundary. A value of the wrong shape
//! becomes a `MARSHAL_ERR` report, never a thrown exception or a panic.

use gqtmatch::{ErrorReport, TemplateSource, MAX_TEMPLATES};
use serde::Serialize;
use wasm_bindgen::prelude::*;

/// Convert the `templates` argument of `init`.
///
/// Accepts an array of plain objects:
/// ```js
/// [{ id: "t1", source: "query { a }" }]
/// ```
pub fn templates_from_js(value: &JsValue) -> Result<Vec<TemplateSource>, ErrorReport> {
    if !js_sys::Array::is_array(value) {
        return Err(ErrorReport::marshal(
            "templates must be an array of {id, source} objects",
        ));
    }

    let array = js_sys::Array::from(value);
    let length = array.length() as usize;
    if length > MAX_TEMPLATES {
        return Err(ErrorReport::marshal(format!(
            "{length} templates supplied, but maximum allowed is {MAX_TEMPLATES}"
        )));
    }

    array
        .iter()
        .enumerate()
        .map(|(index, item)| {
            serde_wasm_bindgen::from_value::<TemplateSource>(item)
                .map_err(|e| ErrorReport::marshal(format!("template at index {index}: {e}")))
        })
        .collect()
}

/// Read a string argument; `undefined` and `null` read as empty.
pub fn string_arg(value: &JsValue, name: &str) -> Result<String, String> {
    if value.is_undefined() || value.is_null() {
        return Ok(String::new());
    }
    value
        .as_string()
        .ok_or_else(|| format!("{name} must be a string"))
}

/// Serialize a result for JS, with maps as plain objects.
///
/// A value that fails to serialize is replaced by a `MARSHAL_ERR` report.
pub fn to_js<T: Serialize + ?Sized>(value: &T) -> JsValue {
    let serializer = serde_wasm_bindgen::Serializer::new().serialize_maps_as_objects(true);
    value.serialize(&serializer).unwrap_or_else(|e| {
        ErrorReport::marshal(e.to_string())
            .serialize(&serializer)
            .unwrap_or(JsValue::NULL)
    })
}

/// Like [`to_js`], with `None` as `null`.
pub fn option_to_js<T: Serialize>(value: Option<&T>) -> JsValue {
    value.map_or(JsValue::NULL, to_js)
}
