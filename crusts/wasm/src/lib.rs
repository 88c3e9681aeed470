//! gqtmatch-crust — TypeScript bindings for gqtmatch via `wasm-bindgen`.
//!
//! Exposes the host bridge to TypeScript as a `Playground` object.
//! Plain values in → compile and match in Rust → plain objects out.
//! Panics never cross into JS: they are reported on the fault channel and
//! the call returns `null`.

mod convert;
mod fault;
mod playground;

pub use fault::JsFaultSink;
pub use playground::Playground;
