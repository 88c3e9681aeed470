//! `FaultBoundary` — contains panics raised inside host entry points.
//!
//! A guarded call that panics returns `None` to its caller. The panic is
//! turned into a [`Fault`] (message plus stack trace) and delivered to the
//! boundary's [`FaultSink`], out of band.
//!
//! ```text
//! guard(entry, f)
//!   ├─ push sink on the thread's guard stack
//!   ├─ catch_unwind(f)
//!   │     └─ panic ─► hook: capture Fault (unwind builds)
//!   │                       or report it directly (abort builds)
//!   ├─ pop sink
//!   └─ Err ─► sink.report(fault) ─► None
//! ```
//!
//! The process panic hook is installed once and only acts for panics raised
//! under a guard on the current thread; every other panic goes to the hook
//! that was installed before it.

use serde::Serialize;
use std::any::Any;
use std::backtrace::Backtrace;
use std::cell::RefCell;
use std::fmt;
use std::panic::{self, AssertUnwindSafe, PanicHookInfo};
use std::rc::Rc;
use std::sync::Once;

/// Diagnostic for one contained panic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Fault {
    pub error: String,
    pub stack_trace: String,
}

impl Fault {
    fn from_hook(info: &PanicHookInfo<'_>) -> Self {
        let location = info
            .location()
            .map(|l| format!("at {}:{}:{}\n", l.file(), l.line(), l.column()))
            .unwrap_or_default();
        Self {
            error: payload_message(info.payload()),
            stack_trace: format!("{location}{}", Backtrace::force_capture()),
        }
    }

    fn from_payload(payload: &(dyn Any + Send)) -> Self {
        Self {
            error: payload_message(payload),
            stack_trace: String::new(),
        }
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.error)
    }
}

fn payload_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// Receives contained faults.
pub trait FaultSink {
    fn report(&self, fault: Fault);
}

impl<F: Fn(Fault)> FaultSink for F {
    fn report(&self, fault: Fault) {
        self(fault);
    }
}

/// Logs faults with `tracing::error!`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingFaultSink;

impl FaultSink for TracingFaultSink {
    fn report(&self, fault: Fault) {
        tracing::error!(error = %fault.error, stack_trace = %fault.stack_trace, "internal fault");
    }
}

thread_local! {
    static GUARDS: RefCell<Vec<Rc<dyn FaultSink>>> = const { RefCell::new(Vec::new()) };
    static CAPTURED: RefCell<Option<Fault>> = const { RefCell::new(None) };
}

static HOOK: Once = Once::new();

fn install_hook() {
    HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            let sink = GUARDS.with(|guards| guards.borrow().last().cloned());
            let Some(sink) = sink else {
                previous(info);
                return;
            };
            let fault = Fault::from_hook(info);
            if cfg!(panic = "unwind") {
                CAPTURED.with(|captured| *captured.borrow_mut() = Some(fault));
            } else {
                sink.report(fault);
            }
        }));
    });
}

/// Runs entry points so that a panic becomes a [`Fault`] instead of
/// escaping to the host.
#[derive(Clone)]
pub struct FaultBoundary {
    sink: Rc<dyn FaultSink>,
}

impl FaultBoundary {
    pub fn new(sink: impl FaultSink + 'static) -> Self {
        Self::shared(Rc::new(sink))
    }

    #[must_use]
    pub fn shared(sink: Rc<dyn FaultSink>) -> Self {
        install_hook();
        Self { sink }
    }

    /// Run `f`, returning `None` and reporting exactly one fault if it
    /// panics.
    pub fn guard<T>(&self, entry: &'static str, f: impl FnOnce() -> T) -> Option<T> {
        GUARDS.with(|guards| guards.borrow_mut().push(Rc::clone(&self.sink)));
        let result = panic::catch_unwind(AssertUnwindSafe(f));
        GUARDS.with(|guards| {
            guards.borrow_mut().pop();
        });

        match result {
            Ok(value) => Some(value),
            Err(payload) => {
                let fault = CAPTURED
                    .with(|captured| captured.borrow_mut().take())
                    .unwrap_or_else(|| Fault::from_payload(payload.as_ref()));
                tracing::error!(entry, error = %fault.error, "fault contained");
                self.sink.report(fault);
                None
            }
        }
    }
}

impl Default for FaultBoundary {
    fn default() -> Self {
        Self::new(TracingFaultSink)
    }
}

impl fmt::Debug for FaultBoundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FaultBoundary").finish_non_exhaustive()
    }
}
