// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-agnostic trait definitions for bridge modules.
//
// A host runtime never discovers modules by introspection.  Packages hand
// their modules to the `ModuleRegistry` at startup, and script calls are
// routed by module name and method name through `BridgeModule::invoke`.

use std::sync::Arc;

use serde_json::Value;

use fileuploader_core::error::Result;

use crate::context::BridgeContext;

/// Node-style completion callback: `(error, result)`.
///
/// Exactly one of the two arguments is `Some`, and the callback is invoked
/// exactly once per call.
pub type Callback = Box<dyn FnOnce(Option<String>, Option<Value>) + Send + 'static>;

/// A native object that script code can call into.
pub trait BridgeModule: Send + Sync {
    /// Name script code uses to address the module (e.g. "FileUploader").
    fn name(&self) -> &str;

    /// Methods callable through [`BridgeModule::invoke`].
    fn method_names(&self) -> &[&'static str];

    /// Invoke `method` with positional `args`.
    ///
    /// Returns `Err` only when the call cannot be dispatched at all (unknown
    /// method, wrong arity).  In that case `callback` has not been and will
    /// not be called.  Once dispatched, the outcome is reported through
    /// `callback`.
    fn invoke(&self, method: &str, args: Vec<Value>, callback: Callback) -> Result<()>;
}

/// Receives named events from native code (progress, state changes).
pub trait EventEmitter: Send + Sync {
    fn emit(&self, event: &str, body: Value);
}

/// A bundle of modules contributed to the registry at startup.
pub trait ModulePackage {
    /// Create the native modules this package provides.
    fn create_native_modules(&self, ctx: &BridgeContext) -> Result<Vec<Arc<dyn BridgeModule>>>;
}
