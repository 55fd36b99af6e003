// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// FileUploader — bridge-module contract and the uploader module.
//
// The host registers packages with a `ModuleRegistry` at process startup;
// script calls are then routed to modules by name.  Native modules report
// asynchronous results through node-style callbacks and push intermediate
// state (upload progress) through an `EventEmitter`.

pub mod context;
pub mod dispatch;
pub mod events;
pub mod file_uploader;
pub mod registry;
pub mod traits;

use fileuploader_core::error::Result;

pub use context::BridgeContext;
pub use dispatch::UploadDispatcher;
pub use events::{DeviceEventEmitter, LogEmitter};
pub use file_uploader::{FileUploaderModule, FileUploaderPackage};
pub use registry::ModuleRegistry;

/// Build the registry with every package this crate ships.
///
/// Call once at startup, before any script call is routed.
pub fn default_registry(ctx: &BridgeContext) -> Result<ModuleRegistry> {
    let mut registry = ModuleRegistry::new();
    registry.register_package(&FileUploaderPackage, ctx)?;
    Ok(registry)
}
