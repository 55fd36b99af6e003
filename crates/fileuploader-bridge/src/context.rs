// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Shared state handed to every package when its modules are created.

use std::sync::Arc;

use tokio::runtime::Handle;

use fileuploader_core::UploaderConfig;
use fileuploader_core::error::{Result, UploaderError};

use crate::traits::EventEmitter;

/// Runtime handle, event sink, and configuration shared by all modules.
///
/// Cheap to clone; every field is reference counted.
#[derive(Clone)]
pub struct BridgeContext {
    runtime: Handle,
    emitter: Arc<dyn EventEmitter>,
    config: Arc<UploaderConfig>,
}

impl BridgeContext {
    pub fn new(runtime: Handle, emitter: Arc<dyn EventEmitter>, config: UploaderConfig) -> Self {
        Self {
            runtime,
            emitter,
            config: Arc::new(config),
        }
    }

    /// Build a context on the Tokio runtime the caller is running inside.
    pub fn current(emitter: Arc<dyn EventEmitter>, config: UploaderConfig) -> Result<Self> {
        let runtime = Handle::try_current()
            .map_err(|e| UploaderError::Bridge(format!("no Tokio runtime available: {e}")))?;
        Ok(Self::new(runtime, emitter, config))
    }

    /// Handle used to spawn background work off the calling thread.
    pub fn runtime(&self) -> &Handle {
        &self.runtime
    }

    pub fn emitter(&self) -> Arc<dyn EventEmitter> {
        Arc::clone(&self.emitter)
    }

    pub fn config(&self) -> &UploaderConfig {
        &self.config
    }
}
