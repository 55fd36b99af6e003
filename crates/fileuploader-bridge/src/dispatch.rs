// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Script-facing upload dispatcher.
//
// Mirrors what the script wrapper around `FileUploader` does: it keeps one
// progress callback per file `uri`, listens for `fileUploadProgress` events
// and routes each to the matching callback, and forgets the `uri` once the
// module reports completion.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use serde_json::Value;
use tracing::{debug, warn};

use fileuploader_core::error::{Result, UploaderError};
use fileuploader_core::types::{MODULE_NAME, PROGRESS_EVENT, ProgressEvent};

use crate::events::{DeviceEventEmitter, ListenerId};
use crate::registry::ModuleRegistry;
use crate::traits::Callback;

/// Receives `(sent, expected_to_send)` for one upload.
pub type ProgressCallback = Box<dyn Fn(u64, u64) + Send + Sync>;

type PendingMap = HashMap<String, Option<Arc<dyn Fn(u64, u64) + Send + Sync>>>;

/// Routes uploads through the registry and progress events back to callers.
pub struct UploadDispatcher {
    registry: Arc<ModuleRegistry>,
    emitter: Arc<DeviceEventEmitter>,
    pending: Arc<Mutex<PendingMap>>,
    listener: ListenerId,
}

impl UploadDispatcher {
    /// Attach to `emitter`, which must be the emitter the registry's modules
    /// were created with.
    pub fn new(registry: Arc<ModuleRegistry>, emitter: Arc<DeviceEventEmitter>) -> Self {
        let pending: Arc<Mutex<PendingMap>> = Arc::default();

        let routes = Arc::clone(&pending);
        let listener = emitter.add_listener(PROGRESS_EVENT, move |body| {
            route_progress(&routes, body);
        });

        Self {
            registry,
            emitter,
            pending,
            listener,
        }
    }

    /// `FileUploader.upload(settings, callback, progress)`.
    ///
    /// Fails immediately if `settings.uri` is missing or already uploading;
    /// otherwise the outcome arrives through `callback`.
    pub fn upload(
        &self,
        settings: Value,
        callback: Callback,
        progress: Option<ProgressCallback>,
    ) -> Result<()> {
        let uri = settings
            .get("uri")
            .and_then(Value::as_str)
            .ok_or_else(|| UploaderError::InvalidSettings("missing field `uri`".into()))?
            .to_owned();

        {
            let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
            if pending.contains_key(&uri) {
                return Err(UploaderError::InvalidSettings(format!(
                    "an upload of {uri} is already in progress"
                )));
            }
            pending.insert(uri.clone(), progress.map(Arc::from));
        }

        let done = Arc::clone(&self.pending);
        let done_uri = uri.clone();
        let wrapped: Callback = Box::new(move |err, res| {
            done.lock()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(&done_uri);
            callback(err, res);
        });

        debug!(uri = %uri, "dispatching upload");
        if let Err(e) = self
            .registry
            .invoke(MODULE_NAME, "upload", vec![settings], wrapped)
        {
            self.pending
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(&uri);
            return Err(e);
        }
        Ok(())
    }

    /// Number of uploads that have not completed yet.
    pub fn in_flight(&self) -> usize {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

impl Drop for UploadDispatcher {
    fn drop(&mut self) {
        self.emitter.remove_listener(self.listener);
    }
}

fn route_progress(pending: &Mutex<PendingMap>, body: &Value) {
    let event: ProgressEvent = match serde_json::from_value(body.clone()) {
        Ok(event) => event,
        Err(e) => {
            warn!(error = %e, "malformed progress event ignored");
            return;
        }
    };

    // Call outside the lock so the callback may start another upload.
    let callback = pending
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&event.uri)
        .cloned()
        .flatten();
    if let Some(callback) = callback {
        callback(event.sent, event.expected_to_send);
    }
}
