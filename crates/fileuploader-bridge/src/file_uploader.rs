// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The `FileUploader` bridge module.
//
// Script code calls `FileUploader.upload(settings, callback)`.  The upload
// runs on the bridge's Tokio runtime; progress is pushed through the event
// emitter as `fileUploadProgress` and the outcome is delivered through the
// node-style callback, exactly once.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Local;
use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use fileuploader_core::error::{Result, UploaderError};
use fileuploader_core::types::{
    MODULE_NAME, PROGRESS_EVENT, ProgressEvent, UploadRequest, UploadResponse, UploadSettings,
};
use fileuploader_core::UploaderConfig;
use fileuploader_transfer::{ProgressListener, UploadClient, resolve_source};

use crate::context::BridgeContext;
use crate::traits::{BridgeModule, Callback, EventEmitter, ModulePackage};

/// Methods exposed to script code.
const METHODS: &[&str] = &["upload"];

/// Forwards transfer progress to the event emitter.
struct EmitterProgress {
    emitter: Arc<dyn EventEmitter>,
}

impl ProgressListener for EmitterProgress {
    fn transferred(&self, file_ref: &str, sent: u64, total: u64) {
        let event = ProgressEvent {
            uri: file_ref.to_owned(),
            sent,
            expected_to_send: total,
        };
        self.emitter.emit(PROGRESS_EVENT, event.to_value());
    }
}

/// Native side of `FileUploader`.
pub struct FileUploaderModule {
    client: Arc<UploadClient>,
    emitter: Arc<dyn EventEmitter>,
    config: UploaderConfig,
    runtime: tokio::runtime::Handle,
}

impl FileUploaderModule {
    pub fn new(ctx: &BridgeContext) -> Result<Self> {
        Ok(Self {
            client: Arc::new(UploadClient::new(ctx.config())?),
            emitter: ctx.emitter(),
            config: ctx.config().clone(),
            runtime: ctx.runtime().clone(),
        })
    }

    /// Start an upload in the background and report through `callback`.
    pub fn upload(&self, settings: Value, callback: Callback) -> JoinHandle<()> {
        let client = Arc::clone(&self.client);
        let emitter = Arc::clone(&self.emitter);
        let config = self.config.clone();

        self.runtime.spawn(async move {
            match perform_upload(&client, emitter, &config, settings).await {
                Ok(response) => match serde_json::to_value(&response) {
                    Ok(result) => callback(None, Some(result)),
                    Err(e) => callback(Some(UploaderError::from(e).to_string()), None),
                },
                Err(e) => {
                    error!(error = %e, "upload failed");
                    callback(Some(e.to_string()), None)
                }
            }
        })
    }
}

/// Parse, resolve, and run one upload.
async fn perform_upload(
    client: &UploadClient,
    emitter: Arc<dyn EventEmitter>,
    config: &UploaderConfig,
    settings: Value,
) -> Result<UploadResponse> {
    let settings = UploadSettings::from_value(settings)?;
    let request: UploadRequest = settings.resolve(config, Local::now().naive_local())?;
    let path: PathBuf = resolve_source(&request.uri)?;

    info!(uri = %request.uri, url = %request.upload_url, "upload requested");
    let listener: Arc<dyn ProgressListener> = Arc::new(EmitterProgress { emitter });
    client.upload(&request, &path, listener).await
}

impl BridgeModule for FileUploaderModule {
    fn name(&self) -> &str {
        MODULE_NAME
    }

    fn method_names(&self) -> &[&'static str] {
        METHODS
    }

    fn invoke(&self, method: &str, args: Vec<Value>, callback: Callback) -> Result<()> {
        match method {
            "upload" => {
                let mut args = args.into_iter();
                let settings = match (args.next(), args.next()) {
                    (Some(settings), None) => settings,
                    _ => {
                        warn!("upload called with wrong number of arguments");
                        return Err(UploaderError::Bridge(
                            "upload expects exactly one settings argument".into(),
                        ));
                    }
                };
                // Completion is observed through the callback.
                drop(self.upload(settings, callback));
                Ok(())
            }
            other => Err(UploaderError::UnknownMethod {
                module: MODULE_NAME.into(),
                method: other.into(),
            }),
        }
    }
}

/// Package contributing the `FileUploader` module. Provides no script
/// modules or views of its own.
pub struct FileUploaderPackage;

impl ModulePackage for FileUploaderPackage {
    fn create_native_modules(&self, ctx: &BridgeContext) -> Result<Vec<Arc<dyn BridgeModule>>> {
        Ok(vec![Arc::new(FileUploaderModule::new(ctx)?)])
    }
}
