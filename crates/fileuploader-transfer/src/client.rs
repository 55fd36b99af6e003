// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Async HTTP upload client.
//
// Sends one file as a multipart/form-data request:
//   - the multipart preamble and epilogue are built up front,
//   - the file bytes are streamed from disk in between,
//   - `Content-Length` is computed exactly so servers see a fixed-size body.
// Progress is reported per chunk through a `ProgressListener`.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use futures::{StreamExt, stream};
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE, USER_AGENT};
use reqwest::{Body, Method};
use tracing::{debug, error, info, instrument};

use fileuploader_core::config::UploaderConfig;
use fileuploader_core::error::{Result, UploaderError};
use fileuploader_core::types::{UploadRequest, UploadResponse};

use crate::multipart::MultipartForm;
use crate::progress::{ProgressListener, counting_stream};

/// Async multipart upload client wrapping a pooled `reqwest::Client`.
///
/// One instance can serve any number of concurrent uploads; all methods
/// require a Tokio runtime.
pub struct UploadClient {
    http: reqwest::Client,
    user_agent: String,
    chunk_size: usize,
}

impl UploadClient {
    /// Build a client from the uploader configuration.
    pub fn new(config: &UploaderConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs));
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder
            .build()
            .map_err(|e| UploaderError::Http(format!("client setup: {e}")))?;

        Ok(Self {
            http,
            user_agent: config.user_agent.clone(),
            chunk_size: config.chunk_size,
        })
    }

    /// Upload the file at `path` as described by `request`.
    ///
    /// Returns the response body and status.  Statuses of 400 and above are
    /// returned as [`UploaderError::HttpStatus`].
    #[instrument(
        skip(self, request, path, listener),
        fields(url = %request.upload_url, method = %request.method, uri = %request.uri)
    )]
    pub async fn upload(
        &self,
        request: &UploadRequest,
        path: &Path,
        listener: Arc<dyn ProgressListener>,
    ) -> Result<UploadResponse> {
        let method = Method::from_bytes(request.method.as_bytes()).map_err(|_| {
            UploaderError::InvalidSettings(format!("invalid HTTP method '{}'", request.method))
        })?;

        let file = tokio::fs::File::open(path).await?;
        let file_len = file.metadata().await?.len();

        let form = MultipartForm::for_request(request);
        let content_length = form.content_length(file_len);

        let body = stream::iter([Ok(form.preamble())])
            .chain(counting_stream(
                file,
                file_len,
                request.uri.clone(),
                listener,
                self.chunk_size,
            ))
            .chain(stream::iter([Ok(form.epilogue())]));

        info!(
            path = %path.display(),
            file_len,
            content_length,
            "starting upload"
        );

        let response = self
            .http
            .request(method, &request.upload_url)
            .header(USER_AGENT, &self.user_agent)
            .header(CONTENT_TYPE, form.content_type_header())
            .header(CONTENT_LENGTH, content_length)
            .body(Body::wrap_stream(body))
            .send()
            .await
            .map_err(|e| UploaderError::Http(describe_reqwest_error(&e)))?;

        let status = response.status().as_u16();
        // Passed through untouched, line breaks included.
        let data = response
            .text()
            .await
            .map_err(|e| UploaderError::Http(format!("reading response body: {e}")))?;

        if status >= 400 {
            error!(status, "upload rejected by server");
            return Err(UploaderError::HttpStatus { status, body: data });
        }

        debug!(body_len = data.len(), "received response body");
        info!(status, "upload finished");
        Ok(UploadResponse { data, status })
    }
}

/// Flatten a reqwest error and its sources into one line so the message
/// survives being passed across the bridge as a string.
fn describe_reqwest_error(err: &reqwest::Error) -> String {
    let mut message = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    if err.is_timeout() && !message.contains("timed out") {
        message.push_str(" (timed out)");
    }
    message
}
