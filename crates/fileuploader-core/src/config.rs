// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Uploader configuration.

use serde::{Deserialize, Serialize};

/// Default chunk size for streaming file bytes (128 KiB).
pub const DEFAULT_CHUNK_SIZE: usize = 128 * 1024;

/// Persistent uploader settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UploaderConfig {
    /// `User-Agent` header sent with every upload.
    pub user_agent: String,
    /// Maximum number of file bytes per body chunk (and per progress event).
    pub chunk_size: usize,
    /// TCP/TLS connect timeout.
    pub connect_timeout_secs: u64,
    /// Whole-request timeout. `None` lets large uploads run unbounded.
    pub request_timeout_secs: Option<u64>,
    /// HTTP method used when the settings omit `method`.
    pub default_method: String,
    /// Content type used when the settings omit `contentType`.
    pub default_content_type: String,
    /// Form field name used when the settings omit `fieldName`.
    pub default_field_name: String,
}

impl Default for UploaderConfig {
    fn default() -> Self {
        Self {
            user_agent: concat!("FileUploader/", env!("CARGO_PKG_VERSION"), " HTTP Client").into(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            connect_timeout_secs: 30,
            request_timeout_secs: None,
            default_method: "POST".into(),
            default_content_type: "application/octet-stream".into(),
            default_field_name: "file".into(),
        }
    }
}
