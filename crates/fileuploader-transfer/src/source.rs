// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Resolution of the `uri` setting to a local file path.
//
// Script code hands us whatever reference its image/document picker produced:
// a `file:` URI, a `content:` URI whose path component points at the backing
// file, or a plain path.  Anything else cannot be read and is rejected.

use std::path::{Path, PathBuf};

use tracing::debug;
use url::Url;

use fileuploader_core::error::{Result, UploaderError};

/// Resolve a file reference to a readable path.
pub fn resolve_source(uri: &str) -> Result<PathBuf> {
    if uri.starts_with("file:") || uri.starts_with("content:") {
        let path = uri_path(uri).ok_or_else(|| UploaderError::UnsupportedSource(uri.to_owned()))?;
        debug!(uri, path = %path.display(), "resolved URI source");
        return Ok(path);
    }

    let path = Path::new(uri);
    if path.exists() {
        debug!(uri, "using plain path source");
        Ok(path.to_path_buf())
    } else {
        Err(UploaderError::UnsupportedSource(uri.to_owned()))
    }
}

/// Extract the (percent-decoded) path component of a `file:` or `content:`
/// URI.
fn uri_path(uri: &str) -> Option<PathBuf> {
    let parsed = Url::parse(uri).ok()?;
    if parsed.path().is_empty() {
        return None;
    }
    if parsed.scheme() == "file" {
        if let Ok(path) = parsed.to_file_path() {
            return Some(path);
        }
    }

    // Re-root the path under a local file URL so decoding follows the same
    // rules as `file:` URIs.
    let local = Url::parse("file:///").ok()?.join(parsed.path()).ok()?;
    local.to_file_path().ok()
}
