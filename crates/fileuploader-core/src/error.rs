// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for FileUploader.

use thiserror::Error;

/// Top-level error type for all FileUploader operations.
///
/// Errors cross the bridge as their `Display` string, so the messages below
/// are what script code sees in the first callback argument.
#[derive(Debug, Error)]
pub enum UploaderError {
    // -- Settings errors --
    #[error("invalid upload settings: {0}")]
    InvalidSettings(String),

    #[error("Can't handle {0}")]
    UnsupportedSource(String),

    #[error("{0} type not supported.")]
    UnsupportedFieldType(String),

    // -- Transfer errors --
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("server responded with status {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // -- Bridge errors --
    #[error("bridge error: {0}")]
    Bridge(String),

    #[error("no bridge module named '{0}' is registered")]
    UnknownModule(String),

    #[error("module '{module}' has no method '{method}'")]
    UnknownMethod { module: String, method: String },

    /// A failure reported through a callback whose message matches none of
    /// the formats above.
    #[error("{0}")]
    Reported(String),
}

impl UploaderError {
    /// Rebuild an error from the message a callback delivered.
    ///
    /// The inverse of `Display` for every variant a running upload can fail
    /// with. I/O errors keep their kind when the message carries an OS error
    /// code; unrecognised text becomes [`UploaderError::Reported`].
    pub fn from_message(message: &str) -> Self {
        if let Some(uri) = message.strip_prefix("Can't handle ") {
            return Self::UnsupportedSource(uri.to_owned());
        }
        if let Some(kind) = message.strip_suffix(" type not supported.") {
            return Self::UnsupportedFieldType(kind.to_owned());
        }
        if let Some(detail) = message.strip_prefix("invalid upload settings: ") {
            return Self::InvalidSettings(detail.to_owned());
        }
        if let Some(detail) = message.strip_prefix("HTTP request failed: ") {
            return Self::Http(detail.to_owned());
        }
        if let Some(rest) = message.strip_prefix("server responded with status ") {
            if let Some((code, body)) = rest.split_once(": ") {
                if let Ok(status) = code.parse() {
                    return Self::HttpStatus {
                        status,
                        body: body.to_owned(),
                    };
                }
            }
        }
        if let Some(detail) = message.strip_prefix("file I/O error: ") {
            return Self::Io(io_error_from_detail(detail));
        }
        if let Some(detail) = message.strip_prefix("serialization error: ") {
            return Self::Reported(format!("serialization error: {detail}"));
        }
        if let Some(detail) = message.strip_prefix("bridge error: ") {
            return Self::Bridge(detail.to_owned());
        }
        Self::Reported(message.to_owned())
    }
}

/// `"No such file or directory (os error 2)"` -> `NotFound`.
fn io_error_from_detail(detail: &str) -> std::io::Error {
    let code = detail
        .rsplit_once("(os error ")
        .and_then(|(_, tail)| tail.strip_suffix(')'))
        .and_then(|code| code.parse::<i32>().ok());
    match code {
        Some(code) => std::io::Error::from_raw_os_error(code),
        None if detail.starts_with("file ended after") => {
            std::io::Error::new(std::io::ErrorKind::UnexpectedEof, detail.to_owned())
        }
        None => std::io::Error::other(detail.to_owned()),
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, UploaderError>;
