// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for upload failures.
//
// Every technical error is mapped to plain English with a clear suggestion.
// The taxonomy uses three severity levels that drive presentation.

use crate::error::UploaderError;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Timeouts and busy servers; trying again may work.
    Transient,
    /// User must do something (pick another file, fix the address).
    ActionRequired,
    /// Cannot be fixed by retrying: a programming or integration error.
    Permanent,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary.
    pub message: String,
    /// What the user should try.
    pub suggestion: String,
    /// Whether trying again could help.
    pub retriable: bool,
    pub severity: Severity,
}

/// Convert an `UploaderError` into a `HumanError`.
pub fn humanize_error(err: &UploaderError) -> HumanError {
    match err {
        UploaderError::InvalidSettings(detail) => HumanError {
            message: "The upload request is incomplete.".into(),
            suggestion: format!("Check the upload settings and try again. ({detail})"),
            retriable: false,
            severity: Severity::Permanent,
        },

        UploaderError::UnsupportedSource(uri) => HumanError {
            message: "That file can't be opened for upload.".into(),
            suggestion: format!("Choose the file again; \"{uri}\" is not a readable file."),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        UploaderError::UnsupportedFieldType(kind) => HumanError {
            message: "Some extra upload information has the wrong type.".into(),
            suggestion: format!("Only text and numbers can be sent with a file, not {kind}."),
            retriable: false,
            severity: Severity::Permanent,
        },

        UploaderError::Http(detail) => humanize_transport_error(detail),

        UploaderError::HttpStatus { status, .. } => humanize_status(*status),

        UploaderError::Io(io_err) => match io_err.kind() {
            std::io::ErrorKind::NotFound => HumanError {
                message: "The file couldn't be found.".into(),
                suggestion: "It may have been moved or deleted. Try choosing the file again.".into(),
                retriable: false,
                severity: Severity::ActionRequired,
            },
            std::io::ErrorKind::PermissionDenied => HumanError {
                message: "The app doesn't have permission to read that file.".into(),
                suggestion: "Check the file permissions, or copy the file somewhere else first.".into(),
                retriable: false,
                severity: Severity::ActionRequired,
            },
            std::io::ErrorKind::UnexpectedEof => HumanError {
                message: "The file changed while it was being uploaded.".into(),
                suggestion: "Wait until the file is finished saving, then upload it again.".into(),
                retriable: true,
                severity: Severity::Transient,
            },
            _ => HumanError {
                message: "There was a problem reading the file.".into(),
                suggestion: "Try again. If this keeps happening, the storage may be damaged.".into(),
                retriable: true,
                severity: Severity::Transient,
            },
        },

        UploaderError::Serialization(_) => HumanError {
            message: "The upload had an internal data problem.".into(),
            suggestion: "Try again. If this keeps happening, please report it.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        UploaderError::Reported(detail) => HumanError {
            message: "The upload failed.".into(),
            suggestion: format!("Try again. (Detail: {detail})"),
            retriable: true,
            severity: Severity::Transient,
        },

        UploaderError::Bridge(_)
        | UploaderError::UnknownModule(_)
        | UploaderError::UnknownMethod { .. } => HumanError {
            message: "The uploader isn't set up correctly.".into(),
            suggestion: "The app needs to register the FileUploader module before using it.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },
    }
}

/// Convert a failure message delivered through a bridge callback.
pub fn humanize_message(message: &str) -> HumanError {
    humanize_error(&UploaderError::from_message(message))
}

/// Parse transport error details into human-readable messages.
fn humanize_transport_error(detail: &str) -> HumanError {
    let lower = detail.to_ascii_lowercase();

    if lower.contains("timed out") || lower.contains("timeout") {
        HumanError {
            message: "The server didn't respond in time.".into(),
            suggestion: "Check your connection, then try again.".into(),
            retriable: true,
            severity: Severity::Transient,
        }
    } else if lower.contains("connection refused") || lower.contains("connect") {
        HumanError {
            message: "We couldn't reach the upload server.".into(),
            suggestion: "Make sure you're online and the server address is right.".into(),
            retriable: true,
            severity: Severity::Transient,
        }
    } else if lower.contains("invalid url") || lower.contains("builder error") {
        HumanError {
            message: "The upload address doesn't look right.".into(),
            suggestion: "Check the upload URL. It should look like https://example.com/upload.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        }
    } else {
        HumanError {
            message: "The upload was interrupted.".into(),
            suggestion: format!("Try again. (Detail: {detail})"),
            retriable: true,
            severity: Severity::Transient,
        }
    }
}

fn humanize_status(status: u16) -> HumanError {
    match status {
        401 | 403 => HumanError {
            message: "The server refused the upload.".into(),
            suggestion: "You may need to sign in again before uploading.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },
        413 => HumanError {
            message: "The file is too large for this server.".into(),
            suggestion: "Try a smaller file, or reduce the file's quality first.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },
        429 | 500..=599 => HumanError {
            message: "The server is having trouble right now.".into(),
            suggestion: format!("Wait a moment and try again. (Status {status})"),
            retriable: true,
            severity: Severity::Transient,
        },
        _ => HumanError {
            message: "The server rejected the upload.".into(),
            suggestion: format!("Check the upload settings. (Status {status})"),
            retriable: false,
            severity: Severity::Permanent,
        },
    }
}
