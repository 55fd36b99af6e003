// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for FileUploader: the settings map handed over by script
// code, the resolved upload request, the response, and progress events.

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Number, Value};

use crate::config::UploaderConfig;
use crate::error::{Result, UploaderError};

/// Name under which the uploader module is registered with the host.
pub const MODULE_NAME: &str = "FileUploader";

/// Event emitted for every chunk of file bytes handed to the transport.
pub const PROGRESS_EVENT: &str = "fileUploadProgress";

/// Settings map as passed from script code to `FileUploader.upload`.
///
/// Only `uri` and `uploadUrl` are required; everything else falls back to
/// the values in [`UploaderConfig`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadSettings {
    /// File reference: `file:` / `content:` URI or an existing path.
    pub uri: String,
    /// Target URL of the upload.
    pub upload_url: String,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub field_name: Option<String>,
    /// Extra form fields sent after the file part.
    #[serde(default)]
    pub data: Option<Map<String, Value>>,
}

impl UploadSettings {
    /// Parse a settings map received over the bridge.
    pub fn from_value(value: Value) -> Result<Self> {
        let settings: Self = serde_json::from_value(value)
            .map_err(|e| UploaderError::InvalidSettings(e.to_string()))?;
        if settings.uri.is_empty() {
            return Err(UploaderError::InvalidSettings("'uri' must not be empty".into()));
        }
        if settings.upload_url.is_empty() {
            return Err(UploaderError::InvalidSettings(
                "'uploadUrl' must not be empty".into(),
            ));
        }
        Ok(settings)
    }

    /// Apply defaults and validate the extra fields.
    ///
    /// `now` is used to derive a file name when none was given.
    pub fn resolve(&self, config: &UploaderConfig, now: NaiveDateTime) -> Result<UploadRequest> {
        let content_type = self
            .content_type
            .clone()
            .unwrap_or_else(|| config.default_content_type.clone());
        // Written into a part header as-is.
        if content_type.contains(['\r', '\n']) {
            return Err(UploaderError::InvalidSettings(
                "'contentType' must not contain line breaks".into(),
            ));
        }
        let file_name = self
            .file_name
            .clone()
            .unwrap_or_else(|| default_file_name(&content_type, now));

        let fields = match &self.data {
            Some(map) => map
                .iter()
                .map(|(key, value)| form_field(key, value))
                .collect::<Result<Vec<_>>>()?,
            None => Vec::new(),
        };

        Ok(UploadRequest {
            uri: self.uri.clone(),
            upload_url: self.upload_url.clone(),
            method: self
                .method
                .clone()
                .unwrap_or_else(|| config.default_method.clone()),
            content_type,
            file_name,
            field_name: self
                .field_name
                .clone()
                .unwrap_or_else(|| config.default_field_name.clone()),
            fields,
        })
    }
}

/// A plain-text form field sent after the file part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    pub name: String,
    pub value: String,
}

/// Fully resolved upload: every default applied, every field stringified.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// The original file reference, echoed in progress events.
    pub uri: String,
    pub upload_url: String,
    pub method: String,
    pub content_type: String,
    pub file_name: String,
    pub field_name: String,
    pub fields: Vec<FormField>,
}

/// Result handed to the success callback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResponse {
    /// Response body, verbatim. Line breaks are kept.
    pub data: String,
    /// HTTP status code.
    pub status: u16,
}

/// Body of a `fileUploadProgress` event.
///
/// The counters travel as decimal strings so that script runtimes without
/// 64-bit integers do not lose precision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressEvent {
    pub uri: String,
    #[serde(serialize_with = "counter_to_string", deserialize_with = "counter_from_any")]
    pub sent: u64,
    #[serde(serialize_with = "counter_to_string", deserialize_with = "counter_from_any")]
    pub expected_to_send: u64,
}

impl ProgressEvent {
    pub fn to_value(&self) -> Value {
        serde_json::json!({
            "uri": self.uri,
            "sent": self.sent.to_string(),
            "expectedToSend": self.expected_to_send.to_string(),
        })
    }
}

fn counter_to_string<S: Serializer>(value: &u64, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&value.to_string())
}

fn counter_from_any<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<u64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Counter {
        Text(String),
        Number(u64),
    }

    match Counter::deserialize(deserializer)? {
        Counter::Number(n) => Ok(n),
        Counter::Text(s) => s.parse().map_err(serde::de::Error::custom),
    }
}

/// Derive a file name from the local timestamp and the content type subtype,
/// e.g. `20260118093000.jpeg` for `image/jpeg`.
///
/// The hour is always 24-hour (`%H`), and a `.` always separates the stamp
/// from the subtype.
///
/// A content type that does not parse yields the bare timestamp.
pub fn default_file_name(content_type: &str, now: NaiveDateTime) -> String {
    let stamp = now.format("%Y%m%d%H%M%S");
    match content_type.parse::<mime::Mime>() {
        Ok(parsed) => match parsed.suffix() {
            Some(suffix) => format!("{stamp}.{}+{}", parsed.subtype(), suffix),
            None => format!("{stamp}.{}", parsed.subtype()),
        },
        Err(_) => stamp.to_string(),
    }
}

/// Stringify one `data` entry. Strings go through verbatim, numbers as their
/// integer part; anything else is rejected.
fn form_field(key: &str, value: &Value) -> Result<FormField> {
    let value = match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => integer_part(n),
        other => {
            return Err(UploaderError::UnsupportedFieldType(
                value_type_name(other).into(),
            ));
        }
    };
    Ok(FormField {
        name: key.to_owned(),
        value,
    })
}

fn integer_part(n: &Number) -> String {
    if let Some(i) = n.as_i64() {
        i.to_string()
    } else if let Some(u) = n.as_u64() {
        u.to_string()
    } else {
        // saturating cast
        (n.as_f64().unwrap_or_default().trunc() as i64).to_string()
    }
}

/// Type names as script code knows them.
fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "Null",
        Value::Bool(_) => "Boolean",
        Value::Number(_) => "Number",
        Value::String(_) => "String",
        Value::Array(_) => "Array",
        Value::Object(_) => "Map",
    }
}
