// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// FileUploader Transfer — source resolution, multipart framing, progress
// counting, and the HTTP client that ties them together.

pub mod client;
pub mod multipart;
pub mod progress;
pub mod source;

pub use client::UploadClient;
pub use multipart::MultipartForm;
pub use progress::{NoProgress, ProgressListener};
pub use source::resolve_source;
