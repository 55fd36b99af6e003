// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Data directory resolution and persisted configuration.

use std::path::{Path, PathBuf};

use fileuploader_core::UploaderConfig;
use fileuploader_core::error::Result;
use tracing::{info, warn};

/// File name of the persisted configuration inside the data directory.
pub const CONFIG_FILE: &str = "config.json";

/// Return the application data directory, creating it if needed.
pub fn data_dir() -> PathBuf {
    let dir = base_dir().join("fileuploader");
    std::fs::create_dir_all(&dir).ok();
    dir
}

fn base_dir() -> PathBuf {
    // Try XDG data dir, then fallback to home
    if let Ok(xdg) = std::env::var("XDG_DATA_HOME") {
        return PathBuf::from(xdg);
    }
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".local").join("share");
    }
    PathBuf::from("/tmp")
}

/// Load the configuration at `path`, falling back to defaults when the file
/// is missing or unreadable.
pub fn load_config(path: &Path) -> UploaderConfig {
    let data = match std::fs::read_to_string(path) {
        Ok(data) => data,
        Err(_) => {
            info!(path = %path.display(), "no config file, using defaults");
            return UploaderConfig::default();
        }
    };
    match serde_json::from_str(&data) {
        Ok(config) => config,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "config file unreadable, using defaults");
            UploaderConfig::default()
        }
    }
}

/// Write `config` as pretty JSON to `path`.
pub fn persist_config(path: &Path, config: &UploaderConfig) -> Result<()> {
    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(path, json)?;
    Ok(())
}
