// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the daemon.

use crate::error::DaemonError;
use std::path::{Component, Path, PathBuf};

/// Directories falcon must never adopt as its home.
const FORBIDDEN_HOMES: [&str; 10] =
    ["/", "/etc", "/usr", "/bin", "/sbin", "/lib", "/var", "/boot", "/dev", "/proc"];

/// Resolve the falcon home: `FALCON_HOME` or `~/.falcon`.
///
/// Rejects relative paths, `..` segments, the filesystem root, and
/// system directories. Symlinks are resolved before the checks so a
/// link into `/etc` does not slip through.
pub fn falcon_home() -> Result<PathBuf, DaemonError> {
    match std::env::var("FALCON_HOME") {
        Ok(raw) if !raw.trim().is_empty() => validate_home(Path::new(raw.trim())),
        _ => {
            let home = dirs::home_dir()
                .ok_or_else(|| DaemonError::Environment("no home directory".to_string()))?;
            Ok(home.join(".falcon"))
        }
    }
}

fn validate_home(raw: &Path) -> Result<PathBuf, DaemonError> {
    if !raw.is_absolute() {
        return Err(DaemonError::Environment(format!(
            "FALCON_HOME must be absolute: {}",
            raw.display()
        )));
    }
    if raw.components().any(|c| c == Component::ParentDir) {
        return Err(DaemonError::Environment(format!(
            "FALCON_HOME must not contain '..': {}",
            raw.display()
        )));
    }

    // Resolve symlinks when the path (or an ancestor) exists.
    let resolved = resolve_existing_prefix(raw);

    for forbidden in FORBIDDEN_HOMES {
        if resolved == Path::new(forbidden) {
            return Err(DaemonError::Environment(format!(
                "FALCON_HOME may not be a system directory: {}",
                resolved.display()
            )));
        }
    }
    Ok(resolved)
}

/// Canonicalize as much of the path as exists, reattaching the
/// not-yet-created suffix.
fn resolve_existing_prefix(path: &Path) -> PathBuf {
    let mut existing = path.to_path_buf();
    let mut suffix = Vec::new();
    while !existing.exists() {
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                suffix.push(name.to_os_string());
                existing = parent.to_path_buf();
            }
            _ => return path.to_path_buf(),
        }
    }
    let mut resolved = existing.canonicalize().unwrap_or(existing);
    for name in suffix.iter().rev() {
        resolved.push(name);
    }
    resolved
}

/// Transport auth token (`PM_API_TOKEN`). Required.
pub fn api_token() -> Result<String, DaemonError> {
    std::env::var("PM_API_TOKEN")
        .ok()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| DaemonError::Environment("PM_API_TOKEN is required".to_string()))
}

/// Origin allow-list (`PM_API_ALLOWED_ORIGINS`, comma separated).
/// `None` means no origin restriction.
pub fn allowed_origins() -> Option<Vec<String>> {
    let raw = std::env::var("PM_API_ALLOWED_ORIGINS").ok()?;
    let origins: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    if origins.is_empty() {
        None
    } else {
        Some(origins)
    }
}

/// Transport bind address (`PM_BIND`), defaulting to localhost.
pub fn bind_addr() -> String {
    std::env::var("PM_BIND").unwrap_or_else(|_| "127.0.0.1:9777".to_string())
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
