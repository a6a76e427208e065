// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Repository-local configuration (`<repo-root>/.falcon/config.yaml`).
//!
//! Written by `falcon init`, read by scope resolution.

use crate::error::DaemonError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Current config schema version.
pub const CONFIG_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceSection {
    pub slug: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSection {
    pub name: String,
}

/// The `.falcon/config.yaml` contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FalconConfig {
    pub version: u32,
    #[serde(rename = "workspaceId")]
    pub workspace_id: String,
    #[serde(rename = "projectId")]
    pub project_id: String,
    pub workspace: WorkspaceSection,
    pub project: ProjectSection,
}

impl FalconConfig {
    /// Path of the config file under a repository root.
    pub fn path_in(repo_root: &Path) -> PathBuf {
        repo_root.join(".falcon").join("config.yaml")
    }

    pub fn load(path: &Path) -> Result<Self, DaemonError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| DaemonError::Config(format!("{}: {}", path.display(), e)))?;
        serde_yaml::from_str(&raw)
            .map_err(|e| DaemonError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Write the config, creating `.falcon/` as needed.
    pub fn save(&self, path: &Path) -> Result<(), DaemonError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let raw = serde_yaml::to_string(self)
            .map_err(|e| DaemonError::Config(e.to_string()))?;
        std::fs::write(path, raw)?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
