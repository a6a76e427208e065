// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `falcon init` — write `.falcon/config.yaml` for this repository.

use crate::commands::find_repo_root;
use crate::exit_error::ExitError;
use falcon_core::slugify;
use falcon_daemon::config::{FalconConfig, ProjectSection, WorkspaceSection, CONFIG_VERSION};

pub fn run(name: Option<String>) -> Result<(), ExitError> {
    let cwd = std::env::current_dir()?;
    let repo_root = find_repo_root(&cwd)
        .ok_or_else(|| ExitError::usage("not in a git repository"))?;

    let config_path = FalconConfig::path_in(&repo_root);
    if config_path.exists() {
        return Err(ExitError::usage(format!(
            "already initialized: {}",
            config_path.display()
        )));
    }

    let dir_name = repo_root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "project".to_string());
    let project_name = name.unwrap_or_else(|| dir_name.clone());
    let slug = slugify(&dir_name);

    let config = FalconConfig {
        version: CONFIG_VERSION,
        workspace_id: uuid::Uuid::new_v4().to_string(),
        project_id: uuid::Uuid::new_v4().to_string(),
        workspace: WorkspaceSection { slug: slug.clone(), name: dir_name },
        project: ProjectSection { name: project_name.clone() },
    };
    config
        .save(&config_path)
        .map_err(|e| ExitError::transient(e.to_string()))?;

    println!("Initialized falcon for {} ({})", project_name, slug);
    println!("  {}", config_path.display());
    Ok(())
}
