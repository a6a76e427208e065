// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `falcon status` — print scope, home, and worktree state.

use crate::commands::find_repo_root;
use crate::exit_error::ExitError;
use falcon_core::WorktreeLayout;
use falcon_daemon::config::FalconConfig;
use falcon_daemon::env;

pub fn run() -> Result<(), ExitError> {
    let cwd = std::env::current_dir()?;
    let repo_root = find_repo_root(&cwd)
        .ok_or_else(|| ExitError::usage("not in a git repository"))?;

    let config_path = FalconConfig::path_in(&repo_root);
    if !config_path.exists() {
        return Err(ExitError::usage("not initialized (run `falcon init`)"));
    }
    let config =
        FalconConfig::load(&config_path).map_err(|e| ExitError::usage(e.to_string()))?;

    let home = env::falcon_home().map_err(|e| ExitError::usage(e.to_string()))?;
    let layout = WorktreeLayout::new(&home).map_err(|e| ExitError::usage(e.to_string()))?;

    println!("Workspace: {} ({})", config.workspace.name, config.workspace.slug);
    println!("Project:   {}", config.project.name);
    println!("Home:      {}", home.display());

    match layout.primary_dir(&config.workspace.slug) {
        Ok(primary) if primary.exists() => {
            println!("Primary:   {} (provisioned)", primary.display());
            let agents_dir = primary.parent().map(|p| p.join("agents"));
            let agent_count = agents_dir
                .and_then(|dir| std::fs::read_dir(dir).ok())
                .map(|entries| entries.flatten().count())
                .unwrap_or(0);
            println!("Agents:    {} worktree(s)", agent_count);
        }
        Ok(primary) => {
            println!("Primary:   {} (not provisioned)", primary.display());
        }
        Err(e) => {
            println!("Primary:   unavailable ({})", e);
        }
    }
    Ok(())
}
