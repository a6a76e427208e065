// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worktree provisioning.
//!
//! Ensures the per-project directory tree exists (mode 0o700), clones
//! the primary checkout, gives each agent its own clone, and links
//! shared caches (`node_modules`, `.falcon/CORE`) from primary into
//! agent worktrees.

use crate::error::GitError;
use crate::sync::GitSync;
use falcon_core::{Project, WorktreeLayout, DIR_MODE};
use std::path::{Path, PathBuf};

/// Committer identity configured into every managed worktree.
const COMMITTER_NAME: &str = "falcon-agent";
const COMMITTER_EMAIL: &str = "agents@falcon.local";

/// Cache paths linked from primary into agent worktrees.
const SHARED_LINKS: [&str; 2] = ["node_modules", ".falcon/CORE"];

/// Provisions project and agent worktrees under a layout.
pub struct Provisioner {
    layout: WorktreeLayout,
    sync: GitSync,
}

impl Provisioner {
    pub fn new(layout: WorktreeLayout, sync: GitSync) -> Self {
        Self { layout, sync }
    }

    pub fn layout(&self) -> &WorktreeLayout {
        &self.layout
    }

    /// Ensure project directories and the primary checkout exist.
    /// Returns the primary path.
    pub async fn ensure_project(&self, project: &Project) -> Result<PathBuf, GitError> {
        let project_dir = self.layout.project_dir(&project.slug)?;
        let primary = self.layout.primary_dir(&project.slug)?;

        for dir in [
            &project_dir,
            &project_dir.join("agents"),
            &project_dir.join("issues"),
        ] {
            create_private_dir(dir).await?;
        }

        if !primary.exists() {
            self.sync
                .clone_primary(&project.origin_url, &primary, &project.base_branch)
                .await?;
            self.sync
                .configure_identity(&primary, COMMITTER_NAME, COMMITTER_EMAIL)
                .await?;
        }
        Ok(primary)
    }

    /// Ensure an agent worktree exists: clone, identity, shared links.
    /// Returns the worktree path.
    pub async fn ensure_agent_worktree(
        &self,
        project: &Project,
        agent_name: &str,
    ) -> Result<PathBuf, GitError> {
        let primary = self.ensure_project(project).await?;
        let worktree = self.layout.agent_dir(&project.slug, agent_name)?;

        if !worktree.exists() {
            self.sync
                .clone_primary(&project.origin_url, &worktree, &project.base_branch)
                .await?;
            self.sync
                .configure_identity(&worktree, COMMITTER_NAME, COMMITTER_EMAIL)
                .await?;
        }

        link_shared_caches(&primary, &worktree).await;
        Ok(worktree)
    }
}

/// Create a directory (and parents) with mode 0o700.
async fn create_private_dir(dir: &Path) -> Result<(), GitError> {
    tokio::fs::create_dir_all(dir).await.map_err(|e| GitError::Io {
        op: "mkdir",
        detail: format!("{}: {}", dir.display(), e),
    })?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(DIR_MODE);
        tokio::fs::set_permissions(dir, perms).await.map_err(|e| GitError::Io {
            op: "chmod",
            detail: format!("{}: {}", dir.display(), e),
        })?;
    }
    Ok(())
}

/// Link shared caches from primary into an agent worktree.
///
/// Best-effort: a link is created only when the source exists in
/// primary and the link path does not already resolve to a non-symlink.
async fn link_shared_caches(primary: &Path, worktree: &Path) {
    #[cfg(unix)]
    for rel in SHARED_LINKS {
        let source = primary.join(rel);
        let link = worktree.join(rel);

        if !source.exists() {
            continue;
        }
        match tokio::fs::symlink_metadata(&link).await {
            Ok(meta) if !meta.file_type().is_symlink() => continue,
            Ok(_) => continue, // symlink already in place
            Err(_) => {}
        }
        if let Some(parent) = link.parent() {
            if tokio::fs::create_dir_all(parent).await.is_err() {
                continue;
            }
        }
        if let Err(e) = tokio::fs::symlink(&source, &link).await {
            tracing::warn!(link = %link.display(), error = %e, "shared cache link failed");
        }
    }
}

#[cfg(test)]
#[path = "provision_tests.rs"]
mod tests;
