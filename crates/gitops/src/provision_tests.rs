// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::runner::GitRunner;
use falcon_core::Project;
use tempfile::TempDir;

struct Fixture {
    _tmp: TempDir,
    home: TempDir,
    project: Project,
    provisioner: Provisioner,
}

async fn fixture() -> Fixture {
    let tmp = tempfile::tempdir().unwrap();
    let home = tempfile::tempdir().unwrap();
    let runner = GitRunner::new();
    let seed = tmp.path().join("seed");

    runner
        .run(None, &["init", "-b", "main", &seed.display().to_string()], "init")
        .await
        .unwrap();
    std::fs::write(seed.join("README.md"), "seed\n").unwrap();
    runner.run(Some(&seed), &["add", "-A"], "add").await.unwrap();
    runner
        .run(
            Some(&seed),
            &[
                "-c",
                "user.name=t",
                "-c",
                "user.email=t@t",
                "commit",
                "-m",
                "initial",
            ],
            "commit",
        )
        .await
        .unwrap();

    let mut project = Project::new(seed.display().to_string(), "Widgets", "widgets", 1);
    project.base_branch = "main".to_string();

    let layout = WorktreeLayout::new(home.path()).unwrap();
    let provisioner = Provisioner::new(layout, GitSync::new(runner));
    Fixture { _tmp: tmp, home, project, provisioner }
}

#[tokio::test]
async fn ensure_project_creates_tree_and_primary() {
    let f = fixture().await;
    let primary = f.provisioner.ensure_project(&f.project).await.unwrap();

    assert!(primary.join("README.md").exists());
    let project_dir = f.home.path().join("projects/widgets");
    assert!(project_dir.join("agents").is_dir());
    assert!(project_dir.join("issues").is_dir());
}

#[cfg(unix)]
#[tokio::test]
async fn project_dirs_are_private() {
    use std::os::unix::fs::PermissionsExt;
    let f = fixture().await;
    f.provisioner.ensure_project(&f.project).await.unwrap();

    let meta = std::fs::metadata(f.home.path().join("projects/widgets")).unwrap();
    assert_eq!(meta.permissions().mode() & 0o777, 0o700);
}

#[tokio::test]
async fn ensure_project_is_idempotent() {
    let f = fixture().await;
    f.provisioner.ensure_project(&f.project).await.unwrap();
    f.provisioner.ensure_project(&f.project).await.unwrap();
}

#[tokio::test]
async fn agent_worktree_is_exclusive_clone() {
    let f = fixture().await;
    let worktree = f
        .provisioner
        .ensure_agent_worktree(&f.project, "alpha")
        .await
        .unwrap();
    assert!(worktree.ends_with("projects/widgets/agents/alpha"));
    assert!(worktree.join("README.md").exists());

    let other = f
        .provisioner
        .ensure_agent_worktree(&f.project, "beta")
        .await
        .unwrap();
    assert_ne!(worktree, other);
}

#[cfg(unix)]
#[tokio::test]
async fn shared_caches_are_linked_when_present() {
    let f = fixture().await;
    let primary = f.provisioner.ensure_project(&f.project).await.unwrap();
    std::fs::create_dir_all(primary.join("node_modules")).unwrap();

    let worktree = f
        .provisioner
        .ensure_agent_worktree(&f.project, "alpha")
        .await
        .unwrap();
    let link = worktree.join("node_modules");
    let meta = std::fs::symlink_metadata(&link).unwrap();
    assert!(meta.file_type().is_symlink());
}

#[tokio::test]
async fn bad_agent_name_is_rejected() {
    let f = fixture().await;
    let err = f
        .provisioner
        .ensure_agent_worktree(&f.project, "../escape")
        .await
        .unwrap_err();
    assert!(matches!(err, GitError::Core(_)));
}
