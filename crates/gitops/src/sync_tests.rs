// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::runner::GitRunner;
use std::path::PathBuf;
use tempfile::TempDir;

struct Fixture {
    _tmp: TempDir,
    origin: PathBuf,
    work: PathBuf,
    sync: GitSync,
}

/// Build a local origin with one commit on `main` and a fresh clone.
async fn fixture() -> Fixture {
    let tmp = tempfile::tempdir().unwrap();
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
                "user.name=test",
                "-c",
                "user.email=test@test",
                "commit",
                "-m",
                "initial",
            ],
            "commit",
        )
        .await
        .unwrap();

    let origin = tmp.path().join("origin.git");
    runner
        .run(
            None,
            &[
                "clone",
                "--bare",
                &seed.display().to_string(),
                &origin.display().to_string(),
            ],
            "clone",
        )
        .await
        .unwrap();

    let sync = GitSync::new(runner);
    let work = tmp.path().join("work");
    sync.clone_primary(&origin.display().to_string(), &work, "main")
        .await
        .unwrap();
    sync.configure_identity(&work, "test", "test@test").await.unwrap();

    Fixture { _tmp: tmp, origin, work, sync }
}

#[tokio::test]
async fn clone_refuses_existing_target() {
    let f = fixture().await;
    let err = f
        .sync
        .clone_primary(&f.origin.display().to_string(), &f.work, "main")
        .await
        .unwrap_err();
    assert!(matches!(err, GitError::TargetExists { .. }));
}

#[tokio::test]
async fn failed_clone_cleans_partial_target() {
    let f = fixture().await;
    let target = f.work.parent().unwrap().join("broken");
    let err = f
        .sync
        .clone_primary("/nonexistent/origin/path", &target, "main")
        .await
        .unwrap_err();
    assert!(matches!(err, GitError::CommandFailed { .. }));
    assert!(!target.exists(), "partial clone left behind");
}

#[tokio::test]
async fn fresh_clone_is_clean() {
    let f = fixture().await;
    assert!(f.sync.is_clean(&f.work).await.unwrap());

    std::fs::write(f.work.join("dirty.txt"), "x").unwrap();
    assert!(!f.sync.is_clean(&f.work).await.unwrap());
}

#[tokio::test]
async fn checkout_creates_branch_from_base() {
    let f = fixture().await;
    f.sync
        .checkout_issue_branch(&f.work, "issue/1-fix-login", "main")
        .await
        .unwrap();
    assert!(f.sync.branch_exists(&f.work, "issue/1-fix-login").await.unwrap());
}

#[tokio::test]
async fn checkout_reuses_existing_branch() {
    let f = fixture().await;
    f.sync
        .checkout_issue_branch(&f.work, "issue/2-retry", "main")
        .await
        .unwrap();
    f.sync.sync_to_base(&f.work, "main").await.unwrap();
    // Second checkout takes the local-branch path (no fetch of base).
    f.sync
        .checkout_issue_branch(&f.work, "issue/2-retry", "main")
        .await
        .unwrap();
}

#[tokio::test]
async fn checkout_refuses_dirty_worktree() {
    let f = fixture().await;
    std::fs::write(f.work.join("dirty.txt"), "x").unwrap();
    let err = f
        .sync
        .checkout_issue_branch(&f.work, "issue/3-x", "main")
        .await
        .unwrap_err();
    assert!(matches!(err, GitError::DirtyWorktree { .. }));
}

#[tokio::test]
async fn sync_to_base_refuses_dirty_worktree() {
    let f = fixture().await;
    std::fs::write(f.work.join("dirty.txt"), "x").unwrap();
    let err = f.sync.sync_to_base(&f.work, "main").await.unwrap_err();
    assert!(matches!(err, GitError::DirtyWorktree { .. }));
}

#[tokio::test]
async fn commit_and_push_reaches_origin() {
    let f = fixture().await;
    f.sync
        .checkout_issue_branch(&f.work, "issue/4-push", "main")
        .await
        .unwrap();
    std::fs::write(f.work.join("change.txt"), "change").unwrap();
    f.sync
        .commit_and_push(&f.work, "apply change", &[], Some("issue/4-push"))
        .await
        .unwrap();

    let runner = GitRunner::new();
    let refs = runner
        .run(Some(&f.origin), &["branch", "--list", "issue/4-push"], "branch")
        .await
        .unwrap();
    assert!(refs.contains("issue/4-push"), "{refs}");
}

#[tokio::test]
async fn commit_specific_files_only() {
    let f = fixture().await;
    f.sync
        .checkout_issue_branch(&f.work, "issue/5-partial", "main")
        .await
        .unwrap();
    std::fs::write(f.work.join("wanted.txt"), "w").unwrap();
    std::fs::write(f.work.join("unwanted.txt"), "u").unwrap();
    f.sync
        .commit_and_push(
            &f.work,
            "add wanted",
            &["wanted.txt".to_string()],
            Some("issue/5-partial"),
        )
        .await
        .unwrap();
    // The unstaged file still dirties the tree.
    assert!(!f.sync.is_clean(&f.work).await.unwrap());
}

#[tokio::test]
async fn pull_rebase_round_trip() {
    let f = fixture().await;
    f.sync
        .checkout_issue_branch(&f.work, "issue/6-rebase", "main")
        .await
        .unwrap();
    std::fs::write(f.work.join("a.txt"), "a").unwrap();
    f.sync
        .commit_and_push(&f.work, "a", &[], Some("issue/6-rebase"))
        .await
        .unwrap();
    f.sync.pull_rebase(&f.work, "issue/6-rebase").await.unwrap();
}
