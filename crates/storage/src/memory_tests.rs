// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use falcon_core::test_support::{agent_fixture, issue_fixture, project_fixture};
use falcon_core::{DocumentKind, Project};

fn store_with_project() -> (MemoryStore, Project) {
    let store = MemoryStore::new();
    let project = project_fixture();
    ProjectRepo::insert(&store, project.clone()).unwrap();
    (store, project)
}

#[test]
fn project_slug_conflict() {
    let (store, project) = store_with_project();
    let mut dup = project_fixture();
    dup.origin_url = "https://github.com/other/repo".to_string();
    dup.slug = project.slug.clone();
    let err = ProjectRepo::insert(&store, dup).unwrap_err();
    assert!(matches!(err, StorageError::Conflict(_)));
}

#[test]
fn project_origin_identity_conflict() {
    let (store, _project) = store_with_project();
    let mut dup = project_fixture();
    dup.slug = "widgets-2".to_string();
    let err = ProjectRepo::insert(&store, dup).unwrap_err();
    assert!(matches!(err, StorageError::Conflict(_)));
}

#[test]
fn issue_numbers_unique_per_project() {
    let (store, project) = store_with_project();
    IssueRepo::insert(&store, issue_fixture(project.id, 1, "one")).unwrap();
    let err = IssueRepo::insert(&store, issue_fixture(project.id, 1, "dup")).unwrap_err();
    assert!(matches!(err, StorageError::Conflict(_)));
}

#[test]
fn issue_update_is_optimistic() {
    let (store, project) = store_with_project();
    let issue = issue_fixture(project.id, 1, "one");
    IssueRepo::insert(&store, issue.clone()).unwrap();

    let fresh = IssueRepo::get(&store, &issue.id).unwrap();
    let updated = IssueRepo::update(&store, fresh.clone()).unwrap();
    assert_eq!(updated.version, fresh.version + 1);

    // A second writer holding the old snapshot loses.
    let err = IssueRepo::update(&store, fresh).unwrap_err();
    assert!(matches!(err, StorageError::StaleVersion { .. }));
}

#[test]
fn issue_delete_cascades() {
    let (store, project) = store_with_project();
    let issue = issue_fixture(project.id, 1, "one");
    IssueRepo::insert(&store, issue.clone()).unwrap();

    CommentRepo::insert(
        &store,
        falcon_core::Comment {
            id: falcon_core::CommentId::new(),
            issue_id: issue.id,
            author: "reviewer".to_string(),
            body: "looks wrong".to_string(),
            created_at_ms: 1,
        },
    )
    .unwrap();
    DocumentRepo::insert(
        &store,
        falcon_core::IssueDocument {
            id: falcon_core::DocumentId::new(),
            issue_id: issue.id,
            kind: DocumentKind::ContextPack,
            content: "pack".to_string(),
            created_at_ms: 1,
        },
    )
    .unwrap();

    IssueRepo::delete(&store, &issue.id).unwrap();
    assert!(CommentRepo::list_for_issue(&store, &issue.id).is_empty());
    assert!(DocumentRepo::list_for_issue(&store, &issue.id).is_empty());
}

#[test]
fn agent_name_unique_per_project() {
    let (store, project) = store_with_project();
    AgentRepo::insert(&store, agent_fixture(project.id, "alpha")).unwrap();
    let err = AgentRepo::insert(&store, agent_fixture(project.id, "alpha")).unwrap_err();
    assert!(matches!(err, StorageError::Conflict(_)));

    // Same name under a different project is fine.
    let other = Project::new("https://github.com/acme/other", "Other", "other", 1);
    ProjectRepo::insert(&store, other.clone()).unwrap();
    AgentRepo::insert(&store, agent_fixture(other.id, "alpha")).unwrap();
}

#[test]
fn project_delete_cascades_to_issues_and_agents() {
    let (store, project) = store_with_project();
    let issue = issue_fixture(project.id, 1, "one");
    IssueRepo::insert(&store, issue.clone()).unwrap();
    AgentRepo::insert(&store, agent_fixture(project.id, "alpha")).unwrap();

    ProjectRepo::delete(&store, &project.id).unwrap();
    assert!(IssueRepo::get(&store, &issue.id).is_err());
    assert!(AgentRepo::list_for_project(&store, &project.id).is_empty());
}

#[test]
fn latest_document_wins_by_timestamp() {
    let (store, project) = store_with_project();
    let issue = issue_fixture(project.id, 1, "one");
    IssueRepo::insert(&store, issue.clone()).unwrap();

    for (at, content) in [(1, "old"), (9, "new"), (5, "mid")] {
        DocumentRepo::insert(
            &store,
            falcon_core::IssueDocument {
                id: falcon_core::DocumentId::new(),
                issue_id: issue.id,
                kind: DocumentKind::Spec,
                content: content.to_string(),
                created_at_ms: at,
            },
        )
        .unwrap();
    }
    let latest = DocumentRepo::latest_for_issue(&store, &issue.id, DocumentKind::Spec).unwrap();
    assert_eq!(latest.content, "new");
}

#[test]
fn list_for_project_sorts_by_number() {
    let (store, project) = store_with_project();
    for n in [3, 1, 2] {
        IssueRepo::insert(&store, issue_fixture(project.id, n, &format!("i{n}"))).unwrap();
    }
    let numbers: Vec<u64> =
        IssueRepo::list_for_project(&store, &project.id).iter().map(|i| i.number).collect();
    assert_eq!(numbers, vec![1, 2, 3]);
}
