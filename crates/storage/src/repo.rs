// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Repository traits.
//!
//! The orchestrator core only ever sees these seams; the production
//! backing store lives outside this workspace. [`crate::MemoryStore`]
//! implements all of them for the daemon's single-process mode and for
//! tests.

use crate::error::StorageError;
use falcon_core::{
    AgentId, AgentRecord, Comment, CommentId, DocumentId, DocumentKind, Issue, IssueDocument,
    IssueId, Label, LabelId, Project, ProjectId,
};

pub trait ProjectRepo: Send + Sync {
    fn insert(&self, project: Project) -> Result<(), StorageError>;
    fn get(&self, id: &ProjectId) -> Result<Project, StorageError>;
    fn find_by_slug(&self, slug: &str) -> Option<Project>;
    fn update(&self, project: Project) -> Result<(), StorageError>;
    fn delete(&self, id: &ProjectId) -> Result<(), StorageError>;
    fn list(&self) -> Vec<Project>;
}

pub trait IssueRepo: Send + Sync {
    /// Insert a new issue. The caller takes the number from the project.
    fn insert(&self, issue: Issue) -> Result<(), StorageError>;
    fn get(&self, id: &IssueId) -> Result<Issue, StorageError>;
    fn find_by_number(&self, project: &ProjectId, number: u64) -> Option<Issue>;
    /// Optimistic write: fails with `StaleVersion` unless the stored
    /// version equals `issue.version`; bumps the version on success.
    fn update(&self, issue: Issue) -> Result<Issue, StorageError>;
    /// Delete the issue and cascade to comments, documents, and label
    /// bindings.
    fn delete(&self, id: &IssueId) -> Result<(), StorageError>;
    fn list_for_project(&self, project: &ProjectId) -> Vec<Issue>;
}

pub trait AgentRepo: Send + Sync {
    /// Insert a new agent. Fails with `Conflict` when the name is taken
    /// within the project.
    fn insert(&self, agent: AgentRecord) -> Result<(), StorageError>;
    fn get(&self, id: &AgentId) -> Result<AgentRecord, StorageError>;
    fn update(&self, agent: AgentRecord) -> Result<(), StorageError>;
    fn delete(&self, id: &AgentId) -> Result<(), StorageError>;
    fn list_for_project(&self, project: &ProjectId) -> Vec<AgentRecord>;
}

pub trait LabelRepo: Send + Sync {
    fn insert(&self, label: Label) -> Result<(), StorageError>;
    fn get(&self, id: &LabelId) -> Result<Label, StorageError>;
    fn find_builtin_by_name(&self, name: &str) -> Option<Label>;
    fn list_builtin(&self) -> Vec<Label>;
    fn list_for_project(&self, project: &ProjectId) -> Vec<Label>;
}

pub trait CommentRepo: Send + Sync {
    fn insert(&self, comment: Comment) -> Result<(), StorageError>;
    fn get(&self, id: &CommentId) -> Result<Comment, StorageError>;
    fn list_for_issue(&self, issue: &IssueId) -> Vec<Comment>;
}

pub trait DocumentRepo: Send + Sync {
    fn insert(&self, doc: IssueDocument) -> Result<(), StorageError>;
    fn get(&self, id: &DocumentId) -> Result<IssueDocument, StorageError>;
    /// The latest document of `kind` for the issue, if any.
    fn latest_for_issue(&self, issue: &IssueId, kind: DocumentKind) -> Option<IssueDocument>;
    fn list_for_issue(&self, issue: &IssueId) -> Vec<IssueDocument>;
}
