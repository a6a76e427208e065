// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory store implementing every repository trait.
//!
//! One `RwLock` per entity table. Writers hold the lock for the whole
//! read-modify-write; readers clone out snapshots. Issue updates use
//! optimistic versioning so two dispatches racing on the same issue
//! cannot both win.

use crate::error::StorageError;
use crate::repo::{AgentRepo, CommentRepo, DocumentRepo, IssueRepo, LabelRepo, ProjectRepo};
use falcon_core::{
    AgentId, AgentRecord, Comment, CommentId, DocumentId, DocumentKind, Issue, IssueDocument,
    IssueId, Label, LabelId, Project, ProjectId,
};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Shared in-memory store. Cheap to clone; clones share tables.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Tables>,
}

#[derive(Default)]
struct Tables {
    projects: RwLock<HashMap<ProjectId, Project>>,
    issues: RwLock<HashMap<IssueId, Issue>>,
    agents: RwLock<HashMap<AgentId, AgentRecord>>,
    labels: RwLock<HashMap<LabelId, Label>>,
    comments: RwLock<HashMap<CommentId, Comment>>,
    documents: RwLock<HashMap<DocumentId, IssueDocument>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProjectRepo for MemoryStore {
    fn insert(&self, project: Project) -> Result<(), StorageError> {
        let mut projects = self.inner.projects.write();
        if projects.values().any(|p| p.slug == project.slug && p.id != project.id) {
            return Err(StorageError::Conflict(format!("slug taken: {}", project.slug)));
        }
        if projects
            .values()
            .any(|p| p.origin_url == project.origin_url && p.subdir == project.subdir)
        {
            return Err(StorageError::Conflict(format!(
                "project exists for origin: {}",
                project.origin_url
            )));
        }
        projects.insert(project.id, project);
        Ok(())
    }

    fn get(&self, id: &ProjectId) -> Result<Project, StorageError> {
        self.inner
            .projects
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| StorageError::not_found("project", id))
    }

    fn find_by_slug(&self, slug: &str) -> Option<Project> {
        self.inner.projects.read().values().find(|p| p.slug == slug).cloned()
    }

    fn update(&self, project: Project) -> Result<(), StorageError> {
        let mut projects = self.inner.projects.write();
        if !projects.contains_key(&project.id) {
            return Err(StorageError::not_found("project", project.id));
        }
        projects.insert(project.id, project);
        Ok(())
    }

    fn delete(&self, id: &ProjectId) -> Result<(), StorageError> {
        let removed = self.inner.projects.write().remove(id);
        if removed.is_none() {
            return Err(StorageError::not_found("project", id));
        }
        // Cascade: issues (which cascade their own children) and agents.
        let issue_ids: Vec<IssueId> = self
            .inner
            .issues
            .read()
            .values()
            .filter(|i| i.project_id == *id)
            .map(|i| i.id)
            .collect();
        for issue_id in issue_ids {
            let _ = IssueRepo::delete(self, &issue_id);
        }
        self.inner.agents.write().retain(|_, a| a.project_id != *id);
        Ok(())
    }

    fn list(&self) -> Vec<Project> {
        self.inner.projects.read().values().cloned().collect()
    }
}

impl IssueRepo for MemoryStore {
    fn insert(&self, issue: Issue) -> Result<(), StorageError> {
        let mut issues = self.inner.issues.write();
        if issues
            .values()
            .any(|i| i.project_id == issue.project_id && i.number == issue.number)
        {
            return Err(StorageError::Conflict(format!("issue number taken: {}", issue.number)));
        }
        issues.insert(issue.id, issue);
        Ok(())
    }

    fn get(&self, id: &IssueId) -> Result<Issue, StorageError> {
        self.inner
            .issues
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| StorageError::not_found("issue", id))
    }

    fn find_by_number(&self, project: &ProjectId, number: u64) -> Option<Issue> {
        self.inner
            .issues
            .read()
            .values()
            .find(|i| i.project_id == *project && i.number == number)
            .cloned()
    }

    fn update(&self, mut issue: Issue) -> Result<Issue, StorageError> {
        let mut issues = self.inner.issues.write();
        let stored = issues
            .get(&issue.id)
            .ok_or_else(|| StorageError::not_found("issue", issue.id))?;
        if stored.version != issue.version {
            return Err(StorageError::StaleVersion {
                entity: "issue",
                id: issue.id.to_string(),
                expected: issue.version,
                found: stored.version,
            });
        }
        issue.version += 1;
        issues.insert(issue.id, issue.clone());
        Ok(issue)
    }

    fn delete(&self, id: &IssueId) -> Result<(), StorageError> {
        let removed = self.inner.issues.write().remove(id);
        if removed.is_none() {
            return Err(StorageError::not_found("issue", id));
        }
        self.inner.comments.write().retain(|_, c| c.issue_id != *id);
        self.inner.documents.write().retain(|_, d| d.issue_id != *id);
        Ok(())
    }

    fn list_for_project(&self, project: &ProjectId) -> Vec<Issue> {
        let mut out: Vec<Issue> = self
            .inner
            .issues
            .read()
            .values()
            .filter(|i| i.project_id == *project)
            .cloned()
            .collect();
        out.sort_by_key(|i| i.number);
        out
    }
}

impl AgentRepo for MemoryStore {
    fn insert(&self, agent: AgentRecord) -> Result<(), StorageError> {
        let mut agents = self.inner.agents.write();
        if agents
            .values()
            .any(|a| a.project_id == agent.project_id && a.name == agent.name)
        {
            return Err(StorageError::Conflict(format!("agent name taken: {}", agent.name)));
        }
        agents.insert(agent.id, agent);
        Ok(())
    }

    fn get(&self, id: &AgentId) -> Result<AgentRecord, StorageError> {
        self.inner
            .agents
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| StorageError::not_found("agent", id))
    }

    fn update(&self, agent: AgentRecord) -> Result<(), StorageError> {
        let mut agents = self.inner.agents.write();
        if !agents.contains_key(&agent.id) {
            return Err(StorageError::not_found("agent", agent.id));
        }
        agents.insert(agent.id, agent);
        Ok(())
    }

    fn delete(&self, id: &AgentId) -> Result<(), StorageError> {
        self.inner
            .agents
            .write()
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| StorageError::not_found("agent", id))
    }

    fn list_for_project(&self, project: &ProjectId) -> Vec<AgentRecord> {
        let mut out: Vec<AgentRecord> = self
            .inner
            .agents
            .read()
            .values()
            .filter(|a| a.project_id == *project)
            .cloned()
            .collect();
        out.sort_by(|a, b| a.name.cmp(&b.name));
        out
    }
}

impl LabelRepo for MemoryStore {
    fn insert(&self, label: Label) -> Result<(), StorageError> {
        let mut labels = self.inner.labels.write();
        if labels
            .values()
            .any(|l| l.project_id == label.project_id && l.name == label.name)
        {
            return Err(StorageError::Conflict(format!("label name taken: {}", label.name)));
        }
        labels.insert(label.id, label);
        Ok(())
    }

    fn get(&self, id: &LabelId) -> Result<Label, StorageError> {
        self.inner
            .labels
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| StorageError::not_found("label", id))
    }

    fn find_builtin_by_name(&self, name: &str) -> Option<Label> {
        self.inner
            .labels
            .read()
            .values()
            .find(|l| l.project_id.is_none() && l.name == name)
            .cloned()
    }

    fn list_builtin(&self) -> Vec<Label> {
        self.inner
            .labels
            .read()
            .values()
            .filter(|l| l.project_id.is_none())
            .cloned()
            .collect()
    }

    fn list_for_project(&self, project: &ProjectId) -> Vec<Label> {
        self.inner
            .labels
            .read()
            .values()
            .filter(|l| l.project_id == Some(*project))
            .cloned()
            .collect()
    }
}

impl CommentRepo for MemoryStore {
    fn insert(&self, comment: Comment) -> Result<(), StorageError> {
        self.inner.comments.write().insert(comment.id, comment);
        Ok(())
    }

    fn get(&self, id: &CommentId) -> Result<Comment, StorageError> {
        self.inner
            .comments
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| StorageError::not_found("comment", id))
    }

    fn list_for_issue(&self, issue: &IssueId) -> Vec<Comment> {
        let mut out: Vec<Comment> = self
            .inner
            .comments
            .read()
            .values()
            .filter(|c| c.issue_id == *issue)
            .cloned()
            .collect();
        out.sort_by_key(|c| c.created_at_ms);
        out
    }
}

impl DocumentRepo for MemoryStore {
    fn insert(&self, doc: IssueDocument) -> Result<(), StorageError> {
        self.inner.documents.write().insert(doc.id, doc);
        Ok(())
    }

    fn get(&self, id: &DocumentId) -> Result<IssueDocument, StorageError> {
        self.inner
            .documents
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| StorageError::not_found("document", id))
    }

    fn latest_for_issue(&self, issue: &IssueId, kind: DocumentKind) -> Option<IssueDocument> {
        self.inner
            .documents
            .read()
            .values()
            .filter(|d| d.issue_id == *issue && d.kind == kind)
            .max_by_key(|d| d.created_at_ms)
            .cloned()
    }

    fn list_for_issue(&self, issue: &IssueId) -> Vec<IssueDocument> {
        let mut out: Vec<IssueDocument> = self
            .inner
            .documents
            .read()
            .values()
            .filter(|d| d.issue_id == *issue)
            .cloned()
            .collect();
        out.sort_by_key(|d| d.created_at_ms);
        out
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
