// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Secondary records owned by issues: comments and guidance documents.
//!
//! Both cascade on issue deletion. Guidance documents are the carrier
//! documents the attribution engine inspects (context pack, spec) plus
//! anything else an agent attaches to an issue.

use crate::issue::IssueId;
use crate::stage::CarrierStage;
use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Unique identifier for a comment.
    pub struct CommentId("cmt-");
}

crate::define_id! {
    /// Unique identifier for an issue document.
    pub struct DocumentId("doc-");
}

/// A comment on an issue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub issue_id: IssueId,
    pub author: String,
    pub body: String,
    pub created_at_ms: u64,
}

/// Kind of document attached to an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    ContextPack,
    Spec,
    Other,
}

impl DocumentKind {
    /// The carrier stage this document guides, if any.
    pub fn carrier(self) -> Option<CarrierStage> {
        match self {
            DocumentKind::ContextPack => Some(CarrierStage::ContextPack),
            DocumentKind::Spec => Some(CarrierStage::Spec),
            DocumentKind::Other => None,
        }
    }
}

/// A document attached to an issue (context pack, spec, artifacts).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueDocument {
    pub id: DocumentId,
    pub issue_id: IssueId,
    pub kind: DocumentKind,
    pub content: String,
    pub created_at_ms: u64,
}
