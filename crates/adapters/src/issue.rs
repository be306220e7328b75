// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Foreman contributors

//! Issue-tracker capability for durable task commentary.
//!
//! The backend is opaque; workflow handlers call it synchronously and treat
//! failures as fatal for the current command.

use async_trait::async_trait;
use foreman_core::TaskId;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors from issue-store operations
#[derive(Debug, Error)]
pub enum IssueError {
    #[error("issue not found: {0}")]
    NotFound(String),
    #[error("issue store unavailable: {0}")]
    Unavailable(String),
}

/// Tracker-side status of an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueStatus {
    Open,
    InProgress,
    InReview,
    Done,
}

impl fmt::Display for IssueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IssueStatus::Open => "open",
            IssueStatus::InProgress => "in_progress",
            IssueStatus::InReview => "in_review",
            IssueStatus::Done => "done",
        };
        write!(f, "{}", name)
    }
}

/// A tracked issue, as much of it as the core cares about.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub id: TaskId,
    pub title: String,
    pub status: IssueStatus,
}

/// Adapter for the issue-tracker backend.
#[async_trait]
pub trait IssueStore: Send + Sync {
    async fn show_issue(&self, id: &TaskId) -> Result<Issue, IssueError>;
    async fn update_status(&self, id: &TaskId, status: IssueStatus) -> Result<(), IssueError>;
    async fn add_comment(&self, id: &TaskId, author: &str, body: &str) -> Result<(), IssueError>;
}

/// Issue store that accepts everything and records nothing.
///
/// Used when the core runs without a tracker; `show_issue` fabricates a row
/// so task assignment still works.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopIssueStore;

#[async_trait]
impl IssueStore for NoopIssueStore {
    async fn show_issue(&self, id: &TaskId) -> Result<Issue, IssueError> {
        Ok(Issue { id: id.clone(), title: String::new(), status: IssueStatus::Open })
    }

    async fn update_status(&self, _id: &TaskId, _status: IssueStatus) -> Result<(), IssueError> {
        Ok(())
    }

    async fn add_comment(&self, _id: &TaskId, _author: &str, _body: &str) -> Result<(), IssueError> {
        Ok(())
    }
}

#[cfg(any(test, feature = "test-support"))]
mod fake {
    use super::*;
    use parking_lot::Mutex;
    use std::collections::HashSet;
    use std::sync::Arc;

    /// Recorded comment
    #[derive(Debug, Clone, PartialEq)]
    pub struct CommentCall {
        pub task_id: TaskId,
        pub author: String,
        pub body: String,
    }

    #[derive(Default)]
    struct FakeIssueState {
        missing: HashSet<TaskId>,
        statuses: Vec<(TaskId, IssueStatus)>,
        comments: Vec<CommentCall>,
        fail_comments: bool,
        fail_status: bool,
    }

    /// Recording issue store for testing
    #[derive(Clone, Default)]
    pub struct FakeIssueStore {
        inner: Arc<Mutex<FakeIssueState>>,
    }

    impl FakeIssueStore {
        pub fn new() -> Self {
            Self::default()
        }

        /// Make `show_issue` fail for the given task id.
        pub fn set_missing(&self, id: TaskId) {
            self.inner.lock().missing.insert(id);
        }

        /// Make `add_comment` fail.
        pub fn fail_comments(&self) {
            self.inner.lock().fail_comments = true;
        }

        /// Make `update_status` fail.
        pub fn fail_status_updates(&self) {
            self.inner.lock().fail_status = true;
        }

        /// All recorded comments, in call order.
        pub fn comments(&self) -> Vec<CommentCall> {
            self.inner.lock().comments.clone()
        }

        /// All recorded status updates, in call order.
        pub fn status_updates(&self) -> Vec<(TaskId, IssueStatus)> {
            self.inner.lock().statuses.clone()
        }
    }

    #[async_trait]
    impl IssueStore for FakeIssueStore {
        async fn show_issue(&self, id: &TaskId) -> Result<Issue, IssueError> {
            let state = self.inner.lock();
            if state.missing.contains(id) {
                return Err(IssueError::NotFound(id.to_string()));
            }
            Ok(Issue { id: id.clone(), title: format!("issue {}", id), status: IssueStatus::Open })
        }

        async fn update_status(&self, id: &TaskId, status: IssueStatus) -> Result<(), IssueError> {
            let mut state = self.inner.lock();
            if state.fail_status {
                return Err(IssueError::Unavailable("status update rejected".into()));
            }
            state.statuses.push((id.clone(), status));
            Ok(())
        }

        async fn add_comment(
            &self,
            id: &TaskId,
            author: &str,
            body: &str,
        ) -> Result<(), IssueError> {
            let mut state = self.inner.lock();
            if state.fail_comments {
                return Err(IssueError::Unavailable("comment rejected".into()));
            }
            state.comments.push(CommentCall {
                task_id: id.clone(),
                author: author.to_string(),
                body: body.to_string(),
            });
            Ok(())
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::{CommentCall, FakeIssueStore};

#[cfg(test)]
#[path = "issue_tests.rs"]
mod tests;
