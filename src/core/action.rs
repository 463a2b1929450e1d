//! Executor action tree for staging tasks.
//!
//! Actions form a tree owned by the task definition. Leaves move bytes or run
//! a process; composite nodes group children in parallel, tolerate a child's
//! failure, or emit progress messages around a child.

use super::types::{EnvironmentVariable, ResourceLimits};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A node in a task's action tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    Download {
        from: String,
        to: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        cache_key: Option<String>,
    },
    Run {
        path: String,
        args: Vec<String>,
        env: Vec<EnvironmentVariable>,
        timeout: Duration,
        resource_limits: ResourceLimits,
    },
    Upload {
        from: String,
        to: String,
    },
    /// Children run concurrently; the group fails if any child fails.
    Parallel { actions: Vec<Action> },
    /// The child's failure is swallowed.
    BestEffort { action: Box<Action> },
    WithProgress {
        action: Box<Action>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        start_message: Option<String>,
        success_message: String,
        failure_message: String,
    },
}

impl Action {
    pub fn download(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self::Download {
            from: from.into(),
            to: to.into(),
            cache_key: None,
        }
    }

    pub fn cached_download(
        from: impl Into<String>,
        to: impl Into<String>,
        cache_key: impl Into<String>,
    ) -> Self {
        Self::Download {
            from: from.into(),
            to: to.into(),
            cache_key: Some(cache_key.into()),
        }
    }

    pub fn upload(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self::Upload {
            from: from.into(),
            to: to.into(),
        }
    }

    pub fn parallel(actions: Vec<Action>) -> Self {
        Self::Parallel { actions }
    }

    pub fn best_effort(action: Action) -> Self {
        Self::BestEffort {
            action: Box::new(action),
        }
    }

    /// Wrap `action` with progress messages. An empty `start` emits nothing
    /// when the action begins.
    pub fn with_progress(
        action: Action,
        start: &str,
        success: impl Into<String>,
        failure: impl Into<String>,
    ) -> Self {
        Self::WithProgress {
            action: Box::new(action),
            start_message: (!start.is_empty()).then(|| start.to_string()),
            success_message: success.into(),
            failure_message: failure.into(),
        }
    }

    /// Direct children of a composite node; empty for leaves.
    pub fn children(&self) -> Vec<&Action> {
        match self {
            Self::Parallel { actions } => actions.iter().collect(),
            Self::BestEffort { action } | Self::WithProgress { action, .. } => vec![action.as_ref()],
            Self::Download { .. } | Self::Run { .. } | Self::Upload { .. } => Vec::new(),
        }
    }

    /// Depth-first, pre-order walk of the tree rooted at `self`.
    pub fn walk(&self) -> Vec<&Action> {
        let mut out = vec![self];
        for child in self.children() {
            out.extend(child.walk());
        }
        out
    }

    /// Strip progress wrappers down to the first non-progress node.
    pub fn unwrap_progress(&self) -> &Action {
        match self {
            Self::WithProgress { action, .. } => action.unwrap_progress(),
            other => other,
        }
    }
}
