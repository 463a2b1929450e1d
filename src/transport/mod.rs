//! Collaborator boundaries: file-server discovery, task submission and
//! response delivery.
//!
//! The core never talks to the network itself; the stager reaches the outside
//! world only through these traits.

pub mod local;
pub mod memory;

use crate::core::error::{DiscoveryError, PublishError, SubmitError};
use crate::core::types::TaskDefinition;
use async_trait::async_trait;

/// Locates a file server currently able to serve and relay artifacts.
#[async_trait]
pub trait FileServerLocator: Send + Sync {
    /// Base URL of an available file server.
    async fn available_file_server(&self) -> Result<String, DiscoveryError>;
}

/// Submits task definitions to the execution engine.
#[async_trait]
pub trait TaskSubmitter: Send + Sync {
    /// Create `task`. A task with the same guid already present is reported
    /// as [`SubmitError::AlreadyExists`].
    async fn create_task(&self, task: &TaskDefinition) -> Result<(), SubmitError>;
}

/// Delivers encoded staging responses to the original caller.
#[async_trait]
pub trait ResponsePublisher: Send + Sync {
    async fn publish(&self, response: &[u8]) -> Result<(), PublishError>;
}
