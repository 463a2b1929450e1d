//! In-memory transports that record every call.
//!
//! Used to run the stager without an engine, e.g. in tests and dry runs.

use super::{FileServerLocator, ResponsePublisher, TaskSubmitter};
use crate::core::error::{DiscoveryError, PublishError, SubmitError};
use crate::core::types::TaskDefinition;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    match m.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Locator returning a fixed outcome and counting lookups.
#[derive(Debug)]
pub struct FixedLocator {
    outcome: Result<String, DiscoveryError>,
    calls: AtomicUsize,
}

impl FixedLocator {
    pub fn available(url: impl Into<String>) -> Self {
        Self {
            outcome: Ok(url.into()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            outcome: Err(DiscoveryError {
                message: message.into(),
            }),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FileServerLocator for FixedLocator {
    async fn available_file_server(&self) -> Result<String, DiscoveryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.outcome.clone()
    }
}

/// Submitter that records tasks and answers with a configurable outcome.
#[derive(Debug, Default)]
pub struct RecordingSubmitter {
    tasks: Mutex<Vec<TaskDefinition>>,
    outcome: Mutex<Option<SubmitError>>,
}

impl RecordingSubmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every subsequent submission with `err`.
    pub fn fail_with(&self, err: SubmitError) {
        *lock(&self.outcome) = Some(err);
    }

    pub fn tasks(&self) -> Vec<TaskDefinition> {
        lock(&self.tasks).clone()
    }
}

#[async_trait]
impl TaskSubmitter for RecordingSubmitter {
    async fn create_task(&self, task: &TaskDefinition) -> Result<(), SubmitError> {
        lock(&self.tasks).push(task.clone());
        match lock(&self.outcome).clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Publisher that records every response it is handed.
#[derive(Debug, Default)]
pub struct RecordingPublisher {
    published: Mutex<Vec<Vec<u8>>>,
}

impl RecordingPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn published(&self) -> Vec<Vec<u8>> {
        lock(&self.published).clone()
    }
}

#[async_trait]
impl ResponsePublisher for RecordingPublisher {
    async fn publish(&self, response: &[u8]) -> Result<(), PublishError> {
        lock(&self.published).push(response.to_vec());
        Ok(())
    }
}
