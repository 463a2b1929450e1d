//! Local transports: a statically configured file server and a JSON-lines
//! sink standing in for the engine and the caller.

use super::{FileServerLocator, ResponsePublisher, TaskSubmitter};
use crate::core::error::{DiscoveryError, PublishError, SubmitError};
use crate::core::types::TaskDefinition;
use async_trait::async_trait;
use std::io::Write;
use std::sync::Mutex;

/// File server fixed by configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticFileServer {
    url: Option<String>,
}

impl StaticFileServer {
    pub fn new(url: Option<String>) -> Self {
        Self { url }
    }
}

#[async_trait]
impl FileServerLocator for StaticFileServer {
    async fn available_file_server(&self) -> Result<String, DiscoveryError> {
        self.url
            .clone()
            .filter(|u| !u.is_empty())
            .ok_or_else(|| DiscoveryError {
                message: "no file server configured".to_string(),
            })
    }
}

/// Writes each submitted task or published response as one JSON line.
pub struct JsonLineWriter<W: Write + Send> {
    out: Mutex<W>,
}

impl<W: Write + Send> JsonLineWriter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        match self.out.into_inner() {
            Ok(w) => w,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write_line(&self, bytes: &[u8]) -> Result<(), String> {
        let mut out = self.out.lock().map_err(|_| "writer lock poisoned".to_string())?;
        let out: &mut W = &mut out;
        let write = |out: &mut W| -> std::io::Result<()> {
            out.write_all(bytes)?;
            out.write_all(b"\n")?;
            out.flush()
        };
        write(out).map_err(|e| format!("write error: {}", e))
    }
}

#[async_trait]
impl<W: Write + Send> TaskSubmitter for JsonLineWriter<W> {
    async fn create_task(&self, task: &TaskDefinition) -> Result<(), SubmitError> {
        let json = serde_json::to_vec(task).map_err(|e| SubmitError::Failed {
            message: format!("encode task: {}", e),
        })?;
        self.write_line(&json)
            .map_err(|message| SubmitError::Failed { message })
    }
}

#[async_trait]
impl<W: Write + Send> ResponsePublisher for JsonLineWriter<W> {
    async fn publish(&self, response: &[u8]) -> Result<(), PublishError> {
        self.write_line(response)
            .map_err(|message| PublishError { message })
    }
}
