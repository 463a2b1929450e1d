//! Wire types for staging requests, task definitions, callbacks and responses.
//!
//! Every type derives Serialize/Deserialize; all payloads travel as JSON with
//! snake_case field names.

use super::action::Action;
use serde::{Deserialize, Serialize};

/// Task domain under which every staging task is created.
pub const TASK_DOMAIN: &str = "cf-app-staging";

/// Relative CPU weight of a staging task.
pub const STAGING_TASK_CPU_WEIGHT: u32 = 50;

/// Log source name attached to staging task output.
pub const LOG_SOURCE_NAME: &str = "STG";

/// Reserved buildpack name marking a URL-addressed custom buildpack.
pub const CUSTOM_BUILDPACK: &str = "custom";

// ============================================================================
// Inbound staging request
// ============================================================================

/// A request to stage an application, as sent by the caller.
///
/// Every field defaults so that an empty identity surfaces as a validation
/// error rather than a decode error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StagingRequest {
    pub app_id: String,
    pub task_id: String,
    pub app_bits_download_uri: String,

    /// Detection order is the order of this list.
    pub buildpacks: Vec<Buildpack>,

    pub stack: String,

    /// Prior build artifacts cache; absent on first staging.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build_artifacts_cache_download_uri: Option<String>,

    pub build_artifacts_cache_upload_uri: String,
    pub droplet_upload_uri: String,
    pub environment: Vec<EnvironmentVariable>,
    pub memory_mb: u64,
    pub disk_mb: u64,

    /// `0` leaves the open-file limit unset.
    pub file_descriptors: u64,
}

/// A buildpack entry in a staging request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Buildpack {
    pub name: String,
    pub key: String,
    pub url: String,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub custom: bool,
}

impl Buildpack {
    /// Custom buildpacks are fetched by the build tool itself from `url`.
    pub fn is_custom(&self) -> bool {
        self.custom || self.name == CUSTOM_BUILDPACK
    }
}

/// A single environment variable passed to the build tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentVariable {
    pub name: String,
    pub value: String,
}

impl EnvironmentVariable {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

// ============================================================================
// Task definition (the recipe)
// ============================================================================

/// Resource limits applied to a run action.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceLimits {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nofile: Option<u64>,
}

/// Where the engine routes the task's log output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    pub guid: String,
    pub source_name: String,
}

/// A complete task handed to the execution engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDefinition {
    pub task_guid: String,
    pub domain: String,
    pub stack: String,
    pub result_file: String,
    pub memory_mb: u64,
    pub disk_mb: u64,
    pub cpu_weight: u32,

    /// Executed in sequence: fetch, run, upload.
    pub actions: Vec<Action>,

    pub log: LogConfig,
    pub completion_callback_url: String,

    /// JSON-encoded [`StagingTaskAnnotation`], echoed back on completion.
    pub annotation: String,
}

/// Caller identity carried through the engine inside a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagingTaskAnnotation {
    pub app_id: String,
    pub task_id: String,
}

// ============================================================================
// Completion callback and response
// ============================================================================

/// Payload the engine posts to the completion callback URL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskCallbackResponse {
    pub task_guid: String,
    pub failed: bool,
    pub failure_reason: String,

    /// Contents of the task's result file.
    pub result: String,

    pub annotation: String,
}

/// Result file written by the build tool on success.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StagingResult {
    pub buildpack_key: String,
    pub detected_buildpack: String,
    pub execution_metadata: String,
    pub detected_start_command: String,
}

/// The caller-facing outcome of a staging task.
///
/// Either `error` or the detection fields are populated, never both.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagingResponse {
    pub app_id: String,
    pub task_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buildpack_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detected_buildpack: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_metadata: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detected_start_command: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StagingResponse {
    /// A response carrying only identity and an error message.
    pub fn failure(app_id: String, task_id: String, error: String) -> Self {
        Self {
            app_id,
            task_id,
            error: Some(error),
            ..Self::default()
        }
    }

    /// A response carrying identity and the build tool's detection result.
    pub fn success(app_id: String, task_id: String, result: StagingResult) -> Self {
        Self {
            app_id,
            task_id,
            buildpack_key: Some(result.buildpack_key),
            detected_buildpack: Some(result.detected_buildpack),
            execution_metadata: Some(result.execution_metadata),
            detected_start_command: Some(result.detected_start_command),
            error: None,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
