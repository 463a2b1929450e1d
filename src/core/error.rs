//! Typed errors for recipe building, response translation and staging.
//!
//! Messages are constant; the offending values travel in fields so callers
//! and tests can match on them without parsing strings.

use thiserror::Error;

/// Result type for the staging service.
pub type StagerResult<T> = Result<T, StagerError>;

/// A mandatory staging request field was empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("missing app id")]
    MissingAppId,
    #[error("missing task id")]
    MissingTaskId,
    #[error("missing app bits download uri")]
    MissingAppBitsDownloadUri,
}

/// A download or upload location could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    #[error("no compiler defined for requested stack")]
    NoCompilerDefined { stack: String },

    #[error("unsupported compiler URL scheme")]
    UnsupportedScheme { scheme: String },

    #[error("no available file server present")]
    NoFileServer,

    /// `reason` carries the parser's own message.
    #[error("invalid URI for {field}: {reason}")]
    InvalidUrl {
        field: &'static str,
        value: String,
        reason: String,
    },
}

impl ResolutionError {
    pub(crate) fn invalid_url(
        field: &'static str,
        value: impl Into<String>,
        reason: impl ToString,
    ) -> Self {
        Self::InvalidUrl {
            field,
            value: value.into(),
            reason: reason.to_string(),
        }
    }
}

/// Which payload failed to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Payload {
    StagingRequest,
    Annotation,
    StagingResult,
    TaskCallback,
    StagingResponse,
}

impl std::fmt::Display for Payload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StagingRequest => write!(f, "staging request"),
            Self::Annotation => write!(f, "task annotation"),
            Self::StagingResult => write!(f, "staging result"),
            Self::TaskCallback => write!(f, "task callback"),
            Self::StagingResponse => write!(f, "staging response"),
        }
    }
}

/// A JSON payload was malformed.
///
/// Also returned by the encoders (`encode_annotation`, response encoding) so
/// every payload failure is keyed by [`Payload`] alone.
#[derive(Debug, Error)]
#[error("malformed {payload}")]
pub struct DecodeError {
    pub payload: Payload,
    #[source]
    pub source: serde_json::Error,
}

impl DecodeError {
    pub(crate) fn new(payload: Payload, source: serde_json::Error) -> Self {
        Self { payload, source }
    }
}

/// Failure reported by the task submission client.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    /// The engine already holds a task with this guid.
    #[error("task guid already exists")]
    AlreadyExists { task_guid: String },

    #[error("{message}")]
    Failed { message: String },
}

/// Failure reported by file-server discovery.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("file server discovery failed: {message}")]
pub struct DiscoveryError {
    pub message: String,
}

/// Failure reported when delivering a response to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to publish staging response: {message}")]
pub struct PublishError {
    pub message: String,
}

/// Umbrella error for a staging round trip.
#[derive(Debug, Error)]
pub enum StagerError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Submit(#[from] SubmitError),

    #[error(transparent)]
    Publish(#[from] PublishError),
}
