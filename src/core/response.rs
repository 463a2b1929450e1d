//! Response building: task completion → caller-facing staging response.

use super::error::{DecodeError, Payload};
use super::types::{
    StagingRequest, StagingResponse, StagingResult, StagingTaskAnnotation, TaskCallbackResponse,
};

/// Recover the caller identity embedded in a task.
pub fn decode_annotation(annotation: &[u8]) -> Result<StagingTaskAnnotation, DecodeError> {
    serde_json::from_slice(annotation).map_err(|e| DecodeError::new(Payload::Annotation, e))
}

/// Decode a completion callback posted by the engine.
pub fn decode_callback(payload: &[u8]) -> Result<TaskCallbackResponse, DecodeError> {
    serde_json::from_slice(payload).map_err(|e| DecodeError::new(Payload::TaskCallback, e))
}

/// Translate a completed task into the caller's response.
///
/// An undecodable annotation is fatal: without it the response cannot be
/// routed. The result payload is only read for successful tasks.
pub fn build_staging_response(
    callback: &TaskCallbackResponse,
) -> Result<StagingResponse, DecodeError> {
    let annotation = decode_annotation(callback.annotation.as_bytes())?;

    if callback.failed {
        return Ok(StagingResponse::failure(
            annotation.app_id,
            annotation.task_id,
            callback.failure_reason.clone(),
        ));
    }

    let result: StagingResult = serde_json::from_str(&callback.result)
        .map_err(|e| DecodeError::new(Payload::StagingResult, e))?;

    Ok(StagingResponse::success(
        annotation.app_id,
        annotation.task_id,
        result,
    ))
}

/// [`build_staging_response`], serialized for the caller.
pub fn build_staging_response_json(
    callback: &TaskCallbackResponse,
) -> Result<Vec<u8>, DecodeError> {
    encode_response(&build_staging_response(callback)?)
}

/// Error response for a request that never became a task.
///
/// Identity comes straight from the raw request since no annotation exists.
pub fn build_error_response_from_request(
    request_payload: &[u8],
    error_message: &str,
) -> Result<Vec<u8>, DecodeError> {
    let request: StagingRequest = serde_json::from_slice(request_payload)
        .map_err(|e| DecodeError::new(Payload::StagingRequest, e))?;

    encode_response(&StagingResponse::failure(
        request.app_id,
        request.task_id,
        error_message.to_string(),
    ))
}

fn encode_response(response: &StagingResponse) -> Result<Vec<u8>, DecodeError> {
    serde_json::to_vec(response).map_err(|e| DecodeError::new(Payload::StagingResponse, e))
}
