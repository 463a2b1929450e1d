//! Staging service: request to task submission, completion to response.
//!
//! stage: decode, validate, discover file server, build recipe, submit.
//! Any failure is reported back to the caller when its identity can be
//! recovered from the request; otherwise it is logged as unroutable.

use super::config::StagerConfig;
use super::error::{ResolutionError, StagerError, StagerResult, SubmitError};
use super::recipe::{decode_request, validate_request, RecipeBuilder};
use super::response::{build_error_response_from_request, build_staging_response_json, decode_callback};
use super::routes::FileServerRoutes;
use super::types::TaskCallbackResponse;
use crate::transport::{FileServerLocator, ResponsePublisher, TaskSubmitter};
use std::sync::Arc;
use tracing::{info, warn};

/// Stateless staging front-end over the external collaborators.
#[derive(Clone)]
pub struct Stager {
    config: StagerConfig,
    routes: FileServerRoutes,
    locator: Arc<dyn FileServerLocator>,
    submitter: Arc<dyn TaskSubmitter>,
    publisher: Arc<dyn ResponsePublisher>,
}

impl Stager {
    pub fn new(
        config: StagerConfig,
        locator: Arc<dyn FileServerLocator>,
        submitter: Arc<dyn TaskSubmitter>,
        publisher: Arc<dyn ResponsePublisher>,
    ) -> Self {
        Self {
            config,
            routes: FileServerRoutes::default(),
            locator,
            submitter,
            publisher,
        }
    }

    /// Stage one request payload.
    ///
    /// On failure the caller is sent an error response (when routable) and
    /// the error is also returned.
    pub async fn stage(&self, payload: &[u8]) -> StagerResult<()> {
        match self.submit(payload).await {
            Ok(()) => Ok(()),
            Err(err) => {
                self.report_failure(payload, &err).await;
                Err(err)
            }
        }
    }

    async fn submit(&self, payload: &[u8]) -> StagerResult<()> {
        let request = decode_request(payload)?;
        validate_request(&request)?;

        let file_server = self.locator.available_file_server().await.map_err(|e| {
            warn!(app_id = %request.app_id, error = %e, "file server discovery failed");
            ResolutionError::NoFileServer
        })?;

        let task = RecipeBuilder::new(&self.config, &self.routes)
            .build_recipe(&request, &file_server)?;

        info!(task_guid = %task.task_guid, stack = %task.stack, "desiring staging task");

        match self.submitter.create_task(&task).await {
            Ok(()) => Ok(()),
            Err(SubmitError::AlreadyExists { task_guid }) => {
                info!(task_guid = %task_guid, "staging task already exists");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn report_failure(&self, payload: &[u8], err: &StagerError) {
        let response = match build_error_response_from_request(payload, &err.to_string()) {
            Ok(response) => response,
            Err(decode) => {
                warn!(error = %err, decode_error = %decode, "unroutable staging failure");
                return;
            }
        };
        if let Err(e) = self.publisher.publish(&response).await {
            warn!(error = %e, "failed to report staging failure");
        }
    }

    /// Translate a completion callback and deliver the response.
    pub async fn complete(&self, callback: &TaskCallbackResponse) -> StagerResult<()> {
        let response = build_staging_response_json(callback).map_err(|e| {
            warn!(task_guid = %callback.task_guid, error = %e, "unroutable task completion");
            e
        })?;
        info!(
            task_guid = %callback.task_guid,
            failed = callback.failed,
            "staging task completed"
        );
        self.publisher.publish(&response).await?;
        Ok(())
    }

    /// [`Stager::complete`] for a raw callback body.
    pub async fn complete_json(&self, payload: &[u8]) -> StagerResult<()> {
        let callback = decode_callback(payload)?;
        self.complete(&callback).await
    }
}
