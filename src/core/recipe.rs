//! Recipe building: staging request → task definition.
//!
//! A staging task runs three phases in sequence:
//! fetch (compiler, app bits, buildpacks, optional cache) → run tailor →
//! upload (droplet, cache). Cache transfers are best-effort; everything else
//! must succeed for the task to succeed.

use super::action::Action;
use super::config::StagerConfig;
use super::error::{DecodeError, Payload, StagerError, ValidationError};
use super::policy;
use super::resolver;
use super::routes::FileServerRoutes;
use super::tailor::TailorConfig;
use super::types::*;
use std::time::Duration;
use tracing::debug;

/// Wall-clock limit for the tailor run.
pub const STAGING_TIMEOUT: Duration = Duration::from_secs(15 * 60);

/// Check the fields without which no task can be built, in priority order.
pub fn validate_request(request: &StagingRequest) -> Result<(), ValidationError> {
    if request.app_id.is_empty() {
        return Err(ValidationError::MissingAppId);
    }
    if request.task_id.is_empty() {
        return Err(ValidationError::MissingTaskId);
    }
    if request.app_bits_download_uri.is_empty() {
        return Err(ValidationError::MissingAppBitsDownloadUri);
    }
    Ok(())
}

/// Deterministic task guid; resubmitting the same staging collides with the
/// task already held by the engine.
pub fn task_guid(app_id: &str, task_id: &str) -> String {
    format!("{}-{}", app_id, task_id)
}

/// Serialize the identity echoed back on task completion.
///
/// Failures share the [`DecodeError`] taxonomy with [`Payload::Annotation`],
/// the same error the completion path reports for this payload.
pub fn encode_annotation(app_id: &str, task_id: &str) -> Result<String, DecodeError> {
    serde_json::to_string(&StagingTaskAnnotation {
        app_id: app_id.to_string(),
        task_id: task_id.to_string(),
    })
    .map_err(|e| DecodeError::new(Payload::Annotation, e))
}

/// Decode a raw staging request payload.
pub fn decode_request(payload: &[u8]) -> Result<StagingRequest, DecodeError> {
    serde_json::from_slice(payload).map_err(|e| DecodeError::new(Payload::StagingRequest, e))
}

/// Builds staging task definitions against a fixed configuration.
#[derive(Debug, Clone, Copy)]
pub struct RecipeBuilder<'a> {
    config: &'a StagerConfig,
    routes: &'a FileServerRoutes,
}

impl<'a> RecipeBuilder<'a> {
    pub fn new(config: &'a StagerConfig, routes: &'a FileServerRoutes) -> Self {
        Self { config, routes }
    }

    /// Decode `payload` and build its task definition.
    pub fn build_recipe_from_json(
        &self,
        payload: &[u8],
        file_server_url: &str,
    ) -> Result<TaskDefinition, StagerError> {
        let request = decode_request(payload)?;
        self.build_recipe(&request, file_server_url)
    }

    /// Build the complete task definition for `request`.
    ///
    /// `file_server_url` is the discovered file server base address.
    pub fn build_recipe(
        &self,
        request: &StagingRequest,
        file_server_url: &str,
    ) -> Result<TaskDefinition, StagerError> {
        validate_request(request)?;

        let compiler_url = resolver::compiler_download_url(
            &request.stack,
            &self.config.compilers,
            file_server_url,
            self.routes,
        )?;

        let buildpack_order: Vec<String> =
            request.buildpacks.iter().map(|b| b.key.clone()).collect();
        let tailor = TailorConfig::new(buildpack_order);

        let fetch = self.fetch_phase(request, &tailor, &compiler_url)?;
        let run = self.run_phase(request, &tailor);
        let upload = self.upload_phase(request, &tailor, file_server_url)?;

        let guid = task_guid(&request.app_id, &request.task_id);
        let annotation = encode_annotation(&request.app_id, &request.task_id)?;

        debug!(
            task_guid = %guid,
            stack = %request.stack,
            buildpacks = request.buildpacks.len(),
            "built staging recipe"
        );

        Ok(TaskDefinition {
            task_guid: guid,
            domain: TASK_DOMAIN.to_string(),
            stack: request.stack.clone(),
            result_file: tailor.output_metadata.clone(),
            memory_mb: policy::effective(request.memory_mb, self.config.min_memory_mb),
            disk_mb: policy::effective(request.disk_mb, self.config.min_disk_mb),
            cpu_weight: STAGING_TASK_CPU_WEIGHT,
            actions: vec![fetch, run, upload],
            log: LogConfig {
                guid: request.app_id.clone(),
                source_name: LOG_SOURCE_NAME.to_string(),
            },
            completion_callback_url: self.config.callback_url.clone(),
            annotation,
        })
    }

    fn fetch_phase(
        &self,
        request: &StagingRequest,
        tailor: &TailorConfig,
        compiler_url: &str,
    ) -> Result<Action, StagerError> {
        let mut downloads = Vec::new();
        let mut names = Vec::new();

        downloads.push(Action::with_progress(
            Action::cached_download(
                compiler_url,
                tailor.executable_dir.clone(),
                format!("tailor-{}", request.stack),
            ),
            "",
            "",
            "Failed to Download Tailor",
        ));

        downloads.push(Action::with_progress(
            Action::download(request.app_bits_download_uri.clone(), tailor.app_dir.clone()),
            "",
            "Downloaded App Package",
            "Failed to Download App Package",
        ));
        names.push("app".to_string());

        let mut buildpack_names = Vec::new();
        for buildpack in &request.buildpacks {
            if buildpack.is_custom() {
                buildpack_names.push(buildpack.url.clone());
                continue;
            }
            buildpack_names.push(buildpack.name.clone());
            downloads.push(Action::with_progress(
                Action::cached_download(
                    buildpack.url.clone(),
                    tailor.buildpack_path(&buildpack.key),
                    buildpack.key.clone(),
                ),
                "",
                format!("Downloaded Buildpack: {}", buildpack.name),
                format!("Failed to Download Buildpack: {}", buildpack.name),
            ));
        }
        names.push(format!("buildpacks ({})", buildpack_names.join(", ")));

        let cache_url = resolver::build_artifacts_download_url(
            request.build_artifacts_cache_download_uri.as_deref(),
        )?;
        if let Some(cache_url) = cache_url {
            downloads.push(Action::best_effort(Action::with_progress(
                Action::download(cache_url, tailor.build_artifacts_cache_dir.clone()),
                "",
                "Downloaded Build Artifacts Cache",
                "No Build Artifacts Cache Found.  Proceeding...",
            )));
            names.push("artifacts cache".to_string());
        }

        Ok(Action::with_progress(
            Action::parallel(downloads),
            &format!("Fetching {}...", names.join(", ")),
            "Fetching complete",
            "Fetching failed",
        ))
    }

    fn run_phase(&self, request: &StagingRequest, tailor: &TailorConfig) -> Action {
        let nofile =
            policy::file_descriptor_limit(request.file_descriptors, self.config.min_file_descriptors);

        Action::with_progress(
            Action::Run {
                path: tailor.path(),
                args: tailor.args(),
                env: request.environment.clone(),
                timeout: STAGING_TIMEOUT,
                resource_limits: ResourceLimits { nofile },
            },
            "Staging...",
            "Staging Complete",
            "Staging Failed",
        )
    }

    fn upload_phase(
        &self,
        request: &StagingRequest,
        tailor: &TailorConfig,
        file_server_url: &str,
    ) -> Result<Action, StagerError> {
        let droplet_url = resolver::droplet_upload_url(
            &request.app_id,
            file_server_url,
            &request.droplet_upload_uri,
            self.routes,
        )?;
        let cache_url = resolver::build_artifacts_upload_url(
            &request.app_id,
            file_server_url,
            &request.build_artifacts_cache_upload_uri,
            self.routes,
        )?;

        let uploads = vec![
            Action::with_progress(
                Action::upload(tailor.output_droplet.clone(), droplet_url),
                "",
                "Droplet Uploaded",
                "Failed to Upload Droplet",
            ),
            // Attempted even when no cache was downloaded.
            Action::best_effort(Action::with_progress(
                Action::upload(tailor.output_build_artifacts_cache.clone(), cache_url),
                "",
                "Uploaded Build Artifacts Cache",
                "Failed to Upload Build Artifacts Cache.  Proceeding...",
            )),
        ];

        Ok(Action::with_progress(
            Action::parallel(uploads),
            "Uploading droplet, artifacts cache...",
            "Uploading complete",
            "Uploading failed",
        ))
    }
}
