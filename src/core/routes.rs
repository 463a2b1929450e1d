//! File-server route table.
//!
//! Maps the logical file-server handlers the stager needs to URL path
//! templates. Templates use `:name` placeholders for path parameters.

use std::fmt;

/// Query parameter carrying the caller's droplet destination.
pub const CC_DROPLET_UPLOAD_URI_KEY: &str = "cc-droplet-upload-uri";

/// Query parameter carrying the caller's build artifacts destination.
pub const CC_BUILD_ARTIFACTS_UPLOAD_URI_KEY: &str = "cc-build-artifacts-upload-uri";

/// A file-server handler the stager routes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileServerHandler {
    Static,
    UploadDroplet,
    UploadBuildArtifacts,
}

impl fmt::Display for FileServerHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static => write!(f, "static"),
            Self::UploadDroplet => write!(f, "upload_droplet"),
            Self::UploadBuildArtifacts => write!(f, "upload_build_artifacts"),
        }
    }
}

/// A single handler → path template entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub handler: FileServerHandler,
    pub path: String,
}

impl Route {
    /// Path segments with `:name` placeholders substituted. Every
    /// placeholder must be supplied with a non-empty value. Values are
    /// returned raw; callers encode them as single segments.
    pub fn segments_with_params(&self, params: &[(&str, &str)]) -> Result<Vec<String>, String> {
        let mut segments = Vec::new();
        for segment in self.path.split('/').filter(|s| !s.is_empty()) {
            match segment.strip_prefix(':') {
                Some(name) => {
                    let value = params
                        .iter()
                        .find(|(k, _)| *k == name)
                        .map(|(_, v)| *v)
                        .filter(|v| !v.is_empty())
                        .ok_or_else(|| format!("missing route param: {}", name))?;
                    segments.push(value.to_string());
                }
                None => segments.push(segment.to_string()),
            }
        }
        Ok(segments)
    }
}

/// The fixed route table of the file server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileServerRoutes {
    routes: Vec<Route>,
}

impl FileServerRoutes {
    pub fn new(routes: Vec<Route>) -> Self {
        Self { routes }
    }

    pub fn route_for(&self, handler: FileServerHandler) -> Option<&Route> {
        self.routes.iter().find(|r| r.handler == handler)
    }
}

impl Default for FileServerRoutes {
    fn default() -> Self {
        Self::new(vec![
            Route {
                handler: FileServerHandler::Static,
                path: "/v1/static/".to_string(),
            },
            Route {
                handler: FileServerHandler::UploadDroplet,
                path: "/v1/droplet/:guid".to_string(),
            },
            Route {
                handler: FileServerHandler::UploadBuildArtifacts,
                path: "/v1/build_artifacts/:app_guid".to_string(),
            },
        ])
    }
}
