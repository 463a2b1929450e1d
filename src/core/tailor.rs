//! On-worker layout and command line of the build tool ("tailor").

use md5::{Digest, Md5};

/// Fixed paths the build tool reads from and writes to inside the container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TailorConfig {
    pub executable_dir: String,
    pub app_dir: String,
    pub build_artifacts_cache_dir: String,
    pub buildpacks_dir: String,
    pub output_build_artifacts_cache: String,
    pub output_droplet: String,
    pub output_metadata: String,
    buildpack_order: Vec<String>,
}

impl TailorConfig {
    pub fn new(buildpack_order: Vec<String>) -> Self {
        Self {
            executable_dir: "/tmp/circus".to_string(),
            app_dir: "/app".to_string(),
            build_artifacts_cache_dir: "/tmp/cache".to_string(),
            buildpacks_dir: "/tmp/buildpacks".to_string(),
            output_build_artifacts_cache: "/tmp/output-cache".to_string(),
            output_droplet: "/tmp/droplet".to_string(),
            output_metadata: "/tmp/result.json".to_string(),
            buildpack_order,
        }
    }

    /// Path of the build tool executable.
    pub fn path(&self) -> String {
        format!("{}/tailor", self.executable_dir)
    }

    /// Download directory for a buildpack: the lowercase hex MD5 of its key.
    /// The build tool looks buildpacks up under this exact name.
    pub fn buildpack_path(&self, key: &str) -> String {
        format!("{}/{:x}", self.buildpacks_dir, Md5::digest(key.as_bytes()))
    }

    /// Command-line flags in the order the build tool documents them.
    pub fn args(&self) -> Vec<String> {
        vec![
            format!("-appDir={}", self.app_dir),
            format!("-buildArtifactsCacheDir={}", self.build_artifacts_cache_dir),
            format!("-buildpackOrder={}", self.buildpack_order.join(",")),
            format!("-buildpacksDir={}", self.buildpacks_dir),
            format!(
                "-outputBuildArtifactsCache={}",
                self.output_build_artifacts_cache
            ),
            format!("-outputDroplet={}", self.output_droplet),
            format!("-outputMetadata={}", self.output_metadata),
        ]
    }
}
