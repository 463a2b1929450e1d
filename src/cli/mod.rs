//! CLI subcommands: validate, recipe, stage, respond, error-response.

use crate::core::config::{self, StagerConfig};
use crate::core::recipe::RecipeBuilder;
use crate::core::response;
use crate::core::routes::FileServerRoutes;
use crate::core::stager::Stager;
use crate::transport::local::{JsonLineWriter, StaticFileServer};
use clap::Subcommand;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate a stager config file
    Validate {
        /// Path to stager.yaml
        #[arg(short, long, default_value = "stager.yaml")]
        config: PathBuf,
    },

    /// Print the task definition for a staging request
    Recipe {
        /// Path to stager.yaml
        #[arg(short, long, default_value = "stager.yaml")]
        config: PathBuf,

        /// Staging request JSON file
        request: PathBuf,

        /// File server base URL (overrides file_server_url in the config)
        #[arg(long)]
        file_server: Option<String>,
    },

    /// Stage a request, writing the submitted task as a JSON line to stdout
    Stage {
        /// Path to stager.yaml
        #[arg(short, long, default_value = "stager.yaml")]
        config: PathBuf,

        /// Staging request JSON file
        request: PathBuf,
    },

    /// Translate a task completion callback into a staging response
    Respond {
        /// Task callback JSON file
        callback: PathBuf,
    },

    /// Build an error response straight from a staging request
    ErrorResponse {
        /// Staging request JSON file
        request: PathBuf,

        /// Error message to report
        #[arg(short, long)]
        message: String,
    },
}

/// Dispatch a CLI command.
pub async fn dispatch(cmd: Commands) -> Result<(), String> {
    match cmd {
        Commands::Validate { config } => cmd_validate(&config),
        Commands::Recipe {
            config,
            request,
            file_server,
        } => cmd_recipe(&config, &request, file_server),
        Commands::Stage { config, request } => cmd_stage(&config, &request).await,
        Commands::Respond { callback } => cmd_respond(&callback),
        Commands::ErrorResponse { request, message } => cmd_error_response(&request, &message),
    }
}

fn read_payload(path: &Path) -> Result<Vec<u8>, String> {
    std::fs::read(path).map_err(|e| format!("cannot read {}: {}", path.display(), e))
}

/// Parse and validate a config file, returning errors if invalid.
fn parse_and_validate(file: &Path) -> Result<StagerConfig, String> {
    let config = config::parse_config_file(file).map_err(|e| error_chain(&e))?;
    let issues = config::validate_config(&config);
    if issues.is_empty() {
        return Ok(config);
    }
    for issue in &issues {
        eprintln!("  ERROR: {}", issue);
    }
    Err("validation failed".to_string())
}

/// Render an error with its sources, outermost first.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

fn cmd_validate(file: &Path) -> Result<(), String> {
    let config = parse_and_validate(file)?;
    println!(
        "OK: {} ({} stacks, floors {}MB/{}MB/{} fds)",
        file.display(),
        config.compilers.len(),
        config.min_memory_mb,
        config.min_disk_mb,
        config.min_file_descriptors
    );
    Ok(())
}

fn cmd_recipe(file: &Path, request: &Path, file_server: Option<String>) -> Result<(), String> {
    let config = parse_and_validate(file)?;
    let payload = read_payload(request)?;
    let file_server = file_server
        .or_else(|| config.file_server_url.clone())
        .unwrap_or_default();

    let routes = FileServerRoutes::default();
    let task = RecipeBuilder::new(&config, &routes)
        .build_recipe_from_json(&payload, &file_server)
        .map_err(|e| error_chain(&e))?;

    let json = serde_json::to_string_pretty(&task).map_err(|e| format!("encode task: {}", e))?;
    println!("{}", json);
    Ok(())
}

async fn cmd_stage(file: &Path, request: &Path) -> Result<(), String> {
    let config = parse_and_validate(file)?;
    let payload = read_payload(request)?;

    let locator = Arc::new(StaticFileServer::new(config.file_server_url.clone()));
    let sink = Arc::new(JsonLineWriter::new(std::io::stdout()));
    let stager = Stager::new(config, locator, sink.clone(), sink);

    stager.stage(&payload).await.map_err(|e| error_chain(&e))
}

fn cmd_respond(callback: &Path) -> Result<(), String> {
    let payload = read_payload(callback)?;
    let callback = response::decode_callback(&payload).map_err(|e| error_chain(&e))?;
    let bytes = response::build_staging_response_json(&callback).map_err(|e| error_chain(&e))?;
    println!("{}", String::from_utf8_lossy(&bytes));
    Ok(())
}

fn cmd_error_response(request: &Path, message: &str) -> Result<(), String> {
    let payload = read_payload(request)?;
    let bytes = response::build_error_response_from_request(&payload, message)
        .map_err(|e| error_chain(&e))?;
    println!("{}", String::from_utf8_lossy(&bytes));
    Ok(())
}
