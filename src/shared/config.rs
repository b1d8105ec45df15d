//! Command line and environment configuration
//!
//! Every setting is a flag with an environment fallback; `.env` is loaded
//! before parsing.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use crate::modules::bluesky::infrastructure::{ClientConfig, DEFAULT_SERVICE};
use crate::modules::bluesky::RetryPolicy;
use crate::modules::pipeline::{DriverPaths, PacingPolicy, PipelineSettings};
use crate::shared::errors::{AppError, AppResult};

#[derive(Debug, Parser)]
#[command(name = "starter-packs")]
#[command(about = "Collect Bluesky starter packs and their members")]
#[command(version)]
pub struct Cli {
    /// Append log output to this file as well as stderr
    #[arg(long, env = "LOG_FILE", default_value = "data_processor.log", global = true)]
    pub log_file: PathBuf,

    /// Log to stderr only
    #[arg(long, default_value_t = false, global = true)]
    pub no_log_file: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Process the input file into the store and the export files
    Run(RunArgs),
    /// Rebuild both export files from the store
    Export(ExportArgs),
    /// Show the packs a member belongs to
    Member(MemberArgs),
    /// Collect starter pack links from the public directory into the input file
    Harvest(HarvestArgs),
}

#[derive(Debug, Clone, Args)]
pub struct ServiceArgs {
    #[arg(long, env = "BSKY_SERVICE", default_value = DEFAULT_SERVICE)]
    pub service: String,

    #[arg(long, env = "BSKY_USERNAME")]
    pub username: Option<String>,

    #[arg(long, env = "BSKY_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Client-side request budget
    #[arg(long, env = "BSKY_REQUESTS_PER_SECOND", default_value_t = 10)]
    pub requests_per_second: u32,
}

impl ServiceArgs {
    /// Username and password, both required to open a session
    pub fn credentials(&self) -> AppResult<(&str, &str)> {
        match (non_blank(&self.username), non_blank(&self.password)) {
            (Some(username), Some(password)) => Ok((username, password)),
            _ => Err(AppError::ConfigError(
                "BSKY_USERNAME and BSKY_PASSWORD must be set".to_string(),
            )),
        }
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            service: self.service.clone(),
            requests_per_second: self.requests_per_second,
            burst: self.requests_per_second,
            ..ClientConfig::default()
        }
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

#[derive(Debug, Clone, Args)]
pub struct StoreArgs {
    #[arg(long, env = "DATABASE_URL", default_value = "starterpacks.db")]
    pub database_url: String,

    #[arg(long, env = "DATABASE_POOL_SIZE", default_value_t = 4)]
    pub pool_size: u32,
}

#[derive(Debug, Clone, Args)]
pub struct OutputArgs {
    #[arg(long, env = "JSON_OUTPUT", default_value = "starter_packs.json")]
    pub json_output: PathBuf,

    #[arg(long, env = "YAML_OUTPUT", default_value = "starter_packs.yaml")]
    pub yaml_output: PathBuf,
}

#[derive(Debug, Clone, Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub service: ServiceArgs,

    #[command(flatten)]
    pub store: StoreArgs,

    #[command(flatten)]
    pub output: OutputArgs,

    /// One `handle|rkey` per line
    #[arg(long, env = "INPUT_FILE", default_value = "starter_pack_urls.txt")]
    pub input: PathBuf,

    #[arg(long, env = "CHECKPOINT_FILE", default_value = "checkpoint.txt")]
    pub checkpoint: PathBuf,

    /// Upper bound on member list pages read per pack
    #[arg(long, env = "LIST_PAGE_CAP", default_value_t = 50)]
    pub list_page_cap: u32,

    /// Handle resolution backoff unit; attempt n waits n times this
    #[arg(long, env = "RETRY_BASE_DELAY_MS", default_value_t = 2000)]
    pub retry_base_delay_ms: u64,

    #[arg(long, env = "SHORT_PAUSE_MS", default_value_t = 1000)]
    pub short_pause_ms: u64,

    #[arg(long, env = "LONG_PAUSE_MS", default_value_t = 5000)]
    pub long_pause_ms: u64,
}

impl RunArgs {
    pub fn driver_paths(&self) -> DriverPaths {
        DriverPaths {
            input: self.input.clone(),
            checkpoint: self.checkpoint.clone(),
            json_output: self.output.json_output.clone(),
            yaml_output: self.output.yaml_output.clone(),
        }
    }

    pub fn pipeline_settings(&self) -> PipelineSettings {
        PipelineSettings {
            retry: RetryPolicy::handle_resolution()
                .with_base_delay(Duration::from_millis(self.retry_base_delay_ms)),
            max_list_pages: self.list_page_cap,
        }
    }

    pub fn pacing(&self) -> PacingPolicy {
        PacingPolicy::with_pauses(
            Duration::from_millis(self.short_pause_ms),
            Duration::from_millis(self.long_pause_ms),
        )
    }
}

#[derive(Debug, Clone, Args)]
pub struct ExportArgs {
    #[command(flatten)]
    pub store: StoreArgs,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Debug, Clone, Args)]
pub struct MemberArgs {
    #[command(flatten)]
    pub store: StoreArgs,

    #[arg(long)]
    pub handle: String,
}

#[derive(Debug, Clone, Args)]
pub struct HarvestArgs {
    #[arg(long, env = "DIRECTORY_URL", default_value = crate::modules::harvest::DEFAULT_DIRECTORY_URL)]
    pub directory_url: String,

    /// Number of listing pages to walk, starting at 1
    #[arg(long, default_value_t = 3030)]
    pub pages: u32,

    /// Pages fetched at once
    #[arg(long, default_value_t = 5)]
    pub concurrency: usize,

    #[arg(long, env = "INPUT_FILE", default_value = "starter_pack_urls.txt")]
    pub output: PathBuf,
}
