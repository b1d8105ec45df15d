use std::sync::Arc;

use anyhow::{Context, Result};

use crate::log_info;
use crate::modules::bluesky::BlueskyClient;
use crate::modules::members::SqliteMemberRepository;
use crate::modules::pipeline::{PackPipeline, PipelineDriver, RunSummary};
use crate::shared::config::RunArgs;
use crate::shared::utils::logger::{LogFacade, PipelineLog};
use crate::shared::Database;

pub async fn run_pipeline(args: &RunArgs) -> Result<RunSummary> {
    let (username, password) = args.service.credentials()?;

    let db = Database::connect(&args.store.database_url, args.store.pool_size)
        .with_context(|| format!("Failed to open member store at {}", args.store.database_url))?;
    log_info!("Connected to member store");

    let client = BlueskyClient::new(args.service.client_config())?;
    client
        .login(username, password)
        .await
        .with_context(|| format!("Failed to authenticate as {}", username))?;
    log_info!("Logged in to {}", args.service.service);

    let log: Arc<dyn PipelineLog> = Arc::new(LogFacade::default());
    let repository = Arc::new(SqliteMemberRepository::new(Arc::new(db)));
    let pipeline = PackPipeline::new(
        Arc::new(client),
        repository,
        args.pipeline_settings(),
        log.clone(),
    );
    let driver = PipelineDriver::new(pipeline, args.driver_paths(), args.pacing(), log);

    driver
        .run()
        .await
        .context("Pipeline stopped; rerun to resume from the checkpoint")
}
