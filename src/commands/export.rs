use std::sync::Arc;

use anyhow::{Context, Result};

use crate::log_info;
use crate::modules::export::{rebuild_exports, ExportMode, ExportSet};
use crate::modules::members::SqliteMemberRepository;
use crate::shared::config::ExportArgs;
use crate::shared::Database;

pub async fn export_store(args: &ExportArgs) -> Result<usize> {
    let db = Database::connect(&args.store.database_url, args.store.pool_size)
        .with_context(|| format!("Failed to open member store at {}", args.store.database_url))?;
    let repository = SqliteMemberRepository::new(Arc::new(db));

    let mut exports = ExportSet::open(
        &args.output.json_output,
        &args.output.yaml_output,
        ExportMode::Fresh,
    )
    .context("Failed to create export files")?;

    let written = rebuild_exports(&repository, &mut exports)
        .await
        .context("Export rebuild failed")?;
    log_info!(
        "Exported {} packs to {} and {}",
        written,
        args.output.json_output.display(),
        args.output.yaml_output.display()
    );
    Ok(written)
}
