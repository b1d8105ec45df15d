use std::sync::Arc;

use anyhow::{Context, Result};

use crate::log_info;
use crate::modules::bluesky::ClientConfig;
use crate::modules::harvest::{write_input_file, Collector, DirectoryHttpSource, HarvestSummary};
use crate::shared::config::HarvestArgs;

pub async fn harvest_links(args: &HarvestArgs) -> Result<HarvestSummary> {
    let source = DirectoryHttpSource::new(&args.directory_url, &ClientConfig::default().user_agent)?;
    let collector = Collector::new(Arc::new(source), args.concurrency)?;

    let (links, summary) = collector.collect(args.pages).await;
    write_input_file(&args.output, &links)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    log_info!(
        "Harvested {} unique links from {} pages ({} failed)",
        summary.unique_links,
        summary.pages,
        summary.failed_pages
    );
    Ok(summary)
}
