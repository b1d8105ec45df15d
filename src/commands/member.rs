use std::sync::Arc;

use anyhow::{Context, Result};

use crate::log_info;
use crate::modules::bluesky::application::normalize_handle;
use crate::modules::members::{MemberRepository, Membership, SqliteMemberRepository};
use crate::shared::config::MemberArgs;
use crate::shared::Database;

/// Print the member's packs as a JSON array on stdout
pub async fn show_member(args: &MemberArgs) -> Result<()> {
    let db = Database::connect(&args.store.database_url, args.store.pool_size)
        .with_context(|| format!("Failed to open member store at {}", args.store.database_url))?;
    let repository = SqliteMemberRepository::new(Arc::new(db));

    let handle = normalize_handle(&args.handle);
    let memberships: Vec<Membership> = repository
        .find_by_handle(&handle)
        .await?
        .into_iter()
        .map(Membership::from)
        .collect();

    log_info!("{} is in {} packs", handle, memberships.len());
    println!("{}", serde_json::to_string_pretty(&memberships)?);
    Ok(())
}
