use super::exporter::ExportSet;
use crate::modules::members::MemberRepository;
use crate::shared::errors::AppResult;
use crate::shared::utils::logger::TimedOperation;
use crate::{log_info, log_warn};

/// Write every stored pack, in first-insertion order, and finalize.
/// Returns the number of packs exported.
pub async fn rebuild_exports(
    repository: &dyn MemberRepository,
    exports: &mut ExportSet,
) -> AppResult<usize> {
    let timer = TimedOperation::new("export rebuild");
    let pack_ids = repository.list_pack_ids().await?;
    log_info!("Rebuilding exports for {} packs", pack_ids.len());

    let mut written = 0;
    for pack_id in &pack_ids {
        match repository.aggregate_pack(pack_id).await? {
            Some(summary) if summary.user_count > 0 => {
                exports.append_pack(&summary)?;
                written += 1;
            }
            _ => log_warn!("Pack {} has no stored members, leaving it out", pack_id),
        }
    }

    exports.finalize()?;
    timer.finish_with_info(&format!("{} packs", written));
    Ok(written)
}
