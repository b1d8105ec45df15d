use super::entities::{MemberEntry, PackSummary};
use crate::shared::errors::AppResult;
use async_trait::async_trait;

#[async_trait]
pub trait MemberRepository: Send + Sync {
    /// Insert or update each entry keyed by `(identifier, pack_id)`.
    /// Returns how many entries were written.
    async fn upsert_members(&self, entries: &[MemberEntry]) -> AppResult<usize>;

    /// Current state of one pack, `None` when nothing is stored for it
    async fn aggregate_pack(&self, pack_id: &str) -> AppResult<Option<PackSummary>>;

    /// Every stored pack, ordered by first insertion
    async fn list_pack_ids(&self) -> AppResult<Vec<String>>;

    /// All memberships recorded for a handle
    async fn find_by_handle(&self, handle: &str) -> AppResult<Vec<MemberEntry>>;
}
