use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use super::entities::{Did, Profile};
use crate::shared::errors::AppResult;

/// Raw record as returned by `com.atproto.repo.getRecord`
#[derive(Debug, Clone, Deserialize)]
pub struct RecordView {
    pub uri: String,
    #[serde(default)]
    pub cid: Option<String>,
    pub value: Value,
}

/// One page of `app.bsky.graph.getList`
///
/// Items stay untyped: the member representation is not consistent across
/// responses, see [`super::entities::MemberReference::extract`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListPage {
    #[serde(default)]
    pub items: Vec<Value>,
    #[serde(default)]
    pub cursor: Option<String>,
}

/// Port (interface) for the remote AT Protocol service.
/// Infrastructure implements this over XRPC; tests substitute fakes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AtprotoApi: Send + Sync {
    /// Resolve a normalized handle to its DID
    async fn resolve_handle(&self, handle: &str) -> AppResult<Did>;

    /// Fetch a single record by repo + collection + rkey
    async fn get_record(&self, repo: &Did, collection: &str, rkey: &str) -> AppResult<RecordView>;

    /// Fetch one page of list items
    async fn get_list_page(
        &self,
        list: &str,
        limit: u32,
        cursor: Option<String>,
    ) -> AppResult<ListPage>;

    /// Fetch a display profile
    async fn get_profile(&self, actor: &Did) -> AppResult<Profile>;
}
