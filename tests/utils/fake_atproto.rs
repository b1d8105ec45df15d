/// In-process stand-in for the remote AT Protocol service
use async_trait::async_trait;
use serde_json::{json, Value};
use starter_packs_lib::modules::bluesky::domain::{
    AtprotoApi, Did, ListPage, Profile, RecordView, STARTER_PACK_COLLECTION,
};
use starter_packs_lib::shared::errors::{AppError, AppResult};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

pub struct FakeMember<'a> {
    pub did: &'a str,
    pub handle: &'a str,
    pub display_name: Option<&'a str>,
}

pub fn member<'a>(did: &'a str, handle: &'a str) -> FakeMember<'a> {
    FakeMember {
        did,
        handle,
        display_name: None,
    }
}

#[derive(Default)]
pub struct FakeAtproto {
    handles: HashMap<String, String>,
    records: HashMap<(String, String), Value>,
    lists: HashMap<String, Vec<Value>>,
    profiles: HashMap<String, Profile>,
    failing_profiles: HashSet<String>,
    failing_lists: HashSet<String>,
    page_size: Option<usize>,

    pub resolve_calls: AtomicUsize,
    pub record_calls: AtomicUsize,
    pub list_calls: AtomicUsize,
    pub profile_calls: AtomicUsize,
    resolved: std::sync::Mutex<Vec<String>>,
}

pub fn list_uri(creator_did: &str, rkey: &str) -> String {
    format!("at://{}/app.bsky.graph.list/{}-members", creator_did, rkey)
}

impl FakeAtproto {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve list members `size` at a time
    pub fn with_page_size(mut self, size: usize) -> Self {
        self.page_size = Some(size);
        self
    }

    pub fn with_handle(mut self, handle: &str, did: &str) -> Self {
        self.handles.insert(handle.to_string(), did.to_string());
        self
    }

    /// Register a creator, their pack record, its list and every member profile
    pub fn with_pack(
        mut self,
        creator_handle: &str,
        creator_did: &str,
        rkey: &str,
        name: &str,
        members: &[FakeMember<'_>],
    ) -> Self {
        self.handles
            .insert(creator_handle.to_string(), creator_did.to_string());

        let list = list_uri(creator_did, rkey);
        self.records.insert(
            (creator_did.to_string(), rkey.to_string()),
            json!({
                "$type": STARTER_PACK_COLLECTION,
                "name": name,
                "list": list,
                "createdAt": "2024-11-20T00:00:00Z"
            }),
        );

        let items = members
            .iter()
            .map(|m| {
                json!({
                    "uri": format!("{}/item-{}", list, m.handle),
                    "subject": { "did": m.did, "handle": m.handle }
                })
            })
            .collect();
        self.lists.insert(list, items);

        for m in members {
            self.profiles.insert(
                m.did.to_string(),
                Profile {
                    did: Did::parse(m.did).expect("valid member did"),
                    handle: m.handle.to_string(),
                    display_name: m.display_name.map(str::to_string),
                },
            );
        }
        self
    }

    /// Pack whose record points at an empty list
    pub fn with_empty_pack(self, creator_handle: &str, creator_did: &str, rkey: &str) -> Self {
        self.with_pack(creator_handle, creator_did, rkey, "Empty", &[])
    }

    pub fn failing_profile(mut self, did: &str) -> Self {
        self.failing_profiles.insert(did.to_string());
        self
    }

    pub fn failing_list(mut self, creator_did: &str, rkey: &str) -> Self {
        self.failing_lists.insert(list_uri(creator_did, rkey));
        self
    }

    pub fn calls(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }

    /// Handles passed to `resolve_handle`, in call order
    pub fn resolved_handles(&self) -> Vec<String> {
        self.resolved.lock().expect("resolved handles").clone()
    }
}

#[async_trait]
impl AtprotoApi for FakeAtproto {
    async fn resolve_handle(&self, handle: &str) -> AppResult<Did> {
        self.resolve_calls.fetch_add(1, Ordering::SeqCst);
        self.resolved
            .lock()
            .expect("resolved handles")
            .push(handle.to_string());

        match self.handles.get(handle) {
            Some(did) => Did::parse(did),
            None => Err(AppError::ApiError(format!(
                "Unable to resolve handle: {}",
                handle
            ))),
        }
    }

    async fn get_record(&self, repo: &Did, collection: &str, rkey: &str) -> AppResult<RecordView> {
        self.record_calls.fetch_add(1, Ordering::SeqCst);
        assert_eq!(collection, STARTER_PACK_COLLECTION);

        self.records
            .get(&(repo.to_string(), rkey.to_string()))
            .map(|value| RecordView {
                uri: format!("at://{}/{}/{}", repo, collection, rkey),
                cid: Some("bafyfake".to_string()),
                value: value.clone(),
            })
            .ok_or_else(|| AppError::NotFound(format!("RecordNotFound: {}", rkey)))
    }

    async fn get_list_page(
        &self,
        list: &str,
        limit: u32,
        cursor: Option<String>,
    ) -> AppResult<ListPage> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing_lists.contains(list) {
            return Err(AppError::ExternalServiceError("getList failed (502)".into()));
        }

        let items = self
            .lists
            .get(list)
            .ok_or_else(|| AppError::NotFound(format!("List not found: {}", list)))?;

        let page_size = self.page_size.unwrap_or(limit as usize).max(1);
        let start: usize = cursor.as_deref().map_or(0, |c| c.parse().unwrap_or(0));
        let end = (start + page_size).min(items.len());
        let page = items.get(start..end).unwrap_or_default().to_vec();

        Ok(ListPage {
            items: page,
            cursor: (end < items.len()).then(|| end.to_string()),
        })
    }

    async fn get_profile(&self, actor: &Did) -> AppResult<Profile> {
        self.profile_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing_profiles.contains(actor.as_str()) {
            return Err(AppError::ExternalServiceError(format!(
                "getProfile failed for {}",
                actor
            )));
        }
        self.profiles
            .get(actor.as_str())
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Profile not found: {}", actor)))
    }
}
