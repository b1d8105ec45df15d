/// Test data builders with sensible defaults
use chrono::Utc;
use starter_packs_lib::modules::members::MemberEntry;

pub fn pack_uri(creator_did: &str, rkey: &str) -> String {
    format!("at://{}/app.bsky.graph.starterpack/{}", creator_did, rkey)
}

pub struct MemberEntryFactory {
    identifier: String,
    handle: String,
    display_name: Option<String>,
    pack_id: String,
    pack_name: String,
    pack_creator_handle: String,
}

impl MemberEntryFactory {
    pub fn new(identifier: &str) -> Self {
        let handle = identifier.rsplit(':').next().unwrap_or(identifier);
        Self {
            identifier: identifier.to_string(),
            handle: format!("{}.test", handle),
            display_name: None,
            pack_id: pack_uri("did:plc:alice", "abc123"),
            pack_name: "Test Pack".to_string(),
            pack_creator_handle: "alice.test".to_string(),
        }
    }

    pub fn handle(mut self, handle: &str) -> Self {
        self.handle = handle.to_string();
        self
    }

    pub fn display_name(mut self, name: &str) -> Self {
        self.display_name = Some(name.to_string());
        self
    }

    pub fn pack(mut self, pack_id: &str, name: &str, creator_handle: &str) -> Self {
        self.pack_id = pack_id.to_string();
        self.pack_name = name.to_string();
        self.pack_creator_handle = creator_handle.to_string();
        self
    }

    pub fn build(self) -> MemberEntry {
        MemberEntry {
            identifier: self.identifier,
            handle: self.handle,
            display_name: self.display_name,
            pack_id: self.pack_id,
            pack_name: self.pack_name,
            pack_creator_handle: self.pack_creator_handle,
            added_at: Utc::now().naive_utc(),
        }
    }
}
