use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Public web address of a starter pack
pub fn pack_url(creator_handle: &str, rkey: &str) -> String {
    format!("https://bsky.app/starter-pack/{}/{}", creator_handle, rkey)
}

/// Record key of a pack, taken from the last segment of its AT-URI
pub fn rkey_from_pack_id(pack_id: &str) -> &str {
    pack_id.rsplit('/').next().unwrap_or(pack_id)
}

/// One member's membership in one pack
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberEntry {
    /// Member DID
    pub identifier: String,
    pub handle: String,
    pub display_name: Option<String>,
    /// Starter pack AT-URI
    pub pack_id: String,
    pub pack_name: String,
    pub pack_creator_handle: String,
    pub added_at: NaiveDateTime,
}

/// Member as it appears inside an exported pack
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackUser {
    pub handle: String,
    /// Empty when the member has no display name
    pub display_name: String,
    pub did: String,
}

/// Exported view of a pack, derived from its stored member entries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackSummary {
    pub name: String,
    pub creator: String,
    pub rkey: String,
    pub url: String,
    pub user_count: usize,
    pub users: Vec<PackUser>,
}

impl PackSummary {
    /// Group entries of a single pack; `None` when there are none.
    ///
    /// Entries are expected in insertion order. Pack metadata comes from the
    /// first entry; later duplicates of an identifier are ignored.
    pub fn from_entries(entries: &[MemberEntry]) -> Option<Self> {
        let first = entries.first()?;
        let rkey = rkey_from_pack_id(&first.pack_id).to_string();

        let mut seen = HashSet::with_capacity(entries.len());
        let mut users: Vec<PackUser> = Vec::with_capacity(entries.len());
        for entry in entries.iter().filter(|e| e.pack_id == first.pack_id) {
            if !seen.insert(entry.identifier.as_str()) {
                continue;
            }
            users.push(PackUser {
                handle: entry.handle.clone(),
                display_name: entry.display_name.clone().unwrap_or_default(),
                did: entry.identifier.clone(),
            });
        }

        Some(Self {
            name: first.pack_name.clone(),
            creator: first.pack_creator_handle.clone(),
            url: pack_url(&first.pack_creator_handle, &rkey),
            rkey,
            user_count: users.len(),
            users,
        })
    }
}

/// A pack one member belongs to, as reported by the member lookup
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Membership {
    pub did: String,
    pub handle: String,
    pub display_name: Option<String>,
    pub pack_id: String,
    pub pack_name: String,
    pub pack_creator: String,
    pub url: String,
    pub added_at: NaiveDateTime,
}

impl From<MemberEntry> for Membership {
    fn from(entry: MemberEntry) -> Self {
        let url = pack_url(
            &entry.pack_creator_handle,
            rkey_from_pack_id(&entry.pack_id),
        );
        Self {
            did: entry.identifier,
            handle: entry.handle,
            display_name: entry.display_name,
            pack_id: entry.pack_id,
            pack_name: entry.pack_name,
            pack_creator: entry.pack_creator_handle,
            url,
            added_at: entry.added_at,
        }
    }
}
