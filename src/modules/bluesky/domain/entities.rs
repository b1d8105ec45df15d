/// Domain entities for the AT Protocol boundary
///
/// These are the shapes the ingestion pipeline reasons about. Wire responses are
/// mapped into them as soon as they cross the port.
use crate::shared::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Collection NSID that holds starter pack records
pub const STARTER_PACK_COLLECTION: &str = "app.bsky.graph.starterpack";

/// Stable decentralized identifier (`did:plc:...`, `did:web:...`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Did(String);

impl Did {
    pub fn parse(raw: &str) -> AppResult<Self> {
        let trimmed = raw.trim();
        let mut parts = trimmed.splitn(3, ':');
        match (parts.next(), parts.next(), parts.next()) {
            (Some("did"), Some(method), Some(id)) if !method.is_empty() && !id.is_empty() => {
                Ok(Self(trimmed.to_string()))
            }
            _ => Err(AppError::ValidationError(format!(
                "Not a DID: '{}'",
                raw
            ))),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Did {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Did {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Did::parse(&value)
    }
}

impl From<Did> for String {
    fn from(did: Did) -> Self {
        did.0
    }
}

/// `at://{did}/app.bsky.graph.starterpack/{rkey}`
pub fn starter_pack_uri(creator: &Did, rkey: &str) -> String {
    format!("at://{}/{}/{}", creator, STARTER_PACK_COLLECTION, rkey)
}

/// Starter pack record as published by its creator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StarterPackRecord {
    pub uri: String,
    pub name: String,
    pub description: Option<String>,
    /// AT-URI of the list holding the pack's members
    pub list: String,
}

#[derive(Debug, Deserialize)]
struct StarterPackValue {
    name: String,
    #[serde(default)]
    description: Option<String>,
    list: String,
}

impl StarterPackRecord {
    /// Map the `value` of a fetched record into a starter pack
    pub fn from_record_value(uri: &str, value: &Value) -> AppResult<Self> {
        let parsed: StarterPackValue = serde_json::from_value(value.clone()).map_err(|e| {
            AppError::SerializationError(format!("Malformed starter pack record {}: {}", uri, e))
        })?;

        if parsed.list.trim().is_empty() {
            return Err(AppError::ValidationError(format!(
                "Starter pack {} has no list reference",
                uri
            )));
        }

        Ok(Self {
            uri: uri.to_string(),
            name: parsed.name,
            description: parsed.description,
            list: parsed.list,
        })
    }
}

/// A list item pointing at a member identity
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MemberReference {
    pub did: Did,
}

impl MemberReference {
    /// Pull the member DID out of a list item.
    ///
    /// The service returns either `{ "did": .. }` or `{ "subject": { "did": .. } }`
    /// (and raw listitem records carry `subject` as a bare DID string).
    pub fn extract(item: &Value) -> Option<Self> {
        let raw = item
            .get("did")
            .and_then(Value::as_str)
            .or_else(|| match item.get("subject") {
                Some(Value::String(did)) => Some(did.as_str()),
                Some(subject) => subject.get("did").and_then(Value::as_str),
                None => None,
            })?;

        Did::parse(raw).ok().map(|did| Self { did })
    }
}

/// Display profile of a member
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub did: Did,
    pub handle: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn did_parse_accepts_known_methods() {
        assert!(Did::parse("did:plc:abc123").is_ok());
        assert!(Did::parse("did:web:example.com").is_ok());
        assert!(Did::parse("  did:plc:xyz ").is_ok());
    }

    #[test]
    fn did_parse_rejects_garbage() {
        assert!(Did::parse("alice.bsky.social").is_err());
        assert!(Did::parse("did:plc:").is_err());
        assert!(Did::parse("did::abc").is_err());
        assert!(Did::parse("").is_err());
    }

    #[test]
    fn starter_pack_uri_uses_collection() {
        let did = Did::parse("did:plc:creator").unwrap();
        assert_eq!(
            starter_pack_uri(&did, "abc123"),
            "at://did:plc:creator/app.bsky.graph.starterpack/abc123"
        );
    }

    #[test]
    fn record_value_maps_fields() {
        let value = json!({
            "$type": "app.bsky.graph.starterpack",
            "name": "Rustaceans",
            "description": "People writing Rust",
            "list": "at://did:plc:creator/app.bsky.graph.list/3kxyz",
            "createdAt": "2024-06-01T00:00:00Z"
        });

        let record = StarterPackRecord::from_record_value("at://x", &value).unwrap();
        assert_eq!(record.name, "Rustaceans");
        assert_eq!(record.description.as_deref(), Some("People writing Rust"));
        assert_eq!(record.list, "at://did:plc:creator/app.bsky.graph.list/3kxyz");
    }

    #[test]
    fn record_value_without_list_is_rejected() {
        let value = json!({ "name": "Empty" });
        assert!(StarterPackRecord::from_record_value("at://x", &value).is_err());

        let blank = json!({ "name": "Blank", "list": "  " });
        assert!(StarterPackRecord::from_record_value("at://x", &blank).is_err());
    }

    #[test]
    fn member_reference_from_direct_did() {
        let item = json!({ "did": "did:plc:member1" });
        let member = MemberReference::extract(&item).unwrap();
        assert_eq!(member.did.as_str(), "did:plc:member1");
    }

    #[test]
    fn member_reference_from_subject_object() {
        let item = json!({
            "uri": "at://did:plc:creator/app.bsky.graph.listitem/1",
            "subject": { "did": "did:plc:member2", "handle": "m2.test" }
        });
        let member = MemberReference::extract(&item).unwrap();
        assert_eq!(member.did.as_str(), "did:plc:member2");
    }

    #[test]
    fn member_reference_from_subject_string() {
        let item = json!({ "subject": "did:plc:member3" });
        assert_eq!(
            MemberReference::extract(&item).unwrap().did.as_str(),
            "did:plc:member3"
        );
    }

    #[test]
    fn member_reference_missing_identifier() {
        assert!(MemberReference::extract(&json!({ "uri": "at://x" })).is_none());
        assert!(MemberReference::extract(&json!({ "subject": { "handle": "h" } })).is_none());
        assert!(MemberReference::extract(&json!({ "did": "not-a-did" })).is_none());
    }

    #[test]
    fn profile_deserializes_camel_case() {
        let profile: Profile = serde_json::from_value(json!({
            "did": "did:plc:member1",
            "handle": "member1.test",
            "displayName": "Member One",
            "followersCount": 10
        }))
        .unwrap();
        assert_eq!(profile.display_name.as_deref(), Some("Member One"));

        let bare: Profile = serde_json::from_value(json!({
            "did": "did:plc:member2",
            "handle": "member2.test"
        }))
        .unwrap();
        assert!(bare.display_name.is_none());
    }
}
