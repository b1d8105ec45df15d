use crate::modules::members::domain::MemberEntry;
use crate::schema::member_entries;
use chrono::NaiveDateTime;
use diesel::prelude::*;

// For reading from database
#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = member_entries)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct MemberEntryModel {
    pub id: i32,
    pub identifier: String,
    pub handle: String,
    pub display_name: Option<String>,
    pub pack_id: String,
    pub pack_name: String,
    pub pack_creator_handle: String,
    pub added_at: NaiveDateTime,
}

// For inserting, and for overwriting the row on conflict. A missing display
// name clears the stored one.
#[derive(Insertable, AsChangeset, Debug, Clone)]
#[diesel(table_name = member_entries)]
#[diesel(treat_none_as_null = true)]
pub struct NewMemberEntry {
    pub identifier: String,
    pub handle: String,
    pub display_name: Option<String>,
    pub pack_id: String,
    pub pack_name: String,
    pub pack_creator_handle: String,
    pub added_at: NaiveDateTime,
}

impl From<&MemberEntry> for NewMemberEntry {
    fn from(entry: &MemberEntry) -> Self {
        Self {
            identifier: entry.identifier.clone(),
            handle: entry.handle.clone(),
            display_name: entry.display_name.clone(),
            pack_id: entry.pack_id.clone(),
            pack_name: entry.pack_name.clone(),
            pack_creator_handle: entry.pack_creator_handle.clone(),
            added_at: entry.added_at,
        }
    }
}

impl From<MemberEntryModel> for MemberEntry {
    fn from(model: MemberEntryModel) -> Self {
        Self {
            identifier: model.identifier,
            handle: model.handle,
            display_name: model.display_name,
            pack_id: model.pack_id,
            pack_name: model.pack_name,
            pack_creator_handle: model.pack_creator_handle,
            added_at: model.added_at,
        }
    }
}
