use std::sync::Arc;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::sql_types::Text;
use tokio::task;

use super::models::{MemberEntryModel, NewMemberEntry};
use crate::modules::members::domain::{MemberEntry, MemberRepository, PackSummary};
use crate::schema::member_entries;
use crate::shared::errors::{AppError, AppResult};
use crate::shared::Database;
use crate::{log_debug, log_error};

#[derive(QueryableByName)]
struct PackIdRow {
    #[diesel(sql_type = Text)]
    pack_id: String,
}

pub struct SqliteMemberRepository {
    db: Arc<Database>,
}

impl SqliteMemberRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl MemberRepository for SqliteMemberRepository {
    async fn upsert_members(&self, entries: &[MemberEntry]) -> AppResult<usize> {
        if entries.is_empty() {
            return Ok(0);
        }

        let db = Arc::clone(&self.db);
        let rows: Vec<NewMemberEntry> = entries.iter().map(NewMemberEntry::from).collect();

        task::spawn_blocking(move || -> AppResult<usize> {
            let mut conn = db.get_connection()?;

            conn.transaction::<_, AppError, _>(|conn| {
                let mut written = 0;
                for row in &rows {
                    let result = diesel::insert_into(member_entries::table)
                        .values(row)
                        .on_conflict((member_entries::identifier, member_entries::pack_id))
                        .do_update()
                        .set(row)
                        .execute(conn);

                    match result {
                        Ok(_) => written += 1,
                        Err(e) => log_error!(
                            "Failed to upsert member {} in {}: {}",
                            row.identifier,
                            row.pack_id,
                            e
                        ),
                    }
                }

                log_debug!("Upserted {}/{} member entries", written, rows.len());
                Ok(written)
            })
        })
        .await?
    }

    async fn aggregate_pack(&self, pack_id: &str) -> AppResult<Option<PackSummary>> {
        let db = Arc::clone(&self.db);
        let pack_id = pack_id.to_string();

        let models = task::spawn_blocking(move || -> AppResult<Vec<MemberEntryModel>> {
            let mut conn = db.get_connection()?;
            let models = member_entries::table
                .filter(member_entries::pack_id.eq(&pack_id))
                .order(member_entries::id.asc())
                .select(MemberEntryModel::as_select())
                .load(&mut conn)?;
            Ok(models)
        })
        .await??;

        let entries: Vec<MemberEntry> = models.into_iter().map(MemberEntry::from).collect();
        Ok(PackSummary::from_entries(&entries))
    }

    async fn list_pack_ids(&self) -> AppResult<Vec<String>> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> AppResult<Vec<String>> {
            let mut conn = db.get_connection()?;
            let rows = diesel::sql_query(
                "SELECT pack_id FROM member_entries GROUP BY pack_id ORDER BY MIN(id)",
            )
            .load::<PackIdRow>(&mut conn)?;
            Ok(rows.into_iter().map(|row| row.pack_id).collect())
        })
        .await?
    }

    async fn find_by_handle(&self, handle: &str) -> AppResult<Vec<MemberEntry>> {
        let db = Arc::clone(&self.db);
        let handle = handle.trim().to_lowercase();

        let models = task::spawn_blocking(move || -> AppResult<Vec<MemberEntryModel>> {
            let mut conn = db.get_connection()?;
            let models = member_entries::table
                .filter(member_entries::handle.eq(&handle))
                .order(member_entries::id.asc())
                .select(MemberEntryModel::as_select())
                .load(&mut conn)?;
            Ok(models)
        })
        .await??;

        Ok(models.into_iter().map(MemberEntry::from).collect())
    }
}
