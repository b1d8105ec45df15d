use std::collections::HashSet;
use std::sync::Arc;

use crate::modules::bluesky::domain::entities::STARTER_PACK_COLLECTION;
use crate::modules::bluesky::domain::{
    starter_pack_uri, AtprotoApi, Did, MemberReference, StarterPackRecord,
};
use crate::shared::utils::logger::PipelineLog;

/// Items requested per `getList` page (service maximum)
pub const LIST_PAGE_LIMIT: u32 = 100;

/// Reads starter pack records and their member lists.
///
/// Single attempt per call. Any failure is logged and surfaces as `None` or an
/// empty member list, which the pipeline treats as "this pack cannot be processed".
pub struct RecordClient {
    api: Arc<dyn AtprotoApi>,
    log: Arc<dyn PipelineLog>,
    max_pages: u32,
}

impl RecordClient {
    pub fn new(api: Arc<dyn AtprotoApi>, log: Arc<dyn PipelineLog>, max_pages: u32) -> Self {
        Self {
            api,
            log,
            max_pages: max_pages.max(1),
        }
    }

    pub async fn fetch_record(&self, creator: &Did, rkey: &str) -> Option<StarterPackRecord> {
        let uri = starter_pack_uri(creator, rkey);
        self.log.debug(&format!("Fetching record: {}", uri));

        let view = match self
            .api
            .get_record(creator, STARTER_PACK_COLLECTION, rkey)
            .await
        {
            Ok(view) => view,
            Err(e) => {
                self.log.error(&format!("Error getting {}: {}", uri, e));
                return None;
            }
        };

        match StarterPackRecord::from_record_value(&uri, &view.value) {
            Ok(record) => {
                self.log.info(&format!(
                    "Pack name: {} | list: {}",
                    record.name, record.list
                ));
                Some(record)
            }
            Err(e) => {
                self.log
                    .error(&format!("No usable value in record {}: {}", uri, e));
                None
            }
        }
    }

    /// Every member of the list, following the cursor page by page.
    ///
    /// A failure on any page yields an empty result: a partially read list is
    /// never handed on as if it were complete.
    pub async fn fetch_list_members(&self, list: &str) -> Vec<MemberReference> {
        self.log
            .info(&format!("Fetching list members for: {}", list));

        let mut members = Vec::new();
        let mut seen = HashSet::new();
        let mut cursor: Option<String> = None;

        for page_number in 1..=self.max_pages {
            let page = match self
                .api
                .get_list_page(list, LIST_PAGE_LIMIT, cursor.clone())
                .await
            {
                Ok(page) => page,
                Err(e) => {
                    self.log.error(&format!(
                        "Error getting list members for {} (page {}): {}",
                        list, page_number, e
                    ));
                    return Vec::new();
                }
            };

            for item in &page.items {
                match MemberReference::extract(item) {
                    Some(member) => {
                        if seen.insert(member.did.clone()) {
                            members.push(member);
                        }
                    }
                    None => self
                        .log
                        .warn(&format!("Could not extract DID from member: {}", item)),
                }
            }

            match page.cursor {
                Some(next) if !page.items.is_empty() && cursor.as_deref() != Some(next.as_str()) => {
                    cursor = Some(next);
                }
                _ => {
                    self.log.info(&format!(
                        "Found {} members in list {}",
                        members.len(),
                        list
                    ));
                    return members;
                }
            }
        }

        self.log.warn(&format!(
            "List {} still has more pages after {} pages; keeping the first {} members",
            list,
            self.max_pages,
            members.len()
        ));
        members
    }
}
