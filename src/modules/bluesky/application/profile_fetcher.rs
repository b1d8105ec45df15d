use std::sync::Arc;

use futures::future::join_all;

use crate::modules::bluesky::domain::{AtprotoApi, Did, MemberReference, Profile};
use crate::shared::utils::logger::PipelineLog;

pub struct ProfileFetcher {
    api: Arc<dyn AtprotoApi>,
    log: Arc<dyn PipelineLog>,
}

impl ProfileFetcher {
    pub fn new(api: Arc<dyn AtprotoApi>, log: Arc<dyn PipelineLog>) -> Self {
        Self { api, log }
    }

    pub async fn fetch_profile(&self, did: &Did) -> Option<Profile> {
        match self.api.get_profile(did).await {
            Ok(profile) => Some(profile),
            Err(e) => {
                self.log
                    .error(&format!("Error getting profile for {}: {}", did, e));
                None
            }
        }
    }

    /// Fetch every member's profile concurrently.
    ///
    /// Members whose profile cannot be read are dropped; the rest keep their
    /// input order.
    pub async fn fetch_all(&self, members: &[MemberReference]) -> Vec<(MemberReference, Profile)> {
        let results = join_all(members.iter().map(|member| async move {
            self.fetch_profile(&member.did)
                .await
                .map(|profile| (member.clone(), profile))
        }))
        .await;

        let fetched: Vec<_> = results.into_iter().flatten().collect();
        if fetched.len() < members.len() {
            self.log.warn(&format!(
                "Fetched {} of {} member profiles",
                fetched.len(),
                members.len()
            ));
        }
        fetched
    }
}
