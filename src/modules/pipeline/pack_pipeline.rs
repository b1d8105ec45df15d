use std::sync::Arc;

use chrono::Utc;

use super::input::InputLine;
use super::stage::{Halt, SkipReason, Stage, StageOutcome};
use crate::modules::bluesky::application::{
    normalize_handle, HandleResolver, ProfileFetcher, RecordClient, RetryPolicy,
};
use crate::modules::bluesky::domain::{
    starter_pack_uri, AtprotoApi, Did, MemberReference, Profile, StarterPackRecord,
};
use crate::modules::export::ExportSet;
use crate::modules::members::{MemberEntry, MemberRepository, PackSummary};
use crate::shared::errors::AppResult;
use crate::shared::utils::logger::PipelineLog;

/// Knobs for the remote side of the pipeline
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub retry: RetryPolicy,
    pub max_list_pages: u32,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::handle_resolution(),
            max_list_pages: 50,
        }
    }
}

/// What happened to one pack
#[derive(Debug)]
pub enum PackOutcome {
    Exported(PackSummary),
    Skipped { stage: Stage, reason: SkipReason },
}

struct ResolvedPack {
    creator_handle: String,
    creator: Did,
    rkey: String,
}

/// Turns one input line into one exported pack
pub struct PackPipeline {
    resolver: HandleResolver,
    records: RecordClient,
    profiles: ProfileFetcher,
    repository: Arc<dyn MemberRepository>,
    log: Arc<dyn PipelineLog>,
}

impl PackPipeline {
    pub fn new(
        api: Arc<dyn AtprotoApi>,
        repository: Arc<dyn MemberRepository>,
        settings: PipelineSettings,
        log: Arc<dyn PipelineLog>,
    ) -> Self {
        Self {
            resolver: HandleResolver::new(api.clone(), settings.retry, log.clone()),
            records: RecordClient::new(api.clone(), log.clone(), settings.max_list_pages),
            profiles: ProfileFetcher::new(api, log.clone()),
            repository,
            log,
        }
    }

    /// Run every stage for `line`.
    ///
    /// Per-pack problems come back as [`PackOutcome::Skipped`]; only failures
    /// that must stop the whole run (export I/O) are returned as errors.
    pub async fn process(&self, line: &InputLine, exports: &mut ExportSet) -> AppResult<PackOutcome> {
        self.log.info(&format!(
            "Processing pack by {}: {}",
            line.creator_handle, line.rkey
        ));

        match self.run_stages(line, exports).await {
            Ok(summary) => {
                self.log.info(&format!(
                    "Exported pack {} ({} users)",
                    summary.rkey, summary.user_count
                ));
                Ok(PackOutcome::Exported(summary))
            }
            Err(Halt::Skip { stage, reason }) => {
                self.log.error(&format!(
                    "Skipping pack {} at {}: {}",
                    line.rkey, stage, reason
                ));
                Ok(PackOutcome::Skipped { stage, reason })
            }
            Err(Halt::Fatal { stage, error }) => {
                self.log.error(&format!(
                    "Stopping run at pack {} ({}): {}",
                    line.rkey, stage, error
                ));
                Err(error)
            }
        }
    }

    async fn run_stages(&self, line: &InputLine, exports: &mut ExportSet) -> Result<PackSummary, Halt> {
        let pack = self.resolve(line).await.at(Stage::Resolve)?;
        let record = self.fetch_record(&pack).await.at(Stage::FetchRecord)?;
        let members = self.fetch_members(&record).await.at(Stage::FetchMembers)?;
        let profiles = self.fetch_profiles(&members).await.at(Stage::FetchProfiles)?;
        self.persist(&pack, &record, profiles).await.at(Stage::Persist)?;
        let summary = self.aggregate(&record).await.at(Stage::Aggregate)?;
        Self::export(exports, &summary).at(Stage::Export)?;
        Ok(summary)
    }

    async fn resolve(&self, line: &InputLine) -> StageOutcome<ResolvedPack> {
        match self.resolver.resolve(&line.creator_handle).await {
            Some(creator) => StageOutcome::Continue(ResolvedPack {
                creator_handle: normalize_handle(&line.creator_handle),
                creator,
                rkey: line.rkey.clone(),
            }),
            None => StageOutcome::Skip(SkipReason::UnresolvedHandle(line.creator_handle.clone())),
        }
    }

    async fn fetch_record(&self, pack: &ResolvedPack) -> StageOutcome<StarterPackRecord> {
        match self.records.fetch_record(&pack.creator, &pack.rkey).await {
            Some(record) => StageOutcome::Continue(record),
            None => StageOutcome::Skip(SkipReason::RecordUnavailable(starter_pack_uri(
                &pack.creator,
                &pack.rkey,
            ))),
        }
    }

    async fn fetch_members(&self, record: &StarterPackRecord) -> StageOutcome<Vec<MemberReference>> {
        let members = self.records.fetch_list_members(&record.list).await;
        if members.is_empty() {
            return StageOutcome::Skip(SkipReason::NoMembers(record.list.clone()));
        }
        self.log
            .info(&format!("Processing {} users...", members.len()));
        StageOutcome::Continue(members)
    }

    async fn fetch_profiles(&self, members: &[MemberReference]) -> StageOutcome<Vec<Profile>> {
        let profiles: Vec<Profile> = self
            .profiles
            .fetch_all(members)
            .await
            .into_iter()
            .map(|(_, profile)| profile)
            .collect();

        if profiles.is_empty() {
            StageOutcome::Skip(SkipReason::NoProfiles)
        } else {
            StageOutcome::Continue(profiles)
        }
    }

    async fn persist(
        &self,
        pack: &ResolvedPack,
        record: &StarterPackRecord,
        profiles: Vec<Profile>,
    ) -> StageOutcome<usize> {
        let added_at = Utc::now().naive_utc();
        let entries: Vec<MemberEntry> = profiles
            .into_iter()
            .map(|profile| MemberEntry {
                identifier: profile.did.to_string(),
                handle: profile.handle,
                display_name: profile.display_name,
                pack_id: record.uri.clone(),
                pack_name: record.name.clone(),
                pack_creator_handle: pack.creator_handle.clone(),
                added_at,
            })
            .collect();

        match self.repository.upsert_members(&entries).await {
            Ok(0) => StageOutcome::Skip(SkipReason::NothingWritten),
            Ok(written) => {
                self.log.info(&format!(
                    "Saved {} users for pack {}",
                    written, pack.rkey
                ));
                StageOutcome::Continue(written)
            }
            Err(e) => StageOutcome::Skip(SkipReason::StoreFailure(e.to_string())),
        }
    }

    async fn aggregate(&self, record: &StarterPackRecord) -> StageOutcome<PackSummary> {
        match self.repository.aggregate_pack(&record.uri).await {
            Ok(Some(summary)) if summary.user_count > 0 => StageOutcome::Continue(summary),
            Ok(_) => StageOutcome::Skip(SkipReason::EmptyAggregate(record.uri.clone())),
            Err(e) => StageOutcome::Skip(SkipReason::StoreFailure(e.to_string())),
        }
    }

    fn export(exports: &mut ExportSet, summary: &PackSummary) -> StageOutcome<()> {
        match exports.append_pack(summary) {
            Ok(()) => StageOutcome::Continue(()),
            Err(e) => StageOutcome::Fatal(e),
        }
    }
}
