/// Builders for a fully wired pipeline over temp files
use super::fake_atproto::FakeAtproto;
use super::test_db::TestDb;
use starter_packs_lib::modules::bluesky::RetryPolicy;
use starter_packs_lib::modules::members::{PackSummary, SqliteMemberRepository};
use starter_packs_lib::modules::pipeline::{
    DriverPaths, PacingPolicy, PackPipeline, PipelineDriver, PipelineSettings,
};
use starter_packs_lib::shared::utils::MemoryLog;
use std::fs;
use std::sync::Arc;

pub struct Workspace {
    pub db: TestDb,
    pub repository: Arc<SqliteMemberRepository>,
    pub log: Arc<MemoryLog>,
    pub paths: DriverPaths,
}

impl Workspace {
    pub fn new() -> Self {
        let db = TestDb::new();
        let repository = db.repository();
        let paths = DriverPaths {
            input: db.path("starter_pack_urls.txt"),
            checkpoint: db.path("checkpoint.txt"),
            json_output: db.path("starter_packs.json"),
            yaml_output: db.path("starter_packs.yaml"),
        };
        Self {
            db,
            repository,
            log: Arc::new(MemoryLog::new()),
            paths,
        }
    }

    pub fn write_input(&self, content: &str) {
        fs::write(&self.paths.input, content).expect("write input");
    }

    pub fn settings() -> PipelineSettings {
        PipelineSettings {
            retry: RetryPolicy::immediate(3),
            max_list_pages: 10,
        }
    }

    pub fn pipeline(&self, api: Arc<FakeAtproto>) -> PackPipeline {
        PackPipeline::new(
            api,
            self.repository.clone(),
            Self::settings(),
            self.log.clone(),
        )
    }

    pub fn driver(&self, api: Arc<FakeAtproto>) -> PipelineDriver {
        PipelineDriver::new(
            self.pipeline(api),
            self.paths.clone(),
            PacingPolicy::disabled(),
            self.log.clone(),
        )
    }

    pub fn checkpoint(&self) -> Option<String> {
        fs::read_to_string(&self.paths.checkpoint).ok()
    }

    pub fn json_packs(&self) -> Vec<PackSummary> {
        let content = fs::read_to_string(&self.paths.json_output).expect("read json export");
        serde_json::from_str(&content).expect("json export is a finalized array")
    }

    pub fn yaml_documents(&self) -> usize {
        let content = fs::read_to_string(&self.paths.yaml_output).expect("read yaml export");
        content.matches("---\n").count()
    }
}
