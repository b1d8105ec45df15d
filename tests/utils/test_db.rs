/// Isolated SQLite store per test, removed with its temp directory
use starter_packs_lib::modules::members::SqliteMemberRepository;
use starter_packs_lib::shared::Database;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

pub struct TestDb {
    dir: TempDir,
    database: Arc<Database>,
}

impl TestDb {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let url = dir.path().join("members.db").to_string_lossy().to_string();
        let database = Database::connect(&url, 2).expect("open test database");
        Self {
            dir,
            database: Arc::new(database),
        }
    }

    pub fn database(&self) -> Arc<Database> {
        Arc::clone(&self.database)
    }

    pub fn repository(&self) -> Arc<SqliteMemberRepository> {
        Arc::new(SqliteMemberRepository::new(self.database()))
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }
}
