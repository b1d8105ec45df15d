use crate::shared::errors::{AppError, AppResult};
use crate::shared::utils::logger::TimedOperation;
use crate::{log_info, log_warn};
use diesel::connection::SimpleConnection;
use diesel::r2d2::{self, ConnectionManager, CustomizeConnection, Pool};
use diesel::sqlite::SqliteConnection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use std::time::Duration;

pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;
pub type DbConnection = r2d2::PooledConnection<ConnectionManager<SqliteConnection>>;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

#[derive(Debug)]
pub struct Database {
    pool: DbPool,
}

impl Database {
    /// Open the store, build the pool and bring the schema up to date.
    ///
    /// Every failure here is a setup failure; callers abort the process.
    pub fn connect(database_url: &str, max_size: u32) -> AppResult<Self> {
        let database_url = Self::validate_database_url(database_url)?;
        let manager = ConnectionManager::<SqliteConnection>::new(database_url.clone());

        let pool = r2d2::Pool::builder()
            .max_size(max_size.max(1))
            .connection_timeout(Duration::from_secs(10)) // Time to wait for connection from pool
            .connection_customizer(Box::new(SqlitePragmas))
            .test_on_check_out(true)
            .build(manager)
            .map_err(|e| {
                AppError::DatabaseError(format!("Failed to create connection pool: {}", e))
            })?;

        log_info!(
            "Database connection pool initialized for '{}' with max_size: {}",
            database_url,
            pool.max_size()
        );

        let database = Self { pool };
        database.run_migrations()?;
        Ok(database)
    }

    fn validate_database_url(database_url: &str) -> AppResult<String> {
        let trimmed = database_url.trim();
        if trimmed.is_empty() {
            return Err(AppError::ConfigError(
                "DATABASE_URL must not be empty".to_string(),
            ));
        }

        if trimmed.starts_with("postgres://")
            || trimmed.starts_with("postgresql://")
            || trimmed.starts_with("mongodb://")
        {
            return Err(AppError::ConfigError(format!(
                "Unsupported database URL '{}': expected a SQLite path",
                trimmed
            )));
        }

        Ok(trimmed
            .strip_prefix("sqlite://")
            .unwrap_or(trimmed)
            .to_string())
    }

    /// Apply embedded migrations; returns how many were newly applied
    pub fn run_migrations(&self) -> AppResult<usize> {
        let timer = TimedOperation::new("database migrations");
        let mut conn = self.get_connection()?;
        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| AppError::DatabaseError(format!("Failed to run migrations: {}", e)))?;
        timer.finish_with_info(&format!("{} applied", applied.len()));
        Ok(applied.len())
    }

    pub fn get_connection(&self) -> AppResult<DbConnection> {
        let start = std::time::Instant::now();

        match self.pool.get() {
            Ok(conn) => {
                let duration = start.elapsed().as_millis() as u64;
                if duration > 100 {
                    log_warn!("Slow database connection acquire: {}ms", duration);
                }
                Ok(conn)
            }
            Err(e) => Err(AppError::from(e)),
        }
    }
}

/// Applied to every pooled connection.
///
/// `synchronous = FULL` makes a commit durable before the checkpoint that
/// follows it is written.
#[derive(Debug)]
struct SqlitePragmas;

impl CustomizeConnection<SqliteConnection, r2d2::Error> for SqlitePragmas {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), r2d2::Error> {
        conn.batch_execute(
            "PRAGMA busy_timeout = 5000; PRAGMA journal_mode = WAL; PRAGMA synchronous = FULL;",
        )
        .map_err(r2d2::Error::QueryError)
    }
}
