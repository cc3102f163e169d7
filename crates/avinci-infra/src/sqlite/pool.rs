//! Database pool with split reader/writer connections in WAL mode.
//!
//! Every chat turn appends two rows and every history request reads them back,
//! so reads get their own small pool while writes go through a single
//! connection. WAL keeps a history read from blocking behind an append.

use std::path::Path;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};

/// File name of the Avinci database inside the data directory.
pub const DATABASE_FILE: &str = "avinci.db";

/// Concurrent history reads served by the reader pool.
const READER_CONNECTIONS: u32 = 4;

/// How long a statement waits on the writer lock before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Split read/write pool over the Avinci database.
///
/// - `reader`: read-only pool for agent lookups and history reads.
/// - `writer`: one connection for turn appends, clears and purges.
#[derive(Clone)]
pub struct DatabasePool {
    pub reader: SqlitePool,
    pub writer: SqlitePool,
}

impl DatabasePool {
    /// Open `{data_dir}/avinci.db`, creating the file and applying migrations
    /// on first use.
    pub async fn open(data_dir: &Path) -> Result<Self, sqlx::Error> {
        let options = connect_options(data_dir);

        let writer = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options.clone())
            .await?;

        // Schema must exist before a read-only connection can open the file.
        sqlx::migrate!("../../migrations").run(&writer).await?;

        let reader = SqlitePoolOptions::new()
            .max_connections(READER_CONNECTIONS)
            .connect_with(options.read_only(true))
            .await?;

        tracing::debug!(path = %data_dir.join(DATABASE_FILE).display(), "database ready");

        Ok(Self { reader, writer })
    }
}

/// Connection settings for the database file under `data_dir`.
///
/// Foreign keys are on so that deleting a session row cascades to its turns.
pub fn connect_options(data_dir: &Path) -> SqliteConnectOptions {
    SqliteConnectOptions::new()
        .filename(data_dir.join(DATABASE_FILE))
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .foreign_keys(true)
        .busy_timeout(BUSY_TIMEOUT)
}

#[cfg(test)]
pub(crate) async fn test_pool() -> (tempfile::TempDir, DatabasePool) {
    let dir = tempfile::tempdir().unwrap();
    let pool = DatabasePool::open(dir.path()).await.unwrap();
    (dir, pool)
}
