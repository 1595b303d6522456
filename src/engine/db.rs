use anyhow::{bail, Context, Result};
use rusqlite::Connection;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const DB_DIR: &str = ".taskfi";
pub const DB_FILE: &str = "state.db";

pub struct Db;

impl Db {
    /// Default database location relative to the working directory.
    #[must_use]
    pub fn default_path() -> PathBuf {
        Path::new(DB_DIR).join(DB_FILE)
    }

    /// Creates `dir` if needed, opens its database and applies the schema.
    ///
    /// # Errors
    /// Returns error if directory creation, DB opening, or migration fails.
    pub fn init(dir: &Path) -> Result<Connection> {
        if !dir.exists() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }

        let db_path = dir.join(DB_FILE);
        let conn = Connection::open(&db_path).context("Failed to open database")?;
        Self::migrate(&conn)?;
        debug!(path = %db_path.display(), "database initialized");

        Ok(conn)
    }

    /// Opens an existing database file.
    ///
    /// # Errors
    /// Returns error if the database file does not exist or cannot be opened.
    pub fn open(path: &Path) -> Result<Connection> {
        if !path.exists() {
            bail!("TaskFi not initialized. Run `taskfi init` first.");
        }
        let conn = Connection::open(path).context("Failed to open database")?;
        Self::migrate(&conn)?;
        Ok(conn)
    }

    /// Connects to the database in the working directory.
    ///
    /// # Errors
    /// Returns error if the database file does not exist or cannot be opened.
    pub fn connect() -> Result<Connection> {
        Self::open(&Self::default_path())
    }

    /// In-memory database with the schema applied.
    ///
    /// # Errors
    /// Returns error if migration fails.
    pub fn in_memory() -> Result<Connection> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;
        Self::migrate(&conn)?;
        Ok(conn)
    }

    /// Applies the schema migrations.
    fn migrate(conn: &Connection) -> Result<()> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS tasks (
                id INTEGER PRIMARY KEY,
                creator TEXT NOT NULL,
                description TEXT NOT NULL,
                deposit_wei TEXT NOT NULL,
                deadline INTEGER NOT NULL,
                coarse_status TEXT NOT NULL,
                proof_reference TEXT NOT NULL DEFAULT '',
                already_claimed INTEGER NOT NULL DEFAULT 0,
                fetched_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )",
            [],
        )
        .context("Failed to create tasks table")?;

        Ok(())
    }
}
