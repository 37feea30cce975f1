use std::path::Path;

use rusqlite::Connection;

use crate::error::{StoreError, StoreResult};

const DB_SCHEMA_VERSION: i64 = 1;

const SCHEMA_V1: &str = r#"
    CREATE TABLE collections (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        name TEXT NOT NULL,
        alias TEXT NOT NULL,
        description TEXT NOT NULL DEFAULT ''
    );
    CREATE INDEX collections_alias_idx ON collections(alias);

    CREATE TABLE fields (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        name TEXT NOT NULL,
        alias TEXT NOT NULL,
        field_type TEXT NOT NULL,
        collection_id INTEGER NOT NULL REFERENCES collections(id) ON DELETE CASCADE,
        is_list INTEGER NOT NULL DEFAULT 0,
        is_required INTEGER NOT NULL DEFAULT 0,
        display_field INTEGER NOT NULL DEFAULT 0,
        UNIQUE (collection_id, alias)
    );

    CREATE TABLE field_options (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        field_id INTEGER NOT NULL REFERENCES fields(id) ON DELETE CASCADE,
        option_type TEXT NOT NULL,
        value TEXT NOT NULL
    );
    CREATE INDEX field_options_field_idx ON field_options(field_id);

    CREATE TABLE contents (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        collection_id INTEGER NOT NULL REFERENCES collections(id) ON DELETE CASCADE
    );
    CREATE INDEX contents_collection_idx ON contents(collection_id);

    CREATE TABLE content_values (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        content_id INTEGER NOT NULL REFERENCES contents(id) ON DELETE CASCADE,
        field_id INTEGER NOT NULL REFERENCES fields(id) ON DELETE CASCADE,
        sort_index INTEGER NOT NULL CHECK (sort_index >= 1),
        value TEXT NOT NULL
    );
    CREATE INDEX content_values_content_idx ON content_values(content_id);
    CREATE INDEX content_values_field_value_idx ON content_values(field_id, value);

    CREATE TABLE assets (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        name TEXT NOT NULL,
        path TEXT NOT NULL
    );
"#;

/// Handle to the SQLite database file. Cheap to clone; every call opens its
/// own connection.
#[derive(Clone, Debug)]
pub struct SqliteStorage {
    pub path: String,
}

/// An open `BEGIN IMMEDIATE` transaction. Dropping it without `commit`
/// closes the connection, which rolls the transaction back.
pub struct SqliteTx {
    conn: Connection,
}

impl SqliteTx {
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    pub fn commit(self) -> StoreResult<()> {
        self.conn.execute_batch("COMMIT")?;
        Ok(())
    }

    pub fn rollback(self) -> StoreResult<()> {
        self.conn.execute_batch("ROLLBACK")?;
        Ok(())
    }
}

impl SqliteStorage {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_string_lossy().to_string(),
        }
    }

    /// Deletes the database file along with its WAL side files.
    pub fn reset_all(&self) -> StoreResult<()> {
        for suffix in ["", "-wal", "-shm"] {
            let path = format!("{}{}", self.path, suffix);
            if Path::new(&path).exists() {
                std::fs::remove_file(&path)?;
            }
        }
        Ok(())
    }

    pub fn init(&self) -> StoreResult<()> {
        self.with_conn(|_conn| Ok(()))
    }

    /// Opens a connection with the schema in place and runs `f` on it.
    pub fn with_conn<F, T>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&Connection) -> StoreResult<T>,
    {
        let conn = self.open()?;
        f(&conn)
    }

    pub fn begin_tx(&self) -> StoreResult<SqliteTx> {
        let conn = self.open()?;
        conn.execute_batch("BEGIN IMMEDIATE")?;
        Ok(SqliteTx { conn })
    }

    /// Runs `f` inside one transaction: committed if it returns `Ok`,
    /// rolled back otherwise.
    pub fn transaction<F, T>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&Connection) -> StoreResult<T>,
    {
        let tx = self.begin_tx()?;
        match f(tx.conn()) {
            Ok(value) => {
                tx.commit()?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback() {
                    log::warn!("rollback failed after {}: {}", err, rollback_err);
                }
                Err(err)
            }
        }
    }

    fn open(&self) -> rusqlite::Result<Connection> {
        let conn = Connection::open(&self.path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.busy_timeout(std::time::Duration::from_millis(500))?;

        Self::migrate(&conn)?;
        Ok(conn)
    }

    fn migrate(conn: &Connection) -> rusqlite::Result<()> {
        let version: i64 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;

        if version == DB_SCHEMA_VERSION {
            return Ok(());
        }

        log::info!(
            "SQLite schema migration: {} -> {}",
            version,
            DB_SCHEMA_VERSION
        );

        if version == 0 {
            conn.execute_batch(SCHEMA_V1)?;
            conn.pragma_update(None, "user_version", DB_SCHEMA_VERSION)?;
            return Ok(());
        }

        Err(rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::ErrorCode::SchemaChanged as i32),
            Some("database schema version mismatch; please run with --reset option".to_string()),
        ))
    }
}
