//! SQLite-backed catalog store
//!
//! The store owns a single connection and hands out kind-typed repositories
//! over it. On open it checks the stored schema version and rebuilds the
//! schema from scratch on mismatch; the catalog is a registry populated by
//! its callers, so rebuilds lose no source of truth.

use rusqlite::Connection;
use tracing::{debug, info};

pub mod repo;
pub mod schema;
pub mod types;

pub use repo::Repository;
pub use types::{ListOptions, ListPage, OrderField, SortOrder};

use crate::config::StoreConfig;
use crate::entity::EntityKind;
use crate::error::{CatalogError, Result};

pub struct CatalogStore {
    conn: Connection,
    config: StoreConfig,
}

impl CatalogStore {
    /// Open the database at the configured path, creating it and its parent
    /// directory as needed.
    pub fn open(config: StoreConfig) -> Result<Self> {
        if let Some(parent) = config.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|source| CatalogError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        let conn = Connection::open(&config.path).map_err(open_err)?;
        conn.pragma_update(None, "journal_mode", "WAL").map_err(open_err)?;
        conn.pragma_update(None, "foreign_keys", "ON").map_err(open_err)?;

        let store = Self { conn, config };
        store.ensure_schema()?;
        info!(path = %store.config.path.display(), "catalog store opened");
        Ok(store)
    }

    /// In-memory store with default configuration, used by tests.
    pub fn open_in_memory() -> Result<Self> {
        Self::open_in_memory_with(StoreConfig::default())
    }

    pub fn open_in_memory_with(config: StoreConfig) -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(open_err)?;
        conn.pragma_update(None, "foreign_keys", "ON").map_err(open_err)?;
        let store = Self { conn, config };
        store.ensure_schema()?;
        Ok(store)
    }

    /// Typed repository over this store's connection.
    pub fn repository<K: EntityKind>(&self) -> Repository<'_, K> {
        Repository::new(self)
    }

    pub(crate) fn conn(&self) -> &Connection {
        &self.conn
    }

    pub(crate) fn config(&self) -> &StoreConfig {
        &self.config
    }

    fn ensure_schema(&self) -> Result<()> {
        let stored = schema::stored_version(&self.conn).map_err(open_err)?;
        match stored {
            Some(version) if version == schema::SCHEMA_VERSION => {
                debug!(version, "schema up to date");
            }
            Some(version) => {
                info!(
                    stored = version,
                    current = schema::SCHEMA_VERSION,
                    "schema version changed, rebuilding"
                );
                schema::drop_schema(&self.conn).map_err(open_err)?;
                schema::init_schema(&self.conn).map_err(open_err)?;
            }
            None => {
                debug!(version = schema::SCHEMA_VERSION, "initializing schema");
                schema::init_schema(&self.conn).map_err(open_err)?;
            }
        }
        Ok(())
    }
}

fn open_err(source: rusqlite::Error) -> CatalogError {
    CatalogError::Store {
        op: "open",
        kind: "store",
        source,
    }
}
