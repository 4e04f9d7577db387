//! Mosaic is an embedded metadata catalog: a small SQLite store for
//! heterogeneous registries of models, MCP servers, knowledge sources,
//! skills, and guardrails.
//!
//! Every kind shares one entity table for identity and one property table
//! for typed attributes, so adding a kind means writing a data mapping, not
//! a migration. A filter DSL (`field op value` clauses joined by `AND`)
//! compiles to parameterized SQL against those tables.
//!
//! ```no_run
//! use mosaic::{CatalogStore, ListOptions, McpServer, StoreConfig};
//!
//! # fn main() -> mosaic::Result<()> {
//! let store = CatalogStore::open(StoreConfig::default())?;
//! let servers = store.repository::<McpServer>();
//!
//! let mut fs = McpServer::new("filesystem");
//! fs.transport = Some("stdio".into());
//! servers.save(&fs)?;
//!
//! let page = servers.list(&ListOptions::with_filter("transport = 'stdio'"))?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod entity;
pub mod error;
pub mod fields;
pub mod kinds;
pub mod query;
pub mod store;
pub mod value;

pub use config::StoreConfig;
pub use entity::{EntityKind, EntityRecord, PropertyRecord};
pub use error::{CatalogError, Result};
pub use kinds::{CatalogModel, Guardrail, KnowledgeSource, McpServer, Skill};
pub use query::ParseMode;
pub use store::{CatalogStore, ListOptions, ListPage, OrderField, Repository, SortOrder};
pub use value::{PropertyValue, ValueType};
