//! Error types for catalog storage and queries

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

use crate::query::{CompileError, ParseError};

pub type Result<T> = std::result::Result<T, CatalogError>;

#[derive(Debug, Error, Diagnostic)]
pub enum CatalogError {
    #[error("{kind} '{name}' not found")]
    #[diagnostic(code(mosaic::store::not_found))]
    NotFound { kind: &'static str, name: String },

    #[error("invalid filter query")]
    #[diagnostic(transparent)]
    Parse(#[from] ParseError),

    #[error("filter query cannot be compiled")]
    #[diagnostic(transparent)]
    Compile(#[from] CompileError),

    #[error("invalid page token '{0}'")]
    #[diagnostic(
        code(mosaic::store::page_token),
        help("page tokens come from a previous list call and are not meant to be edited")
    )]
    PageToken(String),

    #[error("{op} failed for {kind}")]
    #[diagnostic(code(mosaic::store::sqlite))]
    Store {
        op: &'static str,
        kind: &'static str,
        #[source]
        source: rusqlite::Error,
    },

    #[error("property '{name}' on entity {entity_id} has no usable value")]
    #[diagnostic(code(mosaic::store::malformed_property))]
    MalformedProperty { entity_id: i64, name: String },

    #[error("failed to prepare database path {path}")]
    #[diagnostic(code(mosaic::store::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
