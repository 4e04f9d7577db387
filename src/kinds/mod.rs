//! Catalog kinds
//!
//! Each kind is a plain struct plus an [`EntityKind`](crate::EntityKind)
//! impl mapping it onto the shared entity/property tables. Optional fields
//! simply omit their property row; list filters resolve through the kind's
//! field table.

pub mod guardrail;
pub mod knowledge_source;
pub mod mcp_server;
pub mod model;
pub mod skill;

pub use guardrail::Guardrail;
pub use knowledge_source::KnowledgeSource;
pub use mcp_server::McpServer;
pub use model::CatalogModel;
pub use skill::Skill;

use crate::entity::PropertyRecord;
use crate::value::PropertyValue;

pub(crate) fn declared_str(
    props: &mut Vec<PropertyRecord>,
    entity_id: i64,
    name: &str,
    value: &Option<String>,
) {
    if let Some(v) = value {
        props.push(PropertyRecord::declared(
            entity_id,
            name,
            PropertyValue::Str(v.clone()),
        ));
    }
}

pub(crate) fn declared_int(
    props: &mut Vec<PropertyRecord>,
    entity_id: i64,
    name: &str,
    value: Option<i64>,
) {
    if let Some(v) = value {
        props.push(PropertyRecord::declared(entity_id, name, PropertyValue::Int(v)));
    }
}

pub(crate) fn declared_double(
    props: &mut Vec<PropertyRecord>,
    entity_id: i64,
    name: &str,
    value: Option<f64>,
) {
    if let Some(v) = value {
        props.push(PropertyRecord::declared(
            entity_id,
            name,
            PropertyValue::Double(v),
        ));
    }
}

pub(crate) fn declared_bool(
    props: &mut Vec<PropertyRecord>,
    entity_id: i64,
    name: &str,
    value: Option<bool>,
) {
    if let Some(v) = value {
        props.push(PropertyRecord::declared(
            entity_id,
            name,
            PropertyValue::Bool(v),
        ));
    }
}
