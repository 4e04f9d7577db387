//! Shared entity/property row shapes and the kind trait
//!
//! Every catalog kind stores its identity in the shared entity table and its
//! typed attributes in the property side table. The [`EntityKind`] trait is
//! the mapping layer between a kind's domain struct and those two row shapes;
//! the repository is generic over it and never learns kind-specific columns.

use chrono::Utc;

use crate::fields::FieldTable;
use crate::query::SelectBuilder;
use crate::store::ListOptions;
use crate::value::PropertyValue;

/// Milliseconds since the Unix epoch, the timestamp unit used everywhere.
pub fn epoch_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// One row of the shared entity table.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityRecord {
    pub id: Option<i64>,
    pub type_id: i64,
    pub name: String,
    pub external_id: Option<String>,
    pub create_time_since_epoch: i64,
    pub last_update_time_since_epoch: i64,
}

/// One row of the property side table.
///
/// `is_custom` separates schema-declared properties from caller-defined
/// ones, so a custom property may reuse a declared property's name without
/// ambiguity.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyRecord {
    pub entity_id: i64,
    pub name: String,
    pub is_custom: bool,
    pub value: PropertyValue,
}

impl PropertyRecord {
    pub fn declared(entity_id: i64, name: &str, value: PropertyValue) -> Self {
        Self {
            entity_id,
            name: name.to_string(),
            is_custom: false,
            value,
        }
    }

    pub fn custom(entity_id: i64, name: &str, value: PropertyValue) -> Self {
        Self {
            entity_id,
            name: name.to_string(),
            is_custom: true,
            value,
        }
    }
}

/// A storable catalog kind.
///
/// Implementations are pure data mappings. They own the kind's type
/// discriminator, its queryable field table, and the conversions between the
/// domain struct and entity/property rows.
pub trait EntityKind {
    /// The domain struct this kind stores.
    type Entity;

    /// Discriminator value in the entity table's `type_id` column.
    const TYPE_ID: i64;

    /// Kind name used in errors and logs.
    const KIND: &'static str;

    /// Queryable fields beyond the shared entity columns.
    fn fields() -> FieldTable;

    /// Entity-table row for this value.
    fn to_record(entity: &Self::Entity) -> EntityRecord;

    /// Property rows for this value, declared and custom.
    fn to_properties(entity: &Self::Entity, entity_id: i64) -> Vec<PropertyRecord>;

    /// Rebuild the domain struct from its stored rows.
    fn from_parts(record: EntityRecord, properties: Vec<PropertyRecord>) -> Self::Entity;

    /// Hook for kind-specific list filters carried in [`ListOptions::extras`].
    fn apply_list_filters(_builder: &mut SelectBuilder, _options: &ListOptions) {}
}
