//! Field-to-column resolution for filterable fields
//!
//! Each entity kind declares a static table mapping the field names its
//! callers may filter on to a physical location: a column on the core entity
//! table, a named row in the property table, or (for anything undeclared) a
//! custom property. Resolution is total: an unknown field is never an error,
//! it falls through to custom string semantics. This is what keeps the query
//! compiler agnostic of any concrete entity kind.

use crate::value::ValueType;

/// Where a filterable field physically lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldLocation {
    /// A column on the shared entity table.
    EntityTable,
    /// A schema-declared row in the property table (`is_custom = 0`).
    PropertyTable,
    /// A free-form caller-defined property (`is_custom = 1`).
    Custom,
}

/// Static metadata for one filterable field.
#[derive(Debug, Clone, Copy)]
pub struct PropertyDefinition {
    pub location: FieldLocation,
    pub value_type: ValueType,
    /// Physical column name (entity table) or property name (property table).
    pub column: &'static str,
}

/// A kind's field table: data, not dispatch.
pub type FieldTable = &'static [(&'static str, PropertyDefinition)];

pub const fn entity_column(value_type: ValueType, column: &'static str) -> PropertyDefinition {
    PropertyDefinition {
        location: FieldLocation::EntityTable,
        value_type,
        column,
    }
}

pub const fn property(value_type: ValueType, column: &'static str) -> PropertyDefinition {
    PropertyDefinition {
        location: FieldLocation::PropertyTable,
        value_type,
        column,
    }
}

/// Fields every entity kind shares, mapped to entity-table columns.
pub const CORE_FIELDS: FieldTable = &[
    ("id", entity_column(ValueType::Int, "id")),
    ("name", entity_column(ValueType::Str, "name")),
    ("externalId", entity_column(ValueType::Str, "external_id")),
    (
        "createTimeSinceEpoch",
        entity_column(ValueType::Int, "create_time_since_epoch"),
    ),
    (
        "lastUpdateTimeSinceEpoch",
        entity_column(ValueType::Int, "last_update_time_since_epoch"),
    ),
];

/// A resolved field. The column borrows either a static table entry or, for
/// custom fields, the caller-supplied field name itself.
#[derive(Debug, Clone, Copy)]
pub struct FieldDef<'a> {
    pub location: FieldLocation,
    pub value_type: ValueType,
    pub column: &'a str,
}

/// Resolve a field name against a kind's table. Core fields are checked
/// first, then the kind's own declarations; everything else is custom.
pub fn resolve<'a>(fields: FieldTable, name: &'a str) -> FieldDef<'a> {
    for (field, def) in CORE_FIELDS.iter().chain(fields.iter()) {
        if *field == name {
            return FieldDef {
                location: def.location,
                value_type: def.value_type,
                column: def.column,
            };
        }
    }
    FieldDef {
        location: FieldLocation::Custom,
        value_type: ValueType::Str,
        column: name,
    }
}
