//! Registered model entries
//!
//! The richest kind in the catalog. `tasks` is a string list stored
//! comma-joined in a single property, so it stays filterable with LIKE.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::entity::{EntityKind, EntityRecord, PropertyRecord};
use crate::fields::{property, FieldTable};
use crate::kinds::declared_str;
use crate::value::{PropertyValue, ValueType};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogModel {
    pub id: Option<i64>,
    pub name: String,
    pub external_id: Option<String>,
    pub description: Option<String>,
    pub provider: Option<String>,
    pub license: Option<String>,
    pub maturity: Option<String>,
    pub tasks: Vec<String>,
    pub source_id: Option<String>,
    pub create_time_since_epoch: i64,
    pub last_update_time_since_epoch: i64,
    pub custom_properties: BTreeMap<String, PropertyValue>,
}

impl CatalogModel {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

const FIELDS: FieldTable = &[
    ("description", property(ValueType::Str, "description")),
    ("provider", property(ValueType::Str, "provider")),
    ("license", property(ValueType::Str, "license")),
    ("maturity", property(ValueType::Str, "maturity")),
    ("tasks", property(ValueType::Str, "tasks")),
    ("sourceId", property(ValueType::Str, "source_id")),
];

impl EntityKind for CatalogModel {
    type Entity = CatalogModel;
    const TYPE_ID: i64 = 1;
    const KIND: &'static str = "model";

    fn fields() -> FieldTable {
        FIELDS
    }

    fn to_record(entity: &Self::Entity) -> EntityRecord {
        EntityRecord {
            id: entity.id,
            type_id: Self::TYPE_ID,
            name: entity.name.clone(),
            external_id: entity.external_id.clone(),
            create_time_since_epoch: entity.create_time_since_epoch,
            last_update_time_since_epoch: entity.last_update_time_since_epoch,
        }
    }

    fn to_properties(entity: &Self::Entity, entity_id: i64) -> Vec<PropertyRecord> {
        let mut props = Vec::new();
        declared_str(&mut props, entity_id, "description", &entity.description);
        declared_str(&mut props, entity_id, "provider", &entity.provider);
        declared_str(&mut props, entity_id, "license", &entity.license);
        declared_str(&mut props, entity_id, "maturity", &entity.maturity);
        if !entity.tasks.is_empty() {
            props.push(PropertyRecord::declared(
                entity_id,
                "tasks",
                PropertyValue::Str(entity.tasks.join(",")),
            ));
        }
        declared_str(&mut props, entity_id, "source_id", &entity.source_id);
        for (name, value) in &entity.custom_properties {
            props.push(PropertyRecord::custom(entity_id, name, value.clone()));
        }
        props
    }

    fn from_parts(record: EntityRecord, properties: Vec<PropertyRecord>) -> Self::Entity {
        let mut entity = CatalogModel {
            id: record.id,
            name: record.name,
            external_id: record.external_id,
            create_time_since_epoch: record.create_time_since_epoch,
            last_update_time_since_epoch: record.last_update_time_since_epoch,
            ..Self::default()
        };
        for PropertyRecord {
            name,
            is_custom,
            value,
            ..
        } in properties
        {
            if is_custom {
                entity.custom_properties.insert(name, value);
                continue;
            }
            match name.as_str() {
                "description" => entity.description = value.as_str().map(str::to_string),
                "provider" => entity.provider = value.as_str().map(str::to_string),
                "license" => entity.license = value.as_str().map(str::to_string),
                "maturity" => entity.maturity = value.as_str().map(str::to_string),
                "tasks" => {
                    entity.tasks = value
                        .as_str()
                        .map(|s| s.split(',').map(str::to_string).collect())
                        .unwrap_or_default();
                }
                "source_id" => entity.source_id = value.as_str().map(str::to_string),
                _ => {
                    entity.custom_properties.insert(name.clone(), value);
                }
            }
        }
        entity
    }
}
