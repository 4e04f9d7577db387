//! Skill registrations

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::entity::{EntityKind, EntityRecord, PropertyRecord};
use crate::fields::{property, FieldTable};
use crate::kinds::declared_str;
use crate::value::{PropertyValue, ValueType};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Skill {
    pub id: Option<i64>,
    pub name: String,
    pub external_id: Option<String>,
    pub description: Option<String>,
    pub version: Option<String>,
    pub language: Option<String>,
    pub status: Option<String>,
    pub source_id: Option<String>,
    pub create_time_since_epoch: i64,
    pub last_update_time_since_epoch: i64,
    pub custom_properties: BTreeMap<String, PropertyValue>,
}

impl Skill {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

const FIELDS: FieldTable = &[
    ("description", property(ValueType::Str, "description")),
    ("version", property(ValueType::Str, "version")),
    ("language", property(ValueType::Str, "language")),
    ("status", property(ValueType::Str, "status")),
    ("sourceId", property(ValueType::Str, "source_id")),
];

impl EntityKind for Skill {
    type Entity = Skill;
    const TYPE_ID: i64 = 4;
    const KIND: &'static str = "skill";

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
        declared_str(&mut props, entity_id, "version", &entity.version);
        declared_str(&mut props, entity_id, "language", &entity.language);
        declared_str(&mut props, entity_id, "status", &entity.status);
        declared_str(&mut props, entity_id, "source_id", &entity.source_id);
        for (name, value) in &entity.custom_properties {
            props.push(PropertyRecord::custom(entity_id, name, value.clone()));
        }
        props
    }

    fn from_parts(record: EntityRecord, properties: Vec<PropertyRecord>) -> Self::Entity {
        let mut entity = Skill {
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
                "version" => entity.version = value.as_str().map(str::to_string),
                "language" => entity.language = value.as_str().map(str::to_string),
                "status" => entity.status = value.as_str().map(str::to_string),
                "source_id" => entity.source_id = value.as_str().map(str::to_string),
                _ => {
                    entity.custom_properties.insert(name.clone(), value);
                }
            }
        }
        entity
    }
}
