//! Knowledge source registrations

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::entity::{EntityKind, EntityRecord, PropertyRecord};
use crate::fields::{property, FieldTable};
use crate::kinds::{declared_int, declared_str};
use crate::query::{param, SelectBuilder};
use crate::store::ListOptions;
use crate::value::{PropertyValue, ValueType};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeSource {
    pub id: Option<i64>,
    pub name: String,
    pub external_id: Option<String>,
    pub description: Option<String>,
    pub uri: Option<String>,
    /// Content format, e.g. `pdf` or `markdown`.
    pub format: Option<String>,
    pub status: Option<String>,
    pub document_count: Option<i64>,
    pub source_id: Option<String>,
    pub create_time_since_epoch: i64,
    pub last_update_time_since_epoch: i64,
    pub custom_properties: BTreeMap<String, PropertyValue>,
}

impl KnowledgeSource {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

const FIELDS: FieldTable = &[
    ("description", property(ValueType::Str, "description")),
    ("uri", property(ValueType::Str, "uri")),
    ("format", property(ValueType::Str, "format")),
    ("status", property(ValueType::Str, "status")),
    ("documentCount", property(ValueType::Int, "document_count")),
    ("sourceId", property(ValueType::Str, "source_id")),
];

impl EntityKind for KnowledgeSource {
    type Entity = KnowledgeSource;
    const TYPE_ID: i64 = 3;
    const KIND: &'static str = "knowledge_source";

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
        declared_str(&mut props, entity_id, "uri", &entity.uri);
        declared_str(&mut props, entity_id, "format", &entity.format);
        declared_str(&mut props, entity_id, "status", &entity.status);
        declared_int(&mut props, entity_id, "document_count", entity.document_count);
        declared_str(&mut props, entity_id, "source_id", &entity.source_id);
        for (name, value) in &entity.custom_properties {
            props.push(PropertyRecord::custom(entity_id, name, value.clone()));
        }
        props
    }

    fn from_parts(record: EntityRecord, properties: Vec<PropertyRecord>) -> Self::Entity {
        let mut entity = KnowledgeSource {
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
                "uri" => entity.uri = value.as_str().map(str::to_string),
                "format" => entity.format = value.as_str().map(str::to_string),
                "status" => entity.status = value.as_str().map(str::to_string),
                "document_count" => entity.document_count = value.as_int(),
                "source_id" => entity.source_id = value.as_str().map(str::to_string),
                _ => {
                    entity.custom_properties.insert(name.clone(), value);
                }
            }
        }
        entity
    }

    fn apply_list_filters(builder: &mut SelectBuilder, options: &ListOptions) {
        if let Some(format) = options.extras.get("format") {
            let alias = builder.property_join("format", false);
            builder.push_where(
                format!("LOWER({alias}.string_value) = LOWER(?)"),
                vec![param(format.clone())],
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_property_mapping_round_trip() {
        let mut source = KnowledgeSource::new("runbooks");
        source.uri = Some("s3://docs/runbooks".to_string());
        source.format = Some("markdown".to_string());
        source.document_count = Some(240);

        let record = KnowledgeSource::to_record(&source);
        let props = KnowledgeSource::to_properties(&source, 9);
        let rebuilt = KnowledgeSource::from_parts(
            EntityRecord {
                id: Some(9),
                ..record
            },
            props,
        );
        assert_eq!(rebuilt.format.as_deref(), Some("markdown"));
        assert_eq!(rebuilt.document_count, Some(240));
    }
}
