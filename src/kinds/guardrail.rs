//! Guardrail registrations
//!
//! Exercises the non-string value columns: `threshold` is a double and
//! `blocking` a bool, both filterable through the query DSL.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::entity::{EntityKind, EntityRecord, PropertyRecord};
use crate::fields::{property, FieldTable};
use crate::kinds::{declared_bool, declared_double, declared_str};
use crate::value::{PropertyValue, ValueType};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Guardrail {
    pub id: Option<i64>,
    pub name: String,
    pub external_id: Option<String>,
    pub description: Option<String>,
    pub rule_type: Option<String>,
    pub enforcement: Option<String>,
    pub threshold: Option<f64>,
    pub blocking: Option<bool>,
    pub source_id: Option<String>,
    pub create_time_since_epoch: i64,
    pub last_update_time_since_epoch: i64,
    pub custom_properties: BTreeMap<String, PropertyValue>,
}

impl Guardrail {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

const FIELDS: FieldTable = &[
    ("description", property(ValueType::Str, "description")),
    ("ruleType", property(ValueType::Str, "rule_type")),
    ("enforcement", property(ValueType::Str, "enforcement")),
    ("threshold", property(ValueType::Double, "threshold")),
    ("blocking", property(ValueType::Bool, "blocking")),
    ("sourceId", property(ValueType::Str, "source_id")),
];

impl EntityKind for Guardrail {
    type Entity = Guardrail;
    const TYPE_ID: i64 = 5;
    const KIND: &'static str = "guardrail";

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
        declared_str(&mut props, entity_id, "rule_type", &entity.rule_type);
        declared_str(&mut props, entity_id, "enforcement", &entity.enforcement);
        declared_double(&mut props, entity_id, "threshold", entity.threshold);
        declared_bool(&mut props, entity_id, "blocking", entity.blocking);
        declared_str(&mut props, entity_id, "source_id", &entity.source_id);
        for (name, value) in &entity.custom_properties {
            props.push(PropertyRecord::custom(entity_id, name, value.clone()));
        }
        props
    }

    fn from_parts(record: EntityRecord, properties: Vec<PropertyRecord>) -> Self::Entity {
        let mut entity = Guardrail {
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
                "rule_type" => entity.rule_type = value.as_str().map(str::to_string),
                "enforcement" => entity.enforcement = value.as_str().map(str::to_string),
                "threshold" => entity.threshold = value.as_double(),
                "blocking" => entity.blocking = value.as_bool(),
                "source_id" => entity.source_id = value.as_str().map(str::to_string),
                _ => {
                    entity.custom_properties.insert(name.clone(), value);
                }
            }
        }
        entity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_property_mapping_round_trip() {
        let mut guardrail = Guardrail::new("pii-filter");
        guardrail.rule_type = Some("content".to_string());
        guardrail.threshold = Some(0.85);
        guardrail.blocking = Some(true);

        let record = Guardrail::to_record(&guardrail);
        let props = Guardrail::to_properties(&guardrail, 2);
        let rebuilt = Guardrail::from_parts(
            EntityRecord {
                id: Some(2),
                ..record
            },
            props,
        );
        assert_eq!(rebuilt.threshold, Some(0.85));
        assert_eq!(rebuilt.blocking, Some(true));
        assert!(rebuilt.enforcement.is_none());
    }
}
