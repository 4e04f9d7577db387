//! Generic repository over the entity/property tables
//!
//! One implementation serves every kind. All kind-specific knowledge comes
//! through the [`EntityKind`] trait: the type discriminator, the field table
//! the query compiler resolves against, and the row mappings.

use std::marker::PhantomData;

use rusqlite::{OptionalExtension, ToSql};
use tracing::debug;

use crate::entity::{epoch_millis, EntityKind, EntityRecord, PropertyRecord};
use crate::error::{CatalogError, Result};
use crate::query::compile::escape_like;
use crate::query::{compile_clauses, filter, param, SelectBuilder};
use crate::store::types::{ListOptions, ListPage};
use crate::store::CatalogStore;
use crate::value::PropertyValue;

const ENTITY_COLUMNS: &str =
    "e.id, e.type_id, e.name, e.external_id, e.create_time_since_epoch, \
     e.last_update_time_since_epoch";

pub struct Repository<'a, K: EntityKind> {
    store: &'a CatalogStore,
    _kind: PhantomData<K>,
}

impl<'a, K: EntityKind> Repository<'a, K> {
    pub(crate) fn new(store: &'a CatalogStore) -> Self {
        Self {
            store,
            _kind: PhantomData,
        }
    }

    /// Create or update an entity and replace its properties, in one
    /// transaction.
    ///
    /// With an id set this is an update and fails if the row is missing.
    /// Without one it upserts by `(type_id, name)`; a concurrent writer
    /// racing on the same name lands on the unique index and turns into an
    /// update, so creation time is preserved and no duplicate row appears.
    pub fn save(&self, entity: &K::Entity) -> Result<K::Entity> {
        let record = K::to_record(entity);
        let now = epoch_millis();
        let conn = self.store.conn();
        let tx = conn.unchecked_transaction().map_err(store_err::<K>("save"))?;

        let id = match record.id {
            Some(id) => {
                let updated = tx
                    .execute(
                        "UPDATE entities
                         SET name = ?1, external_id = ?2, last_update_time_since_epoch = ?3
                         WHERE id = ?4 AND type_id = ?5",
                        rusqlite::params![record.name, record.external_id, now, id, K::TYPE_ID],
                    )
                    .map_err(store_err::<K>("save"))?;
                if updated == 0 {
                    return Err(CatalogError::NotFound {
                        kind: K::KIND,
                        name: id.to_string(),
                    });
                }
                id
            }
            None => tx
                .query_row(
                    "INSERT INTO entities
                         (type_id, name, external_id,
                          create_time_since_epoch, last_update_time_since_epoch)
                     VALUES (?1, ?2, ?3, ?4, ?4)
                     ON CONFLICT (type_id, name) DO UPDATE SET
                         external_id = excluded.external_id,
                         last_update_time_since_epoch = excluded.last_update_time_since_epoch
                     RETURNING id",
                    rusqlite::params![K::TYPE_ID, record.name, record.external_id, now],
                    |row| row.get(0),
                )
                .map_err(store_err::<K>("save"))?,
        };

        tx.execute("DELETE FROM properties WHERE entity_id = ?1", [id])
            .map_err(store_err::<K>("save"))?;
        for property in K::to_properties(entity, id) {
            let column = property.value.value_type().column();
            let sql = format!(
                "INSERT INTO properties (entity_id, name, is_custom, {column})
                 VALUES (?1, ?2, ?3, ?4)"
            );
            tx.execute(
                &sql,
                rusqlite::params![id, property.name, property.is_custom, property.value],
            )
            .map_err(store_err::<K>("save"))?;
        }

        tx.commit().map_err(store_err::<K>("save"))?;
        debug!(kind = K::KIND, id, "entity saved");
        self.get_by_id(id)
    }

    /// Look up one entity of this kind by name.
    pub fn get_by_name(&self, name: &str) -> Result<K::Entity> {
        let sql = format!(
            "SELECT {ENTITY_COLUMNS} FROM entities e WHERE e.type_id = ?1 AND e.name = ?2"
        );
        let record = self
            .store
            .conn()
            .query_row(&sql, rusqlite::params![K::TYPE_ID, name], map_record)
            .optional()
            .map_err(store_err::<K>("get"))?
            .ok_or_else(|| CatalogError::NotFound {
                kind: K::KIND,
                name: name.to_string(),
            })?;
        self.hydrate(record)
    }

    /// List entities of this kind, filtered, ordered, and paged.
    pub fn list(&self, options: &ListOptions) -> Result<ListPage<K::Entity>> {
        let config = self.store.config();
        let mut builder = SelectBuilder::new();
        builder.push_where("e.type_id = ?", vec![param(K::TYPE_ID)]);

        if let Some(query) = &options.query {
            builder.push_where(
                "LOWER(e.name) LIKE LOWER(?) ESCAPE '\\'",
                vec![param(format!("%{}%", escape_like(query)))],
            );
        }
        if let Some(external_id) = &options.external_id {
            builder.push_where("e.external_id = ?", vec![param(external_id.clone())]);
        }
        if let Some(source_ids) = &options.source_ids {
            let alias = builder.property_join("source_id", false);
            let placeholders = vec!["?"; source_ids.len()].join(", ");
            builder.push_where(
                format!("{alias}.string_value IN ({placeholders})"),
                source_ids.iter().map(|s| param(s.clone())).collect(),
            );
        }
        if let Some(filter_query) = &options.filter_query {
            let clauses = filter::parse(filter_query, config.parse_mode)?;
            compile_clauses(&mut builder, K::fields(), &clauses)?;
        }
        K::apply_list_filters(&mut builder, options);

        // A zero bound in the config must not poison every list call.
        let max_page_size = config.max_page_size.max(1);
        let page_size = options
            .page_size
            .unwrap_or(config.default_page_size)
            .clamp(1, max_page_size) as i64;
        let offset: i64 = match &options.page_token {
            Some(token) => token
                .parse()
                .map_err(|_| CatalogError::PageToken(token.clone()))?,
            None => 0,
        };

        let tail = format!(
            "ORDER BY e.{} {}, e.id ASC LIMIT ? OFFSET ?",
            options.order_by.column(),
            options.sort_order.keyword()
        );
        let sql = builder.render(ENTITY_COLUMNS, &tail);
        let mut params = builder.into_params();
        // One extra row tells us whether another page exists.
        params.push(param(page_size + 1));
        params.push(param(offset));
        debug!(kind = K::KIND, sql = %sql, "list query");

        let conn = self.store.conn();
        let mut stmt = conn.prepare(&sql).map_err(store_err::<K>("list"))?;
        let param_refs: Vec<&dyn ToSql> = params.iter().map(|p| p.as_ref()).collect();
        let mut records = stmt
            .query_map(&param_refs[..], map_record)
            .map_err(store_err::<K>("list"))?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(store_err::<K>("list"))?;

        let has_more = records.len() as i64 > page_size;
        records.truncate(page_size as usize);
        let next_page_token = has_more.then(|| (offset + page_size).to_string());

        let mut items = Vec::with_capacity(records.len());
        for record in records {
            items.push(self.hydrate(record)?);
        }
        Ok(ListPage {
            items,
            next_page_token,
        })
    }

    /// Delete every entity of this kind whose `source_id` property matches.
    /// Property rows go with them via the cascade. Returns the entity count.
    pub fn delete_by_source(&self, source_id: &str) -> Result<usize> {
        let deleted = self
            .store
            .conn()
            .execute(
                "DELETE FROM entities
                 WHERE type_id = ?1 AND id IN (
                     SELECT entity_id FROM properties
                     WHERE name = 'source_id' AND is_custom = 0 AND string_value = ?2
                 )",
                rusqlite::params![K::TYPE_ID, source_id],
            )
            .map_err(store_err::<K>("delete_by_source"))?;
        debug!(kind = K::KIND, source_id, deleted, "entities deleted");
        Ok(deleted)
    }

    /// Distinct `source_id` values present for this kind, sorted.
    pub fn get_distinct_source_ids(&self) -> Result<Vec<String>> {
        let conn = self.store.conn();
        let mut stmt = conn
            .prepare(
                "SELECT DISTINCT p.string_value
                 FROM properties p
                 JOIN entities e ON e.id = p.entity_id
                 WHERE e.type_id = ?1 AND p.name = 'source_id' AND p.is_custom = 0
                   AND p.string_value IS NOT NULL
                 ORDER BY p.string_value",
            )
            .map_err(store_err::<K>("sources"))?;
        let ids = stmt
            .query_map([K::TYPE_ID], |row| row.get(0))
            .map_err(store_err::<K>("sources"))?
            .collect::<rusqlite::Result<Vec<String>>>()
            .map_err(store_err::<K>("sources"))?;
        Ok(ids)
    }

    /// Count entities of this kind, optionally limited to one source.
    pub fn count_by_source(&self, source_id: Option<&str>) -> Result<i64> {
        let conn = self.store.conn();
        let count = match source_id {
            Some(source_id) => conn.query_row(
                "SELECT COUNT(*) FROM entities
                 WHERE type_id = ?1 AND id IN (
                     SELECT entity_id FROM properties
                     WHERE name = 'source_id' AND is_custom = 0 AND string_value = ?2
                 )",
                rusqlite::params![K::TYPE_ID, source_id],
                |row| row.get(0),
            ),
            None => conn.query_row(
                "SELECT COUNT(*) FROM entities WHERE type_id = ?1",
                [K::TYPE_ID],
                |row| row.get(0),
            ),
        };
        count.map_err(store_err::<K>("count"))
    }

    fn get_by_id(&self, id: i64) -> Result<K::Entity> {
        let sql = format!(
            "SELECT {ENTITY_COLUMNS} FROM entities e WHERE e.id = ?1 AND e.type_id = ?2"
        );
        let record = self
            .store
            .conn()
            .query_row(&sql, rusqlite::params![id, K::TYPE_ID], map_record)
            .optional()
            .map_err(store_err::<K>("get"))?
            .ok_or_else(|| CatalogError::NotFound {
                kind: K::KIND,
                name: id.to_string(),
            })?;
        self.hydrate(record)
    }

    fn hydrate(&self, record: EntityRecord) -> Result<K::Entity> {
        let entity_id = record.id.unwrap_or_default();
        let properties = self.load_properties(entity_id)?;
        Ok(K::from_parts(record, properties))
    }

    fn load_properties(&self, entity_id: i64) -> Result<Vec<PropertyRecord>> {
        let conn = self.store.conn();
        let mut stmt = conn
            .prepare(
                "SELECT name, is_custom, int_value, double_value, string_value, bool_value
                 FROM properties WHERE entity_id = ?1",
            )
            .map_err(store_err::<K>("get"))?;
        let rows = stmt
            .query_map([entity_id], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, bool>(1)?,
                    row.get::<_, Option<i64>>(2)?,
                    row.get::<_, Option<f64>>(3)?,
                    row.get::<_, Option<String>>(4)?,
                    row.get::<_, Option<bool>>(5)?,
                ))
            })
            .map_err(store_err::<K>("get"))?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(store_err::<K>("get"))?;

        let mut properties = Vec::with_capacity(rows.len());
        for (name, is_custom, int_v, double_v, string_v, bool_v) in rows {
            let value = match (int_v, double_v, string_v, bool_v) {
                (Some(v), None, None, None) => PropertyValue::Int(v),
                (None, Some(v), None, None) => PropertyValue::Double(v),
                (None, None, Some(v), None) => PropertyValue::Str(v),
                (None, None, None, Some(v)) => PropertyValue::Bool(v),
                _ => return Err(CatalogError::MalformedProperty { entity_id, name }),
            };
            properties.push(PropertyRecord {
                entity_id,
                name,
                is_custom,
                value,
            });
        }
        Ok(properties)
    }
}

fn map_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<EntityRecord> {
    Ok(EntityRecord {
        id: Some(row.get(0)?),
        type_id: row.get(1)?,
        name: row.get(2)?,
        external_id: row.get(3)?,
        create_time_since_epoch: row.get(4)?,
        last_update_time_since_epoch: row.get(5)?,
    })
}

fn store_err<K: EntityKind>(op: &'static str) -> impl Fn(rusqlite::Error) -> CatalogError {
    move |source| CatalogError::Store {
        op,
        kind: K::KIND,
        source,
    }
}
