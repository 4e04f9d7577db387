//! Compiles parsed filter clauses into parameterized SQL fragments
//!
//! The compiler never special-cases field names: every clause is resolved
//! through the kind's field table, and property-table lookups get a join
//! aliased uniquely per clause so two property filters never collide. All
//! values are parameter-bound, never interpolated.

use miette::Diagnostic;
use rusqlite::ToSql;
use thiserror::Error;

use crate::fields::{resolve, FieldLocation, FieldTable};
use crate::query::filter::{FilterClause, FilterOp, FilterValue};
use crate::value::{PropertyValue, ValueType};

#[derive(Debug, Error, Diagnostic)]
pub enum CompileError {
    #[error("operator {op} requires a numeric field, but '{field}' holds {ty} values")]
    #[diagnostic(code(mosaic::filter::ordering_on_non_numeric))]
    OrderingOnNonNumeric {
        field: String,
        op: &'static str,
        ty: &'static str,
    },

    #[error("LIKE requires a string field, but '{field}' holds {ty} values")]
    #[diagnostic(code(mosaic::filter::like_on_non_string))]
    LikeOnNonString { field: String, ty: &'static str },

    #[error("invalid {ty} literal '{value}' for field '{field}'")]
    #[diagnostic(code(mosaic::filter::bad_literal))]
    BadLiteral {
        field: String,
        ty: &'static str,
        value: String,
    },

    #[error("operator {op} does not accept a value list")]
    #[diagnostic(code(mosaic::filter::list_value))]
    ListValue { op: &'static str },
}

/// Box a value for deferred parameter binding.
pub fn param<T: ToSql + 'static>(value: T) -> Box<dyn ToSql> {
    Box::new(value)
}

/// Prepare user text for a substring LIKE: caller-supplied `%` wildcards are
/// dropped, and `_` and `\` are escaped so they match literally. Pair the
/// result with `ESCAPE '\'`.
pub(crate) fn escape_like(fragment: &str) -> String {
    fragment
        .replace('%', "")
        .replace('\\', "\\\\")
        .replace('_', "\\_")
}

/// Accumulates join fragments, WHERE predicates, and their bound parameters
/// for one `SELECT` over the entity table (aliased `e`).
///
/// Join parameters textually precede WHERE parameters in the rendered SQL,
/// so the two are kept apart until `into_params`.
#[derive(Default)]
pub struct SelectBuilder {
    joins: Vec<String>,
    predicates: Vec<String>,
    join_params: Vec<Box<dyn ToSql>>,
    where_params: Vec<Box<dyn ToSql>>,
    alias_count: usize,
}

impl SelectBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an ANDed WHERE predicate with its parameters.
    pub fn push_where(&mut self, fragment: impl Into<String>, params: Vec<Box<dyn ToSql>>) {
        self.predicates.push(fragment.into());
        self.where_params.extend(params);
    }

    /// Join the property table under a fresh alias, constrained to one
    /// property name. Returns the alias for the caller's predicate.
    pub fn property_join(&mut self, property: &str, is_custom: bool) -> String {
        let alias = format!("p{}", self.alias_count);
        self.alias_count += 1;
        self.joins.push(format!(
            "JOIN properties {a} ON {a}.entity_id = e.id AND {a}.name = ? AND {a}.is_custom = ?",
            a = alias
        ));
        self.join_params.push(param(property.to_string()));
        self.join_params.push(param(is_custom));
        alias
    }

    /// Render the full statement. `tail` carries ORDER BY / LIMIT text.
    pub fn render(&self, columns: &str, tail: &str) -> String {
        let mut sql = format!("SELECT {} FROM entities e", columns);
        for join in &self.joins {
            sql.push(' ');
            sql.push_str(join);
        }
        if !self.predicates.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&self.predicates.join(" AND "));
        }
        if !tail.is_empty() {
            sql.push(' ');
            sql.push_str(tail);
        }
        sql
    }

    /// All parameters in textual order: joins first, then WHERE.
    pub fn into_params(self) -> Vec<Box<dyn ToSql>> {
        let mut params = self.join_params;
        params.extend(self.where_params);
        params
    }
}

/// Compile every clause against the kind's field table.
pub fn compile_clauses(
    builder: &mut SelectBuilder,
    fields: FieldTable,
    clauses: &[FilterClause],
) -> Result<(), CompileError> {
    for clause in clauses {
        compile_clause(builder, fields, clause)?;
    }
    Ok(())
}

fn compile_clause(
    builder: &mut SelectBuilder,
    fields: FieldTable,
    clause: &FilterClause,
) -> Result<(), CompileError> {
    let def = resolve(fields, &clause.field);
    let (column, value_type) = match def.location {
        FieldLocation::EntityTable => (format!("e.{}", def.column), def.value_type),
        FieldLocation::PropertyTable => {
            let alias = builder.property_join(def.column, false);
            (format!("{}.{}", alias, def.value_type.column()), def.value_type)
        }
        // Unknown fields compare best-effort against the string column.
        FieldLocation::Custom => {
            let alias = builder.property_join(def.column, true);
            (format!("{}.string_value", alias), ValueType::Str)
        }
    };

    match clause.op {
        FilterOp::Eq | FilterOp::Ne => {
            let raw = scalar_value(clause)?;
            match value_type {
                ValueType::Str => builder.push_where(
                    format!("LOWER({}) {} LOWER(?)", column, clause.op.symbol()),
                    vec![param(raw.to_string())],
                ),
                _ => {
                    let bound = parse_param(value_type, &clause.field, raw)?;
                    builder.push_where(
                        format!("{} {} ?", column, clause.op.symbol()),
                        vec![bound],
                    );
                }
            }
        }
        op if op.is_ordering() => {
            if !value_type.is_numeric() {
                return Err(CompileError::OrderingOnNonNumeric {
                    field: clause.field.clone(),
                    op: op.symbol(),
                    ty: value_type.as_str(),
                });
            }
            let raw = scalar_value(clause)?;
            let bound = parse_param(value_type, &clause.field, raw)?;
            builder.push_where(format!("{} {} ?", column, op.symbol()), vec![bound]);
        }
        FilterOp::Like => {
            if value_type != ValueType::Str {
                return Err(CompileError::LikeOnNonString {
                    field: clause.field.clone(),
                    ty: value_type.as_str(),
                });
            }
            let raw = scalar_value(clause)?;
            let pattern = format!("%{}%", escape_like(raw));
            builder.push_where(
                format!("LOWER({}) LIKE LOWER(?) ESCAPE '\\'", column),
                vec![param(pattern)],
            );
        }
        FilterOp::In => {
            let items = match &clause.value {
                FilterValue::List(items) => items.as_slice(),
                FilterValue::Scalar(single) => std::slice::from_ref(single),
            };
            let mut bound = Vec::with_capacity(items.len());
            for item in items {
                bound.push(parse_param(value_type, &clause.field, item)?);
            }
            let placeholders = vec!["?"; items.len()].join(", ");
            builder.push_where(format!("{} IN ({})", column, placeholders), bound);
        }
        // Eq/Ne/Like/In and the ordering guard above are exhaustive.
        _ => unreachable!("operator {:?} already handled", clause.op),
    }
    Ok(())
}

fn scalar_value(clause: &FilterClause) -> Result<&str, CompileError> {
    match &clause.value {
        FilterValue::Scalar(value) => Ok(value),
        FilterValue::List(_) => Err(CompileError::ListValue {
            op: clause.op.symbol(),
        }),
    }
}

fn parse_param(
    ty: ValueType,
    field: &str,
    raw: &str,
) -> Result<Box<dyn ToSql>, CompileError> {
    let value = PropertyValue::parse_typed(ty, raw).ok_or_else(|| CompileError::BadLiteral {
        field: field.to_string(),
        ty: ty.as_str(),
        value: raw.to_string(),
    })?;
    Ok(match value {
        PropertyValue::Int(v) => param(v),
        PropertyValue::Double(v) => param(v),
        PropertyValue::Str(v) => param(v),
        PropertyValue::Bool(v) => param(v),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::property;
    use crate::query::filter::{parse, ParseMode};

    const FIELDS: FieldTable = &[
        ("status", property(ValueType::Str, "status")),
        ("toolCount", property(ValueType::Int, "tool_count")),
        ("threshold", property(ValueType::Double, "threshold")),
        ("blocking", property(ValueType::Bool, "blocking")),
        ("sourceId", property(ValueType::Str, "source_id")),
    ];

    fn compile(filter: &str) -> Result<(String, usize), CompileError> {
        let clauses = parse(filter, ParseMode::Strict).unwrap();
        let mut builder = SelectBuilder::new();
        builder.push_where("e.type_id = ?", vec![param(1i64)]);
        compile_clauses(&mut builder, FIELDS, &clauses)?;
        let sql = builder.render("e.id", "");
        let params = builder.into_params().len();
        Ok((sql, params))
    }

    #[test]
    fn test_entity_column_clause() {
        let (sql, params) = compile("name = 'alpha'").unwrap();
        assert!(sql.contains("LOWER(e.name) = LOWER(?)"), "sql: {}", sql);
        assert!(!sql.contains("JOIN"), "sql: {}", sql);
        assert_eq!(params, 2);
    }

    #[test]
    fn test_property_clause_emits_join() {
        let (sql, params) = compile("status = 'active'").unwrap();
        assert!(
            sql.contains("JOIN properties p0 ON p0.entity_id = e.id"),
            "sql: {}",
            sql
        );
        assert!(sql.contains("LOWER(p0.string_value) = LOWER(?)"), "sql: {}", sql);
        // join name + is_custom, type_id, value
        assert_eq!(params, 4);
    }

    #[test]
    fn test_two_property_clauses_get_distinct_aliases() {
        let (sql, _) = compile("status = 'active' AND toolCount >= 3").unwrap();
        assert!(sql.contains("JOIN properties p0"), "sql: {}", sql);
        assert!(sql.contains("JOIN properties p1"), "sql: {}", sql);
        assert!(sql.contains("p1.int_value >= ?"), "sql: {}", sql);
    }

    #[test]
    fn test_unknown_field_compiles_as_custom() {
        let (sql, _) = compile("teamOwner = 'search'").unwrap();
        assert!(sql.contains("JOIN properties p0"), "sql: {}", sql);
        assert!(sql.contains("LOWER(p0.string_value) = LOWER(?)"), "sql: {}", sql);
    }

    #[test]
    fn test_ordering_on_string_field_fails() {
        let err = compile("status > 'active'").unwrap_err();
        assert!(matches!(err, CompileError::OrderingOnNonNumeric { .. }));
    }

    #[test]
    fn test_ordering_on_unknown_field_fails() {
        let err = compile("mystery > 3").unwrap_err();
        assert!(matches!(err, CompileError::OrderingOnNonNumeric { .. }));
    }

    #[test]
    fn test_bad_int_literal_fails() {
        let err = compile("toolCount = 'many'").unwrap_err();
        assert!(matches!(err, CompileError::BadLiteral { .. }));
    }

    #[test]
    fn test_like_strips_and_wraps_percent() {
        let clauses = parse("name LIKE '%ph%'", ParseMode::Strict).unwrap();
        let mut builder = SelectBuilder::new();
        compile_clauses(&mut builder, FIELDS, &clauses).unwrap();
        let sql = builder.render("e.id", "");
        assert!(sql.contains("LOWER(e.name) LIKE LOWER(?)"), "sql: {}", sql);
    }

    #[test]
    fn test_like_escapes_underscore() {
        assert_eq!(escape_like("a_b"), "a\\_b");
        assert_eq!(escape_like("%ph%"), "ph");
        assert_eq!(escape_like("back\\slash"), "back\\\\slash");
        let clauses = parse("name LIKE 'a_b'", ParseMode::Strict).unwrap();
        let mut builder = SelectBuilder::new();
        compile_clauses(&mut builder, FIELDS, &clauses).unwrap();
        let sql = builder.render("e.id", "");
        assert!(sql.contains("LIKE LOWER(?) ESCAPE '\\'"), "sql: {}", sql);
    }

    #[test]
    fn test_render_without_predicates_omits_where() {
        let builder = SelectBuilder::new();
        let sql = builder.render("e.id", "");
        assert_eq!(sql, "SELECT e.id FROM entities e");
    }

    #[test]
    fn test_like_on_numeric_field_fails() {
        let err = compile("toolCount LIKE '3'").unwrap_err();
        assert!(matches!(err, CompileError::LikeOnNonString { .. }));
    }

    #[test]
    fn test_in_list_binds_each_element() {
        let (sql, params) = compile("sourceId IN ('s1', 's2', 's3')").unwrap();
        assert!(sql.contains("p0.string_value IN (?, ?, ?)"), "sql: {}", sql);
        // join name + is_custom, type_id, three list elements
        assert_eq!(params, 6);
    }

    #[test]
    fn test_bool_equality() {
        let (sql, _) = compile("blocking = true").unwrap();
        assert!(sql.contains("p0.bool_value = ?"), "sql: {}", sql);
    }

    #[test]
    fn test_double_threshold() {
        let (sql, _) = compile("threshold >= 0.5").unwrap();
        assert!(sql.contains("p0.double_value >= ?"), "sql: {}", sql);
    }
}
