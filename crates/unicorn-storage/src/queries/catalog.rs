//! pattern_templates queries.
//!
//! Rows are returned as JSON objects so a single malformed row is reported
//! by the catalog instead of failing the whole load.

use rusqlite::{params, Connection};
use serde_json::{json, Map, Value};
use unicorn_core::errors::StorageError;
use unicorn_core::types::PatternTemplate;

/// Every stored pattern, ordered by id.
pub fn load_pattern_specs(conn: &Connection) -> Result<Vec<Value>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT pattern_id, name, description_template, entity_type, base_table, category,
                    enabled, filters_json, order_direction, metric, metric_expr, target_sample,
                    min_sample, unicorn_weight, public_weight, complexity_score,
                    requires_count, count_value
             FROM pattern_templates ORDER BY pattern_id",
        )
        .map_err(crate::sqlite_err)?;

    let rows = stmt
        .query_map([], |row| {
            let mut obj = Map::new();
            obj.insert("pattern_id".into(), json!(row.get::<_, String>(0)?));
            obj.insert("name".into(), json!(row.get::<_, String>(1)?));
            obj.insert("description_template".into(), json!(row.get::<_, String>(2)?));
            obj.insert("entity_type".into(), json!(row.get::<_, String>(3)?));
            obj.insert("base_table".into(), json!(row.get::<_, String>(4)?));
            insert_opt(&mut obj, "category", row.get::<_, Option<String>>(5)?);
            obj.insert("enabled".into(), json!(row.get::<_, bool>(6)?));
            obj.insert("filters".into(), filter_list(embedded_json(row.get::<_, String>(7)?)));
            obj.insert("order_direction".into(), json!(row.get::<_, String>(8)?));
            obj.insert("metric".into(), json!(row.get::<_, String>(9)?));
            if let Some(expr) = row.get::<_, Option<String>>(10)? {
                obj.insert("metric_expr".into(), embedded_json(expr));
            }
            insert_opt(&mut obj, "target_sample", row.get::<_, Option<i64>>(11)?);
            obj.insert("min_sample".into(), json!(row.get::<_, i64>(12)?));
            obj.insert("unicorn_weight".into(), json!(row.get::<_, f64>(13)?));
            insert_opt(&mut obj, "public_weight", row.get::<_, Option<f64>>(14)?);
            insert_opt(&mut obj, "complexity_score", row.get::<_, Option<i64>>(15)?);
            obj.insert("requires_count".into(), json!(row.get::<_, bool>(16)?));
            insert_opt(&mut obj, "count_value", row.get::<_, Option<String>>(17)?);
            Ok(Value::Object(obj))
        })
        .map_err(crate::sqlite_err)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(crate::sqlite_err)
}

fn insert_opt<T: serde::Serialize>(obj: &mut Map<String, Value>, key: &str, value: Option<T>) {
    if let Some(v) = value {
        obj.insert(key.to_string(), json!(v));
    }
}

/// Parsed JSON column; unparsable text is kept as a string so deserializing
/// the pattern fails with a message naming the row.
fn embedded_json(raw: String) -> Value {
    serde_json::from_str(&raw).unwrap_or(Value::String(raw))
}

/// `filters_json` holds either a bare condition array or the wrapped
/// `{"conditions": [...]}` form; both load as the array.
fn filter_list(value: Value) -> Value {
    match value {
        Value::Object(mut obj) if obj.contains_key("conditions") => {
            obj.remove("conditions").unwrap_or(Value::Null)
        }
        other => other,
    }
}

/// Insert or replace a pattern definition.
pub fn upsert_pattern(conn: &Connection, pattern: &PatternTemplate) -> Result<(), StorageError> {
    let filters = serde_json::to_string(&pattern.filters).map_err(crate::sqlite_err)?;
    let metric_expr = pattern
        .metric_expr
        .as_ref()
        .map(serde_json::to_string)
        .transpose()
        .map_err(crate::sqlite_err)?;
    let order = match pattern.order_direction {
        unicorn_core::types::OrderDirection::Asc => "asc",
        unicorn_core::types::OrderDirection::Desc => "desc",
    };
    conn.prepare_cached(
        "INSERT OR REPLACE INTO pattern_templates
         (pattern_id, name, description_template, entity_type, base_table, category, enabled,
          filters_json, order_direction, metric, metric_expr, target_sample, min_sample,
          unicorn_weight, public_weight, complexity_score, requires_count, count_value)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)",
    )
    .and_then(|mut stmt| {
        stmt.execute(params![
            pattern.pattern_id,
            pattern.name,
            pattern.description_template,
            pattern.entity_type.name(),
            pattern.base_table.table_name(),
            pattern.category,
            pattern.enabled,
            filters,
            order,
            pattern.metric,
            metric_expr,
            pattern.target_sample,
            pattern.min_sample,
            pattern.unicorn_weight,
            pattern.public_weight,
            pattern.complexity_score,
            pattern.requires_count,
            pattern.count_value,
        ])
    })
    .map_err(crate::sqlite_err)?;
    Ok(())
}
