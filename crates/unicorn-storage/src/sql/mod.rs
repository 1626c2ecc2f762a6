//! SQL rendering of metric queries.
//!
//! Only schema-resolved column names are ever spliced into the statement
//! text; every operand is a bound parameter.

use rusqlite::types::Value;
use unicorn_core::errors::StorageError;
use unicorn_core::types::{
    AggregationExpr, BaseTable, FieldDef, Filter, FilterOp, FilterValue, MetricQuery,
};

/// A statement plus its positional parameters, in order of appearance.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedQuery {
    pub sql: String,
    pub params: Vec<Value>,
}

/// Render a grouped aggregation for `query`.
///
/// Shape: one row per entity with `(entity_id, metric_value, sample_size)`,
/// facts restricted to games on or before `as_of`, `HAVING` the sample floor,
/// best metric first with nulls last, ties by entity id, bounded by `LIMIT`.
pub fn render_metric_query(query: &MetricQuery) -> Result<RenderedQuery, StorageError> {
    let table = query.base_table;
    let entity = table.entity_column(query.entity_type);
    let mut params = Vec::new();

    let metric_sql = render_expr(table, &query.metric, &mut params)?;

    let mut conditions = vec!["g.game_date <= ?".to_string(), format!("{entity} IS NOT NULL")];
    params.push(Value::Text(query.as_of.format("%Y-%m-%d").to_string()));
    for filter in &query.filters {
        conditions.push(render_filter(table, filter, &mut params)?);
    }

    params.push(Value::Integer(i64::from(query.min_sample)));
    params.push(Value::Integer(i64::from(query.limit)));

    let sql = format!(
        "SELECT {entity} AS entity_id, {metric_sql} AS metric_value, COUNT(*) AS sample_size \
         FROM {fact} f JOIN games g ON g.game_id = f.game_id \
         WHERE {where_clause} \
         GROUP BY {entity} \
         HAVING COUNT(*) >= ? \
         ORDER BY metric_value IS NULL, metric_value {dir}, entity_id ASC \
         LIMIT ?",
        fact = table.table_name(),
        where_clause = conditions.join(" AND "),
        dir = query.order.sql(),
    );
    Ok(RenderedQuery { sql, params })
}

fn column(table: BaseTable, name: &str) -> Result<&'static FieldDef, StorageError> {
    table.field(name).ok_or_else(|| StorageError::InvalidQuery {
        message: format!("unknown field '{name}' on {table}"),
    })
}

fn render_expr(
    table: BaseTable,
    expr: &AggregationExpr,
    params: &mut Vec<Value>,
) -> Result<String, StorageError> {
    Ok(match expr {
        AggregationExpr::Count { when } if when.is_empty() => "COUNT(*)".to_string(),
        AggregationExpr::Count { when } => {
            format!("SUM(CASE WHEN {} THEN 1 ELSE 0 END)", render_all(table, when, params)?)
        }
        AggregationExpr::Rate { numerator } => format!(
            "CAST(SUM(CASE WHEN {} THEN 1 ELSE 0 END) AS REAL) / COUNT(*)",
            render_all(table, numerator, params)?
        ),
        AggregationExpr::Ratio {
            numerator,
            denominator,
        } => {
            let num = render_all(table, numerator, params)?;
            let den = render_all(table, denominator, params)?;
            format!(
                "CAST(SUM(CASE WHEN {num} THEN 1 ELSE 0 END) AS REAL) \
                 / NULLIF(SUM(CASE WHEN {den} THEN 1 ELSE 0 END), 0)"
            )
        }
        AggregationExpr::Average { field } => format!("AVG({})", column(table, field)?.column),
        AggregationExpr::Sum { field } => format!("SUM({})", column(table, field)?.column),
    })
}

/// AND of all conditions; an empty list matches every row.
fn render_all(
    table: BaseTable,
    filters: &[Filter],
    params: &mut Vec<Value>,
) -> Result<String, StorageError> {
    if filters.is_empty() {
        return Ok("1".to_string());
    }
    let parts = filters
        .iter()
        .map(|f| render_filter(table, f, params))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(format!("({})", parts.join(" AND ")))
}

fn render_filter(
    table: BaseTable,
    filter: &Filter,
    params: &mut Vec<Value>,
) -> Result<String, StorageError> {
    let col = column(table, &filter.field)?.column;
    Ok(match &filter.op {
        FilterOp::Eq(v) => {
            params.push(to_sql_value(v));
            format!("{col} = ?")
        }
        FilterOp::Ne(v) => {
            params.push(to_sql_value(v));
            format!("{col} != ?")
        }
        FilterOp::Gt(t) | FilterOp::Gte(t) | FilterOp::Lt(t) | FilterOp::Lte(t) => {
            params.push(Value::Real(*t));
            format!("{col} {} ?", filter.op.symbol())
        }
        FilterOp::In(values) | FilterOp::NotIn(values) => {
            let placeholders = vec!["?"; values.len()].join(", ");
            params.extend(values.iter().map(to_sql_value));
            let keyword = if matches!(filter.op, FilterOp::In(_)) { "IN" } else { "NOT IN" };
            format!("{col} {keyword} ({placeholders})")
        }
        FilterOp::IsNull => format!("{col} IS NULL"),
        FilterOp::IsNotNull => format!("{col} IS NOT NULL"),
    })
}

/// Booleans are stored as 0/1 integers.
fn to_sql_value(value: &FilterValue) -> Value {
    match value {
        FilterValue::Bool(b) => Value::Integer(i64::from(*b)),
        FilterValue::Int(i) => Value::Integer(*i),
        FilterValue::Real(r) => Value::Real(*r),
        FilterValue::Text(s) => Value::Text(s.clone()),
    }
}
