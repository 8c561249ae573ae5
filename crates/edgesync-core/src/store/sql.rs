//! Statement builders and value conversion between JSON rows and SQLite.

use edgesync_types::{Column, ColumnKind, TableSpec};
use serde_json::{Map, Number, Value};
use sqlx::sqlite::{SqliteArguments, SqliteRow};
use sqlx::query::Query;
use sqlx::{Row, Sqlite};

/// Payload columns a record actually carries, in table order.
pub(crate) fn present_columns<'s>(spec: &'s TableSpec, row: &Map<String, Value>) -> Vec<&'s Column> {
    spec.columns.iter().filter(|c| row.contains_key(c.name)).collect()
}

/// `INSERT ... ON CONFLICT (key) DO UPDATE` over the given columns.
///
/// Only non-key columns in `columns` are overwritten on conflict; the rest keep their stored
/// values.
pub(crate) fn upsert_statement(spec: &TableSpec, columns: &[&Column]) -> String {
    let names: Vec<&str> = columns.iter().map(|c| c.name).collect();
    let placeholders = vec!["?"; names.len()].join(", ");

    let mut updates: Vec<String> = names
        .iter()
        .filter(|name| !spec.key.contains(*name))
        .map(|name| format!("{name} = excluded.{name}"))
        .collect();
    if let Some(touched) = spec.touched_column {
        updates.push(format!("{touched} = CURRENT_TIMESTAMP"));
    }

    let conflict_action = if updates.is_empty() {
        "DO NOTHING".to_string()
    } else {
        format!("DO UPDATE SET {}", updates.join(", "))
    };

    format!(
        "INSERT INTO {} ({}) VALUES ({}) ON CONFLICT ({}) {}",
        spec.store_name,
        names.join(", "),
        placeholders,
        spec.key.join(", "),
        conflict_action
    )
}

/// `SELECT` of the payload columns, with a case-insensitive peer filter when requested.
pub(crate) fn select_statement(spec: &TableSpec, filtered: bool) -> String {
    let columns: Vec<&str> = spec.columns.iter().map(|c| c.name).collect();
    let mut sql = format!("SELECT {} FROM {}", columns.join(", "), spec.store_name);
    if filtered {
        sql.push_str(&format!(" WHERE {} = ? COLLATE NOCASE", spec.peer_column));
    }
    sql.push_str(&format!(" ORDER BY {}", spec.key.join(", ")));
    sql
}

/// Bind one column of a JSON row according to the column's storage class.
pub(crate) fn bind_column<'q>(
    query: Query<'q, Sqlite, SqliteArguments<'q>>,
    column: &Column,
    value: Option<&Value>,
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    let value = value.filter(|v| !v.is_null());
    match column.kind {
        ColumnKind::Text | ColumnKind::Timestamp => query.bind(value.map(|v| match v {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })),
        ColumnKind::Real => query.bind(value.and_then(Value::as_f64)),
    }
}

/// Read the payload columns of a row into a JSON map.
pub(crate) fn row_to_map(spec: &TableSpec, row: &SqliteRow) -> Result<Map<String, Value>, sqlx::Error> {
    let mut map = Map::with_capacity(spec.columns.len());
    for column in spec.columns {
        let value = match column.kind {
            ColumnKind::Text | ColumnKind::Timestamp => {
                row.try_get::<Option<String>, _>(column.name)?.map(Value::String)
            }
            ColumnKind::Real => row
                .try_get::<Option<f64>, _>(column.name)?
                .and_then(Number::from_f64)
                .map(Value::Number),
        };
        map.insert(column.name.to_string(), value.unwrap_or(Value::Null));
    }
    Ok(map)
}
