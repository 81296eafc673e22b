//! Builds parameterized INSERT, SELECT, UPDATE, DELETE from a table definition.

use crate::schema::{ColumnDef, ColumnType, TableDef};
use serde_json::{Map, Value};

/// Hard upper bound on list page size.
pub const MAX_LIMIT: u32 = 1000;

/// Quote identifier for PostgreSQL (safe: names only come from the catalog).
pub fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

#[derive(Debug)]
pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<Value>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf {
            sql: String::new(),
            params: Vec::new(),
        }
    }

    /// Push a value and return its typed placeholder, e.g. `$2::integer`.
    fn push_param(&mut self, col: &ColumnDef, v: Value) -> String {
        self.params.push(v);
        format!("${}::{}", self.params.len(), col.ty.cast_name())
    }
}

/// SELECT list: numeric columns as text so no precision is lost in decoding.
pub fn select_column_list(table: &TableDef) -> String {
    table
        .columns
        .iter()
        .map(|c| {
            let q = quoted(c.name);
            match c.ty {
                ColumnType::Numeric { .. } => format!("{}::text AS {}", q, q),
                _ => q,
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// SELECT by primary key. Caller binds the key as the sole param.
pub fn select_by_pk(table: &TableDef, pk_value: Value) -> QueryBuf {
    let mut q = QueryBuf::new();
    let pk = table.pk();
    let ph = q.push_param(pk, pk_value);
    q.sql = format!(
        "SELECT {} FROM {} WHERE {} = {}",
        select_column_list(table),
        quoted(table.name),
        quoted(pk.name),
        ph
    );
    q
}

/// SELECT with optional exact-match filters, ORDER BY pk, optional LIMIT/OFFSET.
/// Filters on unknown columns are ignored; params are bound in filter order.
pub fn select_list(
    table: &TableDef,
    filters: &[(String, Value)],
    limit: Option<u32>,
    offset: Option<u32>,
) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut where_parts = Vec::new();
    for (name, val) in filters {
        if let Some(col) = table.column(name) {
            let ph = q.push_param(col, val.clone());
            where_parts.push(format!("{} = {}", quoted(col.name), ph));
        }
    }
    let where_clause = if where_parts.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", where_parts.join(" AND "))
    };
    let limit_clause = limit.map(|n| format!(" LIMIT {}", n.min(MAX_LIMIT))).unwrap_or_default();
    let offset_clause = offset.map(|n| format!(" OFFSET {}", n)).unwrap_or_default();
    q.sql = format!(
        "SELECT {} FROM {}{} ORDER BY {}{}{}",
        select_column_list(table),
        quoted(table.name),
        where_clause,
        quoted(table.primary_key),
        limit_clause,
        offset_clause
    );
    q
}

/// INSERT the columns present in `values`, in catalog order, RETURNING the full row.
/// Omitted columns take their database default.
pub fn insert(table: &TableDef, values: &Map<String, Value>) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut cols = Vec::new();
    let mut placeholders = Vec::new();
    for c in &table.columns {
        let Some(v) = values.get(c.name) else { continue };
        placeholders.push(q.push_param(c, v.clone()));
        cols.push(quoted(c.name));
    }
    let returning = select_column_list(table);
    q.sql = if cols.is_empty() {
        format!("INSERT INTO {} DEFAULT VALUES RETURNING {}", quoted(table.name), returning)
    } else {
        format!(
            "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
            quoted(table.name),
            cols.join(", "),
            placeholders.join(", "),
            returning
        )
    };
    q
}

/// UPDATE by primary key: SET every non-key column present in `values`.
/// Returns None when there is nothing to set.
pub fn update(table: &TableDef, pk_value: Value, values: &Map<String, Value>) -> Option<QueryBuf> {
    let mut q = QueryBuf::new();
    let mut sets = Vec::new();
    for c in &table.columns {
        if c.name == table.primary_key {
            continue;
        }
        let Some(v) = values.get(c.name) else { continue };
        let ph = q.push_param(c, v.clone());
        sets.push(format!("{} = {}", quoted(c.name), ph));
    }
    if sets.is_empty() {
        return None;
    }
    let pk = table.pk();
    let pk_ph = q.push_param(pk, pk_value);
    q.sql = format!(
        "UPDATE {} SET {} WHERE {} = {} RETURNING {}",
        quoted(table.name),
        sets.join(", "),
        quoted(pk.name),
        pk_ph,
        select_column_list(table)
    );
    Some(q)
}

/// DELETE by primary key, RETURNING the key.
pub fn delete(table: &TableDef, pk_value: Value) -> QueryBuf {
    let mut q = QueryBuf::new();
    let pk = table.pk();
    let ph = q.push_param(pk, pk_value);
    q.sql = format!(
        "DELETE FROM {} WHERE {} = {} RETURNING {}",
        quoted(table.name),
        quoted(pk.name),
        ph,
        quoted(pk.name)
    );
    q
}
