//! Catalog validation: referential integrity of keys and constraints.

use crate::error::ConfigError;
use crate::schema::Catalog;
use std::collections::HashSet;

pub fn validate(catalog: &Catalog) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();
    for t in &catalog.tables {
        if !seen.insert(t.name) {
            return Err(ConfigError::Schema(format!("duplicate table: {}", t.name)));
        }
    }

    for t in &catalog.tables {
        if t.columns.is_empty() {
            return Err(ConfigError::Schema(format!("table {} has no columns", t.name)));
        }
        if !t.has_column(t.primary_key) {
            return Err(ConfigError::MissingReference {
                kind: "primary key column",
                id: format!("{}.{}", t.name, t.primary_key),
            });
        }
        let mut names = HashSet::new();
        for c in &t.columns {
            if !names.insert(c.name) {
                return Err(ConfigError::Schema(format!("duplicate column: {}.{}", t.name, c.name)));
            }
            if let Some(fk) = &c.foreign_key {
                let target = catalog.table(fk.references_table).ok_or_else(|| ConfigError::MissingReference {
                    kind: "table",
                    id: fk.references_table.to_string(),
                })?;
                let target_col = target.column(fk.references_column).ok_or_else(|| ConfigError::MissingReference {
                    kind: "column",
                    id: format!("{}.{}", fk.references_table, fk.references_column),
                })?;
                if target_col.name != target.primary_key {
                    return Err(ConfigError::Schema(format!(
                        "{}.{} must reference a primary key",
                        t.name, c.name
                    )));
                }
            }
        }
        for u in &t.unique {
            for col in u.columns {
                if !t.has_column(col) {
                    return Err(ConfigError::MissingReference {
                        kind: "unique column",
                        id: format!("{}.{}", t.name, col),
                    });
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ColumnDef, ColumnType, OnDelete, TableDef};

    #[test]
    fn standard_catalog_is_valid() {
        validate(&Catalog::standard()).unwrap();
    }

    #[test]
    fn rejects_dangling_foreign_key() {
        let mut catalog = Catalog::standard();
        catalog.tables.push(TableDef {
            name: "reviews",
            primary_key: "review_id",
            columns: vec![
                ColumnDef::new("review_id", ColumnType::Serial),
                ColumnDef::new("order_id", ColumnType::Integer).references("orders", "order_id", OnDelete::Cascade),
            ],
            unique: vec![],
        });
        let err = validate(&catalog).unwrap_err();
        assert!(matches!(err, ConfigError::MissingReference { kind: "table", .. }));
    }

    #[test]
    fn rejects_missing_primary_key_column() {
        let mut catalog = Catalog::standard();
        catalog.tables[0].primary_key = "nope";
        assert!(validate(&catalog).is_err());
    }

    #[test]
    fn rejects_duplicate_tables() {
        let mut catalog = Catalog::standard();
        let dup = catalog.tables[1].clone();
        catalog.tables.push(dup);
        assert!(matches!(validate(&catalog), Err(ConfigError::Schema(_))));
    }
}
