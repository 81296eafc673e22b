//! Table and column definitions.

use std::fmt;

/// Column types used by the shop tables. Drives SQL casts, decoding and request validation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColumnType {
    /// Auto-incrementing integer key.
    Serial,
    Integer,
    Varchar(u32),
    Numeric { precision: u8, scale: u8 },
    Date,
    Timestamptz,
}

impl ColumnType {
    /// PostgreSQL type used in placeholder casts (`$1::numeric`).
    pub fn cast_name(&self) -> &'static str {
        match self {
            ColumnType::Serial | ColumnType::Integer => "integer",
            ColumnType::Varchar(_) => "varchar",
            ColumnType::Numeric { .. } => "numeric",
            ColumnType::Date => "date",
            ColumnType::Timestamptz => "timestamptz",
        }
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, ColumnType::Serial | ColumnType::Integer)
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnType::Serial => f.write_str("SERIAL"),
            ColumnType::Integer => f.write_str("INTEGER"),
            ColumnType::Varchar(n) => write!(f, "VARCHAR({})", n),
            ColumnType::Numeric { precision, scale } => write!(f, "NUMERIC({}, {})", precision, scale),
            ColumnType::Date => f.write_str("DATE"),
            ColumnType::Timestamptz => f.write_str("TIMESTAMPTZ"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OnDelete {
    Cascade,
    Restrict,
}

impl OnDelete {
    pub fn as_sql(&self) -> &'static str {
        match self {
            OnDelete::Cascade => "CASCADE",
            OnDelete::Restrict => "RESTRICT",
        }
    }
}

#[derive(Clone, Debug)]
pub struct ForeignKey {
    pub references_table: &'static str,
    pub references_column: &'static str,
    pub on_delete: OnDelete,
}

#[derive(Clone, Debug)]
pub struct ColumnDef {
    pub name: &'static str,
    pub ty: ColumnType,
    pub nullable: bool,
    /// Server-side default (e.g. `now()`); the column may be omitted on insert.
    pub default: Option<&'static str>,
    pub indexed: bool,
    pub foreign_key: Option<ForeignKey>,
}

impl ColumnDef {
    pub fn new(name: &'static str, ty: ColumnType) -> Self {
        ColumnDef {
            name,
            ty,
            nullable: false,
            default: None,
            indexed: false,
            foreign_key: None,
        }
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn default(mut self, expr: &'static str) -> Self {
        self.default = Some(expr);
        self
    }

    pub fn indexed(mut self) -> Self {
        self.indexed = true;
        self
    }

    pub fn references(mut self, table: &'static str, column: &'static str, on_delete: OnDelete) -> Self {
        self.foreign_key = Some(ForeignKey {
            references_table: table,
            references_column: column,
            on_delete,
        });
        self
    }

    /// True when the database fills the value if it is omitted.
    pub fn has_default(&self) -> bool {
        self.default.is_some() || self.ty == ColumnType::Serial
    }

    /// Required on insert: not nullable and no server-side default.
    pub fn required(&self) -> bool {
        !self.nullable && !self.has_default()
    }
}

#[derive(Clone, Debug)]
pub struct UniqueConstraint {
    pub name: &'static str,
    pub columns: &'static [&'static str],
}

#[derive(Clone, Debug)]
pub struct TableDef {
    pub name: &'static str,
    pub primary_key: &'static str,
    pub columns: Vec<ColumnDef>,
    pub unique: Vec<UniqueConstraint>,
}

impl TableDef {
    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Primary key column.
    ///
    /// `schema::validate` rejects tables whose key is not a declared column, and startup
    /// refuses to serve an invalid catalog. Debug builds assert it here as well.
    pub fn pk(&self) -> &ColumnDef {
        debug_assert!(
            self.has_column(self.primary_key),
            "table {} has no primary key column {}",
            self.name,
            self.primary_key
        );
        self.column(self.primary_key)
            .unwrap_or_else(|| &self.columns[0])
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    pub fn pk_constraint_name(&self) -> String {
        format!("pk_{}", self.name)
    }

    pub fn index_name(&self, column: &str) -> String {
        format!("ix_{}_{}", self.name, column)
    }

    pub fn fk_constraint_name(&self, column: &ColumnDef) -> Option<String> {
        column
            .foreign_key
            .as_ref()
            .map(|fk| format!("fk_{}_{}_{}", self.name, column.name, fk.references_table))
    }
}
