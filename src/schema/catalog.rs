//! The shop tables: sample, customers, items, purchases, purchase_details.

use crate::schema::types::{ColumnDef, ColumnType, OnDelete, TableDef, UniqueConstraint};

const ID10: ColumnType = ColumnType::Varchar(10);
const NAME: ColumnType = ColumnType::Varchar(100);

/// All tables exposed by the API, addressable by table name.
#[derive(Clone, Debug)]
pub struct Catalog {
    pub tables: Vec<TableDef>,
}

impl Catalog {
    pub fn standard() -> Self {
        Catalog {
            tables: vec![sample(), customers(), items(), purchases(), purchase_details()],
        }
    }

    pub fn table(&self, name: &str) -> Option<&TableDef> {
        self.tables.iter().find(|t| t.name == name)
    }

    pub fn table_names(&self) -> Vec<&'static str> {
        self.tables.iter().map(|t| t.name).collect()
    }
}

fn sample() -> TableDef {
    TableDef {
        name: "sample",
        primary_key: "id",
        columns: vec![
            ColumnDef::new("id", ColumnType::Serial),
            ColumnDef::new("name", NAME),
            ColumnDef::new("created_at", ColumnType::Timestamptz).default("now()"),
        ],
        unique: vec![],
    }
}

fn customers() -> TableDef {
    TableDef {
        name: "customers",
        primary_key: "customer_id",
        columns: vec![
            ColumnDef::new("customer_id", ID10),
            ColumnDef::new("customer_name", NAME).indexed(),
            ColumnDef::new("age", ColumnType::Integer),
            ColumnDef::new("gender", ColumnType::Varchar(10)),
        ],
        unique: vec![],
    }
}

fn items() -> TableDef {
    TableDef {
        name: "items",
        primary_key: "item_id",
        columns: vec![
            ColumnDef::new("item_id", ID10),
            ColumnDef::new("item_name", NAME).indexed(),
            ColumnDef::new("price", ColumnType::Numeric { precision: 10, scale: 2 }),
            // legacy integer column kept alongside the text key
            ColumnDef::new("id", ColumnType::Integer).nullable(),
            ColumnDef::new("created_at", ColumnType::Timestamptz).default("now()"),
        ],
        unique: vec![],
    }
}

fn purchases() -> TableDef {
    TableDef {
        name: "purchases",
        primary_key: "purchase_id",
        columns: vec![
            ColumnDef::new("purchase_id", ID10),
            ColumnDef::new("customer_id", ID10)
                .indexed()
                .references("customers", "customer_id", OnDelete::Cascade),
            ColumnDef::new("purchase_date", ColumnType::Date),
        ],
        unique: vec![],
    }
}

fn purchase_details() -> TableDef {
    TableDef {
        name: "purchase_details",
        primary_key: "detail_id",
        columns: vec![
            ColumnDef::new("detail_id", ID10),
            ColumnDef::new("purchase_id", ID10)
                .indexed()
                .references("purchases", "purchase_id", OnDelete::Cascade),
            ColumnDef::new("item_id", ID10)
                .indexed()
                .references("items", "item_id", OnDelete::Restrict),
            ColumnDef::new("quantity", ColumnType::Integer),
        ],
        unique: vec![UniqueConstraint {
            name: "uq_purchase_item",
            columns: &["purchase_id", "item_id"],
        }],
    }
}
