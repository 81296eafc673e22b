//! Admin CLI for the shop database.
//!
//! Run from repo root: `cargo run -p dbctl -- <command>`

use clap::{Parser, Subcommand};
use serde_json::{json, Map, Value};
use shop_api::migration::{self, MIGRATIONS};
use shop_api::schema::Customer;
use shop_api::{connect, ensure_database_exists, init_tracing, AppError, Catalog, CrudService, Settings, ShopService};
use sqlx::PgPool;

#[derive(Parser)]
#[command(name = "dbctl")]
#[command(about = "Admin CLI for the shop-api database", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Connect and run `SELECT 1`, printing connection diagnostics
    Check,
    /// Apply pending migrations
    Migrate,
    /// Revert applied migrations newer than the target version (0 = empty schema)
    Rollback {
        #[arg(long)]
        to: i64,
    },
    /// List migrations and when they were applied
    Status,
    /// Insert the sample customers, skipping ones already present
    Seed,
    /// Insert, list, update and delete one customer through the generic CRUD service
    Smoke {
        #[arg(long, default_value = "c001")]
        id: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let settings = Settings::from_env()?;
    init_tracing(&settings.log_filter)?;

    match cli.command {
        Commands::Check => check(&settings).await?,
        Commands::Migrate => {
            ensure_database_exists(&settings.database.connect_options()?).await?;
            let pool = connect(&settings.database).await?;
            let applied = migration::apply_migrations(&pool).await?;
            if applied.is_empty() {
                println!("No pending migrations.");
            } else {
                println!("Applied: {:?}", applied);
            }
        }
        Commands::Rollback { to } => {
            let pool = connect(&settings.database).await?;
            let reverted = migration::revert_to(&pool, to).await?;
            println!("Reverted: {:?}", reverted);
        }
        Commands::Status => {
            let pool = connect(&settings.database).await?;
            for m in migration::status(&pool).await? {
                let applied = match m.applied_at {
                    Some(at) => at.to_rfc3339(),
                    None => "pending".to_string(),
                };
                println!("{:04}  {:<40} {}", m.version, m.description, applied);
            }
            println!("({} migrations known)", MIGRATIONS.len());
        }
        Commands::Seed => {
            let pool = connect(&settings.database).await?;
            seed(&pool).await?;
        }
        Commands::Smoke { id } => {
            let pool = connect(&settings.database).await?;
            smoke(&pool, &id).await?;
        }
    }
    Ok(())
}

async fn check(settings: &Settings) -> Result<(), Box<dyn std::error::Error>> {
    let db = &settings.database;
    println!("target: {}", db.redacted_target());
    match db.ca_file() {
        Some(ca) => println!("tls: verify-full (ca: {})", ca.display()),
        None => match &db.ssl_ca {
            Some(missing) => println!("tls: prefer (ca file not found: {})", missing.display()),
            None => println!("tls: prefer"),
        },
    }
    let pool = connect(db).await?;
    shop_api::store::ping(&pool).await?;
    let info = shop_api::store::server_info(&pool).await?;
    println!("connected: {} as {}", info.database, info.user);
    println!("server: {}", info.version);
    Ok(())
}

fn seed_customers() -> [Customer; 2] {
    [
        Customer {
            customer_id: "C1111".into(),
            customer_name: "ああさん".into(),
            age: 6,
            gender: "男".into(),
        },
        Customer {
            customer_id: "C110".into(),
            customer_name: "桃太郎さん".into(),
            age: 30,
            gender: "女".into(),
        },
    ]
}

async fn seed(pool: &PgPool) -> Result<(), AppError> {
    let mut inserted = 0;
    for c in seed_customers() {
        if ShopService::get_customer(pool, &c.customer_id).await?.is_some() {
            continue;
        }
        match ShopService::create_customer(pool, &c).await {
            Ok(_) => inserted += 1,
            // Inserted concurrently by someone else.
            Err(AppError::Conflict(_)) => {}
            Err(e) => return Err(e),
        }
    }
    println!("Seeded {} customer(s); others already present.", inserted);
    Ok(())
}

fn customer_values(id: &str, name: &str, age: i64) -> Map<String, Value> {
    let mut values = Map::new();
    values.insert("customer_id".into(), json!(id));
    values.insert("customer_name".into(), json!(name));
    values.insert("age".into(), json!(age));
    values.insert("gender".into(), json!("M"));
    values
}

async fn smoke(pool: &PgPool, id: &str) -> Result<(), Box<dyn std::error::Error>> {
    let catalog = Catalog::standard();
    let table = catalog
        .table("customers")
        .ok_or_else(|| AppError::NotFound("table customers".into()))?;

    let inserted = CrudService::insert(pool, table, &customer_values(id, "テスト太郎", 25)).await?;
    println!("INSERT: {}", inserted);

    let all = CrudService::select_all(pool, table).await?;
    println!("SELECT ALL: {}", serde_json::to_string_pretty(&all)?);

    let updated = CrudService::update(pool, table, &customer_values(id, "更新後太郎", 26)).await?;
    println!("UPDATE: {}", updated);

    let deleted = CrudService::delete(pool, table, &Value::String(id.to_string())).await?;
    println!("DELETE: {}", deleted);
    Ok(())
}
