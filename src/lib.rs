//! Shop API: customers, items, purchases and sample records over PostgreSQL.

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod logging;
pub mod migration;
pub mod response;
pub mod routes;
pub mod schema;
pub mod service;
pub mod settings;
pub mod sql;
pub mod state;
pub mod store;

pub use error::{AppError, ConfigError};
pub use logging::init_tracing;
pub use migration::{apply_migrations, revert_to, MIGRATIONS};
pub use response::{success_many, success_one};
pub use routes::{app, common_routes, entity_routes, shop_routes};
pub use schema::Catalog;
pub use service::{CrudService, ShopService};
pub use settings::{DatabaseSettings, Settings};
pub use state::AppState;
pub use store::{connect, connect_lazy, ensure_database_exists};
