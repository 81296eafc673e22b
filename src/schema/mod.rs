//! Schema definitions: table catalog, column types and typed row structs.

mod catalog;
pub mod models;
mod types;
mod validator;

pub use catalog::Catalog;
pub use models::*;
pub use types::*;
pub use validator::validate;
