//! CrudService: generic CRUD using the safe SQL builder. ShopService: typed queries.

mod crud;
pub mod outcome;
mod shop;
mod validation;
pub use crud::{row_to_json, CrudService, DEFAULT_LIMIT};
pub use outcome::{DeleteOutcome, InsertOutcome, UpdateOutcome};
pub use shop::{new_item_id, ShopService, DEFAULT_SAMPLE_LIMIT};
pub use validation::{check_value, fits_numeric, RequestValidator};
