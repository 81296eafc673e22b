mod customer_id;

pub use customer_id::{CustomerIdParam, CUSTOMER_ID_PARAM};
