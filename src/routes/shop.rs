//! Shop routes: sample, customers, items.

use crate::handlers::{customers, items, sample};
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn shop_routes(state: AppState) -> Router {
    Router::new()
        .route("/sample", get(sample::list_sample).post(sample::create_sample))
        .route(
            "/customers",
            get(customers::read_one_customer)
                .post(customers::create_customer)
                .put(customers::update_customer)
                .delete(customers::delete_customer),
        )
        .route("/allcustomers", get(customers::read_all_customers))
        .route("/items", get(items::list_items).post(items::create_item))
        .with_state(state)
}
