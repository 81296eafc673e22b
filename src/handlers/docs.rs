use crate::handlers::{customers, health, items, sample};
use crate::schema::{Customer, DeletedCustomer, Item, NewItem, NewSample, Sample};
use axum::Json;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(title = "shop-api", description = "Customers, items and purchases over PostgreSQL"),
    paths(
        health::index,
        health::health,
        health::health_db,
        health::health_info,
        sample::create_sample,
        sample::list_sample,
        customers::create_customer,
        customers::read_one_customer,
        customers::read_all_customers,
        customers::update_customer,
        customers::delete_customer,
        items::list_items,
        items::create_item,
    ),
    components(schemas(
        Sample,
        NewSample,
        Customer,
        DeletedCustomer,
        Item,
        NewItem,
        health::Message,
        health::HealthBody,
        health::DbHealth,
        health::DbInfo,
    ))
)]
pub struct ApiDoc;

pub async fn openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
